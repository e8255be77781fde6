//! Backend layer
//!
//! ID-addressed storage backends behind one client trait:
//! - Drive v2 style REST API over HTTP
//! - In-memory storage (for testing)

pub mod client;
pub mod config;
pub mod drive;
pub mod memory;
pub mod store;

pub use client::{BackendClient, MetaPatch, NewFile, Page};
pub use config::BackendConfig;
pub use store::BackendStore;
