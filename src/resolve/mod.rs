//! Path-to-ID resolution and record normalization
//!
//! - query: Backend filter construction
//! - folder / file: Segment-by-segment resolution
//! - listing: Exhaustive pagination
//! - normalize / mime: Backend record to provider-agnostic record

pub mod file;
pub mod folder;
pub mod listing;
pub mod mime;
pub mod normalize;
pub mod query;

pub use folder::{Resolved, Resolver};
pub use normalize::Normalizer;
