pub mod backend;
pub mod cmd;
pub mod common;
pub mod core;
pub mod resolve;
pub mod vfs;
