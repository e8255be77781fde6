pub mod file_record;
pub mod file_system;
pub mod options;

pub use file_record::*;
pub use file_system::{ByteStream, FileSystem};
pub use options::*;
