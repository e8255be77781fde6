pub mod drive_file_system;
pub mod sort;

pub use drive_file_system::DriveFileSystem;
