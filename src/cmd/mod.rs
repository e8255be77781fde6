pub mod fs_command;
pub mod handler;
