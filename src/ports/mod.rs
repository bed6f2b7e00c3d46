pub mod launcher;
pub mod repository;

pub use launcher::{CommandOutput, CommandRunner, LaunchError, OutputEncoding};
pub use repository::Repository;
