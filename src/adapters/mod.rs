pub mod git2_repository;
pub mod process_launcher;

pub use git2_repository::Git2Repository;
pub use process_launcher::ProcessLauncher;
