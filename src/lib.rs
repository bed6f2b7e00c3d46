//! wslgit - WSL integration for a git client
//!
//! Detects the Windows Subsystem for Linux, translates paths between the
//! Windows and Linux views of the filesystem, locates git inside a
//! distribution, and models the refresh operations of a repository.

pub mod adapters;
pub mod bridge;
pub mod config;
pub mod domain;
pub mod ports;

pub use bridge::{BridgeConfig, BridgeError, WslBridge};
pub use config::Config;
