//! Command launcher port (trait).
//! Runs an external program and hands back its exit code and decoded stdout.

use std::io;
use thiserror::Error;

/// How the child's stdout bytes should be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputEncoding {
    Utf8,
    /// `wsl.exe --list` writes UTF-16LE regardless of the console code page.
    Utf16Le,
}

/// Result of a child process that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the process was terminated by a signal.
    pub status: Option<i32>,
    pub stdout: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Why a child process could not be run to completion.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("'{program}' was not found on PATH")]
    NotFound { program: String },

    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("failed while waiting for '{program}': {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },
}

/// Port for launching external processes.
/// Implementations may spawn real processes or replay canned output in tests.
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args`, block until it exits, and capture stdout.
    /// No shell is involved; arguments are passed verbatim.
    fn run(
        &self,
        program: &str,
        args: &[&str],
        encoding: OutputEncoding,
    ) -> Result<CommandOutput, LaunchError>;
}
