//! std::process implementation of the CommandRunner port.

use crate::ports::{CommandOutput, CommandRunner, LaunchError, OutputEncoding};
use std::io::{self, Read};
use std::process::{Child, Command, Stdio};

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessLauncher;

impl ProcessLauncher {
    pub fn new() -> Self {
        Self
    }

    fn command(program: &str, args: &[&str]) -> Command {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());

        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            cmd.creation_flags(CREATE_NO_WINDOW);
        }

        cmd
    }
}

impl CommandRunner for ProcessLauncher {
    fn run(
        &self,
        program: &str,
        args: &[&str],
        encoding: OutputEncoding,
    ) -> Result<CommandOutput, LaunchError> {
        let mut child = Self::command(program, args).spawn().map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                LaunchError::NotFound {
                    program: program.to_string(),
                }
            } else {
                LaunchError::Spawn {
                    program: program.to_string(),
                    source,
                }
            }
        })?;

        // Drain stdout before waiting so a chatty child can't block on a full pipe.
        let mut raw = Vec::new();
        if let Some(mut stdout) = child.stdout.take() {
            if let Err(source) = stdout.read_to_end(&mut raw) {
                drop(stdout);
                abandon(&mut child);
                return Err(LaunchError::Wait {
                    program: program.to_string(),
                    source,
                });
            }
        }

        let status = child.wait().map_err(|source| LaunchError::Wait {
            program: program.to_string(),
            source,
        })?;

        Ok(CommandOutput {
            status: status.code(),
            stdout: decode(&raw, encoding),
        })
    }
}

/// Kill and reap a child we've given up on so it doesn't linger as a zombie.
fn abandon(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

/// Decode captured stdout. Invalid sequences are replaced, never rejected.
pub fn decode(raw: &[u8], encoding: OutputEncoding) -> String {
    match encoding {
        OutputEncoding::Utf8 => String::from_utf8_lossy(raw).into_owned(),
        OutputEncoding::Utf16Le => {
            let units: Vec<u16> = raw
                .chunks_exact(2)
                .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
                .trim_start_matches('\u{FEFF}')
                .replace('\0', "")
        }
    }
}
