//! WSL bridge service.
//! Detects WSL, resolves the default distribution, translates paths, and
//! locates a tool inside a distribution by going through the launcher port.
//!
//! Every public query degrades to `false`, `None`, or the unchanged input when
//! WSL can't be used; the `probe_*` methods expose the reason for callers that
//! want it.

use crate::domain::{paths, ToolInfo};
use crate::ports::{CommandRunner, LaunchError, OutputEncoding};
use once_cell::sync::OnceCell;
use std::borrow::Cow;
use thiserror::Error;

pub const DEFAULT_LAUNCHER: &str = "wsl.exe";
pub const DEFAULT_TOOL: &str = "git";
pub const DEFAULT_FALLBACK_DISTRO: &str = "Ubuntu";

const DEFAULT_MARKER: &str = "(Default)";

/// Static knobs for the bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Launcher executable, resolved through PATH.
    pub launcher: String,
    /// Tool looked up by `find_tool_executable` / `tool_version`.
    pub tool: String,
    /// Distro used to build share paths when neither the caller nor WSL names one.
    pub fallback_distro: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            launcher: DEFAULT_LAUNCHER.to_string(),
            tool: DEFAULT_TOOL.to_string(),
            fallback_distro: DEFAULT_FALLBACK_DISTRO.to_string(),
        }
    }
}

/// Why a query inside WSL produced nothing.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("WSL is not available on this system")]
    Unavailable,

    #[error(transparent)]
    Launch(#[from] LaunchError),

    #[error("command exited with status {}", .code.map_or_else(|| "none".to_string(), |c| c.to_string()))]
    NonZeroExit { code: Option<i32> },

    #[error("command produced no output")]
    EmptyOutput,
}

pub struct WslBridge<R: CommandRunner> {
    runner: R,
    config: BridgeConfig,
    available: OnceCell<bool>,
    default_distro: OnceCell<Option<String>>,
}

impl<R: CommandRunner> WslBridge<R> {
    pub fn new(runner: R, config: BridgeConfig) -> Self {
        Self {
            runner,
            config,
            available: OnceCell::new(),
            default_distro: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Forget the cached availability and default distro so the next query
    /// asks WSL again.
    pub fn reset(&mut self) {
        self.available.take();
        self.default_distro.take();
    }

    /// Whether `wsl --status` runs and exits cleanly. Computed once.
    pub fn is_available(&self) -> bool {
        *self.available.get_or_init(|| self.check_availability())
    }

    /// First distribution listed by `wsl -l -q`. Computed once.
    pub fn default_distro(&self) -> Option<&str> {
        self.default_distro
            .get_or_init(|| self.query_default_distro())
            .as_deref()
    }

    fn check_availability(&self) -> bool {
        match self
            .runner
            .run(&self.config.launcher, &["--status"], OutputEncoding::Utf8)
        {
            Ok(output) => {
                let available = output.success();
                tracing::debug!(available, status = ?output.status, "probed WSL availability");
                available
            }
            Err(e) => {
                tracing::debug!(error = %e, "WSL launcher could not be started");
                false
            }
        }
    }

    fn query_default_distro(&self) -> Option<String> {
        let output = match self
            .runner
            .run(&self.config.launcher, &["-l", "-q"], OutputEncoding::Utf16Le)
        {
            Ok(output) => output,
            Err(e) => {
                tracing::debug!(error = %e, "failed to list WSL distributions");
                return None;
            }
        };

        if !output.success() {
            tracing::debug!(status = ?output.status, "listing WSL distributions failed");
            return None;
        }

        let distro = parse_default_distro(&output.stdout);
        if let Some(name) = &distro {
            tracing::info!(distro = %name, "resolved default WSL distribution");
        }
        distro
    }

    pub fn to_linux_path<'a>(&self, path: &'a str, distro: Option<&str>) -> Cow<'a, str> {
        paths::to_linux_path(path, distro)
    }

    /// Convert a Linux path to a Windows one. Share paths are built for
    /// `distro`, else the default distribution, else the configured fallback.
    pub fn to_windows_path<'a>(&self, path: &'a str, distro: Option<&str>) -> Cow<'a, str> {
        if path.is_empty() || paths::is_wsl_path(path) {
            return Cow::Borrowed(path);
        }

        let distro = distro
            .or_else(|| self.default_distro())
            .filter(|d| !d.is_empty())
            .unwrap_or(self.config.fallback_distro.as_str());
        paths::to_windows_path(path, distro)
    }

    /// Path of the tool inside WSL (e.g. `/usr/bin/git`).
    pub fn find_tool_executable(&self, distro: Option<&str>) -> Option<String> {
        self.probe_tool_executable(distro).ok()
    }

    /// Output of `<tool> --version` inside WSL.
    pub fn tool_version(&self, distro: Option<&str>) -> Option<String> {
        self.probe_tool_version(distro).ok()
    }

    pub fn detect_tool(&self, distro: Option<&str>) -> Option<ToolInfo> {
        let path = self.find_tool_executable(distro)?;
        let version = self.tool_version(distro)?;
        Some(ToolInfo { path, version })
    }

    pub fn probe_tool_executable(&self, distro: Option<&str>) -> Result<String, BridgeError> {
        let tool = self.config.tool.as_str();
        self.run_in_distro(distro, &["which", tool])
    }

    pub fn probe_tool_version(&self, distro: Option<&str>) -> Result<String, BridgeError> {
        let tool = self.config.tool.as_str();
        self.run_in_distro(distro, &[tool, "--version"])
    }

    fn run_in_distro(&self, distro: Option<&str>, command: &[&str]) -> Result<String, BridgeError> {
        if !self.is_available() {
            return Err(BridgeError::Unavailable);
        }

        let distro = distro
            .or_else(|| self.default_distro())
            .filter(|d| !d.is_empty());

        let mut args: Vec<&str> = Vec::with_capacity(command.len() + 2);
        if let Some(d) = distro {
            args.extend(["-d", d]);
        }
        args.extend_from_slice(command);

        let output = self
            .runner
            .run(&self.config.launcher, &args, OutputEncoding::Utf8)
            .inspect_err(|e| tracing::debug!(error = %e, ?args, "WSL command failed to run"))?;

        if !output.success() {
            tracing::debug!(status = ?output.status, ?args, "WSL command exited with failure");
            return Err(BridgeError::NonZeroExit {
                code: output.status,
            });
        }

        let trimmed = output.stdout.trim();
        if trimmed.is_empty() {
            return Err(BridgeError::EmptyOutput);
        }
        Ok(trimmed.to_string())
    }
}

/// Pick the default distribution out of `wsl -l -q` output: the first
/// non-blank line, minus any `(Default)` marker, whitespace and NULs.
pub fn parse_default_distro(listing: &str) -> Option<String> {
    let first = listing
        .split(['\r', '\n'])
        .find(|line| !line.trim().is_empty())?;

    let name = first
        .trim()
        .replace(DEFAULT_MARKER, "")
        .trim()
        .replace('\0', "");

    (!name.is_empty()).then_some(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::CommandOutput;
    use pretty_assertions::assert_eq;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::thread;
    use std::time::Duration;

    type Reply = Result<CommandOutput, LaunchError>;

    /// Replays canned replies keyed on the argument list and records every call.
    #[derive(Default)]
    struct FakeRunner {
        status: Option<Reply>,
        listing: Option<Reply>,
        commands: Mutex<VecDeque<Reply>>,
        calls: Mutex<Vec<Vec<String>>>,
    }

    fn ok(stdout: &str) -> Reply {
        Ok(CommandOutput {
            status: Some(0),
            stdout: stdout.to_string(),
        })
    }

    fn exit(code: i32) -> Reply {
        Ok(CommandOutput {
            status: Some(code),
            stdout: String::new(),
        })
    }

    fn missing() -> Reply {
        Err(LaunchError::NotFound {
            program: DEFAULT_LAUNCHER.to_string(),
        })
    }

    fn clone_reply(reply: &Reply) -> Reply {
        match reply {
            Ok(out) => Ok(out.clone()),
            Err(_) => missing(),
        }
    }

    impl FakeRunner {
        fn available() -> Self {
            Self {
                status: Some(ok("")),
                listing: Some(ok("Ubuntu\r\nDebian\r\n")),
                ..Default::default()
            }
        }

        fn unavailable() -> Self {
            Self {
                status: Some(missing()),
                listing: Some(missing()),
                ..Default::default()
            }
        }

        fn with_commands(self, replies: Vec<Reply>) -> Self {
            *self.commands.lock().unwrap() = replies.into();
            self
        }

        fn calls(&self) -> Vec<Vec<String>> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl CommandRunner for FakeRunner {
        fn run(&self, program: &str, args: &[&str], encoding: OutputEncoding) -> Reply {
            assert_eq!(program, DEFAULT_LAUNCHER);
            self.calls
                .lock()
                .unwrap()
                .push(args.iter().map(|a| a.to_string()).collect());

            match args {
                ["--status"] => clone_reply(self.status.as_ref().unwrap_or(&missing())),
                ["-l", "-q"] => {
                    assert_eq!(encoding, OutputEncoding::Utf16Le);
                    clone_reply(self.listing.as_ref().unwrap_or(&missing()))
                }
                _ => {
                    assert_eq!(encoding, OutputEncoding::Utf8);
                    self.commands.lock().unwrap().pop_front().unwrap_or_else(missing)
                }
            }
        }
    }

    fn bridge(runner: FakeRunner) -> WslBridge<FakeRunner> {
        WslBridge::new(runner, BridgeConfig::default())
    }

    #[test]
    fn test_parse_default_distro() {
        assert_eq!(parse_default_distro("Ubuntu\r\nDebian\r\n").as_deref(), Some("Ubuntu"));
        assert_eq!(parse_default_distro("\r\n  Debian (Default)\r\n").as_deref(), Some("Debian"));
        assert_eq!(parse_default_distro("Ubu\0ntu\n").as_deref(), Some("Ubuntu"));
        assert_eq!(parse_default_distro(""), None);
        assert_eq!(parse_default_distro("\r\n \r\n"), None);
        assert_eq!(parse_default_distro("(Default)\n"), None);
    }

    #[test]
    fn test_availability_is_cached() {
        let b = bridge(FakeRunner::available());
        assert!(b.is_available());
        assert!(b.is_available());
        assert_eq!(b.runner.calls().len(), 1);
    }

    #[test]
    fn test_launch_failure_means_unavailable() {
        let b = bridge(FakeRunner::unavailable());
        assert!(!b.is_available());
    }

    #[test]
    fn test_nonzero_status_means_unavailable() {
        let b = bridge(FakeRunner {
            status: Some(exit(1)),
            ..Default::default()
        });
        assert!(!b.is_available());
    }

    #[test]
    fn test_default_distro_is_cached() {
        let b = bridge(FakeRunner::available());
        assert_eq!(b.default_distro(), Some("Ubuntu"));
        assert_eq!(b.default_distro(), Some("Ubuntu"));
        assert_eq!(b.runner.calls(), vec![vec!["-l", "-q"]]);
    }

    #[test]
    fn test_default_distro_failure_is_none() {
        let b = bridge(FakeRunner {
            listing: Some(exit(1)),
            ..Default::default()
        });
        assert_eq!(b.default_distro(), None);
        assert_eq!(bridge(FakeRunner::unavailable()).default_distro(), None);
    }

    #[test]
    fn test_reset_recomputes() {
        let mut b = bridge(FakeRunner::available());
        assert!(b.is_available());
        assert_eq!(b.default_distro(), Some("Ubuntu"));
        b.reset();
        assert!(b.is_available());
        assert_eq!(b.default_distro(), Some("Ubuntu"));
        assert_eq!(b.runner.calls().len(), 4);
    }

    #[test]
    fn test_unavailable_short_circuits_tool_queries() {
        let b = bridge(FakeRunner::unavailable());
        assert_eq!(b.find_tool_executable(None), None);
        assert_eq!(b.tool_version(None), None);
        assert_eq!(b.find_tool_executable(Some("Debian")), None);
        assert_eq!(b.runner.calls(), vec![vec!["--status"]]);
        assert!(matches!(
            b.probe_tool_version(None),
            Err(BridgeError::Unavailable)
        ));
    }

    #[test]
    fn test_find_tool_uses_default_distro() {
        let b = bridge(FakeRunner::available().with_commands(vec![ok("/usr/bin/git\n")]));
        assert_eq!(b.find_tool_executable(None).as_deref(), Some("/usr/bin/git"));
        assert_eq!(
            b.runner.calls().last().unwrap(),
            &vec!["-d", "Ubuntu", "which", "git"]
        );
    }

    #[test]
    fn test_tool_version_with_explicit_distro() {
        let b = bridge(FakeRunner::available().with_commands(vec![ok("git version 2.43.0\n")]));
        assert_eq!(b.tool_version(Some("Debian")).as_deref(), Some("git version 2.43.0"));
        // explicit distro: listing is never consulted
        assert_eq!(
            b.runner.calls(),
            vec![vec!["--status"], vec!["-d", "Debian", "git", "--version"]]
        );
    }

    #[test]
    fn test_no_distro_omits_selection_flag() {
        let runner = FakeRunner {
            status: Some(ok("")),
            listing: Some(exit(1)),
            ..Default::default()
        }
        .with_commands(vec![ok("/usr/bin/git")]);
        let b = bridge(runner);
        assert_eq!(b.find_tool_executable(None).as_deref(), Some("/usr/bin/git"));
        assert_eq!(b.runner.calls().last().unwrap(), &vec!["which", "git"]);
    }

    #[test]
    fn test_tool_failures_are_none() {
        let b = bridge(
            FakeRunner::available().with_commands(vec![exit(1), ok("  \n"), missing()]),
        );
        assert!(matches!(
            b.probe_tool_executable(None),
            Err(BridgeError::NonZeroExit { code: Some(1) })
        ));
        assert!(matches!(
            b.probe_tool_version(None),
            Err(BridgeError::EmptyOutput)
        ));
        assert_eq!(b.find_tool_executable(None), None);
    }

    #[test]
    fn test_detect_tool() {
        let b = bridge(FakeRunner::available().with_commands(vec![
            ok("/usr/bin/git\n"),
            ok("git version 2.43.0\n"),
        ]));
        let info = b.detect_tool(None).unwrap();
        assert_eq!(info.path, "/usr/bin/git");
        assert_eq!(info.version, "git version 2.43.0");
    }

    #[test]
    fn test_to_windows_path_uses_fallback_distro() {
        let b = bridge(FakeRunner::unavailable());
        assert_eq!(
            b.to_windows_path("/home/user/file.txt", None),
            r"\\wsl.localhost\Ubuntu\home\user\file.txt"
        );
    }

    #[test]
    fn test_to_windows_path_prefers_explicit_then_default() {
        let b = bridge(FakeRunner {
            listing: Some(ok("Debian\r\n")),
            ..Default::default()
        });
        assert_eq!(b.to_windows_path("/etc", Some("Arch")), r"\\wsl.localhost\Arch\etc");
        assert_eq!(b.to_windows_path("/etc", None), r"\\wsl.localhost\Debian\etc");
    }

    #[test]
    fn test_configured_fallback_distro() {
        let config = BridgeConfig {
            fallback_distro: "Alpine".to_string(),
            ..Default::default()
        };
        let b = WslBridge::new(FakeRunner::unavailable(), config);
        assert_eq!(b.to_windows_path("/srv", None), r"\\wsl.localhost\Alpine\srv");
    }

    #[test]
    fn test_translation_short_circuits_skip_listing() {
        let b = bridge(FakeRunner::available());
        assert_eq!(b.to_windows_path("", None), "");
        assert_eq!(b.to_windows_path(r"\\wsl$\Ubuntu\x", None), r"\\wsl$\Ubuntu\x");
        assert_eq!(b.to_linux_path(r"C:\Users\test", None), "/mnt/c/Users/test");
        assert!(b.runner.calls().is_empty());

        // mount paths still resolve the distro before the mount check
        assert_eq!(b.to_windows_path("/mnt/c/Users/test", None), r"C:\Users\test");
        assert_eq!(b.runner.calls(), vec![vec!["-l", "-q"]]);
    }

    /// Sleeps inside every launch so concurrent first calls overlap.
    struct SlowCountingRunner {
        launches: AtomicUsize,
    }

    impl CommandRunner for SlowCountingRunner {
        fn run(&self, _program: &str, args: &[&str], _encoding: OutputEncoding) -> Reply {
            self.launches.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(50));
            match args {
                ["-l", "-q"] => ok("Ubuntu\r\n"),
                _ => ok(""),
            }
        }
    }

    #[test]
    fn test_concurrent_first_access_launches_once_per_cache() {
        let b = WslBridge::new(
            SlowCountingRunner {
                launches: AtomicUsize::new(0),
            },
            BridgeConfig::default(),
        );

        thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    assert!(b.is_available());
                    assert_eq!(b.default_distro(), Some("Ubuntu"));
                });
            }
        });

        assert_eq!(b.runner.launches.load(Ordering::SeqCst), 2);
    }
}
