//! wslgit - inspect WSL integration for a git client
//!
//! Reports whether WSL and git inside it are usable, converts paths between
//! Windows and WSL form, and refreshes a repository snapshot.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};
use wslgit::adapters::{Git2Repository, ProcessLauncher};
use wslgit::domain::{classify, PathKind};
use wslgit::ports::Repository;
use wslgit::{Config, WslBridge};

#[derive(Parser, Debug)]
#[command(name = "wslgit")]
#[command(about = "WSL path and git discovery helper")]
#[command(version)]
struct Args {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// WSL distribution to target (default: config, then the WSL default)
    #[arg(short, long, global = true)]
    distro: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show WSL availability, the default distribution, and git inside it
    Status,
    /// Tell what kind of path this is
    Classify { path: String },
    /// Convert a Windows path to its WSL form
    ToLinux { path: String },
    /// Convert a WSL path to a Windows path
    ToWindows { path: String },
    /// Refresh a repository and print a summary
    Refresh {
        /// Path to git repository (default: current directory)
        #[arg(short, long)]
        path: Option<String>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);
    tracing::debug!("Parsed CLI arguments: {:?}", args);

    let config = Config::load();
    let distro = args.distro.clone().or_else(|| config.distro.clone());
    let bridge = WslBridge::new(ProcessLauncher::new(), config.bridge.clone());

    match args.command {
        Command::Status => {
            let available = bridge.is_available();
            println!("WSL available:   {}", if available { "yes" } else { "no" });
            println!(
                "Default distro:  {}",
                bridge.default_distro().unwrap_or("(none)")
            );
            if let Some(d) = &distro {
                println!("Target distro:   {}", d);
            }
            if available {
                let label = format!("{}:", bridge.config().tool);
                match bridge.detect_tool(distro.as_deref()) {
                    Some(info) => println!("{:<17}{}", label, info),
                    None => {
                        let reason = bridge
                            .probe_tool_executable(distro.as_deref())
                            .and_then(|_| bridge.probe_tool_version(distro.as_deref()))
                            .err()
                            .map(|e| e.to_string())
                            .unwrap_or_default();
                        println!("{:<17}unavailable ({})", label, reason);
                    }
                }
            }
        }
        Command::Classify { path } => {
            let kind = match classify(&path) {
                PathKind::Empty => "empty",
                PathKind::WslShare => "wsl-share",
                PathKind::WindowsDrive => "windows-drive",
                PathKind::Linux => "linux",
                PathKind::Other => "other",
            };
            println!("{}", kind);
        }
        Command::ToLinux { path } => {
            println!("{}", bridge.to_linux_path(&path, distro.as_deref()));
        }
        Command::ToWindows { path } => {
            println!("{}", bridge.to_windows_path(&path, distro.as_deref()));
        }
        Command::Refresh { path } => {
            let path = path.unwrap_or_else(|| ".".to_string());
            // A Linux path only makes sense to libgit2 on Windows once it's
            // been mapped onto a drive or the WSL share.
            let path = if cfg!(windows) && classify(&path) == PathKind::Linux {
                bridge.to_windows_path(&path, distro.as_deref()).into_owned()
            } else {
                path
            };

            let mut repo = Git2Repository::open(&PathBuf::from(&path), config.repository.clone())
                .with_context(|| format!("Failed to open git repository at {}", path))?;
            repo.refresh_all().context("Failed to refresh repository")?;
            print_summary(&repo)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn print_summary(repo: &Git2Repository) -> Result<()> {
    println!("Repository: {}", repo.workdir()?.display());

    let current = repo
        .branches()
        .iter()
        .find(|b| b.is_current)
        .map(|b| b.name.as_str())
        .unwrap_or("(detached)");
    println!(
        "Branches: {} (current: {})  Tags: {}  Worktrees: {}  Submodules: {}  Stashes: {}",
        repo.branches().len(),
        current,
        repo.tags().len(),
        repo.worktrees().len(),
        repo.submodules().len(),
        repo.stashes().len(),
    );

    if !repo.changes().is_empty() {
        println!("\nChanges:");
        for change in repo.changes() {
            let marker = if change.staged { "staged" } else { "" };
            println!("  {} {} {}", change.kind, change.path, marker);
        }
    }

    if !repo.commits().is_empty() {
        println!("\nRecent commits ({} loaded):", repo.commits().len());
        for commit in repo.commits().iter().take(10) {
            println!(
                "  {} {} ({}, {})",
                commit.short_hash,
                commit.summary(),
                commit.author,
                commit.relative_time()
            );
        }
    }

    Ok(())
}
