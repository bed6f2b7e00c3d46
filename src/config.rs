//! User configuration.
//!
//! Read from `<config dir>/wslgit/config.toml`, then overridden by
//! `WSLGIT_*` environment variables. A missing or unreadable file just
//! means defaults.
//!
//! ```toml
//! [wsl]
//! launcher = "wsl.exe"
//! tool = "git"
//! distro = "Debian"
//! fallback_distro = "Ubuntu"
//!
//! [repository]
//! max_commits = 20000
//! include_untracked = true
//! ```

use crate::bridge::BridgeConfig;
use crate::domain::RepositorySettings;
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use toml::Value as TomlValue;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub bridge: BridgeConfig,
    /// Distribution to target instead of the WSL default.
    pub distro: Option<String>,
    pub repository: RepositorySettings,
}

impl Config {
    /// Load from the default location and apply environment overrides.
    pub fn load() -> Self {
        let mut config = match config_path() {
            Ok(path) if path.exists() => Self::from_file(&path).unwrap_or_else(|e| {
                tracing::warn!("Ignoring config file: {:#}", e);
                Self::default()
            }),
            _ => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("Invalid config in {}", path.display()))
    }

    /// Parse a config document. Unknown keys are ignored; keys with the
    /// wrong type are errors.
    pub fn from_toml(text: &str) -> Result<Self> {
        let value = text.parse::<TomlValue>().context("Failed to parse TOML")?;
        let mut config = Self::default();

        if let Some(wsl) = value.get("wsl") {
            if let Some(launcher) = get_str(wsl, "wsl.launcher")? {
                config.bridge.launcher = launcher;
            }
            if let Some(tool) = get_str(wsl, "wsl.tool")? {
                config.bridge.tool = tool;
            }
            if let Some(fallback) = get_str(wsl, "wsl.fallback_distro")? {
                config.bridge.fallback_distro = fallback;
            }
            config.distro = get_str(wsl, "wsl.distro")?;
        }

        if let Some(repo) = value.get("repository") {
            if let Some(v) = repo.get("max_commits") {
                let n = v
                    .as_integer()
                    .filter(|n| *n > 0)
                    .ok_or_else(|| anyhow!("repository.max_commits must be a positive integer"))?;
                config.repository.max_commits = n as usize;
            }
            if let Some(v) = repo.get("include_untracked") {
                config.repository.include_untracked = v
                    .as_bool()
                    .ok_or_else(|| anyhow!("repository.include_untracked must be a boolean"))?;
            }
        }

        Ok(config)
    }

    /// Apply `WSLGIT_DISTRO`, `WSLGIT_FALLBACK_DISTRO` and `WSLGIT_LAUNCHER`.
    /// Blank values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(distro) = var("WSLGIT_DISTRO") {
            self.distro = Some(distro);
        }
        if let Some(fallback) = var("WSLGIT_FALLBACK_DISTRO") {
            self.bridge.fallback_distro = fallback;
        }
        if let Some(launcher) = var("WSLGIT_LAUNCHER") {
            self.bridge.launcher = launcher;
        }
    }
}

fn get_str(table: &TomlValue, key: &str) -> Result<Option<String>> {
    let field = key.rsplit('.').next().unwrap_or(key);
    match table.get(field) {
        None => Ok(None),
        Some(v) => v
            .as_str()
            .map(|s| Some(s.to_string()))
            .ok_or_else(|| anyhow!("{} must be a string", key)),
    }
}

pub fn config_path() -> Result<PathBuf> {
    let dir = dirs::config_dir().ok_or_else(|| anyhow!("config dir not found"))?;
    Ok(dir.join("wslgit").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
        assert_eq!(Config::default().bridge.fallback_distro, "Ubuntu");
        assert_eq!(Config::default().bridge.launcher, "wsl.exe");
    }

    #[test]
    fn test_full_document() {
        let config = Config::from_toml(
            r#"
            [wsl]
            launcher = "C:\\Windows\\System32\\wsl.exe"
            tool = "git-lfs"
            distro = "Debian"
            fallback_distro = "Alpine"

            [repository]
            max_commits = 500
            include_untracked = false
            "#,
        )
        .unwrap();

        assert_eq!(config.bridge.launcher, r"C:\Windows\System32\wsl.exe");
        assert_eq!(config.bridge.tool, "git-lfs");
        assert_eq!(config.bridge.fallback_distro, "Alpine");
        assert_eq!(config.distro.as_deref(), Some("Debian"));
        assert_eq!(config.repository.max_commits, 500);
        assert!(!config.repository.include_untracked);
    }

    #[test]
    fn test_wrong_types_are_rejected() {
        assert!(Config::from_toml("[wsl]\ndistro = 3\n").is_err());
        assert!(Config::from_toml("[repository]\nmax_commits = 0\n").is_err());
        assert!(Config::from_toml("not toml at all [").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("WSLGIT_DISTRO", "Arch"),
            ("WSLGIT_FALLBACK_DISTRO", "  "),
            ("WSLGIT_LAUNCHER", "wsl"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.distro.as_deref(), Some("Arch"));
        assert_eq!(config.bridge.fallback_distro, "Ubuntu");
        assert_eq!(config.bridge.launcher, "wsl");
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[wsl]\ndistro = \"Debian\"\n").unwrap();
        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.distro.as_deref(), Some("Debian"));

        assert!(Config::from_file(&dir.path().join("missing.toml")).is_err());
    }
}
