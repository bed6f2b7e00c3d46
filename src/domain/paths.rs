//! Path rules for moving between Windows and WSL addressing.
//! Pure string manipulation: no I/O, no process calls.

use std::borrow::Cow;

/// Host-side share prefixes that address a file inside a WSL distribution.
/// Both spellings are recognized by Explorer and the rest of the tooling.
pub const WSL_SHARE_PREFIXES: [&str; 2] = [r"\\wsl$\", r"\\wsl.localhost\"];

/// Prefix used when building a share path from a Linux path.
pub const WSL_LOCALHOST_PREFIX: &str = r"\\wsl.localhost\";

/// Where WSL mounts the host drives.
pub const MOUNT_PREFIX: &str = "/mnt/";

/// Rough shape of a path string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    Empty,
    /// `\\wsl$\<distro>\...` or `\\wsl.localhost\<distro>\...`
    WslShare,
    /// `C:\...`
    WindowsDrive,
    /// `/...`
    Linux,
    Other,
}

/// The two meaningful pieces of a share path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WslPathParts<'a> {
    pub distro: &'a str,
    pub rest: &'a str,
}

pub fn classify(path: &str) -> PathKind {
    if path.is_empty() {
        PathKind::Empty
    } else if is_wsl_path(path) {
        PathKind::WslShare
    } else if drive_letter(path).is_some() {
        PathKind::WindowsDrive
    } else if path.starts_with('/') {
        PathKind::Linux
    } else {
        PathKind::Other
    }
}

/// True if `path` starts with one of the WSL share prefixes (ASCII case-insensitive).
pub fn is_wsl_path(path: &str) -> bool {
    share_prefix_len(path).is_some()
}

fn share_prefix_len(path: &str) -> Option<usize> {
    WSL_SHARE_PREFIXES
        .iter()
        .find(|prefix| starts_with_ignore_case(path, prefix))
        .map(|prefix| prefix.len())
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.get(..prefix.len())
        .map(|head| head.eq_ignore_ascii_case(prefix))
        .unwrap_or(false)
}

/// Split a share path into distribution name and remainder.
///
/// The distro segment must be non-empty and be followed by a backslash;
/// the remainder may be empty (`\\wsl$\Ubuntu\` addresses the distro root).
pub fn parse_wsl_path(path: &str) -> Option<WslPathParts<'_>> {
    let after_prefix = &path[share_prefix_len(path)?..];
    let (distro, rest) = after_prefix.split_once('\\')?;
    if distro.is_empty() {
        return None;
    }
    Some(WslPathParts { distro, rest })
}

fn drive_letter(path: &str) -> Option<char> {
    let mut chars = path.chars();
    let letter = chars.next()?;
    (letter.is_ascii_alphabetic() && chars.next() == Some(':')).then_some(letter)
}

/// Convert a Windows-side path into the form a process inside WSL would use.
///
/// `_distro` is accepted for symmetry with [`to_windows_path`]; the result
/// does not depend on it.
pub fn to_linux_path<'a>(path: &'a str, _distro: Option<&str>) -> Cow<'a, str> {
    if path.is_empty() {
        return Cow::Borrowed(path);
    }

    if is_wsl_path(path) {
        return match parse_wsl_path(path) {
            Some(parts) => Cow::Owned(format!("/{}", parts.rest.replace('\\', "/"))),
            None => Cow::Borrowed(path),
        };
    }

    if let Some(letter) = drive_letter(path) {
        // drive letter and ':' are both single-byte
        let rest = path[2..].replace('\\', "/");
        return Cow::Owned(format!(
            "{}{}{}",
            MOUNT_PREFIX,
            letter.to_ascii_lowercase(),
            rest
        ));
    }

    Cow::Borrowed(path)
}

/// Convert a Linux path into something Windows can open.
///
/// `/mnt/<x>/...` maps back onto drive `X:`; any other absolute path goes
/// through the `\\wsl.localhost\<distro>\` share.
pub fn to_windows_path<'a>(path: &'a str, distro: &str) -> Cow<'a, str> {
    if path.is_empty() || is_wsl_path(path) {
        return Cow::Borrowed(path);
    }

    if starts_with_ignore_case(path, MOUNT_PREFIX) {
        let mut tail = path[MOUNT_PREFIX.len()..].chars();
        if let Some(letter) = tail.next() {
            let rest = tail.as_str();
            if !rest.is_empty() {
                return Cow::Owned(format!(
                    "{}:{}",
                    letter.to_uppercase(),
                    rest.replace('/', "\\")
                ));
            }
        }
    }

    if let Some(rest) = path.strip_prefix('/') {
        return Cow::Owned(format!(
            "{}{}\\{}",
            WSL_LOCALHOST_PREFIX,
            distro,
            rest.replace('/', "\\")
        ));
    }

    Cow::Borrowed(path)
}
