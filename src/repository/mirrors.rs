// src/repository/mirrors.rs

//! Mirror list handling
//!
//! A mirror list is a plain text file with one mirror per line:
//!
//! ```text
//! # full mirror
//! https://ftp.qubes-os.org/repo/yum/
//! # partial mirror, carrying only r4.0
//! https://mirror.example.com/qubes/ r4.0
//! ```
//!
//! Blank lines and lines starting with `#` are ignored. The optional second
//! field is the subdirectory of the base tree the mirror replicates; it
//! defaults to `.` (the whole tree).

use crate::error::{Error, Result};
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Subdirectory used when a mirror carries the whole base tree
pub const WHOLE_TREE: &str = ".";

/// A mirror: base URL plus the subdirectory of the base tree it replicates
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Mirror {
    /// Base URL for the mirror
    pub url: String,
    /// Subdirectory mirrored, or `.` if not a partial mirror
    pub subdir: String,
}

impl Mirror {
    /// Create a mirror of a subdirectory of the base tree
    pub fn new(url: impl Into<String>, subdir: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            subdir: subdir.into(),
        }
    }

    /// Create a mirror carrying the whole base tree
    pub fn whole(url: impl Into<String>) -> Self {
        Self::new(url, WHOLE_TREE)
    }

    /// URL under which this mirror serves `path`, if it carries it at all
    ///
    /// `path` and `base` are local filesystem paths; the part of `path` below
    /// `base/subdir` is appended to the mirror URL with `/` separators.
    pub fn url_for(&self, path: &Path, base: &Path) -> Option<String> {
        let relpath = relative_to(path, &base.join(&self.subdir))?;
        Some(join_url(&self.url, &relpath))
    }
}

impl fmt::Display for Mirror {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.subdir == WHOLE_TREE {
            write!(f, "{}", self.url)
        } else {
            write!(f, "{} ({})", self.url, self.subdir)
        }
    }
}

/// Parse mirror list text
pub fn parse_mirrors(text: &str) -> Result<Vec<Mirror>> {
    let mut mirrors = Vec::new();

    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        let mirror = match fields.as_slice() {
            [url] => Mirror::whole(*url),
            [url, subdir] => Mirror::new(*url, *subdir),
            _ => {
                return Err(Error::ParseError(format!(
                    "mirror list line {}: expected URL and optional subdirectory, got {} fields",
                    lineno + 1,
                    fields.len()
                )));
            }
        };
        mirrors.push(mirror);
    }

    Ok(mirrors)
}

/// Read a mirror list file
pub fn read_mirrors(path: &Path) -> Result<Vec<Mirror>> {
    let text = fs::read_to_string(path).map_err(|e| {
        Error::IoError(format!("Failed to read mirror list {}: {e}", path.display()))
    })?;
    let mirrors = parse_mirrors(&text)?;
    debug!("Loaded {} mirrors from {}", mirrors.len(), path.display());
    Ok(mirrors)
}

/// Given a base path and a list of mirrors, yield the URL of `path` on every
/// mirror that carries it
///
/// Mirrors which apparently do not mirror this file are silently dropped.
/// Mirror order is preserved.
pub fn urls_for_mirrors<'a>(
    path: &'a Path,
    base: &'a Path,
    mirrors: &'a [Mirror],
) -> impl Iterator<Item = String> + 'a {
    mirrors.iter().filter_map(move |mirror| mirror.url_for(path, base))
}

/// Lexical `path` relative to `prefix`, or `None` if `path` is not under it
///
/// `.` components are ignored on both sides, so `./r4.0/x` is under `r4.0`
/// and every relative path is under `.`. An absolute path is never under a
/// relative prefix, nor the other way round.
pub fn relative_to(path: &Path, prefix: &Path) -> Option<PathBuf> {
    if path.has_root() != prefix.has_root() {
        return None;
    }
    let mut rest = path.components().filter(|c| *c != Component::CurDir);
    for part in prefix.components().filter(|c| *c != Component::CurDir) {
        if rest.next() != Some(part) {
            return None;
        }
    }
    Some(rest.collect())
}

/// Join a base URL and a relative filesystem path with URL path semantics
fn join_url(base: &str, relpath: &Path) -> String {
    let tail = relpath
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");

    if base.is_empty() || base.ends_with('/') {
        format!("{base}{tail}")
    } else {
        format!("{base}/{tail}")
    }
}
