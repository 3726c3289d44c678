// src/report.rs

//! Aggregated mirror freshness report
//!
//! Combines several [`Snapshot`]s of the same file into a table with one
//! row per snapshot (oldest first) and one column per mirror:
//!
//! ```text
//!   0 https://ftp.qubes-os.org/repo/yum/
//!   1 http://mirror.example.com/qubes/
//! TIMESTAMP             0       1
//! 2018-03-04 05:00:00Z  ba7816b   ERROR
//! 2018-03-04 06:00:00Z  ba7816b    !404
//! ```
//!
//! A cell shows `-` when the mirror was not part of that run, `ERROR` when
//! the request failed, `!<status>` for a non-2xx answer, and otherwise the
//! beginning of the SHA-256 of what the mirror served. Error takes
//! precedence over status.

use crate::error::{Error, Result};
use crate::probe::{MirrorStatus, Snapshot};
use std::collections::BTreeSet;
use tracing::debug;
use url::Url;

/// Row timestamp format
pub const ROW_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%SZ";

/// Snapshots of one file in chronological order, with a stable column order
#[derive(Debug, Clone)]
pub struct Report {
    checks: Vec<Snapshot>,
    mirrors: Vec<String>,
}

impl Report {
    /// Build a report from snapshots of the same file
    ///
    /// Snapshots are sorted by capture time (ties keep input order). Mirror
    /// columns are the union of all mirrors, with those under `home_domain`
    /// first and the rest grouped by reversed host name.
    pub fn new(checks: impl IntoIterator<Item = Snapshot>, home_domain: &str) -> Result<Self> {
        let mut checks: Vec<Snapshot> = checks.into_iter().collect();

        if let Some(first) = checks.first()
            && let Some(other) = checks.iter().find(|c| c.path != first.path)
        {
            return Err(Error::TargetMismatch {
                expected: first.path.clone(),
                found: other.path.clone(),
            });
        }
        checks.sort_by_key(|check| check.utcnow);

        let unique: BTreeSet<&str> = checks
            .iter()
            .flat_map(|check| check.mirrors.keys().map(String::as_str))
            .collect();
        let mut mirrors: Vec<String> = unique.into_iter().map(str::to_string).collect();
        mirrors.sort_by_cached_key(|url| UrlSortKey::new(url, home_domain));

        debug!("Report over {} checks and {} mirrors", checks.len(), mirrors.len());
        Ok(Self { checks, mirrors })
    }

    /// Snapshots, oldest first
    pub fn checks(&self) -> &[Snapshot] {
        &self.checks
    }

    /// Mirror URLs in column order
    pub fn mirrors(&self) -> &[String] {
        &self.mirrors
    }

    /// Report lines: mirror legend, header, then one row per snapshot
    pub fn lines(&self, cell_width: usize) -> Vec<String> {
        let width = cell_width.max(1);
        let mut lines = Vec::with_capacity(self.mirrors.len() + self.checks.len() + 1);

        for (i, mirror) in self.mirrors.iter().enumerate() {
            lines.push(format!("{i:3} {mirror}"));
        }

        let header: Vec<String> = (0..self.mirrors.len())
            .map(|i| format!("{i:<width$}"))
            .collect();
        lines.push(format!("{:20}  {}", "TIMESTAMP", header.join(" ")));

        for check in &self.checks {
            let cells: Vec<String> = self
                .mirrors
                .iter()
                .map(|mirror| {
                    let cell: String = format_cell(check.mirrors.get(mirror))
                        .chars()
                        .take(width)
                        .collect();
                    format!("{cell:>width$}")
                })
                .collect();
            lines.push(format!(
                "{}  {}",
                check.utcnow.format(ROW_TIME_FORMAT),
                cells.join(" ")
            ));
        }

        lines
    }

    /// Whole report as text
    pub fn render(&self, cell_width: usize) -> String {
        let mut text = self.lines(cell_width).join("\n");
        text.push('\n');
        text
    }
}

/// Format a single cell based on a mirror's snapshot entry
pub fn format_cell(entry: Option<&MirrorStatus>) -> String {
    let Some(entry) = entry else {
        return "-".to_string();
    };

    if entry.error.is_some() {
        return "ERROR".to_string();
    }

    if let Some(status) = entry.status
        && entry.is_http_failure()
    {
        return format!("!{status}");
    }

    entry.sha256.clone().unwrap_or_else(|| "?".to_string())
}

/// Column sort key for a mirror URL
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct UrlSortKey {
    /// `false` for the home domain, so it sorts first
    foreign: bool,
    /// Host labels, top-level domain first
    labels: Vec<String>,
    scheme: String,
    path: String,
    /// Full URL, to keep the order total
    url: String,
}

impl UrlSortKey {
    fn new(url: &str, home_domain: &str) -> Self {
        let Ok(parsed) = Url::parse(url) else {
            return Self {
                foreign: true,
                labels: Vec::new(),
                scheme: String::new(),
                path: url.to_string(),
                url: url.to_string(),
            };
        };

        let host = parsed.host_str().unwrap_or("").trim_matches('.').to_lowercase();
        let home = home_domain.trim_matches('.').to_lowercase();
        let foreign = !(host == home || host.ends_with(&format!(".{home}")));

        Self {
            foreign,
            labels: host.rsplit('.').map(str::to_string).collect(),
            scheme: parsed.scheme().to_string(),
            path: parsed.path().to_string(),
            url: url.to_string(),
        }
    }
}
