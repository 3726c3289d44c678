// src/probe/checker.rs

//! Checker for a single mirror
//!
//! A check is one GET of the mirrored file. Whatever happens (connection
//! failure, error status, broken body) ends up in the returned
//! [`MirrorCheck`]; a check never fails as a whole.

use crate::hash::{HashAlgorithm, Hasher};
use crate::repository::Mirror;
use reqwest::header::LOCATION;
use reqwest::Url;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use super::client::ProbeClient;
use super::snapshot::MirrorStatus;

/// Result of checking one mirror
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorCheck {
    pub mirror: Mirror,
    /// URL of the file on this mirror
    pub url: String,
    pub status: Option<u16>,
    /// URLs that answered with a redirect, in order
    pub history: Vec<String>,
    pub sha256: Option<String>,
    pub error: Option<String>,
}

impl MirrorCheck {
    fn new(mirror: Mirror, url: String) -> Self {
        Self {
            mirror,
            url,
            status: None,
            history: Vec::new(),
            sha256: None,
            error: None,
        }
    }

    /// Snapshot entry for this check
    pub fn to_status(&self) -> MirrorStatus {
        MirrorStatus {
            error: self.error.clone(),
            history: self.history.clone(),
            sha256: self.sha256.clone(),
            status: self.status,
        }
    }
}

/// Failures that end a check early
#[derive(Error, Debug)]
enum ProbeFailure {
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid URL {url:?}: {source}")]
    InvalidUrl { url: String, source: url::ParseError },

    #[error("invalid redirect from {from}: {reason}")]
    BadRedirect { from: String, reason: String },

    #[error("too many redirects (more than {0})")]
    TooManyRedirects(usize),
}

/// Checker for a single mirror
#[derive(Debug, Clone)]
pub struct MirrorChecker {
    mirror: Mirror,
    url: String,
}

impl MirrorChecker {
    /// Prepare a check of `path` on `mirror`
    ///
    /// Returns `None` if the mirror does not carry `path`.
    pub fn new(mirror: Mirror, path: &Path, base: &Path) -> Option<Self> {
        let url = mirror.url_for(path, base)?;
        Some(Self { mirror, url })
    }

    /// Prepare a check of an explicit URL
    pub fn with_url(mirror: Mirror, url: impl Into<String>) -> Self {
        Self {
            mirror,
            url: url.into(),
        }
    }

    /// Execute the check
    pub async fn check(self, client: &ProbeClient) -> MirrorCheck {
        let mut result = MirrorCheck::new(self.mirror, self.url);
        if let Err(e) = fetch(client, &mut result).await {
            debug!("Check of {} failed: {}", result.url, e);
            result.error = Some(e.to_string());
        }
        result
    }
}

/// Follow redirects, then hash the body of a successful response chunk by
/// chunk
async fn fetch(client: &ProbeClient, result: &mut MirrorCheck) -> Result<(), ProbeFailure> {
    let mut url = Url::parse(&result.url).map_err(|source| ProbeFailure::InvalidUrl {
        url: result.url.clone(),
        source,
    })?;

    loop {
        let mut response = client.inner().get(url.clone()).send().await?;
        let status = response.status();

        if status.is_redirection()
            && let Some(location) = response.headers().get(LOCATION)
        {
            if result.history.len() >= client.max_redirects() {
                return Err(ProbeFailure::TooManyRedirects(client.max_redirects()));
            }
            let from = response.url().to_string();
            let next = location
                .to_str()
                .map_err(|e| e.to_string())
                .and_then(|loc| response.url().join(loc).map_err(|e| e.to_string()))
                .map_err(|reason| ProbeFailure::BadRedirect {
                    from: from.clone(),
                    reason,
                })?;
            debug!("{} redirects to {}", from, next);
            result.history.push(from);
            url = next;
            continue;
        }

        result.status = Some(status.as_u16());
        if !status.is_success() {
            return Ok(());
        }

        let mut digest = Hasher::new(HashAlgorithm::Sha256);
        while let Some(chunk) = response.chunk().await? {
            digest.update(&chunk);
        }
        result.sha256 = Some(digest.finalize());
        return Ok(());
    }
}
