// src/probe/run.rs

//! One probe run: check every mirror concurrently and collect a snapshot

use crate::error::{Error, Result};
use crate::repository::Mirror;
use chrono::{Timelike, Utc};
use futures::future::join_all;
use std::collections::BTreeMap;
use std::path::Path;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use super::checker::{MirrorCheck, MirrorChecker};
use super::client::ProbeClient;
use super::snapshot::Snapshot;

/// Check `path` on every mirror that carries it
///
/// The capture time is taken once, before any request is made. Mirrors not
/// carrying `path` are logged and left out of the snapshot. All checks run
/// concurrently over the shared client (at most `max_concurrent` at a time
/// when it is non-zero) and the snapshot is built once every check is done.
///
/// Fails only if no mirror carries `path` at all.
pub async fn check_mirrors(
    path: &Path,
    base: &Path,
    mirrors: &[Mirror],
    client: &ProbeClient,
    max_concurrent: usize,
) -> Result<Snapshot> {
    let now = Utc::now();
    let utcnow = now.with_nanosecond(0).unwrap_or(now);

    let mut checkers = Vec::with_capacity(mirrors.len());
    for mirror in mirrors {
        match MirrorChecker::new(mirror.clone(), path, base) {
            Some(checker) => checkers.push(checker),
            None => warn!("file {} not mirrored in {}", path.display(), mirror.url),
        }
    }

    if checkers.is_empty() {
        return Err(Error::NotMirrored {
            path: path.to_path_buf(),
        });
    }

    info!("Checking {} mirrors for {}", checkers.len(), path.display());
    let results = run_checks(checkers, client, max_concurrent).await;

    let mut entries = BTreeMap::new();
    for check in results {
        debug!(
            "{}: status={:?} sha256={:?} error={:?}",
            check.url, check.status, check.sha256, check.error
        );
        entries.insert(check.mirror.url.clone(), check.to_status());
    }

    Ok(Snapshot {
        mirrors: entries,
        path: path.display().to_string(),
        utcnow,
    })
}

/// Run checks concurrently and wait for all of them
pub async fn run_checks(
    checkers: Vec<MirrorChecker>,
    client: &ProbeClient,
    max_concurrent: usize,
) -> Vec<MirrorCheck> {
    let semaphore = (max_concurrent > 0).then(|| Semaphore::new(max_concurrent));
    let semaphore = semaphore.as_ref();

    let checks = checkers.into_iter().map(|checker| async move {
        // The semaphore is never closed, so acquiring only waits.
        let _permit = match semaphore {
            Some(semaphore) => semaphore.acquire().await.ok(),
            None => None,
        };
        checker.check(client).await
    });

    join_all(checks).await
}
