// src/commands/check.rs

//! Mirror check command

use super::write_output;
use crate::cli::MirrorArgs;
use anyhow::{Context, Result};
use repomirror::repository::read_mirrors;
use repomirror::{check_mirrors, ProbeClient, ProbeConfig};
use std::path::Path;
use tracing::info;

/// Probe every mirror for the descriptor named in `args` and write a snapshot
pub fn cmd_check(args: &MirrorArgs, config: &ProbeConfig, output: Option<&Path>) -> Result<()> {
    let mirrors = read_mirrors(&args.mirrors)?;
    let client = ProbeClient::new(config)?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let snapshot = rt.block_on(check_mirrors(
        &args.repomd,
        &args.base,
        &mirrors,
        &client,
        config.max_concurrent,
    ))?;

    let failed = snapshot
        .mirrors
        .values()
        .filter(|m| m.error.is_some() || m.is_http_failure())
        .count();
    info!("Checked {} mirrors, {} failed", snapshot.mirrors.len(), failed);

    write_output(output, &snapshot.to_json()?)
}
