// src/commands/metalink.rs

//! Metalink generation command

use super::write_output;
use crate::cli::MirrorArgs;
use anyhow::{Context, Result};
use chrono::Utc;
use repomirror::repository::{read_mirrors, urls_for_mirrors};
use repomirror::{HashAlgorithm, MetalinkDocument, MetalinkFormat, RepoMd};
use std::path::PathBuf;
use tracing::info;

/// Settings for one metalink generation, after merging CLI and config file
#[derive(Debug, Clone)]
pub struct MetalinkOptions {
    pub format: MetalinkFormat,
    pub old_metalink: Option<PathBuf>,
    pub alt_max_count: usize,
    pub alt_max_age: u64,
    pub hashes: Vec<HashAlgorithm>,
    pub output: Option<PathBuf>,
}

/// Generate a metalink for the descriptor named in `args`
pub fn cmd_metalink(args: &MirrorArgs, options: &MetalinkOptions) -> Result<()> {
    let mirrors = read_mirrors(&args.mirrors)?;
    let mut repomd = RepoMd::load(&args.repomd)?;

    if let Some(old) = &options.old_metalink {
        repomd
            .load_alternates(old, options.alt_max_count, options.alt_max_age)
            .with_context(|| format!("Failed to load alternates from {}", old.display()))?;
    }

    let urls: Vec<String> = urls_for_mirrors(&args.repomd, &args.base, &mirrors).collect();
    info!(
        "{} of {} mirrors carry {}",
        urls.len(),
        mirrors.len(),
        args.repomd.display()
    );

    let doc = MetalinkDocument::assemble(&repomd, &options.hashes, urls, Utc::now())?;
    write_output(options.output.as_deref(), &options.format.render(&doc))
}
