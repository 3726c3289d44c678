// src/commands/aggregate.rs

//! Snapshot aggregation command

use super::write_output;
use anyhow::Result;
use repomirror::{Report, Snapshot};
use std::path::PathBuf;

/// Load snapshots and print the freshness report
pub fn cmd_aggregate(paths: &[PathBuf], home_domain: &str, cell_width: usize) -> Result<()> {
    let checks = paths
        .iter()
        .map(|path| Snapshot::load(path))
        .collect::<repomirror::Result<Vec<_>>>()?;

    let report = Report::new(checks, home_domain)?;
    write_output(None, &report.render(cell_width))
}
