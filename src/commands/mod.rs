// src/commands/mod.rs
//! Command handlers for the repomirror CLI

mod aggregate;
mod check;
mod metalink;

pub use aggregate::cmd_aggregate;
pub use check::cmd_check;
pub use metalink::{cmd_metalink, MetalinkOptions};

use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

/// Write command output to `path`, or to standard output
pub(crate) fn write_output(path: Option<&Path>, text: &str) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, text)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(text.as_bytes())
                .and_then(|()| stdout.flush())
                .context("Failed to write to standard output")
        }
    }
}
