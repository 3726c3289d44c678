// src/cli/mod.rs
//! CLI definitions for repomirror
//!
//! This module contains the command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.
//!
//! - `metalink` - Generate a metalink for a `repomd.xml`
//! - `check` - Probe all mirrors and emit a JSON snapshot
//! - `aggregate` - Combine snapshots into a freshness report

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "repomirror")]
#[command(author = "Repomirror Contributors")]
#[command(version)]
#[command(about = "Simple mirror manager for yum repositories", long_about = None)]
pub struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Arguments shared by commands that work on one file across mirrors
#[derive(Args, Debug, Clone)]
pub struct MirrorArgs {
    /// Base directory for repositories
    #[arg(short, long, visible_alias = "cwd", value_name = "PATH", default_value = ".")]
    pub base: PathBuf,

    /// File to read the mirror list from
    #[arg(value_name = "MIRRORLIST")]
    pub mirrors: PathBuf,

    /// Path to repomd.xml
    #[arg(value_name = "REPOMD")]
    pub repomd: PathBuf,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a metalink for repomd.xml
    Metalink {
        #[command(flatten)]
        mirror_args: MirrorArgs,

        /// Emit Metalink 3.0 with alternates (default)
        #[arg(short = '3', long = "metalink", conflicts_with = "meta4")]
        metalink3: bool,

        /// Emit RFC 5854 Metalink 4 (no alternates)
        #[arg(short = '4', long)]
        meta4: bool,

        /// Load alternates from the previous metalink
        #[arg(long, visible_alias = "alternates-from", value_name = "METALINK")]
        old_metalink: Option<PathBuf>,

        /// Maximum count of alternates, not including main file; 0 to disable
        #[arg(long, value_name = "COUNT")]
        alt_max_count: Option<usize>,

        /// Maximum age of alternates, as seconds between main file and alternate; 0 to disable
        #[arg(long, value_name = "SECONDS")]
        alt_max_age: Option<u64>,

        /// Hash with this algorithm; can be repeated
        #[arg(short = 'H', long = "hash", value_name = "ALGO")]
        hashes: Vec<String>,

        /// Write to this file instead of standard output
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Check all mirrors and emit a JSON snapshot
    Check {
        #[command(flatten)]
        mirror_args: MirrorArgs,

        /// Per-request timeout in seconds; 0 for none
        #[arg(long, value_name = "SECONDS")]
        timeout: Option<u64>,

        /// Maximum concurrent requests; 0 for one per mirror
        #[arg(long, value_name = "N")]
        max_concurrent: Option<usize>,

        /// Write to this file instead of standard output
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Aggregate snapshots into a report
    Aggregate {
        /// Path to snapshot JSON files
        #[arg(value_name = "RESULT", required = true)]
        paths: Vec<PathBuf>,

        /// Mirrors under this domain are listed first
        #[arg(long, value_name = "DOMAIN")]
        home_domain: Option<String>,

        /// Width of a table cell
        #[arg(long, value_name = "N")]
        cell_width: Option<usize>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_metalink_args() {
        let cli = Cli::parse_from([
            "repomirror",
            "metalink",
            "-b",
            "/srv/yum",
            "mirrors.list",
            "r4.0/repodata/repomd.xml",
            "-4",
            "-H",
            "sha256",
            "-H",
            "sha512",
        ]);
        match cli.command {
            Commands::Metalink {
                mirror_args,
                meta4,
                metalink3,
                hashes,
                ..
            } => {
                assert_eq!(mirror_args.base, PathBuf::from("/srv/yum"));
                assert_eq!(mirror_args.repomd, PathBuf::from("r4.0/repodata/repomd.xml"));
                assert!(meta4);
                assert!(!metalink3);
                assert_eq!(hashes, vec!["sha256", "sha512"]);
            }
            _ => panic!("expected metalink command"),
        }
    }

    #[test]
    fn test_metalink_formats_conflict() {
        let result = Cli::try_parse_from(["repomirror", "metalink", "m", "r", "-3", "-4"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_aggregate_requires_paths() {
        assert!(Cli::try_parse_from(["repomirror", "aggregate"]).is_err());
    }
}
