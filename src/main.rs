// src/main.rs

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use commands::MetalinkOptions;
use repomirror::{HashAlgorithm, MetalinkFormat, RepomirrorConfig};
use tracing::debug;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the metalink, snapshot or report
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();

    let config = RepomirrorConfig::load_or_default(cli.config.as_deref())?;
    debug!("Configuration: {:?}", config);

    match cli.command {
        Commands::Metalink {
            mirror_args,
            metalink3: _,
            meta4,
            old_metalink,
            alt_max_count,
            alt_max_age,
            hashes,
            output,
        } => {
            let hashes = if hashes.is_empty() {
                config.metalink.hash_algorithms()?
            } else {
                hashes
                    .iter()
                    .map(|name| name.parse())
                    .collect::<repomirror::Result<Vec<HashAlgorithm>>>()?
            };
            let options = MetalinkOptions {
                format: if meta4 {
                    MetalinkFormat::Metalink4
                } else {
                    MetalinkFormat::Metalink3
                },
                old_metalink,
                alt_max_count: alt_max_count.unwrap_or(config.metalink.alt_max_count),
                alt_max_age: alt_max_age.unwrap_or(config.metalink.alt_max_age),
                hashes,
                output,
            };
            commands::cmd_metalink(&mirror_args, &options)
        }
        Commands::Check {
            mirror_args,
            timeout,
            max_concurrent,
            output,
        } => {
            let mut probe = config.probe;
            if let Some(timeout) = timeout {
                probe.timeout_secs = timeout;
            }
            if let Some(max_concurrent) = max_concurrent {
                probe.max_concurrent = max_concurrent;
            }
            commands::cmd_check(&mirror_args, &probe, output.as_deref())
        }
        Commands::Aggregate {
            paths,
            home_domain,
            cell_width,
        } => {
            let home_domain = home_domain.unwrap_or(config.report.home_domain);
            let cell_width = cell_width.unwrap_or(config.report.cell_width);
            commands::cmd_aggregate(&paths, &home_domain, cell_width)
        }
    }
}
