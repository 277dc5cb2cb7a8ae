//! The main entry point for the `namesub` command-line application.
//!
//! Parses arguments, installs logging and dispatches to the run mode handler
//! in the `namesub` library.

use anyhow::{Context, Result};
use namesub::cli::{self, Commands};
use namesub::{orchestrator, restorer, scanner};
use tracing::Level;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = cli::parse_args();

    let level = match args.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Commands::Substitute {
            tree,
            backup_path,
            config,
            dry_run,
            workers,
            progress,
            format,
        } => {
            let display = tree.display().to_string();
            orchestrator::run_substitute(
                tree,
                backup_path,
                config,
                dry_run,
                workers,
                progress,
                format,
            )
            .with_context(|| format!("substitution in {display} failed"))
        }
        Commands::Unsubstitute {
            tree,
            backup_path,
            config,
            format,
        } => {
            let display = tree.display().to_string();
            restorer::run_unsubstitute(tree, backup_path, config, format)
                .with_context(|| format!("restoring {display} failed"))
        }
        Commands::List { tree, config } => {
            let display = tree.display().to_string();
            scanner::run_list(tree, config)
                .with_context(|| format!("listing candidates in {display} failed"))
        }
    }
}
