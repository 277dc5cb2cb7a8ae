use crate::report::ReportFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Reversible brand-name substitution for large source trees.
///
/// `namesub` rewrites product names in source-string and localization files
/// and can record the originals in a `.tar.gz` snapshot so the whole run can
/// be undone later.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Reversible brand-name substitution for large source trees",
    long_about = "namesub - rewrite product names across a source tree, reversibly.

Only source-string (.grd, .grdp) and localization (.xtb) files are touched.
The build-output directory (out/) is never walked.

QUICK EXAMPLES:
  namesub substitute -t src --backup-path names.tar.gz   # Rewrite, keep originals
  namesub substitute -t src --dry-run                    # Preview changed files
  namesub unsubstitute -t src --backup-path names.tar.gz # Undo a previous run
  namesub list -t src                                    # Show candidate files"
)]
pub struct Args {
    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` also applies.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// The run modes. Exactly one is chosen per invocation.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replace product names in every candidate file
    ///
    /// EXAMPLES:
    ///   namesub substitute -t src --backup-path names.tar.gz
    ///   namesub substitute -t src --dry-run --format json
    ///
    /// Without --backup-path the run cannot be undone.
    #[command(visible_alias = "sub")]
    Substitute {
        /// Root of the source tree.
        #[arg(short = 't', long = "tree", required = true)]
        tree: PathBuf,

        /// Where to write the snapshot of original files. Must not exist yet.
        #[arg(long, value_name = "TARBALL")]
        backup_path: Option<PathBuf>,

        /// Path to a YAML configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Report the files that would change without modifying anything.
        #[arg(long)]
        dry_run: bool,

        /// The number of parallel worker threads. Defaults to the number of logical CPU cores.
        #[arg(short, long, env = "NAMESUB_WORKERS")]
        workers: Option<usize>,

        /// Show a progress bar.
        #[arg(long)]
        progress: bool,

        /// Format of the final summary.
        #[arg(short, long, value_enum, default_value = "text")]
        format: ReportFormat,
    },

    /// Restore original files from a snapshot and delete it
    ///
    /// EXAMPLES:
    ///   namesub unsubstitute -t src --backup-path names.tar.gz
    #[command(visible_alias = "unsub")]
    Unsubstitute {
        /// Root of the source tree.
        #[arg(short = 't', long = "tree", required = true)]
        tree: PathBuf,

        /// Snapshot written by a previous `substitute` run.
        #[arg(long, value_name = "TARBALL", required = true)]
        backup_path: PathBuf,

        /// Path to a YAML configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Format of the final summary.
        #[arg(short, long, value_enum, default_value = "text")]
        format: ReportFormat,
    },

    /// List the files that are substitution candidates
    List {
        /// Root of the source tree.
        #[arg(short = 't', long = "tree", required = true)]
        tree: PathBuf,

        /// Path to a YAML configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// Parses command-line arguments and returns the populated `Args` struct.
pub fn parse_args() -> Args {
    Args::parse()
}
