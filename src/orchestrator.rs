//! Fans the file transformer out over every candidate in a tree.

use crate::archive::SnapshotArchive;
use crate::config::ConfigLoader;
use crate::errors::{Error, Result};
use crate::report::{Report, ReportFormat, RunSummary};
use crate::rules::RuleSet;
use crate::scanner::TreeScanner;
use crate::transformer::{FileTransformer, TransformOptions};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Settings for one substitution run.
#[derive(Debug, Clone, Default)]
pub struct SubstituteOptions {
    /// Where to write the snapshot archive. `None` makes the run irreversible.
    pub backup_path: Option<PathBuf>,
    pub dry_run: bool,
    /// Worker threads; defaults to one per logical CPU.
    pub workers: Option<usize>,
    pub progress: bool,
}

/// Fails unless `root` carries the sentinel marker of the expected tree.
pub fn check_sentinel(root: &Path, sentinel: &str) -> Result<()> {
    if root.join(sentinel).exists() {
        Ok(())
    } else {
        Err(Error::WrongTree {
            root: root.to_path_buf(),
            sentinel: sentinel.to_string(),
        })
    }
}

/// Runs the transformer over every path the scanner yields.
///
/// Work is spread over a Rayon pool. The first failing file stops further
/// scheduling and its error is returned once in-flight files are done. The
/// archive is finished in every case so originals of files already rewritten
/// stay recoverable.
pub fn substitute_tree(
    scanner: &TreeScanner,
    rules: &RuleSet,
    options: &SubstituteOptions,
) -> Result<RunSummary> {
    let files = scanner.collect()?;
    tracing::debug!("Found {} candidate files", files.len());

    let archive = if options.dry_run {
        SnapshotArchive::disabled()
    } else {
        SnapshotArchive::for_backup_path(options.backup_path.as_deref())?
    };

    let transformer = FileTransformer::new(
        scanner.root(),
        rules,
        TransformOptions {
            dry_run: options.dry_run,
        },
    );

    let processed = AtomicUsize::new(0);
    let changed = AtomicUsize::new(0);

    let pb = if options.progress {
        let pb = ProgressBar::new(files.len() as u64);
        if let Ok(style) =
            ProgressStyle::default_bar().template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("##-"));
        }
        pb
    } else {
        ProgressBar::hidden()
    };

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.workers.unwrap_or_else(num_cpus::get))
        .build()?;

    let outcome = pool.install(|| {
        files.par_iter().try_for_each(|path| -> Result<()> {
            let result = transformer.transform(path, &archive)?;
            processed.fetch_add(1, Ordering::Relaxed);
            if result.is_rewritten() {
                changed.fetch_add(1, Ordering::Relaxed);
            }
            pb.inc(1);
            Ok(())
        })
    });

    let archived = archive.finish();
    pb.finish_and_clear();

    outcome?;
    let files_archived = archived?;

    Ok(RunSummary {
        files_scanned: processed.load(Ordering::Relaxed),
        files_changed: changed.load(Ordering::Relaxed),
        files_archived,
        backup_path: options.backup_path.clone().filter(|_| !options.dry_run),
        dry_run: options.dry_run,
    })
}

/// The main entry point for the `substitute` command.
///
/// Preconditions are checked in order before any file is touched: the rule
/// self-check, the tree sentinel, then the backup path.
pub fn run_substitute(
    tree: PathBuf,
    backup_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
    dry_run: bool,
    workers: Option<usize>,
    progress: bool,
    format: ReportFormat,
) -> Result<()> {
    let rules = RuleSet::builtin()?;
    rules.self_check()?;

    let config = ConfigLoader::resolve(config_path.as_deref(), &tree)?;
    check_sentinel(&tree, &config.sentinel)?;

    if let Some(path) = &backup_path {
        if path.exists() {
            return Err(Error::BackupExists(path.clone()));
        }
    }
    if dry_run && backup_path.is_some() {
        tracing::warn!("--dry-run set, no backup archive will be written");
    }

    let scanner = TreeScanner::new(&tree, &config.build_output_dir, config.eligibility());
    let options = SubstituteOptions {
        backup_path,
        dry_run,
        workers: workers.or(config.workers),
        progress,
    };

    tracing::info!("Substituting names under {}", tree.display());
    let summary = substitute_tree(&scanner, &rules, &options)?;
    summary.write_report(&mut std::io::stdout(), format)
}
