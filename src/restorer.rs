use crate::config::ConfigLoader;
use crate::errors::{Error, Result};
use crate::orchestrator::check_sentinel;
use crate::report::{Report, ReportFormat, RestoreSummary};
use crate::rules::RuleSet;
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Extracts every entry of a snapshot archive over `root`, then deletes it.
///
/// The archive is trusted: entries overwrite whatever is in the tree. The
/// `tar` crate still refuses entries that would land outside `root`; such an
/// entry fails the restore like any other extraction error. A failure partway
/// leaves the tree partially restored and the archive in place.
pub fn restore(root: &Path, archive_path: &Path) -> Result<RestoreSummary> {
    if !archive_path.is_file() {
        return Err(Error::MissingArchive(archive_path.to_path_buf()));
    }

    let file = File::open(archive_path).map_err(|e| Error::file_io(archive_path, e))?;
    let mut archive = tar::Archive::new(GzDecoder::new(file));
    archive.set_preserve_permissions(true);
    archive.set_preserve_mtime(true);
    archive.set_overwrite(true);

    let restore_err = |source: std::io::Error| Error::Restore {
        archive: archive_path.to_path_buf(),
        source,
    };

    let mut restored = 0usize;
    for entry in archive.entries().map_err(restore_err)? {
        let mut entry = entry.map_err(restore_err)?;
        let relative = entry.path().map_err(restore_err)?.into_owned();

        if !entry.unpack_in(root).map_err(restore_err)? {
            return Err(restore_err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("refused to extract {} outside {}", relative.display(), root.display()),
            )));
        }
        tracing::info!("Restored {}", relative.display());
        restored += 1;
    }

    fs::remove_file(archive_path).map_err(|e| Error::file_io(archive_path, e))?;
    tracing::debug!("Removed {}", archive_path.display());

    Ok(RestoreSummary {
        files_restored: restored,
        backup_path: archive_path.to_path_buf(),
    })
}

/// The main entry point for the `unsubstitute` command.
pub fn run_unsubstitute(
    tree: PathBuf,
    backup_path: PathBuf,
    config_path: Option<PathBuf>,
    format: ReportFormat,
) -> Result<()> {
    RuleSet::builtin()?.self_check()?;

    let config = ConfigLoader::resolve(config_path.as_deref(), &tree)?;
    check_sentinel(&tree, &config.sentinel)?;

    tracing::info!(
        "Restoring {} from {}",
        tree.display(),
        backup_path.display()
    );
    let summary = restore(&tree, &backup_path)?;
    summary.write_report(&mut std::io::stdout(), format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::SnapshotArchive;
    use tempfile::TempDir;

    fn archive_of(root: &Path, archive_path: &Path, files: &[(&str, &str)]) {
        let archive = SnapshotArchive::create(archive_path).unwrap();
        for (rel, body) in files {
            let path = root.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, body).unwrap();
            let meta = fs::metadata(&path).unwrap();
            archive.add_entry(Path::new(rel), body.as_bytes(), &meta).unwrap();
        }
        archive.finish().unwrap();
    }

    #[test]
    fn test_restore_overwrites_and_removes_archive() {
        let tree = TempDir::new().unwrap();
        let backup = tree.path().join("backup.tar.gz");
        archive_of(
            tree.path(),
            &backup,
            &[("a/strings.grd", "Google Chrome"), ("b/strings.xtb", "Chromium")],
        );
        fs::write(tree.path().join("a/strings.grd"), "Helium").unwrap();
        fs::write(tree.path().join("b/strings.xtb"), "Helium").unwrap();

        let summary = restore(tree.path(), &backup).unwrap();

        assert_eq!(summary.files_restored, 2);
        assert_eq!(
            fs::read_to_string(tree.path().join("a/strings.grd")).unwrap(),
            "Google Chrome"
        );
        assert_eq!(fs::read_to_string(tree.path().join("b/strings.xtb")).unwrap(), "Chromium");
        assert!(!backup.exists());
    }

    #[test]
    fn test_restore_recreates_deleted_files() {
        let tree = TempDir::new().unwrap();
        let backup = tree.path().join("backup.tar.gz");
        archive_of(tree.path(), &backup, &[("deep/dir/strings.grd", "Chrome")]);
        fs::remove_dir_all(tree.path().join("deep")).unwrap();

        restore(tree.path(), &backup).unwrap();
        assert_eq!(
            fs::read_to_string(tree.path().join("deep/dir/strings.grd")).unwrap(),
            "Chrome"
        );
    }

    #[test]
    fn test_missing_archive() {
        let tree = TempDir::new().unwrap();
        let err = restore(tree.path(), &tree.path().join("nope.tar.gz")).unwrap_err();
        assert!(matches!(err, Error::MissingArchive(_)));
    }

    #[test]
    fn test_corrupt_archive_is_fatal_and_kept() {
        let tree = TempDir::new().unwrap();
        let backup = tree.path().join("backup.tar.gz");
        fs::write(&backup, "definitely not gzip").unwrap();

        let err = restore(tree.path(), &backup).unwrap_err();
        assert!(matches!(err, Error::Restore { .. }));
        assert!(backup.exists());
    }

    #[test]
    fn test_refused_entry_is_fatal_and_archive_kept() {
        use flate2::Compression;
        use flate2::write::GzEncoder;

        let tree = TempDir::new().unwrap();
        let backup = tree.path().join("backup.tar.gz");

        // The builder refuses `..` in paths, so write the name into the header directly.
        let mut builder = tar::Builder::new(GzEncoder::new(
            File::create(&backup).unwrap(),
            Compression::default(),
        ));
        let body = b"Chrome";
        let mut header = tar::Header::new_gnu();
        header.as_gnu_mut().unwrap().name[..16].copy_from_slice(b"../escaped.grd\0\0");
        header.set_mode(0o644);
        header.set_size(body.len() as u64);
        header.set_entry_type(tar::EntryType::Regular);
        header.set_cksum();
        builder.append(&header, &body[..]).unwrap();
        builder.into_inner().unwrap().finish().unwrap();

        let err = restore(tree.path(), &backup).unwrap_err();
        assert!(matches!(err, Error::Restore { .. }));
        assert!(backup.exists());
    }

    #[test]
    fn test_unsubstitute_requires_sentinel() {
        let tree = TempDir::new().unwrap();
        let backup = tree.path().join("backup.tar.gz");
        archive_of(tree.path(), &backup, &[("strings.grd", "Chrome")]);

        let err = run_unsubstitute(
            tree.path().to_path_buf(),
            backup.clone(),
            None,
            ReportFormat::Text,
        )
        .unwrap_err();
        assert!(matches!(err, Error::WrongTree { .. }));
        assert!(backup.exists());
    }
}
