use crate::config::ConfigLoader;
use crate::eligibility::EligibilityFilter;
use crate::errors::Result;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Walks a source tree and yields the files eligible for substitution.
///
/// The build-output directory is pruned before the walk descends into it, so
/// generated artifacts are neither read nor rewritten.
pub struct TreeScanner {
    root: PathBuf,
    excluded: Option<PathBuf>,
    filter: EligibilityFilter,
}

impl TreeScanner {
    /// Creates a scanner rooted at `root`.
    ///
    /// `build_output_dir` is interpreted relative to `root`. A path that does
    /// not name a subdirectory (empty, `.`) prunes nothing rather than the
    /// whole tree.
    pub fn new(root: &Path, build_output_dir: &Path, filter: EligibilityFilter) -> Self {
        let names_a_subdir = build_output_dir
            .components()
            .any(|c| matches!(c, Component::Normal(_)));
        Self {
            root: root.to_path_buf(),
            excluded: names_a_subdir.then(|| root.join(build_output_dir)),
            filter,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lazily walks the tree.
    ///
    /// Paths are yielded in no particular order. A fresh call re-derives the
    /// same set for an unchanged tree. Walk errors are yielded as `Err` and
    /// callers treat them as fatal.
    pub fn scan(&self) -> impl Iterator<Item = Result<PathBuf>> + '_ {
        WalkDir::new(&self.root)
            .into_iter()
            .filter_entry(|entry| self.excluded.as_deref() != Some(entry.path()))
            .filter_map(|entry| match entry {
                Ok(entry) => {
                    if !entry.file_type().is_file() {
                        return None;
                    }
                    // Lossy decoding keeps a leading dot and an ASCII extension.
                    let candidate = self.filter.is_candidate(&entry.file_name().to_string_lossy());
                    candidate.then(|| Ok(entry.into_path()))
                }
                Err(e) => Some(Err(e.into())),
            })
    }

    /// Collects every candidate, failing on the first walk error.
    pub fn collect(&self) -> Result<Vec<PathBuf>> {
        self.scan().collect()
    }
}

/// The main entry point for the `list` command.
///
/// Prints every candidate file, relative to the tree, one per line.
pub fn run_list(tree: PathBuf, config_path: Option<PathBuf>) -> Result<()> {
    let config = ConfigLoader::resolve(config_path.as_deref(), &tree)?;
    crate::orchestrator::check_sentinel(&tree, &config.sentinel)?;

    let scanner = TreeScanner::new(&tree, &config.build_output_dir, config.eligibility());
    let mut count = 0usize;
    for path in scanner.scan() {
        let path = path?;
        let relative = path.strip_prefix(&tree).unwrap_or(&path);
        println!("{}", relative.display());
        count += 1;
    }
    tracing::info!("{count} candidate files under {}", tree.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "Chrome").unwrap();
    }

    fn scanned(scanner: &TreeScanner) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = scanner
            .collect()
            .unwrap()
            .into_iter()
            .map(|p| p.strip_prefix(scanner.root()).unwrap().to_path_buf())
            .collect();
        paths.sort();
        paths
    }

    #[test]
    fn test_finds_candidates_recursively() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "chrome/app/generated_resources.grd");
        touch(dir.path(), "chrome/app/resources/generated_resources_fr.xtb");
        touch(dir.path(), "components/strings.grdp");
        touch(dir.path(), "README.md");
        touch(dir.path(), "chrome/app/.hidden.grd");

        let scanner = TreeScanner::new(dir.path(), Path::new("out"), EligibilityFilter::default());
        assert_eq!(
            scanned(&scanner),
            vec![
                PathBuf::from("chrome/app/generated_resources.grd"),
                PathBuf::from("chrome/app/resources/generated_resources_fr.xtb"),
                PathBuf::from("components/strings.grdp"),
            ]
        );
    }

    #[test]
    fn test_build_output_pruned() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "out/Default/gen/strings.grd");
        touch(dir.path(), "out/strings.xtb");
        touch(dir.path(), "ui/out/strings.grd");
        touch(dir.path(), "ui/strings.grd");

        let scanner = TreeScanner::new(dir.path(), Path::new("out"), EligibilityFilter::default());
        assert_eq!(
            scanned(&scanner),
            vec![PathBuf::from("ui/out/strings.grd"), PathBuf::from("ui/strings.grd")]
        );
    }

    #[test]
    fn test_custom_build_output_dir() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "out/strings.grd");
        touch(dir.path(), "build/release/strings.grd");

        let scanner =
            TreeScanner::new(dir.path(), Path::new("build/release"), EligibilityFilter::default());
        assert_eq!(scanned(&scanner), vec![PathBuf::from("out/strings.grd")]);
    }

    #[test]
    fn test_empty_build_output_dir_prunes_nothing() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "ok.grd");

        for excluded in ["", "."] {
            let scanner =
                TreeScanner::new(dir.path(), Path::new(excluded), EligibilityFilter::default());
            assert_eq!(scanned(&scanner), vec![PathBuf::from("ok.grd")]);
        }
    }

    #[test]
    fn test_rescan_is_deterministic() {
        let dir = TempDir::new().unwrap();
        for i in 0..20 {
            touch(dir.path(), &format!("dir{}/file{}.grd", i % 4, i));
        }

        let scanner = TreeScanner::new(dir.path(), Path::new("out"), EligibilityFilter::default());
        let first = scanned(&scanner);
        let second = scanned(&scanner);
        assert_eq!(first.len(), 20);
        assert_eq!(first, second);
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_names_are_candidates() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = TempDir::new().unwrap();
        let odd = dir.path().join(OsStr::from_bytes(b"strings_\xff.grd"));
        fs::write(&odd, "Chrome").unwrap();
        fs::write(dir.path().join(OsStr::from_bytes(b".hidden_\xff.grd")), "Chrome").unwrap();
        touch(dir.path(), "ok.grd");

        let scanner = TreeScanner::new(dir.path(), Path::new("out"), EligibilityFilter::default());
        let found = scanner.collect().unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.contains(&odd));
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let dir = TempDir::new().unwrap();
        let scanner = TreeScanner::new(
            &dir.path().join("missing"),
            Path::new("out"),
            EligibilityFilter::default(),
        );
        assert!(scanner.collect().is_err());
    }
}
