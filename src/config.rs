use crate::eligibility::{DEFAULT_EXTENSIONS, EligibilityFilter};
use crate::errors::Result;
use serde::Deserialize;
use std::env;
use std::fs::File;
use std::path::{Component, Path, PathBuf};

/// Name of the directory under `$HOME` searched for configuration files.
const HOME_CONFIG_DIR: &str = ".namesub";

/// Tool configuration, usually left at its defaults.
///
/// Loaded from YAML; every key is optional:
///
/// ```yaml
/// extensions: [xtb, grd, grdp]
/// build_output_dir: out
/// sentinel: OWNERS
/// workers: 8
/// ```
#[derive(Deserialize, Debug, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct SubstitutionConfig {
    /// Extensions of files eligible for substitution.
    pub extensions: Vec<String>,
    /// Build-output directory, relative to the tree root, that is never walked.
    pub build_output_dir: PathBuf,
    /// Marker that must exist under the tree root before any work starts.
    pub sentinel: String,
    /// Number of worker threads. `None` means one per logical CPU.
    pub workers: Option<usize>,
}

impl Default for SubstitutionConfig {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            build_output_dir: PathBuf::from("out"),
            sentinel: "OWNERS".to_string(),
            workers: None,
        }
    }
}

impl SubstitutionConfig {
    /// Builds the eligibility filter described by `extensions`.
    pub fn eligibility(&self) -> EligibilityFilter {
        EligibilityFilter::new(&self.extensions)
    }

    /// Checks values that deserialize fine but make no sense.
    pub fn validate(&self) -> Result<()> {
        if self.extensions.iter().all(|e| e.trim().trim_start_matches('.').is_empty()) {
            return Err("Config must list at least one extension".into());
        }
        if self.sentinel.trim().is_empty() {
            return Err("Config sentinel must not be empty".into());
        }
        if self.build_output_dir.is_absolute() {
            return Err(format!(
                "build_output_dir must be relative to the tree, got {}",
                self.build_output_dir.display()
            )
            .into());
        }
        let names_a_subdir = self
            .build_output_dir
            .components()
            .any(|c| matches!(c, Component::Normal(_)));
        let leaves_tree = self
            .build_output_dir
            .components()
            .any(|c| matches!(c, Component::ParentDir));
        if !names_a_subdir || leaves_tree {
            return Err(format!(
                "build_output_dir must name a directory inside the tree, got '{}'",
                self.build_output_dir.display()
            )
            .into());
        }
        if self.workers == Some(0) {
            return Err("workers must be at least 1".into());
        }
        Ok(())
    }
}

/// A utility for locating and loading configuration files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Finds the configuration file by searching in a prioritized list of locations.
    ///
    /// The search order is:
    /// 1. `config_path` as given (absolute, or relative to the current directory).
    /// 2. A path relative to the source tree.
    /// 3. Inside the `~/.namesub` directory.
    pub fn find_config(config_path: &Path, tree: &Path) -> Result<PathBuf> {
        if config_path.exists() {
            return Ok(config_path.to_path_buf());
        }

        let mut tried_locations = vec![config_path.display().to_string()];

        if config_path.is_relative() {
            let in_tree = tree.join(config_path);
            if in_tree.exists() {
                return Ok(in_tree);
            }
            tried_locations.push(in_tree.display().to_string());

            if let Some(home) = env::var_os("HOME") {
                let home_config = PathBuf::from(home).join(HOME_CONFIG_DIR).join(config_path);
                if home_config.exists() {
                    return Ok(home_config);
                }
                tried_locations.push(home_config.display().to_string());
            }
        }

        Err(format!(
            "Config file '{}' not found. Searched in:\n  - {}",
            config_path.display(),
            tried_locations.join("\n  - ")
        )
        .into())
    }

    /// Loads and validates a `SubstitutionConfig` from a YAML file.
    pub fn load(path: &Path) -> Result<SubstitutionConfig> {
        let file = File::open(path).map_err(|e| crate::Error::file_io(path, e))?;
        let config: SubstitutionConfig = serde_yaml::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolves the effective configuration for a run.
    ///
    /// Without an explicit path the built-in defaults are used.
    pub fn resolve(config_path: Option<&Path>, tree: &Path) -> Result<SubstitutionConfig> {
        match config_path {
            Some(path) => {
                let resolved = Self::find_config(path, tree)?;
                tracing::info!("Using config file: {}", resolved.display());
                Self::load(&resolved)
            }
            None => Ok(SubstitutionConfig::default()),
        }
    }
}
