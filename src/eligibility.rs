/// Extensions of the source-string (`.grd`, `.grdp`) and localization
/// (`.xtb`) files that carry user-visible product names.
pub const DEFAULT_EXTENSIONS: &[&str] = &["xtb", "grd", "grdp"];

/// Decides from a file name alone whether a file is a substitution candidate.
#[derive(Debug, Clone)]
pub struct EligibilityFilter {
    extensions: Vec<String>,
}

impl Default for EligibilityFilter {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSIONS.iter().copied())
    }
}

impl EligibilityFilter {
    /// Creates a filter accepting the given extensions.
    ///
    /// Extensions are normalized the way the CLI normalizes them: surrounding
    /// whitespace and a leading dot are dropped and the result is lower-cased.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().trim().trim_start_matches('.').to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        Self { extensions }
    }

    /// Returns `true` if `filename` should be rewritten.
    ///
    /// Hidden files are never candidates. Otherwise the final dot-delimited
    /// segment of the name is compared case-insensitively; a name with no dot
    /// at all is its own final segment.
    pub fn is_candidate(&self, filename: &str) -> bool {
        if filename.starts_with('.') {
            return false;
        }

        let last = filename.rsplit('.').next().unwrap_or(filename).to_lowercase();
        self.extensions.iter().any(|e| *e == last)
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }
}
