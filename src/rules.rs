//! The ordered text-rewriting pipeline.
//!
//! Rules are not independent: the protection rules tag phrases with a marker
//! so the global replacement cannot touch them, and the cleanup rules remove
//! the marker again afterwards. Reordering the list changes the output.

use crate::errors::{Error, Result};
use regex::Regex;
use std::borrow::Cow;

/// Brand name every product mention is rewritten to.
pub const NEW_BRAND: &str = "Helium";

/// Suffix appended to a word to hide it from the main replacement rule.
pub const PROTECTION_MARKER: &str = "_unreplace";

/// Word characters: letters, digits and underscore. Unlike the regex crate's
/// `\w`, combining marks are not word characters, so `Chromium\u{301}` still
/// ends at the mark.
const WORD: &str = r"[\p{L}\p{N}_]";
const NON_WORD: &str = r"[^\p{L}\p{N}_]";

/// A single step of the rewriting pipeline.
pub trait TextRule: Send + Sync {
    /// A short identifier used in logs and error messages.
    fn name(&self) -> &str;

    /// Rewrites the whole buffer. Returns `Cow::Borrowed` when nothing matched.
    fn apply<'t>(&self, text: &'t str) -> Cow<'t, str>;
}

/// A rule backed by a regex and a replacement template (`${1}` style captures).
pub struct RegexRule {
    name: String,
    regex: Regex,
    replacement: String,
}

impl RegexRule {
    pub fn new(name: &str, pattern: &str, replacement: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|source| Error::Regex {
            rule: name.to_string(),
            source,
        })?;
        Ok(Self {
            name: name.to_string(),
            regex,
            replacement: replacement.to_string(),
        })
    }
}

impl TextRule for RegexRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        self.regex.replace_all(text, self.replacement.as_str())
    }
}

/// Fixed (input, expected output) pairs the built-in rules must satisfy.
pub const SELF_CHECK_CASES: &[(&str, &str)] = &[
    ("Chrome Root Program", "Chrome Root Program"),
    ("Chrome Web Store", "Chrome Web Store"),
    ("Chromium Web Store", "Chromium Web Store"),
    ("Chrome Remote Desktop", "Chrome Remote Desktop"),
    ("Google Chrome", "Helium"),
    ("Chrome Google Chrome Chrome Chromium", "Helium Helium Helium Helium"),
    ("Chrome", "Helium"),
    ("Chromium", "Helium"),
];

/// An ordered list of rules applied one after another to a buffer.
pub struct RuleSet {
    rules: Vec<Box<dyn TextRule>>,
}

impl RuleSet {
    pub fn new(rules: Vec<Box<dyn TextRule>>) -> Self {
        Self { rules }
    }

    /// Builds the brand substitution pipeline.
    ///
    /// The `regex` crate has no look-ahead, so "not followed by a word
    /// character" in the main rule is written as consuming one non-word
    /// character (or the end of input) and putting it back. Every match
    /// starts with a word character, so the consumed character is never the
    /// start of the next match.
    pub fn builtin() -> Result<Self> {
        let specs: Vec<(&str, String, String)> = vec![
            // Phrases that keep the original product name.
            (
                "protect-root-program",
                format!("({WORD}+) Root Program"),
                format!("${{1}}{PROTECTION_MARKER} Root Program"),
            ),
            (
                "protect-web-store",
                format!("({WORD}+) Web( S|s)tore"),
                format!("${{1}}{PROTECTION_MARKER} Web Store"),
            ),
            (
                "protect-remote-desktop",
                format!("({WORD}+) Remote Desktop"),
                format!("${{1}}{PROTECTION_MARKER} Remote Desktop"),
            ),
            (
                "protect-chromium-link",
                r#"("BEGIN_LINK_CHROMIUM")(.*?Chromium)(.*?<ph name="END_LINK_CHROMIUM")"#.to_string(),
                format!("${{1}}${{2}}{PROTECTION_MARKER}${{3}}"),
            ),
            (
                "replace-product-name",
                format!("(?:Google )?Chrom(?:e|ium)({NON_WORD}|$)"),
                format!("{NEW_BRAND}${{1}}"),
            ),
            // A protected name that still reads as the product keeps its
            // original spelling, then any leftover marker goes away.
            (
                "unprotect-product-name",
                format!("((?:Google )?Chrom(e|ium)){PROTECTION_MARKER}"),
                "${1}".to_string(),
            ),
            ("strip-marker", PROTECTION_MARKER.to_string(), String::new()),
        ];

        let rules = specs
            .iter()
            .map(|(name, pattern, replacement)| {
                RegexRule::new(name, pattern, replacement).map(|r| Box::new(r) as Box<dyn TextRule>)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::new(rules))
    }

    /// Runs every rule in declaration order over the whole buffer.
    pub fn apply<'t>(&self, input: &'t str) -> Cow<'t, str> {
        let mut text = Cow::Borrowed(input);
        for rule in &self.rules {
            let rewritten = match rule.apply(&text) {
                Cow::Owned(s) => Some(s),
                Cow::Borrowed(_) => None,
            };
            if let Some(s) = rewritten {
                tracing::trace!(rule = rule.name(), "rule rewrote buffer");
                text = Cow::Owned(s);
            }
        }
        text
    }

    /// Checks the rule set against `SELF_CHECK_CASES`.
    ///
    /// Must be called before any file in the tree is touched.
    pub fn self_check(&self) -> Result<()> {
        self.check_cases(SELF_CHECK_CASES)
    }

    pub fn check_cases(&self, cases: &[(&str, &str)]) -> Result<()> {
        for (input, expected) in cases {
            let actual = self.apply(input);
            if actual != *expected {
                return Err(Error::SelfCheck {
                    input: input.to_string(),
                    expected: expected.to_string(),
                    actual: actual.into_owned(),
                });
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.name())
    }
}
