//! Keyword-based fix classifier for commit messages
//!
//! A message is labelled a fix when it contains any vocabulary term as a
//! whole word, ignoring case. "Fixed the crash" matches; "prefix" and
//! "bugfix" do not.

use regex::{Regex, RegexBuilder};

/// Default fix vocabulary.
pub const DEFAULT_FIX_KEYWORDS: &[&str] = &[
    "fix", "fixed", "bug", "crash", "error", "failure", "fault", "defect", "patch", "issue",
    "correct", "repair", "resolve",
];

/// Whole-word, case-insensitive keyword matcher.
#[derive(Debug, Clone)]
pub struct FixClassifier {
    /// `None` when the vocabulary is empty: nothing is a fix
    pattern: Option<Regex>,
}

impl FixClassifier {
    /// Build a classifier from a vocabulary. Blank terms are ignored and
    /// terms are matched literally.
    pub fn new<I, S>(keywords: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords: Vec<String> = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();

        let pattern = if keywords.is_empty() {
            None
        } else {
            let alternation = keywords
                .iter()
                .map(|k| regex::escape(k))
                .collect::<Vec<_>>()
                .join("|");
            Some(
                RegexBuilder::new(&format!(r"\b(?:{})\b", alternation))
                    .case_insensitive(true)
                    .build()?,
            )
        };

        Ok(Self { pattern })
    }

    /// Whether the message reads as a bug fix.
    pub fn is_fix(&self, message: &str) -> bool {
        self.pattern
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(message))
    }

    /// Label as written to output: 1 for a fix, 0 otherwise.
    pub fn classify(&self, message: &str) -> u8 {
        u8::from(self.is_fix(message))
    }
}

impl Default for FixClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_FIX_KEYWORDS).expect("default vocabulary is a valid pattern")
    }
}
