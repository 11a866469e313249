//! Skill vocabulary: canonical labels mapped to surface-form patterns.
//!
//! Extraction is deliberately simple dictionary matching, not a statistical
//! model. The vocabulary lives in a YAML file so it can grow without code
//! changes; a built-in set covers fresh checkouts with no config directory.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::path::Path;

use regex::Regex;
use serde::Deserialize;

use crate::ConfigError;

/// On-disk vocabulary shape: canonical label → surface forms.
///
/// ```yaml
/// skills:
///   Python: ["python"]
///   AWS: ["aws", "amazon web services"]
/// ```
#[derive(Debug, Deserialize)]
pub struct VocabularyFile {
    pub skills: BTreeMap<String, Vec<String>>,
}

#[derive(Debug)]
struct SkillMatcher {
    label: String,
    pattern: Regex,
}

/// Compiled skill lexicon. Each label gets one case-insensitive,
/// word-boundary regex over its surface forms, so `R` matches the
/// standalone token but never the `R` inside `Research` or `Car`.
#[derive(Debug)]
pub struct SkillVocabulary {
    matchers: Vec<SkillMatcher>,
}

impl SkillVocabulary {
    /// Compile a vocabulary from `(label, surface forms)` entries.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if a label is empty, has no
    /// surface forms, or a surface form is empty.
    pub fn from_entries<I>(entries: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, Vec<String>)>,
    {
        let mut matchers = Vec::new();
        for (label, forms) in entries {
            if label.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "skill label must be non-empty".to_string(),
                ));
            }
            if forms.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "skill '{label}' has no surface forms"
                )));
            }
            if forms.iter().any(|f| f.trim().is_empty()) {
                return Err(ConfigError::Validation(format!(
                    "skill '{label}' has an empty surface form"
                )));
            }

            let alternation = forms
                .iter()
                .map(|f| regex::escape(f.trim()))
                .collect::<Vec<_>>()
                .join("|");
            let source = format!(r"(?i)\b(?:{alternation})\b");
            let pattern = Regex::new(&source).map_err(|e| {
                ConfigError::Validation(format!("skill '{label}' pattern failed to compile: {e}"))
            })?;

            matchers.push(SkillMatcher { label, pattern });
        }

        Ok(Self { matchers })
    }

    /// Load and compile a vocabulary from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::VocabularyIo`] if the file cannot be read,
    /// [`ConfigError::VocabularyParse`] if it is not valid YAML, or
    /// [`ConfigError::Validation`] if an entry is malformed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::VocabularyIo {
            path: path.display().to_string(),
            source: e,
        })?;
        let file: VocabularyFile = serde_yaml::from_str(&content)?;
        Self::from_entries(file.skills)
    }

    /// Load from `path` when the file exists, otherwise fall back to the
    /// built-in vocabulary.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` only when the file exists but fails to load.
    pub fn load_or_builtin(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::builtin())
        }
    }

    /// The default lexicon used when no vocabulary file is configured.
    #[must_use]
    pub fn builtin() -> Self {
        let entries = [
            ("AWS", &["aws", "amazon web services"][..]),
            ("CI", &["ci", "continuous integration"]),
            ("Docker", &["docker"]),
            ("FastAPI", &["fastapi"]),
            ("Go", &["go", "golang"]),
            ("GraphQL", &["graphql"]),
            ("Java", &["java"]),
            ("JavaScript", &["javascript"]),
            ("Kubernetes", &["kubernetes", "k8s"]),
            ("Pandas", &["pandas"]),
            ("PostgreSQL", &["postgres", "postgresql"]),
            ("Python", &["python"]),
            ("R", &["r"]),
            ("React", &["react"]),
            ("Rust", &["rust"]),
            ("SQL", &["sql"]),
            ("Terraform", &["terraform"]),
            ("TypeScript", &["typescript"]),
            ("pytest", &["pytest"]),
            ("scikit-learn", &["scikit-learn", "scikit learn", "sklearn"]),
        ]
        .into_iter()
        .map(|(label, forms)| {
            (
                label.to_string(),
                forms.iter().map(|f| (*f).to_string()).collect(),
            )
        });
        Self::from_entries(entries).expect("built-in vocabulary always compiles")
    }

    /// Scan `text` and return the set of matched canonical labels.
    ///
    /// Returns an empty set for empty or skill-free text. The result is a
    /// set: repeated mentions of the same skill collapse to one label.
    #[must_use]
    pub fn extract(&self, text: &str) -> BTreeSet<String> {
        if text.is_empty() {
            return BTreeSet::new();
        }
        self.matchers
            .iter()
            .filter(|m| m.pattern.is_match(text))
            .map(|m| m.label.clone())
            .collect()
    }

    /// Canonical labels in this vocabulary, in insertion order.
    #[must_use]
    pub fn labels(&self) -> Vec<&str> {
        self.matchers.iter().map(|m| m.label.as_str()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}
