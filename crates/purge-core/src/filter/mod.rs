//! Filters describing which paths to delete.

pub mod pattern;

use anyhow::Context;
use serde::{Deserialize, Serialize};

pub use pattern::WildcardPattern;

fn default_recursive() -> bool {
    true
}

/// One user filter. Each filter resolves into exactly one path stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    pattern: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    exclusions: Vec<String>,
    #[serde(default = "default_recursive")]
    recursive: bool,
    #[serde(default)]
    include_dependencies: bool,
    #[serde(default)]
    exclude_artifacts: bool,
}

impl FilterSpec {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            exclusions: Vec::new(),
            recursive: default_recursive(),
            include_dependencies: false,
            exclude_artifacts: false,
        }
    }

    pub fn with_exclusions<I, P>(mut self, exclusions: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        self.exclusions.extend(exclusions.into_iter().map(Into::into));
        self
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn include_dependencies(mut self, include: bool) -> Self {
        self.include_dependencies = include;
        self
    }

    pub fn exclude_artifacts(mut self, exclude: bool) -> Self {
        self.exclude_artifacts = exclude;
        self
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn exclusions(&self) -> &[String] {
        &self.exclusions
    }

    pub fn is_recursive(&self) -> bool {
        self.recursive
    }

    pub fn includes_dependencies(&self) -> bool {
        self.include_dependencies
    }

    pub fn excludes_artifacts(&self) -> bool {
        self.exclude_artifacts
    }

    /// Compile the pattern and its exclusions.
    pub fn matcher(&self) -> anyhow::Result<FilterMatcher> {
        if self.pattern.trim().trim_matches('/').is_empty() {
            anyhow::bail!("Empty delete pattern");
        }
        let include = WildcardPattern::compile(&self.pattern, self.recursive)
            .with_context(|| format!("Invalid pattern: {}", self.pattern))?;
        // exclusions always match at any depth
        let exclusions = self
            .exclusions
            .iter()
            .map(|raw| {
                WildcardPattern::compile(raw, true)
                    .with_context(|| format!("Invalid exclusion: {raw}"))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(FilterMatcher {
            include,
            exclusions,
        })
    }
}

/// Compiled form of a [`FilterSpec`].
#[derive(Debug, Clone)]
pub struct FilterMatcher {
    include: WildcardPattern,
    exclusions: Vec<WildcardPattern>,
}

impl FilterMatcher {
    pub fn matches(&self, path: &str) -> bool {
        self.include.is_match(path) && !self.is_excluded(path)
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        self.exclusions.iter().any(|pattern| pattern.is_match(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let filter = FilterSpec::new("repo/*");
        assert!(filter.is_recursive());
        assert!(!filter.includes_dependencies());
        assert!(!filter.excludes_artifacts());
        assert!(filter.exclusions().is_empty());
    }

    #[test]
    fn exclusions_remove_matches() {
        let matcher = FilterSpec::new("repo/*")
            .with_exclusions(["*.pom", "repo/keep/"])
            .matcher()
            .unwrap();
        assert!(matcher.matches("repo/a.jar"));
        assert!(!matcher.matches("repo/a.pom"));
        assert!(!matcher.matches("repo/keep/x.jar"));
        assert!(matcher.matches("repo/keep"));
    }

    #[test]
    fn non_recursive_stays_at_one_level() {
        let matcher = FilterSpec::new("repo/*")
            .recursive(false)
            .matcher()
            .unwrap();
        assert!(matcher.matches("repo/a"));
        assert!(!matcher.matches("repo/a/b"));
    }

    #[test]
    fn empty_pattern_is_rejected() {
        let err = FilterSpec::new(" / ").matcher().unwrap_err();
        assert!(err.to_string().contains("Empty delete pattern"));
    }

    #[test]
    fn deserializes_with_defaults() {
        let filter: FilterSpec = serde_json::from_str(r#"{"pattern":"a/*"}"#).unwrap();
        assert_eq!(filter, FilterSpec::new("a/*"));
    }
}
