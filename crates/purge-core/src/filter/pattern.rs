//! Wildcard patterns over `/`-separated store paths.

use regex::Regex;

use crate::types::SEPARATOR;

/// A compiled wildcard pattern.
///
/// `*` matches any run of characters and `?` exactly one. When the pattern
/// is not recursive, neither crosses a `/`. A trailing `/` selects everything
/// below the folder, so `libs/` behaves as `libs/*`.
#[derive(Debug, Clone)]
pub struct WildcardPattern {
    source: String,
    regex: Regex,
}

impl WildcardPattern {
    pub fn compile(pattern: &str, recursive: bool) -> Result<Self, regex::Error> {
        let source = normalize(pattern);
        let regex = Regex::new(&to_regex(&source, recursive))?;
        Ok(Self { source, regex })
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Normalized pattern text.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

fn normalize(pattern: &str) -> String {
    let trimmed = pattern.trim().trim_start_matches(SEPARATOR);
    if trimmed.ends_with(SEPARATOR) {
        format!("{trimmed}*")
    } else {
        trimmed.to_string()
    }
}

fn to_regex(pattern: &str, recursive: bool) -> String {
    let (any_run, any_one) = if recursive {
        (".*", ".")
    } else {
        ("[^/]*", "[^/]")
    };

    let mut out = String::with_capacity(pattern.len() * 2 + 2);
    out.push('^');
    let mut literal = [0u8; 4];
    for ch in pattern.chars() {
        match ch {
            '*' => out.push_str(any_run),
            '?' => out.push_str(any_one),
            other => out.push_str(&regex::escape(other.encode_utf8(&mut literal))),
        }
    }
    out.push('$');
    out
}
