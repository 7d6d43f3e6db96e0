//! Ignore patterns applied while copying a template

use crate::config::CONFIG_DIR;

/// Patterns that are always ignored, ahead of any user-declared ones
pub const DEFAULT_IGNORE: &[&str] = &[".git", "node_modules", ".DS_Store", CONFIG_DIR];

/// Ordered ignore list: built-ins first, then the template's own patterns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreList {
    patterns: Vec<String>,
}

impl IgnoreList {
    pub fn new(user_patterns: &[String]) -> Self {
        let mut patterns: Vec<String> = DEFAULT_IGNORE.iter().map(|p| p.to_string()).collect();
        patterns.extend(user_patterns.iter().cloned());
        Self { patterns }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_ignored(&self, relative_path: &str) -> bool {
        should_ignore(relative_path, &self.patterns)
    }
}

impl Default for IgnoreList {
    fn default() -> Self {
        Self::new(&[])
    }
}

/// Decide whether a `/`-separated path relative to the template root is excluded.
///
/// `*.ext` matches on the basename suffix; anything else must equal a whole path segment.
pub fn should_ignore<S: AsRef<str>>(relative_path: &str, patterns: &[S]) -> bool {
    let segments: Vec<&str> = relative_path.split('/').filter(|s| !s.is_empty()).collect();
    let file_name = segments.last().copied().unwrap_or("");

    patterns.iter().any(|pattern| {
        let pattern = pattern.as_ref();
        match pattern.strip_prefix('*') {
            Some(suffix) if suffix.starts_with('.') => file_name.ends_with(suffix),
            _ => segments.iter().any(|segment| *segment == pattern),
        }
    })
}
