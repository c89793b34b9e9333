//! Ignore globs for excluding paths from a tree diff.
//!
//! Patterns use standard glob syntax (`*`, `**`, `?`, `[abc]`, `{a,b}`) and
//! are matched against paths relative to the tree root. A path is ignored if
//! any pattern matches it. `*` also crosses separators, so `**.go` matches Go
//! files at any depth.

use error_set::error_set;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::Path;

error_set! {
    /// Errors from compiling ignore globs
    IgnoreError := {
        /// A pattern is not a valid glob
        #[display("Invalid ignore pattern '{pattern}': {message}")]
        InvalidPattern { pattern: String, message: String },
    }
}

/// A compiled set of ignore globs.
#[derive(Debug, Clone)]
pub struct IgnoreGlobSet {
    patterns: Vec<String>,
    set: GlobSet,
}

impl IgnoreGlobSet {
    /// Compile a set of patterns.
    ///
    /// # Examples
    ///
    /// ```
    /// use migration_diff::IgnoreGlobSet;
    /// use std::path::Path;
    ///
    /// let ignore = IgnoreGlobSet::new(["**.md", "**/.git/**"]).unwrap();
    /// assert!(ignore.is_ignored(Path::new("docs/README.md")));
    /// assert!(ignore.is_ignored(Path::new(".git/config")));
    /// assert!(!ignore.is_ignored(Path::new("main.go")));
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`IgnoreError::InvalidPattern`] naming the first malformed pattern.
    pub fn new<I, S>(patterns: I) -> Result<Self, IgnoreError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns: Vec<String> = patterns
            .into_iter()
            .map(|p| p.as_ref().to_string())
            .collect();

        let mut builder = GlobSetBuilder::new();
        for pattern in &patterns {
            let glob = Glob::new(pattern).map_err(|e| IgnoreError::InvalidPattern {
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;
            builder.add(glob);
        }

        let set = builder.build().map_err(|e| IgnoreError::InvalidPattern {
            pattern: patterns.join(", "),
            message: e.to_string(),
        })?;

        Ok(Self { patterns, set })
    }

    /// A set that ignores nothing
    pub fn empty() -> Self {
        Self {
            patterns: Vec::new(),
            set: GlobSet::empty(),
        }
    }

    /// True if any pattern matches `path`
    pub fn is_ignored(&self, path: &Path) -> bool {
        self.set.is_match(path)
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

impl Default for IgnoreGlobSet {
    fn default() -> Self {
        Self::empty()
    }
}
