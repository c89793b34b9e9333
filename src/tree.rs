//! Tree-level diffing.
//!
//! [`TreeDiffer`] walks an origin and a modified directory and produces one
//! [`UnifiedDiff`] per file whose lines differ. A file missing from one side
//! is diffed against empty content, so additions and deletions show up as
//! all-insert or all-delete diffs. Paths matched by the ignore globs are never
//! read.

use crate::diff::{DEFAULT_CONTEXT_LINES, UnifiedDiff};
use crate::ignore::IgnoreGlobSet;
use error_set::error_set;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use walkdir::WalkDir;

error_set! {
    /// Errors from diffing two file trees
    TreeDiffError := {
        /// Directory traversal failed (permissions, broken symlink)
        #[display("Failed to walk {path}: {message}")]
        Walk { path: String, message: String },
        /// A file exists but could not be read
        #[display("Failed to read {path}: {message}")]
        Read { path: String, message: String },
    }
}

/// Diffs keyed by `/`-separated path relative to the tree roots
pub type TreeDiff = BTreeMap<String, UnifiedDiff>;

/// Diffs two directory trees file by file.
#[derive(Debug, Clone)]
pub struct TreeDiffer<'a> {
    ignore: &'a IgnoreGlobSet,
    context_lines: usize,
}

impl<'a> TreeDiffer<'a> {
    pub fn new(ignore: &'a IgnoreGlobSet) -> Self {
        Self {
            ignore,
            context_lines: DEFAULT_CONTEXT_LINES,
        }
    }

    /// Equal lines kept around each change (default 3)
    #[must_use]
    pub fn context_lines(mut self, context_lines: usize) -> Self {
        self.context_lines = context_lines;
        self
    }

    /// Diff every non-ignored file of `origin` against `modified`.
    ///
    /// Files only in `origin` diff against empty content (deletion), files
    /// only in `modified` diff from empty content (insertion). Files whose
    /// lines are identical produce no entry. A root that does not exist is
    /// an empty tree.
    ///
    /// # Errors
    ///
    /// Fails on the first walk or read error; a missing file is not an error.
    pub fn compute(&self, origin: &Path, modified: &Path) -> Result<TreeDiff, TreeDiffError> {
        let mut diffs = TreeDiff::new();
        let mut visited = HashSet::new();

        for relative in self.files(origin)? {
            let old = read_or_empty(&origin.join(&relative))?;
            let new = read_or_empty(&modified.join(&relative))?;
            self.record(&mut diffs, path_key(&relative), &old, &new);
            visited.insert(relative);
        }

        for relative in self.files(modified)? {
            if visited.contains(&relative) {
                continue;
            }
            let new = read_or_empty(&modified.join(&relative))?;
            self.record(&mut diffs, path_key(&relative), "", &new);
        }

        debug!(
            origin = %origin.display(),
            modified = %modified.display(),
            files = diffs.len(),
            "tree diff computed"
        );
        Ok(diffs)
    }

    /// Non-ignored, non-directory paths under `root`, relative to it
    fn files(&self, root: &Path) -> Result<Vec<PathBuf>, TreeDiffError> {
        if !root.exists() {
            debug!(root = %root.display(), "tree root missing, treating as empty");
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
            let entry = entry.map_err(|e| TreeDiffError::Walk {
                path: e.path().unwrap_or(root).display().to_string(),
                message: e.to_string(),
            })?;

            if entry.file_type().is_dir() {
                continue;
            }

            let Ok(relative) = entry.path().strip_prefix(root) else {
                continue;
            };

            if self.ignore.is_ignored(relative) {
                trace!(path = %relative.display(), "ignored");
                continue;
            }

            files.push(relative.to_path_buf());
        }

        Ok(files)
    }

    fn record(&self, diffs: &mut TreeDiff, key: String, old: &str, new: &str) {
        let diff = UnifiedDiff::from_texts(key.as_str(), key.as_str(), old, new, self.context_lines);
        if diff.is_empty() {
            return;
        }

        trace!(path = %key, hunks = diff.hunks.len(), "file differs");
        diffs.insert(key, diff);
    }
}

/// Diff two trees with default context, see [`TreeDiffer::compute`].
///
/// # Errors
///
/// Fails on the first walk or read error.
pub fn compute(
    origin: &Path,
    modified: &Path,
    ignore: &IgnoreGlobSet,
) -> Result<TreeDiff, TreeDiffError> {
    TreeDiffer::new(ignore).compute(origin, modified)
}

/// Read a file as text; a missing file reads as empty
fn read_or_empty(path: &Path) -> Result<String, TreeDiffError> {
    match fs::read(path) {
        Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(TreeDiffError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        }),
    }
}

/// Platform-independent key for a relative path
fn path_key(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
