//! Unified-diff algebra for migration diffs between two scaffold versions.
//!
//! A scaffold generator produces one directory per target (`chain`, `module`,
//! `list`, ...). Diffing each target between two generator versions and then
//! subtracting the diff of the target it builds on leaves only the changes a
//! user has to apply for that feature.
//!
//! ```no_run
//! # use migration_diff::MigrationDiff;
//! # use std::path::Path;
//! let written = MigrationDiff::new(Path::new("v0.27"), Path::new("v0.28"))
//!     .targets(["chain", "module", "list"])
//!     .generate(Path::new("migration"))
//!     .unwrap();
//! ```

use error_set::error_set;
use std::path::{Path, PathBuf};

pub mod diff;
pub mod ignore;
pub mod orchestrate;
pub mod output;
pub mod parse;
pub mod subtract;
pub mod tree;

pub use diff::{DEFAULT_CONTEXT_LINES, Hunk, Line, LineKind, UnifiedDiff};
pub use ignore::{IgnoreError, IgnoreGlobSet};
pub use orchestrate::{
    DEFAULT_IGNORE_GLOBS, DEFAULT_TARGETS, OrchestrateError, Orchestrator, SubtractionPolicy,
    TargetDiffs, TargetTrees, orchestrate, target_pairs,
};
pub use output::{PersistError, load, render, save};
pub use parse::{ReadDiffError, parse_unified};
pub use subtract::{subtract, subtract_all};
pub use tree::{TreeDiff, TreeDiffError, TreeDiffer};

error_set! {
    /// Top-level error for migration-diff operations
    MigrationDiffError := {
        #[display("No targets to diff")]
        NoTargets,
        IgnoreError(IgnoreError),
        TreeDiffError(TreeDiffError),
        OrchestrateError(OrchestrateError),
        PersistError(PersistError),
        ReadDiffError(ReadDiffError),
    }
}

/// Migration diffs between two scaffold roots.
///
/// Defaults to [`DEFAULT_TARGETS`], [`DEFAULT_IGNORE_GLOBS`] and
/// [`DEFAULT_CONTEXT_LINES`].
#[derive(Debug, Clone)]
pub struct MigrationDiff<'a> {
    from_root: &'a Path,
    to_root: &'a Path,
    targets: Vec<String>,
    ignore_globs: Vec<String>,
    context_lines: usize,
}

impl<'a> MigrationDiff<'a> {
    pub fn new(from_root: &'a Path, to_root: &'a Path) -> Self {
        Self {
            from_root,
            to_root,
            targets: DEFAULT_TARGETS.iter().map(|t| t.to_string()).collect(),
            ignore_globs: DEFAULT_IGNORE_GLOBS.iter().map(|g| g.to_string()).collect(),
            context_lines: DEFAULT_CONTEXT_LINES,
        }
    }

    /// Replace the target list
    #[must_use]
    pub fn targets<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.targets = targets.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the ignore globs, dropping the defaults
    #[must_use]
    pub fn ignore_globs<I, S>(mut self, globs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_globs = globs.into_iter().map(Into::into).collect();
        self
    }

    /// Add ignore globs to the current ones
    #[must_use]
    pub fn extra_ignores<I, S>(mut self, globs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_globs.extend(globs.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn context_lines(mut self, context_lines: usize) -> Self {
        self.context_lines = context_lines;
        self
    }

    /// Compute the subtracted diffs of every target.
    ///
    /// # Errors
    ///
    /// Fails on an empty target list, an invalid ignore glob, a prerequisite
    /// cycle, or the first tree that cannot be walked or read.
    pub fn compute(&self) -> Result<TargetDiffs, MigrationDiffError> {
        if self.targets.is_empty() {
            return Err(MigrationDiffError::NoTargets);
        }

        let ignore = IgnoreGlobSet::new(&self.ignore_globs)?;
        let pairs = target_pairs(self.from_root, self.to_root, &self.targets);

        Ok(Orchestrator::new(&ignore)
            .context_lines(self.context_lines)
            .run(&pairs)?)
    }

    /// Compute every target and write one `<target>.diff` per target into
    /// `output`. Returns the written paths.
    ///
    /// # Errors
    ///
    /// Same as [`compute`](Self::compute), plus any write failure.
    pub fn generate(&self, output: &Path) -> Result<Vec<PathBuf>, MigrationDiffError> {
        Ok(save(&self.compute()?, output)?)
    }
}

/// Subtract the diff file `base` from the diff file `diff`, file by file, and
/// render the residual.
///
/// # Errors
///
/// Fails if either file cannot be read or parsed.
pub fn subtract_files(diff: &Path, base: &Path) -> Result<String, MigrationDiffError> {
    let diffs = load(diff)?;
    let base = load(base)?;
    Ok(render(&subtract_all(&diffs, &base)))
}
