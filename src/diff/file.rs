use super::hunk::{Hunk, group_hunks};
use super::line::edit_script;
use std::fmt;

/// Standard unified-diff context radius
pub const DEFAULT_CONTEXT_LINES: usize = 3;

/// The diff of a single file: its origin and destination names plus the
/// hunks describing what changed.
///
/// Hunks are ordered by `from_line` and do not overlap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnifiedDiff {
    /// Name of the origin file (rendered after `---`)
    pub from_file: String,
    /// Name of the destination file (rendered after `+++`)
    pub to_file: String,
    pub hunks: Vec<Hunk>,
}

impl UnifiedDiff {
    pub fn new(from_file: impl Into<String>, to_file: impl Into<String>, hunks: Vec<Hunk>) -> Self {
        Self {
            from_file: from_file.into(),
            to_file: to_file.into(),
            hunks,
        }
    }

    /// Diff two texts, keeping `context` equal lines around each change.
    ///
    /// The result has no hunks when the texts contain the same lines.
    #[must_use]
    pub fn from_texts(
        from_file: impl Into<String>,
        to_file: impl Into<String>,
        old: &str,
        new: &str,
        context: usize,
    ) -> Self {
        Self::new(
            from_file,
            to_file,
            group_hunks(&edit_script(old, new), context),
        )
    }

    /// True if the diff describes no change
    pub fn is_empty(&self) -> bool {
        self.hunks.is_empty()
    }
}

impl fmt::Display for UnifiedDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- {}", self.from_file)?;
        writeln!(f, "+++ {}", self.to_file)?;

        // Destination positions drift by the net size of every earlier hunk
        let mut cumulative_delta: i64 = 0;
        for hunk in &self.hunks {
            let to_start = i64::from(hunk.from_line) + cumulative_delta;
            write!(f, "{}", hunk.display(to_start))?;
            cumulative_delta += hunk.delta();
        }

        Ok(())
    }
}
