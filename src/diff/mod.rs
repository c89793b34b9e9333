//! Structured unified diffs.
//!
//! - `line`: line kinds and the Myers edit script between two texts
//! - `hunk`: hunks, their positional helpers, and grouping of an edit script
//! - `file`: the per-file [`UnifiedDiff`] and its text rendering

pub mod file;
pub mod hunk;
pub mod line;

pub use file::{DEFAULT_CONTEXT_LINES, UnifiedDiff};
pub use hunk::Hunk;
pub use line::{Line, LineKind};
