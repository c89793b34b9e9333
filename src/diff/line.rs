use similar::{Algorithm, ChangeTag, TextDiff};
use std::fmt;

/// What a line in a hunk does to the file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineKind {
    /// Shared context, present in both versions
    Equal,
    /// Present only in the destination
    Insert,
    /// Present only in the origin
    Delete,
}

impl LineKind {
    /// Prefix used for this kind in unified-diff text
    pub fn prefix(self) -> char {
        match self {
            LineKind::Equal => ' ',
            LineKind::Insert => '+',
            LineKind::Delete => '-',
        }
    }
}

impl From<ChangeTag> for LineKind {
    fn from(tag: ChangeTag) -> Self {
        match tag {
            ChangeTag::Equal => LineKind::Equal,
            ChangeTag::Insert => LineKind::Insert,
            ChangeTag::Delete => LineKind::Delete,
        }
    }
}

/// A single line of a hunk, without its line terminator
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Line {
    pub kind: LineKind,
    pub content: String,
}

impl Line {
    pub fn new(kind: LineKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
        }
    }

    pub fn equal(content: impl Into<String>) -> Self {
        Self::new(LineKind::Equal, content)
    }

    pub fn insert(content: impl Into<String>) -> Self {
        Self::new(LineKind::Insert, content)
    }

    pub fn delete(content: impl Into<String>) -> Self {
        Self::new(LineKind::Delete, content)
    }

    /// True for inserted and deleted lines
    pub fn is_change(&self) -> bool {
        self.kind != LineKind::Equal
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.prefix(), self.content)
    }
}

/// Net line-count shift of a run of lines: inserts minus deletes.
pub fn line_delta(lines: &[Line]) -> i64 {
    lines
        .iter()
        .map(|line| match line.kind {
            LineKind::Insert => 1,
            LineKind::Delete => -1,
            LineKind::Equal => 0,
        })
        .sum()
}

/// Compute the Myers edit script turning `old` into `new`, one entry per line.
///
/// Texts are split on line terminators, so a missing final newline does not
/// produce a change on its own.
pub fn edit_script(old: &str, new: &str) -> Vec<Line> {
    let old_lines: Vec<&str> = old.lines().collect();
    let new_lines: Vec<&str> = new.lines().collect();

    TextDiff::configure()
        .algorithm(Algorithm::Myers)
        .diff_slices(&old_lines, &new_lines)
        .iter_all_changes()
        .map(|change| Line::new(change.tag().into(), change.value()))
        .collect()
}
