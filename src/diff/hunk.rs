use super::line::{Line, LineKind, line_delta};
use std::fmt;

/// A contiguous block of changes with its surrounding context.
///
/// `from_line` is the 1-based origin line where the hunk begins and `to_line`
/// the 1-based origin line just past its end, so a hunk built from an edit
/// script spans `to_line - from_line` origin lines (equal plus deleted). The
/// destination start is not stored; it depends on the hunks before this one
/// and is supplied when rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    pub from_line: u32,
    pub to_line: u32,
    pub lines: Vec<Line>,
}

impl Hunk {
    pub fn new(from_line: u32, to_line: u32, lines: Vec<Line>) -> Self {
        Self {
            from_line,
            to_line,
            lines,
        }
    }

    /// Number of consecutive equal lines at the start of the hunk
    pub fn leading_equal(&self) -> u32 {
        self.lines.iter().take_while(|line| !line.is_change()).count() as u32
    }

    /// Number of consecutive equal lines at the end of the hunk
    pub fn trailing_equal(&self) -> u32 {
        self.lines
            .iter()
            .rev()
            .take_while(|line| !line.is_change())
            .count() as u32
    }

    /// Net line-count shift this hunk introduces
    pub fn delta(&self) -> i64 {
        line_delta(&self.lines)
    }

    /// True if at least one line is inserted or deleted
    pub fn has_changes(&self) -> bool {
        self.lines.iter().any(Line::is_change)
    }

    /// Lines the hunk covers in the origin file
    pub fn origin_len(&self) -> u32 {
        self.count(|kind| kind != LineKind::Insert)
    }

    /// Lines the hunk covers in the destination file
    pub fn destination_len(&self) -> u32 {
        self.count(|kind| kind != LineKind::Delete)
    }

    fn count(&self, mut keep: impl FnMut(LineKind) -> bool) -> u32 {
        self.lines.iter().filter(|line| keep(line.kind)).count() as u32
    }

    /// Render with the destination range starting at `to_start`
    pub fn display(&self, to_start: i64) -> HunkDisplay<'_> {
        HunkDisplay {
            hunk: self,
            to_start,
        }
    }
}

/// Unified-diff rendering of a [`Hunk`], see [`Hunk::display`]
pub struct HunkDisplay<'a> {
    hunk: &'a Hunk,
    to_start: i64,
}

impl fmt::Display for HunkDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let from_len = self.hunk.origin_len();
        let to_len = self.hunk.destination_len();

        writeln!(
            f,
            "@@ -{},{} +{},{} @@",
            range_start(i64::from(self.hunk.from_line), from_len),
            from_len,
            range_start(self.to_start, to_len),
            to_len
        )?;

        for line in &self.hunk.lines {
            writeln!(f, "{}", line)?;
        }

        Ok(())
    }
}

/// Empty ranges name the line *after which* the change applies.
fn range_start(start: i64, len: u32) -> i64 {
    if len == 0 { (start - 1).max(0) } else { start }
}

/// Group an edit script into hunks carrying up to `context` equal lines on
/// each side of every change.
///
/// Changes separated by at most `2 * context` equal lines share a hunk.
/// Scripts without changes produce no hunks.
pub fn group_hunks(script: &[Line], context: usize) -> Vec<Hunk> {
    let mut ranges: Vec<(usize, usize)> = Vec::new();

    for (idx, _) in script.iter().enumerate().filter(|(_, line)| line.is_change()) {
        let start = idx.saturating_sub(context);
        let end = (idx + 1 + context).min(script.len());

        match ranges.last_mut() {
            Some((_, last_end)) if start <= *last_end => *last_end = end.max(*last_end),
            _ => ranges.push((start, end)),
        }
    }

    // origin_before[i] = origin lines consumed by script[..i]
    let mut origin_before = Vec::with_capacity(script.len() + 1);
    let mut consumed = 0u32;
    origin_before.push(consumed);
    for line in script {
        if line.kind != LineKind::Insert {
            consumed += 1;
        }
        origin_before.push(consumed);
    }

    ranges
        .into_iter()
        .map(|(start, end)| {
            Hunk::new(
                origin_before[start] + 1,
                origin_before[end] + 1,
                script[start..end].to_vec(),
            )
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    fn context(n: usize) -> Vec<Line> {
        (1..=n).map(|i| Line::equal(format!("line {}", i))).collect()
    }

    #[test]
    fn leading_and_trailing_equal() {
        let hunk = Hunk::new(
            1,
            6,
            vec![
                Line::equal("a"),
                Line::equal("b"),
                Line::delete("c"),
                Line::insert("C"),
                Line::equal("d"),
            ],
        );
        assert_eq!(hunk.leading_equal(), 2);
        assert_eq!(hunk.trailing_equal(), 1);
        assert_eq!(hunk.delta(), 0);
        assert_eq!(hunk.origin_len(), 4);
        assert_eq!(hunk.destination_len(), 4);
    }

    #[test]
    fn hunk_without_context() {
        let hunk = Hunk::new(3, 3, vec![Line::insert("x"), Line::insert("y")]);
        assert_eq!(hunk.leading_equal(), 0);
        assert_eq!(hunk.trailing_equal(), 0);
        assert_eq!(hunk.delta(), 2);
        assert!(hunk.has_changes());
    }

    #[test]
    fn context_only_hunk_has_no_changes() {
        let hunk = Hunk::new(1, 3, context(2));
        assert!(!hunk.has_changes());
    }

    #[test]
    fn render_replacement() {
        let hunk = Hunk::new(10, 11, vec![Line::delete("old"), Line::insert("new")]);
        assert_eq!(
            hunk.display(10).to_string(),
            "@@ -10,1 +10,1 @@\n-old\n+new\n"
        );
    }

    #[test]
    fn render_pure_insertion_names_preceding_line() {
        let hunk = Hunk::new(11, 11, vec![Line::insert("new line here")]);
        assert_eq!(
            hunk.display(11).to_string(),
            "@@ -10,0 +11,1 @@\n+new line here\n"
        );
    }

    #[test]
    fn render_pure_deletion_names_preceding_line() {
        let hunk = Hunk::new(15, 16, vec![Line::delete("gone")]);
        assert_eq!(hunk.display(15).to_string(), "@@ -15,1 +14,0 @@\n-gone\n");
    }

    #[test]
    fn render_new_file() {
        let hunk = Hunk::new(1, 1, vec![Line::insert("a"), Line::insert("b")]);
        assert_eq!(hunk.display(1).to_string(), "@@ -0,0 +1,2 @@\n+a\n+b\n");
    }

    #[test]
    fn render_with_context() {
        let hunk = Hunk::new(
            4,
            7,
            vec![
                Line::equal("fn main() {"),
                Line::delete("    old();"),
                Line::insert("    new();"),
                Line::insert("    extra();"),
                Line::equal("}"),
            ],
        );
        assert_eq!(
            hunk.display(6).to_string(),
            "@@ -4,3 +6,4 @@\n fn main() {\n-    old();\n+    new();\n+    extra();\n }\n"
        );
    }

    #[test]
    fn group_empty_script() {
        assert!(group_hunks(&[], 3).is_empty());
    }

    #[test]
    fn group_without_changes() {
        assert!(group_hunks(&context(10), 3).is_empty());
    }

    #[test]
    fn group_single_change_with_context() {
        let mut script = context(4);
        script.push(Line::delete("five"));
        script.push(Line::insert("FIVE"));
        script.extend((6..=10).map(|i| Line::equal(format!("line {}", i))));

        let hunks = group_hunks(&script, 3);
        assert_eq!(hunks.len(), 1);
        assert_eq!(hunks[0].from_line, 2);
        assert_eq!(hunks[0].to_line, 9);
        assert_eq!(hunks[0].leading_equal(), 3);
        assert_eq!(hunks[0].trailing_equal(), 3);
        assert_eq!(hunks[0].lines[3], Line::delete("five"));
    }

    #[test]
    fn group_change_at_file_start_clips_context() {
        let mut script = vec![Line::insert("header")];
        script.extend(context(5));

        let hunks = group_hunks(&script, 3);
        assert_eq!(hunks.len(), 1);
        assert_eq!(hunks[0].from_line, 1);
        assert_eq!(hunks[0].to_line, 4);
        assert_eq!(hunks[0].lines.len(), 4);
    }

    #[test]
    fn group_merges_changes_with_small_gap() {
        let mut script = vec![Line::delete("a")];
        script.extend(context(6));
        script.push(Line::insert("b"));

        let hunks = group_hunks(&script, 3);
        assert_eq!(hunks.len(), 1);
        assert_eq!(hunks[0].lines.len(), 8);
        assert_eq!(hunks[0].from_line, 1);
        assert_eq!(hunks[0].to_line, 8);
    }

    #[test]
    fn group_splits_changes_with_large_gap() {
        let mut script = vec![Line::delete("a")];
        script.extend(context(7));
        script.push(Line::insert("b"));

        let hunks = group_hunks(&script, 3);
        assert_eq!(hunks.len(), 2);
        assert_eq!((hunks[0].from_line, hunks[0].to_line), (1, 5));
        assert_eq!((hunks[1].from_line, hunks[1].to_line), (6, 9));
        assert_eq!(hunks[1].lines.last(), Some(&Line::insert("b")));
    }

    #[test]
    fn group_with_zero_context() {
        let mut script = context(2);
        script.push(Line::insert("x"));
        script.extend(context(2));

        let hunks = group_hunks(&script, 0);
        assert_eq!(hunks, vec![Hunk::new(3, 3, vec![Line::insert("x")])]);
    }
}
