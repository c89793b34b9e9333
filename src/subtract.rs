//! Diff subtraction.
//!
//! [`subtract`] removes from one diff every edit that a second diff already
//! accounts for, leaving only what is new. Both diffs describe the same file,
//! but they were computed independently (for instance a feature and the
//! prerequisite it builds on), so their hunks are aligned by position with a
//! running offset for the line drift of hunks already consumed.
//!
//! Positions are compared inside the equal-line slack of each hunk: leading
//! and trailing context lines are shared, so two hunks that only touch
//! through context are not treated as overlapping.

use crate::diff::line::line_delta;
use crate::diff::{Hunk, Line, LineKind, UnifiedDiff};

/// Origin span of a hunk with its context slack removed, shifted by `offset`.
fn span(hunk: &Hunk, offset: i64) -> (i64, i64) {
    (
        i64::from(hunk.from_line) + i64::from(hunk.leading_equal()) + offset,
        i64::from(hunk.to_line) - i64::from(hunk.trailing_equal()) + offset,
    )
}

/// True when `x` ends before `y` (shifted by `offset`) begins.
pub fn before(x: &Hunk, y: &Hunk, offset: i64) -> bool {
    let (_, x_end) = span(x, 0);
    let (y_start, _) = span(y, offset);
    x_end < y_start
}

/// True when exactly one end of `x` lies strictly inside `y` (shifted by
/// `offset`): a partial, one-sided overlap.
pub fn overlaps(x: &Hunk, y: &Hunk, offset: i64) -> bool {
    let (x_start, x_end) = span(x, 0);
    let (y_start, y_end) = span(y, offset);
    let inside = |pos: i64| y_start < pos && pos < y_end;
    inside(x_start) != inside(x_end)
}

/// Compute the part of `a` that `b` does not explain.
///
/// The result keeps `a`'s file names. Every emitted hunk contains at least one
/// inserted or deleted line, as long as the inputs' hunks do. Neither input is
/// modified.
///
/// Hunks that line up are reduced line by line: an inserted or deleted line
/// of `a` is dropped when `b`'s hunk has the same line with the same kind,
/// and context lines are always kept. When the hunks only partially overlap
/// and `a`'s starts first, it is emitted unchanged; when `b`'s starts first,
/// `b`'s hunk is passed over without being emitted.
pub fn subtract(a: &UnifiedDiff, b: &UnifiedDiff) -> UnifiedDiff {
    let ours = sorted(&a.hunks);
    let theirs = sorted(&b.hunks);

    let mut emitted = Vec::new();
    let mut offset: i64 = 0;
    let (mut i, mut j) = (0, 0);

    while let Some(&hunk) = ours.get(i) {
        let base = match theirs.get(j) {
            Some(&base) if !before(hunk, base, offset) => base,
            _ => {
                emitted.push(hunk.clone());
                offset += hunk.delta();
                i += 1;
                continue;
            }
        };

        if before(base, hunk, -offset) {
            j += 1;
        } else if overlaps(hunk, base, offset) {
            // Only the minuend's own hunks reach the residual
            if hunk.from_line <= base.from_line {
                emitted.push(hunk.clone());
                i += 1;
            } else {
                j += 1;
            }
            offset += hunk.delta() - base.delta();
        } else {
            emitted.extend(remove_explained_lines(hunk, base));
            offset += hunk.delta() - base.delta();
            i += 1;
            j += 1;
        }
    }

    UnifiedDiff::new(a.from_file.clone(), a.to_file.clone(), emitted)
}

/// Subtract per file: each diff in `diffs` loses what the diff of the same
/// origin file in `base` explains. Diffs without a counterpart pass through,
/// and diffs left without hunks are dropped.
pub fn subtract_all(diffs: &[UnifiedDiff], base: &[UnifiedDiff]) -> Vec<UnifiedDiff> {
    diffs
        .iter()
        .filter_map(|diff| {
            let residual = match base.iter().find(|b| b.from_file == diff.from_file) {
                Some(prerequisite) => subtract(diff, prerequisite),
                None => diff.clone(),
            };
            (!residual.is_empty()).then_some(residual)
        })
        .collect()
}

fn sorted(hunks: &[Hunk]) -> Vec<&Hunk> {
    let mut sorted: Vec<&Hunk> = hunks.iter().collect();
    sorted.sort_by_key(|hunk| hunk.from_line);
    sorted
}

/// Line-level reduction of two hunks covering the same region.
///
/// Returns `None` when nothing but context remains.
fn remove_explained_lines(hunk: &Hunk, base: &Hunk) -> Option<Hunk> {
    let lines: Vec<Line> = hunk
        .lines
        .iter()
        .filter(|line| line.kind == LineKind::Equal || !base.lines.contains(line))
        .cloned()
        .collect();

    if !lines.iter().any(Line::is_change) {
        return None;
    }

    let to_line = i64::from(hunk.to_line) + hunk.delta() - line_delta(&lines);
    Some(Hunk::new(
        hunk.from_line,
        u32::try_from(to_line.max(0)).unwrap_or(u32::MAX),
        lines,
    ))
}
