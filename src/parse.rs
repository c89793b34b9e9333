//! Reading unified diff text back into [`UnifiedDiff`] values.
//!
//! Accepts what [`UnifiedDiff`]'s `Display` writes, plus the usual variations
//! found in diff files written by other tools:
//!
//! - hunk ranges without a count (`@@ -3 +3 @@` means one line)
//! - section text after the closing `@@`
//! - `\ No newline at end of file` markers, which are skipped
//! - blank lines between file blocks
//!
//! A body line that is completely empty is read as an empty context line.
//!
//! # Examples
//!
//! ```
//! use migration_diff::parse::parse_unified;
//!
//! let text = "--- app.go\n+++ app.go\n@@ -1,2 +1,2 @@\n package app\n-var x = 1\n+var x = 2\n";
//! let diffs = parse_unified(text).unwrap();
//! assert_eq!(diffs.len(), 1);
//! assert_eq!(diffs[0].from_file, "app.go");
//! assert_eq!(diffs[0].hunks[0].from_line, 1);
//! assert_eq!(diffs[0].hunks[0].to_line, 3);
//! assert_eq!(diffs[0].to_string(), text);
//! ```

use crate::diff::{Hunk, Line, LineKind, UnifiedDiff};
use error_set::error_set;
use nom::bytes::complete::tag;
use nom::character::complete::{char, u32 as number};
use nom::combinator::{opt, rest};
use nom::sequence::preceded;
use nom::{IResult, Parser};

error_set! {
    /// Errors from reading unified diff text
    ReadDiffError := {
        /// A required header line is missing
        #[display("Line {line}: expected {expected}")]
        Expected { line: usize, expected: String },
        /// An `@@` line that does not parse as a hunk header
        #[display("Line {line}: malformed hunk header '{header}'")]
        MalformedHunkHeader { line: usize, header: String },
        /// A hunk body has fewer or more lines than its header announces
        #[display("Line {line}: hunk body does not match its header counts")]
        CountMismatch { line: usize },
    }
}

/// `start[,count]`, the count defaulting to 1
fn range(input: &str) -> IResult<&str, (u32, u32)> {
    (number, opt(preceded(char(','), number)))
        .map(|(start, count)| (start, count.unwrap_or(1)))
        .parse(input)
}

/// `@@ -a,la +b,lb @@`, ignoring any section text after it
fn hunk_header(input: &str) -> IResult<&str, ((u32, u32), (u32, u32))> {
    (
        preceded(tag("@@ -"), range),
        preceded(tag(" +"), range),
        tag(" @@"),
    )
        .map(|(origin, destination, _)| (origin, destination))
        .parse(input)
}

fn file_name<'a>(marker: &'static str, input: &'a str) -> IResult<&'a str, &'a str> {
    preceded(tag(marker), rest).parse(input)
}

/// Line cursor with 1-based numbering for errors
struct Reader<'a> {
    lines: Vec<&'a str>,
    pos: usize,
}

impl<'a> Reader<'a> {
    fn peek(&self) -> Option<&'a str> {
        self.lines.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<&'a str> {
        let line = self.peek()?;
        self.pos += 1;
        Some(line)
    }

    fn line_number(&self) -> usize {
        self.pos + 1
    }

    fn header(&mut self, marker: &'static str) -> Result<String, ReadDiffError> {
        let line = self.line_number();
        let name = self
            .peek()
            .and_then(|text| file_name(marker, text).ok())
            .map(|(_, name)| name.to_string())
            .ok_or_else(|| ReadDiffError::Expected {
                line,
                expected: format!("'{}' file header", marker.trim_end()),
            })?;
        self.pos += 1;
        Ok(name)
    }

    fn hunk(&mut self) -> Result<Hunk, ReadDiffError> {
        let line = self.line_number();
        let header = self.advance().unwrap_or_default();
        let malformed = || ReadDiffError::MalformedHunkHeader {
            line,
            header: header.to_string(),
        };
        let ((origin_start, mut origin_left), (_, mut destination_left)) = hunk_header(header)
            .map(|(_, ranges)| ranges)
            .map_err(|_| malformed())?;

        // An empty origin range names the line before the insertion point
        let from_line = if origin_left == 0 {
            origin_start.checked_add(1).ok_or_else(malformed)?
        } else {
            origin_start
        };
        let to_line = from_line.checked_add(origin_left).ok_or_else(malformed)?;

        let mut lines = Vec::new();
        while origin_left > 0 || destination_left > 0 {
            let line = self.line_number();
            let text = self.advance().ok_or(ReadDiffError::CountMismatch { line })?;

            if text.starts_with('\\') {
                continue;
            }

            let (kind, content) = match text.chars().next() {
                None => (LineKind::Equal, ""),
                Some(' ') => (LineKind::Equal, &text[1..]),
                Some('-') => (LineKind::Delete, &text[1..]),
                Some('+') => (LineKind::Insert, &text[1..]),
                Some(_) => return Err(ReadDiffError::CountMismatch { line }),
            };

            if kind != LineKind::Insert {
                origin_left = origin_left
                    .checked_sub(1)
                    .ok_or(ReadDiffError::CountMismatch { line })?;
            }
            if kind != LineKind::Delete {
                destination_left = destination_left
                    .checked_sub(1)
                    .ok_or(ReadDiffError::CountMismatch { line })?;
            }
            lines.push(Line::new(kind, content));
        }

        // Marker after the last counted line
        if self.peek().is_some_and(|text| text.starts_with('\\')) {
            self.pos += 1;
        }

        Ok(Hunk::new(from_line, to_line, lines))
    }
}

/// Read every file block of a unified diff.
///
/// Empty or blank-only text holds no diffs. The destination start of each
/// hunk header is not checked; positions are recomputed from origin lines
/// when the diff is rendered again.
///
/// # Errors
///
/// Returns [`ReadDiffError`] with the 1-based line of the first problem.
pub fn parse_unified(text: &str) -> Result<Vec<UnifiedDiff>, ReadDiffError> {
    let mut reader = Reader {
        lines: text.lines().collect(),
        pos: 0,
    };
    let mut diffs = Vec::new();

    loop {
        while reader.peek().is_some_and(|line| line.trim().is_empty()) {
            reader.pos += 1;
        }
        if reader.peek().is_none() {
            break;
        }

        let from_file = reader.header("--- ")?;
        let to_file = reader.header("+++ ")?;

        let mut hunks = Vec::new();
        while reader.peek().is_some_and(|line| line.starts_with("@@")) {
            hunks.push(reader.hunk()?);
        }

        diffs.push(UnifiedDiff::new(from_file, to_file, hunks));
    }

    Ok(diffs)
}
