//! Source locations for terms and errors.

use std::fmt;
use std::ops::Range;

use facet::Facet;

/// A byte range in source text, with the line and column of each end.
///
/// Lines and columns are 0-indexed; columns count bytes. `Display` shows the
/// start as 1-based `line:column`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Facet)]
pub struct Span {
    /// Start byte offset (inclusive).
    pub start: u32,
    /// End byte offset (exclusive).
    pub end: u32,
    /// Line of `start`.
    pub start_line: u32,
    /// Column of `start`.
    pub start_col: u32,
    /// Line of `end`.
    pub end_line: u32,
    /// Column of `end`.
    pub end_col: u32,
}

impl Span {
    /// A span within line `line`, which begins at byte `line_start`.
    #[must_use]
    pub const fn on_line(line: u32, line_start: u32, start_col: u32, end_col: u32) -> Self {
        Self {
            start: line_start + start_col,
            end: line_start + end_col,
            start_line: line,
            start_col,
            end_line: line,
            end_col,
        }
    }

    /// Placeholder for terms built in code rather than parsed.
    #[must_use]
    pub const fn dummy() -> Self {
        Self::on_line(0, 0, 0, 0)
    }

    /// Whether this is the [`Span::dummy`] placeholder.
    #[must_use]
    pub const fn is_dummy(&self) -> bool {
        self.start == 0 && self.end == 0
    }

    /// The byte range, for slicing the source.
    #[must_use]
    pub const fn range(&self) -> Range<usize> {
        self.start as usize..self.end as usize
    }

    /// The smallest span covering both.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        let first = if self.start <= other.start { self } else { other };
        let last = if self.end >= other.end { self } else { other };
        Self {
            start: first.start,
            start_line: first.start_line,
            start_col: first.start_col,
            end: last.end,
            end_line: last.end_line,
            end_col: last.end_col,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start_line + 1, self.start_col + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_one_based() {
        assert_eq!(Span::dummy().to_string(), "1:1");
        assert!(Span::dummy().is_dummy());
    }

    #[test]
    fn on_line_offsets_by_line_start() {
        let span = Span::on_line(2, 14, 3, 7);
        assert_eq!(span.range(), 17..21);
        assert_eq!(span.to_string(), "3:4");
        assert!(!span.is_dummy());
    }

    #[test]
    fn merge_covers_both_lines() {
        let a = Span::on_line(0, 0, 2, 5);
        let b = Span::on_line(1, 10, 0, 5);
        let merged = b.merge(&a);
        assert_eq!(merged.range(), 2..15);
        assert_eq!((merged.start_line, merged.start_col), (0, 2));
        assert_eq!((merged.end_line, merged.end_col), (1, 5));
    }
}
