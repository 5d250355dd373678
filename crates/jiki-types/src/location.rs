use serde::{Deserialize, Serialize};
use std::fmt;

/// A half-open `[begin, end)` range of offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OffsetRange {
    pub begin: usize,
    pub end: usize,
}

impl OffsetRange {
    pub fn new(begin: usize, end: usize) -> Self {
        Self { begin, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.begin)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Source location of a token or AST node.
///
/// `absolute` holds byte offsets into the whole source. `relative` holds
/// offsets within `line`, where `begin` is the 1-based column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub line: u32,
    pub absolute: OffsetRange,
    pub relative: OffsetRange,
}

impl Location {
    /// Create a new location.
    pub fn new(line: u32, absolute: OffsetRange, relative: OffsetRange) -> Self {
        Self {
            line,
            absolute,
            relative,
        }
    }

    /// Create a zero-width location at a single position.
    pub fn point(line: u32, offset: usize, column: usize) -> Self {
        Self::new(
            line,
            OffsetRange::new(offset, offset),
            OffsetRange::new(column, column),
        )
    }

    /// Location running from the start of `self` to the end of `other`.
    ///
    /// The line and relative start are taken from whichever location begins
    /// first, the relative end from whichever ends last.
    pub fn span_to(self, other: Location) -> Location {
        let first = if other.absolute.begin < self.absolute.begin {
            other
        } else {
            self
        };
        let last = if other.absolute.end > self.absolute.end {
            other
        } else {
            self
        };
        Location::new(
            first.line,
            OffsetRange::new(first.absolute.begin, last.absolute.end),
            OffsetRange::new(first.relative.begin, last.relative.end),
        )
    }

    /// The exact source text covered by this location.
    ///
    /// Out-of-range or non-boundary offsets yield an empty string.
    pub fn to_code<'s>(&self, source: &'s str) -> &'s str {
        source
            .get(self.absolute.begin..self.absolute.end)
            .unwrap_or("")
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.relative.begin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(line: u32, begin: usize, end: usize, col: usize) -> Location {
        Location::new(
            line,
            OffsetRange::new(begin, end),
            OffsetRange::new(col, col + (end - begin)),
        )
    }

    #[test]
    fn test_location_point() {
        let l = Location::point(3, 17, 5);
        assert_eq!(l.line, 3);
        assert_eq!(l.absolute, OffsetRange::new(17, 17));
        assert_eq!(l.relative, OffsetRange::new(5, 5));
        assert!(l.absolute.is_empty());
    }

    #[test]
    fn test_span_to_same_line() {
        let a = loc(1, 4, 7, 5);
        let b = loc(1, 10, 12, 11);
        let merged = a.span_to(b);
        assert_eq!(merged.line, 1);
        assert_eq!(merged.absolute, OffsetRange::new(4, 12));
        assert_eq!(merged.relative, OffsetRange::new(5, 13));
    }

    #[test]
    fn test_span_to_is_order_independent() {
        let a = loc(1, 4, 7, 5);
        let b = loc(2, 20, 25, 3);
        assert_eq!(a.span_to(b), b.span_to(a));
        assert_eq!(a.span_to(b).line, 1);
    }

    #[test]
    fn test_span_to_contained() {
        let outer = loc(1, 0, 20, 1);
        let inner = loc(1, 5, 8, 6);
        assert_eq!(outer.span_to(inner), outer);
    }

    #[test]
    fn test_to_code() {
        let source = "let x = 10;\nx;";
        assert_eq!(loc(1, 0, 11, 1).to_code(source), "let x = 10;");
        assert_eq!(loc(2, 12, 14, 1).to_code(source), "x;");
        assert_eq!(loc(1, 40, 50, 1).to_code(source), "");
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", loc(3, 30, 33, 7)), "3:7");
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(loc(2, 12, 14, 1)).unwrap();
        assert_eq!(json["line"], 2);
        assert_eq!(json["absolute"]["begin"], 12);
        assert_eq!(json["absolute"]["end"], 14);
        assert_eq!(json["relative"]["begin"], 1);
        assert_eq!(json["relative"]["end"], 3);
    }

    #[test]
    fn test_span_determinism_100_iterations() {
        let a = loc(1, 4, 7, 5);
        let b = loc(2, 20, 25, 3);
        let first = a.span_to(b);
        for i in 0..100 {
            assert_eq!(first, a.span_to(b), "Determinism failure at iteration {i}");
        }
    }
}
