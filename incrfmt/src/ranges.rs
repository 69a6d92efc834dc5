//! Inclusive 1-based line ranges and the line sets built from them.

use rustc_hash::FxHashSet;
use std::fmt;
use std::str::FromStr;

use crate::constants::line_range_re;

/// An inclusive, 1-based range of lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineRange {
    /// First line of the range.
    pub start: usize,
    /// Last line of the range, inclusive.
    pub end: usize,
}

impl LineRange {
    /// Create a range. No validation happens here, see [`LineRange::is_valid`].
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// A range is valid when it does not run backwards.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.start <= self.end
    }

    /// Number of lines covered, zero for an invalid range.
    #[must_use]
    pub const fn len(&self) -> usize {
        if self.is_valid() {
            self.end - self.start + 1
        } else {
            0
        }
    }

    /// Whether the range covers no lines.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `line` falls inside the range.
    #[must_use]
    pub const fn contains(&self, line: usize) -> bool {
        self.start <= line && line <= self.end
    }
}

impl From<(usize, usize)> for LineRange {
    fn from((start, end): (usize, usize)) -> Self {
        Self::new(start, end)
    }
}

impl fmt::Display for LineRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Error parsing a `START-END` line range.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LineRangeError {
    /// The text is not two numbers joined by `-`.
    #[error("invalid line range {0:?}, expected START-END")]
    Syntax(String),
    /// A bound does not fit in `usize`.
    #[error("line number out of range in {0:?}")]
    Overflow(String),
    /// Line numbers are 1-based.
    #[error("line numbers start at 1, got {0:?}")]
    Zero(String),
    /// The end comes before the start.
    #[error("line range {0:?} ends before it starts")]
    Backwards(String),
}

impl FromStr for LineRange {
    type Err = LineRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = line_range_re()
            .captures(s)
            .ok_or_else(|| LineRangeError::Syntax(s.to_owned()))?;
        let parse = |i: usize| {
            caps[i]
                .parse::<usize>()
                .map_err(|_| LineRangeError::Overflow(s.to_owned()))
        };
        let range = Self::new(parse(1)?, parse(2)?);
        if range.start == 0 {
            return Err(LineRangeError::Zero(s.to_owned()));
        }
        if !range.is_valid() {
            return Err(LineRangeError::Backwards(s.to_owned()));
        }
        Ok(range)
    }
}

/// The set of line numbers covered by a collection of ranges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineSet {
    lines: FxHashSet<usize>,
}

impl LineSet {
    /// Expand `ranges` into individual lines. Invalid ranges add nothing.
    #[must_use]
    pub fn from_ranges<'a>(ranges: impl IntoIterator<Item = &'a LineRange>) -> Self {
        let mut lines = FxHashSet::default();
        for range in ranges {
            lines.extend(range.start..=range.end);
        }
        Self { lines }
    }

    /// Whether `line` is in the set.
    #[must_use]
    pub fn contains(&self, line: usize) -> bool {
        self.lines.contains(&line)
    }

    /// Whether any line of the inclusive span `[start, end]` is in the set.
    #[must_use]
    pub fn intersects(&self, start: usize, end: usize) -> bool {
        (start..=end).any(|line| self.lines.contains(&line))
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the set holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_range() {
        assert_eq!("3-7".parse::<LineRange>(), Ok(LineRange::new(3, 7)));
        assert_eq!(" 12 - 12 ".parse::<LineRange>(), Ok(LineRange::new(12, 12)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            "3".parse::<LineRange>(),
            Err(LineRangeError::Syntax(_))
        ));
        assert!(matches!(
            "a-b".parse::<LineRange>(),
            Err(LineRangeError::Syntax(_))
        ));
        assert!(matches!(
            "-1-3".parse::<LineRange>(),
            Err(LineRangeError::Syntax(_))
        ));
        assert!(matches!(
            "0-3".parse::<LineRange>(),
            Err(LineRangeError::Zero(_))
        ));
        assert!(matches!(
            "5-3".parse::<LineRange>(),
            Err(LineRangeError::Backwards(_))
        ));
        assert!(matches!(
            "1-99999999999999999999999".parse::<LineRange>(),
            Err(LineRangeError::Overflow(_))
        ));
    }

    #[test]
    fn test_display_round_trips() {
        let range = LineRange::new(4, 9);
        assert_eq!(range.to_string().parse::<LineRange>(), Ok(range));
    }

    #[test]
    fn test_validity_and_len() {
        assert!(LineRange::new(2, 2).is_valid());
        assert_eq!(LineRange::new(2, 4).len(), 3);
        assert!(!LineRange::new(3, 2).is_valid());
        assert!(LineRange::new(3, 2).is_empty());
    }

    #[test]
    fn test_line_set_intersection() {
        let set = LineSet::from_ranges(&[LineRange::new(2, 3), LineRange::new(10, 10)]);
        assert_eq!(set.len(), 3);
        assert!(set.contains(3));
        assert!(!set.contains(4));
        assert!(set.intersects(3, 8));
        assert!(set.intersects(10, 10));
        assert!(!set.intersects(4, 9));
        assert!(!set.intersects(11, 20));
    }

    #[test]
    fn test_line_set_skips_backwards_ranges() {
        let set = LineSet::from_ranges(&[LineRange::new(5, 1)]);
        assert!(set.is_empty());
    }
}
