/// Converts byte offsets to line numbers.
///
/// Parsers report positions as byte offsets while tree leaves and line
/// ranges count lines, starting at 1.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offset of the start of each line.
    line_starts: Vec<usize>,
}

impl LineIndex {
    /// Scan `source` for line starts.
    #[must_use]
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        // '\n' is always a single byte in UTF-8.
        for (i, byte) in source.as_bytes().iter().enumerate() {
            if *byte == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self { line_starts }
    }

    /// 1-based line holding the byte at `offset`.
    ///
    /// An offset at a `'\n'` belongs to the line that newline ends; offsets
    /// past the end belong to the last line.
    #[must_use]
    pub fn line_of(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line + 1,
            Err(line) => line,
        }
    }
}

/// Byte length of the line terminator starting at `offset`: 2 for `"\r\n"`,
/// 1 for `'\n'`, 0 otherwise.
#[must_use]
pub fn line_terminator_len(source: &str, offset: usize) -> usize {
    let bytes = source.as_bytes();
    match (bytes.get(offset), bytes.get(offset + 1)) {
        (Some(b'\r'), Some(b'\n')) => 2,
        (Some(b'\n'), _) => 1,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_of() {
        let index = LineIndex::new("ab\ncd\n\nef");
        assert_eq!(index.line_of(0), 1);
        assert_eq!(index.line_of(2), 1);
        assert_eq!(index.line_of(3), 2);
        assert_eq!(index.line_of(6), 3);
        assert_eq!(index.line_of(7), 4);
        assert_eq!(index.line_of(100), 4);
    }

    #[test]
    fn test_line_terminator_len() {
        let source = "a\r\nb\nc";
        assert_eq!(line_terminator_len(source, 0), 0);
        assert_eq!(line_terminator_len(source, 1), 2);
        assert_eq!(line_terminator_len(source, 2), 1);
        assert_eq!(line_terminator_len(source, 4), 1);
        assert_eq!(line_terminator_len(source, 6), 0);
        assert_eq!(line_terminator_len(source, 60), 0);
    }
}
