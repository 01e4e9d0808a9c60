// Line mapping between char offsets and 1-based line numbers.

/// Line starts of one source text, measured in chars.
///
/// Only `\n` ends a line, which matches how `proc-macro2` reports
/// `LineColumn` positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMap {
    line_starts: Vec<usize>,
}

impl Default for LineMap {
    fn default() -> Self {
        Self {
            line_starts: vec![0],
        }
    }
}

impl LineMap {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (offset, c) in text.chars().enumerate() {
            if c == '\n' {
                line_starts.push(offset + 1);
            }
        }
        Self { line_starts }
    }

    /// 1-based line containing `offset`. Offsets past the end map to the last line.
    pub fn line_number(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(index) => index + 1,
            Err(index) => index,
        }
    }

    /// Char offset of a 1-based line and 0-based column.
    pub fn offset_of(&self, line: usize, column: usize) -> usize {
        let index = line.saturating_sub(1).min(self.line_starts.len() - 1);
        self.line_starts[index] + column
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}
