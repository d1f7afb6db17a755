//! Byte-offset <-> line mapping over normalized text.

/// Pre-computed line starts for a normalized (LF-only) string.
///
/// Lines are 0-based. `line_of` uses binary search so block-token map
/// computation stays O(log N) per lookup.
pub struct LineIndex {
    line_starts: Vec<usize>,
    len: usize,
    ends_with_newline: bool,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (idx, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(idx + 1);
            }
        }
        let ends_with_newline = text.ends_with('\n');
        Self {
            line_starts,
            len: text.len(),
            ends_with_newline,
        }
    }

    /// 0-based line containing the byte offset.
    pub fn line_of(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line.saturating_sub(1),
        }
    }

    /// Byte offset of the start of `line`, or the text length when `line`
    /// is one past the last line (half-open range convenience).
    pub fn line_start(&self, line: usize) -> usize {
        self.line_starts.get(line).copied().unwrap_or(self.len)
    }

    /// Number of lines, matching the length of the stored line array: a
    /// trailing `\n` terminates the last line rather than opening an empty
    /// one.
    pub fn line_count(&self) -> usize {
        if self.ends_with_newline && self.len > 0 {
            self.line_starts.len() - 1
        } else {
            self.line_starts.len()
        }
    }

    /// Convert a half-open byte range into a half-open line range
    /// `[start_line, end_line)`.
    pub fn span_of(&self, range: &std::ops::Range<usize>) -> (usize, usize) {
        let start_line = self.line_of(range.start);
        let end_line = if range.end > range.start {
            self.line_of(range.end.saturating_sub(1)) + 1
        } else {
            start_line + 1
        };
        (start_line, end_line)
    }
}

/// Split normalized text into lines with terminators preserved, so that
/// concatenating the array reproduces the text byte-for-byte.
pub fn lines_with_terminators(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut start = 0;
    for (idx, byte) in text.bytes().enumerate() {
        if byte == b'\n' {
            out.push(text[start..=idx].to_string());
            start = idx + 1;
        }
    }
    if start < text.len() || text.is_empty() {
        out.push(text[start..].to_string());
    }
    out
}
