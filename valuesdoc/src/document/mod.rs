use std::fmt;
use std::ops::Range;

use crate::Position;
use crate::error::ScanError;

/// A values document as an ordered sequence of lines, 1-indexed.
///
/// Only line structure is kept: no YAML parsing happens here. Byte offsets of
/// every line start are recorded so callers can turn a line into a span for
/// diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Display name, usually the file path.
    pub name: String,
    source: String,
    /// Byte range of each line, without its terminator.
    lines: Vec<Range<usize>>,
}

impl Document {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        let source = source.into();
        let mut lines = Vec::new();
        let mut start = 0;
        for (idx, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                let end = if idx > start && source.as_bytes()[idx - 1] == b'\r' {
                    idx - 1
                } else {
                    idx
                };
                lines.push(start..end);
                start = idx + 1;
            }
        }
        if start < source.len() {
            lines.push(start..source.len());
        }
        Document {
            name: name.into(),
            source,
            lines,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Text of a 1-based line, or `None` past the end.
    pub fn line(&self, line: usize) -> Option<&str> {
        let range = self.lines.get(line.checked_sub(1)?)?;
        Some(&self.source[range.clone()])
    }

    /// Byte span of a 1-based line in [`Document::source`].
    pub fn line_span(&self, line: usize) -> Option<Range<usize>> {
        self.lines.get(line.checked_sub(1)?).cloned()
    }

    /// Iterate `(line_number, text)` pairs, 1-based.
    pub fn lines(
        &self,
    ) -> impl DoubleEndedIterator<Item = (usize, &str)> + ExactSizeIterator + '_ {
        self.lines
            .iter()
            .enumerate()
            .map(|(idx, range)| (idx + 1, &self.source[range.clone()]))
    }

    /// The text of the cursor line up to the cursor column.
    ///
    /// A cursor on the line just past the last one (an empty trailing line)
    /// yields the empty string.
    pub fn prefix_at(&self, position: Position) -> Result<&str, ScanError> {
        let total = self.line_count();
        if position.line == 0 || position.line > total + 1 {
            return Err(ScanError::LineOutOfRange {
                line: position.line,
                total,
            });
        }
        let text = self.line(position.line).unwrap_or("");
        let len = text.chars().count();
        if position.column > len {
            return Err(ScanError::ColumnOutOfRange {
                line: position.line,
                column: position.column,
                len,
            });
        }
        let end = text
            .char_indices()
            .nth(position.column)
            .map(|(byte, _)| byte)
            .unwrap_or(text.len());
        Ok(&text[..end])
    }
}

/// Number of leading whitespace characters.
pub fn indentation(text: &str) -> usize {
    text.chars().take_while(|c| c.is_whitespace()).count()
}

/// True for lines that carry no key: blank or comment-only.
pub fn is_blank_or_comment(text: &str) -> bool {
    let trimmed = text.trim_start();
    trimmed.is_empty() || trimmed.starts_with('#')
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (number, text) in self.lines() {
            writeln!(f, "{:>4} | {}", number, text)?;
        }
        Ok(())
    }
}
