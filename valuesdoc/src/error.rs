use thiserror::Error;

/// Errors raised when a cursor position does not fit the document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("line {line} is out of range (document has {total} lines)")]
    LineOutOfRange { line: usize, total: usize },
    #[error("column {column} is past the end of line {line} ({len} characters)")]
    ColumnOutOfRange {
        line: usize,
        column: usize,
        len: usize,
    },
}
