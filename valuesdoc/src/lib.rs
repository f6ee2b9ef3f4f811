pub mod block;
pub mod document;
pub mod error;
pub mod path;
pub mod scanner;

pub use block::{Block, Blocks, locate};
pub use document::Document;
pub use error::ScanError;
pub use path::{CursorPath, resolve_path};
pub use scanner::scan;

/// A cursor position inside a [`Document`].
///
/// `line` is 1-based like the document itself; `column` is a 0-based
/// character offset into that line, the way editors report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Position { line, column }
    }
}
