use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::Position;
use crate::document::{Document, indentation, is_blank_or_comment};
use crate::error::ScanError;

static KEY_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([^:]+):").expect("key line pattern is valid"));

static BARE_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([^:]+)$").expect("bare key pattern is valid"));

/// The chain of keys enclosing a cursor, outermost first.
///
/// `segments` are keys of ancestor lines (each one ending in a colon). A bare
/// key being typed on the cursor line is kept apart as `in_progress`: it is
/// the last element of the path but is not yet a committed key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CursorPath {
    segments: Vec<String>,
    in_progress: Option<String>,
}

impl CursorPath {
    pub fn new(segments: Vec<String>, in_progress: Option<String>) -> Self {
        CursorPath {
            segments,
            in_progress,
        }
    }

    /// Committed keys, outermost first.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn in_progress(&self) -> Option<&str> {
        self.in_progress.as_deref()
    }

    /// All elements, the in-progress token last.
    pub fn elements(&self) -> impl Iterator<Item = &str> {
        self.segments
            .iter()
            .map(String::as_str)
            .chain(self.in_progress.as_deref())
    }

    pub fn first(&self) -> Option<&str> {
        self.elements().next()
    }

    pub fn len(&self) -> usize {
        self.segments.len() + usize::from(self.in_progress.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for CursorPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for segment in &self.segments {
            if !first {
                write!(f, ".")?;
            }
            write!(f, "{}", segment)?;
            first = false;
        }
        if let Some(partial) = &self.in_progress {
            if !first {
                write!(f, ".")?;
            }
            write!(f, "{}…", partial)?;
        }
        Ok(())
    }
}

/// Reconstruct the key path at `position` from indentation alone.
///
/// Walks upward from the cursor line collecting `key:` lines whose
/// indentation is strictly smaller than the last one taken, and stops after
/// a zero-indent key.
pub fn resolve_path(document: &Document, position: Position) -> Result<CursorPath, ScanError> {
    let prefix = document.prefix_at(position)?;
    let mut depth = indentation(prefix);

    let in_progress = BARE_KEY
        .captures(prefix)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|token| !token.is_empty() && !token.starts_with('#'))
        .map(str::to_string);

    let mut segments = Vec::new();
    if depth > 0 {
        let above = position.line.saturating_sub(1);
        for (_, text) in document.lines().take(above).rev() {
            if is_blank_or_comment(text) {
                continue;
            }
            let indent = indentation(text);
            if indent >= depth {
                continue;
            }
            let Some(key) = KEY_LINE
                .captures(text)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().trim())
            else {
                continue;
            };
            segments.push(key.to_string());
            depth = indent;
            if depth == 0 {
                break;
            }
        }
        segments.reverse();
    }

    let path = CursorPath::new(segments, in_progress);
    debug!(line = position.line, column = position.column, path = %path, "resolved cursor path");
    Ok(path)
}
