use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;
use valuesdoc::CursorPath;

use crate::flatten::{Entry, SortKey};
use crate::value::ScalarKind;

/// A completion candidate derived from an [`Entry`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    /// The next-level key only.
    pub label: String,
    pub insert_text: String,
    pub is_object: bool,
    pub scalar_text: Option<String>,
    pub kind: Option<ScalarKind>,
    /// Full path of the entry relative to the chart root.
    pub path: Vec<String>,
    pub sort_key: SortKey,
}

impl Candidate {
    fn from_entry(entry: &Entry, label: &str) -> Self {
        let insert_text = match &entry.scalar_text {
            Some(text) if !entry.is_object => format!("{}: {}", label, text),
            _ => format!("{}:", label),
        };
        Candidate {
            label: label.to_string(),
            insert_text,
            is_object: entry.is_object,
            scalar_text: entry.scalar_text.clone(),
            kind: entry.kind,
            path: entry.path.clone(),
            sort_key: entry.sort_key,
        }
    }
}

/// Select the entries that complete the key at `path` inside the block
/// anchored at `top_key`.
///
/// The path's root must be `top_key`; it is stripped and the remaining
/// elements, the in-progress token last, select one level of the tree.
/// Labels are unique, first occurrence wins.
pub fn filter(entries: &[Entry], path: &CursorPath, top_key: &str) -> Vec<Candidate> {
    let elements: Vec<&str> = path.elements().collect();
    let relative = match elements.split_first() {
        Some((root, rest)) if *root == top_key => rest,
        Some((root, _)) => {
            debug!(root, top_key, "cursor path is outside the block");
            return Vec::new();
        }
        None => &[][..],
    };
    let depth = relative.len();

    let mut seen = HashSet::new();
    let candidates: Vec<Candidate> = entries
        .iter()
        .filter(|entry| entry.path.len() == depth + 1 && entry.path[..depth] == *relative)
        .filter(|entry| seen.insert(entry.path[depth].as_str()))
        .map(|entry| Candidate::from_entry(entry, &entry.path[depth]))
        .collect();

    debug!(
        depth,
        candidates = candidates.len(),
        "filtered entries against cursor path"
    );
    candidates
}
