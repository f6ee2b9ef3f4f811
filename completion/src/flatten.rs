use serde::Serialize;

use crate::value::{ScalarKind, ValueNode};

/// Ordering assigned while flattening: objects before scalars, then emission
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SortKey {
    /// 0 for objects, 1 for scalars.
    pub rank: u8,
    pub sequence: usize,
}

impl SortKey {
    /// Zero-padded text form, sortable as a plain string by the host.
    pub fn as_text(&self) -> String {
        format!("{}{:06}", self.rank, self.sequence)
    }
}

/// One addressable node of a values tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    pub path: Vec<String>,
    pub is_object: bool,
    /// Display form of a scalar value.
    pub scalar_text: Option<String>,
    pub kind: Option<ScalarKind>,
    pub sort_key: SortKey,
}

impl Entry {
    pub fn key(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or_default()
    }

    pub fn dotted(&self) -> String {
        self.path.join(".")
    }
}

/// Flatten a values tree into entries for every object key and scalar.
///
/// Children of an object are emitted before the object's own entry. The
/// result is sorted by [`SortKey`]; a scalar root yields nothing.
pub fn flatten(root: &ValueNode) -> Vec<Entry> {
    let mut entries = Vec::new();
    if let ValueNode::Object(map) = root {
        let mut prefix = Vec::new();
        for (key, child) in map {
            flatten_into(&mut entries, &mut prefix, key, child);
        }
    }
    entries.sort_by_key(|entry| entry.sort_key);
    entries
}

fn flatten_into(entries: &mut Vec<Entry>, prefix: &mut Vec<String>, key: &str, node: &ValueNode) {
    prefix.push(key.to_string());
    let entry = match node {
        ValueNode::Object(map) => {
            for (child_key, child) in map {
                flatten_into(entries, prefix, child_key, child);
            }
            Entry {
                path: prefix.clone(),
                is_object: true,
                scalar_text: None,
                kind: None,
                sort_key: SortKey {
                    rank: 0,
                    sequence: entries.len(),
                },
            }
        }
        ValueNode::Scalar { text, kind } => Entry {
            path: prefix.clone(),
            is_object: false,
            scalar_text: Some(text.clone()),
            kind: Some(*kind),
            sort_key: SortKey {
                rank: 1,
                sequence: entries.len(),
            },
        },
    };
    entries.push(entry);
    prefix.pop();
}
