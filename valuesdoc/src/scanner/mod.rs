mod patterns;

pub use patterns::{chart_ref, top_level_key};

use tracing::debug;

use crate::block::{Block, Blocks};
use crate::document::Document;

/// An annotation waiting for its top-level key.
struct Pending {
    chart_ref: String,
    line: usize,
}

/// Scan a document into blocks in a single pass.
///
/// `# @<chart-ref>` opens a pending annotation. The top-level key on the same
/// line, or on the line right after, commits it. Every other zero-indent key
/// opens an unannotated block.
pub fn scan(document: &Document) -> Blocks {
    let mut blocks = Blocks::new();
    let mut pending: Option<Pending> = None;
    let mut ordinal = 0;

    for (number, text) in document.lines() {
        // An annotation only reaches the line immediately after it.
        if let Some(stale) = pending.take_if(|p| p.line + 1 < number) {
            debug!(
                chart_ref = %stale.chart_ref,
                line = stale.line,
                "annotation not followed by a top-level key, dropped"
            );
        }

        if let Some(reference) = chart_ref(text) {
            pending = Some(Pending {
                chart_ref: reference.to_string(),
                line: number,
            });
        }

        let Some(key) = top_level_key(text) else {
            continue;
        };

        let (chart_ref, start_line) = match pending.take() {
            Some(p) => (Some(p.chart_ref), p.line),
            None => (None, number),
        };
        let block = Block {
            top_key: key.to_string(),
            chart_ref,
            start_line,
            key_line: number,
            ordinal,
        };
        ordinal += 1;

        debug!(
            top_key = %block.top_key,
            chart_ref = ?block.chart_ref,
            start_line = block.start_line,
            "committed block"
        );
        if let Some(previous) = blocks.commit(block) {
            debug!(
                top_key = %previous.top_key,
                line = previous.key_line,
                "duplicate top-level key replaces earlier block"
            );
        }
    }

    blocks
}
