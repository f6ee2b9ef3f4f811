use std::path::Path;

use serde::Serialize;
use tracing::{debug, error, warn};
use valuesdoc::{Document, Position, locate, resolve_path, scan};

use crate::cache::ValueCache;
use crate::cancel::CancelToken;
use crate::config::Config;
use crate::error::{ConfigError, FetchErrorKind};
use crate::filter::{Candidate, filter};
use crate::flatten::flatten;
use crate::notice::Notice;
use crate::provider::ValueTreeProvider;
use crate::value::ValueNode;

/// One completion request: a document and a cursor in it.
#[derive(Debug, Clone, Copy)]
pub struct CompletionParams<'a> {
    pub document: &'a Document,
    pub position: Position,
}

/// Range replaced when an item is accepted: 0-based line, character columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EditRange {
    pub line: usize,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// A key holding nested values.
    Object,
    /// A key holding a default value.
    Value,
}

/// Enough to find an item's node again on resolve or execute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemData {
    pub chart_ref: String,
    pub path: Vec<String>,
}

/// A completion record handed to the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionItem {
    pub label: String,
    pub insert_text: String,
    pub kind: ItemKind,
    /// Default value and its type, for scalar keys.
    pub detail: Option<String>,
    pub edit_range: EditRange,
    pub documentation_markdown: Option<String>,
    pub sort_key: String,
    pub data: ItemData,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompletionResponse {
    pub items: Vec<CompletionItem>,
    pub notices: Vec<Notice>,
    pub cancelled: bool,
}

impl CompletionResponse {
    pub fn empty() -> Self {
        CompletionResponse::default()
    }

    fn cancelled() -> Self {
        CompletionResponse {
            cancelled: true,
            ..CompletionResponse::default()
        }
    }

    fn notice(notice: Notice) -> Self {
        CompletionResponse {
            notices: vec![notice],
            ..CompletionResponse::default()
        }
    }
}

/// What the host should do when an item is executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum HostAction {
    /// Show the chart's default values for `path` in a viewer.
    ShowValues {
        chart_ref: String,
        path: Vec<String>,
        yaml: String,
    },
}

/// Receives the result of a completion request.
pub trait HostAdapter {
    fn deliver(&mut self, response: CompletionResponse);
}

impl<F: FnMut(CompletionResponse)> HostAdapter for F {
    fn deliver(&mut self, response: CompletionResponse) {
        self(response)
    }
}

/// Completion source for annotated values documents.
///
/// Owns the values cache for its whole lifetime, so one source should be
/// created per process and reused across requests.
pub struct CompletionSource<P> {
    provider: P,
    cache: ValueCache,
    patterns: Vec<glob::Pattern>,
}

impl<P: ValueTreeProvider> CompletionSource<P> {
    pub fn new(provider: P) -> Self {
        let patterns = Config::default().document_patterns().unwrap_or_default();
        CompletionSource {
            provider,
            cache: ValueCache::new(),
            patterns,
        }
    }

    pub fn with_patterns(mut self, patterns: Vec<glob::Pattern>) -> Self {
        self.patterns = patterns;
        self
    }

    pub fn cache(&self) -> &ValueCache {
        &self.cache
    }

    /// Whether documents named `name` get completions. Only the file name is
    /// matched, so `charts/app/values.yaml` and `prod-values.yml` both apply.
    pub fn is_applicable(&self, name: &str) -> bool {
        let file_name = Path::new(name)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(name);
        self.patterns.iter().any(|p| p.matches(file_name))
    }

    /// Run one completion request to the end.
    pub fn get_completions(
        &mut self,
        params: CompletionParams<'_>,
        cancel: &CancelToken,
    ) -> CompletionResponse {
        if cancel.is_cancelled() {
            return CompletionResponse::cancelled();
        }
        let CompletionParams { document, position } = params;

        let blocks = scan(document);
        let Some(block) = locate(&blocks, position.line) else {
            debug!(line = position.line, "no block encloses the cursor");
            return CompletionResponse::empty();
        };
        let Some(chart_ref) = block.chart_ref.as_deref() else {
            debug!(top_key = %block.top_key, "block has no chart annotation");
            return CompletionResponse::empty();
        };

        let path = match resolve_path(document, position) {
            Ok(path) => path,
            Err(err) => {
                warn!(error = %err, "cannot resolve cursor path");
                return CompletionResponse::notice(Notice::warning(err.to_string()));
            }
        };
        if path.first().is_some_and(|root| root != block.top_key) {
            debug!(path = %path, top_key = %block.top_key, "cursor is outside the annotated key");
            return CompletionResponse::empty();
        }

        let tree = match self.cache.get_or_fetch(chart_ref, &self.provider, cancel) {
            Ok(tree) => tree,
            Err(err) if err.kind == FetchErrorKind::Cancelled => {
                debug!(chart_ref, "completion request cancelled");
                return CompletionResponse::cancelled();
            }
            Err(err) => {
                if err.kind == FetchErrorKind::ParseFailed {
                    error!(error = %err, "chart values could not be parsed");
                } else {
                    warn!(error = %err, "chart values are unavailable");
                }
                let span = document.line_span(block.start_line);
                return CompletionResponse::notice(Notice::from_fetch_error(&err, span));
            }
        };

        let entries = flatten(tree);
        let candidates = filter(&entries, &path, &block.top_key);

        // The in-progress key is replaced; otherwise insert at the cursor.
        let start = match (path.in_progress(), document.prefix_at(position)) {
            (Some(_), Ok(prefix)) => valuesdoc::document::indentation(prefix),
            _ => position.column,
        };
        let edit_range = EditRange {
            line: position.line - 1,
            start,
            end: position.column,
        };

        let items = candidates
            .into_iter()
            .map(|candidate| to_item(candidate, chart_ref, edit_range))
            .collect();
        CompletionResponse {
            items,
            notices: Vec::new(),
            cancelled: false,
        }
    }

    /// Run a request and hand the response to `host`, exactly once.
    pub fn serve<H: HostAdapter + ?Sized>(
        &mut self,
        params: CompletionParams<'_>,
        cancel: &CancelToken,
        host: &mut H,
    ) {
        let response = self.get_completions(params, cancel);
        host.deliver(response);
    }

    /// Fill in an item's documentation from the cached values tree.
    pub fn resolve(&self, mut item: CompletionItem) -> CompletionItem {
        let Some(node) = self.lookup(&item.data) else {
            return item;
        };
        let key = item.data.path.last().map(String::as_str).unwrap_or_default();
        let mut markdown = format!("**{}** `{}`", item.data.chart_ref, item.data.path.join("."));
        if let ValueNode::Scalar { kind, .. } = node {
            markdown.push_str(&format!(" ({})", kind));
        }
        markdown.push_str("\n\n```yaml\n");
        markdown.push_str(&keyed_yaml(key, node));
        markdown.push_str("```\n");
        item.documentation_markdown = Some(markdown);
        item
    }

    /// The action a host performs when an item is executed: show the default
    /// values under the item's key.
    pub fn execute(&self, item: &CompletionItem) -> Option<HostAction> {
        let node = self.lookup(&item.data)?;
        let key = item.data.path.last()?;
        Some(HostAction::ShowValues {
            chart_ref: item.data.chart_ref.clone(),
            path: item.data.path.clone(),
            yaml: keyed_yaml(key, node),
        })
    }

    fn lookup(&self, data: &ItemData) -> Option<&ValueNode> {
        self.cache.get(&data.chart_ref)?.get_path(&data.path)
    }
}

impl CompletionSource<Box<dyn ValueTreeProvider>> {
    /// Build a source with the provider and document patterns of `config`.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let provider = config.build_provider()?;
        let patterns = config.document_patterns()?;
        Ok(CompletionSource::new(provider).with_patterns(patterns))
    }
}

fn to_item(candidate: Candidate, chart_ref: &str, edit_range: EditRange) -> CompletionItem {
    let detail = match (&candidate.scalar_text, candidate.kind) {
        (Some(text), Some(kind)) => Some(format!("{} ({})", text, kind)),
        _ => None,
    };
    CompletionItem {
        label: candidate.label,
        insert_text: candidate.insert_text,
        kind: if candidate.is_object {
            ItemKind::Object
        } else {
            ItemKind::Value
        },
        detail,
        edit_range,
        documentation_markdown: None,
        sort_key: candidate.sort_key.as_text(),
        data: ItemData {
            chart_ref: chart_ref.to_string(),
            path: candidate.path,
        },
    }
}

fn keyed_yaml(key: &str, node: &ValueNode) -> String {
    match node {
        ValueNode::Scalar { text, .. } => format!("{}: {}\n", key, text),
        ValueNode::Object(map) if map.is_empty() => format!("{}: {{}}\n", key),
        ValueNode::Object(_) => format!("{}:\n{}", key, node.to_yaml(2)),
    }
}
