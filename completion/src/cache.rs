use std::collections::HashMap;

use tracing::debug;

use crate::cancel::CancelToken;
use crate::error::FetchError;
use crate::provider::ValueTreeProvider;
use crate::value::ValueNode;

/// Memo of chart reference to fetched values tree.
///
/// Lives as long as its owner and is never invalidated. Only successful
/// fetches are stored: a failed chart is fetched again on the next request.
#[derive(Debug, Default)]
pub struct ValueCache {
    trees: HashMap<String, ValueNode>,
    hits: usize,
    misses: usize,
}

impl ValueCache {
    pub fn new() -> Self {
        ValueCache::default()
    }

    /// Return the cached tree for `chart_ref`, fetching it on a miss.
    pub fn get_or_fetch<P>(
        &mut self,
        chart_ref: &str,
        provider: &P,
        cancel: &CancelToken,
    ) -> Result<&ValueNode, FetchError>
    where
        P: ValueTreeProvider + ?Sized,
    {
        if self.trees.contains_key(chart_ref) {
            self.hits += 1;
            debug!(chart_ref, "values cache hit");
        } else {
            self.misses += 1;
            debug!(chart_ref, "values cache miss");
            let tree = provider.fetch(chart_ref, cancel)?;
            self.trees.insert(chart_ref.to_string(), tree);
        }
        self.trees
            .get(chart_ref)
            .ok_or_else(|| FetchError::execution(chart_ref, "values cache lost an entry"))
    }

    /// Cached tree without fetching.
    pub fn get(&self, chart_ref: &str) -> Option<&ValueNode> {
        self.trees.get(chart_ref)
    }

    pub fn contains(&self, chart_ref: &str) -> bool {
        self.trees.contains_key(chart_ref)
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }
}
