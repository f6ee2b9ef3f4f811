use std::collections::HashMap;
use std::path::PathBuf;

use super::{ValueTreeProvider, parse_values};
use crate::cancel::CancelToken;
use crate::error::FetchError;
use crate::value::ValueNode;

/// Reads chart defaults from `<dir>/<chart_ref>.yaml`, with every `/` in the
/// reference replaced by `__`.
#[derive(Debug, Clone)]
pub struct FixtureProvider {
    dir: PathBuf,
}

impl FixtureProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FixtureProvider { dir: dir.into() }
    }

    pub fn path_for(&self, chart_ref: &str) -> PathBuf {
        self.dir.join(format!("{}.yaml", chart_ref.replace('/', "__")))
    }
}

impl ValueTreeProvider for FixtureProvider {
    fn fetch(&self, chart_ref: &str, cancel: &CancelToken) -> Result<ValueNode, FetchError> {
        if cancel.is_cancelled() {
            return Err(FetchError::cancelled(chart_ref));
        }
        let path = self.path_for(chart_ref);
        let text = std::fs::read_to_string(&path).map_err(|err| {
            FetchError::execution(chart_ref, format!("cannot read `{}`: {}", path.display(), err))
        })?;
        parse_values(chart_ref, &text)
    }
}

/// In-memory values YAML keyed by chart reference.
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    charts: HashMap<String, String>,
}

impl StaticProvider {
    pub fn new() -> Self {
        StaticProvider::default()
    }

    pub fn with_chart(mut self, chart_ref: impl Into<String>, yaml: impl Into<String>) -> Self {
        self.insert(chart_ref, yaml);
        self
    }

    pub fn insert(&mut self, chart_ref: impl Into<String>, yaml: impl Into<String>) {
        self.charts.insert(chart_ref.into(), yaml.into());
    }
}

impl ValueTreeProvider for StaticProvider {
    fn fetch(&self, chart_ref: &str, cancel: &CancelToken) -> Result<ValueNode, FetchError> {
        if cancel.is_cancelled() {
            return Err(FetchError::cancelled(chart_ref));
        }
        let text = self
            .charts
            .get(chart_ref)
            .ok_or_else(|| FetchError::execution(chart_ref, "chart not found"))?;
        parse_values(chart_ref, text)
    }
}
