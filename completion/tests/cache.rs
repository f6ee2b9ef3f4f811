use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use completion::provider::parse_values;
use completion::{CancelToken, FetchError, ValueCache, ValueNode, ValueTreeProvider};

/// Provider that replays scripted results and counts calls.
struct Scripted {
    calls: Cell<usize>,
    results: RefCell<VecDeque<Result<String, FetchError>>>,
}

impl Scripted {
    fn new(results: Vec<Result<String, FetchError>>) -> Self {
        Scripted {
            calls: Cell::new(0),
            results: RefCell::new(results.into()),
        }
    }
}

impl ValueTreeProvider for Scripted {
    fn fetch(&self, chart_ref: &str, _cancel: &CancelToken) -> Result<ValueNode, FetchError> {
        self.calls.set(self.calls.get() + 1);
        let next = self
            .results
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(FetchError::execution(chart_ref, "script exhausted")));
        parse_values(chart_ref, &next?)
    }
}

#[test]
fn cache_reuses_successful_fetch() {
    let provider = Scripted::new(vec![Ok("a: 1\n".to_string())]);
    let mut cache = ValueCache::new();
    let cancel = CancelToken::new();

    let first = cache.get_or_fetch("x/y", &provider, &cancel).unwrap().clone();
    let second = cache.get_or_fetch("x/y", &provider, &cancel).unwrap().clone();

    assert_eq!(provider.calls.get(), 1);
    assert_eq!(first, second);
    assert_eq!(cache.hits(), 1);
    assert_eq!(cache.misses(), 1);
    assert_eq!(cache.len(), 1);
}

#[test]
fn cache_does_not_store_failures() {
    let provider = Scripted::new(vec![
        Err(FetchError::execution("x", "helm not found")),
        Ok("a: 1\n".to_string()),
    ]);
    let mut cache = ValueCache::new();
    let cancel = CancelToken::new();

    assert!(cache.get_or_fetch("x", &provider, &cancel).is_err());
    assert!(!cache.contains("x"));

    let tree = cache.get_or_fetch("x", &provider, &cancel).unwrap();
    assert!(tree.is_object());
    assert_eq!(provider.calls.get(), 2);
}

#[test]
fn parse_failures_are_retried_too() {
    let provider = Scripted::new(vec![Ok("- not\n- a map\n".to_string())]);
    let mut cache = ValueCache::new();
    let cancel = CancelToken::new();

    let err = cache.get_or_fetch("x", &provider, &cancel).unwrap_err();
    assert_eq!(err.kind, completion::FetchErrorKind::ParseFailed);
    let err = cache.get_or_fetch("x", &provider, &cancel).unwrap_err();
    assert_eq!(err.kind, completion::FetchErrorKind::ExecutionFailed);
    assert_eq!(provider.calls.get(), 2);
    assert!(cache.is_empty());
}

#[test]
fn charts_are_cached_independently() {
    let provider = Scripted::new(vec![Ok("a: 1\n".to_string()), Ok("b: 2\n".to_string())]);
    let mut cache = ValueCache::new();
    let cancel = CancelToken::new();

    cache.get_or_fetch("one", &provider, &cancel).unwrap();
    cache.get_or_fetch("two", &provider, &cancel).unwrap();
    cache.get_or_fetch("one", &provider, &cancel).unwrap();

    assert_eq!(provider.calls.get(), 2);
    assert!(cache.get("two").unwrap().get_path(&["b"]).is_some());
}
