use once_cell::sync::Lazy;
use regex::Regex;

static CHART_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#\s*@([\w\-./]+)").expect("chart reference pattern is valid"));

static TOP_LEVEL_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\S+):").expect("top-level key pattern is valid"));

/// The chart reference of an `# @<ref>` annotation anywhere on the line.
pub fn chart_ref(line: &str) -> Option<&str> {
    CHART_REF
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// The key of a zero-indent `key:` line. Comment lines never yield a key.
pub fn top_level_key(line: &str) -> Option<&str> {
    if line.starts_with('#') {
        return None;
    }
    TOP_LEVEL_KEY
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
