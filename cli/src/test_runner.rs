use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use completion::{
    CancelToken, CompletionParams, CompletionResponse, CompletionSource, NoticeLevel,
    StaticProvider,
};
use valuesdoc::{Document, Position};

const CASE_SUFFIX: &str = ".case.toml";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpectedLevel {
    Warning,
    Error,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExpectedNotice {
    pub level: ExpectedLevel,

    /// Substring that must appear in the notice message.
    pub contains: String,
}

/// One completion scenario loaded from a `.case.toml` file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CaseConfig {
    /// Human-readable case description.
    #[serde(default)]
    pub description: Option<String>,

    /// Document file name, checked against the applicability patterns.
    #[serde(default = "default_name")]
    pub name: String,

    /// Values document under test.
    pub document: String,

    /// 1-based cursor line.
    pub line: usize,

    /// 0-based cursor column.
    pub column: usize,

    /// Inline chart values keyed by chart reference.
    #[serde(default)]
    pub charts: BTreeMap<String, String>,

    /// Expected labels, in order.
    #[serde(default)]
    pub expect_labels: Option<Vec<String>>,

    /// Expected insert texts, in order.
    #[serde(default)]
    pub expect_insert: Option<Vec<String>>,

    /// Expected notices. If present (even empty), notice count and content are checked.
    #[serde(default)]
    pub expect_notices: Option<Vec<ExpectedNotice>>,
}

fn default_name() -> String {
    "values.yaml".to_string()
}

pub enum TestOutcome {
    Pass,
    Fail(String),
}

pub struct TestResult {
    pub path: PathBuf,
    pub description: Option<String>,
    pub outcome: TestOutcome,
}

impl TestResult {
    fn fail(path: &Path, description: Option<String>, reason: String) -> Self {
        TestResult {
            path: path.to_path_buf(),
            description,
            outcome: TestOutcome::Fail(reason),
        }
    }
}

/// Run one case through a fresh completion source.
pub fn run_case(config: &CaseConfig) -> CompletionResponse {
    let mut provider = StaticProvider::new();
    for (chart_ref, yaml) in &config.charts {
        provider.insert(chart_ref.clone(), yaml.clone());
    }
    let mut source = CompletionSource::new(provider);
    if !source.is_applicable(&config.name) {
        return CompletionResponse::empty();
    }
    let document = Document::new(config.name.clone(), config.document.clone());
    source.get_completions(
        CompletionParams {
            document: &document,
            position: Position::new(config.line, config.column),
        },
        &CancelToken::new(),
    )
}

fn run_single_test(path: &Path) -> TestResult {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => return TestResult::fail(path, None, format!("cannot read file: {}", e)),
    };

    let config: CaseConfig = match toml::from_str(&content) {
        Ok(config) => config,
        Err(e) => return TestResult::fail(path, None, format!("TOML parse error: {}", e)),
    };
    let description = config.description.clone();

    let response = run_case(&config);

    if let Some(expected) = &config.expect_labels {
        let actual: Vec<&str> = response.items.iter().map(|i| i.label.as_str()).collect();
        if let Some(reason) = compare_lists("labels", expected, &actual) {
            return TestResult::fail(path, description, reason);
        }
    }

    if let Some(expected) = &config.expect_insert {
        let actual: Vec<&str> = response
            .items
            .iter()
            .map(|i| i.insert_text.as_str())
            .collect();
        if let Some(reason) = compare_lists("insert texts", expected, &actual) {
            return TestResult::fail(path, description, reason);
        }
    }

    if let Some(expected) = &config.expect_notices {
        if let Some(reason) = check_notices(&response, expected) {
            return TestResult::fail(path, description, reason);
        }
    }

    TestResult {
        path: path.to_path_buf(),
        description,
        outcome: TestOutcome::Pass,
    }
}

fn compare_lists(what: &str, expected: &[String], actual: &[&str]) -> Option<String> {
    if expected.iter().map(String::as_str).eq(actual.iter().copied()) {
        return None;
    }
    Some(format!(
        "{} mismatch\n  expected: [{}]\n  actual:   [{}]",
        what,
        expected.join(", "),
        actual.join(", ")
    ))
}

/// Check that actual notices match expectations. Returns `Some(reason)` on mismatch.
fn check_notices(response: &CompletionResponse, expected: &[ExpectedNotice]) -> Option<String> {
    let actual = &response.notices;
    if actual.len() != expected.len() {
        let actual_msgs: Vec<String> = actual
            .iter()
            .map(|n| format!("  - {:?}: {}", n.level, n.message))
            .collect();
        return Some(format!(
            "expected {} notice(s), got {}\n  actual notices:\n{}",
            expected.len(),
            actual.len(),
            if actual_msgs.is_empty() {
                "    (none)".to_string()
            } else {
                actual_msgs.join("\n")
            }
        ));
    }

    for (i, (actual, expected)) in actual.iter().zip(expected).enumerate() {
        let level_matches = matches!(
            (&expected.level, actual.level),
            (ExpectedLevel::Warning, NoticeLevel::Warning) | (ExpectedLevel::Error, NoticeLevel::Error)
        );
        if !level_matches {
            return Some(format!(
                "notice[{}]: expected {:?}, got {:?}",
                i, expected.level, actual.level
            ));
        }
        if !actual.message.contains(&expected.contains) {
            return Some(format!(
                "notice[{}]: expected message containing \"{}\", got: {}",
                i, expected.contains, actual.message
            ));
        }
    }

    None
}

fn case_label(result: &TestResult) -> String {
    result.description.clone().unwrap_or_else(|| {
        result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .map(|s| s.trim_end_matches(CASE_SUFFIX).to_string())
            .unwrap_or_else(|| "?".to_string())
    })
}

struct Palette {
    no_color: bool,
}

impl Palette {
    fn paint(&self, code: &str, text: &str) -> String {
        if self.no_color {
            text.to_string()
        } else {
            format!("\x1b[{}m{}\x1b[0m", code, text)
        }
    }

    fn pass(&self) -> String {
        self.paint("32", "PASS")
    }

    fn fail(&self) -> String {
        self.paint("31", "FAIL")
    }

    fn bold(&self, text: &str) -> String {
        self.paint("1", text)
    }
}

/// Case files of one run, grouped by the directory they sit in relative to
/// the suite root. Files at the root itself have the category "".
struct Suite {
    categories: BTreeMap<String, Vec<PathBuf>>,
}

impl Suite {
    fn load(path: &Path) -> Result<Self, String> {
        if path.is_file() {
            return Ok(Suite {
                categories: BTreeMap::from([(String::new(), vec![path.to_path_buf()])]),
            });
        }

        let pattern = format!(
            "{}/**/*{}",
            glob::Pattern::escape(&path.to_string_lossy()),
            CASE_SUFFIX
        );
        let files = glob::glob(&pattern).map_err(|e| format!("bad case pattern: {}", e))?;

        let mut categories: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
        for file in files.filter_map(Result::ok) {
            let category = file
                .parent()
                .and_then(|dir| dir.strip_prefix(path).ok())
                .map(|dir| {
                    dir.components()
                        .map(|c| c.as_os_str().to_string_lossy())
                        .collect::<Vec<_>>()
                        .join("/")
                })
                .unwrap_or_default();
            categories.entry(category).or_default().push(file);
        }
        for files in categories.values_mut() {
            files.sort();
        }
        Ok(Suite { categories })
    }

    fn label(category: &str) -> &str {
        if category.is_empty() { "(root)" } else { category }
    }

    /// Categories to run: all of them, or those named in `requested` and
    /// their subcategories. Unknown names are reported and skipped.
    fn select(&self, requested: &[String]) -> BTreeMap<&str, &[PathBuf]> {
        let all = self
            .categories
            .iter()
            .map(|(name, files)| (name.as_str(), files.as_slice()));
        if requested.is_empty() {
            return all.collect();
        }

        let mut selected = BTreeMap::new();
        for name in requested {
            let name = name.trim_matches('/');
            let nested = format!("{}/", name);
            let matching: Vec<_> = all
                .clone()
                .filter(|(category, _)| *category == name || category.starts_with(&nested))
                .collect();
            if matching.is_empty() {
                let known: Vec<&str> = self.categories.keys().map(|k| Suite::label(k)).collect();
                eprintln!(
                    "warning: category '{}' not found (available: {})",
                    name,
                    known.join(", ")
                );
            }
            selected.extend(matching);
        }
        selected
    }
}

/// Print the categories found under `path`.
pub fn list_categories(path: &Path) {
    if path.is_file() {
        eprintln!("(single file, no categories)");
        return;
    }
    let suite = match Suite::load(path) {
        Ok(suite) => suite,
        Err(e) => {
            eprintln!("error: {}", e);
            return;
        }
    };
    if suite.categories.is_empty() {
        eprintln!("no {} files found in {}", CASE_SUFFIX, path.display());
        return;
    }

    eprintln!("available categories:");
    for (category, files) in &suite.categories {
        eprintln!("  {} ({} cases)", Suite::label(category), files.len());
    }
}

/// Run all case files under `path` (or a single file).
/// If `categories` is non-empty, only run cases in those categories.
/// Returns exit code: 0 = all pass, 1 = any failure.
pub fn run_tests(path: &Path, no_color: bool, categories: &[String]) -> i32 {
    let palette = Palette { no_color };

    let suite = match Suite::load(path) {
        Ok(suite) => suite,
        Err(e) => {
            eprintln!("error: {}", e);
            return 1;
        }
    };
    if suite.categories.is_empty() {
        eprintln!("no {} files found in {}", CASE_SUFFIX, path.display());
        return 1;
    }

    let selected = if path.is_file() {
        suite.select(&[])
    } else {
        suite.select(categories)
    };
    if selected.is_empty() {
        eprintln!("no matching categories found");
        return 1;
    }

    let mut passed = 0usize;
    let mut failures: Vec<TestResult> = Vec::new();

    for (cat, files) in &selected {
        eprintln!();
        eprintln!("{}", palette.bold(Suite::label(cat)));

        for file in *files {
            let result = run_single_test(file);
            match &result.outcome {
                TestOutcome::Pass => {
                    passed += 1;
                    eprintln!("  {}  {}", palette.pass(), case_label(&result));
                }
                TestOutcome::Fail(_) => {
                    eprintln!("  {}  {}", palette.fail(), case_label(&result));
                    failures.push(result);
                }
            }
        }
    }

    if !failures.is_empty() {
        eprintln!();
        eprintln!("failures:");
        for f in &failures {
            eprintln!();
            eprintln!("  --- {} ---", f.path.display());
            if let TestOutcome::Fail(reason) = &f.outcome {
                for line in reason.lines() {
                    eprintln!("  {}", line);
                }
            }
        }
    }

    eprintln!();
    let failed = failures.len();
    if failed == 0 {
        eprintln!(
            "test result: {}. {} passed, 0 failed",
            palette.paint("32", "ok"),
            passed
        );
        0
    } else {
        eprintln!(
            "test result: {}. {} passed, {} failed (of {})",
            palette.paint("31", "FAILED"),
            passed,
            failed,
            passed + failed
        );
        1
    }
}
