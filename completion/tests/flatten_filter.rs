use indoc::indoc;

use completion::provider::parse_values;
use completion::{Entry, ScalarKind, SortKey, ValueNode, filter, flatten};
use valuesdoc::CursorPath;

fn tree(yaml: &str) -> ValueNode {
    parse_values("test/chart", yaml).expect("valid values")
}

fn path(segments: &[&str], in_progress: Option<&str>) -> CursorPath {
    CursorPath::new(
        segments.iter().map(|s| s.to_string()).collect(),
        in_progress.map(str::to_string),
    )
}

fn labels(candidates: &[completion::Candidate]) -> Vec<&str> {
    candidates.iter().map(|c| c.label.as_str()).collect()
}

const NESTED: &str = indoc! {"
    a:
      b: 1
      c: 2
    d: 3
"};

#[test]
fn flatten_emits_objects_and_scalars() {
    let entries = flatten(&tree(NESTED));
    let paths: Vec<String> = entries.iter().map(Entry::dotted).collect();
    // Objects sort before scalars; scalars keep emission order.
    assert_eq!(paths, vec!["a", "a.b", "a.c", "d"]);

    let a = &entries[0];
    assert!(a.is_object);
    assert_eq!(a.scalar_text, None);
    assert_eq!(a.sort_key.rank, 0);

    let d = &entries[3];
    assert!(!d.is_object);
    assert_eq!(d.scalar_text.as_deref(), Some("3"));
    assert_eq!(d.kind, Some(ScalarKind::Number));
}

#[test]
fn flatten_is_idempotent() {
    let values = tree(indoc! {r#"
        image:
          repository: nginx
          tag: "1.25"
          pullPolicy: IfNotPresent
        replicaCount: 1
        service:
          type: ClusterIP
          ports:
            http: 80
        tolerations: []
        nodeSelector: {}
    "#});
    assert_eq!(flatten(&values), flatten(&values));
}

#[test]
fn scalar_representations() {
    let entries = flatten(&tree(indoc! {r#"
        name: "web"
        quoted: 'say "hi"'
        enabled: false
        ratio: 0.5
        empty: ~
        hosts: [a, b]
    "#}));
    let text = |key: &str| {
        entries
            .iter()
            .find(|e| e.key() == key)
            .and_then(|e| e.scalar_text.clone())
            .unwrap()
    };
    assert_eq!(text("name"), "\"web\"");
    assert_eq!(text("quoted"), r#""say \"hi\"""#);
    assert_eq!(text("enabled"), "false");
    assert_eq!(text("ratio"), "0.5");
    assert_eq!(text("empty"), "null");
    assert_eq!(text("hosts"), r#"["a","b"]"#);
}

#[test]
fn top_level_completeness() {
    let entries = flatten(&tree(indoc! {"
        a: 1
        b:
          nested: true
        c: x
    "}));
    let candidates = filter(&entries, &path(&["app"], None), "app");
    assert_eq!(labels(&candidates), vec!["b", "a", "c"]);
    assert!(candidates[0].is_object);

    // An empty path selects the chart root as well.
    let candidates = filter(&entries, &CursorPath::default(), "app");
    assert_eq!(labels(&candidates), vec!["b", "a", "c"]);
}

#[test]
fn nested_scoping() {
    let entries = flatten(&tree(NESTED));
    let candidates = filter(&entries, &path(&["app", "a"], None), "app");
    assert_eq!(labels(&candidates), vec!["b", "c"]);
    assert_eq!(candidates[0].insert_text, "b: 1");
    assert_eq!(candidates[0].path, vec!["a", "b"]);
}

#[test]
fn in_progress_token_is_the_last_level() {
    let entries = flatten(&tree(indoc! {"
        a:
          x:
            y: 1
          z: 2
    "}));
    let candidates = filter(&entries, &path(&["app", "a"], Some("x")), "app");
    assert_eq!(labels(&candidates), vec!["y"]);
    assert_eq!(candidates[0].path, vec!["a", "x", "y"]);

    // A token naming a scalar or nothing at all has no children.
    assert!(filter(&entries, &path(&["app", "a"], Some("z")), "app").is_empty());
    assert!(filter(&entries, &path(&["app", "a"], Some("q")), "app").is_empty());
}

#[test]
fn object_candidates_insert_key_with_colon() {
    let entries = flatten(&tree(NESTED));
    let candidates = filter(&entries, &path(&["app"], None), "app");
    let a = candidates.iter().find(|c| c.label == "a").unwrap();
    assert_eq!(a.insert_text, "a:");
    let d = candidates.iter().find(|c| c.label == "d").unwrap();
    assert_eq!(d.insert_text, "d: 3");
}

#[test]
fn block_isolation() {
    let redis = flatten(&tree("auth:\n  enabled: true\n"));
    // Cursor lives under `postgres`, but the entries come from the redis block.
    let candidates = filter(&redis, &path(&["postgres", "primary"], None), "redis");
    assert!(candidates.is_empty());
    // Typing a new top-level key is outside every block.
    let candidates = filter(&redis, &path(&[], Some("post")), "redis");
    assert!(candidates.is_empty());
}

#[test]
fn unknown_nested_path_is_empty() {
    let entries = flatten(&tree(NESTED));
    assert!(filter(&entries, &path(&["app", "missing"], None), "app").is_empty());
    assert!(filter(&entries, &path(&["app", "d"], None), "app").is_empty());
}

#[test]
fn dedup_keeps_first_entry() {
    let entry = |path: &[&str], is_object: bool, sequence: usize| Entry {
        path: path.iter().map(|s| s.to_string()).collect(),
        is_object,
        scalar_text: (!is_object).then(|| sequence.to_string()),
        kind: (!is_object).then_some(ScalarKind::Number),
        sort_key: SortKey {
            rank: u8::from(!is_object),
            sequence,
        },
    };
    let entries = vec![
        entry(&["x", "dup"], true, 0),
        entry(&["x", "other"], false, 1),
        entry(&["x", "dup"], false, 2),
    ];
    let candidates = filter(&entries, &path(&["app", "x"], None), "app");
    assert_eq!(labels(&candidates), vec!["dup", "other"]);
    assert!(candidates[0].is_object);
    assert_eq!(candidates[0].insert_text, "dup:");
}

#[test]
fn empty_values_are_an_empty_object() {
    assert_eq!(tree(""), ValueNode::empty_object());
    assert!(flatten(&tree("")).is_empty());
}

#[test]
fn non_mapping_root_fails_to_parse() {
    let err = parse_values("x/y", "- a\n- b\n").unwrap_err();
    assert_eq!(err.kind, completion::FetchErrorKind::ParseFailed);
    let err = parse_values("x/y", "a: [unclosed\n").unwrap_err();
    assert_eq!(err.kind, completion::FetchErrorKind::ParseFailed);
}
