use indoc::indoc;

use valuesdoc::{Document, Position, ScanError, locate, resolve_path, scan};

fn doc(source: &str) -> Document {
    Document::new("values.yaml", source)
}

const TWO_CHARTS: &str = indoc! {"
    # @bitnami/redis
    redis:
      auth:
        enabled: true
        pass
      architecture: replication

    plain:
      key: value

    postgres: # @bitnami/postgresql
      primary:
        persistence:
          size: 8Gi
"};

#[test]
fn scans_annotated_and_plain_blocks() {
    let blocks = scan(&doc(TWO_CHARTS));
    assert_eq!(blocks.len(), 3);

    let redis = blocks.get("redis").unwrap();
    assert_eq!(redis.chart_ref.as_deref(), Some("bitnami/redis"));
    assert_eq!(redis.start_line, 1);
    assert_eq!(redis.key_line, 2);

    let plain = blocks.get("plain").unwrap();
    assert_eq!(plain.chart_ref, None);
    assert_eq!(plain.start_line, 8);

    let postgres = blocks.get("postgres").unwrap();
    assert_eq!(postgres.chart_ref.as_deref(), Some("bitnami/postgresql"));
    assert_eq!(postgres.start_line, 11);
    assert_eq!(postgres.key_line, 11);

    let annotated: Vec<&str> = blocks.annotated().map(|b| b.top_key.as_str()).collect();
    assert_eq!(annotated, vec!["redis", "postgres"]);
}

#[test]
fn duplicate_top_key_last_wins() {
    let source = indoc! {"
        # @first/chart
        app:
          a: 1
        # @second/chart
        app:
          b: 2
    "};
    let blocks = scan(&doc(source));
    assert_eq!(blocks.len(), 1);
    let app = blocks.get("app").unwrap();
    assert_eq!(app.chart_ref.as_deref(), Some("second/chart"));
    assert_eq!(app.start_line, 4);
    assert_eq!(app.ordinal, 1);
}

#[test]
fn annotation_must_be_followed_by_key() {
    let source = indoc! {"
        # @lost/chart

        app:
          a: 1
    "};
    let blocks = scan(&doc(source));
    let app = blocks.get("app").unwrap();
    assert_eq!(app.chart_ref, None);
    assert_eq!(app.start_line, 3);
}

#[test]
fn malformed_annotation_is_unannotated_block() {
    let source = "# @\napp:\n  a: 1\n";
    let blocks = scan(&doc(source));
    assert_eq!(blocks.get("app").unwrap().chart_ref, None);
}

#[test]
fn comments_never_supply_keys() {
    let source = "#commented: true\n#   @\nreal: 1\n";
    let blocks = scan(&doc(source));
    assert_eq!(blocks.len(), 1);
    assert!(blocks.get("real").is_some());
}

#[test]
fn locate_picks_greatest_start_line() {
    let blocks = scan(&doc(TWO_CHARTS));
    assert_eq!(locate(&blocks, 1).unwrap().top_key, "redis");
    assert_eq!(locate(&blocks, 5).unwrap().top_key, "redis");
    assert_eq!(locate(&blocks, 9).unwrap().top_key, "plain");
    assert_eq!(locate(&blocks, 14).unwrap().top_key, "postgres");
}

#[test]
fn locate_before_first_block_is_none() {
    let blocks = scan(&doc("\n\n# @a/b\nx:\n"));
    assert!(locate(&blocks, 2).is_none());
    assert_eq!(locate(&blocks, 3).unwrap().top_key, "x");
}

#[test]
fn path_to_in_progress_key() {
    let document = doc(TWO_CHARTS);
    let path = resolve_path(&document, Position::new(5, 8)).unwrap();
    assert_eq!(path.segments(), ["redis", "auth"]);
    assert_eq!(path.in_progress(), Some("pass"));
    let all: Vec<&str> = path.elements().collect();
    assert_eq!(all, vec!["redis", "auth", "pass"]);
}

#[test]
fn path_skips_siblings_and_deeper_lines() {
    let document = doc(TWO_CHARTS);
    // Cursor at the start of `architecture` (indentation 2).
    let path = resolve_path(&document, Position::new(6, 2)).unwrap();
    assert_eq!(path.segments(), ["redis"]);
    assert_eq!(path.in_progress(), None);

    let path = resolve_path(&document, Position::new(14, 6)).unwrap();
    assert_eq!(path.segments(), ["postgres", "primary", "persistence"]);
}

#[test]
fn path_on_blank_indented_line() {
    let source = "redis:\n  auth:\n    \n";
    let path = resolve_path(&doc(source), Position::new(3, 4)).unwrap();
    assert_eq!(path.segments(), ["redis", "auth"]);
    assert_eq!(path.in_progress(), None);
}

#[test]
fn path_at_zero_indent_is_only_token() {
    let source = "redis:\n  a: 1\nred";
    let path = resolve_path(&doc(source), Position::new(3, 3)).unwrap();
    assert!(path.segments().is_empty());
    assert_eq!(path.in_progress(), Some("red"));

    let path = resolve_path(&doc(source), Position::new(3, 0)).unwrap();
    assert!(path.is_empty());
}

#[test]
fn path_ignores_comment_ancestors() {
    let source = indoc! {"
        app:
          # nested: comment
          image:
        # top: comment
            tag
    "};
    let path = resolve_path(&doc(source), Position::new(5, 7)).unwrap();
    assert_eq!(path.segments(), ["app", "image"]);
    assert_eq!(path.in_progress(), Some("tag"));
}

#[test]
fn cursor_out_of_range() {
    let document = doc("a:\n  b: 1\n");
    assert_eq!(
        resolve_path(&document, Position::new(9, 0)),
        Err(ScanError::LineOutOfRange { line: 9, total: 2 })
    );
    assert!(matches!(
        resolve_path(&document, Position::new(2, 40)),
        Err(ScanError::ColumnOutOfRange { .. })
    ));
    // The empty line after a trailing newline is addressable.
    assert!(resolve_path(&document, Position::new(3, 0)).unwrap().is_empty());
}
