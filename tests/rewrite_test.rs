use actionpin::lookup::MemoryLookup;
use actionpin::rewrite::*;
use actionpin::types::LineShape;

const SHA: &str = "b4ffde65f46336ab88eb53be808477a3936bae11";
const OTHER_SHA: &str = "11bd71901bbe5b1630ceea73d27597364c9af683";

fn checkout_lookup() -> MemoryLookup {
    MemoryLookup::new()
        .with_commit_tag("actions/checkout", "v4", SHA)
        .with_commit_tag("actions/checkout", "v4.1.1", SHA)
}

#[test]
fn test_parse_step_splits_parts() {
    let step = parse_step("      uses: github/codeql-action/init@v3   # pinned later").unwrap();
    assert_eq!(step.prefix, "      uses: ");
    assert_eq!(step.repository_slug, "github/codeql-action/init");
    assert_eq!(step.git_ref, "v3");
    assert_eq!(step.separator, "   ");
    assert_eq!(step.trailing_comment.as_deref(), Some("# pinned later"));
}

#[test]
fn test_classify_unrelated_lines() {
    for line in [
        "  runs-on: ubuntu-latest",
        "uses: actions/checkout@v4",
        "  uses: ./local-action",
        "  uses: docker://alpine:3.19",
        "  uses: actions/checkout@main",
        "  uses: checkout@v4",
        "  uses: actions/checkout@v4 trailing",
        "",
    ] {
        assert_eq!(classify(line), LineShape::Unrelated, "line {line:?}");
    }
}

#[test]
fn test_classify_precedence() {
    assert!(matches!(
        classify(&format!("  uses: actions/checkout@{SHA}  # v4")),
        LineShape::PinnedAnnotated(_)
    ));
    assert!(matches!(
        classify(&format!("  uses: actions/checkout@{SHA}")),
        LineShape::PinnedBare(_)
    ));
    assert!(matches!(
        classify(&format!("  uses: actions/checkout@{SHA}  #")),
        LineShape::PinnedBare(_)
    ));
    assert!(matches!(
        classify("  uses: actions/checkout@v4"),
        LineShape::TagReference(_)
    ));
}

#[test]
fn test_unrelated_line_untouched() {
    let lookup = checkout_lookup();
    let rewriter = LineRewriter::new(&lookup);
    let outcome = rewriter.process("  runs-on: ubuntu-latest");
    assert!(!outcome.changed);
    assert_eq!(outcome.new_line, "  runs-on: ubuntu-latest");
    assert_eq!(lookup.ref_calls() + lookup.list_calls(), 0);
}

#[test]
fn test_pin_adds_tag_comment() {
    let lookup = checkout_lookup();
    let rewriter = LineRewriter::new(&lookup);
    let outcome = rewriter.process("  uses: actions/checkout@v4");
    assert!(outcome.changed);
    assert_eq!(outcome.new_line, format!("  uses: actions/checkout@{SHA}  # v4"));
}

#[test]
fn test_pin_preserves_existing_comment() {
    let lookup = checkout_lookup();
    let rewriter = LineRewriter::new(&lookup);
    let outcome = rewriter.process("    uses: actions/checkout@v4.1.1 # keep me");
    assert!(outcome.changed);
    assert_eq!(
        outcome.new_line,
        format!("    uses: actions/checkout@{SHA} # keep me")
    );
}

#[test]
fn test_pin_unresolved_tag_unchanged() {
    let lookup = checkout_lookup();
    let rewriter = LineRewriter::new(&lookup);
    let line = "  uses: actions/checkout@v9";
    let outcome = rewriter.process(line);
    assert!(!outcome.changed);
    assert_eq!(outcome.new_line, line);
}

#[test]
fn test_lookup_failure_leaves_line_unchanged() {
    let lookup = MemoryLookup::new().with_failing_repo("actions/checkout");
    let rewriter = LineRewriter::new(&lookup);
    for line in [
        "  uses: actions/checkout@v4".to_string(),
        format!("  uses: actions/checkout@{SHA}"),
    ] {
        let outcome = rewriter.process(&line);
        assert!(!outcome.changed);
        assert_eq!(outcome.new_line, line);
    }
}

#[test]
fn test_annotated_pinned_line_never_queried() {
    let lookup = checkout_lookup();
    let rewriter = LineRewriter::new(&lookup);
    let line = format!("  uses: actions/checkout@{SHA}  # v4.1.0");
    let outcome = rewriter.process(&line);
    assert!(!outcome.changed);
    assert_eq!(outcome.new_line, line);
    assert_eq!(lookup.list_calls(), 0);
    assert_eq!(lookup.ref_calls(), 0);
}

#[test]
fn test_bare_comment_triggers_label_lookup() {
    let lookup = checkout_lookup();
    let rewriter = LineRewriter::new(&lookup);
    let outcome = rewriter.process(&format!("  uses: actions/checkout@{SHA}  #"));
    assert_eq!(lookup.list_calls(), 1);
    assert!(outcome.changed);
    assert_eq!(outcome.new_line, format!("  uses: actions/checkout@{SHA}  # v4"));
}

#[test]
fn test_pinned_without_comment_gets_label() {
    let lookup = checkout_lookup();
    let rewriter = LineRewriter::new(&lookup);
    let outcome = rewriter.process(&format!("  uses: actions/checkout@{SHA}"));
    assert!(outcome.changed);
    assert_eq!(outcome.new_line, format!("  uses: actions/checkout@{SHA}  # v4"));
}

#[test]
fn test_pinned_unknown_commit_unchanged() {
    let lookup = checkout_lookup();
    let rewriter = LineRewriter::new(&lookup);
    let line = format!("  uses: actions/checkout@{OTHER_SHA}");
    let outcome = rewriter.process(&line);
    assert!(!outcome.changed);
    assert_eq!(outcome.new_line, line);
}

#[test]
fn test_rewrite_is_idempotent() {
    let lookup = checkout_lookup();
    let rewriter = LineRewriter::new(&lookup);
    for line in [
        "  uses: actions/checkout@v4".to_string(),
        format!("  uses: actions/checkout@{SHA}"),
    ] {
        let first = rewriter.process(&line);
        assert!(first.changed);
        let second = rewriter.process(&first.new_line);
        assert!(!second.changed, "second pass changed {:?}", first.new_line);
        assert_eq!(second.new_line, first.new_line);
    }
}

#[test]
fn test_pin_replaces_bare_comment_with_tag() {
    let lookup = checkout_lookup();
    let rewriter = LineRewriter::new(&lookup);
    let first = rewriter.process("  uses: actions/checkout@v4  #");
    assert!(first.changed);
    assert_eq!(first.new_line, format!("  uses: actions/checkout@{SHA}  # v4"));

    let second = rewriter.process(&first.new_line);
    assert!(!second.changed);
    assert_eq!(second.new_line, first.new_line);
}
