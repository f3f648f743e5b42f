//! End-to-end pipeline tests: mine → save → load → match → rewrite.
//!
//! Exercises the public API the way the CLI does, including the round-trip
//! and ordering guarantees the engine documents.

use refix::engine::matcher::LineTokens;
use refix::engine::miner::{mine, Diff, MineMode, MineOptions};
use refix::history::patch::parse_patch;
use refix::lint::{fix_content, lint_content};
use refix::store::{load_patterns, save_patterns};
use refix::{apply, first_trigger, generalize, GeneralizeOptions};

fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_owned()).collect()
}

fn window(items: &[&str]) -> Vec<LineTokens> {
    items.iter().map(|l| LineTokens::new(*l)).collect()
}

/// generalize → match → apply over the original before line reproduces the
/// original after line.
#[test]
fn round_trip_reproduces_after_line() {
    let cases: &[(&str, &str)] = &[
        ("var x = 1;", "let x = 1;"),
        ("foo.bar(a, b)", "foo.baz(a, b)"),
        (
            "EventEmitter.listenerCount(emitter, eventName)",
            "emitter.listenerCount(eventName)",
        ),
        ("assertEquals(x, y)", "assert_eq!(x, y)"),
    ];

    for &(before, after) in cases {
        let pattern = generalize(
            &lines(&[before]),
            &lines(&[after]),
            &GeneralizeOptions::default(),
        )
        .unwrap_or_else(|| panic!("`{before}` should generalize"));

        let hit = first_trigger(&window(&[before]), std::slice::from_ref(&pattern))
            .unwrap_or_else(|| panic!("`{before}` should trigger its own pattern"));

        let replacement = apply(hit.pattern, &hit.captures);
        assert!(replacement.is_clean(), "no unbound placeholders for `{before}`");
        assert_eq!(replacement.lines, vec![after.to_owned()]);
    }
}

/// A rewritten line no longer triggers the pattern that produced it.
#[test]
fn rewrites_do_not_retrigger() {
    let pattern = generalize(
        &lines(&["var x = 1;"]),
        &lines(&["let x = 1;"]),
        &GeneralizeOptions::default(),
    )
    .expect("pair should generalize");

    let hit = first_trigger(&window(&["var x = 1;"]), std::slice::from_ref(&pattern))
        .expect("before line should trigger");
    let rewritten = apply(hit.pattern, &hit.captures).lines;
    let rewritten: Vec<&str> = rewritten.iter().map(String::as_str).collect();

    assert!(first_trigger(&window(&rewritten), std::slice::from_ref(&pattern)).is_none());
}

#[test]
fn mismatched_diffs_skipped_others_survive() {
    let diffs = vec![
        Diff {
            before: lines(&["a();", "b();"]),
            after: lines(&["c();"]),
            meta: None,
        },
        Diff {
            before: lines(&["var n = 0;"]),
            after: lines(&["let n = 0;"]),
            meta: None,
        },
    ];
    let patterns = mine(&diffs, &MineOptions::default());
    assert_eq!(patterns.len(), 1);
    assert_eq!(patterns[0].before_lines(), vec!["var n = 0;"]);
}

/// Mined pattern order survives a save/load cycle, and matching respects it.
#[test]
fn persisted_order_is_first_match_wins() {
    let diffs = vec![
        Diff {
            before: lines(&["old(a)"]),
            after: lines(&["first(a)"]),
            meta: None,
        },
        Diff {
            before: lines(&["old(a) + extra"]),
            after: lines(&["second(a)"]),
            meta: None,
        },
    ];
    let mined = mine(&diffs, &MineOptions::default());
    assert_eq!(mined.len(), 2);

    let dir = tempfile::tempdir().expect("tempdir");
    let rule_file = dir.path().join("refix.json");
    save_patterns(&rule_file, &mined).expect("save");
    let loaded = load_patterns(&rule_file).expect("load");
    assert_eq!(loaded.len(), 2);

    // Both patterns can trigger on this line; the earlier one must win.
    let hit = first_trigger(&window(&["old(a) + extra"]), &loaded).expect("should trigger");
    assert_eq!(hit.pattern_index, 0);
}

#[test]
fn patch_to_fix_pipeline() {
    let patch = "\
diff --git a/src/app.js b/src/app.js
--- a/src/app.js
+++ b/src/app.js
@@ -1,3 +1,3 @@
 function main() {
-  var count = 0;
+  let count = 0;
 }
";
    let diffs = parse_patch(patch, None);
    let patterns = mine(&diffs, &MineOptions::default());
    assert_eq!(patterns.len(), 1);

    let source = "start();\nvar count = 0; // counter\nend();\n";
    let results = lint_content(source, &patterns, "app.js");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].line, 2);
    assert_eq!(results[0].suggestion.as_deref(), Some("let count = 0;"));

    let fixed = fix_content(source, &patterns);
    assert_eq!(fixed, "start();\nlet count = 0; // counter\nend();\n");

    // Second pass is a no-op.
    assert_eq!(fix_content(&fixed, &patterns), fixed);
    assert!(lint_content(&fixed, &patterns, "app.js").is_empty());
}

#[test]
fn detailed_mining_carries_commit_provenance() {
    let diffs = vec![Diff {
        before: lines(&["if (flag) {", "legacyPath();", "}"]),
        after: lines(&["modernPath(flag);"]),
        meta: Some(refix::CommitInfo {
            author: Some("ada".to_owned()),
            message: Some("retire legacy path".to_owned()),
            hash: Some("deadbeef".to_owned()),
        }),
    }];
    let opts = MineOptions {
        mode: MineMode::Detailed,
        ..MineOptions::default()
    };
    let patterns = mine(&diffs, &opts);
    assert_eq!(patterns.len(), 1);
    assert_eq!(
        patterns[0].message.as_deref(),
        Some("ada: retire legacy path")
    );

    let source = "if (flag) {\n  legacyPath();\n}\n";
    let fixed = fix_content(source, &patterns);
    assert_eq!(fixed, "modernPath(flag);\n");
}

/// Regex patterns loaded from a rule file behave per the documented example:
/// `new Foo;` must not trigger, `new (Foo);` must produce `new Foo();`.
#[test]
fn regex_rule_file_end_to_end() {
    let dir = tempfile::tempdir().expect("tempdir");
    let rule_file = dir.path().join("refix.json");
    std::fs::write(
        &rule_file,
        r#"[{"before": "new \\((.*)\\);", "after": "new $1();", "isRegex": true}]"#,
    )
    .expect("write rules");

    let patterns = load_patterns(&rule_file).expect("load");
    assert!(lint_content("new Foo;\n", &patterns, "a.js").is_empty());

    let results = lint_content("new (Foo);\n", &patterns, "a.js");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].suggestion.as_deref(), Some("new Foo();"));
    assert_eq!(fix_content("new (Foo);\n", &patterns), "new Foo();\n");
}

#[test]
fn case_insensitive_rule_from_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let rule_file = dir.path().join("refix.json");
    std::fs::write(
        &rule_file,
        r#"[{"before": "foo()", "after": "bar()", "matchCase": false}]"#,
    )
    .expect("write rules");

    let patterns = load_patterns(&rule_file).expect("load");
    let results = lint_content("Foo();\n", &patterns, "a.js");
    assert_eq!(results.len(), 1);
}

/// Literal matching is subsequence-based: intervening tokens are fine,
/// order violations are not.
#[test]
fn subsequence_matching_from_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let rule_file = dir.path().join("refix.json");
    std::fs::write(&rule_file, r#"[{"before": "a b", "after": "ok"}]"#).expect("write rules");
    let patterns = load_patterns(&rule_file).expect("load");

    assert_eq!(lint_content("a x b\n", &patterns, "t").len(), 1);
    assert!(lint_content("b a\n", &patterns, "t").is_empty());
}
