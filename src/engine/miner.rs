//! Rule mining over a diff history.
//!
//! Consumes the ordered [`Diff`] sequence a history provider produced,
//! pairs removed lines with added lines, deduplicates equivalent pairs
//! across the whole history, and hands the survivors to the generalizer.
//! Emission order is first-seen order across the diff sequence — stable and
//! never re-sorted by frequency, so a mined rule file is reproducible for a
//! given history.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::engine::generalize::{generalize, GeneralizeOptions};
use crate::engine::pattern::{Pattern, Severity};

/// Commit provenance attached to a diff by the history provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitInfo {
    pub author: Option<String>,
    pub message: Option<String>,
    pub hash: Option<String>,
}

/// One historical change: the removed lines, the added lines, and optional
/// commit metadata. Produced by a history provider for one mining run and
/// never mutated.
#[derive(Debug, Clone, Default)]
pub struct Diff {
    pub before: Vec<String>,
    pub after: Vec<String>,
    pub meta: Option<CommitInfo>,
}

/// How diffs are decomposed into candidate pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MineMode {
    /// Pair removed line `i` with added line `i`; diffs whose line counts
    /// disagree are skipped.
    SingleLine,
    /// Forward the whole before/after block as one candidate.
    Detailed,
}

/// Knobs for one mining run.
#[derive(Debug, Clone)]
pub struct MineOptions {
    pub mode: MineMode,
    /// Line-count bound forwarded to the generalizer.
    pub max_lines: usize,
    /// Minimum number of occurrences across the history before a pair is
    /// promoted. The default of 1 applies no frequency floor.
    pub min_count: usize,
    pub severity: Severity,
}

impl Default for MineOptions {
    fn default() -> Self {
        Self {
            mode: MineMode::SingleLine,
            max_lines: 3,
            min_count: 1,
            severity: Severity::Warning,
        }
    }
}

/// Mining-time intermediate: a raw pair, its provenance, and how often it
/// recurred. Consumed exactly once by the generalizer, never persisted.
#[derive(Debug)]
struct Rule {
    before: Vec<String>,
    after: Vec<String>,
    meta: Option<CommitInfo>,
    count: usize,
}

/// Mine a pattern set from an ordered diff history.
///
/// Malformed diffs (mismatched line counts in single-line mode, empty both
/// sides) are skipped with a warning; one bad element never aborts the run.
pub fn mine(diffs: &[Diff], opts: &MineOptions) -> Vec<Pattern> {
    let mut rules: Vec<Rule> = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();

    for diff in diffs {
        if diff.before.is_empty() && diff.after.is_empty() {
            debug!("skipping empty diff");
            continue;
        }

        match opts.mode {
            MineMode::SingleLine => {
                if diff.before.len() != diff.after.len() {
                    warn!(
                        before = diff.before.len(),
                        after = diff.after.len(),
                        "skipping diff with mismatched line counts"
                    );
                    continue;
                }
                for (b, a) in diff.before.iter().zip(&diff.after) {
                    fold(
                        &mut rules,
                        &mut seen,
                        std::slice::from_ref(b),
                        std::slice::from_ref(a),
                        diff.meta.as_ref(),
                    );
                }
            }
            MineMode::Detailed => {
                fold(&mut rules, &mut seen, &diff.before, &diff.after, diff.meta.as_ref());
            }
        }
    }

    let mut patterns = Vec::new();
    for rule in rules {
        if rule.count < opts.min_count {
            continue;
        }
        let gen_opts = GeneralizeOptions {
            max_lines: opts.max_lines,
            severity: opts.severity,
            message: rule_message(opts.mode, rule.meta.as_ref()),
            ..GeneralizeOptions::default()
        };
        if let Some(pattern) = generalize(&rule.before, &rule.after, &gen_opts) {
            patterns.push(pattern);
        } else {
            debug!(count = rule.count, "pair declined by generalizer");
        }
    }

    debug!(diffs = diffs.len(), patterns = patterns.len(), "mining complete");
    patterns
}

/// Merge a raw pair into the rule list, incrementing the count of an
/// equivalent (whitespace-normalized) pair seen earlier. First occurrence
/// fixes both the list position and the provenance.
fn fold(
    rules: &mut Vec<Rule>,
    seen: &mut HashMap<String, usize>,
    before: &[String],
    after: &[String],
    meta: Option<&CommitInfo>,
) {
    let key = pair_key(before, after);
    if let Some(&idx) = seen.get(&key) {
        rules[idx].count += 1;
        return;
    }
    seen.insert(key, rules.len());
    rules.push(Rule {
        before: before.to_vec(),
        after: after.to_vec(),
        meta: meta.cloned(),
        count: 1,
    });
}

/// Whitespace-normalized identity of a pair. The `\x1f` separators cannot
/// occur in normalized text, so distinct pairs never collide.
fn pair_key(before: &[String], after: &[String]) -> String {
    let norm = |lines: &[String]| {
        lines
            .iter()
            .map(|l| l.split_whitespace().collect::<Vec<&str>>().join(" "))
            .collect::<Vec<String>>()
            .join("\x1f")
    };
    format!("{}\x1f=>\x1f{}", norm(before), norm(after))
}

/// Detailed mining attaches the commit author and subject as the pattern
/// rationale; single-line mining leaves the message empty.
fn rule_message(mode: MineMode, meta: Option<&CommitInfo>) -> Option<String> {
    if mode != MineMode::Detailed {
        return None;
    }
    let meta = meta?;
    match (&meta.author, &meta.message) {
        (Some(author), Some(message)) => Some(format!("{author}: {message}")),
        (None, Some(message)) => Some(message.clone()),
        (Some(author), None) => Some(author.clone()),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diff(before: &[&str], after: &[&str]) -> Diff {
        Diff {
            before: before.iter().map(|s| (*s).to_owned()).collect(),
            after: after.iter().map(|s| (*s).to_owned()).collect(),
            meta: None,
        }
    }

    #[test]
    fn test_single_line_mining() {
        let diffs = vec![diff(&["var x = 1;"], &["let x = 1;"])];
        let patterns = mine(&diffs, &MineOptions::default());
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].before_lines(), vec!["var x = 1;"]);
    }

    #[test]
    fn test_mismatched_counts_skipped_not_fatal() {
        let diffs = vec![
            diff(&["a();", "b();"], &["c();"]),
            diff(&["var y = 2;"], &["let y = 2;"]),
        ];
        let patterns = mine(&diffs, &MineOptions::default());
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].before_lines(), vec!["var y = 2;"]);
    }

    #[test]
    fn test_empty_diff_discarded() {
        let patterns = mine(&[diff(&[], &[])], &MineOptions::default());
        assert!(patterns.is_empty());
    }

    #[test]
    fn test_duplicates_merge_preserving_first_seen_order() {
        let diffs = vec![
            diff(&["var a = 1;"], &["let a = 1;"]),
            diff(&["foo.bar()"], &["foo.baz()"]),
            // Same pair as the first, modulo whitespace.
            diff(&["var  a = 1;"], &["let  a = 1;"]),
        ];
        let patterns = mine(&diffs, &MineOptions::default());
        assert_eq!(patterns.len(), 2);
        assert_eq!(patterns[0].before_lines(), vec!["var a = 1;"]);
        assert_eq!(patterns[1].before_lines(), vec!["foo.bar()"]);
    }

    #[test]
    fn test_min_count_floor() {
        let diffs = vec![
            diff(&["var a = 1;"], &["let a = 1;"]),
            diff(&["rare()"], &["seldom()"]),
            diff(&["var a = 1;"], &["let a = 1;"]),
        ];
        let opts = MineOptions {
            min_count: 2,
            ..MineOptions::default()
        };
        let patterns = mine(&diffs, &opts);
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].before_lines(), vec!["var a = 1;"]);
    }

    #[test]
    fn test_detailed_mode_forwards_blocks_and_metadata() {
        let diffs = vec![Diff {
            before: vec!["if (a) {".to_owned(), "  legacy();".to_owned(), "}".to_owned()],
            after: vec!["modern(a);".to_owned()],
            meta: Some(CommitInfo {
                author: Some("ada".to_owned()),
                message: Some("drop legacy branch".to_owned()),
                hash: Some("abc123".to_owned()),
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
            Some("ada: drop legacy branch")
        );
    }

    #[test]
    fn test_detailed_mode_rejects_oversized_blocks() {
        let diffs = vec![diff(&["a;", "b;", "c;", "d;"], &["e;"])];
        let opts = MineOptions {
            mode: MineMode::Detailed,
            ..MineOptions::default()
        };
        assert!(mine(&diffs, &opts).is_empty());
    }

    #[test]
    fn test_noop_pairs_dropped() {
        let diffs = vec![diff(&["same();"], &["same();"])];
        assert!(mine(&diffs, &MineOptions::default()).is_empty());
    }
}
