//! Unified-diff text parser.
//!
//! Turns the body of a patch (`git log -p` output, a `.patch` file, or any
//! unified diff) into [`Diff`] values: each contiguous run of removed lines
//! followed by its contiguous run of added lines within a hunk becomes one
//! diff. The parser is lenient — unrecognized lines outside hunks are
//! ignored, and a truncated patch yields whatever pairs were complete.

use crate::engine::miner::{CommitInfo, Diff};

/// Parse unified-diff text into ordered diffs, attaching `meta` to each.
pub fn parse_patch(text: &str, meta: Option<&CommitInfo>) -> Vec<Diff> {
    let mut diffs = Vec::new();
    let mut before: Vec<String> = Vec::new();
    let mut after: Vec<String> = Vec::new();
    let mut in_hunk = false;

    let mut flush = |before: &mut Vec<String>, after: &mut Vec<String>| {
        if before.is_empty() && after.is_empty() {
            return;
        }
        diffs.push(Diff {
            before: std::mem::take(before),
            after: std::mem::take(after),
            meta: meta.cloned(),
        });
    };

    for line in text.lines() {
        if line.starts_with("diff ") || line.starts_with("--- ") || line.starts_with("+++ ") {
            if !in_hunk || line.starts_with("diff ") {
                flush(&mut before, &mut after);
                in_hunk = false;
                continue;
            }
        }
        if line.starts_with("@@") {
            flush(&mut before, &mut after);
            in_hunk = true;
            continue;
        }
        if !in_hunk {
            continue;
        }

        if let Some(removed) = line.strip_prefix('-') {
            // A new removed-run after added lines closes the previous pair.
            if !after.is_empty() {
                flush(&mut before, &mut after);
            }
            before.push(removed.to_owned());
        } else if let Some(added) = line.strip_prefix('+') {
            after.push(added.to_owned());
        } else if line.starts_with('\\') {
            // "\ No newline at end of file" — not content.
        } else {
            // Context line (or hunk end) closes the current pair.
            flush(&mut before, &mut after);
        }
    }
    flush(&mut before, &mut after);

    diffs
}
