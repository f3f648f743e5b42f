//! Pattern generalization.
//!
//! Turns one before/after line-pair into a reusable [`Pattern`]. For a
//! single-line pair the tokens of both sides are diffed (Patience, via the
//! `similar` crate); the longest common token subsequence stays literal, and
//! differing tokens that appear on **both** sides — content that moved
//! through the rewrite, typically a variable name — become shared positional
//! slots (`$1`, `$2`, … in order of first appearance in the before line).
//! Differing tokens unique to one side are the rewrite itself and stay
//! literal.
//!
//! Multi-line pairs are not token-diffed across line boundaries: each line is
//! kept as one positional slot of a verbatim multi-line template, and only
//! small blocks (at most [`GeneralizeOptions::max_lines`] per side) are
//! accepted. The cap is a resource-control invariant, not a tuning knob —
//! without it generalization goes superlinear in the diff size.
//!
//! Regex-authored patterns never pass through here; they are built directly
//! with [`Pattern::regex`], which validates the expression and its named
//! capture groups.

use std::collections::{HashMap, HashSet};

use similar::{capture_diff_slices, Algorithm, DiffOp};

use crate::engine::pattern::{Pattern, Severity};
use crate::engine::token::{tokenize, Token};

/// Knobs for one generalization run.
#[derive(Debug, Clone)]
pub struct GeneralizeOptions {
    /// Maximum line count per side for multi-line templates.
    pub max_lines: usize,
    /// Case sensitivity recorded on the produced pattern.
    pub match_case: bool,
    pub severity: Severity,
    /// Rationale attached to the produced pattern (e.g. the commit subject
    /// the pair was mined from).
    pub message: Option<String>,
}

impl Default for GeneralizeOptions {
    fn default() -> Self {
        Self {
            max_lines: 3,
            match_case: true,
            severity: Severity::Warning,
            message: None,
        }
    }
}

/// Generalize one before/after pair into a pattern.
///
/// Returns `None` when the pair cannot be promoted safely: an empty before
/// side, a no-op pair (identical modulo whitespace), a pure insertion
/// (before is a subsequence of after with nothing removed), or a multi-line
/// block exceeding the configured bound. Declining is an expected outcome,
/// not an error.
pub fn generalize(
    before: &[String],
    after: &[String],
    opts: &GeneralizeOptions,
) -> Option<Pattern> {
    if before.is_empty() {
        return None;
    }
    // Templates are stored with surrounding whitespace trimmed: matching is
    // token-based anyway, and a trimmed after-template splices into the
    // linted file's own indentation.
    let before: Vec<String> = before.iter().map(|l| l.trim().to_owned()).collect();
    let after: Vec<String> = after.iter().map(|l| l.trim().to_owned()).collect();
    if normalize_block(&before) == normalize_block(&after) {
        return None;
    }

    if before.len() == 1 && after.len() == 1 {
        return generalize_single(&before[0], &after[0], opts);
    }

    if before.len() > opts.max_lines || after.len() > opts.max_lines {
        return None;
    }
    // Pure growth: the old block survives intact inside the new one.
    if !after.is_empty() && normalize_block(&after).contains(&normalize_block(&before)) {
        return None;
    }

    decorate(Pattern::literal(before, after).ok()?, opts)
}

/// Token-level generalization of a single-line pair.
fn generalize_single(before: &str, after: &str, opts: &GeneralizeOptions) -> Option<Pattern> {
    let b_tokens = tokenize(before);
    let a_tokens = tokenize(after);
    if b_tokens.is_empty() {
        return None;
    }

    let b_texts: Vec<&str> = b_tokens.iter().map(Token::text).collect();
    let a_texts: Vec<&str> = a_tokens.iter().map(Token::text).collect();
    if b_texts == a_texts {
        // Whitespace-only difference.
        return None;
    }

    let ops = capture_diff_slices(Algorithm::Patience, &b_texts, &a_texts);

    // Token indices outside the common subsequence, ascending.
    let mut removed: Vec<usize> = Vec::new();
    let mut inserted: Vec<usize> = Vec::new();
    for op in &ops {
        match *op {
            DiffOp::Equal { .. } => {}
            DiffOp::Delete {
                old_index, old_len, ..
            } => removed.extend(old_index..old_index + old_len),
            DiffOp::Insert {
                new_index, new_len, ..
            } => inserted.extend(new_index..new_index + new_len),
            DiffOp::Replace {
                old_index,
                old_len,
                new_index,
                new_len,
            } => {
                removed.extend(old_index..old_index + old_len);
                inserted.extend(new_index..new_index + new_len);
            }
        }
    }

    if removed.is_empty() {
        // Before is a strict subsequence of after — nothing to trigger on
        // that would not also match the rewritten line.
        return None;
    }

    // Differing tokens present on both sides become shared slots, keyed by
    // token text so a repeated name resolves to one slot.
    let inserted_texts: HashSet<&str> = inserted.iter().map(|&i| a_texts[i]).collect();
    let mut slots: HashMap<&str, usize> = HashMap::new();
    for &i in &removed {
        let text = b_texts[i];
        if inserted_texts.contains(text) && !slots.contains_key(text) {
            slots.insert(text, slots.len() + 1);
        }
    }

    let before_template = render_template(before, &b_tokens, &removed, &slots);
    let after_template = render_template(after, &a_tokens, &inserted, &slots);

    decorate(
        Pattern::literal(vec![before_template], vec![after_template]).ok()?,
        opts,
    )
}

/// Rebuild `line` with every changed token that earned a slot replaced by
/// its `$N` marker. Spacing outside the replaced spans is preserved exactly.
fn render_template(
    line: &str,
    tokens: &[Token],
    changed: &[usize],
    slots: &HashMap<&str, usize>,
) -> String {
    let mut out = String::with_capacity(line.len());
    let mut pos = 0;
    for &i in changed {
        if let Some(&n) = slots.get(tokens[i].text()) {
            let (start, end) = tokens[i].span();
            out.push_str(&line[pos..start]);
            out.push('$');
            out.push_str(&n.to_string());
            pos = end;
        }
    }
    out.push_str(&line[pos..]);
    out
}

fn decorate(mut pattern: Pattern, opts: &GeneralizeOptions) -> Option<Pattern> {
    pattern.match_case = opts.match_case;
    pattern.severity = opts.severity;
    pattern.message = opts.message.clone();
    Some(pattern)
}

/// Collapse all whitespace so formatting-only differences compare equal.
fn normalize_block(lines: &[String]) -> String {
    lines
        .iter()
        .flat_map(|l| l.split_whitespace())
        .collect::<Vec<&str>>()
        .join(" ")
}
