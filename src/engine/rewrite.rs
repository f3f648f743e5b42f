//! Rewrite application.
//!
//! Renders a matched pattern's after-template by substituting `$N` /
//! `$name` references with the values the matcher captured. Multi-line
//! templates keep their line order; no reformatting or indentation
//! inference happens here — splicing the result into surrounding text is
//! the caller's job.

use crate::engine::pattern::{Captures, Pattern};

/// The rendered replacement.
///
/// A reference with no corresponding capture is left in the output verbatim
/// and recorded in `unbound`, so a malformed pattern is distinguishable from
/// a missing trigger instead of failing silently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    /// Replacement lines, in template order. Empty when the pattern is
    /// flag-only (empty after-template).
    pub lines: Vec<String>,
    /// Placeholder references that had no capture, e.g. `"$2"`.
    pub unbound: Vec<String>,
}

impl Replacement {
    /// True when every reference resolved.
    pub fn is_clean(&self) -> bool {
        self.unbound.is_empty()
    }
}

/// Substitute captured values into `pattern`'s after-template.
pub fn apply(pattern: &Pattern, captures: &Captures) -> Replacement {
    let mut unbound = Vec::new();
    let lines = pattern
        .after
        .iter()
        .map(|line| render_line(line, captures, &mut unbound))
        .collect();
    Replacement { lines, unbound }
}

/// Render one template line. References are `$` followed by either a digit
/// run (positional) or an identifier (named group); a lone `$` is literal.
fn render_line(template: &str, captures: &Captures, unbound: &mut Vec<String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(idx) = rest.find('$') {
        out.push_str(&rest[..idx]);
        rest = &rest[idx..];

        let name_len = reference_len(&rest[1..]);
        if name_len == 0 {
            out.push('$');
            rest = &rest[1..];
            continue;
        }

        let reference = &rest[..=name_len];
        let name = &rest[1..=name_len];
        if let Some(value) = captures.get(name) {
            out.push_str(value);
        } else {
            out.push_str(reference);
            unbound.push(reference.to_owned());
        }
        rest = &rest[name_len + 1..];
    }

    out.push_str(rest);
    out
}

/// Length in bytes of the reference name following a `$`, or 0 if none.
/// Digits form a positional reference; otherwise an identifier
/// (`[A-Za-z_][A-Za-z0-9_]*`) forms a named one.
fn reference_len(after_dollar: &str) -> usize {
    let bytes = after_dollar.as_bytes();
    match bytes.first() {
        Some(b) if b.is_ascii_digit() => bytes
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count(),
        Some(b) if b.is_ascii_alphabetic() || *b == b'_' => bytes
            .iter()
            .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
            .count(),
        _ => 0,
    }
}
