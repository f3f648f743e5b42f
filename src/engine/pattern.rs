//! The `Pattern` data model.
//!
//! A pattern is the persisted, matched-against unit: a before-template that
//! can trigger on a candidate line, an after-template describing the
//! suggested replacement, and flags controlling how matching behaves.
//!
//! The before-template is a tagged union ([`BeforeShape`]): either a literal
//! token template with positional `$N` slots, or a compiled regular
//! expression with named capture groups. Matching dispatch over the union is
//! exhaustive — there is no flag-sniffing at match time.

use std::collections::HashMap;

use regex::{Regex, RegexBuilder};

use crate::engine::token::tokenize;
use crate::error::{RefixError, RefixResult};

/// Captured placeholder values, keyed by slot number (`"1"`, `"2"`, …) for
/// literal templates and by group name for regex templates.
pub type Captures = HashMap<String, String>;

/// Severity hint attached to a pattern. Consumed only by reporting; the
/// engine itself never branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    Error,
    #[default]
    Warning,
    Information,
    Hint,
}

impl Severity {
    /// One-letter code used in rule files.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "E",
            Self::Warning => "W",
            Self::Information => "I",
            Self::Hint => "H",
        }
    }

    /// Parse a one-letter code or a full word, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "e" | "error" => Some(Self::Error),
            "w" | "warning" | "warn" => Some(Self::Warning),
            "i" | "info" | "information" => Some(Self::Information),
            "h" | "hint" => Some(Self::Hint),
            _ => None,
        }
    }
}

/// One element of a literal template line: a concrete token or a positional
/// slot that binds whatever token the matcher finds in its place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateToken {
    Lit(String),
    Slot(usize),
}

/// A literal before-template: one or more lines, each tokenized into
/// [`TemplateToken`]s. The source lines are kept verbatim so the template
/// can be persisted with its original spacing.
#[derive(Debug, Clone)]
pub struct LiteralTemplate {
    lines: Vec<String>,
    tokens: Vec<Vec<TemplateToken>>,
}

impl LiteralTemplate {
    /// Parse template lines, recognizing `$N` tokens as positional slots.
    ///
    /// # Errors
    ///
    /// Returns [`RefixError::EmptyBefore`] if the lines contain no tokens at
    /// all — a pattern must have a non-empty before.
    pub fn parse(lines: Vec<String>) -> RefixResult<Self> {
        let tokens: Vec<Vec<TemplateToken>> = lines
            .iter()
            .map(|line| {
                tokenize(line)
                    .iter()
                    .map(|t| parse_slot(t.text()).map_or_else(
                        || TemplateToken::Lit(t.text().to_owned()),
                        TemplateToken::Slot,
                    ))
                    .collect()
            })
            .collect();

        if tokens.iter().all(Vec::is_empty) {
            return Err(RefixError::EmptyBefore);
        }

        Ok(Self { lines, tokens })
    }

    /// The template source lines, slots rendered as `$N`.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Parsed tokens, one `Vec` per template line.
    pub fn line_tokens(&self) -> &[Vec<TemplateToken>] {
        &self.tokens
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

/// Slot marker: `$` followed by one or more digits, nothing else.
fn parse_slot(text: &str) -> Option<usize> {
    let digits = text.strip_prefix('$')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// The before side of a pattern — what can trigger.
#[derive(Debug, Clone)]
pub enum BeforeShape {
    /// Ordered token template, matched as an order-preserving subsequence.
    Literal(LiteralTemplate),
    /// Compiled regular expression, tested against the raw line.
    Regex(Box<Regex>),
}

/// A before → after rewrite rule with matching flags.
///
/// Immutable once constructed; a loaded pattern list is shared read-only for
/// the duration of a lint or fix run.
#[derive(Debug, Clone)]
pub struct Pattern {
    pub before: BeforeShape,
    /// Replacement template lines. Empty means "flag but do not suggest a
    /// replacement".
    pub after: Vec<String>,
    /// When false, token and regex comparison is case-insensitive.
    pub match_case: bool,
    pub severity: Severity,
    /// Human-readable rationale, if any.
    pub message: Option<String>,
    /// The before-shape denotes a deprecated API, independent of whether a
    /// rewrite is suggested.
    pub deprecated: bool,
}

impl Pattern {
    /// Build a literal-template pattern.
    ///
    /// # Errors
    ///
    /// Returns [`RefixError::EmptyBefore`] when `before` has no tokens.
    pub fn literal(before: Vec<String>, after: Vec<String>) -> RefixResult<Self> {
        Ok(Self {
            before: BeforeShape::Literal(LiteralTemplate::parse(before)?),
            after,
            match_case: true,
            severity: Severity::default(),
            message: None,
            deprecated: false,
        })
    }

    /// Build a regex-mode pattern, compiling `pattern` up front so matching
    /// never re-parses. `match_case: false` compiles case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`RefixError::InvalidRegex`] when the expression (including
    /// its named capture groups) does not compile, and
    /// [`RefixError::EmptyBefore`] for an empty expression.
    pub fn regex(pattern: &str, after: Vec<String>, match_case: bool) -> RefixResult<Self> {
        if pattern.is_empty() {
            return Err(RefixError::EmptyBefore);
        }
        let re = RegexBuilder::new(pattern)
            .case_insensitive(!match_case)
            .build()
            .map_err(|source| RefixError::InvalidRegex {
                pattern: pattern.to_owned(),
                source: Box::new(source),
            })?;
        Ok(Self {
            before: BeforeShape::Regex(Box::new(re)),
            after,
            match_case,
            severity: Severity::default(),
            message: None,
            deprecated: false,
        })
    }

    pub const fn is_regex(&self) -> bool {
        matches!(self.before, BeforeShape::Regex(_))
    }

    /// The before-template as persisted text: template lines for literal
    /// patterns, the expression source for regex patterns.
    pub fn before_lines(&self) -> Vec<String> {
        match &self.before {
            BeforeShape::Literal(t) => t.lines().to_vec(),
            BeforeShape::Regex(re) => vec![re.as_str().to_owned()],
        }
    }
}
