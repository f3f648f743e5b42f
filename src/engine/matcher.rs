//! Trigger matching.
//!
//! Evaluates a pattern list against a candidate line (plus following lines,
//! for multi-line templates) and returns the **first** pattern that
//! triggers. First-match-wins over the supplied list order is a documented
//! contract — rule precedence is positional and deterministic, and must not
//! be replaced with a best-match or hashed lookup.
//!
//! Literal templates match as a greedy, order-preserving, non-contiguous
//! token subsequence: each template token must be found at or after the
//! position where the previous one was found. Positional slots bind the
//! candidate token sitting at the scan cursor, and those bindings flow into
//! rewriting. Regex templates are tested against the raw line text; named
//! and numbered capture groups become the bindings.

use tracing::debug;

use crate::engine::pattern::{BeforeShape, Captures, Pattern, TemplateToken};
use crate::engine::token::{tokenize, Token};

/// A source line paired with its token sequence, computed once so repeated
/// matching over a large pattern list never re-tokenizes.
#[derive(Debug, Clone)]
pub struct LineTokens {
    text: String,
    tokens: Vec<Token>,
}

impl LineTokens {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let tokens = tokenize(&text);
        Self { text, tokens }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }
}

/// A successful trigger: which pattern fired, what it captured, and where.
#[derive(Debug)]
pub struct TriggerMatch<'p> {
    pub pattern: &'p Pattern,
    /// Position of the pattern in the supplied list.
    pub pattern_index: usize,
    pub captures: Captures,
    /// How many window lines the template consumed (1 for single-line and
    /// regex templates).
    pub lines_matched: usize,
    /// Byte range of the match in the first line — the span from the first
    /// to the last matched token, or the regex match range. `None` for
    /// multi-line templates.
    pub span: Option<(usize, usize)>,
}

/// Find the first pattern in `patterns` triggered at the start of `window`.
///
/// `window[0]` is the candidate line; further entries are the following
/// source lines, consulted only by multi-line templates. Patterns are tried
/// strictly in list order.
pub fn first_trigger<'p>(
    window: &[LineTokens],
    patterns: &'p [Pattern],
) -> Option<TriggerMatch<'p>> {
    let first = window.first()?;

    for (pattern_index, pattern) in patterns.iter().enumerate() {
        let hit = match &pattern.before {
            BeforeShape::Regex(re) => match_regex(re, first),
            BeforeShape::Literal(template) => {
                match_literal(template.line_tokens(), window, pattern.match_case)
            }
        };
        if let Some((captures, lines_matched, span)) = hit {
            debug!(pattern = pattern_index, lines = lines_matched, "pattern triggered");
            return Some(TriggerMatch {
                pattern,
                pattern_index,
                captures,
                lines_matched,
                span,
            });
        }
    }

    None
}

fn match_regex(re: &regex::Regex, line: &LineTokens) -> Option<(Captures, usize, Option<(usize, usize)>)> {
    let caps = re.captures(line.text())?;
    let mut captures = Captures::new();

    for (i, group) in caps.iter().enumerate().skip(1) {
        if let Some(m) = group {
            captures.insert(i.to_string(), m.as_str().to_owned());
        }
    }
    for name in re.capture_names().flatten() {
        if let Some(m) = caps.name(name) {
            captures.insert(name.to_owned(), m.as_str().to_owned());
        }
    }

    let whole = caps.get(0)?;
    Some((captures, 1, Some((whole.start(), whole.end()))))
}

fn match_literal(
    template_lines: &[Vec<TemplateToken>],
    window: &[LineTokens],
    match_case: bool,
) -> Option<(Captures, usize, Option<(usize, usize)>)> {
    if template_lines.len() > window.len() {
        return None;
    }

    let mut captures = Captures::new();
    let mut first_span = None;
    for (i, template) in template_lines.iter().enumerate() {
        let span = match_line(template, window[i].tokens(), match_case, &mut captures)?;
        if i == 0 {
            first_span = span;
        }
    }

    let span = if template_lines.len() == 1 { first_span } else { None };
    Some((captures, template_lines.len(), span))
}

/// Greedy subsequence scan of one template line over one token sequence.
///
/// Literal template tokens must be found at or after the cursor; the cursor
/// advances past each match. Slots bind the token at the cursor. Returns the
/// byte span covering the first through last matched token, or `Some(None)`
/// vacuously for an empty template line.
#[allow(clippy::option_option)]
fn match_line(
    template: &[TemplateToken],
    tokens: &[Token],
    match_case: bool,
    captures: &mut Captures,
) -> Option<Option<(usize, usize)>> {
    let mut cursor = 0usize;
    let mut first: Option<usize> = None;
    let mut last = 0usize;

    for entry in template {
        match entry {
            TemplateToken::Lit(text) => {
                let found =
                    (cursor..tokens.len()).find(|&i| tokens[i].matches_text(text, match_case))?;
                if first.is_none() {
                    first = Some(found);
                }
                last = found;
                cursor = found + 1;
            }
            TemplateToken::Slot(n) => {
                if cursor >= tokens.len() {
                    return None;
                }
                captures
                    .entry(n.to_string())
                    .or_insert_with(|| tokens[cursor].text().to_owned());
                if first.is_none() {
                    first = Some(cursor);
                }
                last = cursor;
                cursor += 1;
            }
        }
    }

    Some(first.map(|f| (tokens[f].span().0, tokens[last].span().1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::pattern::Severity;

    fn literal(before: &str, after: &str) -> Pattern {
        Pattern::literal(vec![before.to_owned()], vec![after.to_owned()])
            .expect("template should parse")
    }

    fn window(lines: &[&str]) -> Vec<LineTokens> {
        lines.iter().map(|l| LineTokens::new(*l)).collect()
    }

    #[test]
    fn test_subsequence_is_not_contiguous() {
        let patterns = vec![literal("a b", "c")];
        // a … b with an intervening token still triggers.
        assert!(first_trigger(&window(&["a x b"]), &patterns).is_some());
        // Order violated: no trigger.
        assert!(first_trigger(&window(&["b a"]), &patterns).is_none());
    }

    #[test]
    fn test_missing_token_fails() {
        let patterns = vec![literal("a b c", "x")];
        assert!(first_trigger(&window(&["a b"]), &patterns).is_none());
    }

    #[test]
    fn test_first_match_wins() {
        let patterns = vec![literal("a b", "first"), literal("a x b", "second")];
        let hit = first_trigger(&window(&["a x b"]), &patterns).expect("should trigger");
        assert_eq!(hit.pattern_index, 0);
        assert_eq!(hit.pattern.after, vec!["first"]);
    }

    #[test]
    fn test_case_insensitive_template() {
        let mut p = literal("foo", "bar");
        p.match_case = false;
        assert!(first_trigger(&window(&["Foo()"]), &[p]).is_some());

        let strict = literal("foo", "bar");
        assert!(first_trigger(&window(&["Foo()"]), &[strict]).is_none());
    }

    #[test]
    fn test_slot_binds_cursor_token() {
        let patterns = vec![literal("f ( $1 )", "g($1)")];
        let hit = first_trigger(&window(&["f(value)"]), &patterns).expect("should trigger");
        assert_eq!(hit.captures.get("1").map(String::as_str), Some("value"));
    }

    #[test]
    fn test_slot_with_no_token_left_fails() {
        let patterns = vec![literal("f ( $1", "g")];
        assert!(first_trigger(&window(&["f ("]), &patterns).is_none());
    }

    #[test]
    fn test_span_covers_matched_tokens() {
        let patterns = vec![literal("var x", "let x")];
        let hit =
            first_trigger(&window(&["  var x = 1; // note"]), &patterns).expect("should trigger");
        let (s, e) = hit.span.expect("single-line match has a span");
        assert_eq!(&"  var x = 1; // note"[s..e], "var x");
    }

    #[test]
    fn test_regex_mode() {
        let p = Pattern::regex(r"new \((.*)\);", vec!["new $1();".to_owned()], true)
            .expect("regex should compile");
        let patterns = vec![p];

        // Missing parens: no trigger.
        assert!(first_trigger(&window(&["new Foo;"]), &patterns).is_none());

        let hit = first_trigger(&window(&["new (Foo);"]), &patterns).expect("should trigger");
        assert_eq!(hit.captures.get("1").map(String::as_str), Some("Foo"));
        assert_eq!(hit.span, Some((0, 10)));
    }

    #[test]
    fn test_regex_named_groups() {
        let p = Pattern::regex(
            r"assertEquals\((?P<want>\w+), (?P<got>\w+)\)",
            vec!["assert_eq!($want, $got)".to_owned()],
            true,
        )
        .expect("regex should compile");
        let pats = [p];
        let hit = first_trigger(&window(&["assertEquals(a, b)"]), &pats).expect("should trigger");
        assert_eq!(hit.captures.get("want").map(String::as_str), Some("a"));
        assert_eq!(hit.captures.get("got").map(String::as_str), Some("b"));
    }

    #[test]
    fn test_multiline_template() {
        let p = Pattern::literal(
            vec!["if (a) {".to_owned(), "legacy();".to_owned(), "}".to_owned()],
            vec!["modern(a);".to_owned()],
        )
        .expect("template should parse");
        let w = window(&["if (a) {", "  legacy();", "}"]);
        let pats = [p];
        let hit = first_trigger(&w, &pats).expect("should trigger");
        assert_eq!(hit.lines_matched, 3);
        assert!(hit.span.is_none());
    }

    #[test]
    fn test_multiline_template_needs_full_window() {
        let p = Pattern::literal(
            vec!["if (a) {".to_owned(), "legacy();".to_owned()],
            vec![],
        )
        .expect("template should parse");
        assert!(first_trigger(&window(&["if (a) {"]), &[p]).is_none());
    }

    #[test]
    fn test_empty_pattern_list() {
        assert!(first_trigger(&window(&["anything"]), &[]).is_none());
    }

    #[test]
    fn test_severity_is_passthrough() {
        let mut p = literal("old", "new");
        p.severity = Severity::Error;
        let pats = [p];
        let hit = first_trigger(&window(&["old"]), &pats).expect("should trigger");
        assert_eq!(hit.pattern.severity, Severity::Error);
    }
}
