//! Line tokenizer.
//!
//! Splits a single line of source text into an ordered sequence of lexical
//! tokens: identifiers, numbers, string literals, and operators/punctuation.
//! Multi-character operators and quoted literals stay single tokens. The
//! tokenizer is total — any input, including an empty line, produces a
//! (possibly empty) token sequence and never fails.
//!
//! Tokens carry their byte span in the source line so templates can be
//! rebuilt with the original spacing and fixes can splice only the matched
//! range.

/// Three-character operators, matched before shorter ones (maximal munch).
const OPERATORS_3: &[&str] = &["===", "!==", ">>>", "<<=", ">>=", "**=", "...", "..="];

/// Two-character operators.
const OPERATORS_2: &[&str] = &[
    "==", "!=", "<=", ">=", "&&", "||", "->", "=>", "::", "++", "--", "+=", "-=", "*=", "/=",
    "%=", "&=", "|=", "^=", "<<", ">>", "??", "?.", "**", "..",
];

/// One token extracted from a line of text.
///
/// Equality for matching purposes is by exact text, or case-folded text when
/// the owning pattern requests case-insensitive comparison — see
/// [`Token::matches_text`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    text: String,
    start: usize,
    end: usize,
}

impl Token {
    /// The token text as it appeared in the source line.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Byte range of this token in the source line.
    pub const fn span(&self) -> (usize, usize) {
        (self.start, self.end)
    }

    /// Compare this token against template text, optionally case-folded.
    pub fn matches_text(&self, other: &str, match_case: bool) -> bool {
        if match_case {
            self.text == other
        } else {
            self.text.eq_ignore_ascii_case(other)
        }
    }
}

/// Is `c` a character that can start an identifier token?
///
/// `$` is included so positional placeholder markers (`$1`) tokenize as a
/// single token.
fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Split `line` into an ordered sequence of tokens.
///
/// Whitespace separates tokens and is never part of one. Quoted literals
/// (`"…"`, `'…'`, `` `…` ``) are kept as single tokens, backslash escapes
/// respected; an unterminated literal extends to the end of the line rather
/// than failing.
pub fn tokenize(line: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let chars: Vec<(usize, char)> = line.char_indices().collect();
    let mut i = 0;

    while i < chars.len() {
        let (start, c) = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        if c == '"' || c == '\'' || c == '`' {
            i = scan_string(&chars, i, c);
            let end = byte_end(line, &chars, i);
            tokens.push(Token {
                text: line[start..end].to_owned(),
                start,
                end,
            });
            continue;
        }

        if is_ident_start(c) {
            while i < chars.len() && is_ident_continue(chars[i].1) {
                i += 1;
            }
            let end = byte_end(line, &chars, i);
            tokens.push(Token {
                text: line[start..end].to_owned(),
                start,
                end,
            });
            continue;
        }

        if c.is_ascii_digit() {
            i = scan_number(&chars, i);
            let end = byte_end(line, &chars, i);
            tokens.push(Token {
                text: line[start..end].to_owned(),
                start,
                end,
            });
            continue;
        }

        // Operator / punctuation: maximal munch.
        let rest = &line[start..];
        let op_len = OPERATORS_3
            .iter()
            .chain(OPERATORS_2)
            .find(|op| rest.starts_with(**op))
            .map_or_else(|| c.len_utf8(), |op| op.len());
        let end = start + op_len;
        tokens.push(Token {
            text: line[start..end].to_owned(),
            start,
            end,
        });
        // Advance past however many chars the operator covered.
        while i < chars.len() && chars[i].0 < end {
            i += 1;
        }
    }

    tokens
}

/// Consume a quoted literal starting at `chars[i]` (the opening quote).
/// Returns the index one past the closing quote, or `chars.len()` when the
/// literal is unterminated.
fn scan_string(chars: &[(usize, char)], i: usize, quote: char) -> usize {
    let mut j = i + 1;
    while j < chars.len() {
        match chars[j].1 {
            '\\' => j += 2,
            c if c == quote => return j + 1,
            _ => j += 1,
        }
    }
    chars.len()
}

/// Consume a numeric literal starting at `chars[i]`. Accepts a digit run,
/// an optional fractional part, and alphanumeric suffixes (`0xFF`, `1e9`,
/// `10u32`) without attempting real numeric validation.
fn scan_number(chars: &[(usize, char)], i: usize) -> usize {
    let mut j = i;
    while j < chars.len() && (chars[j].1.is_ascii_alphanumeric() || chars[j].1 == '_') {
        j += 1;
    }
    if j + 1 < chars.len() && chars[j].1 == '.' && chars[j + 1].1.is_ascii_digit() {
        j += 1;
        while j < chars.len() && chars[j].1.is_ascii_alphanumeric() {
            j += 1;
        }
    }
    j
}

/// Byte offset corresponding to char index `i` (or end of line).
fn byte_end(line: &str, chars: &[(usize, char)], i: usize) -> usize {
    chars.get(i).map_or(line.len(), |&(off, _)| off)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(line: &str) -> Vec<String> {
        tokenize(line).iter().map(|t| t.text().to_owned()).collect()
    }

    #[test]
    fn test_empty_line() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \t ").is_empty());
    }

    #[test]
    fn test_simple_statement() {
        assert_eq!(texts("var x = 1;"), vec!["var", "x", "=", "1", ";"]);
    }

    #[test]
    fn test_multi_char_operators() {
        assert_eq!(texts("a === b"), vec!["a", "===", "b"]);
        assert_eq!(texts("x=>y"), vec!["x", "=>", "y"]);
        assert_eq!(texts("a::b->c"), vec!["a", "::", "b", "->", "c"]);
        assert_eq!(texts("i+=1"), vec!["i", "+=", "1"]);
    }

    #[test]
    fn test_string_literal_single_token() {
        assert_eq!(
            texts("require('constants')"),
            vec!["require", "(", "'constants'", ")"]
        );
        assert_eq!(texts(r#"say("a b c")"#), vec!["say", "(", r#""a b c""#, ")"]);
    }

    #[test]
    fn test_string_escape() {
        assert_eq!(texts(r#""a\"b" + c"#), vec![r#""a\"b""#, "+", "c"]);
    }

    #[test]
    fn test_unterminated_string_is_total() {
        assert_eq!(texts("x = \"oops"), vec!["x", "=", "\"oops"]);
    }

    #[test]
    fn test_placeholder_is_one_token() {
        assert_eq!(texts("f($1, $2)"), vec!["f", "(", "$1", ",", "$2", ")"]);
    }

    #[test]
    fn test_numbers() {
        assert_eq!(texts("1.5 + 0xFF"), vec!["1.5", "+", "0xFF"]);
    }

    #[test]
    fn test_spans_recover_source() {
        let line = "let  total = a+b;";
        for tok in tokenize(line) {
            let (s, e) = tok.span();
            assert_eq!(&line[s..e], tok.text());
        }
    }

    #[test]
    fn test_case_insensitive_match() {
        let toks = tokenize("Foo");
        assert!(toks[0].matches_text("foo", false));
        assert!(!toks[0].matches_text("foo", true));
    }
}
