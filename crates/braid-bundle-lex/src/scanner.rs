//! The forward scan. One cursor, one character of lookahead, and a
//! record of the previous significant token for the regex heuristic.

use crate::{
    Token, TokenKind, KEYWORDS, PUNCT2, PUNCT3, REGEX_ALLOWED_KEYWORDS,
    REGEX_ALLOWED_PUNCTUATORS,
};

/// Tokenize JavaScript source. Total: always terminates, never fails,
/// and the final token is `eof` at `len(source)`.
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).run()
}

struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    tokens: Vec<Token>,
    /// Index into `tokens` of the last non-whitespace, non-comment token.
    prev_significant: Option<usize>,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            tokens: Vec::new(),
            prev_significant: None,
        }
    }

    fn run(mut self) -> Vec<Token> {
        while self.pos < self.source.len() {
            let start = self.pos;
            let ch = self.current();

            let kind = if is_js_whitespace(ch) {
                self.scan_whitespace()
            } else if self.rest().starts_with("//") {
                self.scan_line_comment()
            } else if self.rest().starts_with("/*") {
                self.scan_block_comment()
            } else if ch == '"' || ch == '\'' {
                self.scan_string(ch)
            } else if ch == '`' {
                self.scan_template()
            } else if ch.is_ascii_digit() || (ch == '.' && self.peek_is_digit()) {
                self.scan_number()
            } else if is_ident_start(ch) {
                self.scan_word()
            } else if ch == '/' && self.regex_allowed() {
                self.scan_regex()
            } else {
                self.scan_punctuator()
            };

            debug_assert!(self.pos > start, "scanner must make progress");
            self.push(kind, start);
        }

        let len = self.source.len();
        self.tokens.push(Token {
            kind: TokenKind::Eof,
            value: String::new(),
            start: len,
            end: len,
        });
        self.tokens
    }

    // ---- cursor helpers ----

    fn rest(&self) -> &str {
        &self.source[self.pos..]
    }

    fn current(&self) -> char {
        // Callers only look while pos < len.
        self.rest().chars().next().unwrap_or('\0')
    }

    fn at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn advance(&mut self) {
        if let Some(c) = self.rest().chars().next() {
            self.pos += c.len_utf8();
        }
    }

    /// Consume a backslash and the character after it, whatever it is.
    fn advance_escape(&mut self) {
        self.advance();
        self.advance();
    }

    fn peek_is_digit(&self) -> bool {
        let mut chars = self.rest().chars();
        chars.next();
        chars.next().is_some_and(|c| c.is_ascii_digit())
    }

    fn push(&mut self, kind: TokenKind, start: usize) {
        let token = Token {
            kind,
            value: self.source[start..self.pos].to_string(),
            start,
            end: self.pos,
        };
        let significant = token.is_significant();
        self.tokens.push(token);
        if significant {
            self.prev_significant = Some(self.tokens.len() - 1);
        }
    }

    // ---- scanners ----

    fn scan_whitespace(&mut self) -> TokenKind {
        while !self.at_end() && is_js_whitespace(self.current()) {
            self.advance();
        }
        TokenKind::Whitespace
    }

    /// Up to but not including the line terminator.
    fn scan_line_comment(&mut self) -> TokenKind {
        self.pos += 2;
        while !self.at_end() {
            let c = self.current();
            if c == '\r' || c == '\n' {
                break;
            }
            self.advance();
        }
        TokenKind::Comment
    }

    /// Through the closing `*/`, or to end of input if unterminated.
    fn scan_block_comment(&mut self) -> TokenKind {
        self.pos += 2;
        while !self.at_end() {
            if self.rest().starts_with("*/") {
                self.pos += 2;
                return TokenKind::Comment;
            }
            self.advance();
        }
        TokenKind::Comment
    }

    fn scan_string(&mut self, quote: char) -> TokenKind {
        self.advance();
        while !self.at_end() {
            let c = self.current();
            if c == '\\' {
                self.advance_escape();
            } else if c == quote {
                self.advance();
                break;
            } else {
                self.advance();
            }
        }
        TokenKind::String
    }

    /// The whole template including interpolations is one token.
    /// Interpolated expressions are not re-tokenized; `${` is tracked
    /// with a brace-depth counter until it closes.
    fn scan_template(&mut self) -> TokenKind {
        self.advance();
        while !self.at_end() {
            if self.current() == '\\' {
                self.advance_escape();
            } else if self.current() == '`' {
                self.advance();
                break;
            } else if self.rest().starts_with("${") {
                self.pos += 2;
                let mut depth = 1usize;
                while !self.at_end() && depth > 0 {
                    match self.current() {
                        '{' => depth += 1,
                        '}' => depth -= 1,
                        _ => {}
                    }
                    self.advance();
                }
            } else {
                self.advance();
            }
        }
        TokenKind::Template
    }

    fn scan_number(&mut self) -> TokenKind {
        let bytes = self.source.as_bytes();
        let hex_digit_follows = self.pos + 2 < bytes.len() && bytes[self.pos + 2].is_ascii_hexdigit();

        if bytes[self.pos] == b'0'
            && matches!(bytes.get(self.pos + 1), Some(b'x' | b'X'))
            && hex_digit_follows
        {
            self.pos += 2;
            while !self.at_end() && self.current().is_ascii_hexdigit() {
                self.advance();
            }
            return TokenKind::Number;
        }

        if self.current() == '.' {
            // `.5` form: leading dot, then digits.
            self.advance();
            while !self.at_end() && self.current().is_ascii_digit() {
                self.advance();
            }
            return TokenKind::Number;
        }

        while !self.at_end() && self.current().is_ascii_digit() {
            self.advance();
        }
        if self.current() == '.' && self.peek_is_digit() {
            self.advance();
            while !self.at_end() && self.current().is_ascii_digit() {
                self.advance();
            }
        }
        TokenKind::Number
    }

    fn scan_word(&mut self) -> TokenKind {
        let start = self.pos;
        while !self.at_end() && is_ident_part(self.current()) {
            self.advance();
        }
        if KEYWORDS.contains(&self.source[start..self.pos]) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        }
    }

    /// Until an unescaped `/` at character-class depth zero, then flags.
    fn scan_regex(&mut self) -> TokenKind {
        self.advance();
        let mut in_class = false;
        while !self.at_end() {
            let c = self.current();
            if c == '\\' {
                self.advance_escape();
            } else if c == '[' && !in_class {
                in_class = true;
                self.advance();
            } else if c == ']' && in_class {
                in_class = false;
                self.advance();
            } else if c == '/' && !in_class {
                self.advance();
                while !self.at_end() && self.current().is_ascii_alphabetic() {
                    self.advance();
                }
                break;
            } else {
                self.advance();
            }
        }
        TokenKind::Regex
    }

    /// Longest match, three characters down to one. Any character at all
    /// is accepted at length one, which is what makes the scan total.
    fn scan_punctuator(&mut self) -> TokenKind {
        if let Some(three) = self.source.get(self.pos..self.pos + 3) {
            if PUNCT3.contains(&three) {
                self.pos += 3;
                return TokenKind::Punctuator;
            }
        }
        if let Some(two) = self.source.get(self.pos..self.pos + 2) {
            if PUNCT2.contains(&two) {
                self.pos += 2;
                return TokenKind::Punctuator;
            }
        }
        self.advance();
        TokenKind::Punctuator
    }

    /// Whether a `/` at the cursor starts a regex literal rather than
    /// division, judged from the previous significant token.
    fn regex_allowed(&self) -> bool {
        let Some(idx) = self.prev_significant else {
            return true;
        };
        let prev = &self.tokens[idx];
        match prev.kind {
            TokenKind::Keyword => REGEX_ALLOWED_KEYWORDS.contains(prev.value.as_str()),
            TokenKind::Punctuator => REGEX_ALLOWED_PUNCTUATORS.contains(prev.value.as_str()),
            _ => false,
        }
    }
}

/// ECMAScript WhiteSpace plus LineTerminator. `char::is_whitespace`
/// covers the Unicode Zs set, LS, and PS; ZWNBSP is added by hand.
fn is_js_whitespace(c: char) -> bool {
    c.is_whitespace() || c == '\u{feff}'
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_ident_part(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).iter().map(|t| t.kind).collect()
    }

    fn reassemble(source: &str) -> String {
        tokenize(source).iter().map(|t| t.value.as_str()).collect()
    }

    #[test]
    fn empty_source_is_just_eof() {
        let tokens = tokenize("");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Eof);
        assert_eq!((tokens[0].start, tokens[0].end), (0, 0));
    }

    #[test]
    fn roundtrip_reproduces_source() {
        let source = "const x = `a${1 + {b: 2}.b}c`;\n// done\nif (x) { y /= 2; }";
        assert_eq!(reassemble(source), source);
    }

    #[test]
    fn eof_offsets_equal_source_length() {
        let source = "let n = 0x1f;";
        let tokens = tokenize(source);
        let eof = tokens.last().unwrap();
        assert_eq!(eof.kind, TokenKind::Eof);
        assert_eq!((eof.start, eof.end), (source.len(), source.len()));
    }

    #[test]
    fn offsets_index_back_into_source() {
        let source = "var s = \"héllo\"; s.length";
        for t in tokenize(source) {
            assert!(t.start <= t.end && t.end <= source.len());
            assert_eq!(&source[t.start..t.end], t.value);
        }
    }

    #[test]
    fn keywords_and_identifiers() {
        let tokens = tokenize("return from");
        assert_eq!(tokens[0].kind, TokenKind::Keyword);
        // `from` is contextual and scans as a plain identifier.
        assert_eq!(tokens[2].kind, TokenKind::Identifier);
        assert_eq!(tokens[2].value, "from");
    }

    #[test]
    fn regex_after_return_division_after_identifier() {
        let tokens: Vec<Token> = tokenize("return /a/g")
            .into_iter()
            .filter(Token::is_significant)
            .collect();
        assert_eq!(tokens[1].kind, TokenKind::Regex);
        assert_eq!(tokens[1].value, "/a/g");

        let tokens: Vec<Token> = tokenize("b / a / g")
            .into_iter()
            .filter(Token::is_significant)
            .collect();
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Identifier,
                TokenKind::Punctuator,
                TokenKind::Identifier,
                TokenKind::Punctuator,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn regex_allowed_at_start_of_file() {
        let tokens = tokenize("/ab[c/d]e/gi");
        assert_eq!(tokens[0].kind, TokenKind::Regex);
        // The `/` inside the character class does not end the literal.
        assert_eq!(tokens[0].value, "/ab[c/d]e/gi");
    }

    #[test]
    fn string_with_escaped_quote() {
        let tokens = tokenize(r#""a\"b" + 'c\'d'"#);
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].value, r#""a\"b""#);
        assert_eq!(tokens[4].value, r"'c\'d'");
    }

    #[test]
    fn unterminated_string_extends_to_eof() {
        let source = "\"abc";
        let tokens = tokenize(source);
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].value, "\"abc");
        assert_eq!(tokens[1].kind, TokenKind::Eof);
    }

    #[test]
    fn unterminated_block_comment_extends_to_eof() {
        let tokens = tokenize("/* open");
        assert_eq!(tokens[0].kind, TokenKind::Comment);
        assert_eq!(tokens[0].value, "/* open");
    }

    #[test]
    fn template_with_nested_interpolation_braces() {
        let source = "`x${ {a: {b: 1}}.a.b }y`";
        let tokens = tokenize(source);
        assert_eq!(tokens[0].kind, TokenKind::Template);
        assert_eq!(tokens[0].value, source);
        assert_eq!(tokens[1].kind, TokenKind::Eof);
    }

    #[test]
    fn template_backtick_inside_interpolation_is_consumed() {
        // The interpolation tracks braces only; a nested template stays
        // inside the outer token.
        let source = "`a${`b`}c`";
        let tokens = tokenize(source);
        assert_eq!(tokens[0].kind, TokenKind::Template);
        assert_eq!(tokens[0].value, source);
    }

    #[test]
    fn numbers() {
        let tokens: Vec<Token> = tokenize("1 23.45 0x1F .5 0xZ")
            .into_iter()
            .filter(|t| t.kind != TokenKind::Whitespace)
            .collect();
        assert_eq!(tokens[0].value, "1");
        assert_eq!(tokens[1].value, "23.45");
        assert_eq!(tokens[2].value, "0x1F");
        assert_eq!(tokens[3].value, ".5");
        // No hex digit after `0x`: the zero scans alone.
        assert_eq!(tokens[4].value, "0");
        assert_eq!(tokens[5].value, "xZ");
        assert_eq!(tokens[5].kind, TokenKind::Identifier);
    }

    #[test]
    fn punctuators_match_longest_first() {
        let values: Vec<String> = tokenize("a===b")
            .into_iter()
            .map(|t| t.value)
            .collect();
        assert_eq!(values, vec!["a", "===", "b", ""]);

        let values: Vec<String> = tokenize("x>>>=1")
            .into_iter()
            .map(|t| t.value)
            .collect();
        // Matching caps at three characters.
        assert_eq!(values, vec!["x", ">>>", "=", "1", ""]);
    }

    #[test]
    fn optional_chaining_and_nullish() {
        let values: Vec<String> = tokenize("a?.b ?? c")
            .into_iter()
            .filter(|t| t.kind == TokenKind::Punctuator)
            .map(|t| t.value)
            .collect();
        assert_eq!(values, vec!["?.", "??"]);
    }

    #[test]
    fn unknown_character_is_single_punctuator() {
        let tokens = tokenize("a # €");
        assert_eq!(tokens[2].kind, TokenKind::Punctuator);
        assert_eq!(tokens[2].value, "#");
        assert_eq!(tokens[4].kind, TokenKind::Punctuator);
        assert_eq!(tokens[4].value, "€");
        assert_eq!(reassemble("a # €"), "a # €");
    }

    #[test]
    fn unicode_whitespace_is_whitespace() {
        let source = "a\u{00a0}\u{2028}b";
        let tokens = tokenize(source);
        assert_eq!(tokens[1].kind, TokenKind::Whitespace);
        assert_eq!(tokens[1].value, "\u{00a0}\u{2028}");
    }

    #[test]
    fn mixed_crlf_comment_boundaries() {
        let tokens = tokenize("// one\r\n// two\n");
        assert_eq!(tokens[0].kind, TokenKind::Comment);
        assert_eq!(tokens[0].value, "// one");
        assert_eq!(tokens[2].kind, TokenKind::Comment);
        assert_eq!(tokens[2].value, "// two");
    }

    #[test]
    fn comment_syntax_inside_string_stays_a_string() {
        let tokens = tokenize("const u = \"http://x/*y*/?q=1\";");
        let s = tokens.iter().find(|t| t.kind == TokenKind::String).unwrap();
        assert_eq!(s.value, "\"http://x/*y*/?q=1\"");
        assert_eq!(kinds("\"/*not a comment*/\"").len(), 2);
    }
}
