//! Braid Bundle Lex - conservative JavaScript tokenizer
//!
//! Single forward scan, no grammar. Every downstream pass consumes this
//! token stream instead of re-interpreting character-level syntax, so the
//! hard cases (string/template/regex/comment disambiguation, the
//! regex-vs-division heuristic) live here and nowhere else.
//!
//! The scan is total: it always terminates, never fails, and tolerates
//! unterminated strings, templates, block comments, and regexes by
//! consuming to end of input. Unknown characters come out as
//! single-character punctuators.

mod cache;
mod scanner;

pub use cache::TokenCache;
pub use scanner::tokenize;

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Classification of a scanned token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Identifier run that is not a keyword.
    Identifier,
    /// Identifier run matching the fixed keyword set.
    Keyword,
    /// `'...'` or `"..."` literal, quotes included.
    String,
    /// Backtick literal, interpolations included, as one token.
    Template,
    /// Decimal or hex numeric literal.
    Number,
    /// Operator or delimiter, longest-match.
    Punctuator,
    /// `/pattern/flags` literal.
    Regex,
    /// `//` or `/* */` comment, text preserved verbatim.
    Comment,
    /// Maximal whitespace run, text preserved verbatim.
    Whitespace,
    /// End of input; always the final token, zero width.
    Eof,
}

/// One scanned token. `value` is the exact source slice, `start`/`end`
/// byte offsets with `end` exclusive. Concatenating the values of all
/// non-eof tokens in order reproduces the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Token classification.
    pub kind: TokenKind,
    /// Exact source text of the token.
    pub value: String,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

impl Token {
    /// Whitespace and comments are insignificant; everything else takes
    /// part in statement recognition and adjacency decisions.
    pub fn is_significant(&self) -> bool {
        !matches!(self.kind, TokenKind::Whitespace | TokenKind::Comment)
    }

    /// Identifier, keyword, or number. Two adjacent word-like tokens
    /// need a separator to survive re-emission.
    pub fn is_word_like(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Identifier | TokenKind::Keyword | TokenKind::Number
        )
    }
}

/// The fixed keyword set. Contextual words (`async`, `of`, `await`) are
/// included; `from` deliberately is not and scans as an identifier.
pub static KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "break", "case", "catch", "class", "const", "continue", "debugger", "default",
        "delete", "do", "else", "export", "extends", "finally", "for", "function", "if",
        "import", "in", "instanceof", "let", "new", "return", "super", "switch", "this",
        "throw", "try", "typeof", "var", "void", "while", "with", "yield", "enum",
        "await", "async", "of",
    ]
    .into_iter()
    .collect()
});

/// Three-character punctuators, tried first.
pub(crate) const PUNCT3: &[&str] = &[
    "===", "!==", ">>>", "<<=", ">>=", "**=", "??=", "||=", "&&=",
];

/// Two-character punctuators, tried second. One-character fallback
/// accepts any remaining character, so `>>>=` scans as `>>>` `=`.
pub(crate) const PUNCT2: &[&str] = &[
    "<=", ">=", "==", "!=", "++", "--", "<<", ">>", "&&", "||", "??", "+=", "-=", "*=",
    "%=", "&=", "|=", "^=", "=>", "**", "?.",
];

/// Keywords after which a `/` starts a regex literal.
pub(crate) static REGEX_ALLOWED_KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["return", "case", "throw", "else", "do", "typeof", "instanceof", "in", "of"]
        .into_iter()
        .collect()
});

/// Punctuators after which a `/` starts a regex literal.
pub(crate) static REGEX_ALLOWED_PUNCTUATORS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "(", "{", "[", ",", ";", "!", "~", "?", "=", ":", "&&", "||", "??", "+", "-",
        "*", "/", "%", "&", "|", "^", "<", ">",
    ]
    .into_iter()
    .collect()
});
