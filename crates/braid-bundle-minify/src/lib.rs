//! Braid Bundle Minify - whitespace and comment stripping
//!
//! Works on the token stream, so string, template, and regex bodies
//! pass through byte-identical and comment-like text inside them
//! survives. A space is re-emitted only where two word-like tokens
//! would otherwise fuse.

use braid_bundle_lex::{tokenize, Token, TokenKind};

/// Minifier switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinifyOptions {
    /// Keep the source as-is apart from trimming the ends.
    pub keep_comments: bool,
}

/// Minify with default options.
pub fn minify(source: &str) -> String {
    minify_with_options(source, &MinifyOptions::default())
}

/// Minify `source`. Semantics are preserved for programs that do not
/// depend on source positions or comments.
pub fn minify_with_options(source: &str, options: &MinifyOptions) -> String {
    if options.keep_comments {
        return source.trim().to_string();
    }

    let tokens = tokenize(source);
    let mut out = String::with_capacity(source.len());
    let mut prev_word_like = false;
    let mut pending_space = false;

    for token in &tokens {
        match token.kind {
            TokenKind::Comment | TokenKind::Eof => {}
            TokenKind::Whitespace => pending_space = true,
            _ => {
                let word_like = token.is_word_like();
                if pending_space && prev_word_like && word_like {
                    out.push(' ');
                }
                out.push_str(rewritten(token));
                prev_word_like = word_like;
                pending_space = false;
            }
        }
    }

    out.trim().to_string()
}

/// `true`/`false` shrink to `!0`/`!1`. `null` stays: `void 0` is not
/// equivalent to it.
fn rewritten(token: &Token) -> &str {
    if matches!(token.kind, TokenKind::Identifier | TokenKind::Keyword) {
        match token.value.as_str() {
            "true" => return "!0",
            "false" => return "!1",
            _ => {}
        }
    }
    &token.value
}
