//! Braid Bundle Obfuscate - string encoding and identifier renaming
//!
//! Token-driven throughout: both passes re-emit every token verbatim
//! except the ones they rewrite, so layout, comments, and regex bodies
//! survive untouched. When both passes are requested, renaming runs
//! first and the renamed output is re-tokenized before encoding.

use braid_bundle_lex::{tokenize, Token, TokenKind};
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// Obfuscator switches.
#[derive(Debug, Clone, Copy)]
pub struct ObfuscateOptions {
    /// Rewrite string bodies as `\xHH` runs. On by default.
    pub encode_strings: bool,
    /// Replace identifiers with generated short names. Off by default.
    pub rename_identifiers: bool,
    /// Accepted for configuration compatibility; currently a no-op.
    pub flatten_ifs: bool,
}

impl Default for ObfuscateOptions {
    fn default() -> Self {
        Self {
            encode_strings: true,
            rename_identifiers: false,
            flatten_ifs: false,
        }
    }
}

/// Names never renamed: the ambient globals a bundle must keep calling
/// by their real names.
pub static GLOBALS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "window", "global", "globalThis", "document", "console", "Math", "Date", "JSON",
        "Array", "Object", "String", "Number", "Boolean", "RegExp", "Promise", "Set",
        "Map", "Buffer", "atob", "undefined", "NaN", "Infinity", "Error", "TypeError",
        "ReferenceError", "SyntaxError", "RangeError", "eval", "parseInt", "parseFloat",
        "isNaN", "isFinite", "encodeURI", "decodeURI", "encodeURIComponent",
        "decodeURIComponent", "require", "module", "exports", "__dirname", "__filename",
    ]
    .into_iter()
    .collect()
});

/// Value literals scan as identifiers but name program constants, not
/// bindings.
const LITERALS: &[&str] = &["true", "false", "null"];

/// Apply the requested obfuscation passes to `source`.
pub fn obfuscate(source: &str, options: &ObfuscateOptions) -> String {
    let mut code = source.to_string();
    if options.rename_identifiers {
        code = rename_identifiers(&code);
    }
    if options.encode_strings {
        code = encode_strings(&code);
    }
    code
}

/// Hex-encode every string token body. Templates are encoded only when
/// they contain no interpolation; correctness over coverage.
pub fn encode_strings(source: &str) -> String {
    let tokens = tokenize(source);
    let mut out = String::with_capacity(source.len() * 2);
    for token in &tokens {
        match token.kind {
            TokenKind::String => out.push_str(&encode_quoted(&token.value)),
            TokenKind::Template if !token.value.contains("${") => {
                out.push_str(&encode_quoted(&token.value))
            }
            _ => out.push_str(&token.value),
        }
    }
    out
}

/// `q<inner>q` with each inner code unit as lowercase `\xHH`. Literals
/// that are unterminated or carry a code unit above 0xFF pass through
/// verbatim; rewriting those would change what the program evaluates.
fn encode_quoted(value: &str) -> String {
    let mut chars = value.chars();
    let Some(quote) = chars.next() else {
        return value.to_string();
    };
    let Some(inner) = chars.as_str().strip_suffix(quote) else {
        return value.to_string();
    };
    if inner.chars().any(|c| c as u32 > 0xFF) {
        return value.to_string();
    }

    let mut encoded = String::with_capacity(inner.len() * 4 + 2);
    encoded.push(quote);
    for c in inner.chars() {
        encoded.push_str(&format!("\\x{:02x}", c as u32));
    }
    encoded.push(quote);
    encoded
}

/// Two passes over one token stream: assign generated names in
/// first-encounter order, then substitute.
pub fn rename_identifiers(source: &str) -> String {
    let tokens = tokenize(source);
    let renamable = renamable_flags(&tokens);

    let mut assigned: HashMap<&str, String> = HashMap::new();
    for (i, token) in tokens.iter().enumerate() {
        if renamable[i] && !assigned.contains_key(token.value.as_str()) {
            let name = generate_name(assigned.len());
            assigned.insert(&token.value, name);
        }
    }

    let mut out = String::with_capacity(source.len());
    for (i, token) in tokens.iter().enumerate() {
        if renamable[i] {
            out.push_str(&assigned[token.value.as_str()]);
        } else {
            out.push_str(&token.value);
        }
    }
    out
}

/// An identifier is renamable unless it is a listed global, a value
/// literal, or sits in property-access position after `.` or `?.`.
fn renamable_flags(tokens: &[Token]) -> Vec<bool> {
    let mut flags = vec![false; tokens.len()];
    let mut prev: Option<&Token> = None;
    for (i, token) in tokens.iter().enumerate() {
        if !token.is_significant() {
            continue;
        }
        if token.kind == TokenKind::Identifier {
            let property_position = prev.is_some_and(|p| {
                p.kind == TokenKind::Punctuator && (p.value == "." || p.value == "?.")
            });
            flags[i] = !property_position
                && !GLOBALS.contains(token.value.as_str())
                && !LITERALS.contains(&token.value.as_str());
        }
        prev = Some(token);
    }
    flags
}

/// Base-52 short names: `a..z`, `A..Z`, `aa`, `ab`, ...
pub fn generate_name(index: usize) -> String {
    const ALPHABET: &[u8; 52] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
    let mut name = Vec::new();
    let mut n = index;
    loop {
        name.push(ALPHABET[n % 52]);
        let quotient = n / 52;
        if quotient == 0 {
            break;
        }
        n = quotient - 1;
    }
    name.reverse();
    String::from_utf8(name).expect("alphabet is ASCII")
}
