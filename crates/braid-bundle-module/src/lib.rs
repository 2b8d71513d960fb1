//! Braid Bundle Module - module-syntax extraction
//!
//! Classifies `import`/`export` statements from the token stream. No
//! grammar beyond statement heads: each recognized statement yields one
//! record, then the walk skips to the next `;`. The `from` token is
//! contextual and is accepted as either identifier or keyword.

use braid_bundle_lex::{Token, TokenKind};

/// How a module is imported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    /// `import "x";` - imported for its effects only.
    SideEffect,
    /// `import ... from "x";` - default, namespace, or named list. The
    /// clause is not decomposed at this layer.
    NamedOrDefault,
}

/// One static import statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRecord {
    /// Import form.
    pub kind: ImportKind,
    /// Specifier with the surrounding quotes stripped.
    pub source: String,
}

/// What an export statement exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    /// `export default ...`
    Default,
    /// `export { a, b }`, `export const x = ...`, and friends.
    Named,
    /// `export *`, with or without a source.
    All,
}

/// One export statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRecord {
    /// Export form.
    pub kind: ExportKind,
    /// Exported names. For a renamed clause (`a as b`) the local side is
    /// collected.
    pub names: Vec<String>,
    /// Present for re-exports (`export ... from "x"`), quotes stripped.
    pub source: Option<String>,
}

/// Imports and exports found in one module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleSyntax {
    /// Static imports, in source order.
    pub imports: Vec<ImportRecord>,
    /// Exports, in source order.
    pub exports: Vec<ExportRecord>,
}

const DECL_KEYWORDS: &[&str] = &["const", "let", "var", "function", "class"];

/// Walk the token stream and collect import/export records.
pub fn find_module_syntax(tokens: &[Token]) -> ModuleSyntax {
    let toks: Vec<&Token> = tokens
        .iter()
        .filter(|t| t.is_significant() && t.kind != TokenKind::Eof)
        .collect();

    let mut syntax = ModuleSyntax::default();
    let mut i = 0;
    while i < toks.len() {
        let t = toks[i];
        if t.kind == TokenKind::Keyword && t.value == "import" {
            i = parse_import(&toks, i + 1, &mut syntax.imports);
        } else if t.kind == TokenKind::Keyword && t.value == "export" {
            i = parse_export(&toks, i + 1, &mut syntax.exports);
        } else {
            i += 1;
        }
    }
    syntax
}

fn parse_import(toks: &[&Token], start: usize, imports: &mut Vec<ImportRecord>) -> usize {
    match toks.get(start) {
        Some(t) if t.kind == TokenKind::String => {
            imports.push(ImportRecord {
                kind: ImportKind::SideEffect,
                source: unquote(&t.value),
            });
        }
        Some(_) => {
            // Default, namespace, or named clause; only the specifier
            // after `from` matters here.
            if let Some(source) = find_from_specifier(toks, start) {
                imports.push(ImportRecord {
                    kind: ImportKind::NamedOrDefault,
                    source,
                });
            }
            // `import(...)` has no `from` clause and yields no record.
        }
        None => {}
    }
    skip_statement(toks, start)
}

fn parse_export(toks: &[&Token], start: usize, exports: &mut Vec<ExportRecord>) -> usize {
    let Some(t) = toks.get(start) else {
        return skip_statement(toks, start);
    };

    if t.kind == TokenKind::Punctuator && t.value == "*" {
        // `export * from "x"`, `export * as ns from "x"`, or bare
        // `export *`.
        exports.push(ExportRecord {
            kind: ExportKind::All,
            names: Vec::new(),
            source: find_from_specifier(toks, start + 1),
        });
    } else if t.kind == TokenKind::Keyword && t.value == "default" {
        exports.push(ExportRecord {
            kind: ExportKind::Default,
            names: Vec::new(),
            source: None,
        });
    } else if t.kind == TokenKind::Punctuator && t.value == "{" {
        let (names, after_brace) = collect_brace_names(toks, start + 1);
        exports.push(ExportRecord {
            kind: ExportKind::Named,
            names,
            source: find_from_specifier(toks, after_brace),
        });
    } else if is_decl_head(toks, start) {
        if let Some(name) = decl_name(toks, start) {
            exports.push(ExportRecord {
                kind: ExportKind::Named,
                names: vec![name],
                source: None,
            });
        }
    }
    skip_statement(toks, start)
}

/// Scan forward to the statement end looking for `from "specifier"`.
fn find_from_specifier(toks: &[&Token], start: usize) -> Option<String> {
    let mut i = start;
    while i < toks.len() && !is_semi(toks[i]) {
        if is_from(toks[i]) {
            if let Some(next) = toks.get(i + 1) {
                if next.kind == TokenKind::String {
                    return Some(unquote(&next.value));
                }
            }
        }
        i += 1;
    }
    None
}

/// Collect the local side of each clause inside an export brace list.
/// Returns the names and the index just past the closing `}`.
fn collect_brace_names(toks: &[&Token], start: usize) -> (Vec<String>, usize) {
    let mut names = Vec::new();
    let mut i = start;
    while i < toks.len() {
        let t = toks[i];
        if t.kind == TokenKind::Punctuator && t.value == "}" {
            return (names, i + 1);
        }
        if matches!(t.kind, TokenKind::Identifier | TokenKind::Keyword) {
            names.push(t.value.clone());
            // Drop the renamed side of `local as exported`.
            if toks.get(i + 1).is_some_and(|n| n.kind == TokenKind::Identifier && n.value == "as")
                && toks
                    .get(i + 2)
                    .is_some_and(|n| matches!(n.kind, TokenKind::Identifier | TokenKind::Keyword))
            {
                i += 2;
            }
        }
        i += 1;
    }
    (names, i)
}

fn is_decl_head(toks: &[&Token], i: usize) -> bool {
    let Some(t) = toks.get(i) else { return false };
    if t.kind != TokenKind::Keyword {
        return false;
    }
    DECL_KEYWORDS.contains(&t.value.as_str())
        || (t.value == "async"
            && toks.get(i + 1).is_some_and(|n| n.value == "function"))
}

/// The declared identifier of `export <decl-keyword> <identifier> ...`,
/// skipping `async` and a generator `*`.
fn decl_name(toks: &[&Token], mut i: usize) -> Option<String> {
    if toks[i].value == "async" {
        i += 1;
    }
    let mut j = i + 1;
    if toks.get(j).is_some_and(|t| t.kind == TokenKind::Punctuator && t.value == "*") {
        j += 1;
    }
    let name = toks.get(j)?;
    (name.kind == TokenKind::Identifier).then(|| name.value.clone())
}

/// Advance past the next `;`, or to the end of the stream.
fn skip_statement(toks: &[&Token], start: usize) -> usize {
    let mut i = start;
    while i < toks.len() {
        if is_semi(toks[i]) {
            return i + 1;
        }
        i += 1;
    }
    i
}

fn is_semi(t: &Token) -> bool {
    t.kind == TokenKind::Punctuator && t.value == ";"
}

fn is_from(t: &Token) -> bool {
    matches!(t.kind, TokenKind::Identifier | TokenKind::Keyword) && t.value == "from"
}

/// Strip the surrounding quote characters from a string-literal token
/// value. Unterminated literals lose only the opening quote.
fn unquote(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(q @ ('"' | '\'' | '`')) => {
            let inner = chars.as_str();
            inner.strip_suffix(q).unwrap_or(inner).to_string()
        }
        _ => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use braid_bundle_lex::tokenize;

    fn extract(source: &str) -> ModuleSyntax {
        find_module_syntax(&tokenize(source))
    }

    #[test]
    fn side_effect_import() {
        let syntax = extract("import \"./polyfill.js\";");
        assert_eq!(syntax.imports.len(), 1);
        assert_eq!(syntax.imports[0].kind, ImportKind::SideEffect);
        assert_eq!(syntax.imports[0].source, "./polyfill.js");
    }

    #[test]
    fn default_named_and_namespace_imports() {
        let syntax = extract(
            "import x from './a.js';\n\
             import { b, c as d } from './b.js';\n\
             import * as ns from './c.js';",
        );
        let sources: Vec<&str> = syntax.imports.iter().map(|i| i.source.as_str()).collect();
        assert_eq!(sources, vec!["./a.js", "./b.js", "./c.js"]);
        assert!(syntax
            .imports
            .iter()
            .all(|i| i.kind == ImportKind::NamedOrDefault));
    }

    #[test]
    fn dynamic_import_yields_no_record() {
        let syntax = extract("const mod = import('./lazy.js');");
        assert!(syntax.imports.is_empty());
    }

    #[test]
    fn export_default() {
        let syntax = extract("export default class Widget {};");
        assert_eq!(syntax.exports.len(), 1);
        assert_eq!(syntax.exports[0].kind, ExportKind::Default);
    }

    #[test]
    fn export_named_list_collapses_renames_to_local_side() {
        let syntax = extract("export { a, b as c, d };");
        assert_eq!(syntax.exports[0].kind, ExportKind::Named);
        assert_eq!(syntax.exports[0].names, vec!["a", "b", "d"]);
        assert_eq!(syntax.exports[0].source, None);
    }

    #[test]
    fn export_declaration_forms() {
        let syntax = extract(
            "export const one = 1;\n\
             export let two = 2;\n\
             export function three() {}\n\
             export async function four() {}\n\
             export function* five() {}\n\
             export class Six {}",
        );
        let names: Vec<&str> = syntax
            .exports
            .iter()
            .flat_map(|e| e.names.iter().map(String::as_str))
            .collect();
        assert_eq!(names, vec!["one", "two", "three", "four", "five", "Six"]);
    }

    #[test]
    fn export_all_forms() {
        let syntax = extract("export * from './x.js';\nexport *;");
        assert_eq!(syntax.exports[0].kind, ExportKind::All);
        assert_eq!(syntax.exports[0].source.as_deref(), Some("./x.js"));
        assert_eq!(syntax.exports[1].kind, ExportKind::All);
        assert_eq!(syntax.exports[1].source, None);
    }

    #[test]
    fn export_star_as_namespace_keeps_the_source() {
        let syntax = extract("export * as util from './util.js';");
        assert_eq!(syntax.exports[0].kind, ExportKind::All);
        assert_eq!(syntax.exports[0].source.as_deref(), Some("./util.js"));
    }

    #[test]
    fn named_reexport_carries_the_source() {
        let syntax = extract("export { helper } from './helpers.js';");
        assert_eq!(syntax.exports[0].kind, ExportKind::Named);
        assert_eq!(syntax.exports[0].names, vec!["helper"]);
        assert_eq!(syntax.exports[0].source.as_deref(), Some("./helpers.js"));
    }

    #[test]
    fn comments_between_tokens_are_skipped() {
        let syntax = extract("import /* side */ { a } /* of */ from /* it */ './m.js';");
        assert_eq!(syntax.imports.len(), 1);
        assert_eq!(syntax.imports[0].source, "./m.js");
    }

    #[test]
    fn import_in_string_is_not_a_statement() {
        let syntax = extract("const s = \"import { x } from './fake.js';\";");
        assert!(syntax.imports.is_empty());
    }

    #[test]
    fn specifier_quotes_are_stripped_for_both_quote_kinds() {
        let syntax = extract("import a from \"./dq.js\"; import b from './sq.js';");
        assert_eq!(syntax.imports[0].source, "./dq.js");
        assert_eq!(syntax.imports[1].source, "./sq.js");
    }
}
