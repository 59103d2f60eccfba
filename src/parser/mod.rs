pub mod calls;
pub mod csharp;
pub mod go;
pub mod inheritance;
pub mod java;
pub mod javascript;
pub mod python;

use serde::Serialize;

use crate::language::LanguageKind;

pub use calls::extract_calls;
pub use inheritance::extract_bases;

/// Symbol sentinel for wildcard, namespace-less side-effect and `export *` imports.
pub const WILDCARD: &str = "*";

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

/// The syntactic flavour of an import statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ImportKind {
    /// Static import/using/`from .. import` declaration.
    Static,
    /// `export { X } from './module'` / `export * from './module'`.
    ReExport,
    /// CommonJS `require('./module')`.
    CommonJs,
    /// Dynamic `import('./module')`.
    Dynamic,
}

/// One import observation extracted from a source line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportStatement {
    /// The raw module target as written, e.g. `"./utils"`, `"..pkg.mod"`, `"fmt"`.
    pub module: String,
    /// Imported names, deduplicated in source order. `"*"` marks wildcard or
    /// side-effect imports; empty for Go blank imports.
    pub symbols: Vec<String>,
    /// True for default-style bindings (`import React from 'react'`).
    pub is_default: bool,
    /// 1-based source line.
    pub line: usize,
    /// The trimmed source line, kept for provenance.
    pub raw: String,
    pub kind: ImportKind,
    /// Fallback module strings tried in order when `module` does not resolve.
    pub alternates: Vec<String>,
    /// `module.name` strings for names that may themselves be modules. Tried
    /// after every candidate, and only by exact qualified path.
    pub submodules: Vec<String>,
}

impl ImportStatement {
    pub(crate) fn new(module: impl Into<String>, line: usize, raw: &str) -> Self {
        Self {
            module: module.into(),
            symbols: Vec::new(),
            is_default: false,
            line,
            raw: raw.trim().to_owned(),
            kind: ImportKind::Static,
            alternates: Vec::new(),
            submodules: Vec::new(),
        }
    }

    pub(crate) fn with_symbols<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for s in symbols {
            push_unique(&mut self.symbols, s.into());
        }
        self
    }

    pub(crate) fn with_kind(mut self, kind: ImportKind) -> Self {
        self.kind = kind;
        self
    }

    pub(crate) fn default_import(mut self) -> Self {
        self.is_default = true;
        self
    }

    /// Every module string the resolver should try, primary first.
    pub fn candidates(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.module.as_str()).chain(self.alternates.iter().map(String::as_str))
    }
}

/// A call expression observed on a source line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallSite {
    /// The full callee expression without the argument list, e.g. `"utils.parse"`.
    pub callee: String,
    /// 1-based source line.
    pub line: usize,
    /// True when the call is qualified and not on `this`/`self`.
    pub is_external: bool,
}

/// A base class / interface named in a type declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BaseReference {
    /// The base name as written, possibly dotted (`models.Base`).
    pub name: String,
    /// 1-based source line.
    pub line: usize,
}

/// Everything the extractors observe in one file.
#[derive(Debug, Clone, Default)]
pub struct ParseResult {
    pub imports: Vec<ImportStatement>,
    pub calls: Vec<CallSite>,
    pub bases: Vec<BaseReference>,
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Extract the import statements of `text`, using the rule set for `language`.
pub fn extract_imports(language: LanguageKind, text: &str) -> Vec<ImportStatement> {
    match language {
        LanguageKind::Python => python::extract(text),
        LanguageKind::JavaScript => javascript::extract(text),
        LanguageKind::Java => java::extract(text),
        LanguageKind::CSharp => csharp::extract(text),
        LanguageKind::Go => go::extract(text),
    }
}

/// Run every extractor over one file's text.
///
/// Never fails: lines that match no rule simply contribute nothing.
pub fn parse_source(language: LanguageKind, text: &str) -> ParseResult {
    ParseResult {
        imports: extract_imports(language, text),
        calls: extract_calls(language, text),
        bases: extract_bases(language, text),
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Push `value` unless it is empty or already present.
pub(crate) fn push_unique(list: &mut Vec<String>, value: String) {
    if !value.is_empty() && !list.contains(&value) {
        list.push(value);
    }
}

/// Strip an `as alias` suffix, returning the original name.
pub(crate) fn strip_alias(item: &str) -> &str {
    let item = item.trim();
    match item.find(" as ") {
        Some(idx) => item[..idx].trim(),
        None => item,
    }
}

/// Split a comma-separated list of named bindings into clean original names.
///
/// Handles `type` qualifiers, `as` aliases, destructuring renames (`a: b`),
/// default values (`a = 1`) and stray braces/parens.
pub(crate) fn split_named(list: &str) -> Vec<String> {
    let mut names = Vec::new();
    for item in list.split(',') {
        let item = item.trim_matches(|c: char| c.is_whitespace() || matches!(c, '{' | '}' | '(' | ')'));
        let item = item.strip_prefix("type ").unwrap_or(item);
        let item = strip_alias(item);
        let item = item.split(':').next().unwrap_or("").trim();
        let item = item.split('=').next().unwrap_or("").trim();
        if !item.is_empty() {
            push_unique(&mut names, item.to_owned());
        }
    }
    names
}

/// Returns true for lines that are entirely a comment in C-family syntax.
pub(crate) fn is_c_comment(line: &str) -> bool {
    let t = line.trim_start();
    t.starts_with("//") || t.starts_with("/*") || t.starts_with('*')
}
