use std::sync::OnceLock;

use regex::Regex;

use super::{BaseReference, is_c_comment};
use crate::language::LanguageKind;

static PY_CLASS_RE: OnceLock<Regex> = OnceLock::new();
static EXTENDS_RE: OnceLock<Regex> = OnceLock::new();
static IMPLEMENTS_RE: OnceLock<Regex> = OnceLock::new();
static CS_CLASS_RE: OnceLock<Regex> = OnceLock::new();

fn py_class_re() -> &'static Regex {
    PY_CLASS_RE.get_or_init(|| {
        Regex::new(r"^\s*class\s+\w+\s*\(([^)]*)\)").expect("invalid python class pattern")
    })
}

fn extends_re() -> &'static Regex {
    EXTENDS_RE.get_or_init(|| {
        Regex::new(r"\b(?:class|interface)\s+[\w$]+(?:\s*<[^>{]*>)?\s+extends\s+([\w$.,\s<>]+?)\s*(?:\bimplements\b|\{|$)")
            .expect("invalid extends pattern")
    })
}

fn implements_re() -> &'static Regex {
    IMPLEMENTS_RE.get_or_init(|| {
        Regex::new(r"\bclass\s+[\w$]+.*?\bimplements\s+([\w$.,\s<>]+?)\s*(?:\{|$)")
            .expect("invalid implements pattern")
    })
}

fn cs_class_re() -> &'static Regex {
    CS_CLASS_RE.get_or_init(|| {
        Regex::new(r"\b(?:class|interface|struct|record)\s+\w+(?:\s*<[^>]*>)?\s*:\s*([\w.,\s<>]+?)\s*(?:\bwhere\b|\{|$)")
            .expect("invalid c# base list pattern")
    })
}

/// Extract the base classes / interfaces named in type declarations.
///
/// Go has no inheritance and yields nothing.
pub fn extract_bases(language: LanguageKind, text: &str) -> Vec<BaseReference> {
    let mut out = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line_no = i + 1;
        match language {
            LanguageKind::Python => {
                if let Some(c) = py_class_re().captures(line) {
                    push_list(&c[1], line_no, &mut out);
                }
            }
            LanguageKind::JavaScript | LanguageKind::Java => {
                if is_c_comment(line) {
                    continue;
                }
                if let Some(c) = extends_re().captures(line) {
                    push_list(&c[1], line_no, &mut out);
                }
                if let Some(c) = implements_re().captures(line) {
                    push_list(&c[1], line_no, &mut out);
                }
            }
            LanguageKind::CSharp => {
                if is_c_comment(line) {
                    continue;
                }
                if let Some(c) = cs_class_re().captures(line) {
                    push_list(&c[1], line_no, &mut out);
                }
            }
            LanguageKind::Go => {}
        }
    }
    out
}

/// Split a base list, dropping generic arguments and keyword arguments
/// (`metaclass=ABCMeta`).
fn push_list(list: &str, line: usize, out: &mut Vec<BaseReference>) {
    let mut depth = 0usize;
    let mut flat = String::with_capacity(list.len());
    for ch in list.chars() {
        match ch {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            _ if depth == 0 => flat.push(ch),
            _ => {}
        }
    }

    for item in flat.split(',') {
        let name = item.trim();
        if name.is_empty() || name.contains('=') {
            continue;
        }
        let valid = name
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '$' | '.'));
        if valid && !out.iter().any(|b| b.name == name && b.line == line) {
            out.push(BaseReference {
                name: name.to_owned(),
                line,
            });
        }
    }
}
