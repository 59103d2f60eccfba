use std::sync::OnceLock;

use regex::Regex;

use super::{CallSite, is_c_comment};
use crate::language::LanguageKind;

static CALL_RE: OnceLock<Regex> = OnceLock::new();

/// `(ident.)*ident(`
fn call_re() -> &'static Regex {
    CALL_RE.get_or_init(|| {
        Regex::new(r"([A-Za-z_$][\w$]*(?:\.[A-Za-z_$][\w$]*)*)\s*\(").expect("invalid call pattern")
    })
}

/// Words that precede a `(` without being calls.
fn is_call_keyword(name: &str) -> bool {
    matches!(
        name,
        "if" | "elif"
            | "for"
            | "foreach"
            | "while"
            | "switch"
            | "return"
            | "catch"
            | "function"
            | "def"
            | "func"
            | "class"
            | "new"
            | "typeof"
            | "sizeof"
            | "await"
            | "lock"
            | "using"
            | "with"
            | "assert"
            | "yield"
            | "import"
            | "require"
            | "super"
            | "not"
            | "and"
            | "or"
            | "in"
    )
}

/// Extract every call-like expression of `text`.
///
/// This is a deliberately coarse scan: without type information the only
/// classification is syntactic. A call is external when it is qualified
/// (`a.b(`) and its receiver is not `this` or `self`.
pub fn extract_calls(language: LanguageKind, text: &str) -> Vec<CallSite> {
    let mut out = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let is_comment = match language {
            LanguageKind::Python => line.trim_start().starts_with('#'),
            _ => is_c_comment(line),
        };
        if is_comment {
            continue;
        }
        for caps in call_re().captures_iter(line) {
            let callee = &caps[1];
            let last = callee.rsplit('.').next().unwrap_or(callee);
            if is_call_keyword(last) || is_call_keyword(callee) {
                continue;
            }
            let is_external = callee.contains('.')
                && !callee.starts_with("this.")
                && !callee.starts_with("self.");
            out.push(CallSite {
                callee: callee.to_owned(),
                line: i + 1,
                is_external,
            });
        }
    }
    out
}

/// Split an external callee into `(receiver, name)`: the segment before the
/// final one and the final one. Returns `None` for unqualified callees.
pub fn receiver_and_name(callee: &str) -> Option<(&str, &str)> {
    let (head, name) = callee.rsplit_once('.')?;
    let receiver = head.rsplit('.').next().unwrap_or(head);
    if receiver.is_empty() || name.is_empty() {
        return None;
    }
    Some((receiver, name))
}
