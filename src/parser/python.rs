use std::sync::OnceLock;

use regex::Regex;

use super::{ImportStatement, WILDCARD, push_unique, strip_alias};

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

static FROM_RE: OnceLock<Regex> = OnceLock::new();
static IMPORT_RE: OnceLock<Regex> = OnceLock::new();

/// `from <module> import <names>` where module may carry leading dots.
fn from_re() -> &'static Regex {
    FROM_RE.get_or_init(|| {
        Regex::new(r"^\s*from\s+(\.+[\w.]*|[A-Za-z_][\w.]*)\s+import\s+(.+)$")
            .expect("invalid python from-import pattern")
    })
}

/// `import a.b [as c], d`
fn import_re() -> &'static Regex {
    IMPORT_RE.get_or_init(|| {
        Regex::new(r"^\s*import\s+([A-Za-z_][\w.]*(?:\s+as\s+\w+)?(?:\s*,\s*[A-Za-z_][\w.]*(?:\s+as\s+\w+)?)*)")
            .expect("invalid python import pattern")
    })
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Extract Python imports from a whole file.
///
/// A `from X import (` group or a backslash-continued name list is read up to
/// its last line and reported on the line that opens it.
pub fn extract(text: &str) -> Vec<ImportStatement> {
    let mut out = Vec::new();
    let mut lines = text.lines().enumerate();

    while let Some((i, line)) = lines.next() {
        let line_no = i + 1;
        let group = from_re()
            .captures(line)
            .filter(|_| !line.trim_start().starts_with('#'))
            .and_then(|caps| {
                let clause = strip_comment(&caps[2]);
                open_group(clause).map(|close| (caps[1].to_owned(), clause.to_owned(), close))
            });

        let Some((module, mut clause, close)) = group else {
            out.extend(parse_line(line, line_no));
            continue;
        };

        for (_, next) in lines.by_ref() {
            let next = strip_comment(next);
            clause.push(',');
            clause.push_str(next);
            let closed = match close {
                Group::Paren => next.contains(')'),
                Group::Backslash => !next.trim_end().ends_with('\\'),
            };
            if closed {
                break;
            }
        }

        out.extend(from_import(&module, clean_symbols(&clause), line, line_no));
    }

    out
}

/// How a name list spanning several lines is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Group {
    Paren,
    Backslash,
}

/// The group a `from .. import` clause opens, if it continues past its line.
fn open_group(clause: &str) -> Option<Group> {
    let clause = clause.trim_end();
    if clause.contains('(') && !clause.contains(')') {
        Some(Group::Paren)
    } else if clause.ends_with('\\') {
        Some(Group::Backslash)
    } else {
        None
    }
}

fn strip_comment(line: &str) -> &str {
    line.split('#').next().unwrap_or("")
}

/// Classify one Python source line.
///
/// A `from` line is never re-parsed as a plain `import`: its trailing
/// `import a, b` clause would otherwise match the plain-import rule too.
pub fn parse_line(line: &str, line_no: usize) -> Vec<ImportStatement> {
    if line.trim_start().starts_with('#') {
        return Vec::new();
    }

    if let Some(caps) = from_re().captures(line) {
        let module = &caps[1];
        let symbols = clean_symbols(&caps[2]);
        if symbols.is_empty() && open_group(strip_comment(&caps[2])).is_none() {
            return Vec::new();
        }
        return from_import(module, symbols, line, line_no);
    }

    if let Some(caps) = import_re().captures(line) {
        return caps[1]
            .split(',')
            .filter_map(|item| {
                let module = strip_alias(item);
                if module.is_empty() {
                    return None;
                }
                let binding = item
                    .trim()
                    .split_once(" as ")
                    .map(|(_, alias)| alias.trim())
                    .unwrap_or_else(|| trailing_segment(module));
                let mut stmt = ImportStatement::new(module, line_no, line).with_symbols([binding]);
                if module.contains('.') {
                    stmt.alternates.push(trailing_segment(module).to_owned());
                }
                Some(stmt)
            })
            .collect();
    }

    Vec::new()
}

fn from_import(module: &str, symbols: Vec<String>, line: &str, line_no: usize) -> Vec<ImportStatement> {
    let dots = module.len() - module.trim_start_matches('.').len();
    let rest = &module[dots..];

    // `from . import a, b` names sibling modules: one statement per name, with
    // the package itself (`__init__`) as the fallback.
    if rest.is_empty() {
        let prefix = &module[..dots];
        if symbols.is_empty() {
            return vec![ImportStatement::new(prefix, line_no, line)];
        }
        return symbols
            .into_iter()
            .filter(|s| s != WILDCARD)
            .map(|sym| {
                let mut stmt =
                    ImportStatement::new(format!("{prefix}{sym}"), line_no, line).with_symbols([sym]);
                stmt.alternates.push(prefix.to_owned());
                stmt
            })
            .collect();
    }

    // Each imported name may be a submodule of a package without `__init__.py`.
    let submodules = symbols
        .iter()
        .filter(|s| *s != WILDCARD)
        .map(|sym| format!("{module}.{sym}"))
        .collect();
    let mut stmt = ImportStatement::new(module, line_no, line).with_symbols(symbols);
    stmt.submodules = submodules;
    if rest.contains('.') {
        stmt.alternates.push(trailing_segment(rest).to_owned());
    }
    vec![stmt]
}

/// Clean the name list of a `from .. import` clause.
///
/// Strips inline comments, the opening paren / trailing backslash of
/// multi-line groups, trailing commas and `as` aliases.
fn clean_symbols(list: &str) -> Vec<String> {
    let list = list.split('#').next().unwrap_or("");
    let mut out = Vec::new();
    for item in list.split(',') {
        let item = item.trim_matches(|c: char| c.is_whitespace() || matches!(c, '(' | ')' | '\\'));
        let name = strip_alias(item);
        if name == WILDCARD || name.chars().all(|c| c.is_alphanumeric() || c == '_') {
            push_unique(&mut out, name.to_owned());
        }
    }
    out
}

fn trailing_segment(module: &str) -> &str {
    module.rsplit('.').next().unwrap_or(module)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_from_import() {
        let stmts = parse_line("from .b import x", 3);
        assert_eq!(stmts.len(), 1);
        assert_eq!(stmts[0].module, ".b");
        assert_eq!(stmts[0].symbols, vec!["x"]);
        assert_eq!(stmts[0].line, 3);
        assert!(stmts[0].alternates.is_empty());
    }

    #[test]
    fn test_dotted_from_import_has_trailing_alternate() {
        let stmts = parse_line("from ..pkg.models import User, Group as G  # models", 1);
        assert_eq!(stmts.len(), 1);
        assert_eq!(stmts[0].module, "..pkg.models");
        assert_eq!(stmts[0].symbols, vec!["User", "Group"]);
        assert_eq!(stmts[0].alternates, vec!["models"]);
    }

    #[test]
    fn test_from_line_is_not_parsed_as_plain_import() {
        let stmts = parse_line("from os import path", 1);
        assert_eq!(stmts.len(), 1, "from-import must short-circuit");
        assert_eq!(stmts[0].module, "os");
    }

    #[test]
    fn test_multiline_group_opening_line() {
        let stmts = parse_line("from pkg.util import (alpha,", 7);
        assert_eq!(stmts[0].symbols, vec!["alpha"]);
        let stmts = parse_line("from pkg.util import (", 7);
        assert_eq!(stmts.len(), 1, "the module is kept without names");
        assert_eq!(stmts[0].module, "pkg.util");
        assert!(stmts[0].symbols.is_empty());
    }

    #[test]
    fn test_parenthesized_group_across_lines() {
        let text = "import os\nfrom pkg.util import (\n    alpha,  # first\n    beta as b,\n)\nx = 1\n";
        let stmts = extract(text);
        assert_eq!(stmts.len(), 2);
        assert_eq!(stmts[1].module, "pkg.util");
        assert_eq!(stmts[1].symbols, vec!["alpha", "beta"]);
        assert_eq!(stmts[1].line, 2);
        assert_eq!(stmts[1].raw, "from pkg.util import (");
    }

    #[test]
    fn test_backslash_group_across_lines() {
        let text = "from . import views, \\\n    forms, \\\n    admin\nimport sys\n";
        let stmts = extract(text);
        let modules: Vec<_> = stmts.iter().map(|s| (s.module.as_str(), s.line)).collect();
        assert_eq!(
            modules,
            vec![(".views", 1), (".forms", 1), (".admin", 1), ("sys", 4)]
        );
    }

    #[test]
    fn test_unclosed_group_at_end_of_file() {
        let stmts = extract("from pkg import (\n    a,\n");
        assert_eq!(stmts.len(), 1);
        assert_eq!(stmts[0].symbols, vec!["a"]);
    }

    #[test]
    fn test_from_import_names_become_submodules() {
        let stmts = parse_line("from app import service, models as m", 1);
        assert_eq!(stmts[0].module, "app");
        assert_eq!(stmts[0].submodules, vec!["app.service", "app.models"]);
        assert!(stmts[0].alternates.is_empty());

        let stmts = parse_line("from helpers import *", 1);
        assert!(stmts[0].submodules.is_empty());
    }

    #[test]
    fn test_dots_only_from_import_splits_per_symbol() {
        let stmts = parse_line("from . import views, forms", 2);
        assert_eq!(stmts.len(), 2);
        assert_eq!(stmts[0].module, ".views");
        assert_eq!(stmts[0].alternates, vec!["."]);
        assert_eq!(stmts[1].module, ".forms");
    }

    #[test]
    fn test_plain_import_dotted_and_aliased() {
        let stmts = parse_line("import pkg.sub.mod, numpy as np", 1);
        assert_eq!(stmts.len(), 2);
        assert_eq!(stmts[0].module, "pkg.sub.mod");
        assert_eq!(stmts[0].symbols, vec!["mod"]);
        assert_eq!(stmts[0].alternates, vec!["mod"]);
        assert_eq!(stmts[1].module, "numpy");
        assert_eq!(stmts[1].symbols, vec!["np"]);
    }

    #[test]
    fn test_wildcard_and_comment_lines() {
        let stmts = parse_line("from helpers import *", 1);
        assert_eq!(stmts[0].symbols, vec!["*"]);
        assert!(parse_line("# import os", 1).is_empty());
        assert!(parse_line("importlib.reload(x)", 1).is_empty());
    }
}
