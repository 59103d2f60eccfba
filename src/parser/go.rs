use std::sync::OnceLock;

use regex::Regex;

use super::{ImportStatement, WILDCARD, is_c_comment};

static SINGLE_RE: OnceLock<Regex> = OnceLock::new();
static BLOCK_START_RE: OnceLock<Regex> = OnceLock::new();
static BLOCK_ENTRY_RE: OnceLock<Regex> = OnceLock::new();

/// `import [alias] "path"`
fn single_re() -> &'static Regex {
    SINGLE_RE.get_or_init(|| {
        Regex::new(r#"^\s*import\s+([\w.]+\s+)?"([^"]+)""#).expect("invalid go import pattern")
    })
}

/// `import (` optionally followed by a first entry on the same line.
fn block_start_re() -> &'static Regex {
    BLOCK_START_RE.get_or_init(|| {
        Regex::new(r"^\s*import\s*\((.*)$").expect("invalid go import block pattern")
    })
}

/// `[alias] "path"` inside an import block.
fn block_entry_re() -> &'static Regex {
    BLOCK_ENTRY_RE.get_or_init(|| {
        Regex::new(r#"^\s*([\w.]+\s+)?"([^"]+)""#).expect("invalid go import entry pattern")
    })
}

/// Extract Go imports from a whole file.
///
/// Unlike the other families Go needs one bit of state: whether the scan is
/// inside an `import ( ... )` block.
pub fn extract(text: &str) -> Vec<ImportStatement> {
    let mut out = Vec::new();
    let mut in_block = false;

    for (i, line) in text.lines().enumerate() {
        let line_no = i + 1;
        if is_c_comment(line) {
            continue;
        }

        if in_block {
            let body = match line.find(')') {
                Some(idx) => {
                    in_block = false;
                    &line[..idx]
                }
                None => line,
            };
            out.extend(entry(body, line_no, line));
            continue;
        }

        if let Some(c) = block_start_re().captures(line) {
            let rest = c.get(1).map(|m| m.as_str()).unwrap_or("");
            match rest.find(')') {
                // `import ("fmt")` on one line.
                Some(idx) => out.extend(entry(&rest[..idx], line_no, line)),
                None => {
                    in_block = true;
                    out.extend(entry(rest, line_no, line));
                }
            }
            continue;
        }

        if let Some(c) = single_re().captures(line) {
            out.push(statement(c.get(1).map(|m| m.as_str().trim()), &c[2], line_no, line));
        }
    }

    out
}

fn entry(body: &str, line_no: usize, raw: &str) -> Option<ImportStatement> {
    let c = block_entry_re().captures(body)?;
    Some(statement(c.get(1).map(|m| m.as_str().trim()), &c[2], line_no, raw))
}

fn statement(alias: Option<&str>, path: &str, line_no: usize, raw: &str) -> ImportStatement {
    let stmt = ImportStatement::new(path, line_no, raw);
    match alias {
        Some(".") => stmt.with_symbols([WILDCARD]),
        // Blank import: no bindings, but the package is still a dependency.
        Some("_") => stmt,
        Some(alias) => stmt.with_symbols([alias]),
        None => {
            let last = path.rsplit('/').next().unwrap_or(path);
            stmt.with_symbols([last])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_imports() {
        let stmts = extract("package main\n\nimport \"fmt\"\nimport str \"strings\"\n");
        assert_eq!(stmts.len(), 2);
        assert_eq!(stmts[0].module, "fmt");
        assert_eq!(stmts[0].symbols, vec!["fmt"]);
        assert_eq!(stmts[0].line, 3);
        assert_eq!(stmts[1].module, "strings");
        assert_eq!(stmts[1].symbols, vec!["str"]);
    }

    #[test]
    fn test_import_block_with_aliases() {
        let src = "import (\n\t\"os\"\n\t. \"example.com/app/dsl\"\n\t_ \"example.com/app/driver\"\n\tcfg \"example.com/app/config\"\n)\nfunc main() {}\n";
        let stmts = extract(src);
        assert_eq!(stmts.len(), 4);
        assert_eq!(stmts[0].module, "os");
        assert_eq!(stmts[1].symbols, vec!["*"]);
        assert_eq!(stmts[2].module, "example.com/app/driver");
        assert!(stmts[2].symbols.is_empty(), "blank import carries no symbols");
        assert_eq!(stmts[3].symbols, vec!["cfg"]);
        assert_eq!(stmts[3].line, 5);
    }

    #[test]
    fn test_blank_single_import() {
        let stmts = extract("import _ \"example.com/app/pkg\"\n");
        assert_eq!(stmts.len(), 1);
        assert!(stmts[0].symbols.is_empty());
        assert_eq!(stmts[0].module, "example.com/app/pkg");
    }

    #[test]
    fn test_block_closes_and_one_line_block() {
        let stmts = extract("import (\"fmt\")\nvar x = \"not/an/import\"\n");
        assert_eq!(stmts.len(), 1);
        assert_eq!(stmts[0].module, "fmt");
    }
}
