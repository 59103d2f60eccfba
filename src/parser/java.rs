use std::sync::OnceLock;

use regex::Regex;

use super::{ImportStatement, WILDCARD};

static IMPORT_RE: OnceLock<Regex> = OnceLock::new();

/// `import [static] a.b.C[.*];`
fn import_re() -> &'static Regex {
    IMPORT_RE.get_or_init(|| {
        Regex::new(r"^\s*import\s+(static\s+)?([A-Za-z_][\w.]*?)(\.\*)?\s*;")
            .expect("invalid java import pattern")
    })
}

/// Extract Java imports from a whole file.
pub fn extract(text: &str) -> Vec<ImportStatement> {
    text.lines()
        .enumerate()
        .filter_map(|(i, line)| parse_line(line, i + 1))
        .collect()
}

/// Classify one Java source line.
///
/// Wildcard imports keep the `.*` suffix in `module` so the resolver can
/// recognise them; static member imports resolve against the declaring class.
pub fn parse_line(line: &str, line_no: usize) -> Option<ImportStatement> {
    let caps = import_re().captures(line)?;
    let is_static = caps.get(1).is_some();
    let path = &caps[2];

    if caps.get(3).is_some() {
        return Some(ImportStatement::new(format!("{path}.*"), line_no, line).with_symbols([WILDCARD]));
    }

    let (owner, last) = match path.rsplit_once('.') {
        Some((owner, last)) => (owner, last),
        None => ("", path),
    };

    if is_static && !owner.is_empty() {
        return Some(ImportStatement::new(owner, line_no, line).with_symbols([last]));
    }

    Some(ImportStatement::new(path, line_no, line).with_symbols([last]))
}
