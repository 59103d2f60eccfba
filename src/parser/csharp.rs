use std::sync::OnceLock;

use regex::Regex;

use super::{ImportStatement, WILDCARD};

static ALIAS_RE: OnceLock<Regex> = OnceLock::new();
static STATIC_RE: OnceLock<Regex> = OnceLock::new();
static NAMESPACE_RE: OnceLock<Regex> = OnceLock::new();

fn alias_re() -> &'static Regex {
    ALIAS_RE.get_or_init(|| {
        Regex::new(r"^\s*(?:global\s+)?using\s+(\w+)\s*=\s*([A-Za-z_][\w.]*)\s*;")
            .expect("invalid c# alias using pattern")
    })
}

fn static_re() -> &'static Regex {
    STATIC_RE.get_or_init(|| {
        Regex::new(r"^\s*(?:global\s+)?using\s+static\s+([A-Za-z_][\w.]*)\s*;")
            .expect("invalid c# static using pattern")
    })
}

fn namespace_re() -> &'static Regex {
    NAMESPACE_RE.get_or_init(|| {
        Regex::new(r"^\s*(?:global\s+)?using\s+([A-Za-z_][\w.]*)\s*;")
            .expect("invalid c# namespace using pattern")
    })
}

/// Extract C# `using` directives from a whole file.
pub fn extract(text: &str) -> Vec<ImportStatement> {
    text.lines()
        .enumerate()
        .filter_map(|(i, line)| parse_line(line, i + 1))
        .collect()
}

/// Classify one C# source line.
///
/// Priority: alias (`using A = NS.T;` → symbol `A`), static (`using static NS.T;`
/// → symbol `T`), namespace (`using NS;` → `*`). `using (var x = ..)` statements
/// never match because the directive forms require a bare name before `;`.
pub fn parse_line(line: &str, line_no: usize) -> Option<ImportStatement> {
    if let Some(c) = alias_re().captures(line) {
        return Some(ImportStatement::new(&c[2], line_no, line).with_symbols([&c[1]]));
    }

    if let Some(c) = static_re().captures(line) {
        let target = &c[1];
        let last = target.rsplit('.').next().unwrap_or(target);
        return Some(ImportStatement::new(target, line_no, line).with_symbols([last]));
    }

    if let Some(c) = namespace_re().captures(line) {
        return Some(ImportStatement::new(&c[1], line_no, line).with_symbols([WILDCARD]));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_using() {
        let s = parse_line("using Json = Newtonsoft.Json.JsonConvert;", 1).unwrap();
        assert_eq!(s.module, "Newtonsoft.Json.JsonConvert");
        assert_eq!(s.symbols, vec!["Json"]);
    }

    #[test]
    fn test_static_using() {
        let s = parse_line("using static Acme.Util.Guard;", 2).unwrap();
        assert_eq!(s.module, "Acme.Util.Guard");
        assert_eq!(s.symbols, vec!["Guard"]);
    }

    #[test]
    fn test_namespace_using() {
        let s = parse_line("global using Acme.Models;", 3).unwrap();
        assert_eq!(s.module, "Acme.Models");
        assert_eq!(s.symbols, vec!["*"]);
    }

    #[test]
    fn test_using_statement_is_ignored() {
        assert!(parse_line("using (var conn = Open()) {", 1).is_none());
        assert!(parse_line("using var scope = provider.CreateScope();", 1).is_none());
    }
}
