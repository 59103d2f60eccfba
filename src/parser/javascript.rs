use std::sync::OnceLock;

use regex::Regex;

use super::{ImportKind, ImportStatement, WILDCARD, is_c_comment, split_named};

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------
//
// Each rule is anchored at the start of the line and captures the module
// specifier in its last group. Rules are evaluated in declaration order and the
// first static rule that matches wins; CommonJS and dynamic imports are only
// scanned for when no static rule matched.

const SPECIFIER: &str = r#"\s*['"]([^'"]+)['"]"#;

struct Patterns {
    side_effect: Regex,
    reexport_named: Regex,
    reexport_all: Regex,
    combined_named: Regex,
    combined_namespace: Regex,
    namespace: Regex,
    named: Regex,
    default: Regex,
    require_destructured: Regex,
    require_binding: Regex,
    require_bare: Regex,
    dynamic: Regex,
    /// A binding list whose closing brace is on a later line.
    open_brace: Regex,
}

static PATTERNS: OnceLock<Patterns> = OnceLock::new();

fn compile(pattern: &str) -> Regex {
    Regex::new(&pattern.replace("{SPECIFIER}", SPECIFIER)).expect("invalid javascript import pattern")
}

fn patterns() -> &'static Patterns {
    PATTERNS.get_or_init(|| Patterns {
        side_effect: compile(r"^\s*import{SPECIFIER}"),
        reexport_named: compile(r"^\s*export\s+(?:type\s+)?\{([^}]*)\}\s*from{SPECIFIER}"),
        reexport_all: compile(r"^\s*export\s+\*\s*(?:as\s+([\w$]+)\s+)?from{SPECIFIER}"),
        combined_named: compile(r"^\s*import\s+(?:type\s+)?([\w$]+)\s*,\s*\{([^}]*)\}\s*from{SPECIFIER}"),
        combined_namespace: compile(
            r"^\s*import\s+(?:type\s+)?([\w$]+)\s*,\s*\*\s*as\s+([\w$]+)\s+from{SPECIFIER}",
        ),
        namespace: compile(r"^\s*import\s+(?:type\s+)?\*\s*as\s+([\w$]+)\s+from{SPECIFIER}"),
        named: compile(r"^\s*import\s+(?:type\s+)?\{([^}]*)\}\s*from{SPECIFIER}"),
        default: compile(r"^\s*import\s+(?:type\s+)?([\w$]+)\s+from{SPECIFIER}"),
        require_destructured: compile(
            r"(?:const|let|var)\s+\{([^}]*)\}\s*=\s*require\s*\({SPECIFIER}\s*\)",
        ),
        require_binding: compile(r"(?:const|let|var)\s+([\w$]+)\s*=\s*require\s*\({SPECIFIER}\s*\)"),
        require_bare: compile(r"\brequire\s*\({SPECIFIER}\s*\)"),
        dynamic: compile(r"\bimport\s*\({SPECIFIER}\s*\)"),
        open_brace: compile(
            r"^\s*(?:(?:import|export)\s+(?:type\s+)?(?:[\w$]+\s*,\s*)?|(?:const|let|var)\s+)\{[^}]*$",
        ),
    })
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Extract JavaScript / TypeScript imports from a whole file.
///
/// A binding list split over several lines (`import {` .. `} from './x'`) is
/// joined up to the line holding its closing brace and reported on the line
/// that opens it. A list that never closes is read line by line.
pub fn extract(text: &str) -> Vec<ImportStatement> {
    let lines: Vec<&str> = text.lines().collect();
    let mut out = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        if !is_c_comment(line)
            && patterns().open_brace.is_match(line)
            && let Some(offset) = lines[i + 1..].iter().position(|l| l.contains('}'))
        {
            let end = i + 1 + offset;
            let joined = lines[i..=end]
                .iter()
                .map(|l| l.split("//").next().unwrap_or("").trim())
                .collect::<Vec<_>>()
                .join(" ");
            out.extend(parse_line(&joined, i + 1));
            i = end + 1;
            continue;
        }

        out.extend(parse_line(line, i + 1));
        i += 1;
    }

    out
}

/// Classify one JS/TS source line.
pub fn parse_line(line: &str, line_no: usize) -> Vec<ImportStatement> {
    if is_c_comment(line) {
        return Vec::new();
    }
    if let Some(stmt) = parse_static(line, line_no) {
        return vec![stmt];
    }
    parse_runtime(line, line_no)
}

/// ESM declarations: at most one per line.
fn parse_static(line: &str, line_no: usize) -> Option<ImportStatement> {
    let p = patterns();

    if let Some(c) = p.side_effect.captures(line) {
        return Some(ImportStatement::new(&c[1], line_no, line).with_symbols([WILDCARD]));
    }

    if let Some(c) = p.reexport_named.captures(line) {
        return Some(
            ImportStatement::new(&c[2], line_no, line)
                .with_symbols(split_named(&c[1]))
                .with_kind(ImportKind::ReExport),
        );
    }

    if let Some(c) = p.reexport_all.captures(line) {
        let symbol = c.get(1).map(|m| m.as_str()).unwrap_or(WILDCARD);
        return Some(
            ImportStatement::new(&c[2], line_no, line)
                .with_symbols([symbol])
                .with_kind(ImportKind::ReExport),
        );
    }

    if let Some(c) = p.combined_named.captures(line) {
        let mut symbols = vec![c[1].to_owned()];
        symbols.extend(split_named(&c[2]));
        return Some(
            ImportStatement::new(&c[3], line_no, line)
                .with_symbols(symbols)
                .default_import(),
        );
    }

    if let Some(c) = p.combined_namespace.captures(line) {
        return Some(
            ImportStatement::new(&c[3], line_no, line)
                .with_symbols([&c[1], &c[2]])
                .default_import(),
        );
    }

    if let Some(c) = p.namespace.captures(line) {
        return Some(ImportStatement::new(&c[2], line_no, line).with_symbols([&c[1]]));
    }

    if let Some(c) = p.named.captures(line) {
        return Some(ImportStatement::new(&c[2], line_no, line).with_symbols(split_named(&c[1])));
    }

    if let Some(c) = p.default.captures(line) {
        return Some(
            ImportStatement::new(&c[2], line_no, line)
                .with_symbols([&c[1]])
                .default_import(),
        );
    }

    None
}

/// `require(...)` and `import(...)` expressions: any number per line.
fn parse_runtime(line: &str, line_no: usize) -> Vec<ImportStatement> {
    let p = patterns();
    let mut out = Vec::new();
    let mut claimed: Vec<String> = Vec::new();

    for c in p.require_destructured.captures_iter(line) {
        claimed.push(c[2].to_owned());
        out.push(
            ImportStatement::new(&c[2], line_no, line)
                .with_symbols(split_named(&c[1]))
                .with_kind(ImportKind::CommonJs),
        );
    }

    for c in p.require_binding.captures_iter(line) {
        claimed.push(c[2].to_owned());
        out.push(
            ImportStatement::new(&c[2], line_no, line)
                .with_symbols([&c[1]])
                .with_kind(ImportKind::CommonJs)
                .default_import(),
        );
    }

    for c in p.require_bare.captures_iter(line) {
        if claimed.iter().any(|m| m == &c[1]) {
            continue;
        }
        out.push(
            ImportStatement::new(&c[1], line_no, line)
                .with_symbols([WILDCARD])
                .with_kind(ImportKind::CommonJs),
        );
    }

    for c in p.dynamic.captures_iter(line) {
        out.push(
            ImportStatement::new(&c[1], line_no, line)
                .with_symbols([WILDCARD])
                .with_kind(ImportKind::Dynamic),
        );
    }

    out
}
