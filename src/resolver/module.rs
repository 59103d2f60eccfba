use crate::language::{JS_EXTENSIONS, LanguageKind};
use crate::parser::ImportStatement;

use super::index::{FileId, FileIndex, IndexedFile, normalize};

/// A module reference broken into the pieces every resolution step needs.
struct ModuleQuery {
    /// Exact paths tried first (step 1), already normalized.
    candidates: Vec<String>,
    /// Qualified name segments, e.g. `["pkg", "sub", "mod"]`.
    segments: Vec<String>,
}

/// Resolves raw import strings to files of the current snapshot.
///
/// Resolution short-circuits on the first hit:
/// 1. exact candidate paths built from language conventions,
/// 2. the trailing segment in the basename map,
/// 3. progressively shorter package-path suffix keys.
///
/// Every step rejects files whose extension belongs to a different language
/// family than the importer's.
pub struct ModuleResolver<'a> {
    index: &'a FileIndex,
}

impl<'a> ModuleResolver<'a> {
    pub fn new(index: &'a FileIndex) -> Self {
        Self { index }
    }

    /// Resolve an import statement, trying its primary module then each
    /// alternate, then each submodule.
    ///
    /// A relative Python import names a location: the exact paths of every
    /// candidate are tried before any name-based lookup.
    pub fn resolve(&self, stmt: &ImportStatement, importer: FileId) -> Option<FileId> {
        let language = self.index.file(importer).language?;
        if language == LanguageKind::Python
            && stmt.module.starts_with('.')
            && let Some(id) = stmt.candidates().find_map(|module| {
                let query = self.query(module, importer)?;
                self.exact_candidate(language, &query)
            })
        {
            return Some(id);
        }

        stmt.candidates()
            .find_map(|module| self.resolve_module(module, importer))
            .or_else(|| {
                stmt.submodules
                    .iter()
                    .find_map(|module| self.resolve_qualified(module, importer))
            })
    }

    /// Resolve one raw module string from the perspective of `importer`.
    pub fn resolve_module(&self, module: &str, importer: FileId) -> Option<FileId> {
        let from = self.index.file(importer);
        let language = from.language?;
        let query = self.query(module, importer)?;

        // Step 1: exact candidate paths.
        if let Some(id) = self.exact_candidate(language, &query) {
            return Some(id);
        }

        let trailing = query.segments.last()?;

        // Step 2: basename map.
        let hits = self.filter(language, importer, self.index.lookup_basename(trailing));
        if let Some(id) = self.pick(hits, from, &query.segments) {
            return Some(id);
        }

        // Step 3: package-path suffixes, longest first.
        for start in 0..query.segments.len() {
            let key = query.segments[start..].join("/");
            let hits = self.filter(language, importer, self.index.lookup_package(&key));
            if let Some(id) = self.pick(hits, from, &[]) {
                return Some(id);
            }
        }

        None
    }

    /// Resolve `module` only where its full qualified path exists: a direct
    /// candidate path, or for non-relative modules the complete package-path key.
    fn resolve_qualified(&self, module: &str, importer: FileId) -> Option<FileId> {
        let from = self.index.file(importer);
        let language = from.language?;
        let query = self.query(module, importer)?;
        if let Some(id) = self.exact_candidate(language, &query) {
            return Some(id);
        }
        if module.starts_with('.') || query.segments.len() < 2 {
            return None;
        }

        let key = query.segments.join("/");
        let hits = self.filter(language, importer, self.index.lookup_package(&key));
        self.pick(hits, from, &query.segments)
    }

    fn query(&self, module: &str, importer: FileId) -> Option<ModuleQuery> {
        let from = self.index.file(importer);
        let module = module.trim();
        if module.is_empty() {
            return None;
        }
        build_query(from.language?, module, from)
    }

    fn exact_candidate(&self, language: LanguageKind, query: &ModuleQuery) -> Option<FileId> {
        query
            .candidates
            .iter()
            .filter_map(|candidate| self.index.lookup_path(candidate))
            .find(|&id| self.accepts(language, id))
    }

    fn accepts(&self, language: LanguageKind, id: FileId) -> bool {
        language.matches_extension(&self.index.file(id).ext)
    }

    /// Same-family candidates other than the importer itself.
    fn filter(&self, language: LanguageKind, importer: FileId, ids: &[FileId]) -> Vec<FileId> {
        ids.iter()
            .copied()
            .filter(|&id| id != importer && self.accepts(language, id))
            .collect()
    }

    /// Choose one candidate: a single hit wins outright; otherwise keep the
    /// files matching the longest qualified suffix of `segments`, then prefer
    /// same directory, same extension, fewest hops, and finally the smallest path.
    fn pick(&self, mut hits: Vec<FileId>, from: &IndexedFile, segments: &[String]) -> Option<FileId> {
        if hits.len() <= 1 {
            return hits.pop();
        }

        for len in (2..=segments.len()).rev() {
            let suffix = format!("/{}", segments[segments.len() - len..].join("/")).to_lowercase();
            let narrowed: Vec<FileId> = hits
                .iter()
                .copied()
                .filter(|&id| {
                    let f = self.index.file(id);
                    format!("{}/{}", f.dir, f.stem).ends_with(&suffix) || f.dir.ends_with(&suffix)
                })
                .collect();
            if !narrowed.is_empty() {
                hits = narrowed;
                break;
            }
        }

        rank_candidates(self.index, &mut hits, from);
        hits.first().copied()
    }
}

/// Order candidates by preference for an importer: same directory first,
/// then same extension, then fewest directory hops, then path.
pub(crate) fn rank_candidates(index: &FileIndex, hits: &mut [FileId], from: &IndexedFile) {
    hits.sort_by_cached_key(|&id| {
        let f = index.file(id);
        (
            f.dir != from.dir,
            f.ext != from.ext,
            FileIndex::hops(&f.dir, &from.dir),
            f.normalized.clone(),
        )
    });
}

// ---------------------------------------------------------------------------
// Per-language query construction
// ---------------------------------------------------------------------------

fn build_query(language: LanguageKind, module: &str, from: &IndexedFile) -> Option<ModuleQuery> {
    match language {
        LanguageKind::Python => Some(python_query(module, from)),
        LanguageKind::JavaScript => Some(javascript_query(module, from)),
        LanguageKind::Java => java_query(module, from),
        LanguageKind::CSharp => Some(dotted_query(module, from, &["cs"])),
        LanguageKind::Go => Some(go_query(module)),
    }
}

fn python_query(module: &str, from: &IndexedFile) -> ModuleQuery {
    let dots = module.len() - module.trim_start_matches('.').len();
    let rest = &module[dots..];
    let segments: Vec<String> = rest
        .split('.')
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect();

    // `.` is the importer's package, each further dot one level up.
    let base = if dots > 0 {
        let mut base = from.dir.clone();
        for _ in 1..dots {
            base = match base.rsplit_once('/') {
                Some((parent, _)) => parent.to_owned(),
                None => String::new(),
            };
        }
        base
    } else {
        from.dir.clone()
    };

    let mut candidates = Vec::new();
    if segments.is_empty() {
        candidates.push(normalize(&format!("{base}/__init__.py")));
    } else {
        let rel = segments.join("/");
        for suffix in [".py", ".pyi", "/__init__.py"] {
            candidates.push(normalize(&format!("{base}/{rel}{suffix}")));
        }
    }

    ModuleQuery {
        candidates,
        segments,
    }
}

fn javascript_query(module: &str, from: &IndexedFile) -> ModuleQuery {
    let is_relative = module.starts_with("./")
        || module.starts_with("../")
        || module == "."
        || module == "..";
    let is_absolute = module.starts_with('/');

    let mut candidates = Vec::new();
    if is_relative || is_absolute {
        let base = if is_absolute {
            normalize(module)
        } else {
            normalize(&format!("{}/{}", from.dir, module))
        };

        let (stem_base, explicit_ext) = match base.rsplit_once('.') {
            Some((stem, ext)) if JS_EXTENSIONS.contains(&ext) && !stem.ends_with('/') => {
                (stem.to_owned(), Some(ext.to_owned()))
            }
            _ => (base.clone(), None),
        };

        if explicit_ext.is_some() {
            candidates.push(base.clone());
        }
        // `./foo.js` written in TypeScript source refers to `./foo.ts`.
        for ext in JS_EXTENSIONS {
            candidates.push(format!("{stem_base}.{ext}"));
        }
        for ext in JS_EXTENSIONS {
            candidates.push(format!("{base}/index.{ext}"));
        }
    }

    // Scoped and aliased specifiers (`@scope/pkg/x`, `@/components/x`, `~/x`)
    // contribute only their path segments.
    let trimmed = module
        .trim_start_matches("@/")
        .trim_start_matches("~/")
        .trim_start_matches('@');
    let mut segments: Vec<String> = trimmed
        .split('/')
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .map(str::to_owned)
        .collect();
    if let Some(last) = segments.last_mut()
        && let Some((stem, ext)) = last.rsplit_once('.')
        && JS_EXTENSIONS.contains(&ext.to_lowercase().as_str())
    {
        *last = stem.to_owned();
    }

    ModuleQuery {
        candidates,
        segments,
    }
}

fn java_query(module: &str, from: &IndexedFile) -> Option<ModuleQuery> {
    // Package wildcards name a directory, not a file; class wildcards
    // (`import static a.b.Strings.*`) name the class itself.
    let module = match module.strip_suffix(".*") {
        Some(owner) => {
            let last = owner.rsplit('.').next().unwrap_or(owner);
            if !last.starts_with(|c: char| c.is_uppercase()) {
                return None;
            }
            owner
        }
        None => module,
    };
    Some(dotted_query(module, from, &["java"]))
}

fn dotted_query(module: &str, from: &IndexedFile, exts: &[&str]) -> ModuleQuery {
    let segments: Vec<String> = module
        .split('.')
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect();
    let rel = segments.join("/");
    let candidates = exts
        .iter()
        .map(|ext| normalize(&format!("{}/{rel}.{ext}", from.dir)))
        .collect();
    ModuleQuery {
        candidates,
        segments,
    }
}

fn go_query(module: &str) -> ModuleQuery {
    ModuleQuery {
        candidates: Vec::new(),
        segments: module
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn index(list: &[&str]) -> FileIndex {
        FileIndex::build(&list.iter().map(PathBuf::from).collect::<Vec<_>>())
    }

    fn resolve_stmt(index: &FileIndex, stmt: &ImportStatement, importer: FileId) -> Option<String> {
        ModuleResolver::new(index)
            .resolve(stmt, importer)
            .map(|id| index.path(id).to_string_lossy().into_owned())
    }

    fn resolve(index: &FileIndex, module: &str, importer: FileId) -> Option<String> {
        ModuleResolver::new(index)
            .resolve_module(module, importer)
            .map(|id| index.path(id).to_string_lossy().into_owned())
    }

    #[test]
    fn test_python_relative_import() {
        let idx = index(&["/p/pkg/a.py", "/p/pkg/b.py", "/p/other/b.py"]);
        assert_eq!(resolve(&idx, ".b", 0).as_deref(), Some("/p/pkg/b.py"));
    }

    #[test]
    fn test_python_parent_relative_import() {
        let idx = index(&["/p/pkg/sub/a.py", "/p/pkg/models.py", "/p/pkg/__init__.py"]);
        assert_eq!(resolve(&idx, "..models", 0).as_deref(), Some("/p/pkg/models.py"));
        assert_eq!(resolve(&idx, "..", 0).as_deref(), Some("/p/pkg/__init__.py"));
    }

    #[test]
    fn test_python_dotted_import_prefers_qualified_path() {
        let idx = index(&["/p/app/main.py", "/p/app/mod.py", "/p/lib/pkg/sub/mod.py"]);
        assert_eq!(
            resolve(&idx, "pkg.sub.mod", 0).as_deref(),
            Some("/p/lib/pkg/sub/mod.py"),
            "qualified suffix must win over the same-directory basename hit"
        );
    }

    #[test]
    fn test_python_dot_import_prefers_own_package_init() {
        let idx = index(&["/p/pkg/a.py", "/p/pkg/__init__.py", "/p/other/helper.py"]);
        let stmts = crate::parser::python::parse_line("from . import helper", 1);
        assert_eq!(
            resolve_stmt(&idx, &stmts[0], 0).as_deref(),
            Some("/p/pkg/__init__.py"),
            "a sibling package's helper.py must not win over the own package"
        );

        let idx = index(&["/p/pkg/a.py", "/p/pkg/__init__.py", "/p/pkg/helper.py"]);
        assert_eq!(resolve_stmt(&idx, &stmts[0], 0).as_deref(), Some("/p/pkg/helper.py"));
    }

    #[test]
    fn test_python_dot_import_falls_back_to_lookup() {
        let idx = index(&["/p/pkg/a.py", "/p/other/helper.py"]);
        let stmts = crate::parser::python::parse_line("from . import helper", 1);
        assert_eq!(resolve_stmt(&idx, &stmts[0], 0).as_deref(), Some("/p/other/helper.py"));
    }

    #[test]
    fn test_python_namespace_package_submodule() {
        let idx = index(&["/p/app/main.py", "/p/app/service.py", "/p/lib/path.py"]);
        let stmts = crate::parser::python::parse_line("from app import service", 1);
        assert_eq!(resolve_stmt(&idx, &stmts[0], 0).as_deref(), Some("/p/app/service.py"));

        let stmts = crate::parser::python::parse_line("from os import path", 1);
        assert_eq!(
            resolve_stmt(&idx, &stmts[0], 0),
            None,
            "a bare basename match is not a submodule"
        );
    }

    #[test]
    fn test_python_package_init() {
        let idx = index(&["/p/main.py", "/p/lib/pkg/sub/__init__.py"]);
        assert_eq!(
            resolve(&idx, "pkg.sub", 0).as_deref(),
            Some("/p/lib/pkg/sub/__init__.py")
        );
    }

    #[test]
    fn test_unresolved_external_module() {
        let idx = index(&["/p/main.py", "/p/util.py"]);
        assert_eq!(resolve(&idx, "numpy", 0), None);
    }

    #[test]
    fn test_javascript_relative_extension_probing() {
        let idx = index(&["/p/src/app.ts", "/p/src/x.js", "/p/src/y/index.ts"]);
        assert_eq!(resolve(&idx, "./x", 0).as_deref(), Some("/p/src/x.js"));
        assert_eq!(resolve(&idx, "./y", 0).as_deref(), Some("/p/src/y/index.ts"));
    }

    #[test]
    fn test_javascript_js_suffix_maps_to_ts_source() {
        let idx = index(&["/p/src/app.ts", "/p/src/util.ts"]);
        assert_eq!(resolve(&idx, "./util.js", 0).as_deref(), Some("/p/src/util.ts"));
    }

    #[test]
    fn test_javascript_scoped_alias() {
        let idx = index(&[
            "/p/apps/web/page.tsx",
            "/p/packages/ui/button.tsx",
            "/p/packages/forms/button.tsx",
        ]);
        assert_eq!(
            resolve(&idx, "@acme/ui/button", 0).as_deref(),
            Some("/p/packages/ui/button.tsx")
        );
    }

    #[test]
    fn test_foreign_extension_rejected() {
        let idx = index(&["/p/main.py", "/p/helpers.ts"]);
        assert_eq!(resolve(&idx, "helpers", 0), None);
    }

    #[test]
    fn test_basename_tie_breaks() {
        let idx = index(&[
            "/p/a/main.ts",
            "/p/b/c/util.ts",
            "/p/a/util.js",
            "/p/b/util.ts",
        ]);
        // Same directory beats same extension.
        assert_eq!(resolve(&idx, "util", 0).as_deref(), Some("/p/a/util.js"));

        let idx = index(&["/p/a/main.ts", "/p/b/c/util.ts", "/p/b/util.js", "/p/b/util.ts"]);
        // Same extension, then fewest hops.
        assert_eq!(resolve(&idx, "util", 0).as_deref(), Some("/p/b/util.ts"));
    }

    #[test]
    fn test_java_and_csharp() {
        let idx = index(&[
            "/p/src/com/acme/app/Main.java",
            "/p/src/com/acme/billing/Invoice.java",
            "/p/cs/Program.cs",
            "/p/cs/Models/Order.cs",
        ]);
        assert_eq!(
            resolve(&idx, "com.acme.billing.Invoice", 0).as_deref(),
            Some("/p/src/com/acme/billing/Invoice.java")
        );
        assert_eq!(resolve(&idx, "com.acme.billing.*", 0), None);
        assert_eq!(
            resolve(&idx, "Acme.Models.Order", 2).as_deref(),
            Some("/p/cs/Models/Order.cs")
        );
    }

    #[test]
    fn test_go_package_directory() {
        let idx = index(&[
            "/p/cmd/main.go",
            "/p/internal/store/db.go",
            "/p/internal/store/cache.go",
        ]);
        assert_eq!(
            resolve(&idx, "example.com/app/internal/store", 0).as_deref(),
            Some("/p/internal/store/cache.go")
        );
    }
}
