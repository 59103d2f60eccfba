use std::path::Path;

use serde::{Deserialize, Serialize};

/// A language family handled by dep-graph.
///
/// TypeScript and JavaScript share one family: they import each other freely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LanguageKind {
    Python,
    JavaScript,
    Java,
    CSharp,
    Go,
}

/// Extensions tried, in order, when a JS/TS specifier omits one.
pub const JS_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "mjs", "cjs", "mts", "cts"];

impl LanguageKind {
    /// All supported families, in a stable order.
    pub const ALL: [LanguageKind; 5] = [
        LanguageKind::Python,
        LanguageKind::JavaScript,
        LanguageKind::Java,
        LanguageKind::CSharp,
        LanguageKind::Go,
    ];

    /// Map a file extension (without the dot, case-insensitive) to its family.
    pub fn from_extension(ext: &str) -> Option<LanguageKind> {
        let ext = ext.to_ascii_lowercase();
        LanguageKind::ALL
            .into_iter()
            .find(|lk| lk.matches_extension(&ext))
    }

    /// Detect the family of a path from its extension.
    pub fn from_path(path: &Path) -> Option<LanguageKind> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(LanguageKind::from_extension)
    }

    /// Returns true if this language kind matches a given (lowercase) file extension.
    ///
    /// This is the foreign-extension guard used by every resolution step: a Python
    /// import can never resolve to a `.ts` file and vice versa.
    pub fn matches_extension(&self, ext: &str) -> bool {
        match self {
            LanguageKind::Python => matches!(ext, "py" | "pyi"),
            LanguageKind::JavaScript => JS_EXTENSIONS.contains(&ext),
            LanguageKind::Java => ext == "java",
            LanguageKind::CSharp => ext == "cs",
            LanguageKind::Go => ext == "go",
        }
    }

    /// File stems that act as the entry point of a package directory.
    pub fn package_entry_stems(&self) -> &'static [&'static str] {
        match self {
            LanguageKind::Python => &["__init__"],
            LanguageKind::JavaScript => &["index"],
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_matches_extension() {
        assert!(LanguageKind::Python.matches_extension("py"));
        assert!(LanguageKind::Python.matches_extension("pyi"));
        assert!(!LanguageKind::Python.matches_extension("ts"));

        assert!(LanguageKind::JavaScript.matches_extension("ts"));
        assert!(LanguageKind::JavaScript.matches_extension("tsx"));
        assert!(LanguageKind::JavaScript.matches_extension("mjs"));
        assert!(!LanguageKind::JavaScript.matches_extension("py"));

        assert!(LanguageKind::Java.matches_extension("java"));
        assert!(LanguageKind::CSharp.matches_extension("cs"));
        assert!(LanguageKind::Go.matches_extension("go"));
        assert!(!LanguageKind::Go.matches_extension("rs"));
    }

    #[test]
    fn test_from_path() {
        assert_eq!(
            LanguageKind::from_path(&PathBuf::from("/p/app.TSX")),
            Some(LanguageKind::JavaScript)
        );
        assert_eq!(
            LanguageKind::from_path(&PathBuf::from("/p/models.py")),
            Some(LanguageKind::Python)
        );
        assert_eq!(
            LanguageKind::from_path(&PathBuf::from("/p/Program.cs")),
            Some(LanguageKind::CSharp)
        );
        assert_eq!(LanguageKind::from_path(&PathBuf::from("/p/README.md")), None);
        assert_eq!(LanguageKind::from_path(&PathBuf::from("/p/Makefile")), None);
    }
}
