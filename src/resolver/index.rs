use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::language::LanguageKind;

/// Dense identifier of a file: its position in the input list.
pub type FileId = usize;

/// Per-file facts precomputed once so resolution never re-derives them.
#[derive(Debug, Clone)]
pub struct IndexedFile {
    /// The path exactly as supplied by the caller.
    pub path: PathBuf,
    /// Lowercase, forward-slash, lexically normalized path.
    pub normalized: String,
    /// Normalized parent directory.
    pub dir: String,
    /// Lowercase file name without extension.
    pub stem: String,
    /// Lowercase extension without the dot.
    pub ext: String,
    pub language: Option<LanguageKind>,
}

/// Read-only lookup tables over one snapshot of the input file list.
///
/// Built in a single pass; never mutated afterwards. An index describes exactly
/// the file list it was built from: callers must build a fresh one per run,
/// since a stale index silently resolves to files that no longer exist.
#[derive(Debug, Default)]
pub struct FileIndex {
    files: Vec<IndexedFile>,
    /// Lowercase basename (no extension) → files with that basename.
    by_basename: HashMap<String, Vec<FileId>>,
    /// Normalized path → file.
    by_path: HashMap<String, FileId>,
    /// Slash-joined directory suffix + basename → files.
    by_package: HashMap<String, Vec<FileId>>,
}

impl FileIndex {
    /// Build the index for `paths`. File ids follow input order.
    pub fn build(paths: &[PathBuf]) -> Self {
        let mut index = FileIndex {
            files: Vec::with_capacity(paths.len()),
            by_basename: HashMap::with_capacity(paths.len()),
            by_path: HashMap::with_capacity(paths.len()),
            by_package: HashMap::new(),
        };

        for (id, path) in paths.iter().enumerate() {
            let file = describe(path);

            index.by_path.entry(file.normalized.clone()).or_insert(id);
            index
                .by_basename
                .entry(file.stem.clone())
                .or_default()
                .push(id);

            let dirs: Vec<&str> = file.dir.split('/').filter(|s| !s.is_empty()).collect();
            let registers_dir = file
                .language
                .map(|lk| lk == LanguageKind::Go || lk.package_entry_stems().contains(&file.stem.as_str()))
                .unwrap_or(false);

            // Every suffix boundary: "c/mod", "b/c/mod", "a/b/c/mod".
            for start in (0..dirs.len()).rev() {
                let suffix = dirs[start..].join("/");
                index
                    .by_package
                    .entry(format!("{suffix}/{}", file.stem))
                    .or_default()
                    .push(id);
                // Package directories resolve to their entry files: "b/c" → b/c/__init__.py.
                if registers_dir {
                    index.by_package.entry(suffix).or_default().push(id);
                }
            }

            index.files.push(file);
        }

        index
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn file(&self, id: FileId) -> &IndexedFile {
        &self.files[id]
    }

    pub fn path(&self, id: FileId) -> &Path {
        &self.files[id].path
    }

    /// Exact lookup of an already-normalized path.
    pub fn lookup_path(&self, normalized: &str) -> Option<FileId> {
        self.by_path.get(normalized).copied()
    }

    /// Files whose basename (lowercase, no extension) equals `basename`.
    pub fn lookup_basename(&self, basename: &str) -> &[FileId] {
        self.by_basename
            .get(&basename.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Files registered under a package-path key such as `"pkg/sub/mod"`.
    pub fn lookup_package(&self, key: &str) -> &[FileId] {
        self.by_package
            .get(&key.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of directory hops between two normalized directories.
    pub fn hops(a: &str, b: &str) -> usize {
        let a: Vec<&str> = a.split('/').filter(|s| !s.is_empty()).collect();
        let b: Vec<&str> = b.split('/').filter(|s| !s.is_empty()).collect();
        let common = a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count();
        (a.len() - common) + (b.len() - common)
    }
}

fn describe(path: &Path) -> IndexedFile {
    let normalized = normalize(&path.to_string_lossy());
    let (dir, file_name) = match normalized.rsplit_once('/') {
        Some((dir, name)) => (dir.to_owned(), name.to_owned()),
        None => (String::new(), normalized.clone()),
    };
    let (stem, ext) = match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem.to_owned(), ext.to_owned()),
        _ => (file_name.clone(), String::new()),
    };
    IndexedFile {
        path: path.to_path_buf(),
        language: LanguageKind::from_extension(&ext),
        normalized,
        dir,
        stem,
        ext,
    }
}

/// Normalize a path string for lookups: forward slashes, lowercase, `.` and
/// `..` segments collapsed lexically. Absolute paths keep their leading `/`.
pub fn normalize(raw: &str) -> String {
    let lowered = raw.replace('\\', "/").to_lowercase();
    let absolute = lowered.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for seg in lowered.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            s => parts.push(s),
        }
    }
    let joined = parts.join("/");
    if absolute { format!("/{joined}") } else { joined }
}
