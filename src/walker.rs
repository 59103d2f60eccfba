use std::path::{Path, PathBuf};

use anyhow::Context;

use dep_graph::config::DepGraphConfig;
use dep_graph::language::LanguageKind;

/// Walk a project directory and collect analysable source files.
///
/// Respects `.gitignore` rules, always excludes `node_modules`, applies any
/// additional exclusions from `config.exclude`, and keeps only files of a
/// supported language family. Returned paths are absolute and sorted.
pub fn walk_project(root: &Path, config: &DepGraphConfig) -> anyhow::Result<Vec<PathBuf>> {
    let root = root
        .canonicalize()
        .with_context(|| format!("cannot access project root {}", root.display()))?;
    if !root.is_dir() {
        anyhow::bail!("project root {} is not a directory", root.display());
    }

    let walker = ignore::WalkBuilder::new(&root)
        .standard_filters(true)
        // Read .gitignore files even when the directory is not inside a git repository.
        .require_git(false)
        .build();

    let mut files = Vec::new();
    for result in walker {
        let entry = match result {
            Ok(e) => e,
            Err(err) => {
                tracing::warn!("{err}");
                continue;
            }
        };

        let path = entry.path();
        if entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false) {
            continue;
        }

        // Hard exclusion.
        if path_contains_node_modules(path) {
            continue;
        }

        if is_excluded_by_config(path, config) {
            continue;
        }

        if LanguageKind::from_path(path).is_none() {
            continue;
        }

        tracing::debug!(path = %path.display(), "discovered");
        files.push(path.to_path_buf());
    }

    files.sort();
    files.dedup();
    Ok(files)
}

/// Returns true if any component of `path` is named `node_modules`.
fn path_contains_node_modules(path: &Path) -> bool {
    path.components().any(|c| {
        c.as_os_str()
            .to_str()
            .map(|s| s == "node_modules")
            .unwrap_or(false)
    })
}

/// Returns true if `path` or any of its components matches an exclusion pattern.
fn is_excluded_by_config(path: &Path, config: &DepGraphConfig) -> bool {
    let Some(patterns) = &config.exclude else {
        return false;
    };

    let path_str = path.to_string_lossy();
    patterns.iter().any(|pattern| {
        let Ok(matcher) = glob::Pattern::new(pattern) else {
            return false;
        };
        matcher.matches(&path_str)
            || path
                .components()
                .filter_map(|c| c.as_os_str().to_str())
                .any(|s| matcher.matches(s))
    })
}
