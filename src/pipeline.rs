use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;

use crate::config::DepGraphConfig;
use crate::graph::{
    DependencyGraph, DependencyLink, LinkType, Observation, detect_cycles, merge_bidirectional,
};
use crate::language::LanguageKind;
use crate::loader::{ContentCache, load_contents};
use crate::parser::{ImportKind, WILDCARD, calls::receiver_and_name, parse_source};
use crate::progress::{Phase, ProgressFn};
use crate::resolver::{CallResolver, FileId, FileIndex, ModuleResolver};

/// Counters collected over one analysis run.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisStats {
    pub files_requested: usize,
    pub files_loaded: usize,
    pub files_cached: usize,
    pub files_failed: usize,
    pub imports_seen: usize,
    pub imports_resolved: usize,
    pub imports_unresolved: usize,
    /// Qualified (external) call sites considered for resolution.
    pub calls_seen: usize,
    pub calls_resolved: usize,
    pub bases_resolved: usize,
    pub cycles: usize,
    pub bidirectional_merged: usize,
    pub links: usize,
}

/// Result of an analysis run.
#[derive(Debug, Clone, Serialize)]
pub struct DependencyReport {
    /// Sorted by (source, target, type).
    pub links: Vec<DependencyLink>,
    pub stats: AnalysisStats,
}

impl DependencyReport {
    /// Link counts keyed by type, including zero counts.
    pub fn counts_by_type(&self) -> Vec<(LinkType, usize)> {
        LinkType::ALL
            .iter()
            .map(|&t| (t, self.links.iter().filter(|l| l.link_type == t).count()))
            .collect()
    }
}

/// Runs the full dependency analysis over a list of files.
///
/// ```no_run
/// # use std::path::PathBuf;
/// use dep_graph::{Analyzer, DepGraphConfig};
///
/// let files = vec![PathBuf::from("/repo/app.py"), PathBuf::from("/repo/util.py")];
/// let report = Analyzer::new(DepGraphConfig::default()).run(&files);
/// println!("{} links", report.links.len());
/// ```
pub struct Analyzer<'a> {
    config: DepGraphConfig,
    cache: ContentCache,
    progress: Option<&'a ProgressFn<'a>>,
}

impl<'a> Analyzer<'a> {
    pub fn new(config: DepGraphConfig) -> Self {
        Self {
            config,
            cache: ContentCache::new(),
            progress: None,
        }
    }

    /// Prime the content cache; paths it holds are not read from disk.
    pub fn with_cache(mut self, cache: ContentCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_progress(mut self, progress: &'a ProgressFn<'a>) -> Self {
        self.progress = Some(progress);
        self
    }

    fn report(&self, completed: usize, total: usize, phase: Phase) {
        if let Some(progress) = self.progress {
            progress(completed, total, phase);
        }
    }

    /// Analyse `files`. Duplicate paths are ignored after their first occurrence.
    ///
    /// Never fails: unreadable files and unresolvable references only shrink
    /// the output.
    pub fn run(mut self, files: &[PathBuf]) -> DependencyReport {
        let mut seen = HashSet::with_capacity(files.len());
        let paths: Vec<PathBuf> = files
            .iter()
            .filter(|p| seen.insert(p.as_path()))
            .cloned()
            .collect();
        let total = paths.len();
        let batch_size = self.config.batch_size.max(1);
        let mut stats = AnalysisStats {
            files_requested: total,
            ..Default::default()
        };

        // -----------------------------------------------------------------------
        // Phase 1: load contents.
        // -----------------------------------------------------------------------
        let started = Instant::now();
        self.report(0, total, Phase::Loading);
        let mut cache = std::mem::take(&mut self.cache);
        let load = load_contents(&paths, &mut cache, batch_size, self.progress);
        stats.files_loaded = load.loaded;
        stats.files_cached = load.cached;
        stats.files_failed = load.failed;
        tracing::debug!(
            loaded = load.loaded,
            cached = load.cached,
            failed = load.failed,
            elapsed = ?started.elapsed(),
            "contents loaded"
        );

        // -----------------------------------------------------------------------
        // Phase 2: index the snapshot.
        // -----------------------------------------------------------------------
        let started = Instant::now();
        self.report(0, total, Phase::Indexing);
        let index = FileIndex::build(&paths);
        self.report(total, total, Phase::Indexing);
        tracing::debug!(files = index.len(), elapsed = ?started.elapsed(), "index built");

        // -----------------------------------------------------------------------
        // Phase 3: extract and resolve, folding observations in input order.
        // -----------------------------------------------------------------------
        let started = Instant::now();
        self.report(0, total, Phase::Analyzing);
        let texts: Vec<Option<&str>> = paths
            .iter()
            .map(|p| cache.get(p).map(String::as_str))
            .collect();
        let modules = ModuleResolver::new(&index);
        let calls = CallResolver::new(&index, &texts);
        let mut graph = DependencyGraph::new(paths.clone(), self.config.tuning.clone());

        let ids: Vec<FileId> = (0..total).collect();
        for batch in ids.chunks(batch_size) {
            let analyses: Vec<FileAnalysis> = batch
                .par_iter()
                .map(|&id| match texts[id] {
                    Some(text) => analyze_file(id, text, &index, &modules, &calls),
                    None => FileAnalysis::default(),
                })
                .collect();

            for (&id, analysis) in batch.iter().zip(analyses) {
                stats.imports_seen += analysis.imports_seen;
                stats.imports_resolved += analysis.imports_resolved;
                stats.calls_seen += analysis.calls_seen;
                stats.calls_resolved += analysis.calls_resolved;
                stats.bases_resolved += analysis.bases_resolved;
                for observation in analysis.observations {
                    graph.record(id, observation);
                }
            }

            if let Some(&last) = batch.last() {
                self.report(last + 1, total, Phase::Analyzing);
            }
        }
        stats.imports_unresolved = stats.imports_seen - stats.imports_resolved;
        tracing::debug!(
            links = graph.len(),
            imports_resolved = stats.imports_resolved,
            imports_unresolved = stats.imports_unresolved,
            calls_resolved = stats.calls_resolved,
            elapsed = ?started.elapsed(),
            "graph assembled"
        );

        // -----------------------------------------------------------------------
        // Phase 4: cycles, then bidirectional folding.
        // -----------------------------------------------------------------------
        let started = Instant::now();
        self.report(0, 1, Phase::DetectingCycles);
        let cycles = detect_cycles(&mut graph);
        stats.cycles = cycles.len();
        stats.bidirectional_merged = merge_bidirectional(&mut graph);
        self.report(1, 1, Phase::DetectingCycles);
        tracing::debug!(
            cycles = stats.cycles,
            merged = stats.bidirectional_merged,
            elapsed = ?started.elapsed(),
            "cycles detected"
        );

        let links = graph.into_links();
        stats.links = links.len();
        DependencyReport { links, stats }
    }
}

/// Analyse `files` with `config` and no primed cache or progress reporting.
pub fn analyze(files: &[PathBuf], config: &DepGraphConfig) -> DependencyReport {
    Analyzer::new(config.clone()).run(files)
}

// ---------------------------------------------------------------------------
// Per-file analysis
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct FileAnalysis {
    observations: Vec<Observation>,
    imports_seen: usize,
    imports_resolved: usize,
    calls_seen: usize,
    calls_resolved: usize,
    bases_resolved: usize,
}

/// Extract and resolve everything file `id` depends on.
///
/// Pure over `text` and the read-only index, so files can be analysed in
/// parallel.
fn analyze_file(
    id: FileId,
    text: &str,
    index: &FileIndex,
    modules: &ModuleResolver<'_>,
    calls: &CallResolver<'_>,
) -> FileAnalysis {
    let mut out = FileAnalysis::default();
    let Some(language) = index.file(id).language else {
        return out;
    };
    let parsed = parse_source(language, text);

    // Names bound by resolved imports, for resolving base classes.
    let mut bound: HashMap<String, FileId> = HashMap::new();

    for stmt in &parsed.imports {
        out.imports_seen += 1;
        let Some(target) = modules.resolve(stmt, id) else {
            tracing::trace!(
                file = %index.path(id).display(),
                module = %stmt.module,
                line = stmt.line,
                "unresolved import"
            );
            continue;
        };
        out.imports_resolved += 1;

        for symbol in stmt.symbols.iter().filter(|s| s.as_str() != WILDCARD) {
            bound.entry(symbol.clone()).or_insert(target);
        }
        if let Some(last) = stmt.module.rsplit(['.', '/']).find(|s| !s.is_empty()) {
            bound.entry(last.to_owned()).or_insert(target);
        }

        let link_type = match stmt.kind {
            ImportKind::ReExport => LinkType::Export,
            _ => LinkType::Import,
        };
        out.observations.push(Observation::Import {
            target,
            link_type,
            symbols: stmt.symbols.clone(),
            is_default: stmt.is_default,
            line: stmt.line,
        });
    }

    for call in parsed.calls.iter().filter(|c| c.is_external) {
        out.calls_seen += 1;
        let Some(target) = calls.resolve(call, id) else {
            continue;
        };
        let Some((_, name)) = receiver_and_name(&call.callee) else {
            continue;
        };
        out.calls_resolved += 1;
        out.observations.push(Observation::Call {
            target,
            name: name.to_owned(),
            line: call.line,
        });
    }

    for base in &parsed.bases {
        let last = base.name.rsplit('.').next().unwrap_or(&base.name);
        let head = base.name.split('.').next().unwrap_or(&base.name);
        let target = bound
            .get(last)
            .or_else(|| bound.get(head))
            .copied()
            .or_else(|| same_namespace_type(language, modules, last, id));
        if let Some(target) = target {
            out.bases_resolved += 1;
            out.observations.push(Observation::Inherit {
                target,
                name: last.to_owned(),
                line: base.line,
            });
        }
    }

    out
}

/// Java and C# reference types of the same package/namespace without an
/// import, so an unbound base name falls back to a file-name lookup.
fn same_namespace_type(
    language: LanguageKind,
    modules: &ModuleResolver<'_>,
    name: &str,
    id: FileId,
) -> Option<FileId> {
    match language {
        LanguageKind::Java | LanguageKind::CSharp => modules.resolve_module(name, id),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn cache(files: &[(&str, &str)]) -> (Vec<PathBuf>, ContentCache) {
        let paths: Vec<PathBuf> = files.iter().map(|(p, _)| PathBuf::from(p)).collect();
        let cache = files
            .iter()
            .map(|(p, text)| (PathBuf::from(p), text.to_string()))
            .collect();
        (paths, cache)
    }

    fn run(files: &[(&str, &str)]) -> DependencyReport {
        let (paths, cache) = cache(files);
        Analyzer::new(DepGraphConfig::default())
            .with_cache(cache)
            .run(&paths)
    }

    #[test]
    fn test_python_import_and_call() {
        let report = run(&[
            ("/p/app.py", "import utils\n\nutils.parse(raw)\n"),
            ("/p/utils.py", "def parse(raw):\n    return raw\n"),
        ]);
        let kinds: Vec<_> = report.links.iter().map(|l| l.link_type).collect();
        assert_eq!(kinds, vec![LinkType::Import, LinkType::Call]);
        assert_eq!(report.stats.imports_resolved, 1);
        assert_eq!(report.stats.calls_resolved, 1);
        assert_eq!(report.stats.files_cached, 2);
        assert!(report.links[1].symbols.contains("parse"));
    }

    #[test]
    fn test_reexport_becomes_export_link() {
        let report = run(&[
            ("/p/index.ts", "export { Button } from './button';\n"),
            ("/p/button.ts", "export class Button {}\n"),
        ]);
        assert_eq!(report.links.len(), 1);
        assert_eq!(report.links[0].link_type, LinkType::Export);
    }

    #[test]
    fn test_inheritance_through_import() {
        let report = run(&[
            ("/p/models.py", "from .base import Model\n\nclass User(Model):\n    pass\n"),
            ("/p/base.py", "class Model:\n    pass\n"),
        ]);
        let inherit: Vec<_> = report
            .links
            .iter()
            .filter(|l| l.link_type == LinkType::Inherit)
            .collect();
        assert_eq!(inherit.len(), 1);
        assert_eq!(inherit[0].target, PathBuf::from("/p/base.py"));
        assert!((inherit[0].strength - 0.8).abs() < 1e-9);
        assert_eq!(inherit[0].lines.iter().copied().collect::<Vec<_>>(), vec![3]);
    }

    #[test]
    fn test_java_same_package_base() {
        let report = run(&[
            ("/p/com/acme/Invoice.java", "package com.acme;\n\npublic class Invoice extends Document {\n}\n"),
            ("/p/com/acme/Document.java", "package com.acme;\n\npublic abstract class Document {\n}\n"),
        ]);
        assert_eq!(report.links.len(), 1);
        assert_eq!(report.links[0].link_type, LinkType::Inherit);
    }

    #[test]
    fn test_unreadable_file_degrades() {
        let report = Analyzer::new(DepGraphConfig::default())
            .run(&[PathBuf::from("/definitely/not/here.py")]);
        assert!(report.links.is_empty());
        assert_eq!(report.stats.files_failed, 1);
    }

    #[test]
    fn test_duplicate_paths_ignored() {
        let (mut paths, cache) = cache(&[
            ("/p/a.go", "package a\n\nimport \"example.com/m/b\"\n"),
            ("/p/b/b.go", "package b\n"),
        ]);
        paths.push(paths[0].clone());
        let report = Analyzer::new(DepGraphConfig::default())
            .with_cache(cache)
            .run(&paths);
        assert_eq!(report.stats.files_requested, 2);
        assert_eq!(report.links.len(), 1);
    }

    #[test]
    fn test_progress_phases_in_order() {
        let (paths, cache) = cache(&[("/p/a.py", "import b\n"), ("/p/b.py", "")]);
        let seen = Mutex::new(Vec::new());
        let progress = |_: usize, _: usize, phase: Phase| {
            let mut seen = seen.lock().unwrap();
            if seen.last() != Some(&phase) {
                seen.push(phase);
            }
        };
        Analyzer::new(DepGraphConfig::default())
            .with_cache(cache)
            .with_progress(&progress)
            .run(&paths);
        assert_eq!(
            seen.into_inner().unwrap(),
            vec![
                Phase::Loading,
                Phase::Indexing,
                Phase::Analyzing,
                Phase::DetectingCycles
            ]
        );
    }
}
