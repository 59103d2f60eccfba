use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::progress::{Phase, ProgressFn};

/// Path → file text. Entries already present are never re-read.
pub type ContentCache = HashMap<PathBuf, String>;

/// Outcome counters for one loading pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadStats {
    /// Files newly read from disk.
    pub loaded: usize,
    /// Files served from the primed cache.
    pub cached: usize,
    /// Files that could not be read.
    pub failed: usize,
}

/// Read every file of `files` not yet in `cache`, `batch_size` files at a time.
///
/// Each batch is read in parallel. A file that cannot be read is logged and
/// left out of the cache; the remaining files still load. Invalid UTF-8 is
/// replaced rather than rejected. `progress` is called after every batch.
pub fn load_contents(
    files: &[PathBuf],
    cache: &mut ContentCache,
    batch_size: usize,
    progress: Option<&ProgressFn<'_>>,
) -> LoadStats {
    let mut stats = LoadStats::default();
    let total = files.len();
    let batch_size = batch_size.max(1);

    for (batch_no, batch) in files.chunks(batch_size).enumerate() {
        let pending: Vec<&PathBuf> = batch.iter().filter(|p| !cache.contains_key(*p)).collect();
        stats.cached += batch.len() - pending.len();

        let results: Vec<(&PathBuf, std::io::Result<String>)> = pending
            .into_par_iter()
            .map(|path| (path, read_text(path)))
            .collect();

        for (path, result) in results {
            match result {
                Ok(text) => {
                    cache.insert(path.clone(), text);
                    stats.loaded += 1;
                }
                Err(err) => {
                    tracing::warn!(path = %path.display(), "failed to read file: {err}");
                    stats.failed += 1;
                }
            }
        }

        if let Some(report) = progress {
            let completed = (batch_no * batch_size + batch.len()).min(total);
            report(completed, total, Phase::Loading);
        }
    }

    stats
}

fn read_text(path: &Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
    })
}
