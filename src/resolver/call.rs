use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use regex::Regex;

use super::index::{FileId, FileIndex};
use super::module::rank_candidates;
use crate::parser::CallSite;
use crate::parser::calls::receiver_and_name;

/// Declaration modifiers that may precede a definition in any supported family.
const MODIFIERS: &str = r"export|default|public|private|protected|internal|static|final|abstract|virtual|override|sealed|async|synchronized|extern|unsafe|partial|readonly|pub(?:\([^)]*\))?";

/// Resolves qualified calls (`receiver.name(`) to the file that defines `name`.
///
/// The receiver is treated as a file basename. Only candidate files of the
/// caller's language family are scanned, and only their loaded content; a file
/// that failed to load never matches.
pub struct CallResolver<'a> {
    index: &'a FileIndex,
    texts: &'a [Option<&'a str>],
    patterns: Mutex<HashMap<String, Option<Regex>>>,
}

impl<'a> CallResolver<'a> {
    /// `texts[id]` is the content of file `id`, if it was loaded.
    pub fn new(index: &'a FileIndex, texts: &'a [Option<&'a str>]) -> Self {
        Self {
            index,
            texts,
            patterns: Mutex::new(HashMap::new()),
        }
    }

    pub fn resolve(&self, call: &CallSite, caller: FileId) -> Option<FileId> {
        if !call.is_external {
            return None;
        }
        let (receiver, name) = receiver_and_name(&call.callee)?;
        let from = self.index.file(caller);
        let language = from.language?;

        let mut hits: Vec<FileId> = self
            .index
            .lookup_basename(receiver)
            .iter()
            .copied()
            .filter(|&id| id != caller && language.matches_extension(&self.index.file(id).ext))
            .collect();
        if hits.is_empty() {
            return None;
        }
        rank_candidates(self.index, &mut hits, from);

        let pattern = self.definition_pattern(name)?;
        hits.into_iter().find(|&id| {
            self.texts
                .get(id)
                .copied()
                .flatten()
                .is_some_and(|text| pattern.is_match(text))
        })
    }

    /// Compiled definition pattern for `name`, built once per name per run.
    fn definition_pattern(&self, name: &str) -> Option<Regex> {
        let mut patterns = self.patterns.lock().unwrap_or_else(PoisonError::into_inner);
        patterns
            .entry(name.to_owned())
            .or_insert_with(|| build_definition_pattern(name))
            .clone()
    }
}

fn build_definition_pattern(name: &str) -> Option<Regex> {
    let n = regex::escape(name);
    let end = r"(?:[^\w$]|$)";
    let source = format!(
        r"(?m)^\s*(?:(?:{MODIFIERS})\s+)*(?:def|class|function\*?|fn|func(?:\s*\([^)]*\))?)\s+{n}{end}|^\s*(?:export\s+)?(?:const|let|var)\s+{n}\s*=\s*(?:async\s+)?(?:function\b|\([^)]*\)\s*=>|[\w$]+\s*=>)|^\s*(?:(?:{MODIFIERS})\s+)+[\w<>\[\],.?]+\s+{n}\s*(?:<[^>]*>)?\s*\(|^\s*(?:async\s+)?{n}\s*\([^)]*\)\s*\{{"
    );
    match Regex::new(&source) {
        Ok(re) => Some(re),
        Err(err) => {
            tracing::debug!(name, %err, "skipping call name with unusable definition pattern");
            None
        }
    }
}
