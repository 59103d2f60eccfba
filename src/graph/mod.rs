pub mod bidirectional;
pub mod circular;
pub mod edge;

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use crate::config::Tuning;
use crate::resolver::FileId;

pub use bidirectional::merge_bidirectional;
pub use circular::detect_cycles;
pub use edge::{DependencyLink, LinkType};

/// Identity of a link: at most one link exists per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct LinkKey {
    pub link_type: LinkType,
    pub source: FileId,
    pub target: FileId,
}

/// A single resolved dependency observed in a source file.
#[derive(Debug, Clone, PartialEq)]
pub enum Observation {
    /// An import (`LinkType::Import`) or re-export (`LinkType::Export`).
    Import {
        target: FileId,
        link_type: LinkType,
        symbols: Vec<String>,
        is_default: bool,
        line: usize,
    },
    Call {
        target: FileId,
        name: String,
        line: usize,
    },
    Inherit {
        target: FileId,
        name: String,
        line: usize,
    },
}

impl Observation {
    pub fn target(&self) -> FileId {
        match self {
            Observation::Import { target, .. }
            | Observation::Call { target, .. }
            | Observation::Inherit { target, .. } => *target,
        }
    }
}

/// The deduplicating link accumulator.
///
/// Links are keyed by (type, source, target). The first observation of a key
/// creates the link; later ones merge into it with strength only ever growing.
pub struct DependencyGraph {
    paths: Vec<PathBuf>,
    tuning: Tuning,
    pub(crate) links: BTreeMap<LinkKey, DependencyLink>,
    /// Import/export links that have seen a default binding.
    defaults: BTreeSet<LinkKey>,
}

impl DependencyGraph {
    /// Create an empty graph over `paths`; `FileId`s index into this list.
    pub fn new(paths: Vec<PathBuf>, tuning: Tuning) -> Self {
        Self {
            paths,
            tuning,
            links: BTreeMap::new(),
            defaults: BTreeSet::new(),
        }
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn file_count(&self) -> usize {
        self.paths.len()
    }

    pub fn path(&self, id: FileId) -> &PathBuf {
        &self.paths[id]
    }

    /// Number of links currently held.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Fold one observation from `source` into the graph.
    ///
    /// Observations targeting their own source are dropped.
    pub fn record(&mut self, source: FileId, observation: Observation) {
        let target = observation.target();
        if source == target {
            return;
        }

        match observation {
            Observation::Import {
                link_type,
                symbols,
                is_default,
                line,
                ..
            } => {
                let key = LinkKey {
                    link_type,
                    source,
                    target,
                };
                if is_default {
                    self.defaults.insert(key);
                }
                let has_default = self.defaults.contains(&key);
                let tuning = self.tuning.clone();
                let link = self.entry(key, 0.0);
                link.symbols.extend(symbols);
                link.lines.insert(line);
                let estimate = tuning.import_strength(link.symbols.len(), has_default);
                link.strength = link.strength.max(estimate);
            }
            Observation::Call { name, line, .. } => {
                let key = LinkKey {
                    link_type: LinkType::Call,
                    source,
                    target,
                };
                let (base, step) = (self.tuning.call_base, self.tuning.call_step);
                let is_new = !self.links.contains_key(&key);
                let link = self.entry(key, base);
                if !is_new {
                    link.strength = (link.strength + step).min(1.0);
                }
                link.symbols.insert(name);
                link.lines.insert(line);
            }
            Observation::Inherit { name, line, .. } => {
                let key = LinkKey {
                    link_type: LinkType::Inherit,
                    source,
                    target,
                };
                let base = self.tuning.inherit_base;
                let link = self.entry(key, base);
                link.strength = link.strength.max(base);
                link.symbols.insert(name);
                link.lines.insert(line);
            }
        }
    }

    fn entry(&mut self, key: LinkKey, strength: f64) -> &mut DependencyLink {
        let paths = &self.paths;
        self.links.entry(key).or_insert_with(|| DependencyLink {
            source: paths[key.source].clone(),
            target: paths[key.target].clone(),
            link_type: key.link_type,
            strength: strength.min(1.0),
            symbols: BTreeSet::new(),
            lines: BTreeSet::new(),
            bidirectional: false,
        })
    }

    /// Distinct directed (source, target) pairs over all link types.
    pub fn edge_pairs(&self) -> BTreeSet<(FileId, FileId)> {
        self.links.keys().map(|k| (k.source, k.target)).collect()
    }

    /// Retag every link from `source` to `target` as circular.
    ///
    /// Each retagged link gains the circular boost once; when the pair carries
    /// several link types they fold into the single circular link. Returns the
    /// number of links retagged.
    pub fn mark_circular(&mut self, source: FileId, target: FileId) -> usize {
        let boost = self.tuning.circular_boost;
        let circular_key = LinkKey {
            link_type: LinkType::Circular,
            source,
            target,
        };

        let mut retagged = 0;
        for link_type in LinkType::ALL {
            if link_type == LinkType::Circular {
                continue;
            }
            let key = LinkKey {
                link_type,
                source,
                target,
            };
            let Some(link) = self.links.remove(&key) else {
                continue;
            };
            self.defaults.remove(&key);
            retagged += 1;

            let boosted = (link.strength + boost).min(1.0);
            match self.links.get_mut(&circular_key) {
                Some(existing) => {
                    existing.strength = existing.strength.max(boosted);
                    existing.absorb(&link.symbols, &link.lines);
                }
                None => {
                    self.links.insert(
                        circular_key,
                        DependencyLink {
                            link_type: LinkType::Circular,
                            strength: boosted,
                            ..link
                        },
                    );
                }
            }
        }
        retagged
    }

    /// Consume the graph, returning links sorted by (source, target, type).
    pub fn into_links(self) -> Vec<DependencyLink> {
        let mut links: Vec<DependencyLink> = self.links.into_values().collect();
        links.sort_by(|a, b| {
            a.source
                .cmp(&b.source)
                .then_with(|| a.target.cmp(&b.target))
                .then_with(|| a.link_type.cmp(&b.link_type))
        });
        links
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn graph(n: usize) -> DependencyGraph {
        let paths = (0..n).map(|i| PathBuf::from(format!("/proj/f{i}.ts"))).collect();
        DependencyGraph::new(paths, Tuning::default())
    }

    pub(crate) fn import(target: FileId, symbols: &[&str], line: usize) -> Observation {
        Observation::Import {
            target,
            link_type: LinkType::Import,
            symbols: symbols.iter().map(|s| s.to_string()).collect(),
            is_default: false,
            line,
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_self_links_dropped() {
        let mut g = graph(1);
        g.record(0, import(0, &["x"], 1));
        assert!(g.is_empty());
    }

    #[test]
    fn test_repeated_import_merges() {
        let mut g = graph(2);
        g.record(0, import(1, &["a"], 1));
        g.record(0, import(1, &["b", "c"], 4));
        assert_eq!(g.len(), 1);

        let links = g.into_links();
        let link = &links[0];
        assert_eq!(link.symbols.len(), 3);
        assert_eq!(link.lines.iter().copied().collect::<Vec<_>>(), vec![1, 4]);
        assert!(approx(link.strength, 0.8), "strength was {}", link.strength);
    }

    #[test]
    fn test_default_bonus_sticks_across_merges() {
        let mut g = graph(2);
        g.record(
            0,
            Observation::Import {
                target: 1,
                link_type: LinkType::Import,
                symbols: vec!["App".into()],
                is_default: true,
                line: 1,
            },
        );
        g.record(0, import(1, &["a", "b"], 2));
        let links = g.into_links();
        assert!(approx(links[0].strength, 0.9), "strength was {}", links[0].strength);
    }

    #[test]
    fn test_call_repeats_add_and_cap() {
        let mut g = graph(2);
        for line in 1..=10 {
            g.record(
                0,
                Observation::Call {
                    target: 1,
                    name: "parse".into(),
                    line,
                },
            );
        }
        let links = g.into_links();
        assert_eq!(links.len(), 1);
        assert!(approx(links[0].strength, 1.0));
        assert_eq!(links[0].symbols.len(), 1);
        assert_eq!(links[0].lines.len(), 10);
    }

    #[test]
    fn test_types_kept_apart_and_sorted() {
        let mut g = graph(3);
        g.record(
            0,
            Observation::Inherit {
                target: 1,
                name: "Base".into(),
                line: 3,
            },
        );
        g.record(0, import(1, &["Base"], 1));
        g.record(0, import(2, &["x"], 2));
        let links = g.into_links();
        let kinds: Vec<_> = links.iter().map(|l| (l.target.clone(), l.link_type)).collect();
        assert_eq!(
            kinds,
            vec![
                (PathBuf::from("/proj/f1.ts"), LinkType::Import),
                (PathBuf::from("/proj/f1.ts"), LinkType::Inherit),
                (PathBuf::from("/proj/f2.ts"), LinkType::Import),
            ]
        );
        assert!(approx(links[1].strength, 0.8));
    }

    #[test]
    fn test_mark_circular_folds_types() {
        let mut g = graph(2);
        g.record(0, import(1, &["a"], 1));
        g.record(
            0,
            Observation::Call {
                target: 1,
                name: "run".into(),
                line: 5,
            },
        );
        assert_eq!(g.mark_circular(0, 1), 2);
        assert_eq!(g.mark_circular(0, 1), 0, "boost applies once");

        let links = g.into_links();
        assert_eq!(links.len(), 1);
        let link = &links[0];
        assert_eq!(link.link_type, LinkType::Circular);
        assert!(approx(link.strength, 1.0), "0.7 + 0.3");
        assert!(link.symbols.contains("a") && link.symbols.contains("run"));
        assert_eq!(link.lines.len(), 2);
    }
}
