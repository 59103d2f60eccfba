use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// The kind of directed dependency between two files.
///
/// Declaration order is the output tie-break order for links sharing a
/// source and target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    /// Source imports from target.
    Import,
    /// Source re-exports from target.
    Export,
    /// Source calls a function defined in target.
    Call,
    /// A type in source extends or implements a type in target.
    Inherit,
    /// The edge lies on at least one detected cycle.
    Circular,
}

impl LinkType {
    pub const ALL: [LinkType; 5] = [
        LinkType::Import,
        LinkType::Export,
        LinkType::Call,
        LinkType::Inherit,
        LinkType::Circular,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LinkType::Import => "import",
            LinkType::Export => "export",
            LinkType::Call => "call",
            LinkType::Inherit => "inherit",
            LinkType::Circular => "circular",
        }
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One directed, typed dependency between two files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyLink {
    pub source: PathBuf,
    pub target: PathBuf,
    #[serde(rename = "type")]
    pub link_type: LinkType,
    /// Heuristic weight in `0.0..=1.0`.
    pub strength: f64,
    pub symbols: BTreeSet<String>,
    /// 1-based source lines the dependency was observed on.
    pub lines: BTreeSet<usize>,
    /// True when the opposite edge was folded into this one.
    pub bidirectional: bool,
}

impl DependencyLink {
    /// Union another observation's symbols and lines into this link.
    pub(crate) fn absorb(&mut self, symbols: &BTreeSet<String>, lines: &BTreeSet<usize>) {
        self.symbols.extend(symbols.iter().cloned());
        self.lines.extend(lines.iter().copied());
    }
}
