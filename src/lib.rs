//! Static file-dependency graph builder.
//!
//! Given a list of source files in Python, JavaScript/TypeScript, Java, C# or
//! Go, [`Analyzer`] extracts imports, calls and base classes with line
//! patterns, resolves them to files of the same list, and returns typed,
//! weighted [`DependencyLink`]s with cycles retagged as circular and opposite
//! edges merged.

pub mod config;
pub mod graph;
pub mod language;
pub mod loader;
pub mod parser;
pub mod pipeline;
pub mod progress;
pub mod resolver;

pub use config::{DepGraphConfig, Tuning};
pub use graph::{DependencyLink, LinkType};
pub use loader::ContentCache;
pub use pipeline::{AnalysisStats, Analyzer, DependencyReport, analyze};
pub use progress::{Phase, ProgressFn};
