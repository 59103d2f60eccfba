use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// A static file-dependency graph builder for Python, JavaScript/TypeScript,
/// Java, C# and Go codebases.
///
/// dep-graph scans source files with lightweight line patterns, resolves
/// imports, calls and base classes to files, and reports typed, weighted
/// links with circular dependencies marked.
#[derive(Parser, Debug)]
#[command(
    name = "dep-graph",
    version,
    about,
    long_about = None,
    propagate_version = true,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for link listings.
#[derive(Clone, Debug, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Compact one-line-per-link format (default).
    #[default]
    Compact,
    /// Human-readable columnar table with optional ANSI color when stdout is a terminal.
    Table,
    /// Structured JSON suitable for programmatic consumption.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyse a project directory and print every dependency link.
    Analyze {
        /// Path to the project root to analyse.
        path: PathBuf,

        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Compact)]
        format: OutputFormat,

        /// Shorthand for `--format json`.
        #[arg(long)]
        json: bool,

        /// Report progress and engine events on stderr.
        #[arg(short, long)]
        verbose: bool,
    },

    /// Analyse a project directory and print only circular links.
    Cycles {
        /// Path to the project root to analyse.
        path: PathBuf,

        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Compact)]
        format: OutputFormat,

        /// Shorthand for `--format json`.
        #[arg(long)]
        json: bool,

        /// Report progress and engine events on stderr.
        #[arg(short, long)]
        verbose: bool,
    },

    /// Analyse a project directory and print run statistics and link counts.
    Stats {
        /// Path to the project root to analyse.
        path: PathBuf,

        /// Output statistics as JSON.
        #[arg(long)]
        json: bool,

        /// Report progress and engine events on stderr.
        #[arg(short, long)]
        verbose: bool,
    },
}

impl OutputFormat {
    /// Apply the `--json` shorthand.
    pub fn or_json(self, json: bool) -> Self {
        if json { OutputFormat::Json } else { self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_defaults() {
        let cli = Cli::try_parse_from(["dep-graph", "analyze", "."]).expect("parse");
        match cli.command {
            Commands::Analyze {
                path,
                format,
                json,
                verbose,
            } => {
                assert_eq!(path, PathBuf::from("."));
                assert_eq!(format, OutputFormat::Compact);
                assert!(!json && !verbose);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_json_shorthand_overrides_format() {
        let cli = Cli::try_parse_from(["dep-graph", "cycles", "src", "--format", "table", "--json"])
            .expect("parse");
        let Commands::Cycles { format, json, .. } = cli.command else {
            panic!("expected cycles");
        };
        assert_eq!(format.or_json(json), OutputFormat::Json);
    }

    #[test]
    fn test_unknown_format_rejected() {
        assert!(Cli::try_parse_from(["dep-graph", "analyze", ".", "--format", "xml"]).is_err());
    }
}
