mod cli;
mod logging;
mod output;
mod walker;

use std::path::Path;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};
use dep_graph::{Analyzer, DepGraphConfig, DependencyReport, LinkType, Phase};
use walker::walk_project;

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            path,
            format,
            json,
            verbose,
        } => {
            logging::init_logging(verbose);
            let (root, report) = run(&path, verbose)?;
            let links: Vec<_> = report.links.iter().collect();
            output::format_links(&links, &format.or_json(json), &root)?;
        }

        Commands::Cycles {
            path,
            format,
            json,
            verbose,
        } => {
            logging::init_logging(verbose);
            let (root, report) = run(&path, verbose)?;
            let links: Vec<_> = report
                .links
                .iter()
                .filter(|l| l.link_type == LinkType::Circular)
                .collect();
            output::format_links(&links, &format.or_json(json), &root)?;
        }

        Commands::Stats {
            path,
            json,
            verbose,
        } => {
            logging::init_logging(verbose);
            let (_, report) = run(&path, verbose)?;
            output::format_stats(&report, json)?;
        }
    }

    Ok(())
}

/// Discover files under `path` and analyse them. Returns the canonical root
/// alongside the report.
fn run(path: &Path, verbose: bool) -> Result<(std::path::PathBuf, DependencyReport)> {
    let config = DepGraphConfig::load(path);
    let files = walk_project(path, &config)?;
    let root = path.canonicalize()?;
    tracing::info!(files = files.len(), root = %root.display(), "analysing");

    let progress = |done: usize, total: usize, phase: Phase| {
        eprintln!("  {phase}: {done}/{total}");
    };
    let mut analyzer = Analyzer::new(config);
    if verbose {
        analyzer = analyzer.with_progress(&progress);
    }
    Ok((root, analyzer.run(&files)))
}
