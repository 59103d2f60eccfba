use std::io::IsTerminal;
use std::path::Path;

use dep_graph::{DependencyLink, DependencyReport};

use crate::cli::OutputFormat;

fn relative<'a>(path: &'a Path, root: &Path) -> std::borrow::Cow<'a, str> {
    path.strip_prefix(root).unwrap_or(path).to_string_lossy()
}

fn join<T: ToString>(items: impl IntoIterator<Item = T>) -> String {
    items
        .into_iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// One compact line: `import src/a.py -> src/b.py 0.70 [x,y] @3,9`.
///
/// Bidirectional links use `<->`.
pub fn compact_line(link: &DependencyLink, root: &Path) -> String {
    let arrow = if link.bidirectional { "<->" } else { "->" };
    let mut line = format!(
        "{} {} {} {} {:.2}",
        link.link_type,
        relative(&link.source, root),
        arrow,
        relative(&link.target, root),
        link.strength,
    );
    if !link.symbols.is_empty() {
        line.push_str(&format!(" [{}]", join(&link.symbols)));
    }
    if !link.lines.is_empty() {
        line.push_str(&format!(" @{}", join(&link.lines)));
    }
    line
}

/// Format and print links to stdout according to the selected output format.
pub fn format_links(links: &[&DependencyLink], format: &OutputFormat, root: &Path) -> anyhow::Result<()> {
    match format {
        OutputFormat::Compact => {
            for link in links {
                println!("{}", compact_line(link, root));
            }
            println!("{} links", links.len());
        }

        OutputFormat::Table => {
            let use_color = std::io::stdout().is_terminal();

            // Column widths: auto-sized to data.
            let src_w = links
                .iter()
                .map(|l| relative(&l.source, root).len())
                .max()
                .unwrap_or(6)
                .max(6);
            let dst_w = links
                .iter()
                .map(|l| relative(&l.target, root).len())
                .max()
                .unwrap_or(6)
                .max(6);

            let header = format!(
                "{:<8}  {:<src_w$}  {:<3}  {:<dst_w$}  {:>8}  {}",
                "TYPE", "SOURCE", "", "TARGET", "STRENGTH", "SYMBOLS",
            );
            if use_color {
                println!("\x1b[1m{header}\x1b[0m");
            } else {
                println!("{header}");
            }

            for link in links {
                println!(
                    "{:<8}  {:<src_w$}  {:<3}  {:<dst_w$}  {:>8.2}  {}",
                    link.link_type.as_str(),
                    relative(&link.source, root),
                    if link.bidirectional { "<->" } else { "->" },
                    relative(&link.target, root),
                    link.strength,
                    join(&link.symbols),
                );
            }
            println!("{} links", links.len());
        }

        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(links)?);
        }
    }
    Ok(())
}

/// Print run statistics and link counts by type.
pub fn format_stats(report: &DependencyReport, json: bool) -> anyhow::Result<()> {
    let counts = report.counts_by_type();

    if json {
        let by_type: serde_json::Map<String, serde_json::Value> = counts
            .iter()
            .map(|(t, n)| (t.as_str().to_owned(), serde_json::Value::from(*n)))
            .collect();
        let value = serde_json::json!({
            "stats": report.stats,
            "links_by_type": by_type,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let s = &report.stats;
    println!(
        "files {} loaded {} cached {} failed {}",
        s.files_requested, s.files_loaded, s.files_cached, s.files_failed
    );
    println!(
        "imports {} resolved {} unresolved {}",
        s.imports_seen, s.imports_resolved, s.imports_unresolved
    );
    println!("calls {} resolved {}", s.calls_seen, s.calls_resolved);
    println!("bases resolved {}", s.bases_resolved);
    println!(
        "links {} {}",
        s.links,
        counts
            .iter()
            .map(|(t, n)| format!("{t} {n}"))
            .collect::<Vec<_>>()
            .join(" ")
    );
    println!("cycles {} bidirectional {}", s.cycles, s.bidirectional_merged);

    if s.files_failed > 0 {
        eprintln!("  {} files could not be read", s.files_failed);
    }
    Ok(())
}
