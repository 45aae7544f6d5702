//! Rendering of the sorted classification as CSV, a plain-text table, or JSON,
//! plus the optional statistics block.
//!
//! Rows are always sorted ascending by line content before rendering, so the
//! same classification renders to the same bytes every time.
use anyhow::{Result, anyhow};
use bstr::ByteSlice;
use colored::*;
use serde::Serialize;

use crate::engine::ClassificationMap;
use crate::membership::{Comparison, Membership};
use crate::stats::Stats;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Csv,
    Table,
    Json,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub format: OutputFormat,
    /// Section rows by membership instead of interleaving them.
    pub grouped: bool,
    /// Colorize table rows and headings.
    pub color: bool,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    results: &'a [Comparison],
    stats: &'a Stats,
}

/// Extract every classified line, sorted by byte order of its raw content.
/// Lines that are not valid UTF-8 are decoded lossily only here, after sorting.
pub fn sorted_results(map: &ClassificationMap) -> Vec<Comparison> {
    let mut rows: Vec<(&[u8], Membership)> = map
        .iter()
        .map(|(item, status)| (item.as_slice(), *status))
        .collect();
    rows.sort_unstable_by(|a, b| a.0.cmp(b.0));
    rows.into_iter()
        .map(|(item, status)| Comparison::new(item.to_str_lossy(), status))
        .collect()
}

pub fn render(results: &[Comparison], stats: &Stats, options: &RenderOptions) -> Result<String> {
    match options.format {
        OutputFormat::Json => render_json(results, stats),
        OutputFormat::Csv => render_csv(results, options.grouped),
        OutputFormat::Table => Ok(render_table(results, options.grouped, options.color)),
    }
}

fn render_json(results: &[Comparison], stats: &Stats) -> Result<String> {
    let mut out = serde_json::to_string_pretty(&JsonOutput { results, stats })?;
    out.push('\n');
    Ok(out)
}

fn render_csv(results: &[Comparison], grouped: bool) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    if grouped {
        wtr.write_record(["Item", "Category"])?;
        for membership in Membership::ALL {
            for r in results.iter().filter(|r| r.status == membership) {
                wtr.write_record([r.item.as_str(), membership.label()])?;
            }
        }
    } else {
        for r in results {
            let code = r.status.code().to_string();
            wtr.write_record([r.item.as_str(), code.as_str()])?;
        }
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| anyhow!("flush csv output: {}", e.error()))?;
    Ok(String::from_utf8(bytes)?)
}

fn paint(text: &str, membership: Membership, color: bool) -> String {
    if !color {
        return text.to_string();
    }
    let painted = match membership {
        Membership::OnlyFirst => text.blue().bold(),
        Membership::Both => text.green().bold(),
        Membership::OnlySecond => text.red().bold(),
    };
    painted.to_string()
}

fn section_title(membership: Membership) -> &'static str {
    match membership {
        Membership::OnlyFirst => "=== Items only in FILE1 ===",
        Membership::Both => "=== Items in both files ===",
        Membership::OnlySecond => "=== Items only in FILE2 ===",
    }
}

fn render_table(results: &[Comparison], grouped: bool, color: bool) -> String {
    let mut out = String::new();
    if grouped {
        for membership in Membership::ALL {
            out.push('\n');
            out.push_str(&paint(section_title(membership), membership, color));
            out.push('\n');
            for r in results.iter().filter(|r| r.status == membership) {
                out.push_str(&paint(&format!("  {}", r.item), membership, color));
                out.push('\n');
            }
        }
    } else {
        out.push_str("\n=== Comparison Results ===\n");
        for r in results {
            let row = format!("  {:<20} [{}]", r.item, r.status.label());
            out.push_str(&paint(&row, r.status, color));
            out.push('\n');
        }
    }
    out
}

/// Statistics block printed after the results when requested.
pub fn render_stats(stats: &Stats, color: bool) -> String {
    let header = "=== Statistics ===";
    let mut out = String::from("\n");
    if color {
        out.push_str(&header.cyan().bold().to_string());
    } else {
        out.push_str(header);
    }
    out.push('\n');
    for membership in Membership::ALL {
        out.push_str(&format!(
            "{}: {} items\n",
            membership.label(),
            stats.count(membership)
        ));
    }
    out.push_str(&format!("Total: {} items\n", stats.total_count));
    out
}
