//! Extract command: dump one document's clause tree.

use anyhow::{Context, Result};
use regdiff::{Side, TuningConfig};
use std::path::Path;

use crate::OutputFormat;

pub fn run(path: &Path, format: OutputFormat) -> Result<()> {
    let buffer = std::fs::read(path).with_context(|| format!("failed to read '{}'", path.display()))?;
    let document = regdiff::extract(&buffer, Side::Base, &TuningConfig::default())
        .with_context(|| format!("failed to extract '{}'", path.display()))?;

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&document).context("failed to serialize extraction result")?
            );
        }
        OutputFormat::Text => {
            for section in &document.sections {
                println!("== {} ({:.1}% coverage)", section.header, section.coverage.percent);
                for clause in &section.clauses {
                    let marker = if clause.synthetic { "~" } else { " " };
                    println!(
                        "{marker} {:indent$}{} (p.{}-{}, {} lines)",
                        "",
                        clause.id,
                        clause.page_start,
                        clause.page_end,
                        clause.source_line_count,
                        indent = (clause.level as usize - 1) * 2,
                    );
                }
            }
            if !document.issues.is_empty() {
                println!("\n{} extraction issue(s):", document.issues.len());
                for issue in &document.issues {
                    println!("  {:?} {} (p.{}-{})", issue.flags, issue.key, issue.page_start, issue.page_end);
                }
            }
        }
    }

    Ok(())
}
