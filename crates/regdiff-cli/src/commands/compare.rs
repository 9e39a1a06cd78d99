//! Compare command: run both extractions and print the aligned diff.

use anyhow::{Context, Result};
use regdiff::{ComparisonRow, DiffKind, RowStatus, Side, TuningConfig};
use std::path::Path;

use crate::{Granularity, OutputFormat};

pub fn run(base: &Path, compared: &Path, granularity: Granularity, format: OutputFormat) -> Result<()> {
    let base_buffer = std::fs::read(base).with_context(|| format!("failed to read '{}'", base.display()))?;
    let compared_buffer =
        std::fs::read(compared).with_context(|| format!("failed to read '{}'", compared.display()))?;

    let config = TuningConfig::default();

    // The two pipelines share nothing; run them side by side.
    let (base_doc, compared_doc) = rayon::join(
        || regdiff::extract(&base_buffer, Side::Base, &config),
        || regdiff::extract(&compared_buffer, Side::Compared, &config),
    );
    let base_doc = base_doc.with_context(|| format!("failed to extract '{}'", base.display()))?;
    let compared_doc = compared_doc.with_context(|| format!("failed to extract '{}'", compared.display()))?;

    let result = regdiff::compare(&base_doc, &compared_doc);

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&result).context("failed to serialize comparison result")?
            );
        }
        OutputFormat::Text => {
            for section in &result.sections {
                println!("== {} [{:?}]", section.header, section.status);
                for row in &section.rows {
                    print_row(row, granularity);
                }
            }
        }
    }

    Ok(())
}

fn print_row(row: &ComparisonRow, granularity: Granularity) {
    let marker = match row.status {
        RowStatus::Unchanged => ' ',
        RowStatus::Changed => '~',
        RowStatus::Added => '+',
        RowStatus::Removed => '-',
        RowStatus::Ambiguous => '?',
    };
    println!("{marker} {}", row.display_label);

    if row.status == RowStatus::Unchanged {
        return;
    }
    let tokens = match granularity {
        Granularity::Word => &row.diff_word,
        Granularity::Sentence => &row.diff_sentence,
        Granularity::Paragraph => &row.diff_paragraph,
    };
    let mut rendered = String::new();
    for token in tokens {
        match token.kind {
            DiffKind::Equal => rendered.push_str(&token.value),
            DiffKind::Removed => {
                rendered.push_str("[-");
                rendered.push_str(&token.value);
                rendered.push_str("-]");
            }
            DiffKind::Added => {
                rendered.push_str("{+");
                rendered.push_str(&token.value);
                rendered.push_str("+}");
            }
        }
    }
    for line in rendered.lines() {
        println!("    {line}");
    }
}
