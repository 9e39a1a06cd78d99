//! Fragment-to-clause extraction pipeline.
//!
//! Stages run in sequence over one document: line assembly per page,
//! footer removal, superscript folding, section splitting, clause parsing.
//! Per-page read failures are logged and skipped; only a document that
//! cannot be opened at all fails the pipeline.

mod clauses;
mod footer;
pub(crate) mod labels;
mod lines;
pub(crate) mod normalize;
mod sections;
mod superscript;

use crate::config::TuningConfig;
use crate::error::Result;
use crate::provider::{DocumentTextProvider, ProviderError};
use crate::types::{
    ExtractedDocument, ExtractedSection, ExtractionFlag, ExtractionIssue, PageLine, Side,
};

/// Run the extraction pipeline against an already-opened fragment source.
pub fn extract_from_provider(
    provider: &mut dyn DocumentTextProvider,
    side: Side,
    config: &TuningConfig,
) -> Result<ExtractedDocument> {
    let page_count = provider.page_count();
    tracing::debug!(page_count, side = side.label(), "extraction: starting");

    let mut all_lines: Vec<PageLine> = Vec::new();
    let mut issues: Vec<ExtractionIssue> = Vec::new();

    for index in 0..page_count {
        let page_number = index + 1;
        match provider.page(index) {
            Ok(content) => {
                let page_lines =
                    lines::assemble_page_lines(page_number, content.height, content.fragments, config);
                tracing::trace!(page = page_number, line_count = page_lines.len(), "extraction: page assembled");
                all_lines.extend(page_lines);
            }
            Err(ProviderError::PageOutOfRange(_)) => break,
            Err(ProviderError::PageFailed { page, reason }) => {
                tracing::warn!(page, %reason, "extraction: page skipped");
                issues.push(ExtractionIssue {
                    key: format!("__page_{page}"),
                    original_label: String::new(),
                    text: reason,
                    page_start: page,
                    page_end: page,
                    flags: vec![ExtractionFlag::Unextractable],
                    side,
                });
            }
        }
    }

    let total_lines = all_lines.len();
    let all_lines = footer::filter_footers(all_lines, config);
    let all_lines = superscript::attach_superscripts(all_lines, config);
    tracing::debug!(
        assembled_lines = total_lines,
        surviving_lines = all_lines.len(),
        "extraction: filters applied"
    );

    let mut extracted_sections = Vec::new();
    for slice in sections::split_sections(all_lines) {
        let parsed = clauses::parse_section(&slice, side, config);
        tracing::debug!(
            header = %slice.header,
            clause_count = parsed.clauses.len(),
            coverage_percent = parsed.coverage.percent,
            "extraction: section parsed"
        );
        issues.extend(parsed.issues);
        extracted_sections.push(ExtractedSection {
            header: slice.header,
            normalized_header: slice.normalized_header,
            clauses: parsed.clauses,
            coverage: parsed.coverage,
            start_paragraph: parsed.start_paragraph,
            end_paragraph: parsed.end_paragraph,
        });
    }

    Ok(ExtractedDocument {
        sections: extracted_sections,
        issues,
    })
}
