//! Section boundary detection and appendix cutoff.

use std::sync::LazyLock;

use regex::Regex;

use crate::extract::labels;
use crate::extract::normalize::normalized_form;
use crate::types::PageLine;

/// The canonical section headers of the supported standards, in their
/// publication order.
pub(crate) const CANONICAL_HEADERS: &[&str] = &[
    "Objective",
    "Scope",
    "Core content",
    "Governance",
    "Strategy",
    "Risk management",
    "Metrics and targets",
];

/// Header of the virtual section used when no boundary is found.
pub(crate) const UNSECTIONED_HEADER: &str = "Unsectioned";

/// How many lines after a header candidate may hold the confirming root
/// clause.
const BOUNDARY_LOOKAHEAD: usize = 20;
/// Root clauses required before a cutoff line when no boundary exists.
const MIN_ROOTS_BEFORE_APPENDIX: usize = 3;
const APPENDIX_MAX_WORDS: usize = 10;
const APPENDIX_MAX_CHARS: usize = 90;

static APPENDIX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^appendix(?:es)?\b").unwrap());

pub(crate) fn is_canonical_header(normalized: &str) -> bool {
    CANONICAL_HEADERS.iter().any(|h| h.to_lowercase() == normalized)
}

/// A section's header plus its body lines (header line excluded).
#[derive(Debug, Clone)]
pub(crate) struct SectionSlice {
    pub header: String,
    pub normalized_header: String,
    pub lines: Vec<PageLine>,
}

/// Split the filtered line stream into sections, discarding appendix
/// content and any front matter before the first boundary.
pub(crate) fn split_sections(mut lines: Vec<PageLine>) -> Vec<SectionSlice> {
    let boundaries = find_boundaries(&lines);

    if let Some(cutoff) = find_appendix_cutoff(&lines, &boundaries) {
        tracing::debug!(
            cutoff_line = cutoff,
            dropped = lines.len() - cutoff,
            "appendix cutoff: discarding trailing lines"
        );
        lines.truncate(cutoff);
    }

    let boundaries: Vec<(usize, &'static str)> =
        boundaries.into_iter().filter(|(idx, _)| *idx < lines.len()).collect();

    if boundaries.is_empty() {
        if lines.is_empty() {
            return Vec::new();
        }
        return vec![SectionSlice {
            header: UNSECTIONED_HEADER.to_string(),
            normalized_header: normalized_form(UNSECTIONED_HEADER),
            lines,
        }];
    }

    if boundaries[0].0 > 0 {
        tracing::debug!(front_matter_lines = boundaries[0].0, "discarding lines before first section");
    }

    let mut slices = Vec::with_capacity(boundaries.len());
    for (slot, &(start, header)) in boundaries.iter().enumerate() {
        let end = boundaries.get(slot + 1).map_or(lines.len(), |&(next, _)| next);
        slices.push(SectionSlice {
            header: header.to_string(),
            normalized_header: normalized_form(header),
            lines: lines[start + 1..end].to_vec(),
        });
    }
    slices
}

/// Locate the first qualifying line for each canonical header.
///
/// A line qualifies when its normalized form equals the header and a
/// root-clause-looking line follows within the lookahead window. Results
/// come back in line order.
fn find_boundaries(lines: &[PageLine]) -> Vec<(usize, &'static str)> {
    let mut taken = [false; CANONICAL_HEADERS.len()];
    let mut boundaries = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let normalized = normalized_form(&line.text);
        let Some(slot) = CANONICAL_HEADERS
            .iter()
            .position(|h| h.to_lowercase() == normalized)
        else {
            continue;
        };
        if taken[slot] {
            continue;
        }
        let window_end = (idx + 1 + BOUNDARY_LOOKAHEAD).min(lines.len());
        let confirmed = lines[idx + 1..window_end]
            .iter()
            .any(|candidate| labels::is_root_clause(&candidate.text));
        if confirmed {
            taken[slot] = true;
            boundaries.push((idx, CANONICAL_HEADERS[slot]));
        }
    }

    boundaries
}

/// Find the index of the appendix heading line, if one qualifies.
fn find_appendix_cutoff(lines: &[PageLine], boundaries: &[(usize, &'static str)]) -> Option<usize> {
    let last_boundary = boundaries.last().map(|&(idx, _)| idx);

    for (idx, line) in lines.iter().enumerate() {
        if !looks_like_appendix_heading(&line.text) {
            continue;
        }
        let accepted = match last_boundary {
            Some(last) => idx > last,
            None => {
                lines[..idx]
                    .iter()
                    .filter(|l| labels::is_root_clause(&l.text))
                    .count()
                    >= MIN_ROOTS_BEFORE_APPENDIX
            }
        };
        if accepted {
            return Some(idx);
        }
    }
    None
}

fn looks_like_appendix_heading(text: &str) -> bool {
    let trimmed = text.trim();
    if !APPENDIX_RE.is_match(trimmed) {
        return false;
    }
    if trimmed.len() > APPENDIX_MAX_CHARS || trimmed.split_whitespace().count() > APPENDIX_MAX_WORDS {
        return false;
    }
    !trimmed.ends_with(['.', '!', '?', ':', ';'])
}
