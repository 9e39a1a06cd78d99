//! Section and clause alignment across the two documents.

use std::collections::HashMap;

use crate::compare::diff;
use crate::types::{
    ClauseNode, ComparisonRow, DiffKind, DiffToken, ExtractedDocument, ExtractedSection, RowStatus,
    SectionStatus,
};

/// One header paired across the two documents; either side may be absent.
#[derive(Debug)]
pub(crate) struct SectionPair<'a> {
    pub header: String,
    pub status: SectionStatus,
    pub base: Option<&'a ExtractedSection>,
    pub compared: Option<&'a ExtractedSection>,
}

/// Pair sections by header: base order first, compared-only headers
/// appended in their own order. Appendix sections never participate.
pub(crate) fn pair_sections<'a>(
    base: &'a ExtractedDocument,
    compared: &'a ExtractedDocument,
) -> Vec<SectionPair<'a>> {
    let base_sections: Vec<&ExtractedSection> =
        base.sections.iter().filter(|s| !is_appendix(s)).collect();
    let compared_sections: Vec<&ExtractedSection> =
        compared.sections.iter().filter(|s| !is_appendix(s)).collect();

    let compared_by_header: HashMap<&str, &ExtractedSection> = compared_sections
        .iter()
        .map(|s| (s.normalized_header.as_str(), *s))
        .collect();
    let base_headers: Vec<&str> = base_sections.iter().map(|s| s.normalized_header.as_str()).collect();

    let mut pairs = Vec::new();
    for section in &base_sections {
        let other = compared_by_header.get(section.normalized_header.as_str()).copied();
        pairs.push(SectionPair {
            header: section.header.clone(),
            status: if other.is_some() {
                SectionStatus::Matched
            } else {
                SectionStatus::MissingInCompared
            },
            base: Some(section),
            compared: other,
        });
    }
    for section in &compared_sections {
        if base_headers.contains(&section.normalized_header.as_str()) {
            continue;
        }
        pairs.push(SectionPair {
            header: section.header.clone(),
            status: SectionStatus::MissingInBase,
            base: None,
            compared: Some(section),
        });
    }
    pairs
}

fn is_appendix(section: &ExtractedSection) -> bool {
    section.normalized_header.starts_with("appendix")
}

/// Align one paired section's clauses by canonical id and diff each pair.
pub(crate) fn align_clauses(pair: &SectionPair<'_>) -> Vec<ComparisonRow> {
    let base_groups = group_by_id(pair.base);
    let compared_groups = group_by_id(pair.compared);

    let mut ordered_ids: Vec<&str> = base_groups.order.clone();
    for &id in &compared_groups.order {
        if !base_groups.by_id.contains_key(id) {
            ordered_ids.push(id);
        }
    }

    ordered_ids
        .into_iter()
        .map(|id| build_row(id, base_groups.by_id.get(id), compared_groups.by_id.get(id)))
        .collect()
}

struct IdGroups<'a> {
    order: Vec<&'a str>,
    by_id: HashMap<&'a str, Vec<&'a ClauseNode>>,
}

fn group_by_id(section: Option<&ExtractedSection>) -> IdGroups<'_> {
    let mut order = Vec::new();
    let mut by_id: HashMap<&str, Vec<&ClauseNode>> = HashMap::new();
    if let Some(section) = section {
        for clause in &section.clauses {
            let entry = by_id.entry(clause.id.as_str()).or_default();
            if entry.is_empty() {
                order.push(clause.id.as_str());
            }
            entry.push(clause);
        }
    }
    IdGroups { order, by_id }
}

fn build_row(id: &str, base: Option<&Vec<&ClauseNode>>, compared: Option<&Vec<&ClauseNode>>) -> ComparisonRow {
    let base_first = base.and_then(|g| g.first().copied());
    let compared_first = compared.and_then(|g| g.first().copied());
    let ambiguous = base.is_some_and(|g| g.len() > 1) || compared.is_some_and(|g| g.len() > 1);

    let display_label = display_label(base_first, compared_first);

    let (status, diff_word, diff_sentence, diff_paragraph) = if ambiguous {
        let note = vec![DiffToken::new(DiffKind::Equal, diff::AMBIGUOUS_EXPLANATION)];
        (RowStatus::Ambiguous, note.clone(), note.clone(), note)
    } else {
        match (base_first, compared_first) {
            (Some(b), Some(c)) => {
                let status = if b.text_preserved.trim() == c.text_preserved.trim() {
                    RowStatus::Unchanged
                } else {
                    RowStatus::Changed
                };
                (
                    status,
                    diff::word_diff(&b.text_preserved, &c.text_preserved),
                    diff::sentence_diff(&b.text_preserved, &c.text_preserved),
                    diff::paragraph_diff(&b.text_preserved, &c.text_preserved),
                )
            }
            (Some(b), None) => {
                let removed = vec![DiffToken::new(DiffKind::Removed, &b.text_preserved)];
                (RowStatus::Removed, removed.clone(), removed.clone(), removed)
            }
            (None, Some(c)) => {
                let added = vec![DiffToken::new(DiffKind::Added, &c.text_preserved)];
                (RowStatus::Added, added.clone(), added.clone(), added)
            }
            (None, None) => (RowStatus::Unchanged, Vec::new(), Vec::new(), Vec::new()),
        }
    };

    ComparisonRow {
        key: id.to_string(),
        display_label,
        in_base: base_first.is_some(),
        in_compared: compared_first.is_some(),
        base: base_first.cloned(),
        compared: compared_first.cloned(),
        status,
        diff_word,
        diff_sentence,
        diff_paragraph,
    }
}

fn display_label(base: Option<&ClauseNode>, compared: Option<&ClauseNode>) -> String {
    match (base, compared) {
        (Some(b), Some(c)) if b.raw_label == c.raw_label => b.raw_label.clone(),
        (Some(b), Some(c)) => format!("{} | {}", b.raw_label, c.raw_label),
        (Some(b), None) => b.raw_label.clone(),
        (None, Some(c)) => c.raw_label.clone(),
        (None, None) => "Unknown".to_string(),
    }
}
