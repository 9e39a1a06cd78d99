//! Comparison assembly: aligned sections, navigation anchors, flat rows.

mod align;
mod diff;

use crate::types::{
    AnchorPoint, ComparedSection, ComparisonResult, ComparisonRow, DiffKind, ExtractedDocument,
    ExtractedSection, PageRange, RowStatus, SectionAnchor, SectionCoverage, SectionPageMap,
    SectionStatus, coverage_percent,
};

/// Scroll fallback for rows with no compared-side anchor at all,
/// calibrated to the top of an A4 body region.
const FALLBACK_ANCHOR_Y: f32 = 780.0;
/// Snippet budget for anchor previews.
const SNIPPET_MAX_CHARS: usize = 180;

/// Compare two extracted documents. Pure; the inputs are not mutated.
pub fn compare(base: &ExtractedDocument, compared: &ExtractedDocument) -> ComparisonResult {
    let pairs = align::pair_sections(base, compared);

    let mut sections = Vec::new();
    let mut section_page_map = Vec::new();
    let mut section_anchors = Vec::new();
    let mut flat_rows = Vec::new();
    let mut selected_section_default: Option<String> = None;
    let mut first_surviving: Option<String> = None;

    for pair in &pairs {
        let has_content = section_has_content(pair.base) || section_has_content(pair.compared);
        if !has_content {
            tracing::trace!(header = %pair.header, "comparison: dropping empty section");
            continue;
        }

        let rows = align::align_clauses(pair);

        first_surviving.get_or_insert_with(|| pair.header.clone());
        if selected_section_default.is_none() && pair.status == SectionStatus::Matched {
            selected_section_default = Some(pair.header.clone());
        }

        let base_range = clause_page_range(pair.base);
        let compared_range = clause_page_range(pair.compared);
        section_page_map.push(SectionPageMap {
            header: pair.header.clone(),
            base: base_range,
            compared: compared_range,
        });

        for (idx, row) in rows.iter().enumerate() {
            section_anchors.push(build_anchor(&pair.header, &rows, idx, row, compared_range));
        }

        for row in &rows {
            let mut flat = row.clone();
            flat.key = format!("{}::{}", pair.header, row.key);
            flat_rows.push(flat);
        }

        sections.push(ComparedSection {
            header: pair.header.clone(),
            status: pair.status,
            coverage: merge_coverage(pair.base, pair.compared),
            rows,
        });
    }

    tracing::debug!(
        section_count = sections.len(),
        row_count = flat_rows.len(),
        "comparison: assembled"
    );

    ComparisonResult {
        sections,
        section_page_map,
        section_anchors,
        rows: flat_rows,
        selected_section_default: selected_section_default.or(first_surviving),
    }
}

fn section_has_content(section: Option<&ExtractedSection>) -> bool {
    section.is_some_and(|s| !s.clauses.is_empty())
}

fn clause_page_range(section: Option<&ExtractedSection>) -> Option<PageRange> {
    let section = section?;
    let page_start = section.clauses.iter().map(|c| c.page_start).min()?;
    let page_end = section.clauses.iter().map(|c| c.page_end).max()?;
    Some(PageRange { page_start, page_end })
}

/// Side-merged coverage: summed counts, recomputed percent.
fn merge_coverage(base: Option<&ExtractedSection>, compared: Option<&ExtractedSection>) -> SectionCoverage {
    let mut total = 0;
    let mut mapped = 0;
    let mut unmatched = 0;
    for section in [base, compared].into_iter().flatten() {
        total += section.coverage.total_lines;
        mapped += section.coverage.mapped_lines;
        unmatched += section.coverage.unmatched_lines;
    }
    SectionCoverage {
        total_lines: total,
        mapped_lines: mapped,
        unmatched_lines: unmatched,
        percent: coverage_percent(total, mapped),
    }
}

fn build_anchor(
    header: &str,
    rows: &[ComparisonRow],
    idx: usize,
    row: &ComparisonRow,
    compared_range: Option<PageRange>,
) -> SectionAnchor {
    let base = row.base.as_ref().map(|c| AnchorPoint {
        page: c.anchor_page,
        y: c.anchor_y,
    });
    let compared = row
        .compared
        .as_ref()
        .map(|c| AnchorPoint {
            page: c.anchor_page,
            y: c.anchor_y,
        })
        .or_else(|| nearest_compared_anchor(rows, idx))
        .or_else(|| {
            compared_range.map(|range| AnchorPoint {
                page: range.page_start,
                y: FALLBACK_ANCHOR_Y,
            })
        });

    let removed_snippet = matches!(row.status, RowStatus::Changed | RowStatus::Removed)
        .then(|| snippet_of_kind(&row.diff_word, DiffKind::Removed))
        .flatten();
    let added_snippet = matches!(row.status, RowStatus::Changed | RowStatus::Added)
        .then(|| snippet_of_kind(&row.diff_word, DiffKind::Added))
        .flatten();

    SectionAnchor {
        section_header: header.to_string(),
        anchor_id: format!("{}::{}", header, row.key),
        label: row.display_label.clone(),
        base,
        compared,
        status: row.status,
        removed_snippet,
        added_snippet,
    }
}

/// Scan outward from `idx` (distance 1, 2, …) for the nearest row that
/// carries a compared clause.
fn nearest_compared_anchor(rows: &[ComparisonRow], idx: usize) -> Option<AnchorPoint> {
    for distance in 1..rows.len() {
        for candidate in [idx.checked_sub(distance), idx.checked_add(distance)] {
            let Some(candidate) = candidate else { continue };
            let Some(row) = rows.get(candidate) else { continue };
            if let Some(clause) = &row.compared {
                return Some(AnchorPoint {
                    page: clause.anchor_page,
                    y: clause.anchor_y,
                });
            }
        }
    }
    None
}

/// Whitespace-collapsed concatenation of one kind's token values,
/// truncated to the snippet budget.
fn snippet_of_kind(tokens: &[crate::types::DiffToken], kind: DiffKind) -> Option<String> {
    let concatenated: String = tokens
        .iter()
        .filter(|t| t.kind == kind)
        .map(|t| t.value.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let collapsed = crate::extract::normalize::collapse_whitespace(&concatenated);
    if collapsed.is_empty() {
        return None;
    }
    if collapsed.chars().count() > SNIPPET_MAX_CHARS {
        let truncated: String = collapsed.chars().take(SNIPPET_MAX_CHARS).collect();
        Some(format!("{truncated}\u{2026}"))
    } else {
        Some(collapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ClauseNode;

    fn clause_at(id: &str, text: &str, page: u32, y: f32) -> ClauseNode {
        ClauseNode {
            id: id.to_string(),
            raw_label: id.to_string(),
            parent_id: None,
            level: 1,
            text_preserved: text.to_string(),
            page_start: page,
            page_end: page,
            anchor_page: page,
            anchor_y: y,
            synthetic: false,
            source_line_count: 1,
        }
    }

    fn section(header: &str, clauses: Vec<ClauseNode>) -> ExtractedSection {
        ExtractedSection {
            header: header.to_string(),
            normalized_header: header.to_lowercase(),
            coverage: SectionCoverage::from_counts(clauses.len(), clauses.len()),
            clauses,
            start_paragraph: None,
            end_paragraph: None,
        }
    }

    fn doc(sections: Vec<ExtractedSection>) -> ExtractedDocument {
        ExtractedDocument {
            sections,
            issues: Vec::new(),
        }
    }

    #[test]
    fn test_empty_documents_compare_to_empty_result() {
        let result = compare(&doc(vec![]), &doc(vec![]));
        assert!(result.sections.is_empty());
        assert!(result.rows.is_empty());
        assert!(result.selected_section_default.is_none());
    }

    #[test]
    fn test_sections_without_clauses_are_filtered() {
        let result = compare(&doc(vec![section("Scope", vec![])]), &doc(vec![section("Scope", vec![])]));
        assert!(result.sections.is_empty());
    }

    #[test]
    fn test_flat_rows_have_prefixed_keys() {
        let base = doc(vec![section("Scope", vec![clause_at("1", "1. Text.", 1, 700.0)])]);
        let result = compare(&base, &base.clone());
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0].key, "Scope::1");
        assert_eq!(result.sections[0].rows[0].key, "1");
    }

    #[test]
    fn test_anchor_ids_unique_and_prefixed() {
        let base = doc(vec![
            section("Objective", vec![clause_at("1", "1. A.", 1, 700.0)]),
            section("Scope", vec![clause_at("1", "1. B.", 2, 700.0)]),
        ]);
        let result = compare(&base, &base.clone());
        let ids: Vec<&str> = result.section_anchors.iter().map(|a| a.anchor_id.as_str()).collect();
        assert_eq!(ids, ["Objective::1", "Scope::1"]);
    }

    #[test]
    fn test_removed_row_borrows_nearest_compared_anchor() {
        let base = doc(vec![section(
            "Scope",
            vec![
                clause_at("1", "1. Shared.", 1, 700.0),
                clause_at("2", "2. Base only.", 1, 650.0),
            ],
        )]);
        let compared = doc(vec![section("Scope", vec![clause_at("1", "1. Shared.", 3, 500.0)])]);
        let result = compare(&base, &compared);
        let removed_anchor = result
            .section_anchors
            .iter()
            .find(|a| a.status == RowStatus::Removed)
            .unwrap();
        let fallback = removed_anchor.compared.unwrap();
        assert_eq!(fallback.page, 3);
        assert_eq!(fallback.y, 500.0);
    }

    #[test]
    fn test_removed_row_falls_back_to_page_range_anchor() {
        // Compared side has a section with clauses on page 4 but no row
        // with a compared clause matching: single removed row.
        let base = doc(vec![section("Scope", vec![clause_at("2", "2. Base only.", 1, 650.0)])]);
        let compared = doc(vec![section("Scope", vec![])]);
        let result = compare(&base, &compared);
        let anchor = &result.section_anchors[0];
        assert!(anchor.compared.is_none());

        let compared_with_pages = doc(vec![section("Scope", vec![clause_at("9", "9. Far.", 4, 100.0)])]);
        let result = compare(&base, &compared_with_pages);
        let anchor = result
            .section_anchors
            .iter()
            .find(|a| a.status == RowStatus::Removed)
            .unwrap();
        // Nearest-row scan finds clause 9's anchor before the page-range
        // fallback is needed.
        assert!(anchor.compared.is_some());
    }

    #[test]
    fn test_changed_row_snippets() {
        let base = doc(vec![section(
            "Scope",
            vec![clause_at("1", "1. Records kept for five years.", 1, 700.0)],
        )]);
        let compared = doc(vec![section(
            "Scope",
            vec![clause_at("1", "1. Records kept for seven years.", 1, 700.0)],
        )]);
        let result = compare(&base, &compared);
        let anchor = &result.section_anchors[0];
        assert_eq!(anchor.status, RowStatus::Changed);
        assert!(anchor.removed_snippet.as_ref().unwrap().contains("five"));
        assert!(anchor.added_snippet.as_ref().unwrap().contains("seven"));
    }

    #[test]
    fn test_snippet_truncation() {
        let long = "word ".repeat(100);
        let tokens = vec![crate::types::DiffToken::new(DiffKind::Removed, long)];
        let snippet = snippet_of_kind(&tokens, DiffKind::Removed).unwrap();
        assert_eq!(snippet.chars().count(), SNIPPET_MAX_CHARS + 1);
        assert!(snippet.ends_with('\u{2026}'));
    }

    #[test]
    fn test_selected_section_prefers_matched() {
        let base = doc(vec![
            section("Objective", vec![clause_at("1", "1. A.", 1, 700.0)]),
            section("Scope", vec![clause_at("2", "2. B.", 1, 650.0)]),
        ]);
        let compared = doc(vec![section("Scope", vec![clause_at("2", "2. B.", 1, 650.0)])]);
        let result = compare(&base, &compared);
        assert_eq!(result.selected_section_default.as_deref(), Some("Scope"));
    }

    #[test]
    fn test_merged_coverage_sums_sides() {
        let base = doc(vec![section("Scope", vec![clause_at("1", "1. A.", 1, 700.0)])]);
        let compared = doc(vec![section(
            "Scope",
            vec![clause_at("1", "1. A.", 1, 700.0), clause_at("2", "2. B.", 1, 650.0)],
        )]);
        let result = compare(&base, &compared);
        let coverage = result.sections[0].coverage;
        assert_eq!(coverage.total_lines, 3);
        assert_eq!(coverage.mapped_lines, 3);
        assert_eq!(coverage.percent, 100.0);
    }
}
