//! Result data model shared by extraction and comparison.

use serde::{Deserialize, Serialize};

/// Which of the two compared documents an artifact came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Base,
    Compared,
}

impl Side {
    pub fn label(self) -> &'static str {
        match self {
            Side::Base => "base",
            Side::Compared => "compared",
        }
    }
}

/// A single positioned text run emitted by the PDF text extractor.
///
/// Coordinates are PDF user space: origin at the bottom-left of the page,
/// Y increasing upward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedFragment {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// A visual line assembled from fragments sharing a Y bucket.
///
/// Exactly one line exists per (page, bucket) after assembly; fragments
/// within a line were composed in ascending-x order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageLine {
    /// 1-based page number.
    pub page: u32,
    pub text: String,
    /// X of the leftmost contributing fragment.
    pub x: f32,
    pub y: f32,
    /// Max fragment height on the line.
    pub height: f32,
    pub page_height: f32,
}

/// A clause in the extracted tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClauseNode {
    /// Canonical hierarchical identifier, e.g. `2(a)(i)`.
    pub id: String,
    /// The label exactly as it appeared, e.g. `2(a)` or `(i)`.
    pub raw_label: String,
    /// Id of the immediate parent; absent for roots and synthetic clauses.
    pub parent_id: Option<String>,
    /// 1 = root numeric, 2 = letter marker, 3 = roman, 4 = nested numeric.
    pub level: u8,
    /// Full clause text. Newlines and leading indent are significant.
    pub text_preserved: String,
    pub page_start: u32,
    pub page_end: u32,
    /// Scroll target for viewers.
    pub anchor_page: u32,
    pub anchor_y: f32,
    /// True when the node wraps text that had no recognisable label.
    pub synthetic: bool,
    pub source_line_count: usize,
}

/// Fraction of a section's lines that were mapped into some clause.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionCoverage {
    pub total_lines: usize,
    pub mapped_lines: usize,
    pub unmatched_lines: usize,
    /// `round(1000 * mapped / total) / 10`, i.e. one decimal place.
    pub percent: f64,
}

impl SectionCoverage {
    pub fn from_counts(total_lines: usize, mapped_lines: usize) -> Self {
        let unmatched_lines = total_lines.saturating_sub(mapped_lines);
        Self {
            total_lines,
            mapped_lines,
            unmatched_lines,
            percent: coverage_percent(total_lines, mapped_lines),
        }
    }
}

pub(crate) fn coverage_percent(total: usize, mapped: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (1000.0 * mapped as f64 / total as f64).round() / 10.0
}

/// A named top-level division of the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedSection {
    pub header: String,
    pub normalized_header: String,
    /// Clauses in document order.
    pub clauses: Vec<ClauseNode>,
    pub coverage: SectionCoverage,
    /// First non-synthetic root clause id.
    pub start_paragraph: Option<String>,
    /// Last non-synthetic root clause id.
    pub end_paragraph: Option<String>,
}

/// Recoverable fault classes surfaced on the extraction result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionFlag {
    Duplicate,
    Malformed,
    Unextractable,
    Unmatched,
}

/// One recoverable extraction fault.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionIssue {
    pub key: String,
    pub original_label: String,
    pub text: String,
    pub page_start: u32,
    pub page_end: u32,
    pub flags: Vec<ExtractionFlag>,
    /// Which document the issue was observed in.
    pub side: Side,
}

/// Output of the extraction pipeline for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ExtractedDocument {
    pub sections: Vec<ExtractedSection>,
    pub issues: Vec<ExtractionIssue>,
}

/// Token kind in a diff stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffKind {
    Equal,
    Added,
    Removed,
}

/// One run of diffed text. Adjacent tokens of the same kind may be merged
/// but are not required to be.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffToken {
    pub value: String,
    pub kind: DiffKind,
}

impl DiffToken {
    pub fn new(kind: DiffKind, value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind,
        }
    }
}

/// Cross-document status of one aligned clause row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowStatus {
    Unchanged,
    Changed,
    Added,
    Removed,
    /// The clause id maps to multiple clauses on at least one side; the
    /// diffs are suppressed and replaced by a fixed explanation.
    Ambiguous,
}

/// One aligned clause pair (either side may be absent).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub key: String,
    pub display_label: String,
    pub in_base: bool,
    pub in_compared: bool,
    pub base: Option<ClauseNode>,
    pub compared: Option<ClauseNode>,
    pub status: RowStatus,
    pub diff_word: Vec<DiffToken>,
    pub diff_sentence: Vec<DiffToken>,
    pub diff_paragraph: Vec<DiffToken>,
}

/// Pairing status of one section across the two documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionStatus {
    Matched,
    MissingInBase,
    MissingInCompared,
}

/// One aligned section with its rows and merged coverage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparedSection {
    pub header: String,
    pub status: SectionStatus,
    pub rows: Vec<ComparisonRow>,
    pub coverage: SectionCoverage,
}

/// Per-side page range of a section, for viewer navigation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageRange {
    pub page_start: u32,
    pub page_end: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionPageMap {
    pub header: String,
    pub base: Option<PageRange>,
    pub compared: Option<PageRange>,
}

/// A value-copied scroll target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnchorPoint {
    pub page: u32,
    pub y: f32,
}

/// Navigation anchor for one row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionAnchor {
    pub section_header: String,
    /// `<header>::<key>`; unique across the result.
    pub anchor_id: String,
    pub label: String,
    pub base: Option<AnchorPoint>,
    pub compared: Option<AnchorPoint>,
    pub status: RowStatus,
    pub removed_snippet: Option<String>,
    pub added_snippet: Option<String>,
}

/// Full output of [`crate::compare`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ComparisonResult {
    pub sections: Vec<ComparedSection>,
    pub section_page_map: Vec<SectionPageMap>,
    pub section_anchors: Vec<SectionAnchor>,
    /// All rows flattened across sections, keys prefixed `<header>::`.
    pub rows: Vec<ComparisonRow>,
    pub selected_section_default: Option<String>,
}
