//! Clause tree construction from a section's line stream.
//!
//! The parser walks lines in document order carrying a stack of active
//! parent labels (root, letter, roman). Label lines open clauses; body
//! lines extend the current clause, with line-join versus paragraph-break
//! decided from the page's spatial metrics; everything else accumulates in
//! an unmatched buffer that is flushed into synthetic clauses.

use std::collections::HashMap;

use crate::config::TuningConfig;
use crate::extract::labels::{self, LineLabel};
use crate::extract::sections::SectionSlice;
use crate::types::{
    ClauseNode, ExtractionFlag, ExtractionIssue, PageLine, SectionCoverage, Side,
};

/// Median line spacing assumed when a page has no measurable pairs.
const DEFAULT_LINE_SPACING: f32 = 11.0;
/// Indent delta (in indent steps) that forces a paragraph break.
const INDENT_BREAK_STEPS: f32 = 1.5;
/// Cap on reconstructed leading indent, in spaces.
const MAX_INDENT_SPACES: i32 = 24;

/// Characters that glue to the following line without a space. The first
/// three are line-break artifacts and are dropped in the join; dashes are
/// content and stay.
const SOFT_HYPHENS: &[char] = &['-', '\u{2010}', '\u{2011}'];
const JOINING_DASHES: &[char] = &['\u{2012}', '\u{2013}', '\u{2014}'];

/// Everything the parser produced for one section.
#[derive(Debug, Clone)]
pub(crate) struct ParsedSection {
    pub clauses: Vec<ClauseNode>,
    pub coverage: SectionCoverage,
    pub issues: Vec<ExtractionIssue>,
    pub start_paragraph: Option<String>,
    pub end_paragraph: Option<String>,
}

pub(crate) fn parse_section(slice: &SectionSlice, side: Side, config: &TuningConfig) -> ParsedSection {
    let spacing = median_spacing_per_page(&slice.lines);
    let mut parser = Parser::new(side, config, spacing);
    for line in &slice.lines {
        parser.feed_line(line);
    }
    parser.finish(slice.lines.len())
}

#[derive(Debug)]
struct Parser<'a> {
    side: Side,
    config: &'a TuningConfig,
    spacing_by_page: HashMap<u32, f32>,

    /// Active parent chain: `(level, canonical id)`, root first.
    parent_stack: Vec<(u8, String)>,
    current: Option<ClauseBuilder>,
    unmatched: Vec<PageLine>,
    unmatched_has_malformed_label: bool,
    synthetic_counter: usize,

    clauses: Vec<ClauseNode>,
    issues: Vec<ExtractionIssue>,
    mapped_lines: usize,
}

#[derive(Debug)]
struct ClauseBuilder {
    node: ClauseNode,
    base_x: f32,
    last_line: PageLine,
}

impl<'a> Parser<'a> {
    fn new(side: Side, config: &'a TuningConfig, spacing_by_page: HashMap<u32, f32>) -> Self {
        Self {
            side,
            config,
            spacing_by_page,
            parent_stack: Vec::new(),
            current: None,
            unmatched: Vec::new(),
            unmatched_has_malformed_label: false,
            synthetic_counter: 0,
            clauses: Vec::new(),
            issues: Vec::new(),
            mapped_lines: 0,
        }
    }

    fn feed_line(&mut self, line: &PageLine) {
        let trimmed = line.text.trim();
        match labels::classify(trimmed) {
            Some(LineLabel::RootWithBody { label } | LineLabel::RootOnly { label }) => {
                self.start_root(label, line);
            }
            Some(LineLabel::MarkerWithBody { token } | LineLabel::MarkerOnly { token }) => {
                if self.parent_stack.is_empty() {
                    // A marker with no active root cannot be normalized
                    // into the tree.
                    self.unmatched_has_malformed_label = true;
                    self.push_unmatched(line);
                } else {
                    self.start_marker(token, line);
                }
            }
            None => {
                if self.current.is_some() {
                    self.append_to_current(line);
                } else {
                    self.push_unmatched(line);
                }
            }
        }
    }

    fn start_root(&mut self, label: &str, line: &PageLine) {
        self.flush_unmatched();
        self.finish_current();

        let id = labels::normalize_label(label);
        self.parent_stack.clear();
        self.parent_stack.push((1, id.clone()));
        self.open_clause(id, label.to_string(), None, 1, line);
    }

    fn start_marker(&mut self, token: &str, line: &PageLine) {
        self.flush_unmatched();
        self.finish_current();

        let lowered = token.to_lowercase();
        let level2 = self.parent_stack.iter().find(|(level, _)| *level == 2);
        let level3 = self.parent_stack.iter().find(|(level, _)| *level == 3);
        let root = self.parent_stack[0].1.clone();

        let (level, parent_id) = match (level3, level2) {
            (Some((_, id)), _) if labels::is_numeric(&lowered) => (4, id.clone()),
            (_, Some((_, id))) if labels::is_roman(&lowered) => (3, id.clone()),
            _ => (2, root),
        };

        let id = format!("{parent_id}({lowered})");
        self.parent_stack.retain(|(l, _)| *l < level);
        self.parent_stack.push((level, id.clone()));
        self.open_clause(id, format!("({token})"), Some(parent_id), level, line);
    }

    fn open_clause(&mut self, id: String, raw_label: String, parent_id: Option<String>, level: u8, line: &PageLine) {
        self.mapped_lines += 1;
        self.current = Some(ClauseBuilder {
            node: ClauseNode {
                id,
                raw_label,
                parent_id,
                level,
                text_preserved: line.text.trim().to_string(),
                page_start: line.page,
                page_end: line.page,
                anchor_page: line.page,
                anchor_y: line.y,
                synthetic: false,
                source_line_count: 1,
            },
            base_x: line.x,
            last_line: line.clone(),
        });
    }

    fn append_to_current(&mut self, line: &PageLine) {
        let spacing = self
            .spacing_by_page
            .get(&line.page)
            .copied()
            .unwrap_or(DEFAULT_LINE_SPACING);
        let config = self.config;
        let Some(builder) = self.current.as_mut() else {
            return;
        };

        let previous = &builder.last_line;
        let next_trimmed = line.text.trim();

        if paragraph_break(previous, line, spacing, config) {
            let indent_steps = ((line.x - builder.base_x) / config.indent_step).round() as i32;
            let indent = indent_steps.clamp(0, MAX_INDENT_SPACES) as usize;
            builder.node.text_preserved.push('\n');
            builder.node.text_preserved.push_str(&" ".repeat(indent));
            builder.node.text_preserved.push_str(next_trimmed);
        } else {
            let text = &mut builder.node.text_preserved;
            match text.chars().next_back() {
                Some(c) if SOFT_HYPHENS.contains(&c) => {
                    text.pop();
                    text.push_str(next_trimmed);
                }
                Some(c) if JOINING_DASHES.contains(&c) => {
                    text.push_str(next_trimmed);
                }
                _ => {
                    text.push(' ');
                    text.push_str(next_trimmed);
                }
            }
        }

        builder.node.page_end = builder.node.page_end.max(line.page);
        builder.node.source_line_count += 1;
        builder.last_line = line.clone();
        self.mapped_lines += 1;
    }

    fn push_unmatched(&mut self, line: &PageLine) {
        self.unmatched.push(line.clone());
    }

    /// Package the buffered unmatched lines into one synthetic clause and
    /// record the corresponding issue.
    fn flush_unmatched(&mut self) {
        if self.unmatched.is_empty() {
            return;
        }
        let buffered = std::mem::take(&mut self.unmatched);
        self.synthetic_counter += 1;
        let id = format!("__unmatched_{}", self.synthetic_counter);

        let text = buffered
            .iter()
            .map(|l| l.text.trim())
            .collect::<Vec<_>>()
            .join("\n");
        let first = &buffered[0];
        let page_start = first.page;
        let page_end = buffered.iter().map(|l| l.page).max().unwrap_or(page_start);

        self.mapped_lines += buffered.len();
        self.clauses.push(ClauseNode {
            id: id.clone(),
            raw_label: String::new(),
            parent_id: None,
            level: 1,
            text_preserved: text.clone(),
            page_start,
            page_end,
            anchor_page: first.page,
            anchor_y: first.y,
            synthetic: true,
            source_line_count: buffered.len(),
        });

        let mut flags = vec![ExtractionFlag::Unmatched];
        if std::mem::take(&mut self.unmatched_has_malformed_label) {
            flags.push(ExtractionFlag::Malformed);
        }
        self.issues.push(ExtractionIssue {
            key: id,
            original_label: String::new(),
            text,
            page_start,
            page_end,
            flags,
            side: self.side,
        });
    }

    fn finish_current(&mut self) {
        if let Some(builder) = self.current.take() {
            self.clauses.push(builder.node);
        }
    }

    fn finish(mut self, total_lines: usize) -> ParsedSection {
        self.finish_current();
        self.flush_unmatched();
        self.record_duplicate_issues();

        let start_paragraph = self
            .clauses
            .iter()
            .find(|c| c.level == 1 && !c.synthetic)
            .map(|c| c.id.clone());
        let end_paragraph = self
            .clauses
            .iter()
            .rev()
            .find(|c| c.level == 1 && !c.synthetic)
            .map(|c| c.id.clone());

        ParsedSection {
            coverage: SectionCoverage::from_counts(total_lines, self.mapped_lines.min(total_lines)),
            clauses: self.clauses,
            issues: self.issues,
            start_paragraph,
            end_paragraph,
        }
    }

    /// One issue per clause occurrence whose id repeats within the section.
    fn record_duplicate_issues(&mut self) {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for clause in &self.clauses {
            *counts.entry(clause.id.as_str()).or_default() += 1;
        }
        let duplicated: Vec<String> = counts
            .into_iter()
            .filter(|(_, n)| *n > 1)
            .map(|(id, _)| id.to_string())
            .collect();
        for clause in &self.clauses {
            if duplicated.contains(&clause.id) {
                self.issues.push(ExtractionIssue {
                    key: clause.id.clone(),
                    original_label: clause.raw_label.clone(),
                    text: clause.text_preserved.clone(),
                    page_start: clause.page_start,
                    page_end: clause.page_end,
                    flags: vec![ExtractionFlag::Duplicate],
                    side: self.side,
                });
            }
        }
    }
}

/// Newline-versus-space decision between two consecutive clause lines.
fn paragraph_break(previous: &PageLine, next: &PageLine, spacing: f32, config: &TuningConfig) -> bool {
    if previous.page != next.page {
        return true;
    }
    let prev_trimmed = previous.text.trim();
    if labels::is_bare_label(prev_trimmed) {
        return true;
    }
    if matches!(
        labels::classify(prev_trimmed),
        Some(LineLabel::RootWithBody { .. } | LineLabel::MarkerWithBody { .. })
    ) {
        // Continuation of the clause's opening line.
        return false;
    }
    let dy = previous.y - next.y;
    if dy > config.paragraph_gap * spacing {
        return true;
    }
    (next.x - previous.x).abs() >= INDENT_BREAK_STEPS * config.indent_step
}

/// Median positive Δy between consecutive same-page lines, per page.
fn median_spacing_per_page(lines: &[PageLine]) -> HashMap<u32, f32> {
    let mut gaps: HashMap<u32, Vec<f32>> = HashMap::new();
    for pair in lines.windows(2) {
        if pair[0].page == pair[1].page {
            let dy = pair[0].y - pair[1].y;
            if dy > 0.0 {
                gaps.entry(pair[1].page).or_default().push(dy);
            }
        }
    }
    gaps.into_iter()
        .map(|(page, mut values)| {
            values.sort_by(f32::total_cmp);
            let mid = values.len() / 2;
            let median = if values.len() % 2 == 1 {
                values[mid]
            } else {
                (values[mid - 1] + values[mid]) / 2.0
            };
            (page, median)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::normalize::normalized_form;

    fn slice(lines: Vec<PageLine>) -> SectionSlice {
        SectionSlice {
            header: "Scope".to_string(),
            normalized_header: normalized_form("Scope"),
            lines,
        }
    }

    fn line_at(text: &str, x: f32, y: f32, page: u32) -> PageLine {
        PageLine {
            page,
            text: text.to_string(),
            x,
            y,
            height: 11.0,
            page_height: 842.0,
        }
    }

    fn line(text: &str, y: f32) -> PageLine {
        line_at(text, 40.0, y, 1)
    }

    fn parse(lines: Vec<PageLine>) -> ParsedSection {
        parse_section(&slice(lines), Side::Base, &TuningConfig::default())
    }

    #[test]
    fn test_root_clauses_in_document_order() {
        let parsed = parse(vec![
            line("1. First clause.", 700.0),
            line("2. Second clause.", 688.0),
        ]);
        let ids: Vec<&str> = parsed.clauses.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["1", "2"]);
        assert_eq!(parsed.start_paragraph.as_deref(), Some("1"));
        assert_eq!(parsed.end_paragraph.as_deref(), Some("2"));
    }

    #[test]
    fn test_marker_hierarchy_levels() {
        let parsed = parse(vec![
            line("2. Root clause text.", 700.0),
            line_at("(a) Letter marker.", 56.0, 688.0, 1),
            line_at("(i) Roman marker.", 72.0, 676.0, 1),
            line_at("(3) Nested numeric.", 88.0, 664.0, 1),
        ]);
        let by_id: HashMap<&str, &ClauseNode> =
            parsed.clauses.iter().map(|c| (c.id.as_str(), c)).collect();
        assert_eq!(by_id["2"].level, 1);
        assert_eq!(by_id["2(a)"].level, 2);
        assert_eq!(by_id["2(a)"].parent_id.as_deref(), Some("2"));
        assert_eq!(by_id["2(a)(i)"].level, 3);
        assert_eq!(by_id["2(a)(i)"].parent_id.as_deref(), Some("2(a)"));
        assert_eq!(by_id["2(a)(i)(3)"].level, 4);
        assert_eq!(by_id["2(a)(i)(3)"].parent_id.as_deref(), Some("2(a)(i)"));
    }

    #[test]
    fn test_roman_token_without_letter_parent_is_a_letter() {
        let parsed = parse(vec![
            line("5. Root.", 700.0),
            line_at("(i) First marker under the root.", 56.0, 688.0, 1),
        ]);
        let marker = &parsed.clauses[1];
        assert_eq!(marker.id, "5(i)");
        assert_eq!(marker.level, 2);
        assert_eq!(marker.parent_id.as_deref(), Some("5"));
    }

    #[test]
    fn test_sibling_marker_truncates_stack() {
        let parsed = parse(vec![
            line("3. Root.", 700.0),
            line_at("(a) First.", 56.0, 688.0, 1),
            line_at("(i) Under a.", 72.0, 676.0, 1),
            line_at("(b) Second letter resets the roman chain.", 56.0, 664.0, 1),
            line_at("(i) Under b.", 72.0, 652.0, 1),
        ]);
        let ids: Vec<&str> = parsed.clauses.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["3", "3(a)", "3(a)(i)", "3(b)", "3(b)(i)"]);
    }

    #[test]
    fn test_continuation_line_joined_with_space() {
        let parsed = parse(vec![
            line("4. An entity shall disclose", 700.0),
            line("information about obligations.", 688.0),
        ]);
        assert_eq!(parsed.clauses.len(), 1);
        assert_eq!(
            parsed.clauses[0].text_preserved,
            "4. An entity shall disclose information about obligations."
        );
        assert_eq!(parsed.clauses[0].source_line_count, 2);
    }

    #[test]
    fn test_soft_hyphen_join_heals_word() {
        let parsed = parse(vec![
            line("4. Regulatory obli-", 700.0),
            line("gations apply.", 689.0),
        ]);
        assert!(parsed.clauses[0].text_preserved.contains("obligations apply."));
    }

    #[test]
    fn test_wide_gap_becomes_paragraph_break_with_indent() {
        // Median spacing is 11; the 40-unit gap is a paragraph break, and
        // the indented line keeps its indent relative to the clause.
        let parsed = parse(vec![
            line("6. Lead-in text", 700.0),
            line("continuing the sentence here", 689.0),
            line("and one more continuation line", 678.0),
            line_at("Note carried below the clause", 56.0, 638.0, 1),
        ]);
        assert_eq!(parsed.clauses.len(), 1);
        let text = &parsed.clauses[0].text_preserved;
        assert!(text.contains("\n  Note carried below the clause"), "got: {text:?}");
    }

    #[test]
    fn test_page_change_breaks_line() {
        let parsed = parse(vec![
            line_at("7. Spans two pages", 40.0, 60.0, 1),
            line_at("second page text", 40.0, 780.0, 2),
        ]);
        assert_eq!(parsed.clauses[0].page_start, 1);
        assert_eq!(parsed.clauses[0].page_end, 2);
        assert!(parsed.clauses[0].text_preserved.contains('\n'));
    }

    #[test]
    fn test_bare_label_then_body() {
        let parsed = parse(vec![
            line("25", 700.0),
            line("The entity shall apply this standard.", 689.0),
        ]);
        assert_eq!(parsed.clauses.len(), 1);
        assert_eq!(parsed.clauses[0].id, "25");
        assert!(
            parsed.clauses[0]
                .text_preserved
                .starts_with("25\n")
        );
        assert!(parsed.clauses[0].text_preserved.contains("The entity shall"));
    }

    #[test]
    fn test_unmatched_lines_become_synthetic_clause() {
        let parsed = parse(vec![
            line("Narrative preamble first line", 700.0),
            line("narrative preamble second line", 689.0),
            line("8. Real clause.", 678.0),
        ]);
        assert_eq!(parsed.clauses.len(), 2);
        let synthetic = &parsed.clauses[0];
        assert!(synthetic.synthetic);
        assert_eq!(synthetic.id, "__unmatched_1");
        assert_eq!(synthetic.source_line_count, 2);
        assert_eq!(parsed.issues.len(), 1);
        assert_eq!(parsed.issues[0].flags, vec![ExtractionFlag::Unmatched]);
        assert_eq!(parsed.start_paragraph.as_deref(), Some("8"));
    }

    #[test]
    fn test_marker_without_root_is_malformed() {
        let parsed = parse(vec![
            line("(a) Orphan marker line", 700.0),
            line("9. Root after.", 689.0),
        ]);
        let synthetic = &parsed.clauses[0];
        assert!(synthetic.synthetic);
        assert!(parsed.issues[0].flags.contains(&ExtractionFlag::Malformed));
    }

    #[test]
    fn test_duplicate_ids_emit_one_issue_each() {
        let parsed = parse(vec![
            line("1. First version.", 700.0),
            line("1. Duplicate version.", 688.0),
            line("2. Unique.", 676.0),
        ]);
        let duplicate_issues: Vec<_> = parsed
            .issues
            .iter()
            .filter(|i| i.flags.contains(&ExtractionFlag::Duplicate))
            .collect();
        assert_eq!(duplicate_issues.len(), 2);
        assert!(duplicate_issues.iter().all(|i| i.key == "1"));
    }

    #[test]
    fn test_coverage_accounts_for_every_line() {
        let parsed = parse(vec![
            line("unlabelled preamble text", 700.0),
            line("1. Clause.", 689.0),
            line("continuation", 678.0),
        ]);
        let cov = parsed.coverage;
        assert_eq!(cov.total_lines, 3);
        assert_eq!(cov.mapped_lines + cov.unmatched_lines, cov.total_lines);
        assert_eq!(cov.percent, 100.0);
    }
}
