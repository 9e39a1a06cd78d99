//! Repeated page-furniture removal.
//!
//! Footers are dropped on two grounds: membership in a closed set of
//! known phrases (page numbers, issuer boilerplate), or reappearance of
//! the same signature in the footer band of two or more pages. Body text
//! that merely sits low on one page survives both tests.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::config::TuningConfig;
use crate::extract::labels;
use crate::extract::normalize::normalized_form;
use crate::extract::sections::is_canonical_header;
use crate::types::PageLine;

/// Longest line still considered for the repeat-signature test.
const MAX_CANDIDATE_CHARS: usize = 140;
/// Minimum signature length and token count for a repeat candidate; short
/// strings repeat across pages by coincidence.
const MIN_SIGNATURE_CHARS: usize = 12;
const MIN_SIGNATURE_TOKENS: usize = 2;

static BARE_PAGE_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{1,4}$").unwrap());
static PAGE_OF_N_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:page \d{1,4}|p\.? ?\d{1,4}|\d{1,4} of \d{1,4}|\d{1,4} ?/ ?\d{1,4})$").unwrap()
});
static PAGE_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"page \d{1,4}|p\.? ?\d{1,4}|\d{1,4} of \d{1,4}|\d{1,4} ?/ ?\d{1,4}|\b\d{1,4}\b").unwrap()
});

/// Issuer and boilerplate phrases that identify page furniture wherever
/// they appear in a footer-band line.
const KNOWN_FOOTER_PHRASES: &[&str] = &[
    "copyright",
    "all rights reserved",
    "ifrs foundation",
    "issb",
    "ifrs s2",
    "climate-related disclosures",
    "australian accounting standards board",
    "aasb",
    "aasb s2",
    "exposure draft",
    "issued",
];

/// Drop repeated page furniture from the assembled line stream.
pub(crate) fn filter_footers(lines: Vec<PageLine>, config: &TuningConfig) -> Vec<PageLine> {
    let repeated = repeated_signatures(&lines, config);

    let before = lines.len();
    let kept: Vec<PageLine> = lines
        .into_iter()
        .filter(|line| !should_drop(line, &repeated, config))
        .collect();
    if kept.len() != before {
        tracing::debug!(dropped = before - kept.len(), "footer filter: removed page furniture");
    }
    kept
}

fn should_drop(line: &PageLine, repeated: &HashSet<String>, config: &TuningConfig) -> bool {
    if !in_footer_band(line, config) {
        return false;
    }
    let normalized = normalized_form(&line.text);
    if is_canonical_header(&normalized) {
        return false;
    }
    if is_known_footer_phrase(&normalized) {
        return true;
    }
    matches!(candidate_signature(line, config), Some(sig) if repeated.contains(&sig))
}

fn in_footer_band(line: &PageLine, config: &TuningConfig) -> bool {
    line.y <= config.footer_band * line.page_height
}

fn is_known_footer_phrase(normalized: &str) -> bool {
    if BARE_PAGE_NUMBER_RE.is_match(normalized) || PAGE_OF_N_RE.is_match(normalized) {
        return true;
    }
    KNOWN_FOOTER_PHRASES.iter().any(|phrase| normalized.contains(phrase))
}

/// Signature of a repeat-footer candidate, or `None` when the line does
/// not qualify for the repeat test.
fn candidate_signature(line: &PageLine, config: &TuningConfig) -> Option<String> {
    if !in_footer_band(line, config) || line.text.len() > MAX_CANDIDATE_CHARS {
        return None;
    }
    if labels::is_clause_start(&line.text) {
        return None;
    }
    let lowered = line.text.to_lowercase();
    let stripped = PAGE_TOKEN_RE.replace_all(&lowered, " ");
    if stripped.split_whitespace().count() < MIN_SIGNATURE_TOKENS {
        return None;
    }
    let signature: String = stripped.chars().filter(|c| c.is_alphanumeric()).collect();
    (signature.len() >= MIN_SIGNATURE_CHARS).then_some(signature)
}

/// Pass 1: signatures whose footer-band occurrences span two or more pages.
fn repeated_signatures(lines: &[PageLine], config: &TuningConfig) -> HashSet<String> {
    let mut pages_by_signature: HashMap<String, HashSet<u32>> = HashMap::new();
    for line in lines {
        if let Some(sig) = candidate_signature(line, config) {
            pages_by_signature.entry(sig).or_default().insert(line.page);
        }
    }
    pages_by_signature
        .into_iter()
        .filter(|(_, pages)| pages.len() >= 2)
        .map(|(sig, _)| sig)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn footer_line(text: &str, page: u32) -> PageLine {
        PageLine {
            page,
            text: text.to_string(),
            x: 40.0,
            y: 30.0,
            height: 9.0,
            page_height: 842.0,
        }
    }

    fn body_line(text: &str, page: u32) -> PageLine {
        PageLine {
            page,
            text: text.to_string(),
            x: 40.0,
            y: 400.0,
            height: 11.0,
            page_height: 842.0,
        }
    }

    fn run(lines: Vec<PageLine>) -> Vec<String> {
        filter_footers(lines, &TuningConfig::default())
            .into_iter()
            .map(|l| l.text)
            .collect()
    }

    #[test]
    fn test_known_phrase_dropped_even_on_one_page() {
        let kept = run(vec![
            body_line("1. Body text.", 1),
            footer_line("\u{00A9} IFRS Foundation 2023", 1),
        ]);
        assert_eq!(kept, vec!["1. Body text."]);
    }

    #[test]
    fn test_bare_page_number_dropped() {
        let kept = run(vec![body_line("1. Body.", 3), footer_line("3", 3)]);
        assert_eq!(kept, vec!["1. Body."]);
    }

    #[test]
    fn test_page_of_n_forms_dropped() {
        let kept = run(vec![
            footer_line("Page 3 of 42", 3),
            footer_line("3/42", 3),
            footer_line("p. 3", 3),
            body_line("2. Kept.", 3),
        ]);
        assert_eq!(kept, vec!["2. Kept."]);
    }

    #[test]
    fn test_repeated_signature_across_pages_dropped() {
        let kept = run(vec![
            footer_line("Prudential Standard CPS 230 Operational Risk", 1),
            footer_line("Prudential Standard CPS 230 Operational Risk", 2),
            body_line("1. Body.", 1),
        ]);
        assert_eq!(kept, vec!["1. Body."]);
    }

    #[test]
    fn test_single_page_footer_lookalike_kept() {
        let kept = run(vec![
            footer_line("Closing provisions of the amending instrument", 1),
            body_line("1. Body.", 1),
        ]);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_body_text_outside_band_always_kept() {
        let kept = run(vec![
            body_line("issued for comment in 2023", 1),
            body_line("issued for comment in 2023", 2),
        ]);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_canonical_header_in_band_kept() {
        let kept = run(vec![footer_line("Scope", 1), footer_line("Scope", 2)]);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_clause_start_never_a_repeat_candidate() {
        let kept = run(vec![
            footer_line("12. Entities shall apply the standard annually", 1),
            footer_line("12. Entities shall apply the standard annually", 2),
        ]);
        assert_eq!(kept.len(), 2);
    }
}
