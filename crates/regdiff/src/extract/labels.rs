//! Clause label grammar.
//!
//! Root labels are bare or dotted numbers optionally carrying embedded
//! markers (`25`, `7.2`, `2(a)`); markers are parenthesised alphanumeric
//! tokens (`(a)`, `(ii)`, `(3)`). Either form may occupy a whole line or
//! lead a line of body text.

use std::sync::LazyLock;

use regex::Regex;

static ROOT_WITH_BODY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+(?:\.\d+)*(?:\([A-Za-z0-9]+\))*)[.)]?\s+(\S.*)$").unwrap());
static ROOT_ONLY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+(?:\.\d+)*(?:\([A-Za-z0-9]+\))*)[.)]?$").unwrap());
static MARKER_WITH_BODY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\(([A-Za-z0-9]+)\)\s+(\S.*)$").unwrap());
static MARKER_ONLY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\(([A-Za-z0-9]+)\)$").unwrap());
static ROMAN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[ivxlcdm]+$").unwrap());

/// A recognised clause label at the start of a trimmed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineLabel<'a> {
    RootWithBody { label: &'a str },
    RootOnly { label: &'a str },
    MarkerWithBody { token: &'a str },
    MarkerOnly { token: &'a str },
}

/// Classify a trimmed line against the label grammar.
pub(crate) fn classify(line: &str) -> Option<LineLabel<'_>> {
    if let Some(caps) = ROOT_ONLY_RE.captures(line) {
        return Some(LineLabel::RootOnly {
            label: caps.get(1).unwrap().as_str(),
        });
    }
    if let Some(caps) = MARKER_ONLY_RE.captures(line) {
        return Some(LineLabel::MarkerOnly {
            token: caps.get(1).unwrap().as_str(),
        });
    }
    if let Some(caps) = ROOT_WITH_BODY_RE.captures(line) {
        return Some(LineLabel::RootWithBody {
            label: caps.get(1).unwrap().as_str(),
        });
    }
    if let Some(caps) = MARKER_WITH_BODY_RE.captures(line) {
        return Some(LineLabel::MarkerWithBody {
            token: caps.get(1).unwrap().as_str(),
        });
    }
    None
}

pub(crate) fn is_clause_start(line: &str) -> bool {
    classify(line.trim()).is_some()
}

/// Whether a trimmed line opens (or is) a root clause.
pub(crate) fn is_root_clause(line: &str) -> bool {
    matches!(
        classify(line.trim()),
        Some(LineLabel::RootWithBody { .. } | LineLabel::RootOnly { .. })
    )
}

/// Whether a trimmed line is a label with no body text.
pub(crate) fn is_bare_label(line: &str) -> bool {
    matches!(
        classify(line.trim()),
        Some(LineLabel::RootOnly { .. } | LineLabel::MarkerOnly { .. })
    )
}

/// Whether a marker token reads as a lowercase roman numeral.
pub(crate) fn is_roman(token: &str) -> bool {
    ROMAN_RE.is_match(token)
}

pub(crate) fn is_numeric(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_digit())
}

/// Canonical form of a label: trimmed, internal whitespace stripped,
/// trailing dot dropped, lowercased.
pub(crate) fn normalize_label(label: &str) -> String {
    let compact: String = label.chars().filter(|c| !c.is_whitespace()).collect();
    compact.trim_end_matches('.').to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_with_body() {
        assert_eq!(
            classify("25. The entity shall disclose"),
            Some(LineLabel::RootWithBody { label: "25" })
        );
        assert_eq!(
            classify("2(a) Institutions must retain records"),
            Some(LineLabel::RootWithBody { label: "2(a)" })
        );
        assert_eq!(
            classify("7.2 Transitional relief applies"),
            Some(LineLabel::RootWithBody { label: "7.2" })
        );
    }

    #[test]
    fn test_root_label_only() {
        assert_eq!(classify("25"), Some(LineLabel::RootOnly { label: "25" }));
        assert_eq!(classify("25."), Some(LineLabel::RootOnly { label: "25" }));
        assert_eq!(classify("3)"), Some(LineLabel::RootOnly { label: "3" }));
    }

    #[test]
    fn test_marker_forms() {
        assert_eq!(
            classify("(a) where applicable"),
            Some(LineLabel::MarkerWithBody { token: "a" })
        );
        assert_eq!(classify("(ii)"), Some(LineLabel::MarkerOnly { token: "ii" }));
        assert_eq!(classify("(3)"), Some(LineLabel::MarkerOnly { token: "3" }));
    }

    #[test]
    fn test_plain_text_is_not_a_label() {
        assert_eq!(classify("The entity shall disclose"), None);
        assert_eq!(classify("see paragraph 12"), None);
        assert!(!is_clause_start("Objective"));
    }

    #[test]
    fn test_roman_and_numeric_tokens() {
        assert!(is_roman("i"));
        assert!(is_roman("xiv"));
        assert!(!is_roman("a"));
        assert!(!is_roman("IV"));
        assert!(is_numeric("12"));
        assert!(!is_numeric("a1"));
    }

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("25."), "25");
        assert_eq!(normalize_label(" 2 (A) "), "2(a)");
        assert_eq!(normalize_label("7.2"), "7.2");
    }
}
