//! Text normalization shared by the footer filter and section finder.

use unicode_normalization::UnicodeNormalization;

/// Canonical comparison form of a line: NFKC, curly quotes and dash
/// variants unified, whitespace collapsed, lowercased.
pub(crate) fn normalized_form(text: &str) -> String {
    let unified: String = text
        .nfkc()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' => '\'',
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' => '"',
            '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2014}' | '\u{2015}' => '-',
            '\u{00A0}' => ' ',
            other => other,
        })
        .collect();
    collapse_whitespace(&unified).to_lowercase()
}

/// Collapse every run of whitespace to a single space and trim the ends.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
