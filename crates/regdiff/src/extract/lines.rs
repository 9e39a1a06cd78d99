//! Line assembly from positioned fragments by Y-bucketing.

use std::collections::BTreeMap;

use crate::config::TuningConfig;
use crate::types::{PageLine, PositionedFragment};

/// Gap (in PDF units) below which adjacent fragments are glued directly.
const MIN_SPACE_GAP: f32 = 1.2;
/// Divisor turning a wide horizontal gap into a run of spaces.
const GAP_UNITS_PER_SPACE: f32 = 3.4;

const CLOSING_PUNCTUATION: &[char] = &[',', '.', ';', ':', '!', '?', ')', ']', '}', '%'];
const HYPHEN_LIKE: &[char] = &['-', '\u{2013}', '\u{2014}', '/'];
const OPENING_BRACKETS: &[char] = &['(', '[', '{'];

/// Group one page's fragments into visual lines.
///
/// Fragments are bucketed by `round(y / y_bucket)`; buckets are emitted in
/// descending Y order (top of the page first) and fragments within a bucket
/// are composed left to right. Exactly one line comes out per non-empty
/// bucket.
pub(crate) fn assemble_page_lines(
    page: u32,
    page_height: f32,
    fragments: Vec<PositionedFragment>,
    config: &TuningConfig,
) -> Vec<PageLine> {
    let mut buckets: BTreeMap<i64, Vec<PositionedFragment>> = BTreeMap::new();
    for fragment in fragments {
        if fragment.text.trim().is_empty() {
            continue;
        }
        let key = (fragment.y / config.y_bucket).round() as i64;
        buckets.entry(key).or_default().push(fragment);
    }

    let mut lines = Vec::with_capacity(buckets.len());
    for (_, mut bucket) in buckets.into_iter().rev() {
        bucket.sort_by(|a, b| a.x.total_cmp(&b.x));
        lines.push(compose_line(page, page_height, &bucket));
    }
    lines
}

/// Compose one line's text from its x-sorted fragments, inferring the
/// spacing that the glyph stream does not carry.
fn compose_line(page: u32, page_height: f32, fragments: &[PositionedFragment]) -> PageLine {
    let mut text = String::new();
    let mut previous_right_edge = 0.0_f32;

    for fragment in fragments {
        let piece = fragment.text.trim();
        if text.is_empty() {
            text.push_str(piece);
        } else {
            let gap = fragment.x - previous_right_edge;
            let separator = infer_separator(&text, piece, gap);
            text.push_str(&separator);
            text.push_str(piece);
        }
        previous_right_edge = fragment.x + fragment.width;
    }

    let x = fragments.iter().map(|f| f.x).fold(f32::INFINITY, f32::min);
    let y = fragments.iter().map(|f| f.y).sum::<f32>() / fragments.len() as f32;
    let height = fragments.iter().map(|f| f.height).fold(0.0_f32, f32::max);

    PageLine {
        page,
        text,
        x,
        y,
        height,
        page_height,
    }
}

/// Decide what goes between the composed text so far and the next token.
fn infer_separator(composed: &str, next: &str, gap: f32) -> String {
    let prev_char = composed.chars().next_back();
    let next_char = next.chars().next();

    let attach = next_char.is_some_and(|c| CLOSING_PUNCTUATION.contains(&c))
        || prev_char.is_some_and(|c| HYPHEN_LIKE.contains(&c))
        || next_char.is_some_and(|c| HYPHEN_LIKE.contains(&c))
        || prev_char.is_some_and(|c| OPENING_BRACKETS.contains(&c));
    if attach || gap <= MIN_SPACE_GAP {
        return String::new();
    }

    let word_boundary =
        prev_char.is_some_and(char::is_alphanumeric) && next_char.is_some_and(char::is_alphanumeric);
    if word_boundary {
        return " ".to_string();
    }

    let count = (gap / GAP_UNITS_PER_SPACE).round().max(1.0) as usize;
    " ".repeat(count)
}
