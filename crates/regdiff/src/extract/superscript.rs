//! Superscript glyph detection and reattachment.
//!
//! PDF extractors emit superscripts (footnote marks, exponents) as their
//! own tiny text runs, which the Y-bucketing then turns into stray lines.
//! This pass folds each one back into its host line as Unicode superscript
//! glyphs.

use std::collections::HashMap;

use crate::config::TuningConfig;
use crate::types::PageLine;

/// Max vertical distance between a superscript and its host line.
const MAX_HOST_DY: f32 = 9.0;
/// Horizontal distance is worth this much less than vertical distance when
/// ranking neighbour hosts.
const DX_WEIGHT: f32 = 140.0;
/// Neighbour offsets searched around a candidate, nearest first.
const NEIGHBOUR_OFFSETS: [i64; 4] = [-2, -1, 1, 2];
/// Longest text run still treated as a superscript.
const MAX_CANDIDATE_CHARS: usize = 2;

const CANDIDATE_CHARSET: &[char] = &[
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', '(', ')', '+', '\u{2212}', '=', 'n', 'i',
];

/// Fold superscript candidate lines into their hosts and drop them from
/// the stream. Candidates with no host within reach are left alone.
pub(crate) fn attach_superscripts(lines: Vec<PageLine>, config: &TuningConfig) -> Vec<PageLine> {
    let median_heights = median_height_per_page(&lines);
    let is_candidate: Vec<bool> = lines
        .iter()
        .map(|line| {
            median_heights
                .get(&line.page)
                .is_some_and(|&median| is_superscript_candidate(line, median, config))
        })
        .collect();

    // candidate index -> host index
    let mut attachments: Vec<(usize, usize)> = Vec::new();
    for (idx, line) in lines.iter().enumerate() {
        if !is_candidate[idx] {
            continue;
        }
        if let Some(host) = best_host(&lines, &is_candidate, idx, line) {
            attachments.push((idx, host));
        }
    }

    let mut appended: HashMap<usize, String> = HashMap::new();
    let mut attached: Vec<bool> = vec![false; lines.len()];
    for &(candidate, host) in &attachments {
        let compact: String = lines[candidate].text.split_whitespace().collect();
        appended.entry(host).or_default().push_str(&to_superscript(&compact));
        attached[candidate] = true;
    }
    if !attachments.is_empty() {
        tracing::debug!(count = attachments.len(), "superscript pass: folded candidate lines");
    }

    lines
        .into_iter()
        .enumerate()
        .filter(|(idx, _)| !attached[*idx])
        .map(|(idx, mut line)| {
            if let Some(suffix) = appended.get(&idx) {
                line.text.push_str(suffix);
            }
            line
        })
        .collect()
}

fn is_superscript_candidate(line: &PageLine, median_height: f32, config: &TuningConfig) -> bool {
    if line.height <= 0.0 || line.height >= config.superscript_height * median_height {
        return false;
    }
    let compact: String = line.text.split_whitespace().collect();
    !compact.is_empty()
        && compact.chars().count() <= MAX_CANDIDATE_CHARS
        && compact.chars().all(|c| CANDIDATE_CHARSET.contains(&c))
}

/// Same-page non-candidate neighbour minimising `|Δy| + |Δx| / 140`,
/// subject to `|Δy| ≤ 9`. Ties go to the smaller `|Δy|`.
fn best_host(lines: &[PageLine], is_candidate: &[bool], idx: usize, candidate: &PageLine) -> Option<usize> {
    let mut best: Option<(usize, f32, f32)> = None;
    for offset in NEIGHBOUR_OFFSETS {
        let neighbour_idx = idx as i64 + offset;
        if neighbour_idx < 0 || neighbour_idx as usize >= lines.len() {
            continue;
        }
        let neighbour_idx = neighbour_idx as usize;
        if is_candidate[neighbour_idx] {
            continue;
        }
        let neighbour = &lines[neighbour_idx];
        if neighbour.page != candidate.page {
            continue;
        }
        let dy = (neighbour.y - candidate.y).abs();
        if dy > MAX_HOST_DY {
            continue;
        }
        let score = dy + (neighbour.x - candidate.x).abs() / DX_WEIGHT;
        let better = match best {
            None => true,
            Some((_, best_score, best_dy)) => {
                score < best_score || (score == best_score && dy < best_dy)
            }
        };
        if better {
            best = Some((neighbour_idx, score, dy));
        }
    }
    best.map(|(host, _, _)| host)
}

/// Render text as Unicode superscript glyphs; a caret-prefixed literal is
/// the fallback for anything without a mapping.
fn to_superscript(text: &str) -> String {
    let mapped: Option<String> = text.chars().map(superscript_char).collect();
    match mapped {
        Some(glyphs) => glyphs,
        None => format!("^{text}"),
    }
}

fn superscript_char(c: char) -> Option<char> {
    Some(match c {
        '0' => '\u{2070}',
        '1' => '\u{00B9}',
        '2' => '\u{00B2}',
        '3' => '\u{00B3}',
        '4' => '\u{2074}',
        '5' => '\u{2075}',
        '6' => '\u{2076}',
        '7' => '\u{2077}',
        '8' => '\u{2078}',
        '9' => '\u{2079}',
        '+' => '\u{207A}',
        '\u{2212}' => '\u{207B}',
        '=' => '\u{207C}',
        '(' => '\u{207D}',
        ')' => '\u{207E}',
        'n' => '\u{207F}',
        'i' => '\u{2071}',
        _ => return None,
    })
}

fn median_height_per_page(lines: &[PageLine]) -> HashMap<u32, f32> {
    let mut heights: HashMap<u32, Vec<f32>> = HashMap::new();
    for line in lines {
        if line.height > 0.0 {
            heights.entry(line.page).or_default().push(line.height);
        }
    }
    heights
        .into_iter()
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

    fn line_with_height(text: &str, x: f32, y: f32, height: f32) -> PageLine {
        PageLine {
            page: 1,
            text: text.to_string(),
            x,
            y,
            height,
            page_height: 842.0,
        }
    }

    fn body(text: &str, y: f32) -> PageLine {
        line_with_height(text, 40.0, y, 11.0)
    }

    fn run(lines: Vec<PageLine>) -> Vec<String> {
        attach_superscripts(lines, &TuningConfig::default())
            .into_iter()
            .map(|l| l.text)
            .collect()
    }

    #[test]
    fn test_tiny_digit_folds_into_nearest_line() {
        let kept = run(vec![
            body("emissions in tCO", 700.0),
            line_with_height("2", 140.0, 698.0, 6.0),
            body("measured annually", 686.0),
            body("and reported", 672.0),
        ]);
        assert_eq!(kept.len(), 3);
        assert_eq!(kept[0], "emissions in tCO\u{00B2}");
    }

    #[test]
    fn test_equal_score_prefers_smaller_dy() {
        // Host A: dy 4, dx 0 -> score 4.0. Host B: dy 3, dx 140 -> score
        // 4.0. Equal scores resolve to the smaller vertical distance.
        let kept = run(vec![
            body("host a", 704.0),
            line_with_height("3", 40.0, 700.0, 6.0),
            line_with_height("host b", 180.0, 697.0, 11.0),
            body("padding line", 676.0),
        ]);
        assert_eq!(kept[0], "host a");
        assert_eq!(kept[1], "host b\u{00B3}");
    }

    #[test]
    fn test_candidate_too_far_vertically_kept() {
        let kept = run(vec![
            body("host line", 700.0),
            line_with_height("2", 40.0, 680.0, 6.0),
            body("another body line", 660.0),
        ]);
        assert_eq!(kept.len(), 3);
        assert_eq!(kept[1], "2");
    }

    #[test]
    fn test_normal_height_number_not_a_candidate() {
        let kept = run(vec![body("host line", 700.0), body("2", 698.0)]);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_long_text_not_a_candidate() {
        let kept = run(vec![body("host line", 700.0), line_with_height("123", 40.0, 698.0, 6.0)]);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_superscript_mapping() {
        assert_eq!(to_superscript("21"), "\u{00B2}\u{00B9}");
        assert_eq!(to_superscript("(n)"), "\u{207D}\u{207F}\u{207E}");
        assert_eq!(to_superscript("x7"), "^x7");
    }
}
