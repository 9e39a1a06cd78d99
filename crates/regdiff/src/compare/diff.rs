//! Word, sentence, and paragraph diffs with whitespace-noise suppression.

use similar::{ChangeTag, TextDiff};

use crate::types::{DiffKind, DiffToken};

/// Fixed explanation carried by ambiguous rows in place of a diff.
pub(crate) const AMBIGUOUS_EXPLANATION: &str =
    "This clause identifier appears more than once on at least one side; the texts were not compared.";

fn kind_of(tag: ChangeTag) -> DiffKind {
    match tag {
        ChangeTag::Equal => DiffKind::Equal,
        ChangeTag::Delete => DiffKind::Removed,
        ChangeTag::Insert => DiffKind::Added,
    }
}

/// Collapse runs of spaces and tabs to single spaces; newlines survive.
fn normalize_horizontal_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_run = false;
    for c in text.chars() {
        if c == ' ' || c == '\t' {
            if !in_run {
                out.push(' ');
            }
            in_run = true;
        } else {
            in_run = false;
            out.push(c);
        }
    }
    out
}

/// Word-granularity diff.
///
/// The raw token stream is cleaned up in three passes: adjacent
/// removed/added pairs that differ only in horizontal whitespace become a
/// single equal token, whitespace-only tokens are never reported as
/// changes, and same-kind neighbours merge.
pub(crate) fn word_diff(base: &str, compared: &str) -> Vec<DiffToken> {
    let diff = TextDiff::from_words(base, compared);
    let raw: Vec<DiffToken> = diff
        .iter_all_changes()
        .map(|change| DiffToken::new(kind_of(change.tag()), change.value()))
        .collect();

    let collapsed = collapse_whitespace_noise(raw);
    let relabelled: Vec<DiffToken> = collapsed
        .into_iter()
        .map(|token| {
            if token.kind != DiffKind::Equal && token.value.chars().all(char::is_whitespace) {
                DiffToken::new(DiffKind::Equal, token.value)
            } else {
                token
            }
        })
        .collect();
    merge_adjacent(relabelled, "")
}

/// Merge opposite-kind neighbour pairs whose values agree modulo
/// horizontal whitespace.
fn collapse_whitespace_noise(tokens: Vec<DiffToken>) -> Vec<DiffToken> {
    let mut out: Vec<DiffToken> = Vec::with_capacity(tokens.len());
    let mut iter = tokens.into_iter().peekable();
    while let Some(token) = iter.next() {
        let pair = matches!(
            (token.kind, iter.peek().map(|t| t.kind)),
            (DiffKind::Removed, Some(DiffKind::Added)) | (DiffKind::Added, Some(DiffKind::Removed))
        );
        if pair {
            let next = iter.peek().unwrap();
            if normalize_horizontal_whitespace(&token.value) == normalize_horizontal_whitespace(&next.value) {
                let next = iter.next().unwrap();
                // Keep the compared-side spelling of the run.
                let kept = if next.kind == DiffKind::Added { next.value } else { token.value };
                out.push(DiffToken::new(DiffKind::Equal, kept));
                continue;
            }
        }
        out.push(token);
    }
    out
}

fn merge_adjacent(tokens: Vec<DiffToken>, joiner: &str) -> Vec<DiffToken> {
    let mut out: Vec<DiffToken> = Vec::with_capacity(tokens.len());
    for token in tokens {
        match out.last_mut() {
            Some(last) if last.kind == token.kind => {
                last.value.push_str(joiner);
                last.value.push_str(&token.value);
            }
            _ => out.push(token),
        }
    }
    out
}

/// Sentence-granularity diff.
pub(crate) fn sentence_diff(base: &str, compared: &str) -> Vec<DiffToken> {
    if normalize_horizontal_whitespace(base) == normalize_horizontal_whitespace(compared) {
        return vec![DiffToken::new(DiffKind::Equal, compared)];
    }
    let base_sentences = split_sentences(base);
    let compared_sentences = split_sentences(compared);
    let diff = TextDiff::from_slices(&base_sentences, &compared_sentences);
    let tokens: Vec<DiffToken> = diff
        .iter_all_changes()
        .map(|change| DiffToken::new(kind_of(change.tag()), change.value().to_string()))
        .collect();
    merge_adjacent(tokens, "")
}

/// Paragraph-granularity diff over trimmed lines.
pub(crate) fn paragraph_diff(base: &str, compared: &str) -> Vec<DiffToken> {
    if normalize_horizontal_whitespace(base) == normalize_horizontal_whitespace(compared)
        || base.trim() == compared.trim()
    {
        return vec![DiffToken::new(DiffKind::Equal, compared)];
    }
    let base_lines: Vec<&str> = base.lines().map(str::trim).collect();
    let compared_lines: Vec<&str> = compared.lines().map(str::trim).collect();
    let diff = TextDiff::from_slices(&base_lines, &compared_lines);
    let tokens: Vec<DiffToken> = diff
        .iter_all_changes()
        .map(|change| DiffToken::new(kind_of(change.tag()), change.value().to_string()))
        .collect();

    if tokens.iter().all(|t| t.kind == DiffKind::Equal) {
        // The inputs differ only in layout the line diff cannot see.
        return vec![
            DiffToken::new(DiffKind::Removed, base),
            DiffToken::new(DiffKind::Added, compared),
        ];
    }
    merge_adjacent(tokens, "\n")
}

/// Split text into sentences, each carrying its trailing whitespace so the
/// pieces concatenate back to the input.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let bytes = text.as_bytes();
    let mut start = 0;
    let mut idx = 0;
    while idx < bytes.len() {
        let c = bytes[idx];
        idx += 1;
        if matches!(c, b'.' | b'!' | b'?') {
            while idx < bytes.len() && bytes[idx].is_ascii_whitespace() {
                idx += 1;
            }
            sentences.push(&text[start..idx]);
            start = idx;
        }
    }
    if start < text.len() {
        sentences.push(&text[start..]);
    }
    sentences
}
