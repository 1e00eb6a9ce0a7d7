// Whole-word scanning - finds literal occurrences bounded by non-letters
//
// The boundary rule is ASCII-only: a hit is accepted when the byte before it
// and the byte after it (if any) are not ASCII letters. Multi-byte UTF-8
// sequences never contain ASCII bytes, so checking bytes is the same as
// checking the neighbouring characters.

use std::cmp::Ordering;

use crate::dictionary::WordEntry;

/// A whole-word occurrence of an ignore literal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreSpan<'a> {
    /// The ignore literal that produced this span
    pub text: &'a str,
    /// Byte offset of the occurrence
    pub index: usize,
    /// Byte length of the occurrence
    pub length: usize,
}

impl IgnoreSpan<'_> {
    /// Whether a position falls inside `[index, index + length)`
    pub fn contains(&self, position: usize) -> bool {
        position >= self.index && position < self.index + self.length
    }
}

/// A literal key occurrence that may be spliced into the string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchCandidate<'a> {
    pub key: &'a str,
    pub value: &'a str,
    /// Byte offset in the string the scan ran on
    pub index: usize,
    /// Byte length of `key`
    pub length: usize,
    /// The occurrence covers the whole string
    pub full_span: bool,
}

fn is_letter_at(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx).is_some_and(u8::is_ascii_alphabetic)
}

/// Whether `text[start..end]` is bounded by non-letters on both sides
pub fn is_whole_word(text: &str, start: usize, end: usize) -> bool {
    let bytes = text.as_bytes();
    let before_ok = start == 0 || !is_letter_at(bytes, start - 1);
    let after_ok = end >= bytes.len() || !is_letter_at(bytes, end);
    before_ok && after_ok
}

/// Byte offsets of every whole-word occurrence of `needle` in `text`.
///
/// Occurrences may overlap: each search resumes one character after the
/// previous hit.
pub fn whole_word_occurrences(text: &str, needle: &str) -> Vec<usize> {
    let mut hits = Vec::new();
    if needle.is_empty() {
        return hits;
    }

    let mut from = 0;
    while let Some(pos) = text[from..].find(needle) {
        let start = from + pos;
        if is_whole_word(text, start, start + needle.len()) {
            hits.push(start);
        }
        let step = text[start..].chars().next().map_or(1, char::len_utf8);
        from = start + step;
    }
    hits
}

/// Collect ignore spans for every ignore literal, in table order
pub fn ignore_spans<'a>(ignores: &'a [String], text: &str) -> Vec<IgnoreSpan<'a>> {
    ignores
        .iter()
        .flat_map(|literal| {
            whole_word_occurrences(text, literal)
                .into_iter()
                .map(move |index| IgnoreSpan {
                    text: literal.as_str(),
                    index,
                    length: literal.len(),
                })
        })
        .collect()
}

/// Collect word candidates, dropping those that start inside an ignore span.
///
/// Only the start position is tested against the spans; a candidate that
/// begins before a span and runs into it is kept.
pub fn candidates<'a>(
    words: &'a [WordEntry],
    spans: &[IgnoreSpan<'_>],
    text: &str,
) -> Vec<MatchCandidate<'a>> {
    let mut out = Vec::new();
    for word in words {
        for index in whole_word_occurrences(text, &word.key) {
            if let Some(span) = spans.iter().find(|span| span.contains(index)) {
                crate::trace!(
                    "[Resolver] '{}' at {} shielded by ignore '{}' at {}..{}",
                    word.key,
                    index,
                    span.text,
                    span.index,
                    span.index + span.length
                );
                continue;
            }

            let length = word.key.len();
            out.push(MatchCandidate {
                key: &word.key,
                value: &word.value,
                index,
                length,
                full_span: index == 0 && index + length == text.len(),
            });
        }
    }
    out
}

/// Application order: partial matches by position (longer first on ties),
/// full-span matches last. The sort is stable.
pub fn order_candidates(candidates: &mut [MatchCandidate<'_>]) {
    candidates.sort_by(|a, b| match (a.full_span, b.full_span) {
        (false, true) => Ordering::Less,
        (true, false) => Ordering::Greater,
        (true, true) => Ordering::Equal,
        (false, false) => a
            .index
            .cmp(&b.index)
            .then_with(|| b.length.cmp(&a.length)),
    });
}

#[cfg(test)]
#[path = "scan_test.rs"]
mod tests;
