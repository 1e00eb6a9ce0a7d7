//! Resolver: turns one input string into its translation using a dictionary
//! snapshot.
//!
//! The pipeline runs in a fixed order and stops as soon as the string is
//! fully resolved:
//! 1. ignore regexes that match the whole input return it untouched
//! 2. an exact literal key replaces the whole input
//! 3. every regex entry rewrites the string (anchored hits resolve it)
//! 4. ignore literals mark spans that word matching must not start in
//! 5. whole-word literal keys are collected as candidates
//! 6. candidates are spliced in position order, full-span ones last
//! 7. leftover ASCII letter runs are reported as unresolved tokens
//!
//! Resolution is pure: no I/O and no shared state beyond the snapshot.

mod scan;

pub use scan::{
    candidates, ignore_spans, is_whole_word, order_candidates, whole_word_occurrences,
    IgnoreSpan, MatchCandidate,
};

use crate::dictionary::{Dictionary, RegexExpander};

/// Outcome of resolving one input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// No unresolved tokens remain
    pub resolved: bool,
    /// Best-effort translation, also set when unresolved
    pub value: String,
    /// Letter runs nothing in the dictionary accounted for
    pub unresolved_tokens: Vec<String>,
}

impl Resolution {
    fn complete(value: String) -> Self {
        Self {
            resolved: true,
            value,
            unresolved_tokens: Vec::new(),
        }
    }
}

/// Resolve `original` against a dictionary snapshot
pub fn resolve(dictionary: &Dictionary, original: &str) -> Resolution {
    if let Some(entry) = dictionary
        .ignore_regexes()
        .iter()
        .find(|entry| entry.matches_whole(original))
    {
        crate::trace!("[Resolver] '{}' ignored by /{}/", original, entry.as_str());
        return Resolution::complete(original.to_string());
    }

    if let Some(value) = dictionary.lookup(original) {
        return Resolution::complete(value.to_string());
    }

    let expansion = RegexExpander::new(dictionary.regexes()).expand(original);
    let mut text = expansion.expanded_text;
    if expansion.fully_resolved {
        return Resolution::complete(text);
    }

    let spans = ignore_spans(dictionary.ignores(), &text);
    let mut found = candidates(dictionary.words(), &spans, &text);
    order_candidates(&mut found);

    if apply_candidates(&mut text, &found) {
        return Resolution::complete(text);
    }

    let unresolved_tokens = residual_tokens(dictionary, &spans, &text);
    Resolution {
        resolved: unresolved_tokens.is_empty(),
        value: text,
        unresolved_tokens,
    }
}

/// Splice ordered candidates into `text`.
///
/// Returns true once a full-span candidate is reached; nothing after it is
/// applied.
fn apply_candidates(text: &mut String, ordered: &[MatchCandidate<'_>]) -> bool {
    let mut offset: isize = 0;

    for candidate in ordered {
        match splice(text, candidate, offset) {
            Some(delta) => offset += delta,
            None => crate::trace!(
                "[Resolver] Dropping stale candidate '{}' at {}",
                candidate.key,
                candidate.index
            ),
        }

        if candidate.full_span {
            return true;
        }
    }
    false
}

/// Replace one candidate if the live string still holds its key at the
/// shifted position. Returns the length delta on success.
fn splice(text: &mut String, candidate: &MatchCandidate<'_>, offset: isize) -> Option<isize> {
    let start = candidate.index.checked_add_signed(offset)?;
    let end = start.checked_add(candidate.length)?;

    if text.get(start..end)? != candidate.key {
        return None;
    }

    text.replace_range(start..end, candidate.value);
    Some(candidate.value.len() as isize - candidate.key.len() as isize)
}

/// ASCII letter runs left in `text` that are neither ignore-check tokens nor
/// part of an ignore literal seen during the span scan
fn residual_tokens(dictionary: &Dictionary, spans: &[IgnoreSpan<'_>], text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_ascii_alphabetic())
        .filter(|run| !run.is_empty())
        .filter(|run| !dictionary.is_ignore_check(run))
        .filter(|run| !spans.iter().any(|span| span.text.contains(run)))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
