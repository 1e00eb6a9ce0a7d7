// Dictionary store - in-memory tables for one generation of the dictionary file
// A Dictionary is built once by the loader and then only read; reloads build a
// fresh Dictionary and swap it into SharedDictionary.

use parking_lot::RwLock;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A literal word mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordEntry {
    /// Text to look for (whole-word)
    pub key: String,
    /// Replacement text
    pub value: String,
}

/// A regex mapping applied with `replace_all`
#[derive(Debug, Clone)]
pub struct RegexEntry {
    /// Compiled pattern
    pub pattern: Regex,
    /// Replacement template, may reference capture groups (`$1`, `${name}`)
    pub replacement: String,
}

impl RegexEntry {
    /// Compile a new regex entry
    pub fn new(pattern: &str, replacement: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            replacement: replacement.into(),
        })
    }

    /// True when the pattern source is anchored at both ends (`^...$`).
    /// A hit from such a pattern means the whole string was rewritten.
    pub fn is_anchored(&self) -> bool {
        let source = self.pattern.as_str();
        source.starts_with('^') && source.ends_with('$')
    }
}

/// A pattern that exempts an entire string from translation
#[derive(Debug, Clone)]
pub struct IgnoreRegexEntry {
    source: String,
    whole: Regex,
}

impl IgnoreRegexEntry {
    /// Compile a pattern that must match the entire input
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        // Validate the pattern as written so errors point at the user's text
        Regex::new(pattern)?;
        Ok(Self {
            source: pattern.to_string(),
            whole: Regex::new(&format!("^(?:{})$", pattern))?,
        })
    }

    /// The pattern as it appeared in the dictionary file
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether the pattern matches `text` in its entirety
    pub fn matches_whole(&self, text: &str) -> bool {
        self.whole.is_match(text)
    }
}

/// Error types for dictionary construction
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DictionaryError {
    /// Literal key inserted twice
    #[error("Duplicate dictionary key: {0}")]
    DuplicateKey(String),
}

/// One generation of dictionary tables
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    /// Word entries in file order
    words: Vec<WordEntry>,
    /// Key -> position in `words`
    word_index: HashMap<String, usize>,
    /// Regex entries in file order
    regexes: Vec<RegexEntry>,
    /// Whole-word literals that shield spans from word matching
    ignores: Vec<String>,
    /// Whole-string patterns that skip translation entirely
    ignore_regexes: Vec<IgnoreRegexEntry>,
    /// Letter runs that never count as unresolved
    ignore_checks: HashSet<String>,
}

impl Dictionary {
    /// Create an empty dictionary
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a literal word mapping; keys must be unique
    pub fn insert_word(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), DictionaryError> {
        let key = key.into();
        if self.word_index.contains_key(&key) {
            return Err(DictionaryError::DuplicateKey(key));
        }
        self.word_index.insert(key.clone(), self.words.len());
        self.words.push(WordEntry {
            key,
            value: value.into(),
        });
        Ok(())
    }

    pub fn push_regex(&mut self, entry: RegexEntry) {
        self.regexes.push(entry);
    }

    pub fn push_ignore(&mut self, literal: impl Into<String>) {
        self.ignores.push(literal.into());
    }

    pub fn push_ignore_regex(&mut self, entry: IgnoreRegexEntry) {
        self.ignore_regexes.push(entry);
    }

    pub fn push_ignore_check(&mut self, token: impl Into<String>) {
        self.ignore_checks.insert(token.into());
    }

    /// Exact lookup of a literal key
    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.word_index
            .get(key)
            .map(|&idx| self.words[idx].value.as_str())
    }

    pub fn words(&self) -> &[WordEntry] {
        &self.words
    }

    pub fn regexes(&self) -> &[RegexEntry] {
        &self.regexes
    }

    pub fn ignores(&self) -> &[String] {
        &self.ignores
    }

    pub fn ignore_regexes(&self) -> &[IgnoreRegexEntry] {
        &self.ignore_regexes
    }

    /// Whether a letter run is exempt from failure detection
    pub fn is_ignore_check(&self, token: &str) -> bool {
        self.ignore_checks.contains(token)
    }

    pub fn ignore_check_count(&self) -> usize {
        self.ignore_checks.len()
    }

    /// True when no table has any entry
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
            && self.regexes.is_empty()
            && self.ignores.is_empty()
            && self.ignore_regexes.is_empty()
            && self.ignore_checks.is_empty()
    }
}

/// Shared, swappable handle to the current dictionary generation.
///
/// Readers take an `Arc` snapshot and keep using it for the whole resolution,
/// so a concurrent reload never exposes a half-built table.
#[derive(Debug, Default)]
pub struct SharedDictionary {
    current: RwLock<Arc<Dictionary>>,
    generation: AtomicU64,
}

impl SharedDictionary {
    /// Wrap an initial generation
    pub fn new(dictionary: Dictionary) -> Self {
        Self {
            current: RwLock::new(Arc::new(dictionary)),
            generation: AtomicU64::new(0),
        }
    }

    /// The current generation
    pub fn snapshot(&self) -> Arc<Dictionary> {
        self.current.read().clone()
    }

    /// Install a new generation, returning its generation number
    pub fn replace(&self, dictionary: Dictionary) -> u64 {
        let next = Arc::new(dictionary);
        *self.current.write() = next;
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Number of replacements since construction
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
