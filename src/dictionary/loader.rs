// Dictionary loader - parses the sectioned dictionary file into a Dictionary
//
// File layout:
//   ===== word         (default block, key=value lines)
//   ===== regex        (pattern=replacement lines)
//   ===== ignore       (one literal per line)
//   ===== ignoreRegex  (one pattern per line)
//   ===== ignoreCheck  (one token per line)

use super::{Dictionary, DictionaryError, IgnoreRegexEntry, RegexEntry};
use crate::codec;
use std::fs::{self, File};
use std::path::Path;

/// Minimum run of `=` that starts a section marker
pub const SECTION_MARKER: &str = "=====";

/// Kind of entries a block of lines holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockType {
    Word,
    Regex,
    Ignore,
    IgnoreRegex,
    IgnoreCheck,
}

/// Recognised section labels, matched after ASCII-lowercasing
const SECTION_ALIASES: &[(&str, BlockType)] = &[
    ("word", BlockType::Word),
    ("words", BlockType::Word),
    ("文本", BlockType::Word),
    ("regex", BlockType::Regex),
    ("reg", BlockType::Regex),
    ("正则", BlockType::Regex),
    ("ignore", BlockType::Ignore),
    ("忽略", BlockType::Ignore),
    ("ignoreregex", BlockType::IgnoreRegex),
    ("ignorereg", BlockType::IgnoreRegex),
    ("忽略正则", BlockType::IgnoreRegex),
    ("ignorecheck", BlockType::IgnoreCheck),
    ("忽略检测", BlockType::IgnoreCheck),
];

impl BlockType {
    /// Look up a section label in the alias table
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim().to_ascii_lowercase();
        SECTION_ALIASES
            .iter()
            .find(|(alias, _)| *alias == label)
            .map(|(_, block)| *block)
    }
}

/// Error types for dictionary loading
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoadError {
    /// Failed to read the dictionary file
    #[error("Failed to read dictionary: {0}")]
    Io(String),
    /// A regex or ignoreRegex line does not compile
    #[error("Invalid pattern on line {line} ({pattern}): {reason}")]
    InvalidPattern {
        line: usize,
        pattern: String,
        reason: String,
    },
    /// A literal key appears twice
    #[error("Duplicate key on line {line}: {key}")]
    DuplicateKey { line: usize, key: String },
}

/// Label of a section marker line, or None for ordinary lines
fn section_label(line: &str) -> Option<&str> {
    if line.starts_with(SECTION_MARKER) {
        Some(line.trim_start_matches('=').trim())
    } else {
        None
    }
}

/// Parse dictionary text
pub fn load_str(content: &str) -> Result<Dictionary, LoadError> {
    let mut dictionary = Dictionary::new();
    let mut block = BlockType::Word;

    for (idx, raw) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim_start_matches('\u{feff}').trim();

        if let Some(label) = section_label(line) {
            match BlockType::from_label(label) {
                Some(next) => block = next,
                None => crate::warn!(
                    "[Loader] Unknown section '{}' on line {}, staying in {:?} block",
                    label,
                    line_no,
                    block
                ),
            }
            continue;
        }

        if line.is_empty() {
            continue;
        }

        match block {
            BlockType::Ignore => dictionary.push_ignore(line),
            BlockType::IgnoreCheck => dictionary.push_ignore_check(line),
            BlockType::IgnoreRegex => {
                let entry =
                    IgnoreRegexEntry::new(line).map_err(|e| LoadError::InvalidPattern {
                        line: line_no,
                        pattern: line.to_string(),
                        reason: e.to_string(),
                    })?;
                dictionary.push_ignore_regex(entry);
            }
            BlockType::Word | BlockType::Regex => {
                let Some((key, value)) = codec::decode_line(line) else {
                    crate::debug!("[Loader] Skipping undecodable line {}", line_no);
                    continue;
                };
                if key.is_empty() || value.is_empty() {
                    crate::debug!("[Loader] Skipping line {} with empty key or value", line_no);
                    continue;
                }

                if block == BlockType::Regex {
                    let entry = RegexEntry::new(&key, value).map_err(|e| {
                        LoadError::InvalidPattern {
                            line: line_no,
                            pattern: key.clone(),
                            reason: e.to_string(),
                        }
                    })?;
                    dictionary.push_regex(entry);
                } else {
                    dictionary
                        .insert_word(key, value)
                        .map_err(|DictionaryError::DuplicateKey(key)| LoadError::DuplicateKey {
                            line: line_no,
                            key,
                        })?;
                }
            }
        }
    }

    Ok(dictionary)
}

/// Load the dictionary file at `path`.
///
/// A missing file is created empty and yields an empty dictionary.
pub fn load(path: &Path) -> Result<Dictionary, LoadError> {
    crate::debug!("[Loader] Loading dictionary from {:?}", path);

    if !path.exists() {
        crate::info!("[Loader] No dictionary file at {:?}, creating an empty one", path);
        create_empty(path);
        return Ok(Dictionary::new());
    }

    let bytes = fs::read(path).map_err(|e| LoadError::Io(format!("{}: {}", path.display(), e)))?;
    let content = String::from_utf8_lossy(&bytes);
    let dictionary = load_str(&content)?;

    crate::info!(
        "[Loader] Loaded {} words, {} regexes, {} ignores, {} ignore regexes, {} ignore checks",
        dictionary.words().len(),
        dictionary.regexes().len(),
        dictionary.ignores().len(),
        dictionary.ignore_regexes().len(),
        dictionary.ignore_check_count()
    );
    Ok(dictionary)
}

fn create_empty(path: &Path) {
    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            crate::warn!("[Loader] Failed to create {:?}: {}", parent, e);
            return;
        }
    }
    if let Err(e) = File::create(path) {
        crate::warn!("[Loader] Failed to create {:?}: {}", path, e);
    }
}

#[cfg(test)]
#[path = "loader_test.rs"]
mod tests;
