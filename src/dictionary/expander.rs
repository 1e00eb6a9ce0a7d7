// Regex expander - applies the dictionary's regex block to a string
// Every entry is evaluated in file order; a hit replaces all matches.

use super::RegexEntry;

/// Result of running the regex block over a string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpansionResult {
    /// The text with all regex substitutions applied
    pub expanded_text: String,
    /// True if any anchored (`^...$`) entry matched
    pub fully_resolved: bool,
}

/// Expander that applies regex entries to text
pub struct RegexExpander<'a> {
    entries: &'a [RegexEntry],
}

impl<'a> RegexExpander<'a> {
    /// Create an expander over already-compiled entries
    pub fn new(entries: &'a [RegexEntry]) -> Self {
        Self { entries }
    }

    /// Apply all entries to the input text.
    ///
    /// An anchored hit marks the result fully resolved but does not stop the
    /// pass: later entries still rewrite the text.
    pub fn expand(&self, text: &str) -> ExpansionResult {
        let mut result = text.to_string();
        let mut fully_resolved = false;

        for entry in self.entries {
            if entry.pattern.is_match(&result) {
                result = entry
                    .pattern
                    .replace_all(&result, entry.replacement.as_str())
                    .into_owned();

                if entry.is_anchored() {
                    fully_resolved = true;
                }
            }
        }

        ExpansionResult {
            expanded_text: result,
            fully_resolved,
        }
    }
}

#[cfg(test)]
#[path = "expander_test.rs"]
mod tests;
