// Unresolved ledger - inputs the resolver could not fully translate
//
// Each line of the ledger file is `original=partial(token,token)`, both sides
// escaped with the line codec. The in-memory map is shared by every request
// thread; file writes go through a separate lock so readers of the map never
// wait on disk.

use crate::codec;
use crate::dictionary::Dictionary;
use crate::resolver::{self, Resolution};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;

/// One unresolved input and the best result seen for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    /// Input text as received
    pub original: String,
    /// Partial translation from the latest attempt
    pub partial: String,
    /// Letter runs that were left untranslated
    pub tokens: Vec<String>,
}

impl LedgerEntry {
    pub fn new(original: impl Into<String>, partial: impl Into<String>, tokens: Vec<String>) -> Self {
        Self {
            original: original.into(),
            partial: partial.into(),
            tokens,
        }
    }

    /// Build an entry from an unresolved resolution of `original`
    pub fn from_resolution(original: &str, resolution: &Resolution) -> Self {
        Self::new(
            original,
            resolution.value.clone(),
            resolution.unresolved_tokens.clone(),
        )
    }

    /// Value side of the ledger line: `partial(token,token)`
    fn summary(&self) -> String {
        format!("{}({})", self.partial, self.tokens.join(","))
    }

    /// Encode as one ledger line
    pub fn to_line(&self) -> String {
        codec::encode_line(&self.original, &self.summary())
    }

    /// Parse a ledger line; blank, undecodable or empty-sided lines yield None
    pub fn from_line(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let (original, value) = codec::decode_line(line)?;
        if original.is_empty() || value.is_empty() {
            return None;
        }

        let (partial, tokens) = split_summary(&value);
        Some(Self::new(original, partial, tokens))
    }
}

/// Split `partial(a,b)` at the last `(`; tokens never contain parentheses
fn split_summary(value: &str) -> (String, Vec<String>) {
    let parsed = value
        .strip_suffix(')')
        .and_then(|body| body.rfind('(').map(|open| (&body[..open], &body[open + 1..])));

    match parsed {
        Some((partial, tokens)) => (
            partial.to_string(),
            tokens
                .split(',')
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        None => (value.to_string(), Vec::new()),
    }
}

/// Error types for ledger operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LedgerError {
    /// Entries must have a non-empty original text
    #[error("Ledger entry original text cannot be empty")]
    EmptyOriginal,
    /// Failed to read the ledger file
    #[error("Failed to load ledger: {0}")]
    LoadError(String),
    /// Failed to write the ledger file
    #[error("Failed to persist ledger: {0}")]
    PersistenceError(String),
}

/// Counts from one reconciliation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    /// Entries removed because they now resolve
    pub resolved: usize,
    /// Entries still unresolved (refreshed in place)
    pub remaining: usize,
}

/// Thread-safe ledger of unresolved inputs
#[derive(Debug, Default)]
pub struct UnresolvedLedger {
    /// Entries keyed by original text
    entries: Mutex<BTreeMap<String, LedgerEntry>>,
    /// Serializes appends and flushes
    io_lock: Mutex<()>,
}

impl UnresolvedLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a ledger file; a missing file gives an empty ledger
    pub fn load(path: &Path) -> Result<Self, LedgerError> {
        let ledger = Self::new();
        ledger.replace_from(path)?;
        Ok(ledger)
    }

    /// Replace the in-memory entries with the contents of `path`
    pub fn replace_from(&self, path: &Path) -> Result<usize, LedgerError> {
        crate::debug!("[Ledger] Loading ledger from {:?}", path);
        let _io = self.io_lock.lock();

        let mut loaded = BTreeMap::new();
        if path.exists() {
            let bytes = fs::read(path)
                .map_err(|e| LedgerError::LoadError(format!("{}: {}", path.display(), e)))?;
            for line in String::from_utf8_lossy(&bytes).lines() {
                if let Some(entry) = LedgerEntry::from_line(line) {
                    loaded.insert(entry.original.clone(), entry);
                }
            }
        } else {
            crate::debug!("[Ledger] No ledger file found, starting empty");
        }

        let count = loaded.len();
        *self.entries.lock() = loaded;
        crate::info!("[Ledger] Loaded {} unresolved entries", count);
        Ok(count)
    }

    /// Insert or update an entry.
    ///
    /// Returns false without touching the ledger when the original is already
    /// present and `overwrite` is false.
    pub fn record(&self, entry: LedgerEntry, overwrite: bool) -> Result<bool, LedgerError> {
        if entry.original.is_empty() {
            return Err(LedgerError::EmptyOriginal);
        }

        let mut entries = self.entries.lock();
        if !overwrite && entries.contains_key(&entry.original) {
            return Ok(false);
        }
        entries.insert(entry.original.clone(), entry);
        Ok(true)
    }

    pub fn get(&self, original: &str) -> Option<LedgerEntry> {
        self.entries.lock().get(original).cloned()
    }

    pub fn contains(&self, original: &str) -> bool {
        self.entries.lock().contains_key(original)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Copy of all entries, ordered by original text
    pub fn snapshot(&self) -> Vec<LedgerEntry> {
        self.entries.lock().values().cloned().collect()
    }

    /// Re-resolve every entry against `dictionary`: resolved entries are
    /// removed, the rest get their partial result and tokens refreshed.
    pub fn reconcile(&self, dictionary: &Dictionary) -> ReconcileSummary {
        let originals: Vec<String> = self.entries.lock().keys().cloned().collect();

        // Resolve outside the lock so request threads can keep recording
        let outcomes: Vec<(String, Resolution)> = originals
            .into_iter()
            .map(|original| {
                let resolution = resolver::resolve(dictionary, &original);
                (original, resolution)
            })
            .collect();

        let mut summary = ReconcileSummary::default();
        let mut entries = self.entries.lock();
        for (original, resolution) in outcomes {
            if resolution.resolved {
                if entries.remove(&original).is_some() {
                    summary.resolved += 1;
                }
            } else if let Some(entry) = entries.get_mut(&original) {
                entry.partial = resolution.value;
                entry.tokens = resolution.unresolved_tokens;
                summary.remaining += 1;
            }
        }

        crate::info!(
            "[Ledger] Reconciled: {} resolved, {} remaining",
            summary.resolved,
            summary.remaining
        );
        summary
    }

    /// Record a new entry and append its line to the ledger file as one step.
    ///
    /// Holding the io lock across both keeps a concurrent `replace_from` and
    /// `flush` pair from dropping the entry between the insert and the write.
    /// Returns false, writing nothing, when the original is already present.
    pub fn record_and_append(&self, path: &Path, entry: LedgerEntry) -> Result<bool, LedgerError> {
        let _io = self.io_lock.lock();
        let line = entry.to_line();
        if !self.record(entry, false)? {
            return Ok(false);
        }
        append_line(path, &line)?;
        Ok(true)
    }

    /// Append a single entry to the ledger file
    pub fn append(&self, path: &Path, entry: &LedgerEntry) -> Result<(), LedgerError> {
        let _io = self.io_lock.lock();
        append_line(path, &entry.to_line())
    }

    /// Rewrite the whole ledger file from the in-memory entries using an
    /// atomic write (temp file + rename)
    pub fn flush(&self, path: &Path) -> Result<(), LedgerError> {
        let _io = self.io_lock.lock();
        let entries = self.snapshot();
        crate::debug!("[Ledger] Flushing {} entries to {:?}", entries.len(), path);

        ensure_parent(path)?;

        let mut content = String::new();
        for entry in &entries {
            content.push_str(&entry.to_line());
            content.push('\n');
        }

        let temp_path = path.with_extension("tmp");
        {
            let mut file = File::create(&temp_path).map_err(|e| {
                LedgerError::PersistenceError(format!("Failed to create temp file: {}", e))
            })?;
            file.write_all(content.as_bytes())
                .map_err(|e| LedgerError::PersistenceError(format!("Failed to write: {}", e)))?;
            file.sync_all()
                .map_err(|e| LedgerError::PersistenceError(format!("Failed to sync: {}", e)))?;
        }

        fs::rename(&temp_path, path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            LedgerError::PersistenceError(format!("Failed to rename: {}", e))
        })?;

        Ok(())
    }
}

fn append_line(path: &Path, line: &str) -> Result<(), LedgerError> {
    ensure_parent(path)?;

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| LedgerError::PersistenceError(format!("Failed to open: {}", e)))?;
    writeln!(file, "{}", line)
        .map_err(|e| LedgerError::PersistenceError(format!("Failed to write: {}", e)))?;
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<(), LedgerError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| LedgerError::PersistenceError(e.to_string()))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "ledger_test.rs"]
mod tests;
