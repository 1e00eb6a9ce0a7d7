// Reload supervision - watches the dictionary file and swaps in new generations
//
// Polls the dictionary's modification time at a fixed interval. When it
// changes, a fresh Dictionary is loaded and swapped in, then the ledger is
// re-read, reconciled against the new generation and flushed.

use crate::dictionary::{self, Dictionary, LoadError, SharedDictionary};
use crate::ledger::{LedgerError, ReconcileSummary, UnresolvedLedger};
use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime};

/// Error types for a reload
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReloadError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// What one reload did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReloadSummary {
    /// Generation number of the dictionary now in use
    pub generation: u64,
    /// Ledger reconciliation counts
    pub reconcile: ReconcileSummary,
}

/// Everything a reload touches: file locations plus the live dictionary and ledger
#[derive(Debug)]
pub struct ReloadContext {
    dictionary_path: PathBuf,
    ledger_path: PathBuf,
    dictionary: SharedDictionary,
    ledger: UnresolvedLedger,
    /// Serializes reloads triggered by the watcher and by callers
    reload_lock: Mutex<()>,
}

impl ReloadContext {
    pub fn new(
        dictionary_path: PathBuf,
        ledger_path: PathBuf,
        dictionary: Dictionary,
        ledger: UnresolvedLedger,
    ) -> Self {
        Self {
            dictionary_path,
            ledger_path,
            dictionary: SharedDictionary::new(dictionary),
            ledger,
            reload_lock: Mutex::new(()),
        }
    }

    pub fn dictionary(&self) -> &SharedDictionary {
        &self.dictionary
    }

    pub fn ledger(&self) -> &UnresolvedLedger {
        &self.ledger
    }

    pub fn dictionary_path(&self) -> &Path {
        &self.dictionary_path
    }

    pub fn ledger_path(&self) -> &Path {
        &self.ledger_path
    }

    /// Reconcile the ledger against the current generation and rewrite its file
    pub fn reconcile_and_flush(&self) -> Result<ReconcileSummary, LedgerError> {
        let snapshot = self.dictionary.snapshot();
        let summary = self.ledger.reconcile(&snapshot);
        self.ledger.flush(&self.ledger_path)?;
        Ok(summary)
    }

    /// Load the dictionary file and swap it in.
    ///
    /// On a load error the previous generation stays in place.
    pub fn reload(&self) -> Result<ReloadSummary, ReloadError> {
        let _guard = self.reload_lock.lock();

        let fresh = dictionary::load(&self.dictionary_path)?;
        let generation = self.dictionary.replace(fresh);

        self.ledger.replace_from(&self.ledger_path)?;
        let reconcile = self.reconcile_and_flush()?;

        crate::info!(
            "[ReloadSupervisor] Dictionary generation {} live ({} ledger entries resolved, {} remaining)",
            generation,
            reconcile.resolved,
            reconcile.remaining
        );
        Ok(ReloadSummary {
            generation,
            reconcile,
        })
    }
}

/// Configuration for the reload supervisor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisorConfig {
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
    /// Record the first modification time without reloading
    pub skip_first_observation: bool,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: crate::config::DEFAULT_POLL_INTERVAL_MS,
            skip_first_observation: true,
        }
    }
}

/// Supervisor lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    /// Not polling
    Idle,
    /// Polling, waiting for a change
    Watching,
    /// Loading a new generation
    Reloading,
}

/// Result of a single poll
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// Dictionary file not present (or metadata unreadable)
    Missing,
    /// First observation recorded as the baseline
    Baseline,
    /// Modification time unchanged
    Unchanged,
    /// File changed and the new generation is live
    Reloaded(ReloadSummary),
    /// File changed but the reload failed
    Failed(ReloadError),
}

/// Poll state shared between the supervisor handle and its thread
#[derive(Debug)]
struct Watcher {
    context: Arc<ReloadContext>,
    skip_first_observation: bool,
    last_modified: Mutex<Option<SystemTime>>,
    state: Mutex<SupervisorState>,
}

impl Watcher {
    fn poll(&self) -> PollOutcome {
        let path = self.context.dictionary_path();
        let modified = match fs::metadata(path).and_then(|m| m.modified()) {
            Ok(time) => time,
            Err(_) => return PollOutcome::Missing,
        };

        // Held for the whole poll so overlapping polls cannot double-reload
        let mut last = self.last_modified.lock();
        let previous = last.replace(modified);
        match previous {
            None if self.skip_first_observation => {
                crate::debug!("[ReloadSupervisor] Baseline modification time recorded");
                return PollOutcome::Baseline;
            }
            Some(prev) if prev == modified => return PollOutcome::Unchanged,
            _ => {}
        }

        crate::info!("[ReloadSupervisor] {:?} changed, reloading", path);
        let resume = {
            let mut state = self.state.lock();
            std::mem::replace(&mut *state, SupervisorState::Reloading)
        };

        let outcome = match self.context.reload() {
            Ok(summary) => PollOutcome::Reloaded(summary),
            Err(e) => {
                crate::error!(
                    "[ReloadSupervisor] Reload failed, keeping previous dictionary: {}",
                    e
                );
                PollOutcome::Failed(e)
            }
        };

        *self.state.lock() = resume;
        outcome
    }
}

/// Background supervisor that reloads the dictionary when its file changes
pub struct ReloadSupervisor {
    watcher: Arc<Watcher>,
    /// Flag to signal the thread to stop
    running: Arc<AtomicBool>,
    /// Handle to the background thread
    thread_handle: Option<JoinHandle<()>>,
    config: SupervisorConfig,
}

impl ReloadSupervisor {
    pub fn new(context: Arc<ReloadContext>, config: SupervisorConfig) -> Self {
        Self {
            watcher: Arc::new(Watcher {
                context,
                skip_first_observation: config.skip_first_observation,
                last_modified: Mutex::new(None),
                state: Mutex::new(SupervisorState::Idle),
            }),
            running: Arc::new(AtomicBool::new(false)),
            thread_handle: None,
            config,
        }
    }

    /// Start the background polling thread
    ///
    /// # Returns
    /// Ok(()) if started successfully, Err if already running
    pub fn start(&mut self) -> Result<(), String> {
        if self.running.load(Ordering::SeqCst) {
            return Err("Supervisor is already running".to_string());
        }

        self.running.store(true, Ordering::SeqCst);
        *self.watcher.state.lock() = SupervisorState::Watching;

        let running = self.running.clone();
        let watcher = self.watcher.clone();
        let poll_interval = Duration::from_millis(self.config.poll_interval_ms);

        let handle = thread::Builder::new()
            .name("dictionary-reload".to_string())
            .spawn(move || {
                crate::info!(
                    "[ReloadSupervisor] Watching {:?} every {:?}",
                    watcher.context.dictionary_path(),
                    poll_interval
                );

                while running.load(Ordering::SeqCst) {
                    watcher.poll();
                    thread::sleep(poll_interval);
                }

                crate::info!("[ReloadSupervisor] Stopped watching");
            })
            .map_err(|e| {
                self.running.store(false, Ordering::SeqCst);
                *self.watcher.state.lock() = SupervisorState::Idle;
                format!("Failed to spawn supervisor thread: {}", e)
            })?;

        self.thread_handle = Some(handle);
        Ok(())
    }

    /// Stop the background thread and wait for it to exit
    pub fn stop(&mut self) -> Result<(), String> {
        if !self.running.load(Ordering::SeqCst) {
            return Ok(());
        }

        self.running.store(false, Ordering::SeqCst);

        if let Some(handle) = self.thread_handle.take() {
            handle
                .join()
                .map_err(|_| "Failed to join supervisor thread".to_string())?;
        }

        *self.watcher.state.lock() = SupervisorState::Idle;
        Ok(())
    }

    /// Run one poll on the calling thread
    pub fn check_now(&self) -> PollOutcome {
        self.watcher.poll()
    }

    pub fn state(&self) -> SupervisorState {
        *self.watcher.state.lock()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn config(&self) -> &SupervisorConfig {
        &self.config
    }
}

impl Drop for ReloadSupervisor {
    fn drop(&mut self) {
        if self.is_running() {
            if let Err(e) = self.stop() {
                crate::warn!("[ReloadSupervisor] Error stopping supervisor on drop: {}", e);
            }
        }
    }
}

#[cfg(test)]
#[path = "reload_test.rs"]
mod tests;
