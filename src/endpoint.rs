//! Translation endpoint backed by a dictionary file.
//!
//! `FileTranslator` is what a host plugs in: it loads the dictionary and the
//! unresolved ledger on initialization, optionally watches the dictionary for
//! edits, and translates one text per request.

use crate::config::TranslatorConfig;
use crate::dictionary::{self, Dictionary, LoadError};
use crate::ledger::{LedgerEntry, LedgerError, ReconcileSummary, UnresolvedLedger};
use crate::reload::{ReloadContext, ReloadError, ReloadSummary, ReloadSupervisor};
use crate::resolver::{self, Resolution};
use crate::util::SettingsAccess;
use std::sync::Arc;

pub const ENDPOINT_ID: &str = "CustomTranslateFromFile";
pub const FRIENDLY_NAME: &str = "CustomFromFile";
/// Documented upper bound on simultaneous requests
pub const MAX_CONCURRENCY: usize = 100;
pub const MAX_TRANSLATIONS_PER_REQUEST: usize = 1;

/// Failure reported to the host for one request
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TranslateError {
    /// Some letter runs had no dictionary entry
    #[error("Unresolved tokens [{}] in {partial:?}", .tokens.join(", "))]
    Unresolved {
        /// Best-effort translation
        partial: String,
        tokens: Vec<String>,
    },
}

/// Error types for endpoint setup and control
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EndpointError {
    #[error("Failed to load dictionary: {0}")]
    Load(#[from] LoadError),
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
    #[error("Reload supervisor error: {0}")]
    Supervisor(String),
}

impl From<ReloadError> for EndpointError {
    fn from(err: ReloadError) -> Self {
        match err {
            ReloadError::Load(e) => Self::Load(e),
            ReloadError::Ledger(e) => Self::Ledger(e),
        }
    }
}

/// The host's view of a translation endpoint
pub trait TranslateEndpoint: Send + Sync {
    /// Stable identifier used in host configuration
    fn id(&self) -> &str;

    /// Name shown to users
    fn friendly_name(&self) -> &str;

    /// Maximum number of requests the host may run at once
    fn max_concurrency(&self) -> usize;

    /// Number of texts per request
    fn max_translations_per_request(&self) -> usize;

    /// Translate one text
    fn translate(&self, text: &str) -> Result<String, TranslateError>;
}

/// Dictionary-file translator with an unresolved ledger and optional live reload
pub struct FileTranslator {
    config: TranslatorConfig,
    context: Arc<ReloadContext>,
    supervisor: Option<ReloadSupervisor>,
}

impl FileTranslator {
    /// Load files and start watching if configured.
    ///
    /// The ledger is reconciled once against the freshly loaded dictionary so
    /// entries fixed while the host was down are dropped.
    pub fn initialize(config: TranslatorConfig) -> Result<Self, EndpointError> {
        crate::info!(
            "Initializing {} with dictionary {:?}, ledger {:?}",
            FRIENDLY_NAME,
            config.file_path,
            config.out_file_path
        );

        let dict = dictionary::load(&config.file_path)?;
        let ledger = UnresolvedLedger::load(&config.out_file_path)?;
        let context = Arc::new(ReloadContext::new(
            config.file_path.clone(),
            config.out_file_path.clone(),
            dict,
            ledger,
        ));
        context.reconcile_and_flush()?;

        let supervisor = if config.observe {
            let mut supervisor = ReloadSupervisor::new(context.clone(), config.supervisor_config());
            supervisor.start().map_err(EndpointError::Supervisor)?;
            Some(supervisor)
        } else {
            None
        };

        Ok(Self {
            config,
            context,
            supervisor,
        })
    }

    /// Initialize from host settings
    pub fn from_settings<S: SettingsAccess + ?Sized>(settings: &S) -> Result<Self, EndpointError> {
        Self::initialize(TranslatorConfig::from_settings(settings))
    }

    /// Resolve one text and record it in the ledger if it stays unresolved
    pub fn resolve(&self, text: &str) -> Resolution {
        let snapshot = self.context.dictionary().snapshot();
        let resolution = resolver::resolve(&snapshot, text);

        if !resolution.resolved {
            crate::warn!(
                "Unresolved tokens {:?} in {:?} -> {:?}",
                resolution.unresolved_tokens,
                text,
                resolution.value
            );
            self.record_unresolved(text, &resolution);
        }

        resolution
    }

    fn record_unresolved(&self, text: &str, resolution: &Resolution) {
        if text.is_empty() {
            return;
        }

        let entry = LedgerEntry::from_resolution(text, resolution);
        if let Err(e) = self
            .context
            .ledger()
            .record_and_append(&self.config.out_file_path, entry)
        {
            crate::error!("Failed to record unresolved text: {}", e);
        }
    }

    /// Current dictionary generation
    pub fn dictionary(&self) -> Arc<Dictionary> {
        self.context.dictionary().snapshot()
    }

    pub fn ledger(&self) -> &UnresolvedLedger {
        self.context.ledger()
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    /// Reload the dictionary now, regardless of the file watcher
    pub fn reload(&self) -> Result<ReloadSummary, EndpointError> {
        Ok(self.context.reload()?)
    }

    /// Re-resolve ledger entries against the current dictionary and rewrite
    /// the ledger file
    pub fn reconcile(&self) -> Result<ReconcileSummary, EndpointError> {
        Ok(self.context.reconcile_and_flush()?)
    }

    pub fn is_watching(&self) -> bool {
        self.supervisor.as_ref().is_some_and(ReloadSupervisor::is_running)
    }

    /// Stop the file watcher
    pub fn shutdown(&mut self) -> Result<(), EndpointError> {
        if let Some(mut supervisor) = self.supervisor.take() {
            supervisor.stop().map_err(EndpointError::Supervisor)?;
        }
        crate::info!("{} shut down", FRIENDLY_NAME);
        Ok(())
    }
}

impl TranslateEndpoint for FileTranslator {
    fn id(&self) -> &str {
        ENDPOINT_ID
    }

    fn friendly_name(&self) -> &str {
        FRIENDLY_NAME
    }

    fn max_concurrency(&self) -> usize {
        MAX_CONCURRENCY
    }

    fn max_translations_per_request(&self) -> usize {
        MAX_TRANSLATIONS_PER_REQUEST
    }

    fn translate(&self, text: &str) -> Result<String, TranslateError> {
        let resolution = self.resolve(text);
        if resolution.resolved {
            Ok(resolution.value)
        } else {
            Err(TranslateError::Unresolved {
                partial: resolution.value,
                tokens: resolution.unresolved_tokens,
            })
        }
    }
}

#[cfg(test)]
#[path = "endpoint_test.rs"]
mod tests;
