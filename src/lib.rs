//! Dictionary-file translation endpoint.
//!
//! Translates short texts using a plain-text dictionary of literal words,
//! regex rewrites and ignore rules. Texts that cannot be fully translated are
//! recorded in an unresolved ledger, which is pruned whenever the dictionary
//! is reloaded.

// Enable coverage attribute on nightly for explicit exclusions
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod app;
pub mod codec;
pub mod config;
pub mod dictionary;
pub mod endpoint;
pub mod ledger;
pub mod reload;
pub mod resolver;
pub mod util;

use std::io::{self, BufReader};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

// Re-export log macros for use throughout the crate
pub use log::{debug, error, info, trace, warn};

pub use config::TranslatorConfig;
pub use endpoint::{EndpointError, FileTranslator, TranslateEndpoint, TranslateError};
pub use resolver::{resolve, Resolution};

/// Command-line entry point: translate stdin to stdout.
///
/// The only argument is an optional settings file path.
/// Returns the process exit code.
/// Note: not unit tested, it reads the process's stdin.
#[cfg_attr(coverage_nightly, coverage(off))]
pub fn run() -> i32 {
    app::init_logging();

    let stop = Arc::new(AtomicBool::new(false));
    app::install_signal_handler(stop.clone());

    let settings_path = std::env::args_os().nth(1).map(PathBuf::from);
    let mut translator = match app::setup(settings_path) {
        Ok(translator) => translator,
        Err(e) => {
            error!("Failed to start translator: {}", e);
            return 1;
        }
    };

    let lines = app::spawn_line_reader(BufReader::new(io::stdin()), stop.clone());
    let stdout = io::stdout();
    let code = match app::translate_stream(&translator, lines, stdout.lock(), &stop) {
        Ok(stats) => {
            info!(
                "Translated {} lines, {} unresolved",
                stats.translated, stats.unresolved
            );
            0
        }
        Err(e) => {
            error!("Translation stream failed: {}", e);
            1
        }
    };

    if let Err(e) = translator.shutdown() {
        warn!("Shutdown error: {}", e);
    }
    code
}
