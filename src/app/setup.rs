//! Host setup and the translation loop.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use crate::config::TranslatorConfig;
use crate::endpoint::{FileTranslator, TranslateEndpoint, TranslateError};
use crate::util::{JsonSettings, DEFAULT_SETTINGS_FILE};

/// How often a waiting reader re-checks the stop flag
const STOP_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Install the stderr log subscriber. `RUST_LOG` overrides the `info` default.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // Fails only when a subscriber is already installed
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Load settings and start the translator.
///
/// `settings_path` defaults to `settings.json` in the working directory; a
/// missing file means every key takes its default.
pub fn setup(settings_path: Option<PathBuf>) -> Result<FileTranslator, Box<dyn std::error::Error>> {
    let settings_path = settings_path.unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE));
    crate::info!("Setting up translator from {:?}", settings_path);

    let settings = JsonSettings::from_path(&settings_path)?;
    let translator = FileTranslator::initialize(TranslatorConfig::from_json(&settings)?)?;
    crate::info!(
        "{} ({}) ready, dictionary has {} words",
        translator.friendly_name(),
        translator.id(),
        translator.dictionary().words().len()
    );
    Ok(translator)
}

/// Route Ctrl+C to `stop` so the translation loop ends and the translator
/// shuts down on the normal path
#[cfg_attr(coverage_nightly, coverage(off))]
pub fn install_signal_handler(stop: Arc<AtomicBool>) {
    if let Err(e) = ctrlc::set_handler(move || {
        crate::info!("Interrupted, finishing up");
        stop.store(true, Ordering::SeqCst);
    }) {
        crate::warn!("Failed to set Ctrl+C handler: {}", e);
    }
}

/// Read lines from `input` on a background thread.
///
/// The returned iterator ends at end of input or once `stop` is set, even
/// while the reader thread is still blocked waiting for input.
pub fn spawn_line_reader<R>(
    input: R,
    stop: Arc<AtomicBool>,
) -> impl Iterator<Item = io::Result<String>>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    let spawned = thread::Builder::new()
        .name("line-reader".to_string())
        .spawn(move || {
            for line in input.lines() {
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
    if let Err(e) = spawned {
        crate::error!("Failed to spawn line reader: {}", e);
    }

    std::iter::from_fn(move || loop {
        if stop.load(Ordering::SeqCst) {
            return None;
        }
        match rx.recv_timeout(STOP_POLL_INTERVAL) {
            Ok(line) => return Some(line),
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => return None,
        }
    })
}

/// Counts from one pass over an input stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    pub translated: usize,
    pub unresolved: usize,
}

/// Translate every line, writing one output line per input line, until the
/// input ends or `stop` is set.
pub fn translate_stream<E, I, W>(
    endpoint: &E,
    lines: I,
    mut output: W,
    stop: &AtomicBool,
) -> io::Result<StreamStats>
where
    E: TranslateEndpoint + ?Sized,
    I: IntoIterator<Item = io::Result<String>>,
    W: Write,
{
    let mut stats = StreamStats::default();
    for line in lines {
        if stop.load(Ordering::SeqCst) {
            crate::info!("Stop requested, leaving translation loop");
            break;
        }

        let line = line?;
        match endpoint.translate(&line) {
            Ok(value) => {
                stats.translated += 1;
                writeln!(output, "{}", value)?;
            }
            Err(TranslateError::Unresolved { partial, .. }) => {
                stats.unresolved += 1;
                writeln!(output, "{}", partial)?;
            }
        }
    }
    output.flush()?;
    Ok(stats)
}

#[cfg(test)]
#[path = "setup_test.rs"]
mod tests;
