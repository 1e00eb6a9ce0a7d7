//! Command-line host.
//!
//! Reads settings, initializes a `FileTranslator` and translates standard
//! input line by line. Unresolved lines print their partial translation.
//! Ctrl+C stops the loop and the translator is shut down as on end of input.

mod setup;

pub use setup::{
    init_logging, install_signal_handler, setup, spawn_line_reader, translate_stream,
    StreamStats,
};
