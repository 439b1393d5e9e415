// crates/trimpress-ui/src/helpers/log.rs
//
// Logging setup for the binary.
//
// In release builds with `windows_subsystem = "windows"` (double-click launch)
// there is no console attached, so stderr output is silently discarded. Every
// event is therefore written twice: to stderr and to an append-only file in
// the OS temp dir.
//
// File:   %TEMP%/trimpress.log
// Filter: TRIMPRESS_LOG (EnvFilter syntax, e.g. `debug` or `player=debug`),
//         default `info`.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_ENV: &str = "TRIMPRESS_LOG";

pub fn log_file_path() -> PathBuf {
    std::env::temp_dir().join("trimpress.log")
}

/// Install the global subscriber. Never panics: if the log file cannot be
/// opened, logging continues on stderr only.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path())
        .ok()
        .map(|f| fmt::layer().with_ansi(false).with_writer(Mutex::new(f)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init();

    tracing::info!("TrimPress v{} starting, log at {}", env!("CARGO_PKG_VERSION"), log_file_path().display());
}
