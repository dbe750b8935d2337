//! Runtime bootstrap utilities, grounded on `rbp_core::log()`/`kys()`: a
//! combined terminal+file logger and a graceful shutdown signal.
#![cfg(feature = "server")]

use simplelog::{ColorChoice, CombinedLogger, Config, LevelFilter, TermLogger, TerminalMode, WriteLogger};
use std::fs::OpenOptions;

/// Installs a combined stdout + rolling file logger. Mirrors the teacher's
/// `rbp_core::log()`, generalized to take the log file path explicitly
/// instead of a hardcoded name.
pub fn init_logging(log_path: &str, level: LevelFilter) {
    let file = OpenOptions::new().create(true).append(true).open(log_path);

    let mut loggers: Vec<Box<dyn simplelog::SharedLogger>> = vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];

    match file {
        Ok(f) => loggers.push(WriteLogger::new(level, Config::default(), f)),
        Err(err) => eprintln!("tanks-core: could not open log file {log_path}: {err}"),
    }

    if CombinedLogger::init(loggers).is_err() {
        eprintln!("tanks-core: logger already initialized, skipping");
    }
}

/// Waits for ctrl-c, then returns — the caller runs one last tick and one
/// last broadcast before actually stopping, per spec.md §5's shutdown
/// sequence (this function itself does not exit the process, unlike the
/// teacher's `kys()`, since the tick loop needs the chance to drain).
pub async fn wait_for_shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::error!("failed to install ctrl-c handler: {err}");
    }
    log::info!("shutdown signal received");
}
