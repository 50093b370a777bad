//! Logger setup.
//!
//! stdout carries the LSP message stream, so all log output goes to
//! stderr, which editors typically surface in their language-server
//! output panel.
use tracing_subscriber::EnvFilter;

/// Filter used when neither `--log-level` nor `RUST_LOG` is given.
fn default_filter(debug: bool) -> EnvFilter {
    if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    }
}

/// Install the global `tracing` subscriber.
///
/// Filter precedence: an explicit `log_level` directive, then `RUST_LOG`,
/// then `debug` when `debug` is set, otherwise `info`.
pub fn init_logger(log_level: Option<&str>, debug: bool, no_color: bool) {
    let filter = match log_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(debug)),
    };

    // A subscriber may already be installed (e.g. by a test harness).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!no_color)
        .with_target(false)
        .try_init();
}
