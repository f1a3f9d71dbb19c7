//! Logging initialization. Log lines go to stderr through `tracing`; the
//! filter comes from the `TAGATOM_LOG` environment variable when it's set and
//! from the `-v` count otherwise.

use tracing_subscriber::EnvFilter;

/// The environment variable that overrides the verbosity-derived filter.
pub const LOG_ENV: &str = "TAGATOM_LOG";

/// Maps a verbosity count to a tracing directive.
pub fn verbosity_to_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Installs the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(verbosity_to_directive(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbosity >= 2)
        .with_writer(std::io::stderr)
        .try_init();
}
