//! Logging setup.
//!
//! Verbosity defaults come from the `GPXMERGE_LOG` environment variable
//! (standard env-filter directives); the `--debug` flag overrides it.
//! Logging is injected once at startup - no module keeps its own logger
//! state.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the default log filter.
pub const LOG_ENV: &str = "GPXMERGE_LOG";

/// Install the global tracing subscriber. Call once, before any pipeline
/// work starts.
pub fn init(debug: bool) {
    let filter = if debug {
        EnvFilter::new("gpxmerge=debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("gpxmerge=info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
