//! Logging configuration and initialization

use crate::app::config::AppConfig;
use tracing::{debug, trace};
use tracing_subscriber::EnvFilter;

/// Initialize tracing for the process
///
/// Logs go to stderr so command output on stdout stays machine-readable.
/// Calling this twice is harmless; the second subscriber is ignored.
pub fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_new(config.log_level()).unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(config.verbose >= 2) // Show target module for -vv and above
        .with_thread_ids(config.verbose >= 3) // Show thread IDs for -vvv
        .with_line_number(config.verbose >= 3) // Show line numbers for -vvv
        .try_init();

    debug!("cepdist started with verbosity level: {}", config.verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());
}
