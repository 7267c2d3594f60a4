use std::env;
use std::io;

use tracing_subscriber::EnvFilter;

const LOG_ENV_VAR: &str = "SAVECODE_LOG";
const DEFAULT_FILTER: &str = "warn";

/// Diagnostics go to stderr so stdout stays clean for rendered output.
pub fn init_logger() {
    let filter = env::var(LOG_ENV_VAR).unwrap_or_else(|_| DEFAULT_FILTER.to_string());
    let filter_layer = EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter_layer)
        .with_writer(io::stderr)
        .without_time()
        .with_target(false)
        .with_ansi(false)
        .try_init();
}
