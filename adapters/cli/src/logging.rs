//! Diagnostic output for the command-line adapter.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn,fortune_wheel_world=info";

/// Installs a stderr subscriber filtered by `RUST_LOG`.
///
/// Standard output stays reserved for JSON reports.
pub(crate) fn setup() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _installed = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}
