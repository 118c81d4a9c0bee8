//! Tracing setup for the job binaries

use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Install the global tracing subscriber.
///
/// The filter is read from `RUST_LOG`, falling back to `default_directive`
/// (for example `"info"`) when the variable is unset or invalid.
pub fn init_tracing(default_directive: &str) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();

    tracing::subscriber::set_global_default(subscriber)
}
