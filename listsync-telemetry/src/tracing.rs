use std::sync::Once;

use thiserror::Error;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// Errors that can occur while initializing tracing.
#[derive(Debug, Error)]
pub enum TracingError {
    /// A global subscriber was already installed.
    #[error("failed to install global tracing subscriber: {0}")]
    SetGlobalDefault(#[from] SetGlobalDefaultError),
}

/// Initializes the global tracing subscriber for a service binary.
///
/// The filter honors `RUST_LOG` and defaults to `info`. Every emitted event
/// carries the `service` field so that logs from multiple services can be
/// told apart after aggregation.
pub fn init_tracing(service_name: &str) -> Result<(), TracingError> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    tracing::info!(service = service_name, "tracing initialized");

    Ok(())
}

static TEST_TRACING: Once = Once::new();

/// Initializes tracing for tests.
///
/// Safe to call from every test; the subscriber is installed once and output
/// is captured by the test harness.
pub fn init_test_tracing() {
    TEST_TRACING.call_once(|| {
        let filter = EnvFilter::builder()
            .with_default_directive(LevelFilter::DEBUG.into())
            .from_env_lossy();

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .init();
    });
}
