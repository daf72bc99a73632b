//! Listsync daemon binary.
//!
//! Long-running service that reconciles records from a relational source
//! into a remote keyed collection on a fixed interval. Loads configuration,
//! initializes telemetry, and runs the pass scheduler until shutdown.

use listsync_config::shared::DaemonConfig;
use listsync_daemon::config::load_daemon_config;
use listsync_daemon::core::start_daemon_with_config;
use listsync_telemetry::metrics::init_metrics;
use listsync_telemetry::tracing::init_tracing;
use tracing::error;

/// Entry point for the daemon.
///
/// Loads configuration, initializes tracing, starts the async runtime, and
/// launches the scheduler. Unrecoverable configuration errors terminate the
/// process with a non-zero status instead of looping.
fn main() -> anyhow::Result<()> {
    // Load daemon config.
    let daemon_config = load_daemon_config()?;

    // Initialize tracing for the service.
    init_tracing(env!("CARGO_BIN_NAME"))?;

    // We start the runtime.
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async_main(daemon_config))?;

    Ok(())
}

/// Main async entry point that starts the scheduler.
async fn async_main(daemon_config: DaemonConfig) -> anyhow::Result<()> {
    // Initialize metrics collection; the exporter needs the runtime.
    init_metrics()?;

    if let Err(err) = start_daemon_with_config(daemon_config).await {
        error!(%err, "an error occurred in the daemon");
        return Err(err);
    }

    Ok(())
}
