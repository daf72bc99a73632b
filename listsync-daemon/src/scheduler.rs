//! Pass scheduler for the reconciliation daemon.
//!
//! Runs one full pass, sleeps for the configured interval, and repeats until
//! a shutdown signal arrives. Pass failures are contained: they are logged
//! and counted, and the loop continues with the next scheduled pass.

use std::time::{Duration, Instant};

use listsync::destination::Destination;
use listsync::metrics::{PASS_DURATION_SECONDS, PASS_FAILURES_TOTAL};
use listsync::pipeline::SyncPipeline;
use listsync::source::Source;
use metrics::{counter, histogram};
use tokio::signal::unix::{SignalKind, signal};
use tracing::{error, info};

/// Runs the reconciliation scheduler loop.
///
/// Scheduling is sequential rather than interval-anchored: the sleep starts
/// only after a pass completes, so passes never overlap even when one runs
/// longer than the interval. The only supported recovery unit is the next
/// pass; there is no retry below pass granularity.
pub async fn run_scheduler<S, D>(
    pipeline: SyncPipeline<S, D>,
    interval: Duration,
) -> anyhow::Result<()>
where
    S: Source,
    D: Destination,
{
    // Set up signal handlers for graceful shutdown.
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    info!(
        interval_secs = interval.as_secs(),
        "starting reconciliation scheduler"
    );

    loop {
        let start = Instant::now();

        match pipeline.run_pass().await {
            Ok(report) => {
                info!(
                    duration_secs = start.elapsed().as_secs(),
                    %report,
                    "pass finished"
                );
            }
            Err(err) => {
                error!(%err, "reconciliation pass failed");
                counter!(PASS_FAILURES_TOTAL).increment(1);
            }
        }

        histogram!(PASS_DURATION_SECONDS).record(start.elapsed().as_secs_f64());

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = sigterm.recv() => {
                info!("received SIGTERM, shutting down gracefully");
                break;
            }
            _ = sigint.recv() => {
                info!("received SIGINT, shutting down gracefully");
                break;
            }
        }
    }

    info!("scheduler shutdown complete");

    Ok(())
}
