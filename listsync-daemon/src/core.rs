use std::sync::Arc;

use listsync::auth::TokenCache;
use listsync::destination::rest::RestDestination;
use listsync::mapping::FieldMapping;
use listsync::metrics::register_metrics;
use listsync::pipeline::SyncPipeline;
use listsync::source::mysql::MySqlSource;
use listsync_config::shared::DaemonConfig;
use tracing::info;

use crate::scheduler::run_scheduler;

/// Starts the daemon with the provided configuration.
///
/// Compiles the field mapping, connects to the source database, wires the
/// token cache into the REST destination, and hands the pipeline to the
/// scheduler. Returns only when the scheduler loop ends.
pub async fn start_daemon_with_config(config: DaemonConfig) -> anyhow::Result<()> {
    info!(
        collection_url = %config.destination.collection_url,
        pass_interval = ?config.pass_interval,
        "starting listsync daemon"
    );

    register_metrics();

    // The mapping is compiled once here and shared by reference across all
    // passes, never re-read per record.
    let mapping = FieldMapping::from_config(&config.mapping);

    let source = MySqlSource::connect(&config.source).await?;

    let token_cache = Arc::new(TokenCache::new(config.auth.clone()));
    let destination = RestDestination::new(&config.destination, token_cache)?;

    let pipeline = SyncPipeline::new(source, destination, mapping);

    run_scheduler(pipeline, config.pass_interval).await
}
