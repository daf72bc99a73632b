//! One-pass orchestration of the reconciliation engine.

use metrics::counter;
use tracing::{info, warn};

use crate::apply::apply_plan;
use crate::destination::Destination;
use crate::error::SyncResult;
use crate::index::fetch_index;
use crate::mapping::FieldMapping;
use crate::metrics::RECORDS_FETCHED_TOTAL;
use crate::reconcile::reconcile;
use crate::source::Source;
use crate::types::PassReport;

/// Reconciliation pipeline tying a source, a destination, and the compiled
/// field mapping together.
///
/// The pipeline is stateless across passes: every [`SyncPipeline::run_pass`]
/// builds a fresh destination index, computes a plan, and applies it. The
/// caller owns scheduling and failure handling between passes.
#[derive(Debug)]
pub struct SyncPipeline<S, D> {
    source: S,
    destination: D,
    mapping: FieldMapping,
}

impl<S, D> SyncPipeline<S, D>
where
    S: Source,
    D: Destination,
{
    /// Creates a pipeline from its three collaborators.
    pub fn new(source: S, destination: D, mapping: FieldMapping) -> Self {
        Self {
            source,
            destination,
            mapping,
        }
    }

    /// Runs one full pass: extract, index, reconcile, apply.
    ///
    /// An extraction or authentication error aborts the pass and is returned
    /// to the caller; the next scheduled pass retries from scratch. An empty
    /// extraction result skips the pass entirely so that a source outage
    /// masquerading as "no rows" can never drain the remote collection.
    ///
    /// When the destination index is partial, planned deletions are
    /// suppressed for this pass: keys on never-fetched pages would look
    /// orphaned and be deleted incorrectly.
    pub async fn run_pass(&self) -> SyncResult<PassReport> {
        let records = self.source.fetch_records().await?;
        counter!(RECORDS_FETCHED_TOTAL).increment(records.len() as u64);

        if records.is_empty() {
            info!("no source records extracted, skipping pass");
            return Ok(PassReport::default());
        }

        let mut index = fetch_index(&self.destination).await;
        info!(
            record_count = records.len(),
            indexed = index.len(),
            partial = index.is_partial(),
            "reconciling source records against destination index"
        );

        let mut plan = reconcile(&records, &index, &self.mapping);

        if index.is_partial() && !plan.deletes.is_empty() {
            let suppressed = plan.suppress_deletes();
            warn!(
                suppressed = suppressed.len(),
                "destination index is partial, suppressing deletions this pass"
            );
        }

        let report = apply_plan(&self.destination, &mut index, plan).await;
        info!(%report, "reconciliation pass completed");

        Ok(report)
    }
}
