use std::future::Future;

use crate::error::SyncResult;
use crate::types::SourceRecord;

/// Trait for systems that reconciliation passes extract records from.
///
/// Implementations return the full set of records to reconcile; the engine
/// diffs them against the destination index. An extraction error aborts the
/// pass with zero records processed, and the next scheduled pass retries the
/// extraction from scratch.
pub trait Source {
    /// Returns the name of the source.
    fn name() -> &'static str
    where
        Self: Sized;

    /// Extracts every record to reconcile in this pass.
    fn fetch_records(&self) -> impl Future<Output = SyncResult<Vec<SourceRecord>>> + Send;
}
