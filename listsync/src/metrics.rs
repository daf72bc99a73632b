use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};

static REGISTER_METRICS: Once = Once::new();

pub const RECORDS_FETCHED_TOTAL: &str = "listsync_records_fetched_total";
pub const ITEMS_INDEXED_TOTAL: &str = "listsync_items_indexed_total";
pub const PARTIAL_INDEXES_TOTAL: &str = "listsync_partial_indexes_total";
pub const ITEMS_ADDED_TOTAL: &str = "listsync_items_added_total";
pub const ITEMS_UPDATED_TOTAL: &str = "listsync_items_updated_total";
pub const ITEMS_DELETED_TOTAL: &str = "listsync_items_deleted_total";
pub const WRITES_FAILED_TOTAL: &str = "listsync_writes_failed_total";
pub const PASS_FAILURES_TOTAL: &str = "listsync_pass_failures_total";
pub const PASS_DURATION_SECONDS: &str = "listsync_pass_duration_seconds";

/// Registers metrics emitted by the reconciliation engine. It is safe to call
/// this method multiple times. It is guaranteed to register the metrics only
/// once.
pub fn register_metrics() {
    REGISTER_METRICS.call_once(|| {
        describe_counter!(
            RECORDS_FETCHED_TOTAL,
            Unit::Count,
            "Total records extracted from the source"
        );

        describe_counter!(
            ITEMS_INDEXED_TOTAL,
            Unit::Count,
            "Total items fetched into the destination index"
        );

        describe_counter!(
            PARTIAL_INDEXES_TOTAL,
            Unit::Count,
            "Passes whose destination index was left partial by a page failure"
        );

        describe_counter!(
            ITEMS_ADDED_TOTAL,
            Unit::Count,
            "Items created on the destination"
        );

        describe_counter!(
            ITEMS_UPDATED_TOTAL,
            Unit::Count,
            "Items patched on the destination"
        );

        describe_counter!(
            ITEMS_DELETED_TOTAL,
            Unit::Count,
            "Items deleted from the destination"
        );

        describe_counter!(
            WRITES_FAILED_TOTAL,
            Unit::Count,
            "Planned operations rejected by the destination"
        );

        describe_counter!(
            PASS_FAILURES_TOTAL,
            Unit::Count,
            "Reconciliation passes that aborted with an error"
        );

        describe_histogram!(
            PASS_DURATION_SECONDS,
            Unit::Seconds,
            "Duration of one reconciliation pass"
        );
    });
}
