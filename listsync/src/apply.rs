//! Change plan execution against a destination.
//!
//! Applies the planned inserts, updates, and deletes sequentially. A single
//! failed write never aborts the pass: the failure is logged with its status
//! and body, counted, and the affected key is re-evaluated on the next pass.
//!
//! Inserts and deletes mutate the collection the index was built from, so the
//! writer patches the in-memory index after each successful one (adding or
//! removing the affected key) instead of re-fetching the whole collection.

use metrics::counter;
use serde_json::Value;
use tracing::{error, info};

use crate::destination::Destination;
use crate::index::DestinationIndex;
use crate::metrics::{
    ITEMS_ADDED_TOTAL, ITEMS_DELETED_TOTAL, ITEMS_UPDATED_TOTAL, WRITES_FAILED_TOTAL,
};
use crate::types::{ChangePlan, DestinationItem, PassReport};

/// Executes the change plan and returns the outcome counts.
pub async fn apply_plan<D: Destination>(
    destination: &D,
    index: &mut DestinationIndex,
    plan: ChangePlan,
) -> PassReport {
    let mut report = PassReport {
        skipped: plan.skipped.len() as u64,
        ..PassReport::default()
    };

    for insert in plan.inserts {
        match destination.create_item(&insert.payload).await {
            Ok(item_id) => {
                info!(key = %insert.key, item_id = %item_id, "inserted new item");
                index.insert(
                    insert.key.clone(),
                    DestinationItem::from_payload(item_id, insert.key, &insert.payload),
                );
                report.added += 1;
                counter!(ITEMS_ADDED_TOTAL).increment(1);
            }
            Err(err) => {
                error!(key = %insert.key, %err, "insert failed");
                report.failed += 1;
                counter!(WRITES_FAILED_TOTAL).increment(1);
            }
        }
    }

    for update in plan.updates {
        match destination.update_item(&update.item_id, &update.payload).await {
            Ok(()) => {
                let diffs = update
                    .diffs
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; ");
                info!(key = %update.key, %diffs, "updated item");

                if let Some(DestinationItem { id, key, mut fields }) = index.remove(&update.key) {
                    for (field, value) in &update.payload {
                        fields.insert(field.clone(), Value::String(value.clone()));
                    }
                    index.insert(update.key.clone(), DestinationItem { id, key, fields });
                }

                report.updated += 1;
                counter!(ITEMS_UPDATED_TOTAL).increment(1);
            }
            Err(err) => {
                error!(key = %update.key, %err, "update failed");
                report.failed += 1;
                counter!(WRITES_FAILED_TOTAL).increment(1);
            }
        }
    }

    for delete in plan.deletes {
        match destination.delete_item(&delete.item_id).await {
            Ok(()) => {
                info!(key = %delete.key, item_id = %delete.item_id, "deleted orphaned item");
                index.remove(&delete.key);
                report.deleted += 1;
                counter!(ITEMS_DELETED_TOTAL).increment(1);
            }
            Err(err) => {
                error!(key = %delete.key, %err, "delete failed");
                report.failed += 1;
                counter!(WRITES_FAILED_TOTAL).increment(1);
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::destination::memory::MemoryDestination;
    use crate::index::fetch_index;
    use crate::mapping::FieldMapping;
    use crate::reconcile::reconcile;
    use crate::types::SourceRecord;
    use listsync_config::shared::MappingConfig;
    use serde_json::{Map, Value, json};
    use std::collections::BTreeMap;

    fn name_mapping() -> FieldMapping {
        FieldMapping::from_config(&MappingConfig {
            key_column: "code".to_string(),
            key_field: "Code".to_string(),
            fields: [("name".to_string(), "name".to_string())]
                .into_iter()
                .collect::<BTreeMap<_, _>>(),
        })
    }

    fn record(code: &str, name: &str) -> SourceRecord {
        [
            ("code".to_string(), json!(code)),
            ("name".to_string(), json!(name)),
        ]
        .into_iter()
        .collect()
    }

    fn item_fields(code: &str, name: &str) -> Map<String, Value> {
        [
            ("Code".to_string(), json!(code)),
            ("name".to_string(), json!(name)),
        ]
        .into_iter()
        .collect()
    }

    async fn plan_and_apply(
        destination: &MemoryDestination,
        records: &[SourceRecord],
    ) -> (PassReport, DestinationIndex) {
        let mut index = fetch_index(destination).await;
        let plan = reconcile(records, &index, &name_mapping());
        let report = apply_plan(destination, &mut index, plan).await;
        (report, index)
    }

    #[tokio::test]
    async fn test_apply_reports_counts_and_converges_destination() {
        let destination = MemoryDestination::new("Code");
        destination.seed(item_fields("B", "Bob")).await;
        destination.seed(item_fields("C", "Carol")).await;

        let records = vec![record("A", "Alice"), record("B", "Bob")];
        let (report, index) = plan_and_apply(&destination, &records).await;

        assert_eq!(report.added, 1);
        assert_eq!(report.updated, 0);
        assert_eq!(report.deleted, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.failed, 0);

        assert_eq!(destination.keys().await, vec!["A", "B"]);

        // The in-memory index was patched alongside the writes.
        assert!(index.contains_key("A"));
        assert!(!index.contains_key("C"));
    }

    #[tokio::test]
    async fn test_failed_insert_is_contained() {
        let destination = MemoryDestination::new("Code");
        destination.fail_create("A").await;

        let records = vec![record("A", "Alice"), record("B", "Bob")];
        let (report, index) = plan_and_apply(&destination, &records).await;

        assert_eq!(report.added, 1);
        assert_eq!(report.failed, 1);

        // Only the successful insert reached the destination and the index.
        assert_eq!(destination.keys().await, vec!["B"]);
        assert!(index.contains_key("B"));
        assert!(!index.contains_key("A"));
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_item_for_next_pass() {
        let destination = MemoryDestination::new("Code");
        let orphan_id = destination.seed(item_fields("C", "Carol")).await;
        destination.seed(item_fields("B", "Bob")).await;
        destination.fail_delete(orphan_id).await;

        let records = vec![record("B", "Bob")];
        let (report, index) = plan_and_apply(&destination, &records).await;

        assert_eq!(report.deleted, 0);
        assert_eq!(report.failed, 1);
        assert_eq!(destination.keys().await, vec!["B", "C"]);
        assert!(index.contains_key("C"));
    }

    #[tokio::test]
    async fn test_update_patches_destination_and_index() {
        let destination = MemoryDestination::new("Code");
        destination.seed(item_fields("B", "Bob")).await;

        let records = vec![record("B", "Bobby")];
        let (report, index) = plan_and_apply(&destination, &records).await;

        assert_eq!(report.updated, 1);
        assert_eq!(report.failed, 0);

        let items = destination.items().await;
        assert_eq!(items[0].fields["name"], json!("Bobby"));
        assert_eq!(
            index.get("B").unwrap().fields["name"],
            Value::String("Bobby".to_string())
        );
    }
}
