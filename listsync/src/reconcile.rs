//! Change plan computation.
//!
//! Diffs source records against the destination index through the field
//! mapping and produces the typed change plan for one pass. Reconciliation is
//! pure: it performs no I/O and leaves the decision of what to do with the
//! plan to the caller.

use std::collections::HashSet;

use tracing::debug;

use crate::index::DestinationIndex;
use crate::mapping::FieldMapping;
use crate::types::{
    ChangePlan, DestinationItem, FieldDiff, ItemPayload, PlannedDelete, PlannedInsert,
    PlannedUpdate, SkipReason, SkippedRecord, SourceRecord, value_to_string,
};

/// Computes the change plan for one pass.
///
/// Insert/update decisions are made strictly in source-record order and are
/// independent of each other. The deletion pass runs afterwards, taking the
/// set difference between indexed keys and every key seen in source data;
/// deletions are ordered by key so that plans are deterministic.
pub fn reconcile(
    records: &[SourceRecord],
    index: &DestinationIndex,
    mapping: &FieldMapping,
) -> ChangePlan {
    let mut plan = ChangePlan::default();
    let mut seen: HashSet<String> = HashSet::new();

    for record in records {
        let Some(key) = record.key(mapping.key_column()) else {
            plan.skipped.push(SkippedRecord {
                key: None,
                reason: SkipReason::EmptyKey,
            });
            continue;
        };

        seen.insert(key.clone());

        let mut payload = mapping.render(record);

        // Created items must carry the key field, otherwise they would be
        // excluded from the index on the next pass and re-inserted forever.
        payload
            .entry(mapping.key_field().to_string())
            .or_insert_with(|| key.clone());

        match index.get(&key) {
            None => plan.inserts.push(PlannedInsert { key, payload }),
            Some(item) => {
                let diffs = diff_fields(&payload, item);

                if diffs.is_empty() {
                    plan.skipped.push(SkippedRecord {
                        key: Some(key),
                        reason: SkipReason::Unchanged,
                    });
                } else {
                    plan.updates.push(PlannedUpdate {
                        key,
                        item_id: item.id.clone(),
                        payload,
                        diffs,
                    });
                }
            }
        }
    }

    let mut deletes: Vec<PlannedDelete> = index
        .iter()
        .filter(|(key, _)| !seen.contains(key.as_str()))
        .map(|(key, item)| PlannedDelete {
            key: key.clone(),
            item_id: item.id.clone(),
        })
        .collect();
    deletes.sort_by(|a, b| a.key.cmp(&b.key));
    plan.deletes = deletes;

    let counts = plan.counts();
    debug!(
        to_insert = counts.to_insert,
        to_update = counts.to_update,
        to_delete = counts.to_delete,
        skipped = counts.skipped,
        "change plan computed"
    );

    plan
}

/// Compares a rendered payload against the current destination item.
///
/// Both sides are stringified and trimmed before comparison; a missing
/// destination field counts as the empty string.
fn diff_fields(payload: &ItemPayload, item: &DestinationItem) -> Vec<FieldDiff> {
    let mut diffs = Vec::new();

    for (field, new_value) in payload {
        let old_value = item
            .fields
            .get(field.as_str())
            .map(value_to_string)
            .unwrap_or_default();

        let old_value = old_value.trim();
        let new_value = new_value.trim();

        if old_value != new_value {
            diffs.push(FieldDiff {
                field: field.clone(),
                old: old_value.to_string(),
                new: new_value.to_string(),
            });
        }
    }

    diffs
}

#[cfg(test)]
mod tests {
    use super::*;
    use listsync_config::shared::MappingConfig;
    use serde_json::{Value, json};
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

    fn indexed_item(id: &str, code: &str, name: &str) -> DestinationItem {
        DestinationItem {
            id: id.to_string(),
            key: code.to_string(),
            fields: [
                ("Code".to_string(), Value::String(code.to_string())),
                ("name".to_string(), Value::String(name.to_string())),
            ]
            .into_iter()
            .collect(),
        }
    }

    fn index_of(items: Vec<DestinationItem>) -> DestinationIndex {
        let mut index = DestinationIndex::new();
        for item in items {
            index.insert(item.key.clone(), item);
        }
        index
    }

    #[test]
    fn test_insert_skip_delete_scenario() {
        let records = vec![record("A", "Alice"), record("B", "Bob")];
        let index = index_of(vec![
            indexed_item("1", "B", "Bob"),
            indexed_item("2", "C", "Carol"),
        ]);

        let plan = reconcile(&records, &index, &name_mapping());
        let counts = plan.counts();

        assert_eq!(counts.to_insert, 1);
        assert_eq!(counts.to_update, 0);
        assert_eq!(counts.to_delete, 1);
        assert_eq!(counts.skipped, 1);

        assert_eq!(plan.inserts[0].key, "A");
        assert_eq!(plan.inserts[0].payload["name"], "Alice");
        assert_eq!(plan.deletes[0].key, "C");
        assert_eq!(plan.deletes[0].item_id, "2");
    }

    #[test]
    fn test_changed_field_produces_update_with_diff() {
        let records = vec![record("B", "Bobby")];
        let index = index_of(vec![indexed_item("1", "B", "Bob")]);

        let plan = reconcile(&records, &index, &name_mapping());

        assert_eq!(plan.counts().to_update, 1);
        let update = &plan.updates[0];
        assert_eq!(update.key, "B");
        assert_eq!(update.item_id, "1");
        assert_eq!(update.diffs.len(), 1);
        assert_eq!(update.diffs[0].to_string(), "name: 'Bob' → 'Bobby'");
    }

    #[test]
    fn test_identical_after_trimming_is_skipped() {
        let records = vec![record("B", "  Bob  ")];
        let index = index_of(vec![indexed_item("1", "B", "Bob")]);

        let plan = reconcile(&records, &index, &name_mapping());

        assert!(plan.is_empty());
        assert_eq!(plan.skipped.len(), 1);
        assert_eq!(plan.skipped[0].reason, SkipReason::Unchanged);
    }

    #[test]
    fn test_empty_key_is_skipped_and_never_planned() {
        let records = vec![record("  ", "Nobody"), record("A", "Alice")];
        let index = index_of(vec![]);

        let plan = reconcile(&records, &index, &name_mapping());
        let counts = plan.counts();

        assert_eq!(counts.to_insert, 1);
        assert_eq!(counts.skipped, 1);
        assert_eq!(plan.skipped[0].reason, SkipReason::EmptyKey);
        assert!(plan.skipped[0].key.is_none());
    }

    #[test]
    fn test_plan_sets_are_disjoint() {
        let records = vec![record("A", "Alice"), record("B", "Bobby"), record("D", "Dan")];
        let index = index_of(vec![
            indexed_item("1", "B", "Bob"),
            indexed_item("2", "C", "Carol"),
            indexed_item("3", "D", "Dan"),
        ]);

        let plan = reconcile(&records, &index, &name_mapping());

        let mut keys: Vec<&str> = plan
            .inserts
            .iter()
            .map(|entry| entry.key.as_str())
            .chain(plan.updates.iter().map(|entry| entry.key.as_str()))
            .chain(plan.deletes.iter().map(|entry| entry.key.as_str()))
            .chain(plan.skipped.iter().filter_map(|entry| entry.key.as_deref()))
            .collect();
        keys.sort_unstable();
        let total = keys.len();
        keys.dedup();

        assert_eq!(total, keys.len());
    }

    #[test]
    fn test_missing_destination_field_counts_as_empty() {
        let mapping = FieldMapping::from_config(&MappingConfig {
            key_column: "code".to_string(),
            key_field: "Code".to_string(),
            fields: [
                ("name".to_string(), "name".to_string()),
                ("Email".to_string(), "email".to_string()),
            ]
            .into_iter()
            .collect::<BTreeMap<_, _>>(),
        });

        // Destination item has no Email field; a record without an email
        // column renders it empty, so both sides agree.
        let records = vec![record("B", "Bob")];
        let index = index_of(vec![indexed_item("1", "B", "Bob")]);

        let plan = reconcile(&records, &index, &mapping);

        assert!(plan.is_empty());
    }

    #[test]
    fn test_reconciling_applied_state_yields_empty_plan() {
        let records = vec![record("A", "Alice"), record("B", "Bob")];
        let index = index_of(vec![
            indexed_item("1", "A", "Alice"),
            indexed_item("2", "B", "Bob"),
        ]);

        let plan = reconcile(&records, &index, &name_mapping());

        assert!(plan.is_empty());
        assert_eq!(plan.counts().skipped, 2);
    }
}
