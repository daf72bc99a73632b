use std::fmt;

use crate::types::ItemPayload;

/// A single field difference between the rendered payload and the current
/// destination item, used for human-readable update logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDiff {
    /// Destination field name.
    pub field: String,
    /// Current value on the destination, trimmed.
    pub old: String,
    /// Rendered value from the source, trimmed.
    pub new: String,
}

impl fmt::Display for FieldDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: '{}' → '{}'", self.field, self.old, self.new)
    }
}

/// A record that must be created on the destination.
#[derive(Debug, Clone)]
pub struct PlannedInsert {
    /// Reconciliation key of the new item.
    pub key: String,
    /// Rendered payload to create the item with.
    pub payload: ItemPayload,
}

/// A destination item whose fields must be brought up to date.
#[derive(Debug, Clone)]
pub struct PlannedUpdate {
    /// Reconciliation key shared by source record and destination item.
    pub key: String,
    /// Identifier of the destination item to patch.
    pub item_id: String,
    /// Rendered payload to patch the item with.
    pub payload: ItemPayload,
    /// Per-field differences that triggered the update.
    pub diffs: Vec<FieldDiff>,
}

/// A destination item with no corresponding source record.
#[derive(Debug, Clone)]
pub struct PlannedDelete {
    /// Reconciliation key of the orphaned item.
    pub key: String,
    /// Identifier of the destination item to delete.
    pub item_id: String,
}

/// Why a source record produced no planned operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The record's key column was missing or blank after trimming.
    EmptyKey,
    /// The destination item already matches the rendered payload.
    Unchanged,
}

/// A source record that was skipped during reconciliation.
#[derive(Debug, Clone)]
pub struct SkippedRecord {
    /// Reconciliation key, absent for records skipped over an empty key.
    pub key: Option<String>,
    /// Why the record was skipped.
    pub reason: SkipReason,
}

/// Aggregate entry counts of a [`ChangePlan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlanCounts {
    pub to_insert: usize,
    pub to_update: usize,
    pub to_delete: usize,
    pub skipped: usize,
}

/// The computed set of inserts, updates, deletes, and skips for one pass.
///
/// A key appears in at most one of the four sets: insert/update decisions are
/// made per source record in source order, and deletions are derived from the
/// set difference between indexed keys and every key seen in source data.
#[derive(Debug, Clone, Default)]
pub struct ChangePlan {
    pub inserts: Vec<PlannedInsert>,
    pub updates: Vec<PlannedUpdate>,
    pub deletes: Vec<PlannedDelete>,
    pub skipped: Vec<SkippedRecord>,
}

impl ChangePlan {
    /// Returns the aggregate entry counts of this plan.
    pub fn counts(&self) -> PlanCounts {
        PlanCounts {
            to_insert: self.inserts.len(),
            to_update: self.updates.len(),
            to_delete: self.deletes.len(),
            skipped: self.skipped.len(),
        }
    }

    /// Returns whether the plan contains no pending operations.
    pub fn is_empty(&self) -> bool {
        self.inserts.is_empty() && self.updates.is_empty() && self.deletes.is_empty()
    }

    /// Removes and returns every planned deletion.
    ///
    /// Used when the destination index is partial: keys that were never
    /// fetched would otherwise be deleted incorrectly.
    pub fn suppress_deletes(&mut self) -> Vec<PlannedDelete> {
        std::mem::take(&mut self.deletes)
    }
}

/// Outcome counts of one reconciliation pass, logged after every pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PassReport {
    /// Items created on the destination.
    pub added: u64,
    /// Items patched on the destination.
    pub updated: u64,
    /// Items removed from the destination.
    pub deleted: u64,
    /// Source records that required no operation.
    pub skipped: u64,
    /// Planned operations rejected by the destination.
    pub failed: u64,
}

impl fmt::Display for PassReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} added, {} updated, {} deleted, {} skipped, {} failed",
            self.added, self.updated, self.deleted, self.skipped, self.failed
        )
    }
}
