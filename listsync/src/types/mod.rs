//! Core data types for the reconciliation engine.

mod item;
mod plan;
mod record;
mod value;

pub use item::{DestinationItem, ItemPage, ItemPayload};
pub use plan::{
    ChangePlan, FieldDiff, PassReport, PlanCounts, PlannedDelete, PlannedInsert, PlannedUpdate,
    SkipReason, SkippedRecord,
};
pub use record::SourceRecord;
pub use value::value_to_string;
