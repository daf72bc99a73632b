use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// Rendered destination payload: destination field name to rendered string
/// value, in deterministic field order.
pub type ItemPayload = BTreeMap<String, String>;

/// One entry of the remote collection.
#[derive(Debug, Clone, PartialEq)]
pub struct DestinationItem {
    /// Opaque identifier assigned by the remote collection.
    pub id: String,
    /// Reconciliation key extracted from the item's fields, trimmed.
    ///
    /// May be empty for items whose key field is missing or blank; such
    /// items are excluded from the destination index.
    pub key: String,
    /// Raw item fields as returned by the collection.
    pub fields: Map<String, Value>,
}

impl DestinationItem {
    /// Builds an item from a payload that was just written to the remote
    /// collection, used to patch the in-memory index after an insert.
    pub fn from_payload(id: String, key: String, payload: &ItemPayload) -> Self {
        let fields = payload
            .iter()
            .map(|(field, value)| (field.clone(), Value::String(value.clone())))
            .collect();

        Self { id, key, fields }
    }
}

/// One page of the remote collection, as returned by a paginated fetch.
#[derive(Debug, Clone, Default)]
pub struct ItemPage {
    /// Items contained in this page.
    pub items: Vec<DestinationItem>,
    /// Opaque continuation cursor; `None` on the last page.
    pub next_cursor: Option<String>,
}
