use std::collections::BTreeMap;

use serde_json::Value;

use crate::types::value_to_string;

/// One row extracted from the relational source.
///
/// Fields are stored as JSON values so that the extraction layer can hand
/// over arbitrary result sets; the mapping layer stringifies them when
/// rendering payloads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceRecord {
    /// Column name to value, in deterministic column-name order.
    pub fields: BTreeMap<String, Value>,
}

impl SourceRecord {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the reconciliation key of this record, derived from the given
    /// source column.
    ///
    /// The value is stringified and trimmed; a missing column or a value that
    /// trims to nothing yields `None`, which marks the record as skipped.
    pub fn key(&self, key_column: &str) -> Option<String> {
        let raw = self.fields.get(key_column)?;
        let key = value_to_string(raw);
        let key = key.trim();

        if key.is_empty() {
            None
        } else {
            Some(key.to_string())
        }
    }

    /// Returns the value of a column, if present.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields.get(column)
    }
}

impl FromIterator<(String, Value)> for SourceRecord {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_is_trimmed() {
        let record: SourceRecord = [("code".to_string(), json!("  E042  "))].into_iter().collect();
        assert_eq!(record.key("code"), Some("E042".to_string()));
    }

    #[test]
    fn test_numeric_key_is_stringified() {
        let record: SourceRecord = [("code".to_string(), json!(42))].into_iter().collect();
        assert_eq!(record.key("code"), Some("42".to_string()));
    }

    #[test]
    fn test_missing_or_blank_key_is_none() {
        let record: SourceRecord = [("code".to_string(), json!("   "))].into_iter().collect();
        assert_eq!(record.key("code"), None);
        assert_eq!(record.key("other"), None);
    }
}
