use std::collections::BTreeMap;

use serde::Deserialize;

use crate::shared::ValidationError;

/// Declarative rules translating source record columns into destination
/// item fields.
///
/// Each entry maps a destination field name to a source expression: either a
/// plain column name (`"FirstName"`) or a template containing one or more
/// `{column}` placeholders (`"{FirstName} {LastName}"`).
#[derive(Debug, Clone, Deserialize)]
pub struct MappingConfig {
    /// Source column holding the reconciliation key.
    pub key_column: String,
    /// Destination field holding the reconciliation key.
    pub key_field: String,
    /// Destination field name to source expression.
    pub fields: BTreeMap<String, String>,
}

impl MappingConfig {
    /// Validates the mapping configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.key_column.trim().is_empty() {
            return Err(ValidationError::EmptyField("mapping.key_column"));
        }

        if self.key_field.trim().is_empty() {
            return Err(ValidationError::EmptyField("mapping.key_field"));
        }

        if self.fields.is_empty() {
            return Err(ValidationError::EmptyField("mapping.fields"));
        }

        if self.fields.keys().any(|field| field.trim().is_empty()) {
            return Err(ValidationError::InvalidFieldValue {
                field: "mapping.fields",
                constraint: "destination field names cannot be empty",
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(fields: &[(&str, &str)]) -> MappingConfig {
        MappingConfig {
            key_column: "EmployeeCode".to_string(),
            key_field: "EmployeeCode".to_string(),
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_valid_mapping_passes_validation() {
        let mapping = mapping(&[("Title", "{FirstName} {LastName}"), ("Email", "Email")]);
        assert!(mapping.validate().is_ok());
    }

    #[test]
    fn test_empty_fields_rejected() {
        let mapping = mapping(&[]);
        assert!(mapping.validate().is_err());
    }

    #[test]
    fn test_empty_key_column_rejected() {
        let mut mapping = mapping(&[("Title", "FirstName")]);
        mapping.key_column = "  ".to_string();
        assert!(mapping.validate().is_err());
    }

    #[test]
    fn test_empty_destination_field_name_rejected() {
        let mapping = mapping(&[("", "FirstName")]);
        assert!(mapping.validate().is_err());
    }
}
