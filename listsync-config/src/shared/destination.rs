use serde::Deserialize;

use crate::shared::ValidationError;

const fn default_request_timeout_secs() -> u64 {
    DestinationConfig::DEFAULT_REQUEST_TIMEOUT_SECS
}

/// Configuration for the remote collection that records are reconciled into.
#[derive(Debug, Clone, Deserialize)]
pub struct DestinationConfig {
    /// Base URL of the remote collection.
    ///
    /// Item endpoints are derived from it: `{collection_url}/items` for
    /// listing and creation, `{collection_url}/items/{id}` for deletion and
    /// `{collection_url}/items/{id}/fields` for field updates.
    pub collection_url: String,
    /// Name of the item field holding the reconciliation key.
    pub key_field: String,
    /// Timeout applied to every request against the collection.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl DestinationConfig {
    /// Default per-request timeout in seconds.
    pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

    /// Validates the destination configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.collection_url.trim().is_empty() {
            return Err(ValidationError::EmptyField("destination.collection_url"));
        }

        if self.key_field.trim().is_empty() {
            return Err(ValidationError::EmptyField("destination.key_field"));
        }

        if self.request_timeout_secs == 0 {
            return Err(ValidationError::InvalidFieldValue {
                field: "destination.request_timeout_secs",
                constraint: "must be greater than 0",
            });
        }

        Ok(())
    }
}
