use serde::Deserialize;

use crate::shared::{MySqlConnectionConfig, ValidationError};

/// Configuration for extracting records from the source database.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Connection settings for the source database.
    pub connection: MySqlConnectionConfig,
    /// Query or view producing the records to reconcile.
    ///
    /// Every column referenced by the field mapping must appear in this
    /// query's result set.
    pub query: String,
}

impl SourceConfig {
    /// Validates the source configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.connection.validate()?;

        if self.query.trim().is_empty() {
            return Err(ValidationError::EmptyField("source.query"));
        }

        Ok(())
    }
}
