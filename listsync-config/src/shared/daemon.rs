use std::time::Duration;

use serde::Deserialize;

use crate::Config;
use crate::shared::{
    AuthConfig, DestinationConfig, MappingConfig, SourceConfig, ValidationError,
};

/// Top-level configuration for the listsync daemon.
///
/// Contains everything one reconciliation pass needs: where to read records
/// from, where to write them to, how to authenticate, and how source columns
/// map onto destination fields.
///
/// This intentionally does not implement [`serde::Serialize`] to avoid
/// accidentally leaking secrets in the config into serialized forms.
#[derive(Debug, Clone, Deserialize)]
pub struct DaemonConfig {
    /// Source database and extraction query.
    pub source: SourceConfig,
    /// Remote collection endpoints.
    pub destination: DestinationConfig,
    /// OAuth2 client-credentials settings for the collection API.
    pub auth: AuthConfig,
    /// Field mapping rules.
    pub mapping: MappingConfig,
    /// Interval between reconciliation passes.
    ///
    /// Parsed from humantime strings such as `"24h"` or `"30s"`. The next
    /// pass is scheduled only after the previous one completes.
    #[serde(with = "humantime_serde")]
    pub pass_interval: Duration,
}

impl DaemonConfig {
    /// Validates the daemon configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.source.validate()?;
        self.destination.validate()?;
        self.auth.validate()?;
        self.mapping.validate()?;

        if self.pass_interval.is_zero() {
            return Err(ValidationError::InvalidFieldValue {
                field: "pass_interval",
                constraint: "must be greater than 0",
            });
        }

        Ok(())
    }
}

impl Config for DaemonConfig {
    const LIST_PARSE_KEYS: &'static [&'static str] = &[];
}
