use secrecy::SecretString;
use serde::Deserialize;

use crate::shared::ValidationError;

/// OAuth2 client-credentials settings for the remote collection API.
///
/// This intentionally does not implement [`serde::Serialize`] to avoid
/// accidentally leaking the client secret into serialized forms.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Token endpoint URL of the identity provider.
    pub token_url: String,
    /// OAuth2 client identifier.
    pub client_id: String,
    /// OAuth2 client secret.
    pub client_secret: SecretString,
    /// Scope requested for the access token.
    pub scope: String,
}

impl AuthConfig {
    /// Validates the authentication configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.token_url.trim().is_empty() {
            return Err(ValidationError::EmptyField("auth.token_url"));
        }

        if self.client_id.trim().is_empty() {
            return Err(ValidationError::EmptyField("auth.client_id"));
        }

        if self.scope.trim().is_empty() {
            return Err(ValidationError::EmptyField("auth.scope"));
        }

        Ok(())
    }
}
