//! OAuth2 client-credentials authentication for the collection API.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use listsync_config::shared::AuthConfig;
use secrecy::ExposeSecret;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{ErrorKind, SyncResult};
use crate::{bail, sync_error};

/// Timeout for token endpoint requests.
const TOKEN_REQUEST_TIMEOUT: StdDuration = StdDuration::from_secs(10);

/// How long before expiry a cached token is refreshed.
const EXPIRY_GRACE_MINUTES: i64 = 5;

/// Token response from the identity provider.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

/// Cached access token with its expiry time.
#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    /// Returns true if the token is expired or will expire within the grace
    /// period.
    fn is_expired(&self, grace_period: Duration) -> bool {
        Utc::now() + grace_period >= self.expires_at
    }
}

/// Cache around the client-credentials flow.
///
/// Supplies a bearer token valid for the remote API; the token is fetched
/// lazily, cached, and refreshed ahead of its expiry so that a pass never
/// starts with a token about to lapse.
#[derive(Debug)]
pub struct TokenCache {
    config: AuthConfig,
    http_client: reqwest::Client,
    cached_token: Arc<RwLock<Option<CachedToken>>>,
    grace_period: Duration,
}

impl TokenCache {
    /// Creates a new token cache for the given credentials.
    pub fn new(config: AuthConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::builder()
                .timeout(TOKEN_REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            cached_token: Arc::new(RwLock::new(None)),
            grace_period: Duration::minutes(EXPIRY_GRACE_MINUTES),
        }
    }

    /// Returns a valid access token, refreshing it if necessary.
    pub async fn get_token(&self) -> SyncResult<String> {
        {
            let cache = self.cached_token.read().await;
            if let Some(token) = cache.as_ref()
                && !token.is_expired(self.grace_period)
            {
                return Ok(token.access_token.clone());
            }
        }

        debug!("refreshing access token");
        let new_token = self.acquire_token().await?;

        let mut cache = self.cached_token.write().await;
        *cache = Some(new_token.clone());

        Ok(new_token.access_token)
    }

    /// Acquires a new access token using the client-credentials flow.
    async fn acquire_token(&self) -> SyncResult<CachedToken> {
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", &self.config.client_id),
            ("client_secret", self.config.client_secret.expose_secret()),
            ("scope", &self.config.scope),
        ];

        let response = self
            .http_client
            .post(&self.config.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|err| {
                sync_error!(ErrorKind::AuthFailed, "token request failed", source: err)
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!(
                ErrorKind::AuthFailed,
                "token request rejected",
                detail = format!("status {status}: {body}")
            );
        }

        let token_response: TokenResponse = response.json().await.map_err(|err| {
            sync_error!(
                ErrorKind::AuthFailed,
                "failed to parse token response",
                source: err
            )
        })?;

        let expires_at = Utc::now() + Duration::seconds(token_response.expires_in);
        debug!(%expires_at, "acquired new access token");

        Ok(CachedToken {
            access_token: token_response.access_token,
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_token_is_not_expired() {
        let token = CachedToken {
            access_token: "t".to_string(),
            expires_at: Utc::now() + Duration::hours(1),
        };

        assert!(!token.is_expired(Duration::minutes(5)));
    }

    #[test]
    fn test_token_within_grace_period_counts_as_expired() {
        let token = CachedToken {
            access_token: "t".to_string(),
            expires_at: Utc::now() + Duration::minutes(2),
        };

        assert!(token.is_expired(Duration::minutes(5)));
    }

    #[test]
    fn test_past_expiry_counts_as_expired() {
        let token = CachedToken {
            access_token: "t".to_string(),
            expires_at: Utc::now() - Duration::minutes(1),
        };

        assert!(token.is_expired(Duration::minutes(5)));
    }
}
