//! REST implementation of the collection protocol.
//!
//! Speaks the paginated list protocol (`GET` with `nextLink` continuation)
//! and the per-item CRUD endpoints, injecting a bearer token from the token
//! cache on every request. Any non-success response becomes a
//! [`crate::error::SyncError`] carrying the status and response body.

use std::sync::Arc;
use std::time::Duration;

use listsync_config::shared::DestinationConfig;
use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::auth::TokenCache;
use crate::destination::Destination;
use crate::error::{ErrorKind, SyncResult};
use crate::{bail, sync_error};
use crate::types::{DestinationItem, ItemPage, ItemPayload, value_to_string};

/// One raw item of a list response.
#[derive(Debug, Deserialize)]
struct RawItem {
    id: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

/// Response of the paginated list endpoint.
#[derive(Debug, Deserialize)]
struct ListItemsResponse {
    value: Vec<RawItem>,
    #[serde(rename = "nextLink", alias = "@odata.nextLink")]
    next_link: Option<String>,
}

/// Response of the create endpoint.
#[derive(Debug, Deserialize)]
struct CreateItemResponse {
    id: String,
}

/// Remote collection reached over HTTP.
#[derive(Debug, Clone)]
pub struct RestDestination {
    client: reqwest::Client,
    token_cache: Arc<TokenCache>,
    items_url: String,
    key_field: String,
}

impl RestDestination {
    /// Creates a destination for the configured collection.
    pub fn new(config: &DestinationConfig, token_cache: Arc<TokenCache>) -> SyncResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|err| {
                sync_error!(
                    ErrorKind::ConfigError,
                    "failed to create HTTP client",
                    source: err
                )
            })?;

        Ok(Self {
            client,
            token_cache,
            items_url: format!("{}/items", config.collection_url.trim_end_matches('/')),
            key_field: config.key_field.clone(),
        })
    }

    fn item_url(&self, item_id: &str) -> String {
        format!("{}/{item_id}", self.items_url)
    }

    fn item_fields_url(&self, item_id: &str) -> String {
        format!("{}/{item_id}/fields", self.items_url)
    }

    /// Sends a request with the bearer token attached and maps non-success
    /// responses to an error of the given kind.
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        kind: ErrorKind,
        description: &'static str,
    ) -> SyncResult<reqwest::Response> {
        let token = self.token_cache.get_token().await?;

        let response = request
            .bearer_auth(token)
            .send()
            .await
            .map_err(|err| sync_error!(kind, description, source: err))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!(kind, description, detail = format!("status {status}: {body}"));
        }

        Ok(response)
    }
}

impl Destination for RestDestination {
    fn name() -> &'static str {
        "rest"
    }

    async fn fetch_page(&self, cursor: Option<&str>) -> SyncResult<ItemPage> {
        // The continuation cursor is the full URL of the next page.
        let url = match cursor {
            Some(next_link) => next_link.to_string(),
            None => format!("{}?expand=fields", self.items_url),
        };

        let response = self
            .send(
                self.client.get(url),
                ErrorKind::DestinationFetchFailed,
                "failed to fetch collection page",
            )
            .await?;

        let page: ListItemsResponse = response.json().await.map_err(|err| {
            sync_error!(
                ErrorKind::InvalidItem,
                "failed to parse collection page",
                source: err
            )
        })?;

        let items = page
            .value
            .into_iter()
            .map(|raw| {
                let key = raw
                    .fields
                    .get(self.key_field.as_str())
                    .map(value_to_string)
                    .unwrap_or_default()
                    .trim()
                    .to_string();

                DestinationItem {
                    id: raw.id,
                    key,
                    fields: raw.fields,
                }
            })
            .collect();

        Ok(ItemPage {
            items,
            next_cursor: page.next_link,
        })
    }

    async fn create_item(&self, payload: &ItemPayload) -> SyncResult<String> {
        let response = self
            .send(
                self.client
                    .post(&self.items_url)
                    .json(&json!({ "fields": payload })),
                ErrorKind::DestinationWriteFailed,
                "create rejected",
            )
            .await?;

        let created: CreateItemResponse = response.json().await.map_err(|err| {
            sync_error!(
                ErrorKind::InvalidItem,
                "failed to parse create response",
                source: err
            )
        })?;

        Ok(created.id)
    }

    async fn update_item(&self, item_id: &str, payload: &ItemPayload) -> SyncResult<()> {
        self.send(
            self.client
                .patch(self.item_fields_url(item_id))
                .json(payload),
            ErrorKind::DestinationWriteFailed,
            "update rejected",
        )
        .await?;

        Ok(())
    }

    async fn delete_item(&self, item_id: &str) -> SyncResult<()> {
        self.send(
            self.client.delete(self.item_url(item_id)),
            ErrorKind::DestinationWriteFailed,
            "delete rejected",
        )
        .await?;

        Ok(())
    }
}
