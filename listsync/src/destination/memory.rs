use std::collections::HashSet;
use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::Mutex;

use crate::destination::Destination;
use crate::error::{ErrorKind, SyncResult};
use crate::{bail, sync_error};
use crate::types::{DestinationItem, ItemPage, ItemPayload, value_to_string};

/// Page size used when none is configured.
const DEFAULT_PAGE_SIZE: usize = 100;

#[derive(Debug)]
struct Inner {
    items: Vec<DestinationItem>,
    page_size: usize,
    next_id: u64,
    fail_page_at: Option<usize>,
    fail_create_keys: HashSet<String>,
    fail_update_ids: HashSet<String>,
    fail_delete_ids: HashSet<String>,
}

/// In-memory destination for testing and development purposes.
///
/// [`MemoryDestination`] stores all items in memory and serves them through
/// the same paginated protocol as a real collection, making it ideal for
/// exercising indexing, reconciliation, and write behavior without a remote
/// endpoint. Page size is configurable so pagination behavior can be tested
/// with arbitrary splits, and individual operations can be made to fail to
/// exercise partial-fetch and partial-failure containment.
#[derive(Debug, Clone)]
pub struct MemoryDestination {
    key_field: String,
    inner: Arc<Mutex<Inner>>,
}

impl MemoryDestination {
    /// Creates an empty destination whose items are keyed by the given field.
    pub fn new(key_field: impl Into<String>) -> Self {
        Self {
            key_field: key_field.into(),
            inner: Arc::new(Mutex::new(Inner {
                items: Vec::new(),
                page_size: DEFAULT_PAGE_SIZE,
                next_id: 1,
                fail_page_at: None,
                fail_create_keys: HashSet::new(),
                fail_update_ids: HashSet::new(),
                fail_delete_ids: HashSet::new(),
            })),
        }
    }

    /// Inserts an item directly into the store, returning its identifier.
    ///
    /// Used to seed pre-existing collection state in tests and development
    /// workflows; the key is derived from the configured key field.
    pub async fn seed(&self, fields: Map<String, Value>) -> String {
        let mut inner = self.inner.lock().await;

        let id = inner.next_id.to_string();
        inner.next_id += 1;

        let key = fields
            .get(self.key_field.as_str())
            .map(value_to_string)
            .unwrap_or_default()
            .trim()
            .to_string();

        inner.items.push(DestinationItem {
            id: id.clone(),
            key,
            fields,
        });

        id
    }

    /// Returns a copy of all stored items.
    pub async fn items(&self) -> Vec<DestinationItem> {
        let inner = self.inner.lock().await;
        inner.items.clone()
    }

    /// Returns the keys of all stored items, sorted.
    pub async fn keys(&self) -> Vec<String> {
        let inner = self.inner.lock().await;
        let mut keys: Vec<String> = inner.items.iter().map(|item| item.key.clone()).collect();
        keys.sort();
        keys
    }

    /// Sets the number of items served per page.
    pub async fn set_page_size(&self, page_size: usize) {
        let mut inner = self.inner.lock().await;
        inner.page_size = page_size.max(1);
    }

    /// Makes fetching the page with the given index fail.
    pub async fn fail_page(&self, page_index: usize) {
        let mut inner = self.inner.lock().await;
        inner.fail_page_at = Some(page_index);
    }

    /// Makes creates for the given key fail.
    pub async fn fail_create(&self, key: impl Into<String>) {
        let mut inner = self.inner.lock().await;
        inner.fail_create_keys.insert(key.into());
    }

    /// Makes updates of the given item fail.
    pub async fn fail_update(&self, item_id: impl Into<String>) {
        let mut inner = self.inner.lock().await;
        inner.fail_update_ids.insert(item_id.into());
    }

    /// Makes deletes of the given item fail.
    pub async fn fail_delete(&self, item_id: impl Into<String>) {
        let mut inner = self.inner.lock().await;
        inner.fail_delete_ids.insert(item_id.into());
    }
}

impl Destination for MemoryDestination {
    fn name() -> &'static str {
        "memory"
    }

    async fn fetch_page(&self, cursor: Option<&str>) -> SyncResult<ItemPage> {
        let inner = self.inner.lock().await;

        let page_index: usize = match cursor {
            Some(cursor) => cursor.parse().map_err(|_| {
                sync_error!(
                    ErrorKind::DestinationFetchFailed,
                    "invalid continuation cursor",
                    detail = cursor.to_string()
                )
            })?,
            None => 0,
        };

        if inner.fail_page_at == Some(page_index) {
            bail!(
                ErrorKind::DestinationFetchFailed,
                "injected page failure",
                detail = format!("page {page_index}")
            );
        }

        let start = page_index * inner.page_size;
        let end = (start + inner.page_size).min(inner.items.len());
        let items = inner
            .items
            .get(start..end)
            .map(<[DestinationItem]>::to_vec)
            .unwrap_or_default();

        let next_cursor = (end < inner.items.len()).then(|| (page_index + 1).to_string());

        Ok(ItemPage { items, next_cursor })
    }

    async fn create_item(&self, payload: &ItemPayload) -> SyncResult<String> {
        let mut inner = self.inner.lock().await;

        let key = payload
            .get(self.key_field.as_str())
            .map(|value| value.trim().to_string())
            .unwrap_or_default();

        if inner.fail_create_keys.contains(&key) {
            bail!(
                ErrorKind::DestinationWriteFailed,
                "injected create failure",
                detail = key
            );
        }

        let id = inner.next_id.to_string();
        inner.next_id += 1;

        let fields = payload
            .iter()
            .map(|(field, value)| (field.clone(), Value::String(value.clone())))
            .collect();

        inner.items.push(DestinationItem {
            id: id.clone(),
            key,
            fields,
        });

        Ok(id)
    }

    async fn update_item(&self, item_id: &str, payload: &ItemPayload) -> SyncResult<()> {
        let mut inner = self.inner.lock().await;

        if inner.fail_update_ids.contains(item_id) {
            bail!(
                ErrorKind::DestinationWriteFailed,
                "injected update failure",
                detail = item_id.to_string()
            );
        }

        let item = inner
            .items
            .iter_mut()
            .find(|item| item.id == item_id)
            .ok_or_else(|| {
                sync_error!(
                    ErrorKind::DestinationWriteFailed,
                    "unknown item id",
                    detail = item_id.to_string()
                )
            })?;

        for (field, value) in payload {
            item.fields
                .insert(field.clone(), Value::String(value.clone()));
        }

        Ok(())
    }

    async fn delete_item(&self, item_id: &str) -> SyncResult<()> {
        let mut inner = self.inner.lock().await;

        if inner.fail_delete_ids.contains(item_id) {
            bail!(
                ErrorKind::DestinationWriteFailed,
                "injected delete failure",
                detail = item_id.to_string()
            );
        }

        let position = inner
            .items
            .iter()
            .position(|item| item.id == item_id)
            .ok_or_else(|| {
                sync_error!(
                    ErrorKind::DestinationWriteFailed,
                    "unknown item id",
                    detail = item_id.to_string()
                )
            })?;

        inner.items.remove(position);

        Ok(())
    }
}
