//! Destination index construction.
//!
//! The index is a key-addressed snapshot of the remote collection, built
//! fresh at the start of every pass by walking the paginated fetch protocol.
//! It is never persisted across passes.

use std::collections::HashMap;
use std::collections::hash_map;

use metrics::counter;
use tracing::{debug, warn};

use crate::destination::Destination;
use crate::metrics::{ITEMS_INDEXED_TOTAL, PARTIAL_INDEXES_TOTAL};
use crate::types::DestinationItem;

/// Whether the index covers the whole remote collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexCompleteness {
    /// Every page was fetched.
    Complete,
    /// A page fetch failed; the index holds only the items gathered before
    /// the failure. Deletion decisions must not be based on it.
    Partial,
}

/// Key-addressed snapshot of the remote collection at the start of a pass.
#[derive(Debug)]
pub struct DestinationIndex {
    items: HashMap<String, DestinationItem>,
    completeness: IndexCompleteness,
}

impl DestinationIndex {
    /// Creates an empty, complete index.
    pub fn new() -> Self {
        Self {
            items: HashMap::new(),
            completeness: IndexCompleteness::Complete,
        }
    }

    /// Returns whether a page failure left this index partial.
    pub fn is_partial(&self) -> bool {
        self.completeness == IndexCompleteness::Partial
    }

    /// Returns the item stored under the given key.
    pub fn get(&self, key: &str) -> Option<&DestinationItem> {
        self.items.get(key)
    }

    /// Returns whether the index holds an item for the given key.
    pub fn contains_key(&self, key: &str) -> bool {
        self.items.contains_key(key)
    }

    /// Inserts or replaces the item stored under the given key.
    ///
    /// Used by the writer to patch the index after a successful insert so
    /// that later steps within the same pass do not see stale membership.
    pub fn insert(&mut self, key: String, item: DestinationItem) {
        self.items.insert(key, item);
    }

    /// Removes the item stored under the given key.
    pub fn remove(&mut self, key: &str) -> Option<DestinationItem> {
        self.items.remove(key)
    }

    /// Returns the number of indexed items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns whether the index holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates over `(key, item)` entries in arbitrary order.
    pub fn iter(&self) -> hash_map::Iter<'_, String, DestinationItem> {
        self.items.iter()
    }
}

impl Default for DestinationIndex {
    fn default() -> Self {
        Self::new()
    }
}

/// Fetches the full remote collection and builds the destination index.
///
/// Follows the continuation cursor until absent, accumulating all pages.
/// Items whose key is empty are excluded from the index; duplicate keys keep
/// the last item fetched. A page failure stops the walk and returns the items
/// gathered so far tagged [`IndexCompleteness::Partial`] instead of failing
/// the pass; the caller decides what a partial index is good for.
pub async fn fetch_index<D: Destination>(destination: &D) -> DestinationIndex {
    let mut index = DestinationIndex::new();
    let mut cursor: Option<String> = None;
    let mut skipped_keyless = 0usize;

    loop {
        let page = match destination.fetch_page(cursor.as_deref()).await {
            Ok(page) => page,
            Err(err) => {
                warn!(%err, indexed = index.len(), "page fetch failed, returning partial index");
                index.completeness = IndexCompleteness::Partial;
                counter!(PARTIAL_INDEXES_TOTAL).increment(1);
                break;
            }
        };

        for item in page.items {
            if item.key.is_empty() {
                skipped_keyless += 1;
                continue;
            }

            index.insert(item.key.clone(), item);
        }

        cursor = page.next_cursor;
        if cursor.is_none() {
            break;
        }
    }

    if skipped_keyless > 0 {
        debug!(skipped_keyless, "excluded items without a key from the index");
    }

    counter!(ITEMS_INDEXED_TOTAL).increment(index.len() as u64);
    debug!(
        indexed = index.len(),
        partial = index.is_partial(),
        "destination index built"
    );

    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::destination::memory::MemoryDestination;
    use serde_json::{Map, Value, json};

    fn fields(entries: &[(&str, &str)]) -> Map<String, Value> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), json!(v)))
            .collect()
    }

    async fn seeded_destination(keys: &[&str]) -> MemoryDestination {
        let destination = MemoryDestination::new("Code");
        for key in keys {
            destination.seed(fields(&[("Code", key)])).await;
        }
        destination
    }

    #[tokio::test]
    async fn test_single_page_collection_is_fully_indexed() {
        let destination = seeded_destination(&["A", "B", "C"]).await;

        let index = fetch_index(&destination).await;

        assert_eq!(index.len(), 3);
        assert!(!index.is_partial());
        assert!(index.contains_key("A"));
        assert!(index.contains_key("B"));
        assert!(index.contains_key("C"));
    }

    #[tokio::test]
    async fn test_pagination_split_does_not_change_the_index() {
        let keys = ["A", "B", "C", "D", "E", "F", "G"];

        for page_size in [1, 2, 3, 100] {
            let destination = seeded_destination(&keys).await;
            destination.set_page_size(page_size).await;

            let index = fetch_index(&destination).await;

            assert_eq!(index.len(), keys.len(), "page_size={page_size}");
            assert!(!index.is_partial());
            for key in keys {
                assert!(index.contains_key(key), "page_size={page_size} key={key}");
            }
        }
    }

    #[tokio::test]
    async fn test_items_without_key_are_excluded() {
        let destination = MemoryDestination::new("Code");
        destination.seed(fields(&[("Code", "A")])).await;
        destination.seed(fields(&[("Code", "   ")])).await;
        destination.seed(fields(&[("Other", "x")])).await;

        let index = fetch_index(&destination).await;

        assert_eq!(index.len(), 1);
        assert!(index.contains_key("A"));
    }

    #[tokio::test]
    async fn test_page_failure_yields_partial_index_with_gathered_items() {
        let destination = seeded_destination(&["A", "B", "C", "D"]).await;
        destination.set_page_size(2).await;
        destination.fail_page(1).await;

        let index = fetch_index(&destination).await;

        assert!(index.is_partial());
        assert_eq!(index.len(), 2);
        assert!(index.contains_key("A"));
        assert!(index.contains_key("B"));
    }

    #[tokio::test]
    async fn test_duplicate_keys_keep_the_last_item() {
        let destination = MemoryDestination::new("Code");
        destination
            .seed(fields(&[("Code", "A"), ("name", "first")]))
            .await;
        destination
            .seed(fields(&[("Code", "A"), ("name", "second")]))
            .await;

        let index = fetch_index(&destination).await;

        assert_eq!(index.len(), 1);
        assert_eq!(index.get("A").unwrap().fields["name"], json!("second"));
    }
}
