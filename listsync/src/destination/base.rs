use std::future::Future;

use crate::error::SyncResult;
use crate::types::{ItemPage, ItemPayload};

/// Trait for remote collections that reconciliation passes write to.
///
/// The trait covers the two halves of the collection protocol: a paginated
/// fetch used to build the destination index, and the per-item create, update,
/// and delete calls used to apply a change plan.
///
/// Write operations are issued sequentially and each failure is contained by
/// the caller, so implementations should surface per-call errors rather than
/// aborting a batch themselves.
pub trait Destination {
    /// Returns the name of the destination.
    fn name() -> &'static str
    where
        Self: Sized;

    /// Fetches one page of the collection.
    ///
    /// A `None` cursor requests the first page; afterwards the caller passes
    /// back the cursor of the previous page until it is absent. The cursor is
    /// opaque to the caller.
    fn fetch_page(
        &self,
        cursor: Option<&str>,
    ) -> impl Future<Output = SyncResult<ItemPage>> + Send;

    /// Creates a new item with the given payload and returns its identifier.
    fn create_item(&self, payload: &ItemPayload)
    -> impl Future<Output = SyncResult<String>> + Send;

    /// Patches the fields of an existing item.
    fn update_item(
        &self,
        item_id: &str,
        payload: &ItemPayload,
    ) -> impl Future<Output = SyncResult<()>> + Send;

    /// Deletes an item by identifier.
    fn delete_item(&self, item_id: &str) -> impl Future<Output = SyncResult<()>> + Send;
}
