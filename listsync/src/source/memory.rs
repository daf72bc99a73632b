use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::{ErrorKind, SyncResult};
use crate::source::Source;
use crate::sync_error;
use crate::types::SourceRecord;

#[derive(Debug, Default)]
struct Inner {
    records: Vec<SourceRecord>,
    fail_next_fetch: bool,
}

/// In-memory source for testing and development purposes.
///
/// Returns a configured set of records on every fetch. A single extraction
/// failure can be injected to exercise pass-abort behavior.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    inner: Arc<Mutex<Inner>>,
}

impl MemorySource {
    /// Creates a source returning the given records.
    pub fn new(records: Vec<SourceRecord>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                records,
                fail_next_fetch: false,
            })),
        }
    }

    /// Replaces the records returned by subsequent fetches.
    pub async fn set_records(&self, records: Vec<SourceRecord>) {
        let mut inner = self.inner.lock().await;
        inner.records = records;
    }

    /// Makes the next fetch fail with a query error.
    pub async fn fail_next_fetch(&self) {
        let mut inner = self.inner.lock().await;
        inner.fail_next_fetch = true;
    }
}

impl Source for MemorySource {
    fn name() -> &'static str {
        "memory"
    }

    async fn fetch_records(&self) -> SyncResult<Vec<SourceRecord>> {
        let mut inner = self.inner.lock().await;

        if inner.fail_next_fetch {
            inner.fail_next_fetch = false;
            return Err(sync_error!(
                ErrorKind::SourceQueryFailed,
                "injected extraction failure"
            ));
        }

        Ok(inner.records.clone())
    }
}
