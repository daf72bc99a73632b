//! MySQL source implementation backed by a sqlx connection pool.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use listsync_config::shared::SourceConfig;
use serde_json::Value;
use sqlx::mysql::{MySqlPoolOptions, MySqlRow};
use sqlx::{Column, MySqlPool, Row};
use tracing::debug;

use crate::error::{ErrorKind, SyncResult};
use crate::source::Source;
use crate::sync_error;
use crate::types::SourceRecord;

/// Minimum number of pooled connections kept open.
const POOL_MIN_CONNECTIONS: u32 = 1;

/// Maximum number of pooled connections.
///
/// Extraction is a single sequential query per pass, so the pool stays small.
const POOL_MAX_CONNECTIONS: u32 = 4;

/// Format used when stringifying datetime columns.
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Source that extracts records from a MySQL database with a fixed query.
#[derive(Debug, Clone)]
pub struct MySqlSource {
    pool: MySqlPool,
    query: String,
}

impl MySqlSource {
    /// Connects to the configured database and prepares the extraction query.
    pub async fn connect(config: &SourceConfig) -> SyncResult<Self> {
        let pool = MySqlPoolOptions::new()
            .min_connections(POOL_MIN_CONNECTIONS)
            .max_connections(POOL_MAX_CONNECTIONS)
            .connect_with(config.connection.with_db())
            .await
            .map_err(|err| {
                sync_error!(
                    ErrorKind::SourceConnectionFailed,
                    "failed to connect to the source database",
                    source: err
                )
            })?;

        Ok(Self {
            pool,
            query: config.query.clone(),
        })
    }

    /// Creates a source from an existing pool and query.
    pub fn new(pool: MySqlPool, query: impl Into<String>) -> Self {
        Self {
            pool,
            query: query.into(),
        }
    }
}

impl Source for MySqlSource {
    fn name() -> &'static str {
        "mysql"
    }

    async fn fetch_records(&self) -> SyncResult<Vec<SourceRecord>> {
        let rows = sqlx::query(&self.query)
            .fetch_all(&self.pool)
            .await
            .map_err(|err| {
                sync_error!(
                    ErrorKind::SourceQueryFailed,
                    "extraction query failed",
                    source: err
                )
            })?;

        let records: Vec<SourceRecord> = rows.iter().map(row_to_record).collect();
        debug!(record_count = records.len(), "extracted source records");

        Ok(records)
    }
}

/// Converts one result row into a record, column by column.
fn row_to_record(row: &MySqlRow) -> SourceRecord {
    row.columns()
        .iter()
        .enumerate()
        .map(|(index, column)| (column.name().to_string(), decode_column(row, index)))
        .collect()
}

/// Decodes a column of unknown type into a JSON value.
///
/// The extraction query is user-configured, so column types are not known up
/// front. Each column is tried against the supported MySQL types in turn;
/// datetimes are stringified so that rendered payloads stay stable across
/// passes. NULLs and unsupported types decode to [`Value::Null`].
fn decode_column(row: &MySqlRow, index: usize) -> Value {
    row.try_get_unchecked::<i64, _>(index)
        .map(Value::from)
        .or_else(|_| row.try_get_unchecked::<i32, _>(index).map(Value::from))
        .or_else(|_| row.try_get_unchecked::<i16, _>(index).map(Value::from))
        .or_else(|_| row.try_get_unchecked::<i8, _>(index).map(Value::from))
        .or_else(|_| row.try_get_unchecked::<u64, _>(index).map(Value::from))
        .or_else(|_| row.try_get_unchecked::<u32, _>(index).map(Value::from))
        .or_else(|_| row.try_get_unchecked::<u16, _>(index).map(Value::from))
        .or_else(|_| row.try_get_unchecked::<u8, _>(index).map(Value::from))
        .or_else(|_| row.try_get_unchecked::<f64, _>(index).map(Value::from))
        .or_else(|_| {
            row.try_get_unchecked::<f32, _>(index)
                .map(|v| Value::from(f64::from(v)))
        })
        .or_else(|_| row.try_get_unchecked::<bool, _>(index).map(Value::from))
        .or_else(|_| {
            row.try_get_unchecked::<NaiveDateTime, _>(index)
                .map(|v| Value::from(v.format(DATETIME_FORMAT).to_string()))
        })
        .or_else(|_| {
            row.try_get_unchecked::<NaiveDate, _>(index)
                .map(|v| Value::from(v.to_string()))
        })
        .or_else(|_| {
            row.try_get_unchecked::<NaiveTime, _>(index)
                .map(|v| Value::from(v.to_string()))
        })
        .or_else(|_| row.try_get_unchecked::<String, _>(index).map(Value::from))
        .or_else(|_| {
            row.try_get_unchecked::<Vec<u8>, _>(index)
                .map(|bytes| Value::from(String::from_utf8_lossy(&bytes).to_string()))
        })
        .unwrap_or(Value::Null)
}
