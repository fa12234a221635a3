// Crawl record persistence. One row per identifier; a hit is served as-is.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use sqlx::types::Json;
use sqlx::PgPool;
use tokio::sync::Mutex;

use crate::error::{ArchiveError, Result};
use crate::types::{CrawlRecord, MediaItem, Owner};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// Another writer got there first. The caller's record was not stored.
    AlreadyExists,
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn lookup(&self, identifier: &str) -> Result<Option<CrawlRecord>>;

    /// Store `record` only if no live record exists for its identifier.
    /// Must be atomic: of two concurrent writers, exactly one sees `Inserted`.
    async fn insert_if_absent(&self, record: &CrawlRecord) -> Result<InsertOutcome>;
}

// ---------------------------------------------------------------------------
// PgRecordStore (production)
// ---------------------------------------------------------------------------

pub struct PgRecordStore {
    pool: PgPool,
    ttl: Option<Duration>,
}

#[derive(Debug, sqlx::FromRow)]
struct RecordRow {
    identifier: String,
    owner: Json<Owner>,
    items: Json<Vec<MediaItem>>,
    item_count: i64,
    expires_at: DateTime<FixedOffset>,
}

impl TryFrom<RecordRow> for CrawlRecord {
    type Error = ArchiveError;

    fn try_from(row: RecordRow) -> Result<Self> {
        let items = row.items.0;
        if row.item_count < 0 || row.item_count as usize != items.len() {
            return Err(ArchiveError::Other(anyhow::anyhow!(
                "stored record {} has item_count {} but {} items",
                row.identifier,
                row.item_count,
                items.len()
            )));
        }
        Ok(CrawlRecord::new(
            row.identifier,
            row.owner.0,
            items,
            row.expires_at,
        ))
    }
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool, ttl: None }
    }

    /// Rows older than `ttl` are treated as absent and may be replaced.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Run the embedded SQL migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| ArchiveError::Database(e.into()))?;
        Ok(())
    }

    /// Delete rows past their TTL. Returns how many were removed.
    pub async fn purge_expired(&self) -> Result<u64> {
        let Some(ttl_secs) = self.ttl_secs() else {
            return Ok(0);
        };
        let result = sqlx::query(
            r#"
            DELETE FROM crawl_records
            WHERE expires_at <= now() - make_interval(secs => $1)
            "#,
        )
        .bind(ttl_secs)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// TTL in seconds, or `None` when rows never expire.
    fn ttl_secs(&self) -> Option<f64> {
        self.ttl.map(|t| t.as_secs_f64())
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn lookup(&self, identifier: &str) -> Result<Option<CrawlRecord>> {
        let row = sqlx::query_as::<_, RecordRow>(
            r#"
            SELECT identifier, owner, items, item_count, expires_at
            FROM crawl_records
            WHERE identifier = $1
              AND ($2::float8 IS NULL OR expires_at > now() - make_interval(secs => $2))
            "#,
        )
        .bind(identifier)
        .bind(self.ttl_secs())
        .fetch_optional(&self.pool)
        .await?;

        row.map(CrawlRecord::try_from).transpose()
    }

    async fn insert_if_absent(&self, record: &CrawlRecord) -> Result<InsertOutcome> {
        // The conflict branch only fires for an expired row, so a live row
        // is never overwritten and RETURNING yields nothing for the loser.
        let inserted = sqlx::query_scalar::<_, String>(
            r#"
            INSERT INTO crawl_records (identifier, owner, items, item_count, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (identifier) DO UPDATE
                SET owner = EXCLUDED.owner,
                    items = EXCLUDED.items,
                    item_count = EXCLUDED.item_count,
                    expires_at = EXCLUDED.expires_at
                WHERE $6::float8 IS NOT NULL
                  AND crawl_records.expires_at <= now() - make_interval(secs => $6)
            RETURNING identifier
            "#,
        )
        .bind(record.identifier())
        .bind(Json(record.owner()))
        .bind(Json(record.items()))
        .bind(record.item_count() as i64)
        .bind(record.expires_at())
        .bind(self.ttl_secs())
        .fetch_optional(&self.pool)
        .await?;

        Ok(match inserted {
            Some(_) => InsertOutcome::Inserted,
            None => InsertOutcome::AlreadyExists,
        })
    }
}

// ---------------------------------------------------------------------------
// MemoryRecordStore
// ---------------------------------------------------------------------------

/// Process-local store. Records never expire.
#[derive(Default)]
pub struct MemoryRecordStore {
    records: Mutex<HashMap<String, CrawlRecord>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn lookup(&self, identifier: &str) -> Result<Option<CrawlRecord>> {
        Ok(self.records.lock().await.get(identifier).cloned())
    }

    async fn insert_if_absent(&self, record: &CrawlRecord) -> Result<InsertOutcome> {
        use std::collections::hash_map::Entry;

        match self
            .records
            .lock()
            .await
            .entry(record.identifier().to_string())
        {
            Entry::Occupied(_) => Ok(InsertOutcome::AlreadyExists),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(InsertOutcome::Inserted)
            }
        }
    }
}
