//! Store (C7, ambient)
//!
//! A thin `sqlx::PgPool`-backed accessor over the inbound/outbound table
//! contracts of §6, in the teacher's `storage` pattern of a small struct
//! wrapping a pool plus typed query methods. `asyncpg`'s `copy_records_to_table`
//! bulk insert has no direct `sqlx` equivalent; it is expressed here as a
//! single parameterized `INSERT ... SELECT * FROM UNNEST(...)` statement,
//! which keeps the single-round-trip bulk-insert property (§9).

use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};

use crate::types::FilterType;

/// One row of the `raw_block_filters` table, joined against `blocks` to
/// confirm the height is recognized (§6).
#[derive(Debug, Clone, FromRow)]
pub struct RawBlockRow {
    pub height: i64,
    pub filter: Vec<u8>,
}

/// One row to persist into `block_filter` (§6).
#[derive(Debug, Clone)]
pub struct FilterRecord {
    pub height: i64,
    pub filter_type: FilterType,
    pub hash: [u8; 32],
    pub filter: Vec<u8>,
}

#[derive(Debug, Clone, FromRow)]
struct ChainHeadRow {
    #[sqlx(rename = "type")]
    filter_type: i16,
    hash: Vec<u8>,
}

/// Postgres-backed accessor for the raw/compressed filter tables.
#[derive(Clone)]
pub struct Store {
    pool: PgPool,
}

impl Store {
    /// Connect with the small pool mandated by §5: min 1, max 2 connections
    /// held for the worker's lifetime.
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .min_connections(1)
            .max_connections(2)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    #[cfg(test)]
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Highest height currently present in `block_filter`, or `None` if the
    /// compressed store is empty.
    pub async fn highest_compressed_height(&self) -> Result<Option<i64>, sqlx::Error> {
        sqlx::query_scalar("SELECT height FROM block_filter ORDER BY height DESC LIMIT 1")
            .fetch_optional(&self.pool)
            .await
    }

    /// All `(type, hash)` rows persisted at `height`, used to seed the chain
    /// state on startup (§4.6 initialization).
    pub async fn chain_heads_at(
        &self,
        height: i64,
    ) -> Result<Vec<(FilterType, [u8; 32])>, sqlx::Error> {
        let rows: Vec<ChainHeadRow> =
            sqlx::query_as("SELECT type, hash FROM block_filter WHERE height = $1")
                .bind(height)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let t = canonical_type_from_code(row.filter_type)?;
                let hash: [u8; 32] = row.hash.try_into().ok()?;
                Some((t, hash))
            })
            .collect())
    }

    /// Fetch up to `limit` raw rows with `height > after_height`, ordered
    /// ascending, joined against `blocks` (§4.6 step 3).
    pub async fn fetch_raw_batch(
        &self,
        after_height: i64,
        limit: i64,
    ) -> Result<Vec<RawBlockRow>, sqlx::Error> {
        sqlx::query_as(
            "SELECT raw_block_filters.height, filter \
             FROM raw_block_filters \
             JOIN blocks ON blocks.height = raw_block_filters.height \
             WHERE raw_block_filters.height > $1 \
             ORDER BY raw_block_filters.height ASC \
             LIMIT $2",
        )
        .bind(after_height)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    /// Bulk-insert `records` and delete the raw rows in the closed range
    /// `[delete_from, delete_to]` within one transaction (§4.6 step 6,
    /// §4.6.1).
    pub async fn commit_batch(
        &self,
        records: &[FilterRecord],
        delete_from: i64,
        delete_to: i64,
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        if !records.is_empty() {
            let heights: Vec<i64> = records.iter().map(|r| r.height).collect();
            let types: Vec<i16> = records.iter().map(|r| r.filter_type.code()).collect();
            let hashes: Vec<Vec<u8>> = records.iter().map(|r| r.hash.to_vec()).collect();
            let filters: Vec<Vec<u8>> = records.iter().map(|r| r.filter.clone()).collect();

            sqlx::query(
                "INSERT INTO block_filter (height, type, hash, filter) \
                 SELECT * FROM UNNEST($1::bigint[], $2::smallint[], $3::bytea[], $4::bytea[])",
            )
            .bind(&heights)
            .bind(&types)
            .bind(&hashes)
            .bind(&filters)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("DELETE FROM raw_block_filters WHERE height >= $1 AND height <= $2")
            .bind(delete_from)
            .bind(delete_to)
            .execute(&mut *tx)
            .await?;

        tx.commit().await
    }
}

fn canonical_type_from_code(code: i16) -> Option<FilterType> {
    match code {
        1 => Some(FilterType::Type1),
        2 => Some(FilterType::Type2),
        4 => Some(FilterType::Type4),
        8 => Some(FilterType::Type8),
        16 => Some(FilterType::Type16),
        _ => None,
    }
}
