//! Local play history storage.
//!
//! The sync engine only needs two operations from a store: the set of
//! timestamps already present, and an all-or-nothing batch insert. Reading
//! the timestamps and inserting are separate transactions, so a concurrent
//! writer can slip a row in between; that surfaces as
//! [`StoreError::Conflict`] and the batch is rolled back.

use std::{collections::HashSet, str::FromStr};

use async_trait::async_trait;
use sqlx::{
    QueryBuilder, Sqlite, SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

use crate::{error::StoreError, types::PlayedTrackRecord};

#[async_trait]
pub trait TrackStore: Send + Sync {
    /// Every primary key currently stored.
    async fn stored_timestamps(&self) -> Result<HashSet<i64>, StoreError>;

    /// Inserts `records` in one transaction and returns the number of rows
    /// written. Existing rows are never updated.
    async fn insert_all(&self, records: &[PlayedTrackRecord]) -> Result<usize, StoreError>;
}

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens (creating if needed) the database at `database_url` and makes
    /// sure the history table exists.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // one connection keeps `sqlite::memory:` a single database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS recently_played_song (
                timestamp BIGINT PRIMARY KEY NOT NULL,
                id VARCHAR(32),
                name VARCHAR(256) NOT NULL,
                artist VARCHAR(256) NOT NULL,
                album VARCHAR(256) NOT NULL,
                played_at DATETIME NOT NULL,
                popularity INTEGER NOT NULL,
                explicit BOOLEAN NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Newest rows first.
    pub async fn recent(&self, limit: u32) -> Result<Vec<PlayedTrackRecord>, StoreError> {
        let rows = sqlx::query_as::<_, PlayedTrackRecord>(
            r#"
            SELECT timestamp, id, name, artist, album, played_at, popularity, explicit
            FROM recently_played_song
            ORDER BY timestamp DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn count(&self) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recently_played_song")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl TrackStore for SqliteStore {
    async fn stored_timestamps(&self) -> Result<HashSet<i64>, StoreError> {
        let timestamps: Vec<i64> = sqlx::query_scalar("SELECT timestamp FROM recently_played_song")
            .fetch_all(&self.pool)
            .await?;

        Ok(timestamps.into_iter().collect())
    }

    async fn insert_all(&self, records: &[PlayedTrackRecord]) -> Result<usize, StoreError> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;

        let mut builder = QueryBuilder::<Sqlite>::new(
            "INSERT INTO recently_played_song \
             (timestamp, id, name, artist, album, played_at, popularity, explicit) ",
        );
        builder.push_values(records, |mut row, record| {
            row.push_bind(record.timestamp)
                .push_bind(record.track_id.clone())
                .push_bind(record.name.clone())
                .push_bind(record.artist.clone())
                .push_bind(record.album.clone())
                .push_bind(record.played_at)
                .push_bind(record.popularity)
                .push_bind(record.explicit);
        });

        let result = builder
            .build()
            .execute(&mut *tx)
            .await
            .map_err(insert_error)?;

        tx.commit().await?;
        Ok(result.rows_affected() as usize)
    }
}

fn insert_error(err: sqlx::Error) -> StoreError {
    match err.as_database_error() {
        Some(db) if db.is_unique_violation() => StoreError::Conflict(db.message().to_string()),
        _ => StoreError::Database(err),
    }
}
