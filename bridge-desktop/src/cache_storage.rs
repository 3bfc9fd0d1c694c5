//! Cache Storage using SQLite
//!
//! Each [`CacheRegion`] maps to its own table (`cache_binary`,
//! `cache_metadata`) so `destroy` can drop them independently of the
//! settings table living in the same database file.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::{CacheRegion, CacheStorage},
};
use bytes::Bytes;
use sqlx::{sqlite::SqlitePool, Row};
use std::path::PathBuf;
use tracing::{debug, info};

/// SQLite-backed two-region cache storage.
pub struct SqliteCacheStorage {
    pool: SqlitePool,
}

impl SqliteCacheStorage {
    /// Connect to (and create if missing) the database at `db_path`.
    ///
    /// Tables are created lazily by [`CacheStorage::open`].
    pub async fn new(db_path: PathBuf) -> Result<Self> {
        let pool = crate::connect_file(&db_path).await?;
        debug!(path = ?db_path, "Connected cache storage");
        Ok(Self { pool })
    }

    /// In-memory storage (for testing)
    pub async fn in_memory() -> Result<Self> {
        Ok(Self {
            pool: crate::connect_memory().await?,
        })
    }

    fn table(region: CacheRegion) -> &'static str {
        match region {
            CacheRegion::Binary => "cache_binary",
            CacheRegion::Metadata => "cache_metadata",
        }
    }

    fn storage_err(action: &str, region: CacheRegion, e: sqlx::Error) -> BridgeError {
        BridgeError::Storage(format!("Failed to {} in {} region: {}", action, region, e))
    }
}

#[async_trait]
impl CacheStorage for SqliteCacheStorage {
    async fn open(&self) -> Result<()> {
        for region in CacheRegion::ALL {
            let sql = format!(
                r#"
                CREATE TABLE IF NOT EXISTS {} (
                    key TEXT PRIMARY KEY,
                    value BLOB NOT NULL,
                    size INTEGER NOT NULL,
                    stored_at INTEGER NOT NULL
                )
                "#,
                Self::table(region)
            );
            sqlx::query(&sql)
                .execute(&self.pool)
                .await
                .map_err(|e| Self::storage_err("create table", region, e))?;
        }

        debug!("Opened cache regions");
        Ok(())
    }

    async fn put(&self, region: CacheRegion, key: &str, value: Bytes) -> Result<()> {
        let sql = format!(
            r#"
            INSERT INTO {} (key, value, size, stored_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                size = excluded.size,
                stored_at = excluded.stored_at
            "#,
            Self::table(region)
        );

        sqlx::query(&sql)
            .bind(key)
            .bind(value.as_ref())
            .bind(value.len() as i64)
            .bind(chrono::Utc::now().timestamp())
            .execute(&self.pool)
            .await
            .map_err(|e| Self::storage_err("store entry", region, e))?;

        Ok(())
    }

    async fn get(&self, region: CacheRegion, key: &str) -> Result<Option<Bytes>> {
        let sql = format!("SELECT value FROM {} WHERE key = ?", Self::table(region));
        let row = sqlx::query(&sql)
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Self::storage_err("read entry", region, e))?;

        Ok(row.map(|row| Bytes::from(row.get::<Vec<u8>, _>(0))))
    }

    async fn delete(&self, region: CacheRegion, key: &str) -> Result<bool> {
        let sql = format!("DELETE FROM {} WHERE key = ?", Self::table(region));
        let result = sqlx::query(&sql)
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| Self::storage_err("delete entry", region, e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn keys(&self, region: CacheRegion) -> Result<Vec<String>> {
        let sql = format!("SELECT key FROM {} ORDER BY stored_at, key", Self::table(region));
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Self::storage_err("list keys", region, e))?;

        Ok(rows.into_iter().map(|row| row.get(0)).collect())
    }

    async fn total_bytes(&self, region: CacheRegion) -> Result<u64> {
        let sql = format!("SELECT COALESCE(SUM(size), 0) FROM {}", Self::table(region));
        let total: i64 = sqlx::query_scalar(&sql)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Self::storage_err("sum sizes", region, e))?;

        Ok(total.max(0) as u64)
    }

    async fn destroy(&self) -> Result<()> {
        for region in CacheRegion::ALL {
            let sql = format!("DROP TABLE IF EXISTS {}", Self::table(region));
            sqlx::query(&sql)
                .execute(&self.pool)
                .await
                .map_err(|e| Self::storage_err("drop table", region, e))?;
        }

        info!("Destroyed cache regions");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn opened() -> SqliteCacheStorage {
        let storage = SqliteCacheStorage::in_memory().await.unwrap();
        storage.open().await.unwrap();
        storage
    }

    #[tokio::test]
    async fn test_regions_are_isolated() {
        let storage = opened().await;

        storage
            .put(CacheRegion::Binary, "same-key", Bytes::from_static(b"bin"))
            .await
            .unwrap();

        assert_eq!(
            storage.get(CacheRegion::Binary, "same-key").await.unwrap(),
            Some(Bytes::from_static(b"bin"))
        );
        assert_eq!(
            storage.get(CacheRegion::Metadata, "same-key").await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_put_replaces_and_delete_reports() {
        let storage = opened().await;

        storage
            .put(CacheRegion::Metadata, "my-beats", Bytes::from_static(b"v1"))
            .await
            .unwrap();
        storage
            .put(CacheRegion::Metadata, "my-beats", Bytes::from_static(b"v2"))
            .await
            .unwrap();

        assert_eq!(
            storage.get(CacheRegion::Metadata, "my-beats").await.unwrap(),
            Some(Bytes::from_static(b"v2"))
        );
        assert_eq!(storage.keys(CacheRegion::Metadata).await.unwrap(), vec!["my-beats"]);

        assert!(storage.delete(CacheRegion::Metadata, "my-beats").await.unwrap());
        assert!(!storage.delete(CacheRegion::Metadata, "my-beats").await.unwrap());
    }

    #[tokio::test]
    async fn test_destroy_then_open_starts_empty() {
        let storage = opened().await;
        storage
            .put(CacheRegion::Binary, "https://x/a.mp3", Bytes::from_static(b"a"))
            .await
            .unwrap();

        storage.destroy().await.unwrap();
        assert!(storage.get(CacheRegion::Binary, "https://x/a.mp3").await.is_err());

        storage.open().await.unwrap();
        assert!(storage.keys(CacheRegion::Binary).await.unwrap().is_empty());
        assert!(!storage.contains(CacheRegion::Binary, "https://x/a.mp3").await.unwrap());
    }

    #[tokio::test]
    async fn test_total_bytes_sums_stored_sizes() {
        let storage = opened().await;
        assert_eq!(storage.total_bytes(CacheRegion::Binary).await.unwrap(), 0);

        storage
            .put(CacheRegion::Binary, "https://x/a.mp3", Bytes::from_static(b"abcd"))
            .await
            .unwrap();
        storage
            .put(CacheRegion::Binary, "https://x/c.jpg", Bytes::from_static(b"xy"))
            .await
            .unwrap();
        storage
            .put(CacheRegion::Binary, "https://x/c.jpg", Bytes::from_static(b"xyz"))
            .await
            .unwrap();
        storage
            .put(CacheRegion::Metadata, "album:a", Bytes::from_static(b"{}"))
            .await
            .unwrap();

        assert_eq!(storage.total_bytes(CacheRegion::Binary).await.unwrap(), 7);
        assert_eq!(storage.total_bytes(CacheRegion::Metadata).await.unwrap(), 2);
    }
}
