use super::types::WallpaperRecord;
use crate::error::Result;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::Path;
use tracing::info;

/// Database file name inside the storage directory
pub const DATABASE_FILE: &str = "bing.db";

/// Which store backs the dedup check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// Do not track downloads; every cycle downloads everything again
    None,
    #[default]
    Sqlite,
}

impl std::str::FromStr for StorageKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "sqlite" => Ok(Self::Sqlite),
            _ => Err(format!("Unknown storage: {s}")),
        }
    }
}

/// Record of downloaded wallpapers, keyed by content hash
#[async_trait]
pub trait WallpaperStore: Send + Sync {
    /// Create the schema if it does not exist yet
    async fn init(&self) -> Result<()>;

    /// Whether a wallpaper with this hash was recorded
    async fn exists(&self, hash: &str) -> Result<bool>;

    /// Record a wallpaper, replacing any record with the same hash
    async fn save(&self, record: &WallpaperRecord) -> Result<()>;

    /// Remove all records
    async fn clear(&self) -> Result<()>;
}

/// Store for "don't track" mode
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStore;

#[async_trait]
impl WallpaperStore for NullStore {
    async fn init(&self) -> Result<()> {
        Ok(())
    }

    async fn exists(&self, _hash: &str) -> Result<bool> {
        Ok(false)
    }

    async fn save(&self, _record: &WallpaperRecord) -> Result<()> {
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        Ok(())
    }
}

/// A wallpaper row as persisted
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct StoredWallpaper {
    pub id: i64,
    pub date: String,
    pub url: String,
    pub copyright: String,
    pub hash: String,
    pub zone: String,
    pub detail: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// SQLite-backed store
#[derive(Clone)]
pub struct SqliteStore {
    db: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) the database file at `path`
    pub async fn connect(path: &Path) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        info!("Opened wallpaper store: {}", path.display());
        Ok(Self { db })
    }

    /// Open the store inside `storage_dir`, creating the directory if needed
    pub async fn open_in(storage_dir: &Path) -> Result<Self> {
        tokio::fs::create_dir_all(storage_dir).await?;
        Self::connect(&storage_dir.join(DATABASE_FILE)).await
    }

    /// Look up a recorded wallpaper by hash
    pub async fn get(&self, hash: &str) -> Result<Option<StoredWallpaper>> {
        let row = sqlx::query_as::<_, StoredWallpaper>(
            "SELECT id, date, url, copyright, hash, zone, detail, created_at, updated_at
             FROM wallpapers WHERE hash = ?",
        )
        .bind(hash)
        .fetch_optional(&self.db)
        .await?;

        Ok(row)
    }

    /// Number of recorded wallpapers
    pub async fn count(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM wallpapers")
            .fetch_one(&self.db)
            .await?;

        Ok(count)
    }
}

#[async_trait]
impl WallpaperStore for SqliteStore {
    async fn init(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS wallpapers (
                id INTEGER PRIMARY KEY,
                date VARCHAR(16) NOT NULL DEFAULT '',
                url VARCHAR(255) NOT NULL DEFAULT '',
                copyright TEXT NOT NULL DEFAULT '',
                hash VARCHAR(64) NOT NULL DEFAULT '' UNIQUE,
                zone VARCHAR(8) NOT NULL DEFAULT 'CN',
                detail TEXT NOT NULL DEFAULT '',
                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            ",
        )
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn exists(&self, hash: &str) -> Result<bool> {
        let found = sqlx::query_scalar::<_, i64>("SELECT 1 FROM wallpapers WHERE hash = ? LIMIT 1")
            .bind(hash)
            .fetch_optional(&self.db)
            .await?;

        Ok(found.is_some())
    }

    async fn save(&self, record: &WallpaperRecord) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO wallpapers (date, url, copyright, hash, zone, detail)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(hash) DO UPDATE SET
                date = excluded.date,
                url = excluded.url,
                copyright = excluded.copyright,
                zone = excluded.zone,
                detail = excluded.detail,
                updated_at = CURRENT_TIMESTAMP
            ",
        )
        .bind(&record.start_date)
        .bind(&record.url)
        .bind(&record.copyright)
        .bind(&record.hash)
        .bind(record.locale.zone())
        .bind(record.detail_json())
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let result = sqlx::query("DELETE FROM wallpapers")
            .execute(&self.db)
            .await?;

        info!("Cleared {} wallpaper record(s)", result.rows_affected());
        Ok(())
    }
}
