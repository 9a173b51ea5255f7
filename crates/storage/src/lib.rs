use std::{
    fs, io,
    path::{Path, PathBuf},
    str::FromStr,
    sync::Arc,
};

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use thiserror::Error;
use tracing::debug;

mod memory;
mod record;

pub use memory::MemoryKeyValueStore;
pub use record::{decode_stored_value, RecordRead, RecordStore};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to create parent directory '{}' for database url '{database_url}': {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        database_url: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to open key-value store at '{database_url}': {source}")]
    Open {
        database_url: String,
        #[source]
        source: sqlx::Error,
    },
    #[error("failed to migrate key-value store: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("{operation} failed for key '{key}': {source}")]
    Backend {
        operation: &'static str,
        key: String,
        #[source]
        source: sqlx::Error,
    },
    #[error("failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A value as the backend holds it: either already structured, or the
/// serialized text form of a document.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredValue {
    Structured(Value),
    Text(String),
}

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<StoredValue>, StorageError>;
    async fn set(&self, key: &str, value: StoredValue) -> Result<(), StorageError>;
}

#[async_trait]
impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    async fn get(&self, key: &str) -> Result<Option<StoredValue>, StorageError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: StoredValue) -> Result<(), StorageError> {
        (**self).set(key, value).await
    }
}

#[derive(Clone)]
pub struct SqliteKeyValueStore {
    pool: Pool<Sqlite>,
}

impl SqliteKeyValueStore {
    pub async fn new(database_url: &str) -> Result<Self, StorageError> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let open_error = |source| StorageError::Open {
            database_url: database_url.to_string(),
            source,
        };
        let connect_options = SqliteConnectOptions::from_str(database_url)
            .map_err(open_error)?
            .create_if_missing(true);
        // Every in-memory connection is its own database.
        let max_connections = if sqlite_path(database_url).is_none() { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(connect_options)
            .await
            .map_err(open_error)?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        debug!(database_url, "key-value store ready");
        Ok(Self { pool })
    }

    pub async fn health_check(&self) -> Result<(), StorageError> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|source| StorageError::Backend {
                operation: "ping",
                key: String::new(),
                source,
            })?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<StoredValue>, StorageError> {
        let row = sqlx::query("SELECT format, value FROM kv_records WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|source| StorageError::Backend {
                operation: "read",
                key: key.to_string(),
                source,
            })?;

        Ok(row.map(|r| {
            let format = r.get::<String, _>(0);
            let raw = r.get::<String, _>(1);
            match format.as_str() {
                // A damaged json column is handed back as text so the decoder
                // can classify it.
                "json" => match serde_json::from_str(&raw) {
                    Ok(value) => StoredValue::Structured(value),
                    Err(_) => StoredValue::Text(raw),
                },
                _ => StoredValue::Text(raw),
            }
        }))
    }

    async fn set(&self, key: &str, value: StoredValue) -> Result<(), StorageError> {
        let (format, raw) = match value {
            StoredValue::Structured(value) => ("json", serde_json::to_string(&value)?),
            StoredValue::Text(text) => ("text", text),
        };
        sqlx::query(
            "INSERT INTO kv_records (key, format, value, updated_at) VALUES (?, ?, ?, CURRENT_TIMESTAMP)
             ON CONFLICT(key) DO UPDATE SET format = excluded.format, value = excluded.value, updated_at = CURRENT_TIMESTAMP",
        )
        .bind(key)
        .bind(format)
        .bind(raw)
        .execute(&self.pool)
        .await
        .map_err(|source| StorageError::Backend {
            operation: "write",
            key: key.to_string(),
            source,
        })?;
        Ok(())
    }
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<(), StorageError> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    if parent.as_os_str().is_empty() {
        return Ok(());
    }

    fs::create_dir_all(parent).map_err(|source| StorageError::CreateDir {
        path: parent.to_path_buf(),
        database_url: database_url.to_string(),
        source,
    })
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url.starts_with("sqlite::memory:") || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
