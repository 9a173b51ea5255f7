use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{KeyValueStore, StorageError, StoredValue};

/// Process-local backend. Nothing survives the process.
#[derive(Default)]
pub struct MemoryKeyValueStore {
    values: Mutex<HashMap<String, StoredValue>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: impl Into<String>, value: StoredValue) -> Self {
        let mut values = HashMap::new();
        values.insert(key.into(), value);
        Self {
            values: Mutex::new(values),
        }
    }

    pub async fn raw(&self, key: &str) -> Option<StoredValue> {
        self.values.lock().await.get(key).cloned()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<StoredValue>, StorageError> {
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: StoredValue) -> Result<(), StorageError> {
        self.values.lock().await.insert(key.to_string(), value);
        Ok(())
    }
}
