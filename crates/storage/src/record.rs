use serde_json::Value;
use tracing::debug;

use crate::{KeyValueStore, StorageError, StoredValue};

/// Outcome of reading one named record.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordRead {
    Missing,
    Present(Value),
    Corrupt { reason: String },
}

impl RecordRead {
    pub fn with_default(self, default: Value) -> Self {
        match self {
            RecordRead::Missing => RecordRead::Present(default),
            other => other,
        }
    }
}

/// Normalizes a stored value into structured form. Text is parsed exactly
/// once; anything that does not parse is reported as corrupt.
pub fn decode_stored_value(value: StoredValue) -> RecordRead {
    match value {
        StoredValue::Structured(value) => RecordRead::Present(value),
        StoredValue::Text(text) => match serde_json::from_str::<Value>(&text) {
            Ok(value) => RecordRead::Present(value),
            Err(err) => RecordRead::Corrupt {
                reason: err.to_string(),
            },
        },
    }
}

/// Document-level adapter over a [`KeyValueStore`].
pub struct RecordStore<S> {
    store: S,
}

impl<S: KeyValueStore> RecordStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn inner(&self) -> &S {
        &self.store
    }

    pub async fn read(&self, key: &str) -> Result<RecordRead, StorageError> {
        let read = match self.store.get(key).await? {
            Some(value) => decode_stored_value(value),
            None => RecordRead::Missing,
        };
        debug!(key, missing = matches!(read, RecordRead::Missing), "record read");
        Ok(read)
    }

    pub async fn read_or_default(
        &self,
        key: &str,
        default: Value,
    ) -> Result<RecordRead, StorageError> {
        Ok(self.read(key).await?.with_default(default))
    }

    /// Writes the serialized text form of `document`.
    pub async fn write(&self, key: &str, document: &Value) -> Result<(), StorageError> {
        let text = serde_json::to_string(document)?;
        self.store.set(key, StoredValue::Text(text)).await
    }
}
