use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use storage::{KeyValueStore, RecordRead, RecordStore, StorageError};
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Key of the single persisted record holding the pin list.
pub const PIN_RECORD_KEY: &str = "pollen";

/// Lowercased names of pinned items. Membership checks ignore case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PinSet {
    names: IndexSet<String>,
}

impl PinSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_names<I, N>(names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: AsRef<str>,
    {
        Self {
            names: names
                .into_iter()
                .map(|name| name.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name.to_lowercase().as_str())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.names.iter().cloned().collect()
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PinRecord {
    pinned: Vec<String>,
    /// Fields written by other tools are carried through untouched.
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl PinRecord {
    fn normalized(mut self) -> Self {
        let names = PinSet::from_names(&self.pinned);
        self.pinned = names.to_vec();
        self
    }
}

/// Owns the persisted pin list. It is the only writer of [`PIN_RECORD_KEY`].
pub struct PinManager<S> {
    records: RecordStore<S>,
    write_lock: Mutex<()>,
}

impl<S: KeyValueStore> PinManager<S> {
    pub fn new(store: S) -> Self {
        Self {
            records: RecordStore::new(store),
            write_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &S {
        self.records.inner()
    }

    /// Flips membership of `name` and persists the result. Toggles are
    /// applied one at a time; each one reads the previous one's write.
    pub async fn toggle_pin(&self, name: &str) -> Result<PinSet, StorageError> {
        let _guard = self.write_lock.lock().await;
        let key = name.to_lowercase();

        let mut record = self.load_record().await?;
        let pinned = if record.pinned.contains(&key) {
            record.pinned.retain(|entry| entry != &key);
            false
        } else {
            record.pinned.push(key.clone());
            true
        };

        self.records
            .write(PIN_RECORD_KEY, &serde_json::to_value(&record)?)
            .await?;
        info!(name = %key, pinned, total = record.pinned.len(), "toggled pin");

        Ok(PinSet::from_names(&record.pinned))
    }

    pub async fn pinned(&self) -> Result<PinSet, StorageError> {
        let record = self.load_record().await?;
        Ok(PinSet::from_names(&record.pinned))
    }

    async fn load_record(&self) -> Result<PinRecord, StorageError> {
        let empty = serde_json::to_value(PinRecord::default())?;
        let document = match self.records.read_or_default(PIN_RECORD_KEY, empty).await? {
            RecordRead::Present(document) => document,
            RecordRead::Corrupt { reason } => {
                warn!(key = PIN_RECORD_KEY, %reason, "corrupt persisted pin state, starting empty");
                return Ok(PinRecord::default());
            }
            RecordRead::Missing => return Ok(PinRecord::default()),
        };

        match serde_json::from_value::<PinRecord>(document) {
            Ok(record) => Ok(record.normalized()),
            Err(err) => {
                warn!(key = PIN_RECORD_KEY, reason = %err, "corrupt persisted pin state, starting empty");
                Ok(PinRecord::default())
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/pins_tests.rs"]
mod tests;
