use async_trait::async_trait;
use serde_json::json;
use shared::{
    regions::{default_region, find_region},
    severity::SeverityTier,
};
use storage::{MemoryKeyValueStore, StoredValue};
use tokio::sync::Mutex;

use super::*;
use crate::{fetch::FetchError, pins::PIN_RECORD_KEY};

struct ScriptedSource {
    responses: Mutex<Vec<Result<PollenDataset, u16>>>,
}

impl ScriptedSource {
    fn new(mut responses: Vec<Result<PollenDataset, u16>>) -> Self {
        responses.reverse();
        Self {
            responses: Mutex::new(responses),
        }
    }
}

#[async_trait]
impl DatasetSource for ScriptedSource {
    async fn fetch(&self) -> Result<PollenDataset, FetchError> {
        let next = self.responses.lock().await.pop().unwrap_or(Err(500));
        next.map_err(|status| FetchError::Status {
            url: url::Url::parse("http://dwd.invalid/s31fg.json").expect("url"),
            status,
        })
    }
}

struct ReadOnlyStore {
    inner: MemoryKeyValueStore,
}

#[async_trait]
impl KeyValueStore for ReadOnlyStore {
    async fn get(&self, key: &str) -> Result<Option<StoredValue>, StorageError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, _value: StoredValue) -> Result<(), StorageError> {
        Err(StorageError::Backend {
            operation: "write",
            key: key.to_string(),
            source: sqlx::Error::PoolClosed,
        })
    }
}

fn dataset() -> PollenDataset {
    serde_json::from_value(json!({
        "name": "Pollenflug-Gefahrenindex",
        "last_update": "2024-03-11 11:00 Uhr",
        "next_update": "2024-03-12 11:00 Uhr",
        "content": [
            {
                "region_id": 10, "partregion_id": 11,
                "Pollen": {
                    "Birke": { "today": "2", "tomorrow": "3", "dayafter_to": "2-3" },
                    "Erle": { "today": "0", "tomorrow": "0-1", "dayafter_to": "9" }
                }
            },
            {
                "region_id": 50, "partregion_id": -1,
                "Pollen": {
                    "Hasel": { "today": "1", "tomorrow": "1", "dayafter_to": "1" }
                }
            }
        ]
    }))
    .expect("fixture")
}

fn session_with<S: KeyValueStore>(
    store: S,
    responses: Vec<Result<PollenDataset, u16>>,
) -> PollenSession<S, ScriptedSource> {
    PollenSession::new(
        PinManager::new(store),
        ScriptedSource::new(responses),
        default_region().clone(),
        DayKey::Today,
    )
}

fn row_names(rows: &[ItemRow]) -> Vec<&str> {
    rows.iter().map(|row| row.name.as_str()).collect()
}

#[tokio::test]
async fn starts_loading_with_no_items() {
    let session = session_with(MemoryKeyValueStore::new(), vec![]);
    let model = session.presentation();
    assert!(model.is_loading);
    assert!(model.pinned_items.is_empty());
    assert!(model.unpinned_items.is_empty());
    assert!(!model.has_pinned);
}

#[tokio::test]
async fn start_partitions_persisted_pins() {
    let store = MemoryKeyValueStore::with_value(
        PIN_RECORD_KEY,
        StoredValue::Text(r#"{"pinned":["birke"]}"#.into()),
    );
    let mut session = session_with(store, vec![Ok(dataset())]);
    session.start().await;

    let model = session.presentation();
    assert!(!model.is_loading);
    assert_eq!(row_names(&model.pinned_items), ["Birke"]);
    assert_eq!(row_names(&model.unpinned_items), ["Erle"]);
    assert_eq!(model.pinned_section_title(), Some("Pinned"));
    assert_eq!(model.other_section_title(), Some("Other"));
    assert_eq!(model.pinned_items[0].severity.tier, SeverityTier::Moderate);
    assert_eq!(model.last_update.as_deref(), Some("11.03.2024 11:00"));
    assert_eq!(model.next_update.as_deref(), Some("12.03.2024 11:00"));
}

#[tokio::test]
async fn toggle_rederives_partition() {
    let mut session = session_with(MemoryKeyValueStore::new(), vec![Ok(dataset())]);
    session.start().await;
    assert!(!session.presentation().has_pinned);
    assert_eq!(session.presentation().other_section_title(), None);

    session.toggle("ERLE").await.expect("toggle");
    let model = session.presentation();
    assert_eq!(row_names(&model.pinned_items), ["Erle"]);
    assert_eq!(row_names(&model.unpinned_items), ["Birke"]);
    assert!(session.pinned().contains("erle"));
}

#[tokio::test]
async fn day_change_relabels_rows() {
    let mut session = session_with(MemoryKeyValueStore::new(), vec![Ok(dataset())]);
    session.start().await;

    session.select_day(DayKey::DayAfterTomorrow);
    let model = session.presentation();
    assert_eq!(model.day, DayKey::DayAfterTomorrow);
    assert_eq!(model.unpinned_items[0].severity.label, "Mittlere bis hohe Belastung");
    assert_eq!(model.unpinned_items[1].severity.tier, SeverityTier::Unrecognized);
}

#[tokio::test]
async fn region_without_forecast_yields_empty_partition() {
    let mut session = session_with(MemoryKeyValueStore::new(), vec![Ok(dataset())]);
    session.start().await;
    session.toggle("birke").await.expect("toggle");

    session.select_region(find_region(120, 124).expect("region").clone());
    assert!(session.view().is_none());
    let model = session.presentation();
    assert!(model.pinned_items.is_empty());
    assert!(model.unpinned_items.is_empty());
    assert!(!model.has_pinned);
    assert!(model.error.is_none());

    session.select_region(find_region(50, -1).expect("region").clone());
    assert_eq!(row_names(&session.presentation().unpinned_items), ["Hasel"]);
}

#[tokio::test]
async fn fetch_failure_is_degraded_not_fatal() {
    let mut session = session_with(MemoryKeyValueStore::new(), vec![Err(503), Ok(dataset())]);
    session.start().await;

    assert!(matches!(session.dataset_state(), DatasetState::Failed(_)));
    let model = session.presentation();
    assert!(!model.is_loading);
    assert!(model.unpinned_items.is_empty());
    assert_eq!(model.error.as_ref().map(|e| e.code), Some(ErrorCode::Fetch));

    session.refresh().await;
    let model = session.presentation();
    assert!(model.error.is_none());
    assert_eq!(row_names(&model.unpinned_items), ["Birke", "Erle"]);
}

#[tokio::test]
async fn failed_toggle_keeps_previous_pins() {
    let store = ReadOnlyStore {
        inner: MemoryKeyValueStore::with_value(
            PIN_RECORD_KEY,
            StoredValue::Structured(json!({ "pinned": ["birke"] })),
        ),
    };
    let mut session = session_with(store, vec![Ok(dataset())]);
    session.start().await;

    assert!(session.toggle("erle").await.is_err());
    let model = session.presentation();
    assert_eq!(row_names(&model.pinned_items), ["Birke"]);
    assert_eq!(row_names(&model.unpinned_items), ["Erle"]);
    assert_eq!(model.error.as_ref().map(|e| e.code), Some(ErrorCode::Storage));
}

#[tokio::test]
async fn unparseable_update_time_is_shown_verbatim() {
    let mut published = dataset();
    published.last_update = "heute Vormittag".into();
    let mut session = session_with(MemoryKeyValueStore::new(), vec![Ok(published)]);
    session.start().await;

    let model = session.presentation();
    assert_eq!(model.last_update.as_deref(), Some("heute Vormittag"));
    assert_eq!(model.next_update.as_deref(), Some("12.03.2024 11:00"));
}

#[tokio::test]
async fn storage_fault_keeps_forecast_visible() {
    let mut session = session_with(MemoryKeyValueStore::new(), vec![Ok(dataset())]);
    session.start().await;
    session.report_storage_fault(&StorageError::Backend {
        operation: "open",
        key: String::new(),
        source: sqlx::Error::PoolClosed,
    });

    let model = session.presentation();
    assert_eq!(row_names(&model.unpinned_items), ["Birke", "Erle"]);
    assert!(!model.has_pinned);
    assert_eq!(model.error.as_ref().map(|e| e.code), Some(ErrorCode::Storage));

    session.toggle("birke").await.expect("toggle");
    assert!(session.presentation().error.is_none());
}
