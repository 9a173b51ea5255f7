use client_core::{build_view_model, partition_view, PinManager, PinSet};
use serde_json::json;
use shared::{protocol::PollenDataset, regions::find_region};
use storage::SqliteKeyValueStore;

async fn sqlite_manager() -> PinManager<SqliteKeyValueStore> {
    let store = SqliteKeyValueStore::new("sqlite::memory:").await.expect("db");
    PinManager::new(store)
}

#[tokio::test]
async fn pin_lifecycle_over_sqlite() {
    let manager = sqlite_manager().await;
    assert!(manager.pinned().await.expect("pinned").is_empty());

    manager.toggle_pin("Birke").await.expect("pin birke");
    let pinned = manager.toggle_pin("erle").await.expect("pin erle");
    assert_eq!(pinned, PinSet::from_names(["birke", "erle"]));

    let pinned = manager.toggle_pin("BIRKE").await.expect("unpin birke");
    assert_eq!(pinned, PinSet::from_names(["erle"]));
    assert_eq!(manager.pinned().await.expect("pinned"), pinned);
}

#[tokio::test]
async fn pinned_items_follow_dataset_and_region() {
    let dataset: PollenDataset = serde_json::from_value(json!({
        "content": [{
            "region_id": 90, "partregion_id": 92,
            "Pollen": {
                "Birke": { "today": "3", "tomorrow": "2-3", "dayafter_to": "2" },
                "Erle": { "today": "1", "tomorrow": "1", "dayafter_to": "0-1" }
            }
        }]
    }))
    .expect("fixture");
    let manager = sqlite_manager().await;
    let pins = manager.toggle_pin("birke").await.expect("toggle");

    let rhein_main = find_region(90, 92).expect("region");
    let view = build_view_model(&dataset, rhein_main);
    let split = partition_view(view.as_ref(), &pins);
    assert_eq!(split.pinned.len(), 1);
    assert_eq!(split.pinned[0].name, "Birke");
    assert_eq!(split.unpinned[0].name, "Erle");

    let nordhessen = find_region(90, 91).expect("region");
    let view = build_view_model(&dataset, nordhessen);
    let split = partition_view(view.as_ref(), &pins);
    assert!(split.is_empty());
    assert!(!split.has_pinned());
}
