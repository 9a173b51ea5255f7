use serde_json::json;
use storage::{RecordRead, RecordStore, SqliteKeyValueStore};

#[tokio::test]
async fn record_survives_reopening_the_database() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("pollen.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    {
        let store = SqliteKeyValueStore::new(&database_url).await.expect("open");
        let records = RecordStore::new(store.clone());
        records
            .write("pollen", &json!({ "pinned": ["birke", "erle"] }))
            .await
            .expect("write");
        store.close().await;
    }

    let reopened = SqliteKeyValueStore::new(&database_url).await.expect("reopen");
    let records = RecordStore::new(reopened);
    assert_eq!(
        records.read("pollen").await.expect("read"),
        RecordRead::Present(json!({ "pinned": ["birke", "erle"] }))
    );
}
