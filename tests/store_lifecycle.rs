use fakedetector::{
    NewAnalysis, NewFeedback, Page, Scope, Statistics, Store, StoreError, StoreLocation,
};
use rusqlite::Connection;
use serde_json::json;

fn analysis(prediction: &str, confidence: f64) -> NewAnalysis {
    NewAnalysis {
        image_hash: json!("hash"),
        prediction: json!(prediction),
        confidence: json!(confidence),
        raw_score: json!(confidence / 100.0),
        ..NewAnalysis::default()
    }
}

#[tokio::test]
async fn schema_setup_twice_on_disk_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("database.sqlite");

    let store = Store::open(StoreLocation::file(&path)).unwrap();
    store.ensure_schema().await.unwrap();
    store.ensure_schema().await.unwrap();
    store.close().await.unwrap();

    let conn = Connection::open(&path).unwrap();
    let tables: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    let indexes: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'index' AND name LIKE 'idx_%'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(tables, 3);
    assert_eq!(indexes, 7);
}

#[tokio::test]
async fn data_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("database.sqlite");

    let store = Store::open(StoreLocation::file(&path)).unwrap();
    store.ensure_schema().await.unwrap();
    let id = store
        .create_analysis(&Scope::All, &analysis("Gerçek", 85.5))
        .await
        .unwrap();
    assert_eq!(id, 1);
    store.close().await.unwrap();

    let reopened = Store::open(StoreLocation::file(&path)).unwrap();
    reopened.ensure_schema().await.unwrap();
    let rows = reopened
        .list_analyses(&Scope::All, Page::default())
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["confidence"], json!(85.5));
}

#[tokio::test]
async fn reset_deletes_the_file_and_rebuilds() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("database.sqlite");

    let store = Store::open(StoreLocation::file(&path)).unwrap();
    store.ensure_schema().await.unwrap();
    for _ in 0..4 {
        store
            .create_analysis(&Scope::All, &analysis("Sahte", 30.0))
            .await
            .unwrap();
    }
    store
        .submit_feedback(&NewFeedback {
            analysis_id: json!(1),
            feedback: json!("agree"),
            timestamp: json!("2025-06-01T12:00:00Z"),
        })
        .await
        .unwrap();

    store.reset(false).await.unwrap();
    assert!(path.exists());
    assert_eq!(
        store.statistics(&Scope::All).await.unwrap(),
        Statistics::default()
    );

    // ids restart in a rebuilt store
    let id = store
        .create_analysis(&Scope::All, &analysis("Gerçek", 99.0))
        .await
        .unwrap();
    assert_eq!(id, 1);
    let feedback_id = store.submit_feedback(&NewFeedback::default()).await.unwrap();
    assert_eq!(feedback_id, 1);
}

#[tokio::test]
async fn reset_with_seed_leaves_sample_row() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(StoreLocation::file(dir.path().join("db.sqlite"))).unwrap();
    store.ensure_schema().await.unwrap();

    store.reset(true).await.unwrap();
    let rows = store
        .list_analyses(&Scope::All, Page::default())
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["image_hash"], json!("sample_hash_123"));
    assert_eq!(rows[0]["user_id"], json!(null));
}

#[tokio::test]
async fn legacy_store_is_migrated_additively() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.sqlite");
    {
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(fakedetector::schema::ANALYSIS_RESULTS_TABLE)
            .unwrap();
        conn.execute(
            "INSERT INTO analysis_results (prediction, confidence) VALUES ('Gerçek', 70)",
            [],
        )
        .unwrap();
    }

    let store = Store::open(StoreLocation::file(&path)).unwrap();
    store.ensure_schema().await.unwrap();

    let owned = store
        .create_analysis(&Scope::Owner("alice".into()), &analysis("Sahte", 20.0))
        .await
        .unwrap();
    assert_eq!(owned, 2);

    let all = store.statistics(&Scope::All).await.unwrap();
    assert_eq!(all.total_analyses, 2);
    let alice = store
        .statistics(&Scope::Owner("alice".into()))
        .await
        .unwrap();
    assert_eq!(alice.total_analyses, 1);
    assert_eq!(alice.fake_count, 1);
}

#[tokio::test]
async fn closed_store_reports_closed() {
    let store = Store::open(StoreLocation::in_memory()).unwrap();
    store.ensure_schema().await.unwrap();
    store.close().await.unwrap();

    let err = store
        .create_analysis(&Scope::All, &analysis("Sahte", 1.0))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Closed));
}

#[tokio::test]
async fn failed_reset_leaves_the_store_closed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("database.sqlite");

    let store = Store::open(StoreLocation::file(&path)).unwrap();
    store.ensure_schema().await.unwrap();
    store
        .create_analysis(&Scope::All, &analysis("Gerçek", 80.0))
        .await
        .unwrap();

    // A directory where the store file should be makes the delete step fail
    std::fs::remove_file(&path).unwrap();
    std::fs::create_dir(&path).unwrap();

    assert!(store.reset(true).await.is_err());
    assert!(!store.ping().await);
    assert!(matches!(
        store.list_analyses(&Scope::All, Page::default()).await,
        Err(StoreError::Closed)
    ));
    assert!(matches!(
        store.statistics(&Scope::All).await,
        Err(StoreError::Closed)
    ));
}
