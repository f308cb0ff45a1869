//! Postgres backend tests.
//!
//! Require a reachable database. Run with:
//! TEST_DATABASE_URL=postgres://... cargo test -p form-coach-service --test pg_store_test -- --ignored

use form_coach_service::models::{NewCoachOutput, NewFormScan, RecordId};
use form_coach_service::services::store::PgStore;
use form_coach_service::services::ScanStore;
use serde_json::json;

async fn connect() -> PgStore {
    let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL must be set");
    let store = PgStore::new(&url, 2, 1)
        .await
        .expect("Failed to connect to test database");
    store
        .run_migrations()
        .await
        .expect("Failed to run migrations");
    store
}

#[tokio::test]
#[ignore]
async fn database_assigns_form_scan_id() {
    let store = connect().await;
    let analysis = json!({ "overall_score": 81, "metrics": [], "context": {} });
    let row = NewFormScan::new("https://storage.example.com/videos/pg.mp4", analysis.clone());

    let first = store.insert_form_scan(row.clone()).await.expect("insert failed");
    let second = store.insert_form_scan(row).await.expect("insert failed");

    assert_ne!(first.id, second.id);
    assert!(matches!(first.id, RecordId::Text(_)));
    assert_eq!(first.analysis_data.0, analysis);
    store.health_check().await.expect("health check failed");
}

#[tokio::test]
#[ignore]
async fn inserts_coach_output_without_matching_scan() {
    let store = connect().await;
    let row = NewCoachOutput::new("not-a-real-scan", "Drive through your heels.");

    let output = store.insert_coach_output(row).await.expect("insert failed");

    assert_eq!(output.scan_id, "not-a-real-scan");
    assert_eq!(output.coaching_text, "Drive through your heels.");
}
