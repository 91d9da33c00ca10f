use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use care_tracker_backend::{
    config::ServerConfig,
    create_router,
    domain::ManualClock,
    storage::{FileConnection, FileDocumentStore, MemoryDocumentStore},
    AppState,
};
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()))
}

fn memory_app() -> Router {
    let state = AppState::new(Arc::new(MemoryDocumentStore::new()), clock());
    create_router(state, &ServerConfig::default()).unwrap()
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    user: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("x-user-id", user);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn test_record_lifecycle_over_http() {
    let app = memory_app();

    let (status, saved) = send(
        &app,
        "POST",
        "/api/tracking/weight",
        Some("parent-1"),
        Some(json!({ "date": "2024-04-30", "values": { "weight": " 4.25 " } })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(saved["weight"], 4.25);
    assert_eq!(saved["date"], "2024-04-30T00:00:00.000Z");
    assert_eq!(saved["createdAt"], "2024-05-01T08:00:00.000Z");
    let id = saved["id"].as_str().unwrap().to_string();

    let (status, list) = send(&app, "GET", "/api/tracking/weight", Some("parent-1"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["metric"], "weight");
    assert_eq!(list["records"].as_array().unwrap().len(), 1);

    let (status, other_user) =
        send(&app, "GET", "/api/tracking/weight", Some("parent-2"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(other_user["records"].as_array().unwrap().is_empty());

    let uri = format!("/api/tracking/weight/{id}");
    let (status, _) = send(&app, "DELETE", &uri, Some("parent-1"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, list) = send(&app, "GET", "/api/tracking/weight", Some("parent-1"), None).await;
    assert!(list["records"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_numbers_are_omitted_from_saved_record() {
    let app = memory_app();
    let (status, saved) = send(
        &app,
        "POST",
        "/api/tracking/blood_pressure",
        Some("parent-1"),
        Some(json!({ "values": { "systolic": "abc", "diastolic": "72" } })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(saved.get("systolic").is_none());
    assert_eq!(saved["diastolic"], 72.0);
}

#[tokio::test]
async fn test_missing_identity_maps_to_status_codes() {
    let app = memory_app();

    let (status, list) = send(&app, "GET", "/api/tracking/feeding", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(list["records"].as_array().unwrap().is_empty());

    let (status, body) = send(
        &app,
        "POST",
        "/api/tracking/feeding",
        None,
        Some(json!({ "values": { "amount": "60" } })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Authentication required: please log in");

    let (status, _) = send(&app, "GET", "/api/export/csv", Some("../escape"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_bad_date_is_a_validation_error() {
    let app = memory_app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/tracking/pulse_ox",
        Some("parent-1"),
        Some(json!({ "date": "last tuesday", "values": { "pulseOx": "97" } })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("last tuesday"));
}

#[tokio::test]
async fn test_export_and_summary_endpoints() {
    let app = memory_app();
    for amount in ["60", "90"] {
        send(
            &app,
            "POST",
            "/api/tracking/feeding",
            Some("parent-1"),
            Some(json!({ "values": { "amount": amount, "type": "bottle" } })),
        )
        .await;
    }

    let (status, summary) = send(&app, "GET", "/api/export/summary", Some("parent-1"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary, json!({ "feeding": 2, "weight": 0, "bloodPressure": 0, "pulseOx": 0 }));

    let (status, csv) = send(&app, "GET", "/api/export/csv", Some("parent-1"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(csv["format"], "csv");
    assert_eq!(csv["record_count"], 2);
    assert_eq!(csv["content"].as_str().unwrap().lines().count(), 3);

    let (status, text) = send(&app, "GET", "/api/export/text", Some("parent-1"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(text["content"].as_str().unwrap().contains("FEEDING RECORDS (2)"));
}

#[tokio::test]
async fn test_chart_endpoint_limits_points() {
    let app = memory_app();
    for day in 1..=4 {
        send(
            &app,
            "POST",
            "/api/tracking/pulse_ox",
            Some("parent-1"),
            Some(json!({ "date": format!("2024-04-0{day}"), "values": { "pulseOx": "96" } })),
        )
        .await;
    }

    let uri = "/api/tracking/pulse_ox/chart?limit=2";
    let (status, chart) = send(&app, "GET", uri, Some("parent-1"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(chart["unit"], "%");
    let labels: Vec<&str> = chart["points"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["label"].as_str().unwrap())
        .collect();
    assert_eq!(labels, vec!["4/3", "4/4"]);
}

#[tokio::test]
async fn test_journal_endpoints() {
    let app = memory_app();

    let (status, _) = send(
        &app,
        "POST",
        "/api/journal",
        Some("parent-1"),
        Some(json!({ "title": "", "content": "no title" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, entry) = send(
        &app,
        "POST",
        "/api/journal",
        Some("parent-1"),
        Some(json!({ "title": "Clinic", "content": "Weight check went well" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = entry["id"].as_str().unwrap().to_string();

    let (_, list) = send(&app, "GET", "/api/journal", Some("parent-1"), None).await;
    assert_eq!(list["entries"][0]["title"], "Clinic");

    let uri = format!("/api/journal/{id}");
    let (status, _) = send(&app, "DELETE", &uri, Some("parent-1"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_locale_toggle() {
    let app = memory_app();

    let (_, locale) = send(&app, "GET", "/api/locale", None, None).await;
    assert_eq!(locale, json!({ "language": "en", "is_rtl": false }));

    let (_, locale) = send(&app, "POST", "/api/locale/toggle", None, None).await;
    assert_eq!(locale, json!({ "language": "ar", "is_rtl": true }));
}

#[tokio::test]
async fn test_file_store_falls_back_to_local_sort() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileDocumentStore::new(FileConnection::new(temp_dir.path()).unwrap());
    let clock = clock();
    let state = AppState::new(Arc::new(store), clock.clone());
    let app = create_router(state, &ServerConfig::default()).unwrap();

    for weight in ["3.0", "3.1", "3.2"] {
        send(
            &app,
            "POST",
            "/api/tracking/weight",
            Some("parent-1"),
            Some(json!({ "values": { "weight": weight } })),
        )
        .await;
        clock.advance(chrono::Duration::minutes(10));
    }

    let (status, list) = send(&app, "GET", "/api/tracking/weight", Some("parent-1"), None).await;
    assert_eq!(status, StatusCode::OK);
    let weights: Vec<f64> = list["records"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["weight"].as_f64().unwrap())
        .collect();
    assert_eq!(weights, vec![3.2, 3.1, 3.0]);
    assert!(temp_dir.path().join("users/parent-1/trackingweight.yaml").exists());
}
