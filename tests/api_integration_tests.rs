//! Integration Tests for API Endpoints
//!
//! Tests the full request/response cycle of the demo service, with the
//! in-process store standing in for Redis.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use cache_aside::{
    api::create_router, directory::EmployeeDirectory, store::MemoryConnector, AppState,
    CacheService,
};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_state() -> AppState {
    AppState::new(
        CacheService::new(Arc::new(MemoryConnector::new(2, 100))),
        EmployeeDirectory::seeded(Duration::ZERO),
    )
}

async fn send(app: &Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

// == Employee Endpoints ==

#[tokio::test]
async fn test_get_employee_success() {
    let app = create_router(create_test_state());

    let (status, json) = send(&app, "GET", "/employees/2").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["id"], 2);
    assert_eq!(json["first_name"], "Grace");
    assert_eq!(json["job_title"], "Compiler Engineer");
    assert_eq!(json["hire_date"], "1949-06-15");
}

#[tokio::test]
async fn test_second_read_served_from_cache() {
    let state = create_test_state();
    let app = create_router(state.clone());

    send(&app, "GET", "/employees/1").await;
    send(&app, "GET", "/employees/1").await;
    send(&app, "GET", "/employees/1").await;

    assert_eq!(state.directory.lookups(), 1);

    let (_, stats) = send(&app, "GET", "/stats").await;
    assert_eq!(stats["hits"], 2);
    assert_eq!(stats["misses"], 1);
    assert_eq!(stats["stores"], 1);
}

#[tokio::test]
async fn test_get_employee_not_found() {
    let app = create_router(create_test_state());

    let (status, json) = send(&app, "GET", "/employees/404").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("404"));
}

#[tokio::test]
async fn test_list_employees() {
    let app = create_router(create_test_state());

    let (status, json) = send(&app, "GET", "/employees").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_directory_outage_maps_to_bad_gateway() {
    let state = create_test_state();
    state.directory.set_available(false);
    let app = create_router(state);

    let (status, json) = send(&app, "GET", "/employees/1").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(json["error"].as_str().unwrap().contains("unavailable"));
}

#[tokio::test]
async fn test_cached_value_survives_directory_outage() {
    let state = create_test_state();
    let app = create_router(state.clone());

    send(&app, "GET", "/employees/3").await;
    state.directory.set_available(false);
    let (status, json) = send(&app, "GET", "/employees/3").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["last_name"], "Turing");
}

// == Admin Endpoints ==

#[tokio::test]
async fn test_flush_forces_reload() {
    let state = create_test_state();
    let app = create_router(state.clone());

    send(&app, "GET", "/employees/1").await;
    send(&app, "GET", "/employees").await;

    let (status, json) = send(&app, "POST", "/admin/flush").await;
    assert_eq!(status, StatusCode::OK);
    assert!(json.get("timestamp").is_some());

    send(&app, "GET", "/employees/1").await;
    assert_eq!(state.directory.lookups(), 3);

    let (_, stats) = send(&app, "GET", "/stats").await;
    assert_eq!(stats["flushes"], 1);
}

#[tokio::test]
async fn test_unreachable_store_maps_to_service_unavailable() {
    let store = MemoryConnector::new(1, 100);
    store.set_reachable(false);
    let state = AppState::new(
        CacheService::new(Arc::new(store)),
        EmployeeDirectory::seeded(Duration::ZERO),
    );
    let app = create_router(state);

    let (status, _) = send(&app, "GET", "/employees/1").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, _) = send(&app, "POST", "/admin/flush").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

// == Health ==

#[tokio::test]
async fn test_health_reports_lazy_connection() {
    let app = create_router(create_test_state());

    let (status, json) = send(&app, "GET", "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["store_connected"], false);

    send(&app, "GET", "/employees/1").await;

    let (_, json) = send(&app, "GET", "/health").await;
    assert_eq!(json["store_connected"], true);
}
