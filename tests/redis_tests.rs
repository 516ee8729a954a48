//! Tests against a live Redis server
//!
//! Ignored by default. Run with a disposable server (FLUSHALL is issued):
//! `REDIS_URL=redis://127.0.0.1:6379 cargo test --test redis_tests -- --ignored`

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cache_aside::cache::{CacheService, DEFAULT_TTL};
use cache_aside::store::{ConnectOptions, Connector, RedisConnector};
use cache_aside::CacheError;

fn redis_url() -> String {
    std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string())
}

fn service() -> CacheService {
    CacheService::new(Arc::new(RedisConnector::new(redis_url())))
}

#[tokio::test]
#[ignore = "requires a running Redis server"]
async fn test_redis_get_or_load_and_ttl() {
    let service = service();
    service.flush_all().await.unwrap();
    let calls = &AtomicUsize::new(0);
    let loader = move || async move {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(Some(vec![1u32, 2, 3]))
    };

    assert_eq!(
        service.get_or_load("redis:list", loader).await.unwrap(),
        Some(vec![1, 2, 3])
    );
    assert_eq!(
        service.get_or_load("redis:list", loader).await.unwrap(),
        Some(vec![1, 2, 3])
    );
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let remaining = service.time_to_live("redis:list").await.unwrap().unwrap();
    assert!(remaining <= DEFAULT_TTL);
    assert!(remaining > DEFAULT_TTL - Duration::from_secs(5));
}

#[tokio::test]
#[ignore = "requires a running Redis server"]
async fn test_redis_expiration() {
    let service = service();
    let calls = &AtomicUsize::new(0);
    let loader = move || async move {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(Some("value".to_string()))
    };

    service.flush_all().await.unwrap();
    service
        .get_or_load_with_ttl("redis:short", loader, Duration::from_millis(200))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(400)).await;
    service
        .get_or_load_with_ttl("redis:short", loader, Duration::from_millis(200))
        .await
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
#[ignore = "requires a running Redis server"]
async fn test_redis_flush_all() {
    let service = service();
    let calls = &AtomicUsize::new(0);
    let loader = move || async move {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(Some(true))
    };

    service.get_or_load("redis:flag", loader).await.unwrap();
    service.flush_all().await.unwrap();
    service.get_or_load("redis:flag", loader).await.unwrap();

    assert!(calls.load(Ordering::SeqCst) >= 2);
}

#[tokio::test]
#[ignore = "requires a running Redis server"]
async fn test_redis_flush_needs_admin_connection() {
    let connector = RedisConnector::new(redis_url());
    let conn = connector.connect(ConnectOptions::default()).await.unwrap();
    let endpoint = conn.endpoints().remove(0);

    let result = conn.flush_all(&endpoint).await;
    assert!(matches!(result, Err(CacheError::AdminRequired(_))));
}
