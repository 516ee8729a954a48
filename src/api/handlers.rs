//! API Handlers
//!
//! HTTP request handlers. Employee reads go through the cache with the
//! directory as the fallback loader.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::cache::CacheService;
use crate::directory::EmployeeDirectory;
use crate::error::Result;
use crate::models::{Employee, ErrorResponse, FlushResponse, HealthResponse, StatsResponse};

/// Cache key of the full employee list
pub const ALL_EMPLOYEES_KEY: &str = "employees:all";

/// Cache key of a single employee
pub fn employee_key(id: u32) -> String {
    format!("employee:{}", id)
}

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Shared cache-aside service
    pub cache: Arc<CacheService>,
    /// Slow source behind the cache
    pub directory: Arc<EmployeeDirectory>,
}

impl AppState {
    pub fn new(cache: CacheService, directory: EmployeeDirectory) -> Self {
        Self {
            cache: Arc::new(cache),
            directory: Arc::new(directory),
        }
    }
}

/// Handler for GET /employees/:id
pub async fn get_employee_handler(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Response> {
    let directory = Arc::clone(&state.directory);
    let employee: Option<Employee> = state
        .cache
        .get_or_load(&employee_key(id), move || async move { directory.find(id).await })
        .await?;

    Ok(match employee {
        Some(employee) => Json(employee).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(format!("Employee {} not found", id))),
        )
            .into_response(),
    })
}

/// Handler for GET /employees
pub async fn list_employees_handler(State(state): State<AppState>) -> Result<Json<Vec<Employee>>> {
    let directory = Arc::clone(&state.directory);
    let employees: Option<Vec<Employee>> = state
        .cache
        .get_or_load(ALL_EMPLOYEES_KEY, move || async move {
            directory.all().await.map(Some)
        })
        .await?;

    Ok(Json(employees.unwrap_or_default()))
}

/// Handler for POST /admin/flush
pub async fn flush_handler(State(state): State<AppState>) -> Result<Json<FlushResponse>> {
    state.cache.flush_all().await?;
    Ok(Json(FlushResponse::completed()))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::new(
        state.cache.stats(),
        state.cache.connections().connect_count(),
    ))
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(
        state.cache.connections().is_connected().await,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CacheError;
    use crate::store::MemoryConnector;
    use std::time::Duration;

    fn state() -> AppState {
        AppState::new(
            CacheService::new(Arc::new(MemoryConnector::new(1, 100))),
            EmployeeDirectory::seeded(Duration::ZERO),
        )
    }

    #[tokio::test]
    async fn test_get_employee_caches_lookup() {
        let state = state();

        let first = get_employee_handler(State(state.clone()), Path(3)).await.unwrap();
        let second = get_employee_handler(State(state.clone()), Path(3)).await.unwrap();

        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(second.status(), StatusCode::OK);
        assert_eq!(state.directory.lookups(), 1);
    }

    #[tokio::test]
    async fn test_missing_employee_not_cached() {
        let state = state();

        let first = get_employee_handler(State(state.clone()), Path(42)).await.unwrap();
        let second = get_employee_handler(State(state.clone()), Path(42)).await.unwrap();

        assert_eq!(first.status(), StatusCode::NOT_FOUND);
        assert_eq!(second.status(), StatusCode::NOT_FOUND);
        assert_eq!(state.directory.lookups(), 2);
    }

    #[tokio::test]
    async fn test_directory_outage_is_loader_error() {
        let state = state();
        state.directory.set_available(false);

        let result = get_employee_handler(State(state), Path(1)).await;
        assert!(matches!(result, Err(CacheError::Loader(_))));
    }

    #[tokio::test]
    async fn test_list_then_flush() {
        let state = state();

        let list = list_employees_handler(State(state.clone())).await.unwrap();
        assert_eq!(list.len(), 5);

        flush_handler(State(state.clone())).await.unwrap();
        list_employees_handler(State(state.clone())).await.unwrap();

        assert_eq!(state.directory.lookups(), 2);
        assert_eq!(state.cache.stats().flushes, 1);
    }

    #[tokio::test]
    async fn test_stats_and_health_handlers() {
        let state = state();

        let health = health_handler(State(state.clone())).await;
        assert_eq!(health.status, "healthy");
        assert!(!health.store_connected);

        get_employee_handler(State(state.clone()), Path(1)).await.unwrap();

        let stats = stats_handler(State(state.clone())).await;
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.connects, 1);
        assert!(health_handler(State(state)).await.store_connected);
    }
}
