use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use crate::observability::trace_http_requests;
use crate::services::ConnectivityService;
use crate::storage::{SettingsRepository, TestLogRepository};

use super::handlers::{
    get_config_handler, health_handler, list_logs_handler, test_all_handler,
    test_database_handler, test_search_handler, update_config_handler,
};

/// Shared state for the admin handlers
#[derive(Clone)]
pub struct ApiState {
    pub settings: Arc<dyn SettingsRepository>,
    pub logs: Arc<dyn TestLogRepository>,
    pub connectivity: Arc<ConnectivityService>,
}

impl ApiState {
    pub fn new(
        settings: Arc<dyn SettingsRepository>,
        logs: Arc<dyn TestLogRepository>,
        connectivity: ConnectivityService,
    ) -> Self {
        Self { settings, logs, connectivity: Arc::new(connectivity) }
    }
}

/// Build the admin router.
///
/// Callers are assumed to be authorized already; an embedding application can
/// wrap the returned router with its own auth layer.
pub fn build_router(state: ApiState) -> Router {
    let admin_api = Router::new()
        .route("/api/admin/config", get(get_config_handler).post(update_config_handler))
        .route("/api/admin/logs", get(list_logs_handler))
        .route("/api/admin/test/database", post(test_database_handler))
        .route("/api/admin/test/search", post(test_search_handler))
        .route("/api/admin/test/all", post(test_all_handler))
        .with_state(state);

    Router::new()
        .route("/health", get(health_handler))
        .merge(admin_api)
        .layer(middleware::from_fn(trace_http_requests))
        .layer(CorsLayer::permissive())
}
