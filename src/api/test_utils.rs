//! Test utilities for API handler testing
//!
//! Builds an [`ApiState`] over in-memory repositories and scripted probes, and
//! drives the full router with `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use crate::api::routes::{build_router, ApiState};
use crate::services::database_probe::MockDatabaseProbe;
use crate::services::search_probe::MockSearchProbe;
use crate::services::{ConnectivityService, SearchProbe};
use crate::storage::repositories::{MockSettingsRepository, MockTestLogRepository};

/// Router plus handles on the in-memory dependencies behind it
pub struct TestApp {
    pub router: Router,
    pub settings: MockSettingsRepository,
    pub logs: MockTestLogRepository,
    pub database: MockDatabaseProbe,
    pub search: Option<MockSearchProbe>,
}

/// Builder for creating test API state with configurable dependencies
pub struct TestAppBuilder {
    default_database: String,
    database: MockDatabaseProbe,
    search: Option<MockSearchProbe>,
}

impl Default for TestAppBuilder {
    fn default() -> Self {
        Self {
            default_database: "catalog".to_string(),
            database: MockDatabaseProbe::with_tables(&[]),
            search: None,
        }
    }
}

impl TestAppBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_database(mut self, probe: MockDatabaseProbe) -> Self {
        self.database = probe;
        self
    }

    pub fn with_search(mut self, probe: MockSearchProbe) -> Self {
        self.search = Some(probe);
        self
    }

    pub fn build(self) -> TestApp {
        let settings = MockSettingsRepository::new(&self.default_database);
        let logs = MockTestLogRepository::new();
        let state = self.state_over(&settings, &logs);

        TestApp {
            router: build_router(state),
            settings,
            logs,
            database: self.database,
            search: self.search,
        }
    }

    /// State only, for tests that do not go through the router.
    pub fn build_state(self) -> ApiState {
        let settings = MockSettingsRepository::new(&self.default_database);
        self.state_over(&settings, &MockTestLogRepository::new())
    }

    fn state_over(
        &self,
        settings: &MockSettingsRepository,
        logs: &MockTestLogRepository,
    ) -> ApiState {
        let connectivity = ConnectivityService::new(
            Arc::new(logs.clone()),
            Arc::new(self.database.clone()),
            self.search.clone().map(|probe| Arc::new(probe) as Arc<dyn SearchProbe>),
        );
        ApiState::new(Arc::new(settings.clone()), Arc::new(logs.clone()), connectivity)
    }
}

impl TestApp {
    /// Send a request with an optional raw body and return status plus parsed JSON.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&str>,
    ) -> (StatusCode, Value) {
        let body = body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty);
        let request = Request::builder()
            .method(method)
            .uri(path)
            .header("content-type", "application/json")
            .body(body)
            .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json =
            if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };

        (status, json)
    }

    pub async fn get(&self, path: &str) -> (StatusCode, Value) {
        self.send(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: &str) -> (StatusCode, Value) {
        self.send(Method::POST, path, Some(body)).await
    }
}
