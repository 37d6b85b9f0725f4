//! Search probe abstraction for hosted search index checks
//!
//! The production implementation talks to the Algolia REST API directly over
//! reqwest: an index settings read followed by an empty, zero-hit query.

use crate::config::SearchCredentials;
use crate::domain::CheckError;
use crate::errors::{AdminError, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

const APPLICATION_ID_HEADER: &str = "x-algolia-application-id";
const API_KEY_HEADER: &str = "x-algolia-api-key";

/// Trait for reaching a search index
#[async_trait]
pub trait SearchProbe: Send + Sync {
    /// Read the index settings.
    async fn fetch_settings(&self, index: &str) -> std::result::Result<(), CheckError>;

    /// Run an empty query that returns no hits.
    async fn probe_search(&self, index: &str) -> std::result::Result<(), CheckError>;
}

/// Timeouts for the search REST client
#[derive(Debug, Clone)]
pub struct SearchClientConfig {
    /// Request timeout
    pub timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
}

impl Default for SearchClientConfig {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(10), connect_timeout: Duration::from_secs(5) }
    }
}

/// Error body returned by the search API.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

/// SearchProbe implementation backed by the Algolia REST API
pub struct AlgoliaClient {
    client: Client,
    base_url: Url,
    app_id: String,
    api_key: String,
}

impl AlgoliaClient {
    /// Build a client from configured credentials.
    ///
    /// Returns `Ok(None)` when the application id or admin key is missing.
    pub fn from_credentials(
        credentials: &SearchCredentials,
        config: SearchClientConfig,
    ) -> Result<Option<Self>> {
        let (Some(app_id), Some(api_key)) =
            (credentials.app_id.as_deref(), credentials.admin_api_key.as_deref())
        else {
            return Ok(None);
        };

        let base_url = credentials
            .host
            .clone()
            .unwrap_or_else(|| format!("https://{}-dsn.algolia.net", app_id));

        Self::new(app_id, api_key, &base_url, config).map(Some)
    }

    /// Create a client against an explicit base URL
    pub fn new(
        app_id: &str,
        api_key: &str,
        base_url: &str,
        config: SearchClientConfig,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            AdminError::config_with_source(
                format!("Invalid search host '{}'", base_url),
                Box::new(e),
            )
        })?;

        if base_url.cannot_be_a_base() {
            return Err(AdminError::config(format!("Invalid search host '{}'", base_url)));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| AdminError::internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, base_url, app_id: app_id.to_string(), api_key: api_key.to_string() })
    }

    /// `{base}/1/indexes/{index}/{action}` with the index name percent-encoded.
    fn index_url(&self, index: &str, action: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["1", "indexes", index, action]);
        }
        url
    }

    async fn check_response(response: Response) -> std::result::Result<(), CheckError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let message = response
            .json::<ApiErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message)
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| {
                format!("HTTP {} {}", status.as_u16(), status.canonical_reason().unwrap_or(""))
                    .trim_end()
                    .to_string()
            });

        Err(CheckError::new(Some(format!("http_{}", status.as_u16())), message))
    }
}

fn transport_error(error: reqwest::Error) -> CheckError {
    CheckError::new(Some("unreachable".to_string()), error.to_string())
}

#[async_trait]
impl SearchProbe for AlgoliaClient {
    #[instrument(skip(self), name = "search_fetch_settings")]
    async fn fetch_settings(&self, index: &str) -> std::result::Result<(), CheckError> {
        let url = self.index_url(index, "settings");
        debug!(url = %url, "Fetching index settings");

        let response = self
            .client
            .get(url)
            .header(APPLICATION_ID_HEADER, &self.app_id)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(transport_error)?;

        Self::check_response(response).await
    }

    #[instrument(skip(self), name = "search_probe_query")]
    async fn probe_search(&self, index: &str) -> std::result::Result<(), CheckError> {
        let url = self.index_url(index, "query");
        debug!(url = %url, "Running zero-hit query");

        let response = self
            .client
            .post(url)
            .header(APPLICATION_ID_HEADER, &self.app_id)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&json!({ "query": "", "hitsPerPage": 0 }))
            .send()
            .await
            .map_err(transport_error)?;

        Self::check_response(response).await
    }
}

#[cfg(test)]
pub use mock::MockSearchProbe;

#[cfg(test)]
mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Search probe with scripted failures and a call counter.
    #[derive(Clone, Default)]
    pub struct MockSearchProbe {
        settings_error: Option<CheckError>,
        search_error: Option<CheckError>,
        calls: Arc<AtomicUsize>,
    }

    impl MockSearchProbe {
        pub fn reachable() -> Self {
            Self::default()
        }

        pub fn failing_settings(error: CheckError) -> Self {
            Self { settings_error: Some(error), ..Default::default() }
        }

        pub fn failing_search(error: CheckError) -> Self {
            Self { search_error: Some(error), ..Default::default() }
        }

        /// Total number of probe calls made.
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SearchProbe for MockSearchProbe {
        async fn fetch_settings(&self, _index: &str) -> std::result::Result<(), CheckError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.settings_error.clone().map_or(Ok(()), Err)
        }

        async fn probe_search(&self, _index: &str) -> std::result::Result<(), CheckError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.search_error.clone().map_or(Ok(()), Err)
        }
    }
}
