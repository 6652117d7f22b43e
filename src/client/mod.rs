//! Recipe API client.
//!
//! This module talks to the remote recipe API: a `complexSearch` endpoint
//! for searching by ingredients and filters, and an `information` endpoint
//! for fetching one recipe by id. Every call is a fresh round trip; there
//! is no retry and no caching.

use crate::config::ClientConfig;
use crate::model::{Recipe, RecipeDetail, SearchResponse};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

mod query;

pub use query::{
    parse_ingredients, Diet, Filters, Intolerance, Page, SearchQuery, DIET_KEY, INTOLERANCES_KEY,
};
use query::{detail_url, search_url};

/// Errors that can occur when calling the recipe API.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API returned status {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// The HTTP seam of the client: fetches a URL and returns the body.
///
/// Implementations map transport failures to [`ApiError::Network`] and
/// non-success statuses to [`ApiError::Http`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<String, ApiError>;
}

/// [`Transport`] backed by `reqwest` with the library's default timeouts.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<String, ApiError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(ApiError::Http {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

/// Client for the recipe API.
#[derive(Clone)]
pub struct RecipeClient {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for RecipeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecipeClient")
            .field("base_url", &self.config.base_url)
            .field("page_size", &self.config.page_size)
            .finish_non_exhaustive()
    }
}

impl RecipeClient {
    /// Creates a client that talks HTTP through `reqwest`.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(config, Arc::new(HttpTransport::new()))
    }

    /// Creates a client over a custom transport.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        RecipeClient { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Searches recipes by ingredients and filters.
    ///
    /// An empty ingredient list searches without a query term. Filters are
    /// forwarded verbatim. Returns the first page the API chooses to send.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Network`] or [`ApiError::Http`] on transport
    /// failure and [`ApiError::Decode`] if the body has no `results` list.
    pub async fn search(
        &self,
        ingredients: &[String],
        filters: &BTreeMap<String, String>,
    ) -> Result<Vec<Recipe>, ApiError> {
        let query = SearchQuery::new(ingredients.to_vec(), filters.clone());
        self.run_search(&query, None).await
    }

    /// Fetches one page of search results.
    pub async fn search_page(
        &self,
        query: &SearchQuery,
        offset: u32,
        number: u32,
    ) -> Result<Vec<Recipe>, ApiError> {
        self.run_search(query, Some(Page { offset, number })).await
    }

    async fn run_search(
        &self,
        query: &SearchQuery,
        page: Option<Page>,
    ) -> Result<Vec<Recipe>, ApiError> {
        debug!(
            ingredients = ?query.ingredients,
            filters = ?query.filters,
            ?page,
            "searching recipes"
        );
        let url = search_url(&self.config.base_url, &self.config.api_key, query, page);
        let response: SearchResponse = self.get_json(&url).await?;
        debug!(count = response.results.len(), "search returned");
        Ok(response.results)
    }

    /// Fetches the full detail of one recipe, nutrition included.
    pub async fn fetch_detail(&self, id: i64) -> Result<RecipeDetail, ApiError> {
        debug!(id, "fetching recipe detail");
        let url = detail_url(&self.config.base_url, &self.config.api_key, id);
        self.get_json(&url).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let body = self.transport.get(url).await.inspect_err(|e| {
            warn!(error = %e, "recipe API request failed");
        })?;
        serde_json::from_str(&body).map_err(|e| {
            warn!(error = %e, "recipe API response did not match the expected shape");
            ApiError::Decode(e)
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// In-process transport that replays canned bodies and records URLs.
    #[derive(Default)]
    pub(crate) struct FakeTransport {
        responses: Mutex<VecDeque<Result<String, ApiError>>>,
        pub(crate) requests: Mutex<Vec<String>>,
    }

    impl FakeTransport {
        pub(crate) fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        pub(crate) fn push_body(&self, body: impl Into<String>) {
            self.responses.lock().unwrap().push_back(Ok(body.into()));
        }

        pub(crate) fn push_error(&self, error: ApiError) {
            self.responses.lock().unwrap().push_back(Err(error));
        }

        pub(crate) fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn get(&self, url: &str) -> Result<String, ApiError> {
            self.requests.lock().unwrap().push(url.to_string());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ApiError::Network("no canned response".to_string())))
        }
    }

    /// Builds a `complexSearch` body with the given ids.
    pub(crate) fn results_body(ids: &[i64]) -> String {
        let results: Vec<serde_json::Value> = ids
            .iter()
            .map(|id| serde_json::json!({"id": id, "title": format!("Recipe {id}"), "image": ""}))
            .collect();
        serde_json::json!({ "results": results }).to_string()
    }

    pub(crate) fn client_with(transport: Arc<FakeTransport>) -> RecipeClient {
        let config = ClientConfig {
            base_url: "http://mock/recipes".to_string(),
            api_key: "test-key".to_string(),
            page_size: 10,
        };
        RecipeClient::with_transport(config, transport)
    }
}
