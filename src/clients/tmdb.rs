use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::CatalogConfig;
use crate::services::catalog::{CatalogError, MovieCatalog};

/// TMDB v3 REST client.
#[derive(Clone)]
pub struct TmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
    language: String,
}

impl TmdbClient {
    /// Reuses a pooled client; its timeout applies to every call.
    #[must_use]
    pub fn with_shared_client(client: Client, config: &CatalogConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            language: config.language.clone(),
        }
    }

    async fn get(
        &self,
        operation: &'static str,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Value, CatalogError> {
        let url = format!("{}{}", self.base_url, path);
        let unavailable = |message: String| {
            warn!(operation, error = %message, "TMDB request failed");
            metrics::counter!("catalog_errors_total", "operation" => operation).increment(1);
            CatalogError::Unavailable { operation, message }
        };

        let started = std::time::Instant::now();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("language", self.language.as_str()),
            ])
            .query(params)
            .send()
            .await
            .map_err(|e| unavailable(e.without_url().to_string()))?;

        metrics::histogram!("catalog_request_duration_seconds", "operation" => operation)
            .record(started.elapsed().as_secs_f64());

        if response.status() == StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(unavailable(format!("TMDB API error: {status} - {body}")));
        }

        debug!(operation, "TMDB request succeeded");
        response
            .json::<Value>()
            .await
            .map_err(|e| unavailable(format!("Invalid TMDB response: {}", e.without_url())))
    }
}

#[async_trait]
impl MovieCatalog for TmdbClient {
    async fn search(&self, query: &str, page: u32) -> Result<Value, CatalogError> {
        self.get(
            "search",
            "/search/movie",
            &[("query", query.to_string()), ("page", page.to_string())],
        )
        .await
    }

    async fn popular(&self, page: u32) -> Result<Value, CatalogError> {
        self.get("popular", "/movie/popular", &[("page", page.to_string())])
            .await
    }

    async fn now_playing(&self, page: u32) -> Result<Value, CatalogError> {
        self.get(
            "now_playing",
            "/movie/now_playing",
            &[("page", page.to_string())],
        )
        .await
    }

    async fn details(&self, movie_id: i64) -> Result<Value, CatalogError> {
        self.get("details", &format!("/movie/{movie_id}"), &[]).await
    }
}
