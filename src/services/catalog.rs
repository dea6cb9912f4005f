//! Seam between the HTTP layer and the third-party movie catalog.
//!
//! Responses are passed through as raw JSON: the catalog's shape is the
//! client's contract, this service only proxies it.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Movie not found in catalog")]
    NotFound,

    #[error("Catalog request '{operation}' failed: {message}")]
    Unavailable {
        operation: &'static str,
        message: String,
    },
}

/// Movie search and metadata. One attempt per call, no retries.
#[async_trait::async_trait]
pub trait MovieCatalog: Send + Sync {
    async fn search(&self, query: &str, page: u32) -> Result<Value, CatalogError>;

    async fn popular(&self, page: u32) -> Result<Value, CatalogError>;

    async fn now_playing(&self, page: u32) -> Result<Value, CatalogError>;

    async fn details(&self, movie_id: i64) -> Result<Value, CatalogError>;
}
