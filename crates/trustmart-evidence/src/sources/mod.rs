//! Web-search and reverse-image-search provider clients.

pub mod serpapi;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use trustmart_common::ExternalServiceError;

use crate::models::{ReverseImageResult, SearchHit};

#[derive(Debug, Error)]
pub enum SearchError {
    /// The provider reported an exhausted plan or rate limit.
    #[error("search quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("search call timed out after {0:?}")]
    Timeout(Duration),

    #[error("search provider unavailable: {0}")]
    Unavailable(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed search response: {0}")]
    Malformed(String),
}

impl SearchError {
    pub fn is_quota(&self) -> bool {
        matches!(self, SearchError::QuotaExceeded(_))
    }
}

impl From<SearchError> for ExternalServiceError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::QuotaExceeded(m) => ExternalServiceError::QuotaExceeded(m),
            SearchError::Malformed(m) => ExternalServiceError::MalformedResponse(m),
            other => ExternalServiceError::Transient(other.to_string()),
        }
    }
}

pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Common interface for search capabilities.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Ordered organic results for a text query.
    async fn web_search(&self, query: &str, max_results: usize) -> SearchResult<Vec<SearchHit>>;

    /// Pages on which the image at `image_url` appears.
    async fn reverse_image(&self, image_url: &str) -> SearchResult<ReverseImageResult>;

    fn name(&self) -> &'static str;
}
