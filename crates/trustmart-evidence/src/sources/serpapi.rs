//! SerpApi client for Google web search and Google reverse image search.
//!
//! Endpoint: https://serpapi.com/search.json

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument};

use super::{SearchError, SearchProvider, SearchResult};
use crate::models::{ImageMatch, ReverseImageResult, SearchHit};

pub struct SerpApiClient {
    client: Client,
    base_url: String,
    api_key: SecretString,
}

impl SerpApiClient {
    pub fn new(base_url: impl Into<String>, api_key: SecretString, timeout: Duration) -> SearchResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("trustmart/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, base_url: base_url.into(), api_key })
    }

    async fn get(&self, params: &[(&str, &str)]) -> SearchResult<serde_json::Value> {
        let resp = self
            .client
            .get(&self.base_url)
            .query(params)
            .query(&[("api_key", self.api_key.expose_secret())])
            .send()
            .await?;

        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(SearchError::QuotaExceeded(format!("HTTP {status}")));
        }
        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| SearchError::Malformed(e.to_string()))?;

        if let Some(message) = body["error"].as_str() {
            return Err(classify_provider_error(message));
        }
        if !status.is_success() {
            return Err(SearchError::Unavailable(format!("HTTP {status}")));
        }
        Ok(body)
    }
}

/// SerpApi reports an exhausted plan as a 200/4xx body with an `error` string.
fn classify_provider_error(message: &str) -> SearchError {
    let lower = message.to_lowercase();
    if lower.contains("run out of searches") || lower.contains("monthly") || lower.contains("quota") {
        SearchError::QuotaExceeded(message.to_string())
    } else {
        SearchError::Unavailable(message.to_string())
    }
}

fn str_field(value: &serde_json::Value, key: &str) -> String {
    value[key].as_str().unwrap_or_default().to_string()
}

pub(crate) fn parse_organic_results(body: &serde_json::Value) -> SearchResult<Vec<SearchHit>> {
    let Some(results) = body.get("organic_results") else {
        // A query with no results omits the array entirely.
        return Ok(Vec::new());
    };
    let results = results
        .as_array()
        .ok_or_else(|| SearchError::Malformed("organic_results is not an array".into()))?;
    Ok(results
        .iter()
        .filter(|r| r["link"].is_string())
        .map(|r| SearchHit {
            title: str_field(r, "title"),
            snippet: str_field(r, "snippet"),
            link: str_field(r, "link"),
        })
        .collect())
}

pub(crate) fn parse_reverse_image(body: &serde_json::Value) -> ReverseImageResult {
    let matches = body["image_results"]
        .as_array()
        .map(|results| {
            results
                .iter()
                .filter(|r| r["link"].is_string())
                .map(|r| ImageMatch {
                    title: str_field(r, "title"),
                    link: str_field(r, "link"),
                    snippet: r["snippet"].as_str().map(String::from),
                })
                .collect()
        })
        .unwrap_or_default();

    ReverseImageResult {
        matches,
        knowledge_graph: body["knowledge_graph"]["title"].as_str().map(String::from),
    }
}

#[async_trait]
impl SearchProvider for SerpApiClient {
    #[instrument(skip(self))]
    async fn web_search(&self, query: &str, max_results: usize) -> SearchResult<Vec<SearchHit>> {
        let num = max_results.to_string();
        let body = self.get(&[("engine", "google"), ("q", query), ("num", &num)]).await?;
        let mut hits = parse_organic_results(&body)?;
        hits.truncate(max_results);
        debug!(count = hits.len(), "web search returned results");
        Ok(hits)
    }

    #[instrument(skip(self))]
    async fn reverse_image(&self, image_url: &str) -> SearchResult<ReverseImageResult> {
        let body = self
            .get(&[("engine", "google_reverse_image"), ("image_url", image_url)])
            .await?;
        let result = parse_reverse_image(&body);
        debug!(count = result.matches.len(), "reverse image search returned matches");
        Ok(result)
    }

    fn name(&self) -> &'static str {
        "serpapi"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_quota_message_is_distinguished() {
        let err = classify_provider_error("Your account has run out of searches.");
        assert!(err.is_quota());
        assert!(!classify_provider_error("Invalid API key").is_quota());
    }

    #[test]
    fn test_parse_organic_results_skips_linkless_rows() {
        let body = json!({
            "organic_results": [
                {"title": "Galaxy Buds 2 - Amazon.in", "snippet": "₹12,000", "link": "https://www.amazon.in/x"},
                {"title": "ad block"}
            ]
        });
        let hits = parse_organic_results(&body).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].snippet, "₹12,000");
    }

    #[test]
    fn test_missing_results_is_empty_not_error() {
        assert!(parse_organic_results(&json!({"search_metadata": {}})).unwrap().is_empty());
        assert!(matches!(
            parse_organic_results(&json!({"organic_results": "nope"})),
            Err(SearchError::Malformed(_))
        ));
    }

    #[test]
    fn test_parse_reverse_image_with_knowledge_graph() {
        let body = json!({
            "image_results": [{"title": "Buds", "link": "https://flipkart.com/p"}],
            "knowledge_graph": {"title": "Samsung Galaxy Buds2"}
        });
        let parsed = parse_reverse_image(&body);
        assert_eq!(parsed.matches.len(), 1);
        assert_eq!(parsed.knowledge_graph.as_deref(), Some("Samsung Galaxy Buds2"));
    }
}
