//! Concurrent evidence retrieval.
//!
//! All lookups for one product (web query, seller query, one reverse-image
//! lookup per image) are awaited together. Each is bounded by its own
//! timeout; a timed-out lookup is reported exactly like a failed one.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::{info, instrument, warn};
use trustmart_common::Product;
use trustmart_config::SearchConfig;

use crate::extract::{EvidenceExtractor, ImageLookup, RawEvidence};
use crate::models::EvidenceBundle;
use crate::sources::{SearchError, SearchProvider, SearchResult};

pub struct EvidenceCollector {
    provider: Option<Arc<dyn SearchProvider>>,
    extractor: EvidenceExtractor,
    query_suffix: String,
    max_results: usize,
    max_images: usize,
    call_timeout: Duration,
}

impl EvidenceCollector {
    pub fn new(
        provider: Option<Arc<dyn SearchProvider>>,
        extractor: EvidenceExtractor,
        search: &SearchConfig,
        max_images: usize,
    ) -> Self {
        Self {
            provider,
            extractor,
            query_suffix: search.query_suffix.clone(),
            max_results: search.max_results,
            max_images,
            call_timeout: Duration::from_secs(search.timeout_secs),
        }
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    pub fn extractor(&self) -> &EvidenceExtractor {
        &self.extractor
    }

    pub fn product_query(&self, product: &Product) -> String {
        format!("{}{}", product.name.trim(), self.query_suffix)
    }

    async fn bounded<T>(&self, call: impl Future<Output = SearchResult<T>>) -> SearchResult<T> {
        match tokio::time::timeout(self.call_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(SearchError::Timeout(self.call_timeout)),
        }
    }

    /// Run every lookup for `product` concurrently. Never fails.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn retrieve(&self, product: &Product) -> RawEvidence {
        let Some(provider) = &self.provider else {
            warn!("no search provider configured, evidence degraded to insufficient");
            return RawEvidence::unavailable(product, "web search capability not configured");
        };

        let query = self.product_query(product);
        let seller_query = product.seller.as_ref().map(|s| format!("{s} seller reviews"));
        let image_urls: Vec<&str> = product
            .images
            .iter()
            .take(self.max_images)
            .map(|img| img.url.as_str())
            .collect();

        let web = self.bounded(provider.web_search(&query, self.max_results));
        let seller = async {
            match &seller_query {
                Some(q) => Some(self.bounded(provider.web_search(q, self.max_results)).await),
                None => None,
            }
        };
        let images = join_all(image_urls.iter().map(|url| async move {
            ImageLookup {
                image_url: url.to_string(),
                result: self.bounded(provider.reverse_image(url)).await,
            }
        }));

        let (web, seller_web, images) = futures::join!(web, seller, images);

        for failure in std::iter::once(web.as_ref().err())
            .chain(seller_web.iter().map(|r| r.as_ref().err()))
            .chain(images.iter().map(|l| l.result.as_ref().err()))
            .flatten()
        {
            warn!(provider = provider.name(), error = %failure, "evidence lookup degraded");
        }

        RawEvidence { web, seller_web, images }
    }

    /// Retrieve and extract.
    pub async fn collect(&self, product: &Product) -> EvidenceBundle {
        let raw = self.retrieve(product).await;
        let bundle = self.extractor.extract(product, &raw);
        info!(
            product_id = %product.id,
            prices = bundle.prices.items().len(),
            images = bundle.images.items().len(),
            notes = bundle.notes.len(),
            "evidence collected"
        );
        bundle
    }
}
