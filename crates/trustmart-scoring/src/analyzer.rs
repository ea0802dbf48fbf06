//! Product analysis entry point: collect evidence, score, aggregate.

use std::time::Duration;

use tracing::{info, instrument, warn};
use trustmart_common::{entities::validate_price, Product};
use trustmart_evidence::{EvidenceBundle, EvidenceCollector};

use crate::aggregator::{TrustAggregator, TrustReport};
use crate::checks::score_checks;
use crate::error::ScoringError;

pub struct ProductAnalyzer {
    collector: EvidenceCollector,
    aggregator: TrustAggregator,
    deadline: Duration,
    currency_symbol: String,
}

impl ProductAnalyzer {
    pub fn new(collector: EvidenceCollector, aggregator: TrustAggregator, deadline: Duration) -> Self {
        let currency_symbol = collector.extractor().pricing().local_symbol.clone();
        Self { collector, aggregator, deadline, currency_symbol }
    }

    pub fn has_search(&self) -> bool {
        self.collector.has_provider()
    }

    /// Never fails: any error resolves to [`TrustReport::failed`].
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn analyze(&self, product: &Product) -> TrustReport {
        match self.try_analyze(product).await {
            Ok(report) => {
                info!(trust_score = report.trust_score, flags = report.red_flags.len(), "product analysed");
                report
            }
            Err(e) => {
                warn!(error = %e, "product analysis failed, returning degraded report");
                TrustReport::failed(product.id, e.to_string())
            }
        }
    }

    pub async fn try_analyze(&self, product: &Product) -> Result<TrustReport, ScoringError> {
        validate_price(product.price).map_err(|e| ScoringError::InvalidSubject(e.to_string()))?;
        if product.name.trim().is_empty() {
            return Err(ScoringError::InvalidSubject("product name is empty".into()));
        }
        let bundle = tokio::time::timeout(self.deadline, self.collector.collect(product))
            .await
            .map_err(|_| ScoringError::DeadlineElapsed(self.deadline))?;
        Ok(self.score_bundle(product, bundle))
    }

    /// Deterministic scoring of an already collected bundle.
    pub fn score_bundle(&self, product: &Product, bundle: EvidenceBundle) -> TrustReport {
        let verification = score_checks(product, &bundle, &self.currency_symbol);
        self.aggregator.aggregate(product.id, verification, bundle.notes)
    }
}
