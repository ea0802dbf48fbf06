//! Shared application state for the web server.

use std::sync::Arc;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tracing::{info, warn};
use trustmart_common::{ExternalServiceError, Result};
use trustmart_config::Config;
use trustmart_db::{Database, EntityStore};
use trustmart_evidence::sources::serpapi::SerpApiClient;
use trustmart_evidence::{EvidenceCollector, EvidenceExtractor, SearchProvider};
use trustmart_llm::{LlmBackend, ReviewAnalyzer};
use trustmart_moderation::{ModerationService, RatingLedger, ReviewService};
use trustmart_scoring::{ProductAnalyzer, TrustAggregator};

/// Shared state injected into every Axum handler.
pub struct AppState {
    pub db: Arc<Database>,
    pub ledger: Arc<RatingLedger>,
    pub reviews: ReviewService,
    pub moderation: ModerationService,
    pub product_analyzer: ProductAnalyzer,
    pub review_analyzer: ReviewAnalyzer,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(db: Arc<Database>, product_analyzer: ProductAnalyzer, review_analyzer: ReviewAnalyzer) -> Self {
        let store: Arc<dyn EntityStore> = db.clone();
        let ledger = Arc::new(RatingLedger::new(store));
        Self {
            db,
            reviews: ReviewService::new(ledger.clone()),
            moderation: ModerationService::new(ledger.clone()),
            ledger,
            product_analyzer,
            review_analyzer,
        }
    }

    /// Wire the collaborators described by `config`. Missing API keys leave
    /// the corresponding capability unconfigured; analyses then degrade.
    pub fn from_config(config: &Config) -> Result<Self> {
        let owned = |key: &SecretString| SecretString::from(key.expose_secret().to_string());

        let provider: Option<Arc<dyn SearchProvider>> = match &config.secrets.serp_api_key {
            Some(key) => {
                let client = SerpApiClient::new(
                    config.search.base_url.clone(),
                    owned(key),
                    Duration::from_secs(config.search.timeout_secs),
                )
                .map_err(ExternalServiceError::from)?;
                Some(Arc::new(client))
            }
            None => {
                warn!("SERPAPI_KEY not set, product analysis will report insufficient evidence");
                None
            }
        };

        let backend: Option<Arc<dyn LlmBackend>> =
            trustmart_llm::from_config(&config.llm, config.secrets.llm_api_key.as_ref())
                .map_err(ExternalServiceError::from)?;
        match &backend {
            Some(b) => info!(backend = b.backend_name(), model = b.model_id(), "inference backend ready"),
            None => warn!("no inference credentials, review analysis will be degraded"),
        }

        let extractor = EvidenceExtractor::new(config.pricing.clone(), config.images.clone());
        let collector = EvidenceCollector::new(provider, extractor, &config.search, config.images.max_images);
        let product_analyzer = ProductAnalyzer::new(
            collector,
            TrustAggregator::default(),
            Duration::from_secs(config.search.analysis_deadline_secs),
        );
        let review_analyzer = ReviewAnalyzer::new(backend, Duration::from_secs(config.llm.timeout_secs));

        Ok(Self::new(Arc::new(Database::open_in_memory()), product_analyzer, review_analyzer))
    }

    pub fn store(&self) -> &Arc<dyn EntityStore> {
        self.ledger.store()
    }
}
