use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;
use trustmart_config::{ImageConfig, PricingConfig, SearchConfig};
use trustmart_evidence::{EvidenceCollector, EvidenceExtractor, SearchProvider};
use trustmart_scoring::aggregator::{ANALYSIS_ERROR_FLAG, ANALYSIS_FAILED};
use trustmart_scoring::{
    BrandStatus, CheckResult, CheckWeights, DescriptionCheck, DescriptionQuality, ImageAuthenticity, PriceStatus,
    ProductAnalyzer, SellerStatus, TrustAggregator, Verification,
};
use trustmart_test_utils::{assert_eq, hit, product, product_with, ScriptedSearchProvider};

fn analyzer(provider: ScriptedSearchProvider, deadline: Duration) -> ProductAnalyzer {
    let provider: Arc<dyn SearchProvider> = Arc::new(provider);
    let extractor = EvidenceExtractor::new(PricingConfig::default(), ImageConfig::default());
    let collector = EvidenceCollector::new(Some(provider), extractor, &SearchConfig::default(), 4);
    ProductAnalyzer::new(collector, TrustAggregator::default(), deadline)
}

#[tokio::test]
async fn test_underpriced_listing_is_flagged_with_both_sources() {
    let provider = ScriptedSearchProvider::new().web_hits(
        "Galaxy Buds 2",
        vec![
            hit("Galaxy Buds 2 - Amazon.in", "Buy Galaxy Buds 2 online at ₹12,000", "https://www.amazon.in/dp/B09"),
            hit("Galaxy Buds 2 price in India", "Galaxy Buds 2 sells for ₹15,000 at Flipkart", "https://www.flipkart.com/buds"),
        ],
    );
    let report = analyzer(provider, Duration::from_secs(5)).analyze(&product("Galaxy Buds 2", 8_500.0)).await;

    let price = &report.verification.price_analysis;
    assert_eq!(price.status, PriceStatus::TooLow);
    assert_eq!(price.sub_score, 0.0);
    assert!(price.findings.contains("₹9,600 to ₹18,000"), "{}", price.findings);

    let first = &report.red_flags[0];
    assert!(first.starts_with("Price too low"), "{first}");
    assert!(first.contains("₹12,000") && first.contains("₹15,000"), "{first}");
    assert!(report.error.is_none());
}

#[tokio::test]
async fn test_total_retrieval_failure_scores_fifty_tentatively() {
    let p = product_with(
        "Aero Kettle",
        2_100.0,
        Some("Aero"),
        Some("HomeKart"),
        &["https://cdn.trustmart.in/a.jpg"],
    );
    let report = analyzer(ScriptedSearchProvider::failing(), Duration::from_secs(5)).analyze(&p).await;

    let v = &report.verification;
    assert_eq!(v.description_quality.result.status, DescriptionQuality::Unknown);
    assert_eq!(v.price_analysis.status, PriceStatus::Unknown);
    assert_eq!(v.image_authenticity.status, ImageAuthenticity::Unknown);
    assert_eq!(v.seller_reputation.status, SellerStatus::Unknown);
    assert_eq!(v.brand_verification.status, BrandStatus::Unknown);
    assert_eq!(report.trust_score, 50);
    assert!(report.summary.starts_with("Tentative:"), "{}", report.summary);
    assert!(!report.evidence_notes.is_empty());
}

#[tokio::test]
async fn test_elapsed_deadline_fails_the_report() {
    let report = analyzer(ScriptedSearchProvider::hanging(), Duration::from_millis(50))
        .analyze(&product("Aero Kettle", 2_100.0))
        .await;

    assert_eq!(report.trust_score, 0);
    assert!(report.is_degraded());
    assert_eq!(report.verification.description_quality.result.status, DescriptionQuality::Unknown);
    assert_eq!(report.verification.seller_reputation.findings, ANALYSIS_FAILED);
    assert_eq!(report.verification.sub_scores(), [0.0; 5]);
    assert_eq!(report.red_flags, vec![ANALYSIS_ERROR_FLAG.to_string()]);
}

#[tokio::test]
async fn test_invalid_price_fails_without_searching() {
    let provider = Arc::new(ScriptedSearchProvider::new());
    let extractor = EvidenceExtractor::new(PricingConfig::default(), ImageConfig::default());
    let collector = EvidenceCollector::new(Some(provider.clone()), extractor, &SearchConfig::default(), 4);
    let analyzer = ProductAnalyzer::new(collector, TrustAggregator::default(), Duration::from_secs(5));

    let mut p = product("Aero Kettle", 2_100.0);
    p.price = f64::NAN;
    let report = analyzer.analyze(&p).await;

    assert_eq!(report.trust_score, 0);
    assert!(report.error.as_deref().unwrap_or_default().contains("price"));
    assert_eq!(provider.web_calls(), 0);
}

fn verification(s: [f64; 5]) -> Verification {
    Verification {
        description_quality: DescriptionCheck {
            result: CheckResult::new(s[0], DescriptionQuality::from_score(s[0]), "d"),
            is_consistent: true,
        },
        price_analysis: CheckResult::new(s[1], PriceStatus::Reasonable, "p"),
        image_authenticity: CheckResult::new(s[2], ImageAuthenticity::Authentic, "i"),
        seller_reputation: CheckResult::new(s[3], SellerStatus::Reputable, "s"),
        brand_verification: CheckResult::new(s[4], BrandStatus::Present, "b"),
    }
}

proptest! {
    #[test]
    fn prop_trust_score_is_bounded(scores in proptest::array::uniform5(0.0f64..=1.0)) {
        let agg = TrustAggregator::default();
        let score = agg.trust_score(&verification(scores));
        prop_assert!(score <= 100);
        let expected: f64 = scores.iter().zip(CheckWeights::default().as_array()).map(|(s, w)| s * w).sum();
        prop_assert!((f64::from(score) - expected * 100.0).abs() <= 0.5 + 1e-9);
    }

    #[test]
    fn prop_raising_one_check_never_lowers_the_score(
        scores in proptest::array::uniform5(0.0f64..=1.0),
        idx in 0usize..5,
    ) {
        let agg = TrustAggregator::default();
        let mut raised = scores;
        raised[idx] = 1.0;
        prop_assert!(agg.trust_score(&verification(raised)) >= agg.trust_score(&verification(scores)));
    }
}

#[test]
fn test_default_weights_sum_to_one() {
    assert!((CheckWeights::default().sum() - 1.0).abs() < 1e-12);
}
