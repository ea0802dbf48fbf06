use std::sync::Arc;
use std::time::Duration;

use trustmart_config::{ImageConfig, PricingConfig, SearchConfig};
use trustmart_evidence::{EvidenceCollector, EvidenceExtractor, EvidenceSlot, SearchProvider};
use trustmart_test_utils::{assert_eq, hit, image_match, product_with, Scripted, ScriptedSearchProvider};

fn collector(provider: Option<Arc<dyn SearchProvider>>) -> EvidenceCollector {
    let extractor = EvidenceExtractor::new(PricingConfig::default(), ImageConfig::default());
    EvidenceCollector::new(provider, extractor, &SearchConfig::default(), 4)
}

#[tokio::test]
async fn test_every_lookup_is_issued() {
    let provider = Arc::new(
        ScriptedSearchProvider::new()
            .web_hits(
                "India price",
                vec![hit("Aero Kettle 1.5L", "Aero Kettle now ₹1,999 on Amazon", "https://www.amazon.in/aero")],
            )
            .image_matches("front", vec![image_match("Aero Kettle 1.5L", "https://www.flipkart.com/aero")]),
    );
    let product = product_with(
        "Aero Kettle",
        2_100.0,
        Some("Aero"),
        Some("HomeKart"),
        &["https://cdn.trustmart.in/front.jpg", "https://cdn.trustmart.in/side.jpg"],
    );

    let bundle = collector(Some(provider.clone())).collect(&product).await;

    assert_eq!(provider.web_calls(), 2);
    assert_eq!(provider.image_calls(), 2);
    let queries = provider.queries();
    assert!(queries.contains(&"Aero Kettle India price and specs".to_string()), "{queries:?}");
    assert!(queries.contains(&"HomeKart seller reviews".to_string()), "{queries:?}");
    assert_eq!(bundle.prices.items().len(), 1);
    assert_eq!(bundle.prices.items()[0].amount_local, 1_999.0);
    assert_eq!(bundle.images.items().len(), 1);
    assert!(bundle.notes.is_empty(), "{:?}", bundle.notes);
}

#[tokio::test]
async fn test_timed_out_calls_degrade_like_failures() {
    let provider = Arc::new(ScriptedSearchProvider::hanging());
    let product = product_with("Aero Kettle", 2_100.0, Some("Aero"), Some("HomeKart"), &["https://cdn.trustmart.in/a.jpg"]);
    let collector = collector(Some(provider)).with_call_timeout(Duration::from_millis(50));

    let bundle = tokio::time::timeout(Duration::from_secs(5), collector.collect(&product))
        .await
        .expect("collection is bounded by the per-call timeout");

    assert!(bundle.snippets.is_insufficient());
    assert!(bundle.prices.is_insufficient());
    assert!(bundle.brand_mentions.is_insufficient());
    assert!(bundle.seller_mentions.is_insufficient());
    assert!(bundle.images.is_insufficient());
    assert!(bundle.notes.iter().any(|n| n.contains("timed out")), "{:?}", bundle.notes);
}

#[tokio::test]
async fn test_image_quota_leaves_manual_guidance() {
    let provider = Arc::new(
        ScriptedSearchProvider::new()
            .web_hits("India price", vec![hit("Aero Kettle", "Rs. 2,049 at Croma", "https://www.croma.com/aero")])
            .image("a.jpg", Scripted::Quota),
    );
    let product = product_with("Aero Kettle", 2_100.0, None, None, &["https://cdn.trustmart.in/a.jpg"]);

    let bundle = collector(Some(provider)).collect(&product).await;

    assert!(matches!(bundle.prices, EvidenceSlot::Collected(_)));
    assert!(bundle.images.is_insufficient());
    assert_eq!(bundle.notes.len(), 1);
    assert!(bundle.notes[0].contains("quota exhausted"));
    assert!(bundle.notes[0].contains("https://images.google.com/searchbyimage?image_url=https%3A%2F%2Fcdn.trustmart.in%2Fa.jpg"));
}

#[tokio::test]
async fn test_missing_provider_yields_unavailable_bundle() {
    let product = product_with("Aero Kettle", 2_100.0, None, None, &[]);
    let bundle = collector(None).collect(&product).await;
    assert!(bundle.snippets.is_insufficient());
    assert!(bundle.prices.is_insufficient());
    assert_eq!(bundle.brand_mentions, EvidenceSlot::NotSpecified);
    assert_eq!(bundle.images, EvidenceSlot::NotSpecified);
}
