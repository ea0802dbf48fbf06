//! EvidenceExtractor: raw provider output → [`EvidenceBundle`].
//!
//! Everything here is pure. Retrieval failures arrive as `Err` values in
//! [`RawEvidence`] and degrade only the categories that depended on them.

pub mod images;
pub mod mentions;
pub mod price;
pub mod text;

use trustmart_common::Product;
use trustmart_config::{ImageConfig, PricingConfig};
use url::form_urlencoded;

use crate::models::{EvidenceBundle, EvidenceSlot, KnowledgeHint, ReverseImageResult, SearchHit, SourcedSnippet};
use crate::sources::{SearchError, SearchResult};
use images::ImageClassifier;
use mentions::{find_mention, MentionKind};

pub use text::{domain_of, mentions_name, name_tokens, spec_claims, SpecClaim};

/// Outcome of one reverse-image lookup.
#[derive(Debug)]
pub struct ImageLookup {
    pub image_url: String,
    pub result: SearchResult<ReverseImageResult>,
}

/// Everything retrieval produced for one product, failures included.
#[derive(Debug)]
pub struct RawEvidence {
    pub web: SearchResult<Vec<SearchHit>>,
    /// Seller reputation query; `None` when no seller was declared.
    pub seller_web: Option<SearchResult<Vec<SearchHit>>>,
    pub images: Vec<ImageLookup>,
}

impl RawEvidence {
    /// Every lookup the product would need, all failed with `reason`.
    pub fn unavailable(product: &Product, reason: &str) -> Self {
        let fail = || SearchError::Unavailable(reason.to_string());
        Self {
            web: Err(fail()),
            seller_web: product.seller.as_ref().map(|_| Err(fail())),
            images: product
                .images
                .iter()
                .map(|img| ImageLookup { image_url: img.url.clone(), result: Err(fail()) })
                .collect(),
        }
    }
}

/// Link a moderator can open to repeat a reverse-image search by hand.
pub fn manual_image_search_link(image_url: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(image_url.as_bytes()).collect();
    format!("https://images.google.com/searchbyimage?image_url={encoded}")
}

fn sourced(label: &str, hits: &[SearchHit]) -> Vec<SourcedSnippet> {
    hits.iter()
        .enumerate()
        .map(|(i, hit)| {
            let domain = domain_of(&hit.link).unwrap_or_else(|| "unknown".to_string());
            SourcedSnippet {
                source_id: format!("{label} #{} ({domain})", i + 1),
                domain,
                title: hit.title.clone(),
                text: hit.snippet.clone(),
            }
        })
        .collect()
}

pub struct EvidenceExtractor {
    pricing: PricingConfig,
    images: ImageConfig,
}

impl EvidenceExtractor {
    pub fn new(pricing: PricingConfig, images: ImageConfig) -> Self {
        Self { pricing, images }
    }

    pub fn pricing(&self) -> &PricingConfig {
        &self.pricing
    }

    pub fn extract(&self, product: &Product, raw: &RawEvidence) -> EvidenceBundle {
        let mut notes = Vec::new();

        let web = match &raw.web {
            Ok(hits) => Ok(sourced("web", hits)),
            Err(e) => {
                notes.push(format!("Web search failed: {e}"));
                Err(format!("web search failed: {e}"))
            }
        };

        let snippets = match &web {
            Ok(s) => EvidenceSlot::Collected(s.clone()),
            Err(reason) => EvidenceSlot::insufficient(reason.clone()),
        };

        let prices = match &web {
            Ok(s) => {
                let found: Vec<_> = s
                    .iter()
                    .flat_map(|s| {
                        price::extract_prices(&format!("{} {}", s.title, s.text), &s.source_id, &self.pricing)
                    })
                    .collect();
                if found.is_empty() {
                    EvidenceSlot::insufficient(format!(
                        "insufficient price data: no price mentions in {} results",
                        s.len()
                    ))
                } else {
                    EvidenceSlot::Collected(found)
                }
            }
            Err(reason) => EvidenceSlot::insufficient(reason.clone()),
        };

        let brand_mentions = match (&product.brand, &web) {
            (None, _) => EvidenceSlot::NotSpecified,
            (Some(_), Err(reason)) => EvidenceSlot::insufficient(reason.clone()),
            (Some(brand), Ok(s)) => EvidenceSlot::Collected(
                s.iter()
                    .filter_map(|s| {
                        let text = format!("{} {}", s.title, s.text);
                        find_mention(&text, brand, &s.source_id, &s.domain, MentionKind::Brand)
                    })
                    .collect(),
            ),
        };

        let seller_mentions = self.seller_mentions(product, &web, raw, &mut notes);
        let (images, knowledge_hints) = self.image_evidence(product, raw, &mut notes);

        EvidenceBundle {
            snippets,
            prices,
            brand_mentions,
            seller_mentions,
            images,
            knowledge_hints,
            notes,
        }
    }

    fn seller_mentions(
        &self,
        product: &Product,
        web: &Result<Vec<SourcedSnippet>, String>,
        raw: &RawEvidence,
        notes: &mut Vec<String>,
    ) -> EvidenceSlot<crate::models::Mention> {
        let Some(seller) = &product.seller else {
            return EvidenceSlot::NotSpecified;
        };
        let seller_hits = match &raw.seller_web {
            Some(Ok(hits)) => Some(sourced("seller", hits)),
            Some(Err(e)) => {
                notes.push(format!("Seller reputation search failed: {e}"));
                None
            }
            None => None,
        };
        if web.is_err() && seller_hits.is_none() {
            return EvidenceSlot::insufficient("seller reputation evidence unavailable");
        }
        let pool = web.iter().flatten().chain(seller_hits.iter().flatten());
        EvidenceSlot::Collected(
            pool.filter_map(|s| {
                let text = format!("{} {}", s.title, s.text);
                find_mention(&text, seller, &s.source_id, &s.domain, MentionKind::Seller)
            })
            .collect(),
        )
    }

    fn image_evidence(
        &self,
        product: &Product,
        raw: &RawEvidence,
        notes: &mut Vec<String>,
    ) -> (EvidenceSlot<crate::models::ImageOccurrence>, Vec<KnowledgeHint>) {
        if product.images.is_empty() {
            return (EvidenceSlot::NotSpecified, Vec::new());
        }
        if raw.images.is_empty() {
            return (EvidenceSlot::insufficient("no reverse image lookups were made"), Vec::new());
        }

        let classifier = ImageClassifier::new(&self.images, &product.name, product.brand.as_deref());
        let mut occurrences = Vec::new();
        let mut hints = Vec::new();
        let mut failures = 0usize;

        for (i, lookup) in raw.images.iter().enumerate() {
            match &lookup.result {
                Ok(result) => {
                    occurrences.extend(classifier.occurrences(i, &lookup.image_url, &result.matches));
                    if let Some(title) = &result.knowledge_graph {
                        hints.push(KnowledgeHint {
                            title: title.clone(),
                            source_id: format!("image #{} knowledge graph", i + 1),
                        });
                    }
                }
                Err(e) => {
                    failures += 1;
                    let link = manual_image_search_link(&lookup.image_url);
                    notes.push(if e.is_quota() {
                        format!(
                            "Reverse image search quota exhausted for image #{}; check manually: {link}",
                            i + 1
                        )
                    } else {
                        format!("Reverse image search failed for image #{} ({e}); check manually: {link}", i + 1)
                    });
                }
            }
        }

        let slot = if failures == raw.images.len() {
            EvidenceSlot::insufficient(format!("all {failures} reverse image lookups failed"))
        } else {
            EvidenceSlot::Collected(occurrences)
        };
        (slot, hints)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ImageMatch, MentionStance};
    use trustmart_common::{NewProduct, ProductImage};

    fn product(seller: Option<&str>, images: usize) -> Product {
        NewProduct {
            name: "Galaxy Buds 2".into(),
            description: "Wireless earbuds".into(),
            category: "audio".into(),
            price: 8_500.0,
            brand: Some("Samsung".into()),
            seller: seller.map(String::from),
            images: (0..images)
                .map(|i| ProductImage { url: format!("https://cdn.trustmart.in/{i}.jpg"), alt: None })
                .collect(),
            is_flagged: false,
        }
        .into_product()
        .unwrap()
    }

    fn hit(title: &str, snippet: &str, link: &str) -> SearchHit {
        SearchHit { title: title.into(), snippet: snippet.into(), link: link.into() }
    }

    fn extractor() -> EvidenceExtractor {
        EvidenceExtractor::new(PricingConfig::default(), ImageConfig::default())
    }

    #[test]
    fn test_total_unavailability_marks_everything_insufficient() {
        let p = product(Some("RetailNet"), 2);
        let bundle = extractor().extract(&p, &RawEvidence::unavailable(&p, "not configured"));
        assert!(bundle.snippets.is_insufficient());
        assert!(bundle.prices.is_insufficient());
        assert!(bundle.brand_mentions.is_insufficient());
        assert!(bundle.seller_mentions.is_insufficient());
        assert!(bundle.images.is_insufficient());
        assert_eq!(bundle.notes.iter().filter(|n| n.contains("searchbyimage")).count(), 2);
    }

    #[test]
    fn test_no_prices_is_explicit_marker() {
        let p = product(None, 0);
        let raw = RawEvidence {
            web: Ok(vec![hit("Galaxy Buds 2 review", "Great ANC", "https://gsmarena.com/r")]),
            seller_web: None,
            images: vec![],
        };
        let bundle = extractor().extract(&p, &raw);
        match bundle.prices {
            EvidenceSlot::Insufficient { reason } => assert!(reason.contains("insufficient price data")),
            other => panic!("expected insufficient marker, got {other:?}"),
        }
        assert_eq!(bundle.seller_mentions, EvidenceSlot::NotSpecified);
        assert_eq!(bundle.images, EvidenceSlot::NotSpecified);
    }

    #[test]
    fn test_one_failed_image_degrades_only_that_image() {
        let p = product(None, 2);
        let raw = RawEvidence {
            web: Ok(vec![]),
            seller_web: None,
            images: vec![
                ImageLookup {
                    image_url: p.images[0].url.clone(),
                    result: Ok(ReverseImageResult {
                        matches: vec![ImageMatch {
                            title: "Samsung Galaxy Buds 2".into(),
                            link: "https://www.flipkart.com/buds".into(),
                            snippet: None,
                        }],
                        knowledge_graph: Some("Samsung Galaxy Buds2".into()),
                    }),
                },
                ImageLookup {
                    image_url: p.images[1].url.clone(),
                    result: Err(SearchError::QuotaExceeded("monthly limit".into())),
                },
            ],
        };
        let bundle = extractor().extract(&p, &raw);
        assert_eq!(bundle.images.items().len(), 1);
        assert_eq!(bundle.knowledge_hints.len(), 1);
        assert!(bundle.notes.iter().any(|n| n.contains("quota exhausted for image #2")));
    }

    #[test]
    fn test_failed_seller_query_falls_back_to_web_hits() {
        let p = product(Some("RetailNet"), 0);
        let raw = RawEvidence {
            web: Ok(vec![hit("Buds 2", "Sold by RetailNet, a trusted seller", "https://amazon.in/x")]),
            seller_web: Some(Err(SearchError::Unavailable("503".into()))),
            images: vec![],
        };
        let bundle = extractor().extract(&p, &raw);
        assert_eq!(bundle.seller_mentions.items()[0].stance, MentionStance::Authoritative);
        assert!(bundle.notes.iter().any(|n| n.starts_with("Seller reputation search failed")));
    }

    #[test]
    fn test_manual_link_is_encoded() {
        assert_eq!(
            manual_image_search_link("https://a.b/c d.jpg?x=1"),
            "https://images.google.com/searchbyimage?image_url=https%3A%2F%2Fa.b%2Fc+d.jpg%3Fx%3D1"
        );
    }
}
