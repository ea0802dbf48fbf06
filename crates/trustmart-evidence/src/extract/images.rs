//! Image-domain classification for reverse-image matches.

use trustmart_config::ImageConfig;

use super::mentions::slug;
use super::text::{domain_of, mentions_name, name_tokens};
use crate::models::{DomainClass, ImageMatch, ImageOccurrence};

const STOCK_SITES: &[&str] = &[
    "shutterstock.com",
    "istockphoto.com",
    "gettyimages.com",
    "alamy.com",
    "dreamstime.com",
    "depositphotos.com",
    "123rf.com",
    "freepik.com",
    "unsplash.com",
    "pexels.com",
];

const TRANSACTIONAL_MARKERS: &[&str] = &[
    "buy", "price", "₹", "$", "add to cart", "in stock", "offer", "sale", "deal", "shop",
];

/// Domain suffix match: `m.amazon.in` belongs to `amazon.in`.
fn on_domain(domain: &str, listed: &str) -> bool {
    domain == listed || domain.ends_with(&format!(".{listed}"))
}

fn is_brand_domain(domain: &str, brand: Option<&str>) -> bool {
    let Some(brand) = brand else { return false };
    let s = slug(brand);
    if s.len() < 3 {
        return false;
    }
    let host = domain.split('.').next().unwrap_or_default();
    slug(host).contains(&s)
}

fn has_transactional_context(m: &ImageMatch) -> bool {
    let text = format!("{} {}", m.title, m.snippet.as_deref().unwrap_or_default()).to_lowercase();
    TRANSACTIONAL_MARKERS.iter().any(|k| text.contains(k))
}

/// Classifies reverse-image matches for one product image.
pub struct ImageClassifier<'a> {
    config: &'a ImageConfig,
    brand: Option<&'a str>,
    name_tokens: Vec<String>,
}

impl<'a> ImageClassifier<'a> {
    pub fn new(config: &'a ImageConfig, product_name: &str, brand: Option<&'a str>) -> Self {
        Self { config, brand, name_tokens: name_tokens(product_name) }
    }

    fn is_reputable(&self, domain: &str) -> bool {
        on_domain(domain, &self.config.marketplace_domain)
            || is_brand_domain(domain, self.brand)
            || self.config.reputable_domains.iter().any(|d| on_domain(domain, d))
    }

    /// Stock and manufacturer pages without a listing are generic stock;
    /// allow-listed domains are reputable; everything else is suspicious.
    pub fn classify(&self, m: &ImageMatch) -> Option<(String, DomainClass, bool)> {
        let domain = domain_of(&m.link)?;
        let name_match = mentions_name(&m.title, &self.name_tokens);
        let stock_site = STOCK_SITES.iter().any(|s| on_domain(&domain, s));
        let class = if stock_site
            || (is_brand_domain(&domain, self.brand) && !has_transactional_context(m))
        {
            DomainClass::GenericStock
        } else if self.is_reputable(&domain) {
            DomainClass::Reputable
        } else {
            DomainClass::Suspicious
        };
        Some((domain, class, name_match))
    }

    pub fn occurrences(&self, image_index: usize, image_url: &str, matches: &[ImageMatch]) -> Vec<ImageOccurrence> {
        matches
            .iter()
            .enumerate()
            .filter_map(|(j, m)| {
                let (domain, classification, product_name_match) = self.classify(m)?;
                Some(ImageOccurrence {
                    image_url: image_url.to_string(),
                    source_id: format!("image #{} match #{} ({})", image_index + 1, j + 1, domain),
                    domain,
                    classification,
                    product_name_match,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(title: &str, link: &str) -> ImageMatch {
        ImageMatch { title: title.into(), link: link.into(), snippet: None }
    }

    #[test]
    fn test_retailer_listing_is_reputable() {
        let cfg = ImageConfig::default();
        let c = ImageClassifier::new(&cfg, "Galaxy Buds 2", Some("Samsung"));
        let (domain, class, name_match) =
            c.classify(&m("Samsung Galaxy Buds 2 - Buy online", "https://www.amazon.in/dp/B09")).unwrap();
        assert_eq!(domain, "amazon.in");
        assert_eq!(class, DomainClass::Reputable);
        assert!(name_match);
    }

    #[test]
    fn test_manufacturer_page_without_listing_is_stock() {
        let cfg = ImageConfig::default();
        let c = ImageClassifier::new(&cfg, "Galaxy Buds 2", Some("Samsung"));
        let (_, class, _) = c.classify(&m("Galaxy Buds 2 design", "https://www.samsung.com/in/buds2")).unwrap();
        assert_eq!(class, DomainClass::GenericStock);

        let (_, class, _) = c.classify(&m("Buy Galaxy Buds 2", "https://www.samsung.com/in/buds2/buy")).unwrap();
        assert_eq!(class, DomainClass::Reputable);

        let (_, class, _) = c.classify(&m("earbuds vector", "https://www.shutterstock.com/p/1")).unwrap();
        assert_eq!(class, DomainClass::GenericStock);
    }

    #[test]
    fn test_unknown_domain_is_suspicious() {
        let cfg = ImageConfig::default();
        let c = ImageClassifier::new(&cfg, "Galaxy Buds 2", Some("Samsung"));
        let (_, class, name_match) = c.classify(&m("cheap wireless earphones", "http://deals4u.biz/item")).unwrap();
        assert_eq!(class, DomainClass::Suspicious);
        assert!(!name_match);
    }

    #[test]
    fn test_unparseable_link_is_skipped() {
        let cfg = ImageConfig::default();
        let c = ImageClassifier::new(&cfg, "Galaxy Buds 2", None);
        let occ = c.occurrences(0, "https://img/1.jpg", &[m("x", "not a url"), m("Galaxy Buds 2", "https://flipkart.com/a")]);
        assert_eq!(occ.len(), 1);
        assert_eq!(occ[0].source_id, "image #1 match #2 (flipkart.com)");
    }
}
