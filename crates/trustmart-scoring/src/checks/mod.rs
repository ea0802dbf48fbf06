//! CheckScorer: five pure scoring functions over an [`EvidenceBundle`].
//!
//! [`EvidenceBundle`]: trustmart_evidence::EvidenceBundle

pub mod brand;
pub mod description;
pub mod image;
pub mod price;
pub mod seller;

pub use brand::check_brand;
pub use description::check_description;
pub use image::check_image;
pub use price::check_price;
pub use seller::check_seller;

use trustmart_common::Product;
use trustmart_evidence::EvidenceBundle;

use crate::status::Verification;

const QUOTE_LIMIT: usize = 120;

/// Run all five checks.
pub fn score_checks(product: &Product, bundle: &EvidenceBundle, currency_symbol: &str) -> Verification {
    Verification {
        description_quality: check_description(product, bundle),
        price_analysis: check_price(product.price, &bundle.prices, currency_symbol),
        image_authenticity: check_image(&bundle.images),
        seller_reputation: check_seller(product.seller.as_deref(), &bundle.seller_mentions),
        brand_verification: check_brand(product.brand.as_deref(), bundle),
    }
}

/// Quoted evidence text, shortened on a char boundary.
pub(crate) fn quote(text: &str) -> String {
    let text = text.trim();
    match text.char_indices().nth(QUOTE_LIMIT) {
        Some((cut, _)) => format!("\"{}...\"", &text[..cut]),
        None => format!("\"{text}\""),
    }
}

/// `a, b and N more` style list of source ids.
pub(crate) fn cite<'a>(ids: impl IntoIterator<Item = &'a str>) -> String {
    let ids: Vec<&str> = ids.into_iter().collect();
    match ids.len() {
        0 => "no sources".to_string(),
        1..=3 => ids.join(", "),
        n => format!("{} and {} more", ids[..3].join(", "), n - 3),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cite_truncates() {
        assert_eq!(cite(["a", "b"]), "a, b");
        assert_eq!(cite(["a", "b", "c", "d", "e"]), "a, b, c and 2 more");
        assert_eq!(cite(std::iter::empty()), "no sources");
    }

    #[test]
    fn test_quote_is_bounded() {
        let long = "x".repeat(300);
        assert_eq!(quote(&long).chars().count(), QUOTE_LIMIT + 5);
        assert_eq!(quote(" hi "), "\"hi\"");
    }
}
