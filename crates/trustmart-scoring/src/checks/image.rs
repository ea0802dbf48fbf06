use std::collections::BTreeSet;

use trustmart_evidence::{DomainClass, EvidenceSlot, ImageOccurrence};

use super::cite;
use crate::status::{CheckResult, ImageAuthenticity};

/// Reverse-image recurrence of the product's own images.
pub fn check_image(images: &EvidenceSlot<ImageOccurrence>) -> CheckResult<ImageAuthenticity> {
    let occurrences = match images {
        EvidenceSlot::NotSpecified => {
            return CheckResult::new(0.5, ImageAuthenticity::NoImages, "Product has no images to verify.");
        }
        EvidenceSlot::Insufficient { reason } => {
            return CheckResult::new(0.5, ImageAuthenticity::Unknown, format!("Image evidence unavailable: {reason}."));
        }
        EvidenceSlot::Collected(o) => o,
    };
    if occurrences.is_empty() {
        return CheckResult::new(
            0.5,
            ImageAuthenticity::NoImages,
            "Reverse image search found no pages containing the product images.",
        );
    }

    let suspicious: Vec<&ImageOccurrence> = occurrences
        .iter()
        .filter(|o| o.classification == DomainClass::Suspicious && !o.product_name_match)
        .collect();
    if suspicious.len() * 2 > occurrences.len() {
        return CheckResult::new(
            0.0,
            ImageAuthenticity::Suspicious,
            format!(
                "{} of {} image matches are on non-reputable sites describing a different product: {}.",
                suspicious.len(),
                occurrences.len(),
                cite(suspicious.iter().map(|o| o.source_id.as_str()))
            ),
        );
    }

    let reputable: Vec<&ImageOccurrence> = occurrences
        .iter()
        .filter(|o| o.classification == DomainClass::Reputable && o.product_name_match)
        .collect();
    let reputable_domains: BTreeSet<&str> = reputable.iter().map(|o| o.domain.as_str()).collect();
    if reputable_domains.len() >= 2 {
        return CheckResult::new(
            1.0,
            ImageAuthenticity::Authentic,
            format!(
                "Images recur on {} reputable domains with matching listings: {}.",
                reputable_domains.len(),
                cite(reputable.iter().map(|o| o.source_id.as_str()))
            ),
        );
    }

    let stock: Vec<&ImageOccurrence> = occurrences
        .iter()
        .filter(|o| o.classification == DomainClass::GenericStock)
        .collect();
    if !stock.is_empty() && reputable.is_empty() {
        return CheckResult::new(
            0.7,
            ImageAuthenticity::StockPhoto,
            format!(
                "Images only found as manufacturer or stock photos without a listing: {}.",
                cite(stock.iter().map(|o| o.source_id.as_str()))
            ),
        );
    }

    CheckResult::new(
        0.5,
        ImageAuthenticity::NoImages,
        format!(
            "Image evidence inconclusive across {} matches: {}.",
            occurrences.len(),
            cite(occurrences.iter().map(|o| o.source_id.as_str()))
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn occ(domain: &str, class: DomainClass, name_match: bool) -> ImageOccurrence {
        ImageOccurrence {
            image_url: "https://cdn.trustmart.in/1.jpg".into(),
            domain: domain.into(),
            source_id: format!("image #1 ({domain})"),
            classification: class,
            product_name_match: name_match,
        }
    }

    #[test]
    fn test_two_reputable_domains_are_authentic() {
        let slot = EvidenceSlot::Collected(vec![
            occ("amazon.in", DomainClass::Reputable, true),
            occ("flipkart.com", DomainClass::Reputable, true),
            occ("deals.biz", DomainClass::Suspicious, false),
        ]);
        let r = check_image(&slot);
        assert_eq!(r.status, ImageAuthenticity::Authentic);
        assert!(r.findings.contains("image #1 (amazon.in)"));
    }

    #[test]
    fn test_suspicious_majority() {
        let slot = EvidenceSlot::Collected(vec![
            occ("amazon.in", DomainClass::Reputable, true),
            occ("a.biz", DomainClass::Suspicious, false),
            occ("b.biz", DomainClass::Suspicious, false),
        ]);
        assert_eq!(check_image(&slot).status, ImageAuthenticity::Suspicious);
    }

    #[test]
    fn test_stock_only() {
        let slot = EvidenceSlot::Collected(vec![occ("samsung.com", DomainClass::GenericStock, true)]);
        let r = check_image(&slot);
        assert_eq!(r.status, ImageAuthenticity::StockPhoto);
        assert_eq!(r.sub_score, 0.7);
    }

    #[test]
    fn test_neutral_outcomes() {
        assert_eq!(check_image(&EvidenceSlot::NotSpecified).status, ImageAuthenticity::NoImages);
        assert_eq!(check_image(&EvidenceSlot::Collected(vec![])).status, ImageAuthenticity::NoImages);
        assert_eq!(check_image(&EvidenceSlot::insufficient("timeout")).status, ImageAuthenticity::Unknown);
        let single = EvidenceSlot::Collected(vec![occ("amazon.in", DomainClass::Reputable, true)]);
        assert_eq!(check_image(&single).status, ImageAuthenticity::NoImages);
    }
}
