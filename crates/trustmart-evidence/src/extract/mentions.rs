//! Brand and seller mention extraction.

use crate::models::{Mention, MentionStance};

const CONTEXT_RADIUS: usize = 80;

const NEGATIVE_MARKERS: &[&str] = &[
    "fake",
    "counterfeit",
    "scam",
    "fraud",
    "unauthorized",
    "unauthorised",
    "replica",
    "knock-off",
    "knockoff",
    "complaint",
    "not genuine",
];

const AUTHORITATIVE_MARKERS: &[&str] = &[
    "official",
    "authorized dealer",
    "authorised dealer",
    "authorized reseller",
    "authorised reseller",
    "authorized retailer",
    "authorised retailer",
    "brand store",
];

const SELLER_REPUTATION_MARKERS: &[&str] = &[
    "trusted",
    "verified seller",
    "top rated",
    "highly rated",
    "assured",
    "fulfilled by",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MentionKind {
    Brand,
    Seller,
}

/// Lowercased alphanumerics of a name, used to recognise own domains.
pub fn slug(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Text window of `radius` bytes either side of `[start, end)`, snapped to
/// char boundaries.
fn window(text: &str, start: usize, end: usize, radius: usize) -> &str {
    let mut lo = start.saturating_sub(radius);
    while !text.is_char_boundary(lo) {
        lo -= 1;
    }
    let mut hi = (end + radius).min(text.len());
    while !text.is_char_boundary(hi) {
        hi += 1;
    }
    text[lo..hi].trim()
}

fn contains_any(haystack: &str, markers: &[&str]) -> bool {
    markers.iter().any(|m| haystack.contains(m))
}

/// Classify the context around one mention. Negative markers dominate.
pub fn classify(context: &str, link_domain: &str, name: &str, kind: MentionKind) -> MentionStance {
    let lower = context.to_lowercase();
    if contains_any(&lower, NEGATIVE_MARKERS) {
        return MentionStance::Negative;
    }
    let own_domain = {
        let s = slug(name);
        s.len() >= 3 && slug(link_domain).contains(&s)
    };
    let authoritative = own_domain
        || contains_any(&lower, AUTHORITATIVE_MARKERS)
        || (kind == MentionKind::Seller && contains_any(&lower, SELLER_REPUTATION_MARKERS));
    if authoritative {
        MentionStance::Authoritative
    } else {
        MentionStance::Ambiguous
    }
}

/// First mention of `name` in `text`, case-insensitive, with its stance.
///
/// Matching is done on a lowercased copy; offsets are only used when the
/// lowercasing preserved byte length, otherwise the whole text is the context.
pub fn find_mention(
    text: &str,
    name: &str,
    source_id: &str,
    link_domain: &str,
    kind: MentionKind,
) -> Option<Mention> {
    let needle = name.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    let lower = text.to_lowercase();
    let start = lower.find(&needle)?;
    let context = if lower.len() == text.len() {
        window(text, start, start + needle.len(), CONTEXT_RADIUS)
    } else {
        text.trim()
    };
    Some(Mention {
        context: context.to_string(),
        source_id: source_id.to_string(),
        stance: classify(context, link_domain, name, kind),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_official_store_is_authoritative() {
        let m = find_mention(
            "Shop the official Samsung store for Galaxy Buds 2",
            "samsung",
            "web #1",
            "amazon.in",
            MentionKind::Brand,
        )
        .unwrap();
        assert_eq!(m.stance, MentionStance::Authoritative);
    }

    #[test]
    fn test_own_domain_is_authoritative() {
        let m = find_mention("Galaxy Buds 2 by Samsung", "Samsung", "web #2", "samsung.com", MentionKind::Brand)
            .unwrap();
        assert_eq!(m.stance, MentionStance::Authoritative);
    }

    #[test]
    fn test_negative_markers_dominate() {
        let m = find_mention(
            "Beware: fake Samsung earbuds sold as official",
            "Samsung",
            "web #3",
            "reddit.com",
            MentionKind::Brand,
        )
        .unwrap();
        assert_eq!(m.stance, MentionStance::Negative);
    }

    #[test]
    fn test_seller_reputation_marker() {
        let m = find_mention(
            "RetailNet is a top rated seller with fast delivery",
            "RetailNet",
            "seller #1",
            "flipkart.com",
            MentionKind::Seller,
        )
        .unwrap();
        assert_eq!(m.stance, MentionStance::Authoritative);
        // The same words do not make a brand authoritative.
        assert_eq!(
            classify("top rated earbuds", "flipkart.com", "Samsung", MentionKind::Brand),
            MentionStance::Ambiguous
        );
    }

    #[test]
    fn test_absent_name_yields_nothing() {
        assert!(find_mention("Generic earbuds", "Sony", "web #1", "x.com", MentionKind::Brand).is_none());
    }

    #[test]
    fn test_window_respects_char_boundaries() {
        let text = format!("{}Samsung{}", "₹".repeat(40), "é".repeat(60));
        let m = find_mention(&text, "Samsung", "web #1", "x.com", MentionKind::Brand).unwrap();
        assert!(m.context.contains("Samsung"));
    }
}
