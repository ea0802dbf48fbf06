use std::collections::BTreeSet;

use trustmart_common::Product;
use trustmart_evidence::extract::{mentions_name, name_tokens, spec_claims, SpecClaim};
use trustmart_evidence::{EvidenceBundle, EvidenceSlot, SourcedSnippet};

use super::cite;
use crate::status::{CheckResult, DescriptionCheck, DescriptionQuality};

fn same_value(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

fn unknown(findings: String) -> DescriptionCheck {
    DescriptionCheck {
        result: CheckResult::new(0.5, DescriptionQuality::Unknown, findings),
        is_consistent: true,
    }
}

fn graded(score: f64, findings: String, is_consistent: bool) -> DescriptionCheck {
    DescriptionCheck {
        result: CheckResult::new(score, DescriptionQuality::from_score(score), findings),
        is_consistent,
    }
}

struct ClaimEvidence<'a> {
    claim: &'a SpecClaim,
    corroborating: Vec<&'a SourcedSnippet>,
    /// Sources stating the same unit with different values only.
    contradicting: Vec<(&'a SourcedSnippet, Vec<f64>)>,
}

fn weigh_claims<'a>(
    declared: &'a [SpecClaim],
    sources: &'a [(&'a SourcedSnippet, Vec<SpecClaim>)],
) -> Vec<ClaimEvidence<'a>> {
    declared
        .iter()
        .map(|claim| {
            let mut corroborating = Vec::new();
            let mut contradicting = Vec::new();
            for (snippet, claims) in sources {
                let values: Vec<f64> =
                    claims.iter().filter(|c| c.unit == claim.unit).map(|c| c.value).collect();
                if values.is_empty() {
                    continue;
                }
                if values.iter().any(|v| same_value(*v, claim.value)) {
                    corroborating.push(*snippet);
                } else {
                    contradicting.push((*snippet, values));
                }
            }
            ClaimEvidence { claim, corroborating, contradicting }
        })
        .collect()
}

/// Declared description claims against search snippets.
///
/// A claim is contradicted when no source corroborates it and at least two
/// independent sources state a different value for the same unit.
pub fn check_description(product: &Product, bundle: &EvidenceBundle) -> DescriptionCheck {
    let snippets = match &bundle.snippets {
        EvidenceSlot::Collected(s) if !s.is_empty() => s,
        EvidenceSlot::Insufficient { reason } => {
            return unknown(format!("Description could not be checked: {reason}."));
        }
        _ => return unknown("Description could not be checked: web search returned no results.".into()),
    };

    let declared = spec_claims(&product.description);
    let sources: Vec<(&SourcedSnippet, Vec<SpecClaim>)> = snippets
        .iter()
        .map(|s| (s, spec_claims(&format!("{} {}", s.title, s.text))))
        .collect();
    let weighed = weigh_claims(&declared, &sources);

    let contradictions: Vec<String> = weighed
        .iter()
        .filter(|e| e.corroborating.is_empty() && e.contradicting.len() >= 2)
        .map(|e| {
            let stated = e
                .contradicting
                .iter()
                .map(|(s, values)| {
                    let values: Vec<String> = values.iter().map(|v| format!("{v} {}", e.claim.unit)).collect();
                    format!("{} states {}", s.source_id, values.join("/"))
                })
                .collect::<Vec<_>>()
                .join("; ");
            format!("\"{}\" is contradicted ({stated})", e.claim.raw)
        })
        .collect();
    if !contradictions.is_empty() {
        return graded(0.0, format!("Description contradicts search evidence: {}.", contradictions.join(". ")), false);
    }

    if let Some(brand) = product.brand.as_deref() {
        let described = product.description.to_lowercase().contains(&brand.to_lowercase());
        if described && bundle.brand_mentions.items().is_empty() && snippets.len() >= 2 {
            return graded(
                0.0,
                format!(
                    "Description names brand {brand} but none of {} search results mention it ({}).",
                    snippets.len(),
                    cite(snippets.iter().map(|s| s.source_id.as_str()))
                ),
                true,
            );
        }
    }

    if !declared.is_empty() {
        let corroborated: Vec<&ClaimEvidence> = weighed.iter().filter(|e| !e.corroborating.is_empty()).collect();
        let distinct: BTreeSet<&str> = corroborated
            .iter()
            .flat_map(|e| e.corroborating.iter().map(|s| s.source_id.as_str()))
            .collect();
        let detail = corroborated
            .iter()
            .map(|e| format!("\"{}\" by {}", e.claim.raw, cite(e.corroborating.iter().map(|s| s.source_id.as_str()))))
            .collect::<Vec<_>>()
            .join("; ");

        if corroborated.len() == declared.len() && distinct.len() >= 2 {
            return graded(1.0, format!("All declared specifications corroborated: {detail}."), true);
        }
        if corroborated.is_empty() {
            let raw: Vec<&str> = declared.iter().map(|c| c.raw.as_str()).collect();
            return graded(
                0.5,
                format!("None of {} search results confirm the declared specifications ({}).", snippets.len(), raw.join(", ")),
                true,
            );
        }
        let missing: Vec<&str> = weighed
            .iter()
            .filter(|e| e.corroborating.is_empty())
            .map(|e| e.claim.raw.as_str())
            .collect();
        let missing = if missing.is_empty() { String::new() } else { format!(" Unconfirmed: {}.", missing.join(", ")) };
        return graded(0.5, format!("Partially corroborated: {detail}.{missing}"), true);
    }

    let tokens = name_tokens(&product.name);
    let matching: Vec<&str> = snippets
        .iter()
        .filter(|s| mentions_name(&format!("{} {}", s.title, s.text), &tokens))
        .map(|s| s.source_id.as_str())
        .collect();
    match matching.len() {
        0 => graded(
            0.5,
            format!("No specifications to verify and none of {} search results match the product name.", snippets.len()),
            true,
        ),
        1 => graded(0.5, format!("Product described by a single source only: {}.", matching[0]), true),
        _ => graded(1.0, format!("Product corroborated by multiple sources: {}.", cite(matching)), true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trustmart_common::NewProduct;
    use trustmart_evidence::{Mention, MentionStance};

    fn product(description: &str) -> Product {
        NewProduct {
            name: "Galaxy Buds 2".into(),
            description: description.into(),
            category: "audio".into(),
            price: 8_500.0,
            brand: Some("Samsung".into()),
            seller: None,
            images: vec![],
            is_flagged: false,
        }
        .into_product()
        .unwrap()
    }

    fn snippet(i: usize, text: &str) -> SourcedSnippet {
        SourcedSnippet {
            source_id: format!("web #{i} (site{i}.com)"),
            domain: format!("site{i}.com"),
            title: "Galaxy Buds 2".into(),
            text: text.into(),
        }
    }

    fn bundle(snippets: Vec<SourcedSnippet>, brand_mentions: Vec<Mention>) -> EvidenceBundle {
        let mut b = EvidenceBundle::unavailable("n/a");
        b.snippets = EvidenceSlot::Collected(snippets);
        b.brand_mentions = EvidenceSlot::Collected(brand_mentions);
        b
    }

    fn samsung(i: usize) -> Mention {
        Mention {
            context: "Samsung".into(),
            source_id: format!("web #{i} (site{i}.com)"),
            stance: MentionStance::Ambiguous,
        }
    }

    #[test]
    fn test_multi_source_corroboration_is_good() {
        let b = bundle(
            vec![snippet(1, "up to 29 hours with case"), snippet(2, "battery: 29 hours total")],
            vec![],
        );
        let r = check_description(&product("Up to 29 hours battery life"), &b);
        assert_eq!(r.result.status, DescriptionQuality::Good);
        assert!(r.is_consistent);
        assert!(r.result.findings.contains("web #1 (site1.com), web #2 (site2.com)"));
    }

    #[test]
    fn test_contradiction_is_poor_and_inconsistent() {
        let b = bundle(
            vec![snippet(1, "rated for 20 hours"), snippet(2, "lasts about 21 hours")],
            vec![samsung(1)],
        );
        let r = check_description(&product("Samsung buds with 60 hours battery"), &b);
        assert_eq!(r.result.sub_score, 0.0);
        assert_eq!(r.result.status, DescriptionQuality::Poor);
        assert!(!r.is_consistent);
        assert!(r.result.findings.contains("web #1 (site1.com) states 20 hours"));
    }

    #[test]
    fn test_single_dissenting_source_is_not_a_contradiction() {
        let b = bundle(vec![snippet(1, "rated for 20 hours"), snippet(2, "great sound")], vec![samsung(1)]);
        let r = check_description(&product("Samsung buds with 60 hours battery"), &b);
        assert!(r.is_consistent);
        assert_eq!(r.result.status, DescriptionQuality::Average);
    }

    #[test]
    fn test_brand_presence_mismatch() {
        let b = bundle(vec![snippet(1, "generic earbuds"), snippet(2, "unbranded tws")], vec![]);
        let r = check_description(&product("Original Samsung earbuds"), &b);
        assert_eq!(r.result.sub_score, 0.0);
        assert!(r.is_consistent, "brand mismatch is not a specification contradiction");
    }

    #[test]
    fn test_unavailable_evidence_is_unknown() {
        let r = check_description(&product("Samsung earbuds"), &EvidenceBundle::unavailable("search timed out"));
        assert_eq!(r.result.status, DescriptionQuality::Unknown);
        assert!(r.result.findings.contains("search timed out"));
    }
}
