use trustmart_evidence::{EvidenceBundle, EvidenceSlot, MentionStance};

use super::{cite, quote};
use crate::status::{BrandStatus, CheckResult};

/// Declared brand against authoritative mentions. An undeclared brand can
/// still be hinted by a reverse-image knowledge-graph entity.
pub fn check_brand(declared: Option<&str>, bundle: &EvidenceBundle) -> CheckResult<BrandStatus> {
    if let EvidenceSlot::Insufficient { reason } = &bundle.snippets {
        return CheckResult::new(0.5, BrandStatus::Unknown, format!("Brand evidence unavailable: {reason}."));
    }

    let Some(brand) = declared else {
        return match bundle.knowledge_hints.first() {
            Some(hint) => CheckResult::new(
                0.3,
                BrandStatus::Unverified,
                format!("Brand not declared; reverse image search associates the product with \"{}\" ({}).", hint.title, hint.source_id),
            ),
            None => CheckResult::new(0.0, BrandStatus::Missing, "Brand not declared and no evidence identifies one."),
        };
    };

    let mentions = bundle.brand_mentions.items();
    if let Some(m) = mentions.iter().find(|m| m.stance == MentionStance::Authoritative) {
        return CheckResult::new(
            1.0,
            BrandStatus::Present,
            format!("{brand} corroborated in authoritative context by {}: {}.", m.source_id, quote(&m.context)),
        );
    }

    let negative: Vec<&str> = mentions
        .iter()
        .filter(|m| m.stance == MentionStance::Negative)
        .map(|m| m.source_id.as_str())
        .collect();
    let findings = if !negative.is_empty() {
        format!("{brand} appears only alongside counterfeit or fraud markers in {}.", cite(negative))
    } else if !mentions.is_empty() {
        format!(
            "{brand} mentioned without authoritative context in {}.",
            cite(mentions.iter().map(|m| m.source_id.as_str()))
        )
    } else {
        format!("{brand} is not mentioned in any of {} search results.", bundle.snippets.items().len())
    };
    CheckResult::new(0.3, BrandStatus::Unverified, findings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use trustmart_evidence::{KnowledgeHint, Mention};

    fn collected(mentions: Vec<Mention>) -> EvidenceBundle {
        let mut b = EvidenceBundle::unavailable("n/a");
        b.snippets = EvidenceSlot::Collected(vec![]);
        b.brand_mentions = EvidenceSlot::Collected(mentions);
        b
    }

    #[test]
    fn test_authoritative_mention_is_present() {
        let b = collected(vec![Mention {
            context: "official Samsung store".into(),
            source_id: "web #1 (samsung.com)".into(),
            stance: MentionStance::Authoritative,
        }]);
        let r = check_brand(Some("Samsung"), &b);
        assert_eq!(r.status, BrandStatus::Present);
        assert!(r.findings.contains("web #1 (samsung.com)"));
    }

    #[test]
    fn test_declared_without_corroboration_is_unverified() {
        let r = check_brand(Some("Samsung"), &collected(vec![]));
        assert_eq!(r.status, BrandStatus::Unverified);
        assert_eq!(r.sub_score, 0.3);
    }

    #[test]
    fn test_undeclared_brand() {
        let mut b = collected(vec![]);
        b.brand_mentions = EvidenceSlot::NotSpecified;
        assert_eq!(check_brand(None, &b).status, BrandStatus::Missing);

        b.knowledge_hints.push(KnowledgeHint {
            title: "Samsung Galaxy Buds2".into(),
            source_id: "image #1 knowledge graph".into(),
        });
        let r = check_brand(None, &b);
        assert_eq!(r.status, BrandStatus::Unverified);
        assert!(r.findings.contains("image #1 knowledge graph"));
    }

    #[test]
    fn test_search_failure_is_unknown_even_when_undeclared() {
        let r = check_brand(None, &EvidenceBundle::unavailable("quota exceeded"));
        assert_eq!(r.status, BrandStatus::Unknown);
    }
}
