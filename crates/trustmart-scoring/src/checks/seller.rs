use trustmart_evidence::{EvidenceSlot, Mention, MentionStance};

use super::{cite, quote};
use crate::status::{CheckResult, SellerStatus};

fn with_stance(mentions: &[Mention], stance: MentionStance) -> Vec<&Mention> {
    mentions.iter().filter(|m| m.stance == stance).collect()
}

fn first_quote(mentions: &[&Mention]) -> String {
    mentions.first().map(|m| quote(&m.context)).unwrap_or_default()
}

/// Seller reputation from seller mentions. Negative context dominates.
pub fn check_seller(declared: Option<&str>, mentions: &EvidenceSlot<Mention>) -> CheckResult<SellerStatus> {
    let Some(seller) = declared else {
        return CheckResult::new(0.5, SellerStatus::Unknown, "Seller not declared.");
    };
    let mentions = match mentions {
        EvidenceSlot::Collected(m) => m,
        EvidenceSlot::Insufficient { reason } => {
            return CheckResult::new(
                0.5,
                SellerStatus::Unknown,
                format!("Seller reputation for {seller} unavailable: {reason}."),
            );
        }
        EvidenceSlot::NotSpecified => {
            return CheckResult::new(0.5, SellerStatus::Unknown, "Seller not declared.");
        }
    };

    let negative = with_stance(mentions, MentionStance::Negative);
    if !negative.is_empty() {
        return CheckResult::new(
            0.0,
            SellerStatus::Suspicious,
            format!(
                "{seller} appears in negative context in {}: {}.",
                cite(negative.iter().map(|m| m.source_id.as_str())),
                first_quote(&negative)
            ),
        );
    }

    let positive = with_stance(mentions, MentionStance::Authoritative);
    if !positive.is_empty() {
        return CheckResult::new(
            1.0,
            SellerStatus::Reputable,
            format!(
                "{seller} has positive reputation context in {}: {}.",
                cite(positive.iter().map(|m| m.source_id.as_str())),
                first_quote(&positive)
            ),
        );
    }

    if mentions.is_empty() {
        return CheckResult::new(0.5, SellerStatus::Generic, format!("No reputation information found for {seller}."));
    }
    CheckResult::new(
        0.5,
        SellerStatus::Generic,
        format!(
            "{seller} mentioned without reputation context in {}.",
            cite(mentions.iter().map(|m| m.source_id.as_str()))
        ),
    )
}
