//! TrustAggregator: weighted score, red flags and the verification report.
//!
//! trust_score = round(Σ w_i × s_i × 100), clamped to [0, 100]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ScoringError;
use crate::status::{
    BrandStatus, CheckStatus, DescriptionQuality, ImageAuthenticity, PriceStatus, SellerStatus, Verification,
};
use crate::weights::CheckWeights;

/// Checks at or above this count of neutral defaults make the summary tentative.
pub const TENTATIVE_THRESHOLD: usize = 3;

pub const ANALYSIS_FAILED: &str = "Analysis failed.";

/// Sole red flag of a failed report.
pub const ANALYSIS_ERROR_FLAG: &str = "An error occurred during analysis.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Major,
    Minor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RedFlag {
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustReport {
    pub subject_id: Uuid,
    pub trust_score: u8,
    pub summary: String,
    /// Major flags first, then minor; each carries its check's citation.
    pub red_flags: Vec<String>,
    pub verification: Verification,
    /// Degradation notes and manual-check guidance from evidence retrieval.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub evidence_notes: Vec<String>,
    pub analyzed_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TrustReport {
    /// Degraded report: score 0, every check `Unknown`, the failure explained.
    pub fn failed(subject_id: Uuid, error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            subject_id,
            trust_score: 0,
            summary: format!("Analysis failed: {error}"),
            red_flags: vec![ANALYSIS_ERROR_FLAG.to_string()],
            verification: Verification::all_unknown(0.0, ANALYSIS_FAILED),
            evidence_notes: Vec::new(),
            analyzed_at: Utc::now(),
            error: Some(error),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}

fn flag(severity: Severity, label: &str, findings: &str) -> RedFlag {
    RedFlag { severity, message: format!("{label}: {findings}") }
}

/// Rule-based red flags, majors before minors.
pub fn red_flags(v: &Verification) -> Vec<RedFlag> {
    use Severity::{Major, Minor};
    let mut flags = Vec::new();
    let price = &v.price_analysis;
    let brand = &v.brand_verification;
    let image = &v.image_authenticity;
    let seller = &v.seller_reputation;
    let description = &v.description_quality.result;

    match price.status {
        PriceStatus::TooLow => flags.push(flag(Major, "Price too low", &price.findings)),
        PriceStatus::TooHigh => flags.push(flag(Major, "Price too high", &price.findings)),
        _ => {}
    }
    match brand.status {
        BrandStatus::Missing => flags.push(flag(Major, "Brand missing", &brand.findings)),
        BrandStatus::Unverified => flags.push(flag(Major, "Brand unverified", &brand.findings)),
        _ => {}
    }
    if image.status == ImageAuthenticity::Suspicious {
        flags.push(flag(Major, "Suspicious images", &image.findings));
    }
    if seller.status == SellerStatus::Suspicious {
        flags.push(flag(Major, "Suspicious seller", &seller.findings));
    }

    if price.status == PriceStatus::SlightlyOff {
        flags.push(flag(Minor, "Price slightly off", &price.findings));
    }
    if image.status == ImageAuthenticity::StockPhoto {
        flags.push(flag(Minor, "Stock photos only", &image.findings));
    }
    if description.status == DescriptionQuality::Average {
        flags.push(flag(Minor, "Description partially corroborated", &description.findings));
    }
    match seller.status {
        SellerStatus::Generic => flags.push(flag(Minor, "Seller reputation unestablished", &seller.findings)),
        SellerStatus::Unknown => flags.push(flag(Minor, "Seller reputation unknown", &seller.findings)),
        _ => {}
    }
    flags
}

#[derive(Debug, Clone)]
pub struct TrustAggregator {
    weights: CheckWeights,
}

impl Default for TrustAggregator {
    fn default() -> Self {
        Self { weights: CheckWeights::default() }
    }
}

impl TrustAggregator {
    pub fn new(weights: CheckWeights) -> Result<Self, ScoringError> {
        if !weights.validate() {
            return Err(ScoringError::InvalidWeights(format!(
                "weights must be non-negative and sum to 1.0, got {}",
                weights.sum()
            )));
        }
        Ok(Self { weights })
    }

    pub fn weights(&self) -> &CheckWeights {
        &self.weights
    }

    pub fn trust_score(&self, v: &Verification) -> u8 {
        let weighted: f64 = v
            .sub_scores()
            .iter()
            .zip(self.weights.as_array())
            .map(|(s, w)| s.clamp(0.0, 1.0) * w)
            .sum();
        (weighted * 100.0).round().clamp(0.0, 100.0) as u8
    }

    pub fn aggregate(&self, subject_id: Uuid, verification: Verification, evidence_notes: Vec<String>) -> TrustReport {
        let trust_score = self.trust_score(&verification);
        let flags = red_flags(&verification);
        let majors = flags.iter().filter(|f| f.severity == Severity::Major).count();
        let minors = flags.len() - majors;

        let verdict = match trust_score {
            80..=100 => "Listing appears authentic",
            50..=79 => "Listing shows some authenticity concerns",
            _ => "Listing shows significant authenticity risk",
        };
        let tentative = if verification.neutral_defaults() >= TENTATIVE_THRESHOLD {
            "Tentative: "
        } else {
            ""
        };
        let summary = format!(
            "{tentative}{verdict} (trust score {trust_score}/100, {majors} major and {minors} minor red flags)."
        );

        TrustReport {
            subject_id,
            trust_score,
            summary,
            red_flags: flags.into_iter().map(|f| f.message).collect(),
            verification,
            evidence_notes,
            analyzed_at: Utc::now(),
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::{CheckResult, DescriptionCheck};

    fn verification(d: f64, p: f64, i: f64, s: f64, b: f64) -> Verification {
        Verification {
            description_quality: DescriptionCheck {
                result: CheckResult::new(d, DescriptionQuality::from_score(d), "d"),
                is_consistent: true,
            },
            price_analysis: CheckResult::new(p, PriceStatus::Reasonable, "p"),
            image_authenticity: CheckResult::new(i, ImageAuthenticity::Authentic, "i"),
            seller_reputation: CheckResult::new(s, SellerStatus::Reputable, "s"),
            brand_verification: CheckResult::new(b, BrandStatus::Present, "b"),
        }
    }

    #[test]
    fn test_all_unknown_scores_fifty_and_is_tentative() {
        let agg = TrustAggregator::default();
        let report = agg.aggregate(Uuid::nil(), Verification::all_unknown(0.5, "no evidence"), vec![]);
        assert_eq!(report.trust_score, 50);
        assert!(report.summary.starts_with("Tentative:"), "{}", report.summary);
        assert_eq!(report.red_flags.len(), 1, "only the unknown seller raises a minor flag");
    }

    #[test]
    fn test_weighted_score() {
        let agg = TrustAggregator::default();
        assert_eq!(agg.trust_score(&verification(1.0, 1.0, 1.0, 1.0, 1.0)), 100);
        assert_eq!(agg.trust_score(&verification(0.0, 0.0, 0.0, 0.0, 0.0)), 0);
        // 0.10 + 0 + 0.30 + 0.15 + 0.20 × 0.3
        assert_eq!(agg.trust_score(&verification(1.0, 0.0, 1.0, 1.0, 0.3)), 61);
    }

    #[test]
    fn test_major_flags_precede_minor() {
        let mut v = verification(0.5, 0.0, 0.7, 0.5, 0.3);
        v.price_analysis = CheckResult::new(0.0, PriceStatus::TooLow, "₹8,500 vs ₹9,600 to ₹18,000");
        v.image_authenticity = CheckResult::new(0.7, ImageAuthenticity::StockPhoto, "samsung.com");
        v.brand_verification = CheckResult::new(0.3, BrandStatus::Unverified, "not mentioned");
        let flags = red_flags(&v);
        let severities: Vec<Severity> = flags.iter().map(|f| f.severity).collect();
        assert_eq!(
            severities,
            vec![Severity::Major, Severity::Major, Severity::Minor, Severity::Minor]
        );
        assert!(flags[0].message.starts_with("Price too low: ₹8,500"));
    }

    #[test]
    fn test_failed_report() {
        let r = TrustReport::failed(Uuid::nil(), "analysis deadline elapsed");
        assert_eq!(r.trust_score, 0);
        assert!(r.is_degraded());
        assert_eq!(r.verification.price_analysis.status, PriceStatus::Unknown);
        assert_eq!(r.verification.brand_verification.findings, ANALYSIS_FAILED);
        assert_eq!(r.red_flags, vec![ANALYSIS_ERROR_FLAG.to_string()]);
    }

    #[test]
    fn test_invalid_weights_rejected() {
        let mut w = CheckWeights::default();
        w.seller = 0.5;
        assert!(TrustAggregator::new(w).is_err());
    }
}
