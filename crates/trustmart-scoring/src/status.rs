//! Check results and their closed status enumerations.

use serde::{Deserialize, Serialize};

/// Common behaviour of every check status.
pub trait CheckStatus: Copy {
    fn label(self) -> &'static str;

    /// Neutral default caused by absent evidence (not by evidence of trust).
    fn is_neutral_default(self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DescriptionQuality {
    Good,
    Average,
    Poor,
    Unknown,
}

impl DescriptionQuality {
    /// Good (> 0.8), Average (0.4 to 0.8 inclusive), Poor (< 0.4).
    pub fn from_score(score: f64) -> Self {
        if score > 0.8 {
            Self::Good
        } else if score >= 0.4 {
            Self::Average
        } else {
            Self::Poor
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceStatus {
    Reasonable,
    #[serde(rename = "Slightly Off")]
    SlightlyOff,
    #[serde(rename = "Too Low")]
    TooLow,
    #[serde(rename = "Too High")]
    TooHigh,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageAuthenticity {
    Authentic,
    #[serde(rename = "Stock Photo")]
    StockPhoto,
    Suspicious,
    #[serde(rename = "No Images")]
    NoImages,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SellerStatus {
    Reputable,
    Generic,
    Suspicious,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BrandStatus {
    Present,
    Unverified,
    Missing,
    Unknown,
}

impl CheckStatus for DescriptionQuality {
    fn label(self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Average => "Average",
            Self::Poor => "Poor",
            Self::Unknown => "Unknown",
        }
    }

    fn is_neutral_default(self) -> bool {
        self == Self::Unknown
    }
}

impl CheckStatus for PriceStatus {
    fn label(self) -> &'static str {
        match self {
            Self::Reasonable => "Reasonable",
            Self::SlightlyOff => "Slightly Off",
            Self::TooLow => "Too Low",
            Self::TooHigh => "Too High",
            Self::Unknown => "Unknown",
        }
    }

    fn is_neutral_default(self) -> bool {
        self == Self::Unknown
    }
}

impl CheckStatus for ImageAuthenticity {
    fn label(self) -> &'static str {
        match self {
            Self::Authentic => "Authentic",
            Self::StockPhoto => "Stock Photo",
            Self::Suspicious => "Suspicious",
            Self::NoImages => "No Images",
            Self::Unknown => "Unknown",
        }
    }

    fn is_neutral_default(self) -> bool {
        matches!(self, Self::NoImages | Self::Unknown)
    }
}

impl CheckStatus for SellerStatus {
    fn label(self) -> &'static str {
        match self {
            Self::Reputable => "Reputable",
            Self::Generic => "Generic",
            Self::Suspicious => "Suspicious",
            Self::Unknown => "Unknown",
        }
    }

    fn is_neutral_default(self) -> bool {
        self == Self::Unknown
    }
}

impl CheckStatus for BrandStatus {
    fn label(self) -> &'static str {
        match self {
            Self::Present => "Present",
            Self::Unverified => "Unverified",
            Self::Missing => "Missing",
            Self::Unknown => "Unknown",
        }
    }

    fn is_neutral_default(self) -> bool {
        self == Self::Unknown
    }
}

/// Outcome of one check: sub-score in [0, 1], status and cited findings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult<S> {
    pub sub_score: f64,
    pub status: S,
    pub findings: String,
}

impl<S: CheckStatus> CheckResult<S> {
    pub fn new(sub_score: f64, status: S, findings: impl Into<String>) -> Self {
        Self { sub_score: sub_score.clamp(0.0, 1.0), status, findings: findings.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptionCheck {
    #[serde(flatten)]
    pub result: CheckResult<DescriptionQuality>,
    /// False only when a direct contradiction was found.
    pub is_consistent: bool,
}

/// All five check results. Never partial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verification {
    pub description_quality: DescriptionCheck,
    pub price_analysis: CheckResult<PriceStatus>,
    pub image_authenticity: CheckResult<ImageAuthenticity>,
    pub seller_reputation: CheckResult<SellerStatus>,
    pub brand_verification: CheckResult<BrandStatus>,
}

impl Verification {
    /// Every check `Unknown` with the same `findings` and `sub_score`.
    pub fn all_unknown(sub_score: f64, findings: &str) -> Self {
        Self {
            description_quality: DescriptionCheck {
                result: CheckResult::new(sub_score, DescriptionQuality::Unknown, findings),
                is_consistent: true,
            },
            price_analysis: CheckResult::new(sub_score, PriceStatus::Unknown, findings),
            image_authenticity: CheckResult::new(sub_score, ImageAuthenticity::Unknown, findings),
            seller_reputation: CheckResult::new(sub_score, SellerStatus::Unknown, findings),
            brand_verification: CheckResult::new(sub_score, BrandStatus::Unknown, findings),
        }
    }

    /// Sub-scores in weight order.
    pub fn sub_scores(&self) -> [f64; 5] {
        [
            self.description_quality.result.sub_score,
            self.price_analysis.sub_score,
            self.image_authenticity.sub_score,
            self.seller_reputation.sub_score,
            self.brand_verification.sub_score,
        ]
    }

    pub fn neutral_defaults(&self) -> usize {
        [
            self.description_quality.result.status.is_neutral_default(),
            self.price_analysis.status.is_neutral_default(),
            self.image_authenticity.status.is_neutral_default(),
            self.seller_reputation.status.is_neutral_default(),
            self.brand_verification.status.is_neutral_default(),
        ]
        .iter()
        .filter(|n| **n)
        .count()
    }
}
