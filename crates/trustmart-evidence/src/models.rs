//! Data models for evidence retrieval and extraction.

use serde::{Deserialize, Serialize};

// ── Raw provider output ───────────────────────────────────────────────────────

/// One organic web-search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub snippet: String,
    pub link: String,
}

/// A page on which a reverse-searched image was found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageMatch {
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub snippet: Option<String>,
}

/// Reverse-image-search result for a single product image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReverseImageResult {
    pub matches: Vec<ImageMatch>,
    /// Title of the knowledge-graph entity the provider associated with the image.
    #[serde(default)]
    pub knowledge_graph: Option<String>,
}

// ── Extracted evidence ────────────────────────────────────────────────────────

/// Outcome of extracting one category of evidence.
///
/// `Insufficient` and `NotSpecified` are distinct from an empty
/// `Collected` list: the first means retrieval failed or yielded nothing
/// usable, the second that the product never declared the attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "items", rename_all = "snake_case")]
pub enum EvidenceSlot<T> {
    Collected(Vec<T>),
    Insufficient { reason: String },
    NotSpecified,
}

impl<T> EvidenceSlot<T> {
    pub fn insufficient(reason: impl Into<String>) -> Self {
        Self::Insufficient { reason: reason.into() }
    }

    pub fn items(&self) -> &[T] {
        match self {
            Self::Collected(items) => items,
            _ => &[],
        }
    }

    pub fn is_insufficient(&self) -> bool {
        matches!(self, Self::Insufficient { .. })
    }
}

/// Search snippet retained for claim corroboration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcedSnippet {
    pub source_id: String,
    pub domain: String,
    pub title: String,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    Inr,
    Usd,
    Eur,
    Gbp,
}

impl Currency {
    pub fn code(self) -> &'static str {
        match self {
            Currency::Inr => "INR",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceMention {
    /// Amount converted into the marketplace currency.
    pub amount_local: f64,
    pub original_amount: f64,
    pub currency: Currency,
    pub source_id: String,
    /// Set when no configured exchange rate existed for `currency`.
    pub approximate: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MentionStance {
    /// Official/authorised context, the brand's own domain, or a positive
    /// reputation marker for sellers.
    Authoritative,
    Ambiguous,
    /// Fraud, scam, counterfeit or unauthorised markers.
    Negative,
}

/// A declared brand or seller name found in a snippet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mention {
    pub context: String,
    pub source_id: String,
    pub stance: MentionStance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainClass {
    Reputable,
    Suspicious,
    GenericStock,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageOccurrence {
    pub image_url: String,
    pub domain: String,
    pub source_id: String,
    pub classification: DomainClass,
    pub product_name_match: bool,
}

/// Knowledge-graph entity title attached to a reverse-image result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeHint {
    pub title: String,
    pub source_id: String,
}

/// Structured facts about one product, ready for scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceBundle {
    pub snippets: EvidenceSlot<SourcedSnippet>,
    pub prices: EvidenceSlot<PriceMention>,
    pub brand_mentions: EvidenceSlot<Mention>,
    pub seller_mentions: EvidenceSlot<Mention>,
    pub images: EvidenceSlot<ImageOccurrence>,
    pub knowledge_hints: Vec<KnowledgeHint>,
    /// Degradation notes, including manual-check guidance.
    pub notes: Vec<String>,
}

impl EvidenceBundle {
    /// Bundle with every category marked insufficient.
    pub fn unavailable(reason: &str) -> Self {
        Self {
            snippets: EvidenceSlot::insufficient(reason),
            prices: EvidenceSlot::insufficient(reason),
            brand_mentions: EvidenceSlot::insufficient(reason),
            seller_mentions: EvidenceSlot::insufficient(reason),
            images: EvidenceSlot::insufficient(reason),
            knowledge_hints: Vec::new(),
            notes: Vec::new(),
        }
    }
}
