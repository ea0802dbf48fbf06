//! Stylistic markers of fabricated reviews.
//!
//! These are cheap deterministic signals fed to the inference prompt and
//! reported alongside the verdict; they never decide the verdict alone.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref PRECISE_FIGURE: Regex =
        Regex::new(r"(?i)\b\d+(?:\.\d+)?\s?(?:gb|mah|mp|hz|hours|hrs|days|mm|%|percent)\b|\b\d+(?:\.\d+)?%").unwrap();
    static ref WORD: Regex = Regex::new(r"[\p{L}']+").unwrap();
}

const MARKETING_PHRASES: &[&str] = &[
    "best product ever",
    "life changing",
    "life-changing",
    "must buy",
    "must have",
    "highly recommend",
    "game changer",
    "buy now",
    "worth every penny",
    "100% genuine",
    "five stars",
    "10/10",
    "exceeded all expectations",
];

const POSITIVE_WORDS: &[&str] = &[
    "good", "great", "excellent", "amazing", "love", "perfect", "awesome", "best", "happy", "fantastic",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad", "poor", "terrible", "awful", "worst", "broken", "hate", "useless", "disappointed", "refund",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    MarketingLanguage,
    ExcessivePunctuation,
    ShoutingCaps,
    SentimentRatingMismatch,
    ImplausibleSpecificity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinguisticMarker {
    pub kind: MarkerKind,
    pub evidence: String,
}

impl LinguisticMarker {
    pub fn describe(&self) -> String {
        let what = match self.kind {
            MarkerKind::MarketingLanguage => "Unnatural marketing language",
            MarkerKind::ExcessivePunctuation => "Excessive exclamation",
            MarkerKind::ShoutingCaps => "Shouting in capitals",
            MarkerKind::SentimentRatingMismatch => "Sentiment does not match the rating",
            MarkerKind::ImplausibleSpecificity => "Implausibly specific figures",
        };
        format!("{what}: {}", self.evidence)
    }
}

fn count_words(words: &[String], vocabulary: &[&str]) -> usize {
    words.iter().filter(|w| vocabulary.contains(&w.as_str())).count()
}

pub fn detect_markers(comment: &str, rating: u8) -> Vec<LinguisticMarker> {
    let lower = comment.to_lowercase();
    let mut markers = Vec::new();

    let phrases: Vec<&str> = MARKETING_PHRASES.iter().copied().filter(|p| lower.contains(p)).collect();
    if phrases.len() >= 2 {
        markers.push(LinguisticMarker {
            kind: MarkerKind::MarketingLanguage,
            evidence: phrases.iter().map(|p| format!("\"{p}\"")).collect::<Vec<_>>().join(", "),
        });
    }

    let exclamations = comment.matches('!').count();
    if exclamations >= 3 || comment.contains("!!") {
        markers.push(LinguisticMarker {
            kind: MarkerKind::ExcessivePunctuation,
            evidence: format!("{exclamations} exclamation marks"),
        });
    }

    let shouted: Vec<&str> = WORD
        .find_iter(comment)
        .map(|m| m.as_str())
        .filter(|w| w.chars().count() >= 3 && w.chars().all(|c| c.is_uppercase()))
        .collect();
    if shouted.len() >= 2 {
        markers.push(LinguisticMarker {
            kind: MarkerKind::ShoutingCaps,
            evidence: shouted.join(" "),
        });
    }

    let words: Vec<String> = WORD.find_iter(&lower).map(|m| m.as_str().to_string()).collect();
    let sentiment = count_words(&words, POSITIVE_WORDS) as i64 - count_words(&words, NEGATIVE_WORDS) as i64;
    if (rating >= 4 && sentiment < 0) || (rating <= 2 && sentiment > 0) {
        markers.push(LinguisticMarker {
            kind: MarkerKind::SentimentRatingMismatch,
            evidence: format!("rating {rating} with {} wording", if sentiment > 0 { "positive" } else { "negative" }),
        });
    }

    let figures: Vec<&str> = PRECISE_FIGURE.find_iter(comment).map(|m| m.as_str()).collect();
    if figures.len() >= 3 && words.len() < 60 {
        markers.push(LinguisticMarker {
            kind: MarkerKind::ImplausibleSpecificity,
            evidence: format!("{} precise figures in {} words ({})", figures.len(), words.len(), figures.join(", ")),
        });
    }

    markers
}
