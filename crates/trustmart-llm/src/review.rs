//! Fake-review classification.
//!
//! Deterministic markers are computed first and embedded in the prompt; the
//! backend decides `isFake`/`confidence`. Any failure (no backend, timeout,
//! unparseable reply) resolves to a degraded verdict instead of an error.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};
use trustmart_common::Review;
use uuid::Uuid;

use crate::audit::InferenceAuditEntry;
use crate::backend::{LlmBackend, LlmError, LlmRequest, LlmResponse, Message};
use crate::json::extract_json_object;
use crate::markers::{detect_markers, LinguisticMarker};

/// First reason of every degraded verdict.
pub const ANALYSIS_FAILED_REASON: &str = "Analysis failed";

const SYSTEM_PROMPT: &str = "You are an expert at detecting fabricated marketplace reviews. \
Judge only the language of the review. Reply with a single JSON object: \
{\"isFake\": boolean, \"confidence\": integer 0-100, \"reasons\": [string]}.";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewVerdict {
    pub review_id: Uuid,
    pub is_fake: bool,
    /// 0..=100
    pub confidence: u8,
    pub reasons: Vec<String>,
    pub markers: Vec<LinguisticMarker>,
    pub analyzed_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReviewVerdict {
    fn degraded(review_id: Uuid, markers: Vec<LinguisticMarker>, error: String) -> Self {
        Self {
            review_id,
            is_fake: false,
            confidence: 0,
            reasons: std::iter::once(ANALYSIS_FAILED_REASON.to_string())
                .chain(markers.iter().map(LinguisticMarker::describe))
                .collect(),
            markers,
            analyzed_at: Utc::now(),
            error: Some(error),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }

    /// Trust score implied by the verdict; `None` for degraded verdicts so a
    /// stored score is never overwritten by a failed analysis.
    pub fn trust_score(&self) -> Option<u8> {
        if self.is_degraded() {
            return None;
        }
        let half = f64::from(self.confidence.min(100)) / 2.0;
        let score = if self.is_fake { 50.0 - half } else { 50.0 + half };
        Some(score.round().clamp(0.0, 100.0) as u8)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVerdict {
    is_fake: bool,
    confidence: f64,
    #[serde(default)]
    reasons: Vec<String>,
}

fn parse_verdict(content: &str) -> Result<RawVerdict, LlmError> {
    let value = extract_json_object(content)
        .ok_or_else(|| LlmError::Malformed(content.chars().take(120).collect()))?;
    Ok(serde_json::from_value(value)?)
}

pub fn build_prompt(review: &Review, category: &str, markers: &[LinguisticMarker]) -> String {
    let mut prompt = format!(
        "Product category: {category}\nDeclared rating: {}/5\nReview text:\n\"\"\"\n{}\n\"\"\"\n",
        review.rating.value(),
        review.comment
    );
    if markers.is_empty() {
        prompt.push_str("\nNo stylistic markers were detected.\n");
    } else {
        prompt.push_str("\nStylistic markers detected:\n");
        for marker in markers {
            prompt.push_str(&format!("- {}\n", marker.describe()));
        }
    }
    prompt.push_str(
        "\nConsider unnatural marketing language, implausible specificity and \
sentiment that does not match the rating.",
    );
    prompt
}

pub struct ReviewAnalyzer {
    backend: Option<Arc<dyn LlmBackend>>,
    timeout: Duration,
}

impl ReviewAnalyzer {
    pub fn new(backend: Option<Arc<dyn LlmBackend>>, timeout: Duration) -> Self {
        Self { backend, timeout }
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    #[instrument(skip_all, fields(review_id = %review.id))]
    pub async fn analyze(&self, review: &Review, category: &str) -> ReviewVerdict {
        let markers = detect_markers(&review.comment, review.rating.value());
        let Some(backend) = &self.backend else {
            return ReviewVerdict::degraded(review.id, markers, "inference backend not configured".into());
        };

        let request = LlmRequest {
            messages: vec![
                Message::system(SYSTEM_PROMPT),
                Message::user(build_prompt(review, category, &markers)),
            ],
            max_tokens: Some(512),
            temperature: Some(0.0),
        };

        let started = Instant::now();
        let outcome: Result<LlmResponse, LlmError> =
            match tokio::time::timeout(self.timeout, backend.complete(request)).await {
                Ok(result) => result,
                Err(_) => Err(LlmError::Timeout(self.timeout)),
            };
        let latency_ms = started.elapsed().as_millis() as u64;

        let response = match outcome {
            Ok(response) => {
                InferenceAuditEntry::success(review.id, backend.backend_name(), &response, latency_ms).emit();
                response
            }
            Err(e) => {
                let message = e.to_string();
                InferenceAuditEntry::failure(review.id, backend.backend_name(), backend.model_id(), &message, latency_ms)
                    .emit();
                warn!(error = %message, "review inference failed");
                return ReviewVerdict::degraded(review.id, markers, message);
            }
        };

        match parse_verdict(&response.content) {
            Ok(raw) => {
                let mut reasons = raw.reasons;
                for marker in &markers {
                    let described = marker.describe();
                    if !reasons.contains(&described) {
                        reasons.push(described);
                    }
                }
                ReviewVerdict {
                    review_id: review.id,
                    is_fake: raw.is_fake,
                    confidence: raw.confidence.round().clamp(0.0, 100.0) as u8,
                    reasons,
                    markers,
                    analyzed_at: Utc::now(),
                    error: None,
                }
            }
            Err(e) => {
                warn!(error = %e, "review inference reply unusable");
                ReviewVerdict::degraded(review.id, markers, e.to_string())
            }
        }
    }
}
