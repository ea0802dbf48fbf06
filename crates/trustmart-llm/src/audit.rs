//! Audit records for inference calls.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::backend::LlmResponse;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceAuditEntry {
    pub id: Uuid,
    /// Entity the call was made for (a review id).
    pub subject_id: Uuid,
    pub model: String,
    pub backend: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub output_hash: String,
    pub latency_ms: u64,
    pub outcome: String,
    pub called_at: DateTime<Utc>,
}

pub fn sha256_hex(output: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(output.as_bytes());
    format!("{:x}", hasher.finalize())
}

impl InferenceAuditEntry {
    pub fn success(subject_id: Uuid, backend: &str, response: &LlmResponse, latency_ms: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject_id,
            model: response.model.clone(),
            backend: backend.to_string(),
            prompt_tokens: response.prompt_tokens,
            completion_tokens: response.completion_tokens,
            output_hash: sha256_hex(&response.content),
            latency_ms,
            outcome: "ok".to_string(),
            called_at: Utc::now(),
        }
    }

    pub fn failure(subject_id: Uuid, backend: &str, model: &str, error: &str, latency_ms: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject_id,
            model: model.to_string(),
            backend: backend.to_string(),
            prompt_tokens: 0,
            completion_tokens: 0,
            output_hash: sha256_hex(""),
            latency_ms,
            outcome: format!("error: {error}"),
            called_at: Utc::now(),
        }
    }

    pub fn emit(&self) {
        tracing::info!(
            target: "trustmart::audit",
            audit_id = %self.id,
            subject_id = %self.subject_id,
            model = %self.model,
            backend = %self.backend,
            prompt_tokens = self.prompt_tokens,
            completion_tokens = self.completion_tokens,
            output_hash = %self.output_hash,
            latency_ms = self.latency_ms,
            outcome = %self.outcome,
            "inference call"
        );
    }
}
