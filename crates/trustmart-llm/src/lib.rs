//! trustmart-llm: inference backend abstraction and fake-review analysis.
//!
//! The backend is an injected collaborator; without credentials the
//! analyzer still runs and returns degraded verdicts.

pub mod audit;
pub mod backend;
pub mod json;
pub mod markers;
pub mod review;

pub use audit::InferenceAuditEntry;
pub use backend::{from_config, LlmBackend, LlmError, LlmRequest, LlmResponse, Message};
pub use json::extract_json_object;
pub use markers::{detect_markers, LinguisticMarker, MarkerKind};
pub use review::{ReviewAnalyzer, ReviewVerdict, ANALYSIS_FAILED_REASON};
