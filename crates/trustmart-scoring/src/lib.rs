//! trustmart-scoring: product trust scoring.
//!
//! Five independent checks (description, price, image, seller, brand) are
//! combined with fixed weights into a score in [0, 100] with red flags.

pub mod aggregator;
pub mod analyzer;
pub mod checks;
pub mod error;
pub mod normalise;
pub mod status;
pub mod weights;

pub use aggregator::{red_flags, RedFlag, Severity, TrustAggregator, TrustReport};
pub use analyzer::ProductAnalyzer;
pub use checks::score_checks;
pub use error::ScoringError;
pub use status::*;
pub use weights::CheckWeights;
