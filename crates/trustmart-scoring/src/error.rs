use std::time::Duration;

use thiserror::Error;
use trustmart_common::MarketError;

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("product cannot be analysed: {0}")]
    InvalidSubject(String),

    #[error("analysis deadline of {0:?} elapsed")]
    DeadlineElapsed(Duration),

    #[error("invalid check weights: {0}")]
    InvalidWeights(String),
}

impl From<ScoringError> for MarketError {
    fn from(err: ScoringError) -> Self {
        match err {
            ScoringError::InvalidSubject(m) => MarketError::Validation(m),
            other => MarketError::Internal(other.to_string()),
        }
    }
}
