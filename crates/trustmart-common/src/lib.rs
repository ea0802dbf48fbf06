//! trustmart-common: shared entity types and the error taxonomy used
//! across all Trustmart crates.

pub mod error;
pub mod entities;

// Re-export commonly used types
pub use entities::{
    NewProduct, Product, ProductImage, Rating, RatingAggregate, Review, NEUTRAL_AVERAGE,
};
pub use error::{ApiError, ExternalServiceError, MarketError, Result};
