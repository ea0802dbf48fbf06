//! Weight vector for product trust scoring.

use serde::{Deserialize, Serialize};

/// The five-component check weight vector. Weights sum to 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckWeights {
    /// Description claims corroborated by search results
    pub description: f64,
    /// Declared price against the tolerance band of observed prices
    pub price: f64,
    /// Reverse-image recurrence on reputable domains
    pub image: f64,
    /// Seller reputation context
    pub seller: f64,
    /// Brand corroboration
    pub brand: f64,
}

impl Default for CheckWeights {
    fn default() -> Self {
        Self {
            description: 0.10,
            price:       0.25,
            image:       0.30,
            seller:      0.15,
            brand:       0.20,
        }
    }
}

impl CheckWeights {
    pub fn sum(&self) -> f64 {
        self.as_array().iter().sum()
    }

    /// Validate that all weights are non-negative and sum to ~1.0
    pub fn validate(&self) -> bool {
        self.as_array().iter().all(|w| w.is_finite() && *w >= 0.0) && (self.sum() - 1.0).abs() < 1e-9
    }

    /// Convert to array, in description/price/image/seller/brand order.
    pub fn as_array(&self) -> [f64; 5] {
        [self.description, self.price, self.image, self.seller, self.brand]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_sum_to_one() {
        let w = CheckWeights::default();
        assert!(w.validate(), "Default weights must sum to 1.0");
    }

    #[test]
    fn test_broken_weights_rejected() {
        let mut w = CheckWeights::default();
        w.image += 0.10;
        assert!(!w.validate());
        w.image = -0.30;
        w.price = 0.85;
        assert!(!w.validate());
    }
}
