/// Core marketplace entity types.
/// Products own their rating aggregate; reviews are referenced, not owned.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{MarketError, Result};

/// Average reported while a product has no retained reviews.
pub const NEUTRAL_AVERAGE: f64 = 5.0;

/// Trust score assigned to entities that have never been analysed.
pub const DEFAULT_TRUST_SCORE: u8 = 100;

// ---------------------------------------------------------------------------
// Rating
// ---------------------------------------------------------------------------

/// A review rating, always in [1, 5].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(MarketError::Validation(format!(
                "rating must be between {} and {}, got {}",
                Self::MIN,
                Self::MAX,
                value
            )))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = MarketError;

    fn try_from(value: u8) -> Result<Self> {
        Rating::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(r: Rating) -> u8 {
        r.0
    }
}

/// Running {average, count} summary of a product's retained reviews.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingAggregate {
    pub average: f64,
    pub count: u32,
}

impl Default for RatingAggregate {
    fn default() -> Self {
        Self { average: NEUTRAL_AVERAGE, count: 0 }
    }
}

// ---------------------------------------------------------------------------
// Product
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductImage {
    pub url: String,
    #[serde(default)]
    pub alt: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    /// Price in the marketplace's local currency.
    pub price: f64,
    pub brand: Option<String>,
    pub seller: Option<String>,
    pub images: Vec<ProductImage>,
    pub ratings: RatingAggregate,
    /// Back-references to retained reviews, in insertion order.
    pub reviews: Vec<Uuid>,
    pub trust_score: u8,
    pub is_flagged: bool,
    pub approved_by_moderator: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: f64,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub seller: Option<String>,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    #[serde(default)]
    pub is_flagged: bool,
}

impl NewProduct {
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("name", &self.name),
            ("description", &self.description),
            ("category", &self.category),
        ] {
            if value.trim().is_empty() {
                return Err(MarketError::Validation(format!("{field} is required")));
            }
        }
        validate_price(self.price)?;
        if self.images.iter().any(|img| img.url.trim().is_empty()) {
            return Err(MarketError::Validation("image url must not be empty".into()));
        }
        Ok(())
    }

    pub fn into_product(self) -> Result<Product> {
        self.validate()?;
        let now = Utc::now();
        Ok(Product {
            id: Uuid::new_v4(),
            name: self.name.trim().to_string(),
            description: self.description,
            category: self.category.trim().to_string(),
            price: self.price,
            brand: non_blank(self.brand),
            seller: non_blank(self.seller),
            images: self.images,
            ratings: RatingAggregate::default(),
            reviews: Vec::new(),
            trust_score: DEFAULT_TRUST_SCORE,
            is_flagged: self.is_flagged,
            approved_by_moderator: false,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Price must be a finite, non-negative amount.
pub fn validate_price(price: f64) -> Result<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(MarketError::Validation(format!(
            "price must be a non-negative amount, got {price}"
        )));
    }
    Ok(())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// Review
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub product_id: Uuid,
    pub user_id: Uuid,
    pub rating: Rating,
    pub comment: String,
    pub trust_score: u8,
    pub is_flagged: bool,
    pub approved_by_moderator: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Review {
    pub fn new(product_id: Uuid, user_id: Uuid, rating: Rating, comment: &str) -> Result<Self> {
        let comment = comment.trim();
        if comment.is_empty() {
            return Err(MarketError::Validation("comment must not be empty".into()));
        }
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            product_id,
            user_id,
            rating,
            comment: comment.to_string(),
            trust_score: DEFAULT_TRUST_SCORE,
            is_flagged: false,
            approved_by_moderator: false,
            created_at: now,
            updated_at: now,
        })
    }
}
