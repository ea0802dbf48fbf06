//! Review submission.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{error, info, warn};
use trustmart_common::{MarketError, Rating, Result, Review};
use trustmart_db::ReviewFilter;
use uuid::Uuid;

use crate::ledger::RatingLedger;

/// Body of a review submission; the author comes from the request context.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewSubmission {
    pub rating: u8,
    pub comment: String,
}

pub struct ReviewService {
    ledger: Arc<RatingLedger>,
}

impl ReviewService {
    pub fn new(ledger: Arc<RatingLedger>) -> Self {
        Self { ledger }
    }

    /// Validate, reject a second review by the same author, store the review
    /// and count it, all under the product's lock.
    pub async fn submit(&self, product_id: Uuid, user_id: Uuid, submission: ReviewSubmission) -> Result<Review> {
        let rating = Rating::new(submission.rating)?;
        let review = Review::new(product_id, user_id, rating, &submission.comment)?;

        let store = self.ledger.store();
        let guard = self.ledger.lock(product_id).await;

        if store.find_product(product_id).await?.is_none() {
            return Err(MarketError::product_not_found(product_id));
        }
        if !store.find_reviews(&ReviewFilter::by_author(product_id, user_id)).await?.is_empty() {
            return Err(MarketError::Conflict(format!(
                "user {user_id} has already reviewed product {product_id}"
            )));
        }

        let review = store.insert_review(review).await?;
        if let Err(cause) = self.ledger.add_review(&guard, &review).await {
            warn!(review_id = %review.id, error = %cause, "rating update failed, withdrawing review");
            return match store.delete_review(review.id).await {
                Ok(_) => Err(cause),
                Err(withdraw) => {
                    error!(
                        review_id = %review.id,
                        product_id = %product_id,
                        error = %withdraw,
                        "review stored but neither counted nor withdrawn"
                    );
                    Err(MarketError::Consistency(format!(
                        "review {} of product {product_id} is stored but not counted: \
                         rating update failed ({cause}), withdrawing the review failed ({withdraw})",
                        review.id
                    )))
                }
            };
        }

        info!(review_id = %review.id, product_id = %product_id, rating = rating.value(), "review submitted");
        Ok(review)
    }
}
