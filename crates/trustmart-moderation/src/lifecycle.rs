//! Moderator workflow: dashboard, approve, dismiss, flag.
//!
//! Approval and flagging are independent: approving never clears
//! `is_flagged`, and flags are set or cleared only by explicit actions.
//! Dismissal deletes and cascades through the [`RatingLedger`].

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use trustmart_common::{MarketError, Product, Result, Review};
use trustmart_db::{ProductFilter, ProductPatch, ReviewFilter, ReviewPatch};
use uuid::Uuid;

use crate::ledger::RatingLedger;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Product,
    Review,
}

impl FromStr for EntityKind {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "product" | "products" => Ok(EntityKind::Product),
            "review" | "reviews" => Ok(EntityKind::Review),
            other => Err(MarketError::Validation(format!("unknown entity kind {other:?}"))),
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityKind::Product => "product",
            EntityKind::Review => "review",
        })
    }
}

/// Entity returned by kind-generic actions.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Moderated {
    Product(Product),
    Review(Review),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub flagged_products: Vec<Product>,
    pub flagged_reviews: Vec<Review>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDismissal {
    pub review: Review,
    /// Owning product after the rating update; `None` when it was missing.
    pub product: Option<Product>,
    /// Set when the review referenced a product that no longer exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orphaned_product: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDismissal {
    pub product: Product,
    pub removed_reviews: Vec<Uuid>,
}

pub struct ModerationService {
    ledger: Arc<RatingLedger>,
}

impl ModerationService {
    pub fn new(ledger: Arc<RatingLedger>) -> Self {
        Self { ledger }
    }

    pub async fn dashboard(&self) -> Result<Dashboard> {
        let store = self.ledger.store();
        Ok(Dashboard {
            flagged_products: store.find_products(&ProductFilter::flagged()).await?,
            flagged_reviews: store.find_reviews(&ReviewFilter::flagged()).await?,
        })
    }

    async fn patch_product(&self, id: Uuid, patch: ProductPatch) -> Result<Product> {
        self.ledger
            .store()
            .update_product(id, patch)
            .await?
            .ok_or_else(|| MarketError::product_not_found(id))
    }

    async fn patch_review(&self, id: Uuid, patch: ReviewPatch) -> Result<Review> {
        self.ledger
            .store()
            .update_review(id, patch)
            .await?
            .ok_or_else(|| MarketError::review_not_found(id))
    }

    /// Idempotent; `is_flagged` is left as it was.
    pub async fn approve_product(&self, id: Uuid) -> Result<Product> {
        let product = self.patch_product(id, ProductPatch::approved()).await?;
        info!(product_id = %id, flagged = product.is_flagged, "product approved");
        Ok(product)
    }

    /// Idempotent; `is_flagged` is left as it was.
    pub async fn approve_review(&self, id: Uuid) -> Result<Review> {
        let review = self.patch_review(id, ReviewPatch::approved()).await?;
        info!(review_id = %id, flagged = review.is_flagged, "review approved");
        Ok(review)
    }

    async fn set_flag(&self, kind: EntityKind, id: Uuid, flagged: bool) -> Result<Moderated> {
        let entity = match kind {
            EntityKind::Product => Moderated::Product(self.patch_product(id, ProductPatch::flagged(flagged)).await?),
            EntityKind::Review => Moderated::Review(self.patch_review(id, ReviewPatch::flagged(flagged)).await?),
        };
        info!(%kind, id = %id, flagged, "flag updated");
        Ok(entity)
    }

    pub async fn flag(&self, kind: EntityKind, id: Uuid) -> Result<Moderated> {
        self.set_flag(kind, id, true).await
    }

    pub async fn clear_flag(&self, kind: EntityKind, id: Uuid) -> Result<Moderated> {
        self.set_flag(kind, id, false).await
    }

    /// Delete the review, then uncount it from its product. A missing
    /// product does not undo the deletion; it is reported as orphaned. If the
    /// product cannot be updated after the deletion, the half-applied
    /// dismissal is a consistency error naming both ids.
    pub async fn dismiss_review(&self, id: Uuid) -> Result<ReviewDismissal> {
        let store = self.ledger.store();
        let review = store.find_review(id).await?.ok_or_else(|| MarketError::review_not_found(id))?;

        let guard = self.ledger.lock(review.product_id).await;
        let review = store.delete_review(id).await?.ok_or_else(|| MarketError::review_not_found(id))?;
        let product = match self.ledger.remove_review(&guard, &review).await {
            Ok(product) => product,
            Err(e) => {
                error!(
                    review_id = %review.id,
                    product_id = %review.product_id,
                    error = %e,
                    "review deleted but its product still counts it"
                );
                return Err(MarketError::Consistency(format!(
                    "review {} was deleted but product {} still lists and counts it: {e}",
                    review.id, review.product_id
                )));
            }
        };

        let orphaned_product = if product.is_none() {
            warn!(
                review_id = %review.id,
                product_id = %review.product_id,
                "dismissed review referenced a missing product"
            );
            Some(review.product_id)
        } else {
            None
        };
        info!(review_id = %review.id, product_id = %review.product_id, "review dismissed");
        Ok(ReviewDismissal { review, product, orphaned_product })
    }

    /// Delete every review of the product, then the product. If the product
    /// survives its reviews, the partial cascade is returned as a
    /// consistency error naming the removed reviews.
    pub async fn dismiss_product(&self, id: Uuid) -> Result<ProductDismissal> {
        let store = self.ledger.store();
        let _guard = self.ledger.lock(id).await;
        if store.find_product(id).await?.is_none() {
            return Err(MarketError::product_not_found(id));
        }

        let removed: Vec<Uuid> = store.delete_reviews_for_product(id).await?.into_iter().map(|r| r.id).collect();

        let product = match store.delete_product(id).await {
            Ok(Some(product)) => product,
            Ok(None) => {
                return Err(self.partial_cascade(id, &removed, "the product disappeared during deletion"));
            }
            Err(e) => return Err(self.partial_cascade(id, &removed, &e.to_string())),
        };

        info!(product_id = %id, reviews = removed.len(), "product dismissed");
        Ok(ProductDismissal { product, removed_reviews: removed })
    }

    fn partial_cascade(&self, id: Uuid, removed: &[Uuid], cause: &str) -> MarketError {
        let ids = removed.iter().map(Uuid::to_string).collect::<Vec<_>>().join(", ");
        error!(product_id = %id, removed = removed.len(), cause, "product dismissal left a partial cascade");
        MarketError::Consistency(format!(
            "removed {} review(s) of product {id} [{ids}] but deleting the product failed: {cause}",
            removed.len()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_kind_parsing() {
        assert_eq!("product".parse::<EntityKind>().unwrap(), EntityKind::Product);
        assert_eq!("Reviews".parse::<EntityKind>().unwrap(), EntityKind::Review);
        assert!(matches!("user".parse::<EntityKind>(), Err(MarketError::Validation(_))));
        assert_eq!(EntityKind::Review.to_string(), "review");
    }
}
