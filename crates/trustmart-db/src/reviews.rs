//! Review table with the unique (user, product) index.

use async_trait::async_trait;
use chrono::Utc;
use trustmart_common::Review;
use uuid::Uuid;

use crate::database::{sort_by_creation, Database};
use crate::error::{DbError, Result};

/// Predicate for [`ReviewStore::find_reviews`]. `None` fields match anything.
#[derive(Debug, Clone, Default)]
pub struct ReviewFilter {
    pub product_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub is_flagged: Option<bool>,
}

impl ReviewFilter {
    pub fn flagged() -> Self {
        Self { is_flagged: Some(true), ..Self::default() }
    }

    pub fn for_product(product_id: Uuid) -> Self {
        Self { product_id: Some(product_id), ..Self::default() }
    }

    pub fn by_author(product_id: Uuid, user_id: Uuid) -> Self {
        Self { product_id: Some(product_id), user_id: Some(user_id), ..Self::default() }
    }

    pub fn matches(&self, review: &Review) -> bool {
        self.product_id.map_or(true, |p| review.product_id == p)
            && self.user_id.map_or(true, |u| review.user_id == u)
            && self.is_flagged.map_or(true, |f| review.is_flagged == f)
    }
}

/// Partial update of a review. Only `Some` fields are written.
#[derive(Debug, Clone, Default)]
pub struct ReviewPatch {
    pub trust_score: Option<u8>,
    pub is_flagged: Option<bool>,
    pub approved_by_moderator: Option<bool>,
}

impl ReviewPatch {
    pub fn trust_score(score: u8) -> Self {
        Self { trust_score: Some(score.min(100)), ..Self::default() }
    }

    pub fn flagged(is_flagged: bool) -> Self {
        Self { is_flagged: Some(is_flagged), ..Self::default() }
    }

    pub fn approved() -> Self {
        Self { approved_by_moderator: Some(true), ..Self::default() }
    }

    fn apply(self, review: &mut Review) {
        if let Some(score) = self.trust_score {
            review.trust_score = score;
        }
        if let Some(flag) = self.is_flagged {
            review.is_flagged = flag;
        }
        if let Some(approved) = self.approved_by_moderator {
            review.approved_by_moderator = approved;
        }
        review.updated_at = Utc::now();
    }
}

#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Insert a review. Fails with `Duplicate` when the id exists or the
    /// author already reviewed the product.
    async fn insert_review(&self, review: Review) -> Result<Review>;

    async fn find_review(&self, id: Uuid) -> Result<Option<Review>>;

    async fn find_reviews(&self, filter: &ReviewFilter) -> Result<Vec<Review>>;

    async fn update_review(&self, id: Uuid, patch: ReviewPatch) -> Result<Option<Review>>;

    async fn delete_review(&self, id: Uuid) -> Result<Option<Review>>;

    /// Delete every review owned by a product; returns what was removed.
    async fn delete_reviews_for_product(&self, product_id: Uuid) -> Result<Vec<Review>>;
}

#[async_trait]
impl ReviewStore for Database {
    async fn insert_review(&self, review: Review) -> Result<Review> {
        let mut tables = self.write().await;
        if tables.reviews.contains_key(&review.id) {
            return Err(DbError::Duplicate(format!("review {}", review.id)));
        }
        let key = (review.user_id, review.product_id);
        if let Some(existing) = tables.review_by_author.get(&key) {
            return Err(DbError::Duplicate(format!(
                "user {} already reviewed product {} (review {})",
                review.user_id, review.product_id, existing
            )));
        }
        tables.review_by_author.insert(key, review.id);
        tables.reviews.insert(review.id, review.clone());
        Ok(review)
    }

    async fn find_review(&self, id: Uuid) -> Result<Option<Review>> {
        Ok(self.read().await.reviews.get(&id).cloned())
    }

    async fn find_reviews(&self, filter: &ReviewFilter) -> Result<Vec<Review>> {
        let tables = self.read().await;
        let mut rows: Vec<Review> = match (filter.user_id, filter.product_id) {
            (Some(user), Some(product)) => tables
                .review_by_author
                .get(&(user, product))
                .and_then(|id| tables.reviews.get(id))
                .filter(|r| filter.matches(r))
                .cloned()
                .into_iter()
                .collect(),
            _ => tables
                .reviews
                .values()
                .filter(|r| filter.matches(r))
                .cloned()
                .collect(),
        };
        sort_by_creation(&mut rows);
        Ok(rows)
    }

    async fn update_review(&self, id: Uuid, patch: ReviewPatch) -> Result<Option<Review>> {
        let mut tables = self.write().await;
        let Some(review) = tables.reviews.get_mut(&id) else {
            return Ok(None);
        };
        patch.apply(review);
        Ok(Some(review.clone()))
    }

    async fn delete_review(&self, id: Uuid) -> Result<Option<Review>> {
        let mut tables = self.write().await;
        let removed = tables.reviews.remove(&id);
        if let Some(review) = &removed {
            tables.review_by_author.remove(&(review.user_id, review.product_id));
        }
        Ok(removed)
    }

    async fn delete_reviews_for_product(&self, product_id: Uuid) -> Result<Vec<Review>> {
        let mut tables = self.write().await;
        let ids: Vec<Uuid> = tables
            .reviews
            .values()
            .filter(|r| r.product_id == product_id)
            .map(|r| r.id)
            .collect();
        let mut removed = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(review) = tables.reviews.remove(&id) {
                tables.review_by_author.remove(&(review.user_id, review.product_id));
                removed.push(review);
            }
        }
        sort_by_creation(&mut removed);
        Ok(removed)
    }
}
