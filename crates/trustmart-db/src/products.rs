//! Product table.
//!
//! Provides CRUD operations and filtered finds for products.

use async_trait::async_trait;
use chrono::Utc;
use trustmart_common::{Product, RatingAggregate};
use uuid::Uuid;

use crate::database::{sort_by_creation, Database};
use crate::error::{DbError, Result};

/// Predicate for [`ProductStore::find_products`]. `None` fields match anything.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub is_flagged: Option<bool>,
    pub category: Option<String>,
}

impl ProductFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn flagged() -> Self {
        Self { is_flagged: Some(true), ..Self::default() }
    }

    pub fn in_category(category: impl Into<String>) -> Self {
        Self { category: Some(category.into()), ..Self::default() }
    }

    pub fn matches(&self, product: &Product) -> bool {
        self.is_flagged.map_or(true, |f| product.is_flagged == f)
            && self
                .category
                .as_deref()
                .map_or(true, |c| product.category.eq_ignore_ascii_case(c))
    }
}

/// Partial update of a product. Only `Some` fields are written.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub ratings: Option<RatingAggregate>,
    pub reviews: Option<Vec<Uuid>>,
    pub trust_score: Option<u8>,
    pub is_flagged: Option<bool>,
    pub approved_by_moderator: Option<bool>,
}

impl ProductPatch {
    /// Rating aggregate and review list written together.
    pub fn ratings(ratings: RatingAggregate, reviews: Vec<Uuid>) -> Self {
        Self { ratings: Some(ratings), reviews: Some(reviews), ..Self::default() }
    }

    pub fn trust_score(score: u8) -> Self {
        Self { trust_score: Some(score.min(100)), ..Self::default() }
    }

    pub fn flagged(is_flagged: bool) -> Self {
        Self { is_flagged: Some(is_flagged), ..Self::default() }
    }

    pub fn approved() -> Self {
        Self { approved_by_moderator: Some(true), ..Self::default() }
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_none()
            && self.reviews.is_none()
            && self.trust_score.is_none()
            && self.is_flagged.is_none()
            && self.approved_by_moderator.is_none()
    }

    fn apply(self, product: &mut Product) {
        if let Some(ratings) = self.ratings {
            product.ratings = ratings;
        }
        if let Some(reviews) = self.reviews {
            product.reviews = reviews;
        }
        if let Some(score) = self.trust_score {
            product.trust_score = score;
        }
        if let Some(flag) = self.is_flagged {
            product.is_flagged = flag;
        }
        if let Some(approved) = self.approved_by_moderator {
            product.approved_by_moderator = approved;
        }
        product.updated_at = Utc::now();
    }
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Insert a new product. Fails with `Duplicate` if the id exists.
    async fn insert_product(&self, product: Product) -> Result<Product>;

    async fn find_product(&self, id: Uuid) -> Result<Option<Product>>;

    async fn find_products(&self, filter: &ProductFilter) -> Result<Vec<Product>>;

    /// Apply a partial update; returns the updated product, `None` if absent.
    async fn update_product(&self, id: Uuid, patch: ProductPatch) -> Result<Option<Product>>;

    /// Delete by id; returns the removed product, `None` if absent.
    async fn delete_product(&self, id: Uuid) -> Result<Option<Product>>;
}

#[async_trait]
impl ProductStore for Database {
    async fn insert_product(&self, product: Product) -> Result<Product> {
        let mut tables = self.write().await;
        if tables.products.contains_key(&product.id) {
            return Err(DbError::Duplicate(format!("product {}", product.id)));
        }
        tables.products.insert(product.id, product.clone());
        tracing::debug!(product_id = %product.id, "product inserted");
        Ok(product)
    }

    async fn find_product(&self, id: Uuid) -> Result<Option<Product>> {
        Ok(self.read().await.products.get(&id).cloned())
    }

    async fn find_products(&self, filter: &ProductFilter) -> Result<Vec<Product>> {
        let tables = self.read().await;
        let mut rows: Vec<Product> = tables
            .products
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        sort_by_creation(&mut rows);
        Ok(rows)
    }

    async fn update_product(&self, id: Uuid, patch: ProductPatch) -> Result<Option<Product>> {
        let mut tables = self.write().await;
        let Some(product) = tables.products.get_mut(&id) else {
            return Ok(None);
        };
        patch.apply(product);
        Ok(Some(product.clone()))
    }

    async fn delete_product(&self, id: Uuid) -> Result<Option<Product>> {
        Ok(self.write().await.products.remove(&id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trustmart_common::NewProduct;

    fn product(category: &str, flagged: bool) -> Product {
        NewProduct {
            name: "Boat Rockerz 450".into(),
            description: "On-ear headphones".into(),
            category: category.into(),
            price: 1_499.0,
            brand: Some("boAt".into()),
            seller: None,
            images: vec![],
            is_flagged: flagged,
        }
        .into_product()
        .unwrap()
    }

    #[tokio::test]
    async fn test_filtered_find() {
        let db = Database::open_in_memory();
        db.insert_product(product("audio", true)).await.unwrap();
        db.insert_product(product("audio", false)).await.unwrap();
        db.insert_product(product("kitchen", true)).await.unwrap();

        assert_eq!(db.find_products(&ProductFilter::flagged()).await.unwrap().len(), 2);
        assert_eq!(db.find_products(&ProductFilter::in_category("Audio")).await.unwrap().len(), 2);
        assert_eq!(db.find_products(&ProductFilter::all()).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_partial_update_leaves_other_fields() {
        let db = Database::open_in_memory();
        let p = db.insert_product(product("audio", true)).await.unwrap();

        let updated = db
            .update_product(p.id, ProductPatch::approved())
            .await
            .unwrap()
            .expect("product exists");
        assert!(updated.approved_by_moderator);
        assert!(updated.is_flagged, "approval patch must not touch the flag");
        assert_eq!(updated.trust_score, p.trust_score);
    }

    #[tokio::test]
    async fn test_update_missing_returns_none() {
        let db = Database::open_in_memory();
        let res = db.update_product(Uuid::new_v4(), ProductPatch::flagged(true)).await.unwrap();
        assert!(res.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_insert_rejected() {
        let db = Database::open_in_memory();
        let p = db.insert_product(product("audio", false)).await.unwrap();
        assert!(matches!(db.insert_product(p).await, Err(DbError::Duplicate(_))));
    }
}
