//! RatingLedger: a product's running {average, count} under review
//! additions and removals.
//!
//! Every read-modify-write of a product's rating fields happens while the
//! caller holds that product's [`ProductGuard`]; different products never
//! contend. A product's lock entry lives only while some task holds or
//! awaits it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{debug, warn};
use trustmart_common::{MarketError, Product, Rating, RatingAggregate, Result, Review, NEUTRAL_AVERAGE};
use trustmart_db::{EntityStore, ProductPatch, ReviewFilter};
use uuid::Uuid;

/// `(average × count + rating) / (count + 1)`.
pub fn apply_add(agg: RatingAggregate, rating: Rating) -> RatingAggregate {
    let count = agg.count + 1;
    let total = agg.average * f64::from(agg.count) + f64::from(rating.value());
    RatingAggregate { average: total / f64::from(count), count }
}

/// Inverse of [`apply_add`]; the average resets to the neutral default when
/// the last review goes. Removing from an empty aggregate is a consistency
/// error, never a negative count.
pub fn apply_remove(agg: RatingAggregate, rating: Rating) -> Result<RatingAggregate> {
    let Some(count) = agg.count.checked_sub(1) else {
        return Err(MarketError::Consistency(format!(
            "cannot remove a rating of {} from an aggregate with no reviews",
            rating.value()
        )));
    };
    if count == 0 {
        return Ok(RatingAggregate { average: NEUTRAL_AVERAGE, count: 0 });
    }
    let total = agg.average * f64::from(agg.count) - f64::from(rating.value());
    // Float drift must not escape the rating range.
    let average = (total / f64::from(count)).clamp(f64::from(Rating::MIN), f64::from(Rating::MAX));
    Ok(RatingAggregate { average, count })
}

/// Aggregate computed from scratch.
pub fn aggregate_of(ratings: impl IntoIterator<Item = Rating>) -> RatingAggregate {
    ratings.into_iter().fold(RatingAggregate::default(), apply_add)
}

type LockMap = Arc<Mutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>>;

fn lock_map(locks: &LockMap) -> MutexGuard<'_, HashMap<Uuid, Arc<AsyncMutex<()>>>> {
    locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Exclusive right to mutate one product's rating fields.
///
/// Dropping the last guard of a product with no waiters removes its entry
/// from the lock map.
pub struct ProductGuard {
    product_id: Uuid,
    locks: LockMap,
    lock: Option<OwnedMutexGuard<()>>,
}

impl ProductGuard {
    pub fn product_id(&self) -> Uuid {
        self.product_id
    }
}

impl Drop for ProductGuard {
    fn drop(&mut self) {
        let mut locks = lock_map(&self.locks);
        // Unlock while the map is held so no new waiter can clone the entry
        // between the unlock and the count check.
        drop(self.lock.take());
        if locks.get(&self.product_id).is_some_and(|entry| Arc::strong_count(entry) == 1) {
            locks.remove(&self.product_id);
        }
    }
}

pub struct RatingLedger {
    store: Arc<dyn EntityStore>,
    locks: LockMap,
}

impl RatingLedger {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store, locks: Arc::new(Mutex::new(HashMap::new())) }
    }

    pub fn store(&self) -> &Arc<dyn EntityStore> {
        &self.store
    }

    pub async fn lock(&self, product_id: Uuid) -> ProductGuard {
        let lock = lock_map(&self.locks).entry(product_id).or_default().clone();
        ProductGuard {
            product_id,
            locks: self.locks.clone(),
            lock: Some(lock.lock_owned().await),
        }
    }

    /// Products whose lock is currently held or awaited.
    pub fn tracked_locks(&self) -> usize {
        lock_map(&self.locks).len()
    }

    fn check_guard(guard: &ProductGuard, review: &Review) -> Result<()> {
        if guard.product_id != review.product_id {
            return Err(MarketError::Internal(format!(
                "ledger guard for product {} used for review {} of product {}",
                guard.product_id, review.id, review.product_id
            )));
        }
        Ok(())
    }

    /// Count `review` into its product and list it. The product must exist.
    pub async fn add_review(&self, guard: &ProductGuard, review: &Review) -> Result<Product> {
        Self::check_guard(guard, review)?;
        let product = self
            .store
            .find_product(review.product_id)
            .await?
            .ok_or_else(|| MarketError::product_not_found(review.product_id))?;

        if product.reviews.contains(&review.id) {
            debug!(review_id = %review.id, "review already counted");
            return Ok(product);
        }
        let ratings = apply_add(product.ratings, review.rating);
        let mut reviews = product.reviews;
        reviews.push(review.id);

        self.store
            .update_product(review.product_id, ProductPatch::ratings(ratings, reviews))
            .await?
            .ok_or_else(|| MarketError::product_not_found(review.product_id))
    }

    /// Uncount `review` and unlist it. `Ok(None)` when the owning product no
    /// longer exists.
    pub async fn remove_review(&self, guard: &ProductGuard, review: &Review) -> Result<Option<Product>> {
        Self::check_guard(guard, review)?;
        let Some(product) = self.store.find_product(review.product_id).await? else {
            return Ok(None);
        };

        if !product.reviews.contains(&review.id) {
            warn!(
                product_id = %product.id,
                review_id = %review.id,
                "review missing from product's review list, reconciling from the store"
            );
            return self.reconcile_locked(guard).await.map(Some);
        }

        let ratings = apply_remove(product.ratings, review.rating)?;
        let reviews: Vec<Uuid> = product.reviews.into_iter().filter(|id| *id != review.id).collect();
        Ok(self
            .store
            .update_product(review.product_id, ProductPatch::ratings(ratings, reviews))
            .await?)
    }

    /// Recompute {average, count} and the review list from retained reviews.
    pub async fn reconcile(&self, product_id: Uuid) -> Result<Product> {
        let guard = self.lock(product_id).await;
        self.reconcile_locked(&guard).await
    }

    async fn reconcile_locked(&self, guard: &ProductGuard) -> Result<Product> {
        let product_id = guard.product_id;
        let retained = self.store.find_reviews(&ReviewFilter::for_product(product_id)).await?;
        let ratings = aggregate_of(retained.iter().map(|r| r.rating));
        let reviews = retained.iter().map(|r| r.id).collect();
        debug!(product_id = %product_id, count = ratings.count, "rating aggregate reconciled");
        self.store
            .update_product(product_id, ProductPatch::ratings(ratings, reviews))
            .await?
            .ok_or_else(|| MarketError::product_not_found(product_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use trustmart_common::NewProduct;
    use trustmart_db::{Database, ProductStore};

    fn r(v: u8) -> Rating {
        Rating::new(v).unwrap()
    }

    #[test]
    fn test_add_add_remove_example() {
        let agg = apply_add(RatingAggregate::default(), r(4));
        assert_eq!(agg, RatingAggregate { average: 4.0, count: 1 });
        let agg = apply_add(agg, r(2));
        assert_eq!(agg, RatingAggregate { average: 3.0, count: 2 });
        let agg = apply_remove(agg, r(4)).unwrap();
        assert_eq!(agg, RatingAggregate { average: 2.0, count: 1 });
    }

    #[test]
    fn test_last_removal_resets_to_neutral() {
        let agg = apply_remove(RatingAggregate { average: 1.0, count: 1 }, r(1)).unwrap();
        assert_eq!(agg, RatingAggregate { average: NEUTRAL_AVERAGE, count: 0 });
    }

    #[test]
    fn test_remove_from_empty_is_consistency_error() {
        let err = apply_remove(RatingAggregate::default(), r(3)).unwrap_err();
        assert!(matches!(err, MarketError::Consistency(_)));
    }

    proptest! {
        #[test]
        fn prop_add_then_remove_restores_aggregate(ratings in proptest::collection::vec(1u8..=5, 1..40), extra in 1u8..=5) {
            let base = aggregate_of(ratings.iter().map(|v| r(*v)));
            let back = apply_remove(apply_add(base, r(extra)), r(extra)).unwrap();
            prop_assert_eq!(back.count, base.count);
            prop_assert!((back.average - base.average).abs() < 1e-9);
        }
    }

    async fn seeded() -> (RatingLedger, Product) {
        let db = Arc::new(Database::open_in_memory());
        let product = NewProduct {
            name: "Desk Lamp".into(),
            description: "LED desk lamp".into(),
            category: "Home".into(),
            price: 1_299.0,
            brand: None,
            seller: None,
            images: vec![],
            is_flagged: false,
        }
        .into_product()
        .unwrap();
        let product = db.insert_product(product).await.unwrap();
        (RatingLedger::new(db), product)
    }

    #[tokio::test]
    async fn test_add_and_remove_through_store() {
        let (ledger, product) = seeded().await;
        let review = Review::new(product.id, Uuid::new_v4(), r(4), "Bright enough").unwrap();
        ledger.store().insert_review(review.clone()).await.unwrap();

        let guard = ledger.lock(product.id).await;
        let updated = ledger.add_review(&guard, &review).await.unwrap();
        assert_eq!(updated.ratings, RatingAggregate { average: 4.0, count: 1 });
        assert_eq!(updated.reviews, vec![review.id]);

        let updated = ledger.remove_review(&guard, &review).await.unwrap().unwrap();
        assert_eq!(updated.ratings, RatingAggregate::default());
        assert!(updated.reviews.is_empty());
    }

    #[tokio::test]
    async fn test_guard_must_match_review_product() {
        let (ledger, product) = seeded().await;
        let review = Review::new(Uuid::new_v4(), Uuid::new_v4(), r(4), "Elsewhere").unwrap();
        let guard = ledger.lock(product.id).await;
        assert!(matches!(ledger.add_review(&guard, &review).await, Err(MarketError::Internal(_))));
    }

    #[tokio::test]
    async fn test_lock_entry_pruned_after_last_guard() {
        let (ledger, product) = seeded().await;
        let ledger = Arc::new(ledger);

        let guard = ledger.lock(product.id).await;
        assert_eq!(ledger.tracked_locks(), 1);

        let waiter = {
            let ledger = ledger.clone();
            tokio::spawn(async move {
                let _guard = ledger.lock(product.id).await;
            })
        };
        tokio::task::yield_now().await;
        drop(guard);
        waiter.await.unwrap();

        assert_eq!(ledger.tracked_locks(), 0);
        drop(ledger.lock(Uuid::new_v4()).await);
        assert_eq!(ledger.tracked_locks(), 0);
    }

    #[tokio::test]
    async fn test_reconcile_rebuilds_from_reviews() {
        let (ledger, product) = seeded().await;
        for (v, text) in [(5, "Great"), (2, "Flickers")] {
            let review = Review::new(product.id, Uuid::new_v4(), r(v), text).unwrap();
            ledger.store().insert_review(review).await.unwrap();
        }
        let product = ledger.reconcile(product.id).await.unwrap();
        assert_eq!(product.ratings, RatingAggregate { average: 3.5, count: 2 });
        assert_eq!(product.reviews.len(), 2);
    }
}
