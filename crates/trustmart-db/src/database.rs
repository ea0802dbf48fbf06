//! In-memory database engine and table management.
//!
//! Tables live behind a single `RwLock`; every store call is one critical
//! section, so a single call is atomic with respect to other calls.

use ordering::Sortable;
use serde::Serialize;
use std::collections::HashMap;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use trustmart_common::{Product, Review};
use uuid::Uuid;

#[derive(Debug, Default)]
pub(crate) struct Tables {
    pub(crate) products: HashMap<Uuid, Product>,
    pub(crate) reviews: HashMap<Uuid, Review>,
    /// Unique index: (user, product) → review.
    pub(crate) review_by_author: HashMap<(Uuid, Uuid), Uuid>,
}

/// Main database handle.
#[derive(Debug, Default)]
pub struct Database {
    tables: RwLock<Tables>,
}

impl Database {
    /// Create an empty in-memory database.
    pub fn open_in_memory() -> Self {
        Self::default()
    }

    pub(crate) async fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().await
    }

    pub(crate) async fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().await
    }

    /// Get table statistics.
    pub async fn stats(&self) -> DatabaseStats {
        let tables = self.read().await;
        DatabaseStats {
            products: tables.products.len() as u64,
            reviews: tables.reviews.len() as u64,
            flagged_products: tables.products.values().filter(|p| p.is_flagged).count() as u64,
            flagged_reviews: tables.reviews.values().filter(|r| r.is_flagged).count() as u64,
        }
    }
}

/// Database statistics.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseStats {
    pub products: u64,
    pub reviews: u64,
    pub flagged_products: u64,
    pub flagged_reviews: u64,
}

/// Stable listing order: creation time, then identity.
pub(crate) fn sort_by_creation<T: Sortable>(rows: &mut [T]) {
    rows.sort_by(|a, b| a.created().cmp(&b.created()).then(a.key().cmp(&b.key())));
}

pub(crate) mod ordering {
    use chrono::{DateTime, Utc};
    use uuid::Uuid;

    pub trait Sortable {
        fn created(&self) -> DateTime<Utc>;
        fn key(&self) -> Uuid;
    }

    impl Sortable for trustmart_common::Product {
        fn created(&self) -> DateTime<Utc> { self.created_at }
        fn key(&self) -> Uuid { self.id }
    }

    impl Sortable for trustmart_common::Review {
        fn created(&self) -> DateTime<Utc> { self.created_at }
        fn key(&self) -> Uuid { self.id }
    }
}
