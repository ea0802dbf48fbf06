//! Trustmart entity store.
//!
//! The storage engine is an external collaborator; this crate defines the
//! narrow interface the rest of the workspace consumes and ships an
//! in-memory engine used by the server and the tests.
//!
//! # Features
//!
//! - CRUD by identity for products and reviews
//! - Predicate-filtered finds (`is_flagged`, category, `(product, user)`)
//! - Partial-field updates through patches, no full-entity rewrite
//! - A unique `(user, product)` index on reviews
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use trustmart_db::{Database, EntityStore, ProductFilter};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store: Arc<dyn EntityStore> = Arc::new(Database::open_in_memory());
//!     let flagged = store.find_products(&ProductFilter::flagged()).await?;
//!     println!("{} flagged products", flagged.len());
//!     Ok(())
//! }
//! ```

pub mod database;
pub mod error;
pub mod products;
pub mod reviews;

pub use database::{Database, DatabaseStats};
pub use error::{DbError, Result};
pub use products::{ProductFilter, ProductPatch, ProductStore};
pub use reviews::{ReviewFilter, ReviewPatch, ReviewStore};

/// Everything the marketplace needs from a store.
pub trait EntityStore: ProductStore + ReviewStore {}

impl<T: ProductStore + ReviewStore> EntityStore for T {}
