//! Axum router: maps every URL path to its handler.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{
    health::health,
    moderator::{approve_product, approve_review, dashboard, dismiss_product, dismiss_review, flag, unflag},
    products::{analyze_product, create_product, get_product, list_products, products_by_category, submit_review},
    reviews::{analyze_review, get_review},
};
use crate::state::{AppState, SharedState};

/// Build and return the full Axum router.
pub fn build_router(state: AppState) -> Router {
    let shared: SharedState = Arc::new(state);

    Router::new()
        .route("/health", get(health))

        // Marketplace
        .route("/api/products",                     get(list_products).post(create_product))
        .route("/api/products/category/{category}", get(products_by_category))
        .route("/api/products/{id}",                get(get_product))
        .route("/api/products/{id}/reviews",        post(submit_review))
        .route("/api/products/{id}/analysis",       post(analyze_product))
        .route("/api/reviews/{id}",                 get(get_review))
        .route("/api/reviews/{id}/analysis",        post(analyze_review))

        // Moderation
        .route("/api/moderator/dashboard",           get(dashboard))
        .route("/api/moderator/approve/product/{id}", post(approve_product))
        .route("/api/moderator/approve/review/{id}",  post(approve_review))
        .route("/api/moderator/dismiss/product/{id}", post(dismiss_product))
        .route("/api/moderator/dismiss/review/{id}",  post(dismiss_review))
        .route("/api/moderator/flag/{kind}/{id}",     post(flag))
        .route("/api/moderator/unflag/{kind}/{id}",   post(unflag))

        // Middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
