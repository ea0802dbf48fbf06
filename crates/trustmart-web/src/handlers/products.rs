//! Marketplace product routes.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use tracing::info;
use trustmart_common::{ApiError, MarketError, NewProduct, Product, Review};
use trustmart_db::{ProductFilter, ProductPatch};
use trustmart_moderation::ReviewSubmission;
use trustmart_scoring::TrustReport;

use super::{json_body, parse_id, user_id, ApiResponse, ApiResult, PersistQuery};
use crate::state::SharedState;

/// GET /api/products
pub async fn list_products(State(state): State<SharedState>) -> ApiResult<Vec<Product>> {
    let products = state.store().find_products(&ProductFilter::all()).await.map_err(MarketError::from)?;
    let message = format!("{} products", products.len());
    Ok(ApiResponse::ok(products, message))
}

/// GET /api/products/category/{category}
pub async fn products_by_category(
    State(state): State<SharedState>,
    Path(category): Path<String>,
) -> ApiResult<Vec<Product>> {
    let products = state
        .store()
        .find_products(&ProductFilter::in_category(category.trim()))
        .await
        .map_err(MarketError::from)?;
    let message = format!("{} products in {}", products.len(), category.trim());
    Ok(ApiResponse::ok(products, message))
}

/// POST /api/products
pub async fn create_product(
    State(state): State<SharedState>,
    body: Result<Json<NewProduct>, JsonRejection>,
) -> ApiResult<Product> {
    let product = json_body(body)?.into_product()?;
    let product = state.store().insert_product(product).await.map_err(MarketError::from)?;
    info!(product_id = %product.id, "product created");
    Ok(ApiResponse::created(product, "Product created"))
}

pub(crate) async fn load_product(state: &SharedState, raw_id: &str) -> Result<Product, ApiError> {
    let id = parse_id(raw_id)?;
    state
        .store()
        .find_product(id)
        .await
        .map_err(MarketError::from)?
        .ok_or_else(|| MarketError::product_not_found(id).into())
}

/// GET /api/products/{id}
pub async fn get_product(State(state): State<SharedState>, Path(id): Path<String>) -> ApiResult<Product> {
    let product = load_product(&state, &id).await?;
    Ok(ApiResponse::ok(product, "Product found"))
}

/// POST /api/products/{id}/reviews
pub async fn submit_review(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Result<Json<ReviewSubmission>, JsonRejection>,
) -> ApiResult<Review> {
    let product_id = parse_id(&id)?;
    let author = user_id(&headers)?;
    let submission = json_body(body)?;
    let review = state.reviews.submit(product_id, author, submission).await?;
    Ok(ApiResponse::created(review, "Review submitted"))
}

/// POST /api/products/{id}/analysis
///
/// A degraded report is still a successful response; it is never persisted.
pub async fn analyze_product(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Query(query): Query<PersistQuery>,
) -> ApiResult<TrustReport> {
    let product = load_product(&state, &id).await?;
    let report = state.product_analyzer.analyze(&product).await;

    let message = if report.is_degraded() {
        "Analysis failed; trust score not stored"
    } else if query.persist {
        state
            .store()
            .update_product(product.id, ProductPatch::trust_score(report.trust_score))
            .await
            .map_err(MarketError::from)?
            .ok_or_else(|| MarketError::product_not_found(product.id))?;
        "Analysis complete; trust score stored"
    } else {
        "Analysis complete"
    };
    Ok(ApiResponse::ok(report, message))
}
