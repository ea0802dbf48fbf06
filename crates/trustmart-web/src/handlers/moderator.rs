//! Moderator dashboard and actions.

use axum::extract::{Path, State};
use trustmart_common::{Product, Review};
use trustmart_moderation::{Dashboard, EntityKind, Moderated, ProductDismissal, ReviewDismissal};

use super::{parse_id, ApiResponse, ApiResult};
use crate::state::SharedState;

/// GET /api/moderator/dashboard
pub async fn dashboard(State(state): State<SharedState>) -> ApiResult<Dashboard> {
    let dashboard = state.moderation.dashboard().await?;
    let message = format!(
        "{} flagged products and {} flagged reviews",
        dashboard.flagged_products.len(),
        dashboard.flagged_reviews.len()
    );
    Ok(ApiResponse::ok(dashboard, message))
}

/// POST /api/moderator/approve/product/{id}
pub async fn approve_product(State(state): State<SharedState>, Path(id): Path<String>) -> ApiResult<Product> {
    let product = state.moderation.approve_product(parse_id(&id)?).await?;
    Ok(ApiResponse::ok(product, "Product approved"))
}

/// POST /api/moderator/approve/review/{id}
pub async fn approve_review(State(state): State<SharedState>, Path(id): Path<String>) -> ApiResult<Review> {
    let review = state.moderation.approve_review(parse_id(&id)?).await?;
    Ok(ApiResponse::ok(review, "Review approved"))
}

/// POST /api/moderator/dismiss/product/{id}
pub async fn dismiss_product(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<ProductDismissal> {
    let dismissal = state.moderation.dismiss_product(parse_id(&id)?).await?;
    let message = format!("Product dismissed with {} reviews", dismissal.removed_reviews.len());
    Ok(ApiResponse::ok(dismissal, message))
}

/// POST /api/moderator/dismiss/review/{id}
pub async fn dismiss_review(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<ReviewDismissal> {
    let dismissal = state.moderation.dismiss_review(parse_id(&id)?).await?;
    let message = match dismissal.orphaned_product {
        Some(product_id) => format!("Review dismissed; owning product {product_id} was not found"),
        None => "Review dismissed".to_string(),
    };
    Ok(ApiResponse::ok(dismissal, message))
}

/// POST /api/moderator/flag/{kind}/{id}
pub async fn flag(State(state): State<SharedState>, Path((kind, id)): Path<(String, String)>) -> ApiResult<Moderated> {
    let kind: EntityKind = kind.parse()?;
    let entity = state.moderation.flag(kind, parse_id(&id)?).await?;
    Ok(ApiResponse::ok(entity, format!("{kind} flagged")))
}

/// POST /api/moderator/unflag/{kind}/{id}
pub async fn unflag(State(state): State<SharedState>, Path((kind, id)): Path<(String, String)>) -> ApiResult<Moderated> {
    let kind: EntityKind = kind.parse()?;
    let entity = state.moderation.clear_flag(kind, parse_id(&id)?).await?;
    Ok(ApiResponse::ok(entity, format!("{kind} flag cleared")))
}
