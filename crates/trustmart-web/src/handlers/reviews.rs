//! Review routes.

use axum::extract::{Path, Query, State};
use trustmart_common::{MarketError, Review};
use trustmart_db::ReviewPatch;
use trustmart_llm::ReviewVerdict;

use super::{parse_id, ApiResponse, ApiResult, PersistQuery};
use crate::state::SharedState;

/// Category sent to the analyzer when the owning product is gone.
const UNKNOWN_CATEGORY: &str = "unknown";

async fn load_review(state: &SharedState, raw_id: &str) -> Result<Review, trustmart_common::ApiError> {
    let id = parse_id(raw_id)?;
    state
        .store()
        .find_review(id)
        .await
        .map_err(MarketError::from)?
        .ok_or_else(|| MarketError::review_not_found(id).into())
}

/// GET /api/reviews/{id}
pub async fn get_review(State(state): State<SharedState>, Path(id): Path<String>) -> ApiResult<Review> {
    let review = load_review(&state, &id).await?;
    Ok(ApiResponse::ok(review, "Review found"))
}

/// POST /api/reviews/{id}/analysis
pub async fn analyze_review(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Query(query): Query<PersistQuery>,
) -> ApiResult<ReviewVerdict> {
    let review = load_review(&state, &id).await?;
    let category = state
        .store()
        .find_product(review.product_id)
        .await
        .map_err(MarketError::from)?
        .map(|p| p.category)
        .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string());

    let verdict = state.review_analyzer.analyze(&review, &category).await;

    let message = match (verdict.trust_score(), query.persist) {
        (None, _) => "Analysis failed; trust score not stored",
        (Some(score), true) => {
            state
                .store()
                .update_review(review.id, ReviewPatch::trust_score(score))
                .await
                .map_err(MarketError::from)?
                .ok_or_else(|| MarketError::review_not_found(review.id))?;
            "Analysis complete; trust score stored"
        }
        (Some(_), false) => "Analysis complete",
    };
    Ok(ApiResponse::ok(verdict, message))
}
