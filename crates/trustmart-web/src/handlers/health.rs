use axum::extract::State;
use serde::Serialize;
use trustmart_db::DatabaseStats;

use super::{ApiResponse, ApiResult};
use crate::state::SharedState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    pub status: &'static str,
    pub search_configured: bool,
    pub inference_configured: bool,
    pub store: DatabaseStats,
}

/// GET /health
pub async fn health(State(state): State<SharedState>) -> ApiResult<Health> {
    let health = Health {
        status: "ok",
        search_configured: state.product_analyzer.has_search(),
        inference_configured: state.review_analyzer.is_enabled(),
        store: state.db.stats().await,
    };
    Ok(ApiResponse::ok(health, "Service is healthy"))
}
