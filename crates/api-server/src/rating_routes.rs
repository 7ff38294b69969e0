//! Rating API Routes

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use rating_core::Thresholds;
use rating_orchestrator::RatingReport;
use serde::Deserialize;

use crate::{ApiResponse, AppError, AppState};

#[derive(Debug, Deserialize)]
pub struct RatingQuery {
    #[serde(default)]
    pub buy: Option<f64>,
    #[serde(default)]
    pub hold: Option<f64>,
}

pub fn rating_routes() -> Router<AppState> {
    Router::new().route("/api/rating/:code", get(get_rating))
}

async fn get_rating(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Query(query): Query<RatingQuery>,
) -> Result<Json<ApiResponse<RatingReport>>, AppError> {
    let thresholds = Thresholds::new(
        query.buy.unwrap_or(state.default_thresholds.buy),
        query.hold.unwrap_or(state.default_thresholds.hold),
    )?;

    let report = state.orchestrator.rate(&code, &thresholds).await?;
    Ok(Json(ApiResponse::success(report)))
}
