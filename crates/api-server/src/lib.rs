//! HTTP surface for the rating pipeline.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use rating_core::{RatingConfig, RatingError, Thresholds};
use rating_orchestrator::RatingOrchestrator;
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use yahoo_client::YahooClient;

pub mod rating_routes;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<RatingOrchestrator>,
    /// Used when a request omits `buy`/`hold`
    pub default_thresholds: Thresholds,
}

/// `{ success, data, error }` envelope shared by every endpoint.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl From<RatingError> for AppError {
    fn from(err: RatingError) -> Self {
        let status = match &err {
            RatingError::InvalidInput(_) | RatingError::InvalidConfig(_) => StatusCode::BAD_REQUEST,
            RatingError::NoPriceData(_) => StatusCode::NOT_FOUND,
            RatingError::ApiError(_) => StatusCode::BAD_GATEWAY,
            RatingError::MissingReference(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!("{}: {}", self.status, self.message);
        } else {
            tracing::debug!("{}: {}", self.status, self.message);
        }
        (self.status, Json(ApiResponse::error(self.message))).into_response()
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(rating_routes::rating_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "api_server=info,rating_orchestrator=info,yahoo_client=warn,tower_http=info".into());
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if std::env::var("LOG_FORMAT").map(|v| v == "json").unwrap_or(false) {
        builder.json().init();
    } else {
        builder.init();
    }
}

pub async fn run_server() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = RatingConfig::from_env()?;
    let provider = Arc::new(YahooClient::new(&config));
    let orchestrator = RatingOrchestrator::from_config(&config, provider)?;

    let state = AppState {
        orchestrator: Arc::new(orchestrator),
        default_thresholds: config.thresholds,
    };
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.api_bind_addr).await?;
    tracing::info!("API server listening on {}", config.api_bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
