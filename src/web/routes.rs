//! HTTP route handlers.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::events::bus::BotEvent;
use crate::pricing::CalculationResult;

use super::server::AppState;

/// Body of `POST /api/calculate`.
#[derive(Debug, Deserialize)]
pub struct CalculateRequest {
    pub marketplace: String,
    pub orders_count: i64,
    #[serde(default)]
    pub services: Vec<String>,
}

/// Build all API routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/tariffs", get(tariffs))
        .route("/api/calculate", post(calculate))
        .route("/health", get(health))
}

/// GET /api/tariffs — marketplace and service tables.
async fn tariffs(State(state): State<AppState>) -> Json<Value> {
    Json(json!(state.calculator.tariffs()))
}

/// POST /api/calculate — itemized monthly estimate.
///
/// Order counts must be positive here; the calculator itself accepts any value.
async fn calculate(
    State(state): State<AppState>,
    Json(req): Json<CalculateRequest>,
) -> Result<Json<CalculationResult>, (StatusCode, Json<Value>)> {
    if req.orders_count <= 0 {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": "orders_count must be a positive integer" })),
        ));
    }

    let result = state
        .calculator
        .calculate(&req.marketplace, req.orders_count, &req.services);
    info!(
        marketplace = %result.marketplace,
        orders = result.orders_count,
        total = result.total_cost,
        "web calculation"
    );
    state.event_bus.publish(BotEvent::CalculationCompleted {
        source: "web".into(),
        marketplace: result.marketplace.clone(),
        orders_count: result.orders_count,
        total_cost: result.total_cost,
    });
    Ok(Json(result))
}

/// GET /health — simple health check.
async fn health() -> &'static str {
    "ok"
}
