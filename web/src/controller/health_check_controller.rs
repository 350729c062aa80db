use axum::extract::State;
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct Health {
    pub status: &'static str,
    /// `server` or `browser`.
    pub exchange_mode: String,
}

/// GET liveness of the router, with the configured exchange mode.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Router is up and responding to requests", body = Health),
    )
)]
pub async fn health_check(State(app_state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "healthy",
        exchange_mode: app_state.config.exchange_mode.to_string(),
    })
}
