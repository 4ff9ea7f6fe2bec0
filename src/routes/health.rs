use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::{error::Error, AppState};

pub const SERVICE_NAME: &str = env!("CARGO_PKG_NAME");
pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Process is alive"))
)]
#[axum::debug_handler]
pub async fn health() -> impl IntoResponse {
    let body = json!({
        "data": {
            "status": "ok",
            "service": SERVICE_NAME,
            "version": SERVICE_VERSION,
        }
    });
    (StatusCode::OK, Json(body))
}

#[utoipa::path(
    get,
    path = "/ready",
    responses(
        (status = 200, description = "Dependencies reachable"),
        (status = 503, description = "Database unreachable", body = crate::dto::envelope::ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn ready(State(state): State<AppState>) -> Result<impl IntoResponse, Error> {
    if let Err(err) = state.db.ping().await {
        tracing::warn!(error = %err, "readiness check failed");
        return Err(Error::ServiceUnavailable {
            message: "Service not ready".to_string(),
            details: json!({ "database": "fail" }),
        });
    }

    let body = json!({
        "data": {
            "status": "ready",
            "service": SERVICE_NAME,
            "version": SERVICE_VERSION,
            "checks": { "database": "ok" },
        }
    });
    Ok((StatusCode::OK, Json(body)))
}
