use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::{error::Error, AppState};

#[axum::debug_handler]
pub async fn metrics(State(state): State<AppState>) -> Result<Response, Error> {
    let Some(metrics) = &state.metrics else {
        return Ok(StatusCode::NOT_FOUND.into_response());
    };
    let body = metrics
        .render()
        .map_err(|err| Error::Internal(format!("failed to encode metrics: {}", err)))?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, metrics.content_type())],
        body,
    )
        .into_response())
}
