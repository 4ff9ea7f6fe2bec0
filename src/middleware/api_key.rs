use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;

use crate::error::Error;

#[derive(Clone)]
pub struct ApiKey(Arc<str>);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(Arc::from(key.into()))
    }

    fn matches(&self, candidate: &str) -> bool {
        self.0.as_bytes().ct_eq(candidate.as_bytes()).into()
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

pub async fn require_api_key(State(key): State<ApiKey>, req: Request, next: Next) -> Response {
    let Some(auth_header) = req.headers().get(AUTHORIZATION) else {
        return unauthorized("Missing authorization header");
    };
    let Some(token) = auth_header
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
    else {
        return unauthorized("Invalid authorization header format");
    };
    if !key.matches(token) {
        tracing::warn!("rejected request with invalid api key");
        return unauthorized("Invalid API key");
    }
    next.run(req).await
}

fn unauthorized(message: &str) -> Response {
    Error::Unauthorized(message.to_string()).into_response()
}
