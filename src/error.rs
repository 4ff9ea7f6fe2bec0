use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::{json, Value as JsonValue};

use crate::dto::envelope::{ErrorBody, ErrorDetail};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {message}")]
    BadRequest {
        message: String,
        details: Option<JsonValue>,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("failed to {context}: {source}")]
    Database {
        context: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("Service unavailable: {message}")]
    ServiceUnavailable { message: String, details: JsonValue },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Error::BadRequest {
            message: message.into(),
            details: None,
        }
    }

    /// Classifies a driver error raised while performing `context`.
    pub fn database(context: &'static str, err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                Error::Conflict("Email already exists".to_string())
            }
            source => Error::Database { context, source },
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Error::BadRequest { .. } | Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Error::Config(_) | Error::Database { .. } | Error::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self.status() {
            StatusCode::BAD_REQUEST => "BAD_REQUEST",
            StatusCode::UNAUTHORIZED => "UNAUTHORIZED",
            StatusCode::NOT_FOUND => "NOT_FOUND",
            StatusCode::CONFLICT => "CONFLICT",
            StatusCode::SERVICE_UNAVAILABLE => "SERVICE_UNAVAILABLE",
            _ => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let code = self.code();
        let (message, details) = match self {
            Error::BadRequest { message, details } => (message, details),
            Error::Validation(err) => (
                "Validation failed".to_string(),
                serde_json::to_value(&err).ok(),
            ),
            Error::Unauthorized(msg) | Error::NotFound(msg) | Error::Conflict(msg) => (msg, None),
            Error::ServiceUnavailable { message, details } => (message, Some(details)),
            other => {
                tracing::error!(error = %other, "request failed");
                ("Internal server error".to_string(), None)
            }
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Error::database("query database", err)
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::BadRequest {
            message: "Invalid request body".to_string(),
            details: Some(json!(rejection.body_text())),
        }
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Error::BadRequest {
            message: "Invalid query parameters".to_string(),
            details: Some(json!(rejection.body_text())),
        }
    }
}

impl From<PathRejection> for Error {
    fn from(_: PathRejection) -> Self {
        Error::bad_request("Invalid user ID")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(err: Error) -> (StatusCode, JsonValue) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn kinds_map_to_status_codes() {
        let cases = vec![
            (Error::bad_request("nope"), StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            (Error::Unauthorized("x".into()), StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            (Error::NotFound("User not found".into()), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (Error::Conflict("Email already exists".into()), StatusCode::CONFLICT, "CONFLICT"),
            (
                Error::Internal("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_SERVER_ERROR",
            ),
        ];
        for (err, status, code) in cases {
            let (got_status, body) = body_of(err).await;
            assert_eq!(got_status, status);
            assert_eq!(body["error"]["code"], code);
        }
    }

    #[tokio::test]
    async fn internal_details_are_not_leaked() {
        let (status, body) = body_of(Error::Database {
            context: "create user",
            source: sqlx::Error::PoolTimedOut,
        })
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["message"], "Internal server error");
        assert!(body["error"].get("details").is_none());
    }

    #[tokio::test]
    async fn unavailable_carries_details() {
        let (status, body) = body_of(Error::ServiceUnavailable {
            message: "Service not ready".into(),
            details: json!({"database": "fail"}),
        })
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["details"]["database"], "fail");
    }

    #[test]
    fn row_not_found_becomes_not_found() {
        assert!(matches!(
            Error::database("get user", sqlx::Error::RowNotFound),
            Error::NotFound(_)
        ));
        assert!(matches!(
            Error::database("get user", sqlx::Error::PoolClosed),
            Error::Database { context: "get user", .. }
        ));
    }
}
