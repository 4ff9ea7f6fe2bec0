use std::any::Any;

use axum::response::{IntoResponse, Response};

use crate::error::Error;

/// Panic handler for `CatchPanicLayer::custom`; renders the 500 envelope.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = err.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = err.downcast_ref::<&str>() {
        message.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    Error::Internal(format!("handler panicked: {}", detail)).into_response()
}
