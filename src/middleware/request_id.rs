use axum::{
    body::Body,
    extract::Request,
    http::{HeaderName, Response},
    middleware::Next,
};
use std::time::Duration;
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    request_id::{MakeRequestId, RequestId},
    trace::TraceLayer,
};
use tracing::{field::Empty, Span};
use uuid::Uuid;

/// Request id made available to handlers through request extensions.
#[derive(Clone, Debug)]
pub struct XRequestId(pub String);

pub fn x_request_id() -> HeaderName {
    HeaderName::from_static("x-request-id")
}

#[derive(Clone, Copy, Default)]
pub struct MakeUuidRequestId;

impl MakeRequestId for MakeUuidRequestId {
    fn make_request_id<B>(&mut self, _req: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        Some(RequestId::new(id.parse().ok()?))
    }
}

pub async fn push_request_id(mut req: Request, next: Next) -> axum::response::Response {
    let rid = request_id_of(&req).to_string();
    req.extensions_mut().insert(XRequestId(rid));
    next.run(req).await
}

fn request_id_of<B>(req: &Request<B>) -> &str {
    req.headers()
        .get(x_request_id())
        .and_then(|v| v.to_str().ok())
        .unwrap_or("n/a")
}

fn make_span(req: &Request<Body>) -> Span {
    tracing::info_span!(
        "http_request",
        method = %req.method(),
        path = %req.uri().path(),
        request_id = %request_id_of(req),
        status = Empty,
        latency_ms = Empty,
    )
}

fn on_response(res: &Response<Body>, latency: Duration, span: &Span) {
    let status = res.status();
    span.record("status", tracing::field::display(status));
    span.record("latency_ms", latency.as_millis() as u64);
    if status.is_server_error() {
        tracing::error!(%status, "response");
    } else if status.is_client_error() {
        tracing::warn!(%status, "response");
    } else {
        tracing::info!(%status, "response");
    }
}

#[allow(clippy::type_complexity)]
pub fn trace_layer() -> TraceLayer<
    SharedClassifier<ServerErrorsAsFailures>,
    fn(&Request<Body>) -> Span,
    tower_http::trace::DefaultOnRequest,
    fn(&Response<Body>, Duration, &Span),
> {
    TraceLayer::new_for_http()
        .make_span_with(make_span as fn(&Request<Body>) -> Span)
        .on_response(on_response as fn(&Response<Body>, Duration, &Span))
}
