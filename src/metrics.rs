//! HTTP request metrics exported in the Prometheus text format.

use std::sync::{Arc, OnceLock};
use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

const NAMESPACE: &str = "users_backend";
const UNMATCHED: &str = "unmatched";
/// Status recorded for requests whose response future was dropped before completing.
const CLIENT_CLOSED: &str = "499";

/// Shared handle; clones point at the same registry.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    requests: IntCounterVec,
    durations: HistogramVec,
    in_flight: IntGauge,
}

impl Metrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let requests = IntCounterVec::new(
            Opts::new("http_requests_total", "Total number of HTTP requests.").namespace(NAMESPACE),
            &["method", "route", "status"],
        )?;
        let durations = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request latency in seconds.",
            )
            .namespace(NAMESPACE),
            &["method", "route"],
        )?;
        let in_flight = IntGauge::with_opts(
            Opts::new(
                "http_requests_in_flight",
                "HTTP requests currently being served.",
            )
            .namespace(NAMESPACE),
        )?;

        registry.register(Box::new(requests.clone()))?;
        registry.register(Box::new(durations.clone()))?;
        registry.register(Box::new(in_flight.clone()))?;

        Ok(Self {
            registry,
            requests,
            durations,
            in_flight,
        })
    }

    fn observe(&self, method: &str, route: &str, status: &str, seconds: f64) {
        self.requests
            .with_label_values(&[method, route, status])
            .inc();
        self.durations
            .with_label_values(&[method, route])
            .observe(seconds);
    }

    pub fn content_type(&self) -> String {
        TextEncoder::new().format_type().to_string()
    }

    pub fn render(&self) -> prometheus::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|err| prometheus::Error::Msg(err.to_string()))
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics")
            .field("in_flight", &self.in_flight.get())
            .finish()
    }
}

/// Route template of the current request, filled in once routing has happened.
#[derive(Clone, Default)]
struct RouteSlot(Arc<OnceLock<String>>);

/// Holds a request's in-flight slot. Dropping it records the request even when
/// the response future never completes.
struct InFlight {
    metrics: Metrics,
    method: String,
    route: RouteSlot,
    started: Instant,
    status: Option<u16>,
}

impl InFlight {
    fn start(metrics: Metrics, method: &str, route: RouteSlot) -> Self {
        metrics.in_flight.inc();
        Self {
            metrics,
            method: method.to_string(),
            route,
            started: Instant::now(),
            status: None,
        }
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.metrics.in_flight.dec();
        let status = self
            .status
            .map(|code| code.to_string())
            .unwrap_or_else(|| CLIENT_CLOSED.to_string());
        let route = self.route.0.get().map(String::as_str).unwrap_or(UNMATCHED);
        self.metrics.observe(
            &self.method,
            route,
            &status,
            self.started.elapsed().as_secs_f64(),
        );
    }
}

/// Outer middleware: counts every request, including ones no route matched.
pub async fn track_metrics(
    State(metrics): State<Metrics>,
    mut req: Request,
    next: Next,
) -> Response {
    let route = RouteSlot::default();
    req.extensions_mut().insert(route.clone());
    let mut in_flight = InFlight::start(metrics, req.method().as_str(), route);

    let response = next.run(req).await;
    in_flight.status = Some(response.status().as_u16());
    response
}

/// Route layer that reports the matched route template to `track_metrics`.
pub async fn record_route(req: Request, next: Next) -> Response {
    if let (Some(slot), Some(path)) = (
        req.extensions().get::<RouteSlot>(),
        req.extensions().get::<MatchedPath>(),
    ) {
        let _ = slot.0.set(path.as_str().to_string());
    }
    next.run(req).await
}
