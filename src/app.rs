use axum::{
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
};

use crate::{
    error::Error,
    metrics,
    middleware::{
        api_key::{require_api_key, ApiKey},
        cors::cors_layer,
        recover::handle_panic,
        request_id::{push_request_id, trace_layer, x_request_id, MakeUuidRequestId},
        security_headers::with_security_headers,
    },
    routes, AppState,
};

const MAX_BODY_BYTES: usize = 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    let routes = api_routes(&state).with_state(state.clone());
    with_middleware(routes, &state)
}

fn api_routes(state: &AppState) -> Router<AppState> {
    let config = &state.config;

    let mut users_api = Router::new()
        .route(
            "/v1/users",
            get(routes::users::list_users).post(routes::users::create_user),
        )
        .route(
            "/v1/users/:id",
            get(routes::users::get_user)
                .put(routes::users::update_user)
                .delete(routes::users::delete_user),
        );
    if let Some(key) = config.api_key.clone() {
        users_api = users_api.route_layer(from_fn_with_state(ApiKey::new(key), require_api_key));
    }

    let mut app = Router::new()
        .route("/health", get(routes::health::health))
        .route("/ready", get(routes::health::ready))
        .merge(users_api);
    if config.metrics_enabled {
        app = app.route("/metrics", get(routes::metrics::metrics));
    }
    if config.is_dev() {
        app = app.route("/docs/openapi.json", get(routes::docs::openapi_json));
    }
    app
}

/// Wraps an already stateful router in the full middleware stack.
pub fn with_middleware(routes: Router, state: &AppState) -> Router {
    let config = state.config.clone();

    let mut app = routes
        .route_layer(from_fn(metrics::record_route))
        .fallback(route_not_found)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CatchPanicLayer::custom(handle_panic));

    // Layers run outermost-last: the final `.layer` sees the request first.
    if let Some(registry) = state.metrics.clone() {
        app = app.layer(from_fn_with_state(registry, metrics::track_metrics));
    }
    let app = app
        .layer(cors_layer(&config))
        .layer(from_fn(push_request_id))
        .layer(trace_layer())
        .layer(PropagateRequestIdLayer::new(x_request_id()))
        .layer(SetRequestIdLayer::new(x_request_id(), MakeUuidRequestId));

    // A second catcher covers panics raised by the middleware itself.
    with_security_headers(app).layer(CatchPanicLayer::custom(handle_panic))
}

async fn route_not_found() -> Error {
    Error::NotFound("route not found".to_string())
}
