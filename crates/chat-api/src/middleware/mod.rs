//! Middleware stack for the API server
//!
//! Every request gets an `x-request-id`, a tracing span, a deadline and the
//! CORS policy from configuration.

use std::time::Duration;

use axum::{
    body::Body,
    http::{header::HeaderName, HeaderValue, Method, Request, StatusCode},
    Router,
};
use chat_common::{AppConfig, CorsConfig};
use tower::ServiceBuilder;
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultOnRequest, DefaultOnResponse, MakeSpan, TraceLayer},
};
use tracing::{Level, Span};

use crate::state::AppState;

/// Header name for request ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Deadline for producing a response. Socket sessions outlive it; only the
/// upgrade itself is covered.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Apply the middleware stack, outermost layer first
pub fn apply_middleware(router: Router<AppState>, config: &AppConfig) -> Router<AppState> {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    router.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
            .layer(PropagateRequestIdLayer::new(request_id))
            .layer(trace_layer())
            .layer(TimeoutLayer::with_status_code(
                StatusCode::SERVICE_UNAVAILABLE,
                REQUEST_TIMEOUT,
            ))
            .layer(cors_layer(&config.cors, config.app.env.is_production())),
    )
}

/// Span per request, tagged with the id set by the outer layer
#[derive(Clone, Copy)]
struct RequestSpan;

impl MakeSpan<Body> for RequestSpan {
    fn make_span(&mut self, request: &Request<Body>) -> Span {
        let request_id = request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown");

        // Path only; query strings carry profile ids
        tracing::info_span!(
            "http_request",
            method = %request.method(),
            path = %request.uri().path(),
            request_id = %request_id,
        )
    }
}

fn trace_layer(
) -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>, RequestSpan, DefaultOnRequest, DefaultOnResponse> {
    TraceLayer::new_for_http()
        .make_span_with(RequestSpan)
        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
        .on_response(DefaultOnResponse::new().level(Level::INFO))
}

/// CORS policy
///
/// Configured origins always win. Without any, development allows every
/// origin and production allows none.
fn cors_layer(config: &CorsConfig, is_production: bool) -> CorsLayer {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
            request_id.clone(),
        ])
        .expose_headers([request_id]);

    match (config.allowed_origins.is_empty(), is_production) {
        (true, false) => {
            tracing::warn!("CORS: allowing any origin; set CORS_ALLOWED_ORIGINS outside development");
            layer.allow_origin(Any)
        }
        (true, true) => {
            tracing::warn!("CORS: no allowed origins configured, browser requests will be refused");
            layer.allow_origin(AllowOrigin::list(Vec::<HeaderValue>::new()))
        }
        (false, _) => {
            let origins: Vec<HeaderValue> = config
                .allowed_origins
                .iter()
                .filter_map(|origin| match origin.parse::<HeaderValue>() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                        None
                    }
                })
                .collect();

            tracing::info!(count = origins.len(), "CORS: allowing configured origins");
            layer.allow_origin(AllowOrigin::list(origins))
        }
    }
}
