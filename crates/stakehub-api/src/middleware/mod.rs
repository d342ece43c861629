//! Middleware stack for the API server
//!
//! Request ids, tracing, timeouts, CORS and a global rate limit.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, HeaderValue, Method, Request, StatusCode},
    Router,
};
use stakehub_common::{AppError, CorsConfig, RateLimitConfig};
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::GlobalKeyExtractor, GovernorLayer,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

/// Header name for request ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

fn request_span(request: &Request<Body>) -> tracing::Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");

    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id,
    )
}

/// Layers shared by every route: request id, tracing, timeout, CORS
pub fn apply_middleware(router: Router<AppState>, cors_config: &CorsConfig) -> Router<AppState> {
    let request_id = header::HeaderName::from_static(REQUEST_ID_HEADER);

    router.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
            .layer(PropagateRequestIdLayer::new(request_id))
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(request_span)
                    .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                    .on_response(DefaultOnResponse::new().level(Level::INFO)),
            )
            .layer(TimeoutLayer::with_status_code(
                StatusCode::SERVICE_UNAVAILABLE,
                REQUEST_TIMEOUT,
            ))
            .layer(create_cors_layer(cors_config)),
    )
}

/// `apply_middleware` plus the global rate limit in front of everything
pub fn apply_middleware_with_config(
    router: Router<AppState>,
    rate_limit_config: &RateLimitConfig,
    cors_config: &CorsConfig,
) -> Result<Router<AppState>, AppError> {
    let rps = u64::from(rate_limit_config.requests_per_second);
    if rps == 0 {
        return Err(AppError::Config("Rate limit needs a non-zero rate".to_string()));
    }

    // One permit is replenished every period
    let governor_conf = GovernorConfigBuilder::default()
        .per_millisecond((1000 / rps).max(1))
        .burst_size(rate_limit_config.burst)
        .key_extractor(GlobalKeyExtractor)
        .finish()
        .ok_or_else(|| {
            AppError::Config("Rate limit needs a non-zero burst".to_string())
        })?;

    Ok(apply_middleware(router, cors_config).layer(GovernorLayer {
        config: Arc::new(governor_conf),
    }))
}

/// Single allow-listed origin with credentials
fn create_cors_layer(config: &CorsConfig) -> CorsLayer {
    let base_layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
        .expose_headers([header::HeaderName::from_static(REQUEST_ID_HEADER)]);

    let origin = config.primary_origin();
    match origin.parse::<HeaderValue>() {
        Ok(value) => {
            tracing::info!(%origin, "CORS: allowing origin");
            base_layer.allow_origin(AllowOrigin::exact(value))
        }
        Err(_) => {
            tracing::warn!(%origin, "CORS: invalid origin, cross-origin requests will be refused");
            base_layer.allow_origin(AllowOrigin::list(Vec::<HeaderValue>::new()))
        }
    }
}
