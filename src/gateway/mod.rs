//! HTTP gateway (Axum): metadata, classification, CORS.
//!
//! Every response carries `Access-Control-Allow-Origin: *`. `OPTIONS` on any
//! path is answered here with `204` and never reaches a handler.

pub mod error;
pub mod handler;
pub mod payload;
pub mod state;


use axum::{
    Json, Router,
    extract::Request,
    http::{
        HeaderMap, HeaderValue, Method, StatusCode,
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE,
        },
    },
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

pub use error::GatewayError;
pub use handler::{classify_handler, metadata_handler};
pub use payload::{AppMetadata, ClassifyRequest, ClassifyResponse, Envelope};
pub use state::AppState;

use crate::constants::{
    CORS_ALLOW_HEADERS, CORS_ALLOW_METHODS, CORS_ALLOW_ORIGIN, CORS_MAX_AGE_SECS,
};

pub fn create_router_with_state(state: AppState) -> Router {
    Router::new()
        .route("/", get(metadata_handler).post(classify_handler))
        .route("/healthz", get(health_handler))
        .fallback(not_found_handler)
        .layer(middleware::from_fn(cors_preflight))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static(CORS_ALLOW_ORIGIN),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    (StatusCode::OK, Json(HealthResponse { status: "ok" })).into_response()
}

async fn not_found_handler() -> Response {
    let status = StatusCode::NOT_FOUND;
    let message = status.canonical_reason().unwrap_or("Not Found");
    (status, Json(Envelope::error(status.as_u16(), message))).into_response()
}

/// Short-circuits `OPTIONS` on any path with the preflight response.
pub async fn cors_preflight(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        return preflight_response();
    }
    next.run(request).await
}

pub fn preflight_response() -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static(CORS_ALLOW_ORIGIN),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(CORS_ALLOW_METHODS),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(CORS_ALLOW_HEADERS),
    );
    headers.insert(
        ACCESS_CONTROL_MAX_AGE,
        HeaderValue::from_static(CORS_MAX_AGE_SECS),
    );

    (StatusCode::NO_CONTENT, headers).into_response()
}
