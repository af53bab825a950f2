//! HTTP surface: the deadlines endpoint, health check and CORS policy.

use axum::{
    extract::State,
    http::{
        header::{ALLOW, AUTHORIZATION, CONTENT_TYPE},
        Method, StatusCode,
    },
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};

use crate::deadlines::types::FailureEnvelope;
use crate::deadlines::DeadlineService;

#[derive(Clone)]
pub struct AppState {
    pub deadlines: DeadlineService,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/deadlines", any(deadlines))
        .route("/deadlines", any(deadlines))
        .layer(cors_layer())
        .with_state(state)
}

/// Any origin; GET + preflight; Content-Type and Authorization request headers.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
}

async fn deadlines(method: Method, State(state): State<AppState>) -> Response {
    match method {
        Method::OPTIONS => StatusCode::OK.into_response(),
        Method::GET => match state.deadlines.aggregate().await {
            Ok(envelope) => Json(envelope).into_response(),
            Err(e) => {
                tracing::error!(error = %e, "deadline aggregation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(FailureEnvelope::new(e.to_string())),
                )
                    .into_response()
            }
        },
        _ => (
            StatusCode::METHOD_NOT_ALLOWED,
            [(ALLOW, "GET, OPTIONS")],
            Json(json!({ "error": "Method not allowed" })),
        )
            .into_response(),
    }
}
