//! REST API endpoints.
//!
//! Axum-based HTTP API serving leaderboards and the active scoring formula
//! to the public view.

pub mod routes;
pub mod state;

use axum::{
    extract::rejection::QueryRejection,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::formula::FormulaError;
use crate::leaderboard::LeaderboardError;
use crate::models::RangeError;
use state::AppState;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not configured: {0}")]
    NotConfigured(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::NotConfigured(_) => (StatusCode::SERVICE_UNAVAILABLE, "NOT_CONFIGURED"),
            ApiError::Upstream(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        if status.is_server_error() {
            tracing::error!("{}", self);
        }

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<RangeError> for ApiError {
    fn from(e: RangeError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(e: QueryRejection) -> Self {
        ApiError::BadRequest(e.body_text())
    }
}

impl From<LeaderboardError> for ApiError {
    fn from(e: LeaderboardError) -> Self {
        if e.is_not_configured() {
            ApiError::NotConfigured(e.to_string())
        } else {
            ApiError::Upstream(e.to_string())
        }
    }
}

impl From<FormulaError> for ApiError {
    fn from(e: FormulaError) -> Self {
        match &e {
            FormulaError::NotConfigured(_) => ApiError::NotConfigured(e.to_string()),
            FormulaError::InvalidUrl(_) => ApiError::Internal(e.to_string()),
            FormulaError::Http(_) => ApiError::Upstream(e.to_string()),
        }
    }
}

/// CORS layer for the configured origin; `*` allows any.
pub fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origin == "*" {
        return layer.allow_origin(Any);
    }
    match HeaderValue::from_str(origin) {
        Ok(value) => layer.allow_origin(value),
        Err(_) => {
            tracing::warn!("Invalid CORS origin {:?}, allowing any", origin);
            layer.allow_origin(Any)
        }
    }
}

/// Build the API router.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.cors_origin);

    Router::new()
        .route("/api/health", get(routes::health::health))
        .route("/api/leaderboard", get(routes::leaderboard::get_leaderboard))
        .route(
            "/api/scoring-formula",
            get(routes::formula::get_active_formula),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;

    #[test]
    fn test_leaderboard_error_mapping() {
        let not_configured: ApiError =
            LeaderboardError::Store(StoreError::NotConfigured("x".to_string())).into();
        assert!(matches!(not_configured, ApiError::NotConfigured(_)));

        let upstream: ApiError = LeaderboardError::Store(StoreError::HttpStatus {
            status: 500,
            message: "boom".to_string(),
        })
        .into();
        assert!(matches!(upstream, ApiError::Upstream(_)));
    }

    #[test]
    fn test_formula_error_mapping() {
        let err: ApiError = FormulaError::NotConfigured("x".to_string()).into();
        assert!(matches!(err, ApiError::NotConfigured(_)));

        let err: ApiError = FormulaError::InvalidUrl("x".to_string()).into();
        assert!(matches!(err, ApiError::Internal(_)));
    }

    #[test]
    fn test_error_status_codes() {
        let cases = [
            (ApiError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (
                ApiError::NotConfigured("x".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (ApiError::Upstream("x".into()), StatusCode::BAD_GATEWAY),
            (
                ApiError::Internal("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
