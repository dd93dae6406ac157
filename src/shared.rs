use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::backend::{QueryCache, Upstream};
use crate::config::AppConfig;
use crate::session::{CookiePolicy, ProfileSigner, SessionService, TokenVerifier};

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub upstream: Arc<dyn Upstream>,
    pub session_service: Arc<SessionService>,
    pub query_cache: Arc<QueryCache>,
}

impl AppState {
    pub fn new(config: AppConfig, upstream: Arc<dyn Upstream>) -> Self {
        let session_service = SessionService::new(
            Arc::clone(&upstream),
            TokenVerifier::new(&config.jwt_secret),
            ProfileSigner::new(&config.jwt_secret),
            CookiePolicy::new(config.jwt_expiration_minutes),
        );
        let query_cache = QueryCache::new(config.query_cache_ttl);

        Self {
            config: Arc::new(config),
            upstream,
            session_service: Arc::new(session_service),
            query_cache: Arc::new(query_cache),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("User not authenticated")]
    Unauthenticated,

    #[error("Session expired")]
    SessionExpired,

    #[error("Invalid session transition: {0}")]
    InvalidTransition(String),

    #[error("Backend responded with {status}: {message}")]
    Backend { status: StatusCode, message: String },

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Route handlers answer every caught failure with a 500, except the
        // session guard and the search query check.
        let (status, body) = match self {
            AppError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                json!({ "status": "error", "message": "User not authenticated" }),
            ),
            AppError::SessionExpired => (
                StatusCode::UNAUTHORIZED,
                json!({ "status": "error", "message": "Session expired" }),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::Validation(msg)
            | AppError::InvalidCredentials(msg)
            | AppError::InvalidTransition(msg)
            | AppError::Upstream(msg)
            | AppError::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": msg })),
            AppError::Backend { message, .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": message }))
            }
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Unknown error" }),
            ),
        };

        (status, Json(body)).into_response()
    }
}
