use axum::{extract::State, http::HeaderMap, http::StatusCode, Extension, Json};
use serde_json::json;
use tracing::{info, instrument};

use super::{cookies::forwarded_cookie_header, types::{Session, SessionResponse}};
use crate::auth::LoginRequest;
use crate::proxy::ProxyResponse;
use crate::shared::{AppError, AppState};
use crate::validation::ValidJson;

/// HTTP handler for signing in
///
/// POST /api/auth/login
/// Relays the backend's answer and re-emits its cookies with the gateway's attributes
#[instrument(name = "login", skip(state, request))]
pub async fn login(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<LoginRequest>,
) -> Result<ProxyResponse, AppError> {
    let outcome = state.session_service.login(&request).await?;

    Ok(ProxyResponse::new(outcome.status, outcome.body).with_cookies(outcome.cookies))
}

/// POST /api/auth/signOut
#[instrument(name = "sign_out", skip(state, headers))]
pub async fn sign_out(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<ProxyResponse, AppError> {
    let cookies = state.session_service.sign_out(&headers)?;

    Ok(ProxyResponse::new(StatusCode::OK, json!({ "message": "Signed out successfully" }))
        .with_cookies(cookies))
}

/// GET /api/auth/session
#[instrument(name = "get_session", skip(session), fields(user_id = %session.user_id))]
pub async fn get_session(Extension(session): Extension<Session>) -> Json<SessionResponse> {
    Json(session.to_response())
}

/// Update trigger
///
/// POST /api/auth/session
/// Re-reads the current user from the backend and returns the refreshed session
#[instrument(name = "update_session", skip(state, session, headers), fields(user_id = %session.user_id))]
pub async fn update_session(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    headers: HeaderMap,
) -> Result<ProxyResponse, AppError> {
    let outcome = state
        .session_service
        .refresh(session, forwarded_cookie_header(&headers))
        .await?;

    info!(verified = outcome.session.verified, "Session update relayed");

    let body = serde_json::to_value(outcome.session.to_response()).map_err(|_| AppError::Internal)?;
    Ok(ProxyResponse::new(StatusCode::OK, body).with_cookies(outcome.cookies))
}
