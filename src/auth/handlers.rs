use axum::{extract::State, http::HeaderMap};
use tracing::{info, instrument, warn};

use super::types::{
    EmailVerifyRequest, ForgotPasswordRequest, ResetPasswordRequest, SignupRequest,
    TokenVerifyRequest,
};
use crate::backend::UpstreamRequest;
use crate::proxy::{forward, ProxyResponse};
use crate::shared::{AppError, AppState};
use crate::validation::ValidJson;

/// POST /api/auth/signup
#[instrument(name = "signup", skip(state, headers, request), fields(email = %request.email))]
pub async fn signup(
    State(state): State<AppState>,
    headers: HeaderMap,
    ValidJson(request): ValidJson<SignupRequest>,
) -> Result<ProxyResponse, AppError> {
    let upstream = UpstreamRequest::post("/users")
        .query("action", "signup")
        .json(&request)?;

    let response = forward(&state, &headers, upstream).await?;
    info!(status = %response.status, "Signup relayed");
    Ok(response)
}

/// POST /api/auth/email/verify
///
/// A verified email gets a fresh token from the backend, so its cookies are relayed.
#[instrument(name = "verify_email", skip_all)]
pub async fn verify_email(
    State(state): State<AppState>,
    headers: HeaderMap,
    ValidJson(request): ValidJson<EmailVerifyRequest>,
) -> Result<ProxyResponse, AppError> {
    let upstream = UpstreamRequest::post("/auth/email/verify").json(&request)?;

    let response = forward(&state, &headers, upstream).await?;
    if response.cookies.is_empty() {
        warn!("jwt cookie not updated");
    }
    Ok(response)
}

/// POST /api/auth/token/verify
#[instrument(name = "verify_token", skip_all, fields(purpose = %request.purpose))]
pub async fn verify_token(
    State(state): State<AppState>,
    headers: HeaderMap,
    ValidJson(request): ValidJson<TokenVerifyRequest>,
) -> Result<ProxyResponse, AppError> {
    let upstream = UpstreamRequest::post("/auth/token/verify").json(&request)?;

    forward(&state, &headers, upstream).await
}

/// POST /api/auth/password/forgot
#[instrument(name = "forgot_password", skip_all)]
pub async fn forgot_password(
    State(state): State<AppState>,
    headers: HeaderMap,
    ValidJson(request): ValidJson<ForgotPasswordRequest>,
) -> Result<ProxyResponse, AppError> {
    let upstream = UpstreamRequest::post("/password/forgot").json(&request)?;

    forward(&state, &headers, upstream).await
}

/// POST /api/auth/password/reset
#[instrument(name = "reset_password", skip_all)]
pub async fn reset_password(
    State(state): State<AppState>,
    headers: HeaderMap,
    ValidJson(request): ValidJson<ResetPasswordRequest>,
) -> Result<ProxyResponse, AppError> {
    let upstream = UpstreamRequest::post("/password/reset").json(&request)?;

    forward(&state, &headers, upstream).await
}
