use axum::http::{HeaderMap, StatusCode};
use chrono::Utc;
use cookie::Cookie;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    cookies::{
        request_cookie, CookiePolicy, CSRF_COOKIE, CSRF_HTTP_ONLY_COOKIE, JWT_COOKIE, PROFILE_COOKIE,
    },
    profile::ProfileSigner,
    state::SessionState,
    token::TokenVerifier,
    types::{Session, UserUpdate},
};
use crate::auth::LoginRequest;
use crate::backend::{Upstream, UpstreamRequest};
use crate::shared::AppError;

const USERS_ROUTE: &str = "/users";
const CURRENT_USER_ROUTE: &str = "/users/me";

/// Credentials in the shape the backend's login action reads
#[derive(Debug, Serialize)]
struct BackendCredentials<'a> {
    email: &'a str,
    password: &'a str,
}

/// Result of a login or refresh: the session plus what goes back to the browser
#[derive(Debug)]
pub struct SessionOutcome {
    pub session: Session,
    pub status: StatusCode,
    pub body: Value,
    pub cookies: Vec<Cookie<'static>>,
}

/// Service for handling session business logic
pub struct SessionService {
    upstream: Arc<dyn Upstream>,
    verifier: TokenVerifier,
    profile: ProfileSigner,
    cookie_policy: CookiePolicy,
}

impl SessionService {
    pub fn new(
        upstream: Arc<dyn Upstream>,
        verifier: TokenVerifier,
        profile: ProfileSigner,
        cookie_policy: CookiePolicy,
    ) -> Self {
        Self {
            upstream,
            verifier,
            profile,
            cookie_policy,
        }
    }

    pub fn cookie_policy(&self) -> &CookiePolicy {
        &self.cookie_policy
    }

    /// Reads the session cookie off a request and classifies it.
    /// Profile fields saved by an earlier update trigger are laid over the token's claims.
    pub fn resolve(&self, headers: &HeaderMap) -> SessionState {
        let Some(token) = request_cookie(headers, JWT_COOKIE) else {
            return SessionState::Anonymous;
        };

        match self.session_from_token(&token) {
            Ok(mut session) => {
                if let Some(update) = self.profile.open(headers, &session) {
                    session.apply_update(&update);
                }
                SessionState::from_session(session, Utc::now())
            }
            Err(_) => SessionState::Anonymous,
        }
    }

    fn session_from_token(&self, token: &str) -> Result<Session, AppError> {
        let claims = self.verifier.verify(token)?;
        Session::from_claims(&claims)
    }

    /// Submits credentials to the backend and mirrors the issued cookies
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: &LoginRequest) -> Result<SessionOutcome, AppError> {
        let state = SessionState::Anonymous.submit_credentials()?;

        let upstream_request = UpstreamRequest::post(USERS_ROUTE)
            .query("action", "login")
            .json(&BackendCredentials {
                email: &request.email,
                password: &request.password,
            })?;

        let response = match self.upstream.send(upstream_request).await {
            Ok(response) => response,
            Err(AppError::Backend { status, message }) => {
                state.reject()?;
                warn!(status = %status, message = %message, "Backend rejected credentials");
                return Err(AppError::InvalidCredentials(message));
            }
            Err(e) => {
                state.reject()?;
                return Err(e);
            }
        };

        let cookies = self.cookie_policy.reissue_all(&response.set_cookies);
        let session = cookies
            .iter()
            .find(|cookie| cookie.name() == JWT_COOKIE)
            .and_then(|cookie| self.session_from_token(cookie.value()).ok());

        let Some(session) = session else {
            state.reject()?;
            warn!("Backend accepted login but issued no valid session token");
            return Err(AppError::InvalidCredentials("Invalid credentials".to_string()));
        };

        match state.accept(session)?.check_expiry(Utc::now()) {
            SessionState::Authenticated(session) => {
                info!(user_id = %session.user_id, "Signed in successfully");
                Ok(SessionOutcome {
                    session,
                    status: response.status,
                    body: response.body,
                    cookies,
                })
            }
            _ => Err(AppError::InvalidCredentials(
                "Session token has already expired".to_string(),
            )),
        }
    }

    /// Update trigger: re-reads the current user and refreshes the session in place
    #[instrument(skip(self, session, cookies), fields(user_id = %session.user_id))]
    pub async fn refresh(&self, session: Session, cookies: Option<String>) -> Result<SessionOutcome, AppError> {
        let state = SessionState::from_session(session, Utc::now());

        let response = self
            .upstream
            .send(UpstreamRequest::get(CURRENT_USER_ROUTE).cookies(cookies))
            .await?;

        let mut reissued = self.cookie_policy.reissue_all(&response.set_cookies);
        let fresh_session = reissued
            .iter()
            .find(|cookie| cookie.name() == JWT_COOKIE)
            .map(|cookie| self.session_from_token(cookie.value()))
            .transpose()?;

        let state = match fresh_session {
            Some(fresh) => {
                info!("Backend reissued the session token");
                reissued.push(self.cookie_policy.expired(PROFILE_COOKIE));
                state.reauthenticate(fresh)?
            }
            None => {
                if reissued.is_empty() {
                    warn!("jwt cookie not updated");
                }
                let update = match response.body.get("user") {
                    Some(user) => serde_json::from_value::<UserUpdate>(user.clone())
                        .map_err(|e| AppError::Upstream(format!("Unexpected user payload: {}", e)))?,
                    None => UserUpdate::default(),
                };
                let state = state.refresh(&update)?;
                if let Some(session) = state.session() {
                    reissued.push(self.profile.seal(session, &self.cookie_policy));
                }
                state
            }
        };

        match state.check_expiry(Utc::now()) {
            SessionState::Authenticated(session) => {
                info!(verified = session.verified, "Session refreshed");
                Ok(SessionOutcome {
                    session,
                    status: response.status,
                    body: response.body,
                    cookies: reissued,
                })
            }
            SessionState::Expired(_) => Err(AppError::SessionExpired),
            _ => Err(AppError::Internal),
        }
    }

    /// Expiring replacements for every cookie the backend hands out
    #[instrument(skip(self, headers))]
    pub fn sign_out(&self, headers: &HeaderMap) -> Result<Vec<Cookie<'static>>, AppError> {
        let state = self.resolve(headers);
        let user_id = state.session().map(|session| session.user_id.clone());
        state.sign_out()?;

        info!(user_id = ?user_id, "Signed out");

        Ok([JWT_COOKIE, CSRF_HTTP_ONLY_COOKIE, CSRF_COOKIE, PROFILE_COOKIE]
            .into_iter()
            .map(|name| self.cookie_policy.expired(name))
            .collect())
    }
}
