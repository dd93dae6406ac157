use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, error, instrument};
use url::form_urlencoded;

use crate::session::{Session, SessionResponse, SessionState};
use crate::shared::{AppError, AppState};
use crate::swearjar::{fetch_query, QueryKey};

pub const HOME_PAGE: &str = "/swearjar/list";
pub const LOGIN_PAGE: &str = "/auth/login";

/// Login redirect that brings the user back to `uri` afterwards
pub fn login_redirect(uri: &Uri) -> Redirect {
    let callback = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    let query: String = form_urlencoded::Serializer::new(String::new())
        .append_pair("callbackUrl", callback)
        .finish();

    Redirect::to(&format!("{}?{}", LOGIN_PAGE, query))
}

/// Data a protected page is rendered with
#[derive(Debug, Serialize)]
pub struct PageData {
    pub session: SessionResponse,
    pub data: Value,
}

fn guard(state: &AppState, headers: &HeaderMap, uri: &Uri) -> Result<Session, Redirect> {
    match state.session_service.resolve(headers) {
        SessionState::Authenticated(session) => Ok(session),
        other => {
            debug!(state = other.name(), uri = %uri, "Redirecting to login");
            Err(login_redirect(uri))
        }
    }
}

async fn render(
    state: &AppState,
    headers: &HeaderMap,
    uri: &Uri,
    key: Option<QueryKey>,
) -> Result<Response, AppError> {
    let session = match guard(state, headers, uri) {
        Ok(session) => session,
        Err(redirect) => return Ok(redirect.into_response()),
    };

    let data = match key {
        Some(key) => match fetch_query(state, headers, &session, key).await {
            Ok(response) => response.body,
            Err(e) => {
                error!(error = %e, "Error fetching Swear Jar data");
                return Err(AppError::Upstream("Error fetching Swear Jar data".to_string()));
            }
        },
        None => Value::Null,
    };

    Ok(Json(PageData {
        session: session.to_response(),
        data,
    })
    .into_response())
}

/// GET /
pub async fn home() -> Redirect {
    Redirect::to(HOME_PAGE)
}

/// GET /swearjar/list
#[instrument(name = "jar_list_page", skip(state, headers))]
pub async fn jar_list_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
) -> Result<Response, AppError> {
    render(&state, &headers, &uri, Some(QueryKey::Jars)).await
}

/// GET /swearjar/create
#[instrument(name = "jar_create_page", skip(state, headers))]
pub async fn jar_create_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
) -> Result<Response, AppError> {
    render(&state, &headers, &uri, None).await
}

/// GET /swearjar/:id/view and /swearjar/:id/edit
#[instrument(name = "jar_page", skip(state, headers))]
pub async fn jar_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    uri: Uri,
) -> Result<Response, AppError> {
    render(&state, &headers, &uri, Some(QueryKey::Jar(id))).await
}

/// GET /onboarding
#[instrument(name = "onboarding_page", skip(state, headers))]
pub async fn onboarding_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match state.session_service.resolve(&headers) {
        SessionState::Authenticated(session) if session.verified => Redirect::to(HOME_PAGE).into_response(),
        SessionState::Authenticated(session) => Json(json!({ "Email": session.email })).into_response(),
        _ => Redirect::to(LOGIN_PAGE).into_response(),
    }
}

/// GET /auth/password/forgot and /auth/password/reset
#[instrument(name = "password_page", skip(state, headers))]
pub async fn password_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match state.session_service.resolve(&headers) {
        SessionState::Authenticated(_) => Redirect::to(HOME_PAGE).into_response(),
        _ => StatusCode::NO_CONTENT.into_response(),
    }
}
