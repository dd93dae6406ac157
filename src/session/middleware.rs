use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::{debug, instrument, warn};

use super::state::SessionState;
use crate::shared::{AppError, AppState};

/// Session guard for protected API routes - resolves the `jwt` cookie and adds the Session to the request.
/// Usage: .route_layer(middleware::from_fn_with_state(app_state.clone(), session::require_session))
/// Handlers can then extract Extension(session): Extension<Session>.
#[instrument(skip(state, req, next), fields(uri = %req.uri()))]
pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    match state.session_service.resolve(req.headers()) {
        SessionState::Authenticated(session) => {
            debug!(user_id = %session.user_id, "Session accepted");
            req.extensions_mut().insert(session);
            Ok(next.run(req).await)
        }
        SessionState::Expired(session) => {
            warn!(user_id = %session.user_id, "Rejecting request with expired session");
            Err(AppError::SessionExpired)
        }
        _ => {
            warn!("Rejecting request without a session");
            Err(AppError::Unauthenticated)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;
    use crate::shared::test_utils::{browser_cookies, issue_token, AppStateBuilder};
    use axum::{
        body::Body,
        http::{header::COOKIE, StatusCode},
        middleware,
        routing::get,
        Extension, Router,
    };
    use chrono::Duration;
    use tower::ServiceExt;

    async fn whoami(Extension(session): Extension<Session>) -> String {
        session.user_id
    }

    fn app() -> Router {
        let state = AppStateBuilder::new().build();
        Router::new()
            .route("/protected", get(whoami))
            .route_layer(middleware::from_fn_with_state(state.clone(), require_session))
            .with_state(state)
    }

    async fn call(cookies: Option<String>) -> (StatusCode, String) {
        let mut request = Request::builder().uri("/protected");
        if let Some(cookies) = cookies {
            request = request.header(COOKIE, cookies);
        }

        let response = app()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_valid_session_reaches_handler() {
        let token = issue_token("u1", "a@b.com", "Alice", true, Duration::minutes(5));

        let (status, body) = call(Some(browser_cookies(&token))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "u1");
    }

    #[tokio::test]
    async fn test_missing_cookie_is_unauthenticated() {
        let (status, body) = call(None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("User not authenticated"));
    }

    #[tokio::test]
    async fn test_expired_cookie_reports_expiry() {
        let token = issue_token("u1", "a@b.com", "Alice", true, Duration::minutes(-1));

        let (status, body) = call(Some(browser_cookies(&token))).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("Session expired"));
    }

    #[tokio::test]
    async fn test_forged_cookie_is_unauthenticated() {
        let (status, _) = call(Some("jwt=forged.token.value".to_string())).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
