use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use cookie::Cookie;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::backend::UpstreamRequest;
use crate::session::{append_set_cookies, forwarded_cookie_header};
use crate::shared::{AppError, AppState};

/// A backend answer relayed to the browser: status and body unchanged, cookies re-emitted
#[derive(Debug)]
pub struct ProxyResponse {
    pub status: StatusCode,
    pub body: Value,
    pub cookies: Vec<Cookie<'static>>,
}

impl ProxyResponse {
    pub fn new(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            body,
            cookies: Vec::new(),
        }
    }

    pub fn with_cookies(mut self, cookies: Vec<Cookie<'static>>) -> Self {
        self.cookies = cookies;
        self
    }

    pub fn map_body<F>(mut self, f: F) -> Self
    where
        F: FnOnce(Value) -> Value,
    {
        self.body = f(self.body);
        self
    }
}

impl IntoResponse for ProxyResponse {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(self.body)).into_response();
        append_set_cookies(response.headers_mut(), &self.cookies);
        response
    }
}

/// Sends a request to the backend with the browser's cookies and relays the answer
#[instrument(skip(state, headers, request), fields(method = %request.method, route = %request.route))]
pub async fn forward(
    state: &AppState,
    headers: &HeaderMap,
    request: UpstreamRequest,
) -> Result<ProxyResponse, AppError> {
    let request = request.cookies(forwarded_cookie_header(headers));
    let response = state.upstream.send(request).await?;

    let cookies = state
        .session_service
        .cookie_policy()
        .reissue_all(&response.set_cookies);

    debug!(status = %response.status, cookies = cookies.len(), "Relaying backend response");
    Ok(ProxyResponse::new(response.status, response.body).with_cookies(cookies))
}

/// Like `forward`, but serves and stores the answer in the query cache under `key`
#[instrument(skip(state, headers, request))]
pub async fn cached_get(
    state: &AppState,
    headers: &HeaderMap,
    scope: &str,
    key: &str,
    request: UpstreamRequest,
) -> Result<ProxyResponse, AppError> {
    if let Some((status, body)) = state.query_cache.get(scope, key).await {
        return Ok(ProxyResponse::new(status, body));
    }

    let response = forward(state, headers, request).await?;
    state
        .query_cache
        .put(scope, key, response.status, response.body.clone())
        .await;
    Ok(response)
}
