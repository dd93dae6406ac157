#![allow(dead_code)] // Test utilities may not all be used in every test

use axum::{
    body::Body,
    http::{
        header::{CONTENT_TYPE, COOKIE},
        HeaderMap, Method, Request, StatusCode,
    },
};
use serde_json::Value;
use tower::ServiceExt;

use super::setup::TestSetup;

/// What the browser got back from the gateway
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

// ============================================================================
// Action Helpers
// ============================================================================

impl TestSetup {
    /// Send one request through the full router
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        cookies: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(cookies) = cookies {
            request = request.header(COOKIE, cookies);
        }
        let body = match body {
            Some(json) => {
                request = request.header(CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .app
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, cookies: Option<&str>) -> TestResponse {
        self.send(Method::GET, uri, cookies, None).await
    }

    pub async fn post_json(&self, uri: &str, cookies: Option<&str>, body: Value) -> TestResponse {
        self.send(Method::POST, uri, cookies, Some(body)).await
    }

    pub async fn put_json(&self, uri: &str, cookies: Option<&str>, body: Value) -> TestResponse {
        self.send(Method::PUT, uri, cookies, Some(body)).await
    }

    // ============================================================================
    // Convenience Action Methods
    // ============================================================================

    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.post_json(
            "/api/auth/login",
            None,
            serde_json::json!({ "Email": email, "Password": password }),
        )
        .await
    }

    /// Number of calls the backend has received so far
    pub async fn backend_calls(&self) -> usize {
        self.backend
            .received_requests()
            .await
            .map(|requests| requests.len())
            .unwrap_or(0)
    }
}
