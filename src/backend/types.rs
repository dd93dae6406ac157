use async_trait::async_trait;
use axum::http::{Method, StatusCode};
use serde::Serialize;
use serde_json::Value;

use crate::shared::AppError;

/// Seam between the gateway and the swear jar backend
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Sends one request; any non-2xx answer comes back as `AppError::Backend`
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, AppError>;
}

/// A single outbound call to the backend
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamRequest {
    pub method: Method,
    /// Path below the backend base URL, e.g. `/swearjar`
    pub route: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    /// `Cookie` header forwarded from the browser
    pub cookies: Option<String>,
}

impl UpstreamRequest {
    pub fn new(method: Method, route: impl Into<String>) -> Self {
        Self {
            method,
            route: route.into(),
            query: Vec::new(),
            body: None,
            cookies: None,
        }
    }

    pub fn get(route: impl Into<String>) -> Self {
        Self::new(Method::GET, route)
    }

    pub fn post(route: impl Into<String>) -> Self {
        Self::new(Method::POST, route)
    }

    pub fn put(route: impl Into<String>) -> Self {
        Self::new(Method::PUT, route)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, AppError> {
        let value = serde_json::to_value(body).map_err(|e| AppError::Upstream(e.to_string()))?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn cookies(mut self, cookies: Option<String>) -> Self {
        self.cookies = cookies;
        self
    }
}

/// A successful (2xx) backend answer
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub body: Value,
    /// Raw `Set-Cookie` header values, one entry per header line
    pub set_cookies: Vec<String>,
}
