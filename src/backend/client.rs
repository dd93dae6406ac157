use async_trait::async_trait;
use axum::http::{
    header::{CONTENT_TYPE, COOKIE, ORIGIN, SET_COOKIE},
    StatusCode,
};
use serde_json::{json, Value};
use tracing::{debug, error, instrument, warn};
use url::Url;

use super::types::{Upstream, UpstreamRequest, UpstreamResponse};
use crate::config::AppConfig;
use crate::shared::AppError;

/// Fetch helper for every call the gateway makes to the backend
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    origin: String,
}

impl BackendClient {
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        if !config.production {
            warn!("TLS verification is disabled for the development environment");
        }

        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(!config.production)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.backend_url.clone(),
            origin: config.auth_url.clone(),
        })
    }

    /// Appends `query` to `base_url + route`, keeping any query already in `route`
    pub fn url_for(&self, route: &str, query: &[(String, String)]) -> Result<Url, AppError> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, route)).map_err(|e| {
            AppError::Upstream(format!("Invalid backend URL for {}: {}", route, e))
        })?;

        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }

        Ok(url)
    }
}

#[async_trait]
impl Upstream for BackendClient {
    #[instrument(skip(self, request), fields(method = %request.method, route = %request.route))]
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, AppError> {
        let url = self.url_for(&request.route, &request.query)?;
        debug!(url = %url, has_cookies = request.cookies.is_some(), "Calling backend");

        let mut builder = self
            .http
            .request(request.method.clone(), url)
            .header(CONTENT_TYPE, "application/json")
            .header(ORIGIN, self.origin.as_str());
        if let Some(cookies) = request.cookies.as_deref() {
            builder = builder.header(COOKIE, cookies);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            error!(error = %e, "Fetch error");
            AppError::Upstream(e.to_string())
        })?;

        let status = response.status();
        let set_cookies: Vec<String> = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .map(str::to_string)
            .collect();
        let text = response.text().await.map_err(|e| {
            error!(error = %e, "Failed to read backend response body");
            AppError::Upstream(e.to_string())
        })?;
        let parsed = serde_json::from_str::<Value>(&text).ok();

        if !status.is_success() {
            let message = error_message(status, parsed.as_ref(), &text);
            warn!(status = %status, message = %message, "Backend returned an error");
            return Err(AppError::Backend { status, message });
        }

        debug!(
            status = %status,
            set_cookie_count = set_cookies.len(),
            "Backend call succeeded"
        );

        let body = parsed.unwrap_or_else(|| match text.trim() {
            "" => json!({}),
            plain => json!({ "msg": plain }),
        });

        Ok(UpstreamResponse {
            status,
            body,
            set_cookies,
        })
    }
}

/// Prefers the backend's `{error}` field, then its plain-text body
fn error_message(status: StatusCode, parsed: Option<&Value>, text: &str) -> String {
    if let Some(message) = parsed
        .and_then(|body| body.get("error"))
        .and_then(Value::as_str)
    {
        return message.to_string();
    }

    match text.trim() {
        "" => format!("HTTP error! Status: {}", status.as_u16()),
        plain if parsed.is_none() => plain.to_string(),
        _ => format!("HTTP error! Status: {}", status.as_u16()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_utils::test_config;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> BackendClient {
        let mut config = test_config();
        config.backend_url = server.uri();
        BackendClient::new(&config).unwrap()
    }

    #[test]
    fn test_url_for_appends_query_parameters() {
        let client = BackendClient::new(&test_config()).unwrap();
        let url = client
            .url_for(
                "/swearjar/abc/trend",
                &[("period".to_string(), "weeks".to_string())],
            )
            .unwrap();

        assert_eq!(url.as_str(), "http://backend.test/swearjar/abc/trend?period=weeks");
    }

    #[test]
    fn test_url_for_without_query_leaves_no_separator() {
        let client = BackendClient::new(&test_config()).unwrap();
        let url = client.url_for("/swearjar", &[]).unwrap();

        assert_eq!(url.as_str(), "http://backend.test/swearjar");
    }

    #[test]
    fn test_url_for_encodes_values() {
        let client = BackendClient::new(&test_config()).unwrap();
        let url = client
            .url_for("/search/user", &[("query".to_string(), "a b&c".to_string())])
            .unwrap();

        assert_eq!(url.query(), Some("query=a+b%26c"));
    }

    #[test]
    fn test_error_message_preference() {
        let parsed = json!({ "error": "Invalid password" });
        assert_eq!(
            error_message(StatusCode::UNAUTHORIZED, Some(&parsed), ""),
            "Invalid password"
        );
        assert_eq!(
            error_message(StatusCode::UNAUTHORIZED, None, "Unauthorized\n"),
            "Unauthorized"
        );
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, None, ""),
            "HTTP error! Status: 502"
        );
        assert_eq!(
            error_message(StatusCode::NOT_FOUND, Some(&json!({ "msg": "nope" })), "{}"),
            "HTTP error! Status: 404"
        );
    }

    #[tokio::test]
    async fn test_send_forwards_headers_and_collects_cookies() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users"))
            .and(query_param("action", "login"))
            .and(header("origin", "https://app.test"))
            .and(header("cookie", "csrf_token=abc"))
            .and(body_json(json!({ "email": "a@b.com", "password": "pw" })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "msg": "Logged in successfully" }))
                    .append_header("set-cookie", "jwt=token; Path=/")
                    .append_header("set-cookie", "csrf_token=abc; Path=/"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let request = UpstreamRequest::post("/users")
            .query("action", "login")
            .json(&json!({ "email": "a@b.com", "password": "pw" }))
            .unwrap()
            .cookies(Some("csrf_token=abc".to_string()));

        let response = client.send(request).await.unwrap();

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body["msg"], "Logged in successfully");
        assert_eq!(response.set_cookies.len(), 2);
        assert!(response.set_cookies.iter().any(|c| c.starts_with("jwt=token")));
    }

    #[tokio::test]
    async fn test_send_maps_non_success_to_backend_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/swearjar"))
            .respond_with(
                ResponseTemplate::new(403).set_body_json(json!({ "error": "Not an owner" })),
            )
            .mount(&server)
            .await;

        let result = client_for(&server)
            .send(UpstreamRequest::get("/swearjar"))
            .await;

        match result {
            Err(AppError::Backend { status, message }) => {
                assert_eq!(status, StatusCode::FORBIDDEN);
                assert_eq!(message, "Not an owner");
            }
            other => panic!("expected backend error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_send_wraps_plain_text_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(201).set_body_string("User signed up successfully"))
            .mount(&server)
            .await;

        let response = client_for(&server)
            .send(UpstreamRequest::post("/users").query("action", "signup"))
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::CREATED);
        assert_eq!(response.body, json!({ "msg": "User signed up successfully" }));
    }

    #[tokio::test]
    async fn test_send_reports_transport_failure() {
        let mut config = test_config();
        config.backend_url = "http://127.0.0.1:1".to_string();
        let client = BackendClient::new(&config).unwrap();

        let result = client.send(UpstreamRequest::get("/swearjar")).await;

        assert!(matches!(result, Err(AppError::Upstream(_))));
    }
}
