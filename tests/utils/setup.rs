use axum::Router;
use std::sync::Arc;
use wiremock::MockServer;

use swearjar_gateway::{build_router, AppConfig, AppState, BackendClient};

pub const TEST_SECRET: &str = "integration-secret";
pub const AUTH_URL: &str = "https://swearjar.test";

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    /// Stands in for the swear jar backend
    pub backend: MockServer,
    pub app: Router,
}

pub struct TestSetupBuilder {
    cache_ttl_seconds: u64,
    expiration_minutes: i64,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            cache_ttl_seconds: 30,
            expiration_minutes: 60,
        }
    }

    pub fn without_cache(mut self) -> Self {
        self.cache_ttl_seconds = 0;
        self
    }

    pub fn with_expiration_minutes(mut self, minutes: i64) -> Self {
        self.expiration_minutes = minutes;
        self
    }

    pub async fn build(self) -> TestSetup {
        let backend = MockServer::start().await;

        let backend_url = backend.uri();
        let cache_ttl = self.cache_ttl_seconds.to_string();
        let expiration = self.expiration_minutes.to_string();
        let config = AppConfig::from_lookup(|key| match key {
            "BACKEND_URL" => Some(backend_url.clone()),
            "AUTH_URL" => Some(AUTH_URL.to_string()),
            "JWT_SECRET" => Some(TEST_SECRET.to_string()),
            "JWT_EXPIRATION_TIME" => Some(expiration.clone()),
            "QUERY_CACHE_TTL_SECONDS" => Some(cache_ttl.clone()),
            _ => None,
        })
        .unwrap();

        let client = Arc::new(BackendClient::new(&config).unwrap());
        let app = build_router(AppState::new(config, client)).unwrap();

        TestSetup { backend, app }
    }
}

impl Default for TestSetupBuilder {
    fn default() -> Self {
        Self::new()
    }
}
