use std::time::Duration;
use tracing::{debug, warn};

use crate::shared::AppError;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_JWT_EXPIRATION_MINUTES: i64 = 60;
const DEFAULT_QUERY_CACHE_TTL_SECONDS: u64 = 30;
// One year
const MAX_JWT_EXPIRATION_MINUTES: i64 = 525_600;

/// Runtime configuration read from the process environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the swear jar backend, without a trailing slash
    pub backend_url: String,
    /// Public origin of this gateway, sent to the backend as `Origin`
    pub auth_url: String,
    /// Shared HS256 secret the backend signs session tokens with
    pub jwt_secret: String,
    /// Cookie lifetime applied when the backend omits `Expires`
    pub jwt_expiration_minutes: i64,
    pub production: bool,
    pub bind_addr: String,
    pub query_cache_ttl: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, so tests need not touch the process env
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| AppError::Config(format!("{} must be set", key)))
        };

        let backend_url = required("BACKEND_URL")?.trim_end_matches('/').to_string();
        let auth_url = required("AUTH_URL")?.trim_end_matches('/').to_string();
        let jwt_secret = required("JWT_SECRET")?;

        let jwt_expiration_minutes = match lookup("JWT_EXPIRATION_TIME") {
            Some(raw) => {
                let minutes = raw.trim().parse::<i64>().map_err(|_| {
                    AppError::Config(format!("JWT_EXPIRATION_TIME is not a number: {}", raw))
                })?;
                if !(1..=MAX_JWT_EXPIRATION_MINUTES).contains(&minutes) {
                    return Err(AppError::Config(format!(
                        "JWT_EXPIRATION_TIME must be between 1 and {} minutes, got {}",
                        MAX_JWT_EXPIRATION_MINUTES, minutes
                    )));
                }
                minutes
            }
            None => {
                warn!(
                    default = DEFAULT_JWT_EXPIRATION_MINUTES,
                    "JWT_EXPIRATION_TIME not set, using default"
                );
                DEFAULT_JWT_EXPIRATION_MINUTES
            }
        };

        let production = lookup("PRODUCTION_ENV")
            .map(|value| matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true"))
            .unwrap_or(false)
            || lookup("NODE_ENV").is_some_and(|value| value.trim() == "production");

        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let query_cache_ttl = match lookup("QUERY_CACHE_TTL_SECONDS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                AppError::Config(format!("QUERY_CACHE_TTL_SECONDS is not a number: {}", raw))
            })?,
            None => DEFAULT_QUERY_CACHE_TTL_SECONDS,
        };

        debug!(
            backend_url = %backend_url,
            auth_url = %auth_url,
            jwt_expiration_minutes,
            production,
            query_cache_ttl_seconds = query_cache_ttl,
            "Loaded configuration"
        );

        Ok(Self {
            backend_url,
            auth_url,
            jwt_secret,
            jwt_expiration_minutes,
            production,
            bind_addr,
            query_cache_ttl: Duration::from_secs(query_cache_ttl),
        })
    }
}
