// Library crate for the SwearJar web gateway
// This file exposes the public API for the binary and integration tests

pub mod auth;
pub mod backend;
pub mod config;
pub mod pages;
pub mod proxy;
pub mod session;
pub mod shared;
pub mod swearjar;
pub mod validation;

use axum::{
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

// Re-export commonly used types for easier access in tests
pub use backend::{BackendClient, QueryCache, Upstream, UpstreamRequest, UpstreamResponse};
pub use config::AppConfig;
pub use session::{Session, SessionService, SessionState};
pub use shared::{AppError, AppState};

/// Browser requests from the gateway's own origin may carry cookies
fn cors_layer(config: &AppConfig) -> Result<CorsLayer, AppError> {
    let origin = HeaderValue::from_str(&config.auth_url)
        .map_err(|e| AppError::Config(format!("AUTH_URL is not a valid origin: {}", e)))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([CONTENT_TYPE]))
}

/// Builds the full router: API routes, session-guarded API routes and page guards
pub fn build_router(state: AppState) -> Result<Router, AppError> {
    let protected_api = Router::new()
        .route("/auth/session", get(session::get_session).post(session::update_session))
        .route(
            "/swearjar",
            get(swearjar::get_swear_jars)
                .post(swearjar::create_swear_jar)
                .put(swearjar::update_swear_jar),
        )
        .route("/swearjar/stats", get(swearjar::get_swear_jar_stats))
        .route("/swearjar/trend", get(swearjar::get_swear_jar_trend))
        .route("/swear", post(swearjar::add_swear))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session::require_session,
        ));

    let api = Router::new()
        .route("/auth/login", post(session::login))
        .route("/auth/signup", post(auth::signup))
        .route("/auth/signOut", post(session::sign_out))
        .route("/auth/email/verify", post(auth::verify_email))
        .route("/auth/token/verify", post(auth::verify_token))
        .route("/auth/password/forgot", post(auth::forgot_password))
        .route("/auth/password/reset", post(auth::reset_password))
        .route("/search/user", get(swearjar::search_users))
        .merge(protected_api);

    let pages = Router::new()
        .route("/", get(pages::home))
        .route("/swearjar/list", get(pages::jar_list_page))
        .route("/swearjar/create", get(pages::jar_create_page))
        .route("/swearjar/:id/view", get(pages::jar_page))
        .route("/swearjar/:id/edit", get(pages::jar_page))
        .route("/onboarding", get(pages::onboarding_page))
        .route("/auth/password/forgot", get(pages::password_page))
        .route("/auth/password/reset", get(pages::password_page));

    let cors = cors_layer(&state.config)?;

    Ok(Router::new()
        .nest("/api", api)
        .merge(pages)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state))
}
