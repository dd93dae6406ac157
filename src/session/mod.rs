// Public API - what other modules can use
pub use cookies::{
    append_set_cookies, forwarded_cookie_header, request_cookie, CookiePolicy, CSRF_COOKIE,
    CSRF_HTTP_ONLY_COOKIE, JWT_COOKIE, PROFILE_COOKIE,
};
pub use handlers::{get_session, login, sign_out, update_session};
pub use middleware::require_session;
pub use profile::ProfileSigner;
pub use service::{SessionOutcome, SessionService};
pub use state::SessionState;
pub use token::TokenVerifier;
pub use types::{Session, SessionClaims, SessionResponse, SessionUser, UserUpdate};

// Internal modules
mod cookies;
mod handlers;
mod middleware;
mod profile;
mod service;
mod state;
mod token;
mod types;
