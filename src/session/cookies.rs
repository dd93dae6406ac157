use axum::http::{
    header::{COOKIE, SET_COOKIE},
    HeaderMap, HeaderValue,
};
use cookie::time::{Duration, OffsetDateTime};
use cookie::{Cookie, Expiration, SameSite};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

pub const JWT_COOKIE: &str = "jwt";
pub const CSRF_HTTP_ONLY_COOKIE: &str = "csrf_token_http_only";
pub const CSRF_COOKIE: &str = "csrf_token";
/// Gateway-owned, signed overlay of refreshed profile fields
pub const PROFILE_COOKIE: &str = "session_profile";

// A comma only separates two cookies when a `name=` follows it; `Expires`
// dates carry commas of their own.
static COOKIE_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*[\w-]+=").expect("cookie boundary pattern is valid"));

/// Splits one possibly-combined `Set-Cookie` value into individual assignments
pub fn split_set_cookie(value: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;

    for boundary in COOKIE_BOUNDARY.find_iter(value) {
        parts.push(&value[start..boundary.start()]);
        start = boundary.start() + 1;
    }
    parts.push(&value[start..]);

    parts
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect()
}

/// Parses raw `Set-Cookie` header values, skipping anything malformed
pub fn parse_set_cookies(values: &[String]) -> Vec<Cookie<'static>> {
    values
        .iter()
        .flat_map(|value| split_set_cookie(value))
        .filter_map(|raw| match Cookie::parse(raw.to_string()) {
            Ok(cookie) => Some(cookie),
            Err(e) => {
                warn!(error = %e, "Skipping malformed Set-Cookie value");
                None
            }
        })
        .collect()
}

fn is_http_only(name: &str) -> bool {
    name == JWT_COOKIE || name == CSRF_HTTP_ONLY_COOKIE || name == PROFILE_COOKIE
}

/// Attributes the gateway applies when re-emitting backend cookies
#[derive(Debug, Clone)]
pub struct CookiePolicy {
    lifetime: Duration,
}

impl CookiePolicy {
    pub fn new(lifetime_minutes: i64) -> Self {
        Self {
            lifetime: Duration::seconds(lifetime_minutes.saturating_mul(60)),
        }
    }

    /// Now plus the configured lifetime, or a browser-session cookie if that overflows
    fn default_expiry(&self) -> Expiration {
        match OffsetDateTime::now_utc().checked_add(self.lifetime) {
            Some(at) => Expiration::DateTime(at),
            None => {
                warn!("Cookie lifetime overflows the calendar, issuing a session cookie");
                Expiration::Session
            }
        }
    }

    /// Builds a cookie with the gateway's attributes, expiring at `expires` or after the configured lifetime
    pub fn issue(&self, name: &str, value: &str, expires: Option<OffsetDateTime>) -> Cookie<'static> {
        let expires = expires.map_or_else(|| self.default_expiry(), Expiration::DateTime);

        Cookie::build((name.to_string(), value.to_string()))
            .path("/")
            .http_only(is_http_only(name))
            .secure(true)
            .same_site(SameSite::None)
            .expires(expires)
            .build()
    }

    /// Rebuilds a backend cookie with the gateway's attributes.
    /// The backend's `Expires` is kept; otherwise the configured lifetime applies.
    pub fn reissue(&self, cookie: &Cookie<'_>) -> Cookie<'static> {
        let expires = match cookie.expires() {
            Some(Expiration::DateTime(at)) => Some(at),
            _ => None,
        };

        self.issue(cookie.name(), cookie.value(), expires)
    }

    pub fn reissue_all(&self, set_cookie_values: &[String]) -> Vec<Cookie<'static>> {
        let cookies: Vec<Cookie<'static>> = parse_set_cookies(set_cookie_values)
            .iter()
            .map(|cookie| self.reissue(cookie))
            .collect();

        debug!(
            cookies = ?cookies.iter().map(|c| c.name()).collect::<Vec<_>>(),
            "Re-emitting backend cookies"
        );
        cookies
    }

    /// A cookie that makes the browser drop `name` immediately
    pub fn expired(&self, name: &str) -> Cookie<'static> {
        Cookie::build((name.to_string(), String::new()))
            .path("/")
            .http_only(is_http_only(name))
            .expires(OffsetDateTime::UNIX_EPOCH)
            .build()
    }
}

/// Looks up one cookie from the request `Cookie` header(s)
pub fn request_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    request_cookies(headers)
        .into_iter()
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_string())
}

fn request_cookies(headers: &HeaderMap) -> Vec<Cookie<'static>> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| Cookie::split_parse(value.to_string()))
        .filter_map(Result::ok)
        .collect()
}

/// Rebuilds the browser's cookies as a single header value for the backend.
/// The gateway's own profile cookie stays behind.
pub fn forwarded_cookie_header(headers: &HeaderMap) -> Option<String> {
    let joined = request_cookies(headers)
        .iter()
        .filter(|cookie| cookie.name() != PROFILE_COOKIE)
        .map(|cookie| format!("{}={}", cookie.name(), cookie.value()))
        .collect::<Vec<_>>()
        .join("; ");

    (!joined.is_empty()).then_some(joined)
}

pub fn append_set_cookies(headers: &mut HeaderMap, cookies: &[Cookie<'static>]) {
    for cookie in cookies {
        match HeaderValue::from_str(&cookie.to_string()) {
            Ok(value) => {
                headers.append(SET_COOKIE, value);
            }
            Err(e) => warn!(name = %cookie.name(), error = %e, "Dropping cookie with invalid header value"),
        }
    }
}
