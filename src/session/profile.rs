use axum::http::HeaderMap;
use cookie::time::OffsetDateTime;
use cookie::{Cookie, CookieJar, Key};
use std::collections::HashMap;
use std::iter;
use tracing::{debug, warn};
use url::form_urlencoded;

use super::cookies::{request_cookie, CookiePolicy, PROFILE_COOKIE};
use super::types::{Session, UserUpdate};

const KEY_LEN: usize = 64;

/// Signs and verifies the profile overlay the update trigger leaves behind.
///
/// The overlay is bound to the `UserId` and `iat` of the token it was written
/// against, so it never outlives that token or leaks onto another account.
#[derive(Clone)]
pub struct ProfileSigner {
    key: Key,
}

impl ProfileSigner {
    pub fn new(secret: &str) -> Self {
        let material: Vec<u8> = secret
            .bytes()
            .cycle()
            .chain(iter::repeat(0))
            .take(KEY_LEN.max(secret.len()))
            .collect();

        Self {
            key: Key::from(material.as_slice()),
        }
    }

    /// Signed cookie carrying the session's current profile fields
    pub fn seal(&self, session: &Session, policy: &CookiePolicy) -> Cookie<'static> {
        let payload = form_urlencoded::Serializer::new(String::new())
            .append_pair("UserId", &session.user_id)
            .append_pair("iat", &session.issued_at.timestamp().to_string())
            .append_pair("Email", &session.email)
            .append_pair("Name", &session.name)
            .append_pair("Verified", &session.verified.to_string())
            .finish();

        let mut jar = CookieJar::new();
        jar.signed_mut(&self.key)
            .add(Cookie::new(PROFILE_COOKIE, payload));
        let signed = jar
            .get(PROFILE_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .unwrap_or_default();

        let expires = OffsetDateTime::from_unix_timestamp(session.expires_at.timestamp()).ok();
        policy.issue(PROFILE_COOKIE, &signed, expires)
    }

    /// Profile fields from a verified overlay written for this very session
    pub fn open(&self, headers: &HeaderMap, session: &Session) -> Option<UserUpdate> {
        let raw = request_cookie(headers, PROFILE_COOKIE)?;

        let mut jar = CookieJar::new();
        jar.add_original(Cookie::new(PROFILE_COOKIE, raw));
        let Some(verified) = jar.signed(&self.key).get(PROFILE_COOKIE) else {
            warn!(user_id = %session.user_id, "Ignoring profile cookie with a bad signature");
            return None;
        };

        let fields: HashMap<String, String> = form_urlencoded::parse(verified.value().as_bytes())
            .into_owned()
            .collect();

        let bound_to_session = fields.get("UserId") == Some(&session.user_id)
            && fields.get("iat") == Some(&session.issued_at.timestamp().to_string());
        if !bound_to_session {
            debug!(user_id = %session.user_id, "Profile cookie belongs to another token");
            return None;
        }

        Some(UserUpdate {
            email: fields.get("Email").cloned(),
            name: fields.get("Name").cloned(),
            verified: fields.get("Verified").and_then(|value| value.parse().ok()),
        })
    }
}
