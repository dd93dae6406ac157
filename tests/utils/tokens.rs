#![allow(dead_code)] // Test utilities may not all be used in every test

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use swearjar_gateway::session::SessionClaims;

use super::setup::TEST_SECRET;

/// Signs a token the way the backend does
pub fn backend_token(user_id: &str, email: &str, name: &str, verified: bool, lifetime: Duration) -> String {
    let now = Utc::now();
    let claims = SessionClaims {
        user_id: user_id.to_string(),
        email: email.to_string(),
        name: name.to_string(),
        verified,
        iat: now.timestamp(),
        exp: (now + lifetime).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap()
}

pub fn valid_token(user_id: &str) -> String {
    backend_token(user_id, &format!("{}@b.com", user_id), "Test User", true, Duration::minutes(30))
}

pub fn expired_token(user_id: &str) -> String {
    backend_token(user_id, &format!("{}@b.com", user_id), "Test User", true, Duration::minutes(-5))
}

pub fn decode_claims(token: &str) -> SessionClaims {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    decode::<SessionClaims>(token, &DecodingKey::from_secret(TEST_SECRET.as_bytes()), &validation)
        .unwrap()
        .claims
}

pub fn cookie_header(token: &str) -> String {
    format!("jwt={}; csrf_token=csrf-1; csrf_token_http_only=csrf-1", token)
}
