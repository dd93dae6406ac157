use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::AppError;

/// JWT claims issued by the backend for a signed-in user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionClaims {
    #[serde(rename = "UserId")]
    pub user_id: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Verified", default)]
    pub verified: bool,
    pub iat: i64, // Issued at timestamp (standard JWT claim)
    pub exp: i64, // Expiration timestamp (standard JWT claim)
}

/// Local representation of an authenticated identity
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub name: String,
    pub verified: bool,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn from_claims(claims: &SessionClaims) -> Result<Self, AppError> {
        let issued_at = DateTime::from_timestamp(claims.iat, 0).ok_or(AppError::Unauthenticated)?;
        let expires_at = DateTime::from_timestamp(claims.exp, 0).ok_or(AppError::Unauthenticated)?;

        Ok(Self {
            user_id: claims.user_id.clone(),
            email: claims.email.clone(),
            name: claims.name.clone(),
            verified: claims.verified,
            issued_at,
            expires_at,
        })
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Overwrites the cached profile fields the backend returned
    pub fn apply_update(&mut self, update: &UserUpdate) {
        if let Some(email) = &update.email {
            self.email = email.clone();
        }
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(verified) = update.verified {
            self.verified = verified;
        }
    }

    pub fn to_response(&self) -> SessionResponse {
        SessionResponse {
            user: SessionUser {
                user_id: self.user_id.clone(),
                email: self.email.clone(),
                name: self.name.clone(),
                verified: self.verified,
            },
            expires: self.expires_at,
        }
    }
}

/// Profile fields returned by the backend's current-user endpoint
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct UserUpdate {
    #[serde(rename = "Email")]
    pub email: Option<String>,
    #[serde(rename = "Name")]
    pub name: Option<String>,
    #[serde(rename = "Verified")]
    pub verified: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionUser {
    #[serde(rename = "UserId")]
    pub user_id: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Verified")]
    pub verified: bool,
}

/// Session as exposed to the browser
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionResponse {
    pub user: SessionUser,
    pub expires: DateTime<Utc>,
}
