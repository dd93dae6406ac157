use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use tracing::{debug, instrument};

use super::types::SessionClaims;
use crate::shared::AppError;

/// Verifies backend-issued session tokens against the shared secret.
///
/// Only the signature and claim shape are checked here; expiry is judged by
/// the caller so an expired token still yields its claims.
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Validates a JWT token and returns the claims if the signature holds
    #[instrument(skip(self, token))]
    pub fn verify(&self, token: &str) -> Result<SessionClaims, AppError> {
        debug!("Decoding and validating JWT token");

        decode::<SessionClaims>(token, &self.key, &self.validation)
            .map(|data| {
                debug!(
                    user_id = %data.claims.user_id,
                    exp = data.claims.exp,
                    "JWT token decoded successfully"
                );
                data.claims
            })
            .map_err(|e| {
                debug!(error = %e, "Failed to decode JWT token");
                AppError::Unauthenticated
            })
    }
}
