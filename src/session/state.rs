use chrono::{DateTime, Utc};
use strum_macros::IntoStaticStr;
use tracing::debug;

use super::types::{Session, UserUpdate};
use crate::shared::AppError;

/// Where a browser's session stands for the current request
#[derive(Debug, Clone, PartialEq, IntoStaticStr)]
pub enum SessionState {
    Anonymous,
    Authenticating,
    Authenticated(Session),
    Expired(Session),
}

impl SessionState {
    /// Classifies a verified session against the clock
    pub fn from_session(session: Session, now: DateTime<Utc>) -> Self {
        SessionState::Authenticated(session).check_expiry(now)
    }

    pub fn name(&self) -> &'static str {
        self.into()
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::Authenticated(session) | SessionState::Expired(session) => Some(session),
            _ => None,
        }
    }

    pub fn submit_credentials(self) -> Result<Self, AppError> {
        match self {
            SessionState::Anonymous => Ok(self.moved_to(SessionState::Authenticating)),
            other => Err(other.rejected("submit credentials")),
        }
    }

    pub fn accept(self, session: Session) -> Result<Self, AppError> {
        match self {
            SessionState::Authenticating => Ok(self.moved_to(SessionState::Authenticated(session))),
            other => Err(other.rejected("accept credentials")),
        }
    }

    pub fn reject(self) -> Result<Self, AppError> {
        match self {
            SessionState::Authenticating => Ok(self.moved_to(SessionState::Anonymous)),
            other => Err(other.rejected("reject credentials")),
        }
    }

    /// Authenticated sessions whose `exp` has passed become Expired; others are unchanged
    pub fn check_expiry(self, now: DateTime<Utc>) -> Self {
        match self {
            SessionState::Authenticated(session) if session.is_expired_at(now) => {
                debug!(user_id = %session.user_id, "Session token has expired");
                SessionState::Expired(session)
            }
            other => other,
        }
    }

    /// Applies refreshed profile fields in place
    pub fn refresh(self, update: &UserUpdate) -> Result<Self, AppError> {
        match self {
            SessionState::Authenticated(ref session) => {
                let mut session = session.clone();
                session.apply_update(update);
                Ok(self.moved_to(SessionState::Authenticated(session)))
            }
            other => Err(other.rejected("refresh")),
        }
    }

    /// Replaces the session wholesale after the backend reissued the token
    pub fn reauthenticate(self, session: Session) -> Result<Self, AppError> {
        match self {
            SessionState::Authenticated(_) => Ok(self.moved_to(SessionState::Authenticated(session))),
            other => Err(other.rejected("refresh")),
        }
    }

    pub fn sign_out(self) -> Result<Self, AppError> {
        match self {
            SessionState::Anonymous
            | SessionState::Authenticated(_)
            | SessionState::Expired(_) => Ok(self.moved_to(SessionState::Anonymous)),
            other => Err(other.rejected("sign out")),
        }
    }

    fn moved_to(self, next: SessionState) -> SessionState {
        debug!(from = self.name(), to = next.name(), "Session state transition");
        next
    }

    fn rejected(&self, action: &str) -> AppError {
        AppError::InvalidTransition(format!("cannot {} while {}", action, self.name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn session(expires_in: Duration) -> Session {
        let now = Utc::now();
        Session {
            user_id: "u1".to_string(),
            email: "a@b.com".to_string(),
            name: "Alice".to_string(),
            verified: false,
            issued_at: now,
            expires_at: now + expires_in,
        }
    }

    #[test]
    fn test_login_success_path() {
        let state = SessionState::Anonymous
            .submit_credentials()
            .unwrap()
            .accept(session(Duration::minutes(5)))
            .unwrap();

        assert!(matches!(state, SessionState::Authenticated(_)));
        assert_eq!(state.session().unwrap().user_id, "u1");
    }

    #[test]
    fn test_login_failure_returns_to_anonymous() {
        let state = SessionState::Anonymous
            .submit_credentials()
            .unwrap()
            .reject()
            .unwrap();

        assert_eq!(state, SessionState::Anonymous);
    }

    #[test]
    fn test_cannot_accept_without_authenticating() {
        let result = SessionState::Anonymous.accept(session(Duration::minutes(5)));

        assert!(matches!(result, Err(AppError::InvalidTransition(msg)) if msg.contains("Anonymous")));
    }

    #[test]
    fn test_cannot_resubmit_while_authenticated() {
        let state = SessionState::Authenticated(session(Duration::minutes(5)));

        assert!(state.submit_credentials().is_err());
    }

    #[test]
    fn test_expiry_moves_authenticated_to_expired() {
        let state = SessionState::from_session(session(Duration::minutes(-1)), Utc::now());
        assert!(matches!(state, SessionState::Expired(_)));

        let state = SessionState::from_session(session(Duration::minutes(1)), Utc::now());
        assert!(matches!(state, SessionState::Authenticated(_)));
    }

    #[test]
    fn test_expired_signs_out_to_anonymous() {
        let state = SessionState::Expired(session(Duration::minutes(-1)));

        assert_eq!(state.sign_out().unwrap(), SessionState::Anonymous);
    }

    #[test]
    fn test_refresh_keeps_authenticated() {
        let state = SessionState::Authenticated(session(Duration::minutes(5)));
        let update = UserUpdate {
            email: Some("new@b.com".to_string()),
            name: None,
            verified: Some(true),
        };

        let refreshed = state.refresh(&update).unwrap();
        let refreshed_session = refreshed.session().unwrap();
        assert!(matches!(refreshed, SessionState::Authenticated(_)));
        assert_eq!(refreshed_session.email, "new@b.com");
        assert_eq!(refreshed_session.name, "Alice");
        assert!(refreshed_session.verified);
    }

    #[test]
    fn test_reauthenticate_replaces_session() {
        let state = SessionState::Authenticated(session(Duration::minutes(5)));
        let mut fresh = session(Duration::minutes(60));
        fresh.verified = true;

        let next = state.reauthenticate(fresh.clone()).unwrap();

        assert_eq!(next, SessionState::Authenticated(fresh));
        assert!(SessionState::Anonymous.reauthenticate(session(Duration::minutes(5))).is_err());
    }

    #[test]
    fn test_refresh_rejected_when_expired() {
        let state = SessionState::Expired(session(Duration::minutes(-1)));

        assert!(state.refresh(&UserUpdate::default()).is_err());
    }

    #[test]
    fn test_sign_out_rejected_mid_login() {
        assert!(SessionState::Authenticating.sign_out().is_err());
    }
}
