//! Session state machine driven by the refresh coordinator.

use serde::{Deserialize, Serialize};

/// Authentication state of the logical session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// A credential pair is stored and believed valid.
    Authenticated,
    /// The access token expired and a refresh call is in flight.
    RefreshPending,
    /// No usable credentials. Terminal until the next login.
    Unauthenticated,
}

/// Events that move the session between states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionTrigger {
    /// Login or registration produced a new credential pair.
    LoggedIn,
    /// First expired-token 401 of an episode started a refresh.
    RefreshStarted,
    /// The refresh call returned a new credential pair.
    RefreshSucceeded,
    /// The refresh call failed.
    RefreshFailed,
    /// A 401 without expiry marker: the credentials are simply invalid.
    CredentialsRejected,
    /// Explicit logout, or the forced-logout timer fired.
    LoggedOut,
}

impl SessionState {
    /// Returns the state reached from `self` on `trigger`.
    ///
    /// Triggers that do not apply to the current state leave it unchanged.
    #[must_use]
    pub const fn next(self, trigger: SessionTrigger) -> Self {
        match (self, trigger) {
            (_, SessionTrigger::LoggedIn) => Self::Authenticated,
            (_, SessionTrigger::LoggedOut)
            | (Self::RefreshPending, SessionTrigger::RefreshFailed)
            | (
                Self::Authenticated | Self::RefreshPending,
                SessionTrigger::CredentialsRejected,
            ) => Self::Unauthenticated,
            (Self::Authenticated, SessionTrigger::RefreshStarted) => Self::RefreshPending,
            (Self::RefreshPending, SessionTrigger::RefreshSucceeded) => Self::Authenticated,
            (state, _) => state,
        }
    }

    /// Returns true while requests may carry a bearer token.
    #[must_use]
    pub const fn is_authenticated(self) -> bool {
        matches!(self, Self::Authenticated | Self::RefreshPending)
    }

    /// Get a user-friendly message.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Authenticated => "Signed in",
            Self::RefreshPending => "Renewing session...",
            Self::Unauthenticated => "Signed out",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_refresh_round_trip() {
        let state = SessionState::Authenticated.next(SessionTrigger::RefreshStarted);
        assert_eq!(state, SessionState::RefreshPending);
        assert!(state.is_authenticated());

        let state = state.next(SessionTrigger::RefreshSucceeded);
        assert_eq!(state, SessionState::Authenticated);
    }

    #[test]
    fn test_refresh_failure_signs_out() {
        let state = SessionState::RefreshPending.next(SessionTrigger::RefreshFailed);
        assert_eq!(state, SessionState::Unauthenticated);
    }

    #[test]
    fn test_rejected_credentials_sign_out() {
        assert_eq!(
            SessionState::Authenticated.next(SessionTrigger::CredentialsRejected),
            SessionState::Unauthenticated
        );
        assert_eq!(
            SessionState::Authenticated.next(SessionTrigger::LoggedOut),
            SessionState::Unauthenticated
        );
    }

    #[test]
    fn test_unauthenticated_is_terminal_until_login() {
        let state = SessionState::Unauthenticated;
        for trigger in [
            SessionTrigger::RefreshStarted,
            SessionTrigger::RefreshSucceeded,
            SessionTrigger::RefreshFailed,
            SessionTrigger::CredentialsRejected,
            SessionTrigger::LoggedOut,
        ] {
            assert_eq!(state.next(trigger), SessionState::Unauthenticated);
        }
        assert_eq!(
            state.next(SessionTrigger::LoggedIn),
            SessionState::Authenticated
        );
    }

    #[test]
    fn test_stray_triggers_are_ignored() {
        assert_eq!(
            SessionState::Authenticated.next(SessionTrigger::RefreshSucceeded),
            SessionState::Authenticated
        );
        assert_eq!(
            SessionState::RefreshPending.next(SessionTrigger::RefreshStarted),
            SessionState::RefreshPending
        );
    }
}
