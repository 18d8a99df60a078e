//! Events published by the client for the presentation layer.
//!
//! The transport never renders anything itself; it emits these and a
//! front end decides how to show them.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::SessionState;

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    /// An operation completed.
    Success,
    /// Neutral information.
    Info,
    /// Needs the user's attention.
    Warning,
    /// An operation failed.
    Error,
}

/// A message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Severity.
    pub level: NotificationLevel,
    /// Text to display.
    pub message: String,
    /// How long to keep it on screen. `None` means until the user dismisses it.
    pub duration: Option<Duration>,
}

impl Notification {
    /// Default display time of transient notifications.
    pub const DEFAULT_DURATION: Duration = Duration::from_secs(5);

    /// A transient success notification.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
            duration: Some(Self::DEFAULT_DURATION),
        }
    }

    /// A transient error notification.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
            duration: Some(Self::DEFAULT_DURATION),
        }
    }

    /// A warning that stays until dismissed.
    #[must_use]
    pub fn persistent_warning(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Warning,
            message: message.into(),
            duration: None,
        }
    }

    /// Returns true if the notification expires on its own.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        self.duration.is_some()
    }
}

/// Everything the client publishes on its event bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// Show a notification.
    Notify(Notification),
    /// The session moved to a new state.
    SessionChanged(SessionState),
    /// Credentials will be cleared at `at`.
    LogoutScheduled {
        /// When the forced logout fires.
        at: DateTime<Utc>,
    },
    /// Credentials were cleared; navigate to the login screen.
    RedirectToLogin,
}
