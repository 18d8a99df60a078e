//! Delayed sign-out after an unrecoverable authentication failure.

use std::sync::Arc;
use std::time::Duration;

use agenda_domain::{ClientEvent, Notification, SessionTrigger, messages};
use chrono::TimeDelta;
use parking_lot::Mutex;
use tokio::task::JoinHandle;

use super::TokenStore;
use crate::events::EventBus;
use crate::ports::Clock;

/// Warns the user, waits out a grace period, then drops the session.
///
/// At most one timer is pending. A successful login cancels it.
pub struct ForcedLogout {
    tokens: TokenStore,
    events: EventBus,
    clock: Arc<dyn Clock>,
    grace: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for ForcedLogout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForcedLogout")
            .field("grace", &self.grace)
            .field("pending", &self.is_pending())
            .finish_non_exhaustive()
    }
}

impl ForcedLogout {
    /// Creates a timer that fires `grace` after being scheduled.
    #[must_use]
    pub fn new(tokens: TokenStore, events: EventBus, clock: Arc<dyn Clock>, grace: Duration) -> Self {
        Self {
            tokens,
            events,
            clock,
            grace,
            pending: Mutex::new(None),
        }
    }

    /// Grace period between the warning and the sign-out.
    #[must_use]
    pub const fn grace(&self) -> Duration {
        self.grace
    }

    /// Returns true while a sign-out is scheduled and has not fired yet.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Schedules the sign-out. Returns false if one is already pending.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn schedule(&self) -> bool {
        let mut pending = self.pending.lock();
        if pending.as_ref().is_some_and(|handle| !handle.is_finished()) {
            tracing::debug!("forced logout already scheduled");
            return false;
        }

        let at = self.clock.now() + TimeDelta::from_std(self.grace).unwrap_or_default();
        tracing::warn!(grace_secs = self.grace.as_secs(), %at, "scheduling forced logout");

        self.events.notify(Notification::persistent_warning(
            messages::forced_logout_warning(self.grace.as_secs()),
        ));
        self.events.publish(ClientEvent::LogoutScheduled { at });

        let tokens = self.tokens.clone();
        let events = self.events.clone();
        let grace = self.grace;
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            if let Err(e) = tokens.clear().await {
                tracing::error!(error = %e, "failed to clear stored credentials");
            }
            tracing::info!("forced logout fired");
            events.transition(SessionTrigger::LoggedOut);
            events.publish(ClientEvent::RedirectToLogin);
        }));
        true
    }

    /// Cancels a pending sign-out. Returns true if one was pending.
    ///
    /// Waits for the timer task to stop so it cannot clear credentials
    /// written after this returns.
    pub async fn cancel(&self) -> bool {
        let Some(handle) = self.pending.lock().take() else {
            return false;
        };
        if handle.is_finished() {
            return false;
        }
        handle.abort();
        let _ = handle.await;
        tracing::info!("forced logout cancelled");
        true
    }
}
