//! Event bus between the client and whatever renders it.

use std::sync::Arc;

use agenda_domain::{ClientEvent, Notification, SessionState, SessionTrigger};
use tokio::sync::{broadcast, watch};

/// Buffered events per subscriber before the slowest one starts lagging.
const EVENT_CAPACITY: usize = 64;

/// Broadcasts [`ClientEvent`]s and tracks the current [`SessionState`].
///
/// Cloning is cheap; all clones share the same channels.
#[derive(Debug, Clone)]
pub struct EventBus {
    events: broadcast::Sender<ClientEvent>,
    session: Arc<watch::Sender<SessionState>>,
}

impl EventBus {
    /// Creates a bus starting in `initial`.
    #[must_use]
    pub fn new(initial: SessionState) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let (session, _) = watch::channel(initial);
        Self {
            events,
            session: Arc::new(session),
        }
    }

    /// Subscribes to future events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    /// Watches the session state.
    #[must_use]
    pub fn watch_session(&self) -> watch::Receiver<SessionState> {
        self.session.subscribe()
    }

    /// Current session state.
    #[must_use]
    pub fn session_state(&self) -> SessionState {
        *self.session.borrow()
    }

    /// Publishes an event. Dropped silently when nobody listens.
    pub fn publish(&self, event: ClientEvent) {
        let _ = self.events.send(event);
    }

    /// Publishes a notification.
    pub fn notify(&self, notification: Notification) {
        self.publish(ClientEvent::Notify(notification));
    }

    /// Applies `trigger` to the session state machine and returns the new state.
    ///
    /// Publishes [`ClientEvent::SessionChanged`] only when the state changed.
    pub fn transition(&self, trigger: SessionTrigger) -> SessionState {
        let mut reached = None;
        self.session.send_if_modified(|state| {
            let next = state.next(trigger);
            if next == *state {
                return false;
            }
            *state = next;
            reached = Some(next);
            true
        });

        match reached {
            Some(state) => {
                tracing::debug!(?trigger, ?state, "session state changed");
                self.publish(ClientEvent::SessionChanged(state));
                state
            }
            None => self.session_state(),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(SessionState::Unauthenticated)
    }
}
