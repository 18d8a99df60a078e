//! Terminal rendering of client events.

use agenda_domain::{ClientEvent, NotificationLevel};
use tokio::sync::broadcast;

/// Prints events to stderr until the bus closes.
pub async fn render_events(mut events: broadcast::Receiver<ClientEvent>) {
    loop {
        match events.recv().await {
            Ok(event) => render(&event),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "event renderer lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

fn render(event: &ClientEvent) {
    match event {
        ClientEvent::Notify(notification) => {
            let tag = match notification.level {
                NotificationLevel::Success => "ok",
                NotificationLevel::Info => "info",
                NotificationLevel::Warning => "warning",
                NotificationLevel::Error => "error",
            };
            eprintln!("[{tag}] {}", notification.message);
        }
        ClientEvent::SessionChanged(state) => {
            tracing::info!(?state, "{}", state.message());
        }
        ClientEvent::LogoutScheduled { at } => {
            eprintln!("[warning] signing out at {}", at.format("%H:%M:%S"));
        }
        ClientEvent::RedirectToLogin => {
            eprintln!("Session ended. Run `agenda login` to sign in again.");
        }
    }
}

/// Waits until the forced logout fires.
pub async fn wait_for_redirect(mut events: broadcast::Receiver<ClientEvent>) {
    loop {
        match events.recv().await {
            Ok(ClientEvent::RedirectToLogin) | Err(broadcast::error::RecvError::Closed) => break,
            _ => {}
        }
    }
}
