//! Clock port for wall-clock timestamps

use chrono::{DateTime, Utc};

/// Port for getting the current time.
///
/// Used to stamp user-visible deadlines such as the forced-logout instant.
/// Timers themselves run on tokio's clock so tests can pause it.
pub trait Clock: Send + Sync {
    /// Returns the current UTC timestamp.
    fn now(&self) -> DateTime<Utc>;
}
