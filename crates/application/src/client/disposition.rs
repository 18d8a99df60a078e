//! What to do with a response once it arrives.

use agenda_domain::{ApiRequest, ApiResponse};

/// Outcome of inspecting a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Hand the response to the caller.
    Deliver,
    /// The access token expired: refresh and replay once.
    Refresh,
    /// The credentials were rejected outright: sign the user out.
    ForceLogout,
    /// Fail the call. `notify` is false on the authentication boundary.
    Fail {
        /// Whether to publish the user-facing error message.
        notify: bool,
    },
}

impl Disposition {
    /// Decides how `response` to `request` is handled.
    ///
    /// Calls under `/auth/` never refresh, and a replay that fails again
    /// takes the ordinary error path.
    #[must_use]
    pub fn of(request: &ApiRequest, response: &ApiResponse) -> Self {
        if response.is_success() {
            return Self::Deliver;
        }
        if request.is_auth_boundary() {
            return Self::Fail { notify: false };
        }
        if response.status == 401 && !request.is_retry() {
            return if response.error_body().is_token_expired() {
                Self::Refresh
            } else {
                Self::ForceLogout
            };
        }
        Self::Fail { notify: true }
    }
}
