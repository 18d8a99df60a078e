//! User-facing messages for failed calls.
//!
//! Static table keyed by status code; the presentation layer shows these
//! instead of raw server errors.

use crate::response::ErrorBody;

/// Fallback for unlisted status codes.
pub const GENERIC_ERROR: &str = "An error occurred. Please try again.";
/// The request hit the client deadline.
pub const TIMEOUT_ERROR: &str =
    "The server took too long to respond. Check your connection and try again.";
/// No response at all: DNS, refused connection, offline.
pub const UNREACHABLE_ERROR: &str =
    "Unable to reach the server. Check your internet connection.";

/// Returns the message for `status`.
#[must_use]
pub const fn status_message(status: u16) -> &'static str {
    match status {
        400 => "Invalid request. Please review the information provided.",
        401 => "Your session is not authorized. Please sign in again.",
        403 => "You do not have permission to perform this action.",
        404 => "The requested resource was not found.",
        422 => "Some fields are invalid. Please review the form.",
        429 => "Too many requests. Please wait a moment and try again.",
        500 => "Internal server error. Please try again later.",
        503 => "Service temporarily unavailable. Please try again later.",
        _ => GENERIC_ERROR,
    }
}

/// Message for a failed response, flattening validation errors on 422.
#[must_use]
pub fn error_message(status: u16, body: &ErrorBody) -> String {
    if status == 422
        && let Some(details) = body.joined_field_errors().or_else(|| body.message.clone())
    {
        return details;
    }
    status_message(status).to_string()
}

/// Warning shown when the session cannot be recovered.
#[must_use]
pub fn forced_logout_warning(seconds: u64) -> String {
    format!(
        "Your session has expired. You will be redirected to the login page in {seconds} seconds."
    )
}
