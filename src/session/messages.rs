use crate::identity::AuthErrorCode;

pub const SIGN_IN_CANCELLED: &str = "Sign-in was cancelled. Please try again.";
pub const POPUP_BLOCKED: &str = "Google sign-in popup was blocked by your browser. Please allow pop-ups for this site and try again.";
pub const SIGN_IN_REQUEST_CANCELLED: &str = "Sign-in request was cancelled. Please try again.";
pub const GOOGLE_SIGN_IN_FAILED: &str = "Google sign-in failed. Please try again.";

/// User-facing message for a failed Google sign-in.
#[must_use]
pub fn google_failure_message(code: AuthErrorCode) -> &'static str {
    match code {
        AuthErrorCode::PopupClosedByUser => SIGN_IN_CANCELLED,
        AuthErrorCode::PopupBlocked => POPUP_BLOCKED,
        AuthErrorCode::CancelledPopupRequest => SIGN_IN_REQUEST_CANCELLED,
        _ => GOOGLE_SIGN_IN_FAILED,
    }
}
