use std::fmt;
use thiserror::Error;

/// Provider error conditions, named by their `auth/*` code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AuthErrorCode {
    InvalidCredential,
    UserNotFound,
    WrongPassword,
    UserDisabled,
    EmailAlreadyInUse,
    WeakPassword,
    InvalidEmail,
    TooManyRequests,
    OperationNotAllowed,
    UserTokenExpired,
    NoCurrentUser,
    InvalidApiKey,
    NetworkRequestFailed,
    PopupClosedByUser,
    PopupBlocked,
    CancelledPopupRequest,
    RedirectCancelledByUser,
    Internal,
}

impl AuthErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidCredential => "auth/invalid-credential",
            Self::UserNotFound => "auth/user-not-found",
            Self::WrongPassword => "auth/wrong-password",
            Self::UserDisabled => "auth/user-disabled",
            Self::EmailAlreadyInUse => "auth/email-already-in-use",
            Self::WeakPassword => "auth/weak-password",
            Self::InvalidEmail => "auth/invalid-email",
            Self::TooManyRequests => "auth/too-many-requests",
            Self::OperationNotAllowed => "auth/operation-not-allowed",
            Self::UserTokenExpired => "auth/user-token-expired",
            Self::NoCurrentUser => "auth/no-current-user",
            Self::InvalidApiKey => "auth/invalid-api-key",
            Self::NetworkRequestFailed => "auth/network-request-failed",
            Self::PopupClosedByUser => "auth/popup-closed-by-user",
            Self::PopupBlocked => "auth/popup-blocked",
            Self::CancelledPopupRequest => "auth/cancelled-popup-request",
            Self::RedirectCancelledByUser => "auth/redirect-cancelled-by-user",
            Self::Internal => "auth/internal-error",
        }
    }

    /// Maps an Identity Toolkit error message (`CODE` or `CODE : detail`).
    #[must_use]
    pub fn from_toolkit_message(message: &str) -> Self {
        if message.starts_with("API key not valid") {
            return Self::InvalidApiKey;
        }

        let code = message.split(':').next().unwrap_or_default().trim();

        match code {
            "EMAIL_NOT_FOUND" => Self::UserNotFound,
            "INVALID_PASSWORD" => Self::WrongPassword,
            "INVALID_LOGIN_CREDENTIALS" | "INVALID_IDP_RESPONSE" => Self::InvalidCredential,
            "USER_DISABLED" => Self::UserDisabled,
            "EMAIL_EXISTS" => Self::EmailAlreadyInUse,
            "WEAK_PASSWORD" => Self::WeakPassword,
            "INVALID_EMAIL" => Self::InvalidEmail,
            "TOO_MANY_ATTEMPTS_TRY_LATER" => Self::TooManyRequests,
            "OPERATION_NOT_ALLOWED" => Self::OperationNotAllowed,
            "INVALID_ID_TOKEN" | "TOKEN_EXPIRED" => Self::UserTokenExpired,
            _ => Self::Internal,
        }
    }
}

impl fmt::Display for AuthErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed provider call.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct ProviderError {
    pub code: AuthErrorCode,
    pub message: String,
}

impl ProviderError {
    pub fn new(code: AuthErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn from_toolkit_message(message: &str) -> Self {
        Self::new(AuthErrorCode::from_toolkit_message(message), message)
    }

    #[must_use]
    pub fn network(err: &reqwest::Error) -> Self {
        Self::new(AuthErrorCode::NetworkRequestFailed, err.to_string())
    }

    #[must_use]
    pub fn internal(err: impl fmt::Display) -> Self {
        Self::new(AuthErrorCode::Internal, err.to_string())
    }
}
