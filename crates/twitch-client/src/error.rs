//! Error types for the client library.

use thiserror::Error;

use twitch_common::CredentialError;

/// Errors that can occur while obtaining tokens or calling the Helix API.
///
/// Token lifecycle failures (`ConfigurationError`, `AuthenticationError`,
/// `TokenRefreshError`) are kept apart from failures of the wrapped API call
/// (`RateLimitError`, `ApiError`) so callers can tell a dead session from a
/// rejected request.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// Network or HTTP transport failure, including the per-request timeout.
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON serialization or deserialization error.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Credentials could not be resolved, or the client could not be built.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// The provider would not accept or issue a token.
    ///
    /// Raised when validation fails for a reason other than an invalid token,
    /// when an app token cannot be obtained, or when a refresh is attempted
    /// before any token exists.
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The provider rejected the refresh token.
    ///
    /// The previously cached token state is left untouched.
    #[error("Token refresh failed: {0}")]
    TokenRefreshError(String),

    /// Rate limit exceeded (HTTP 429).
    ///
    /// Never retried by this crate; backing off is the caller's job.
    #[error("[429] Rate Limited: Rate limit exceeded")]
    RateLimitError {
        /// Value of the `Ratelimit-Reset` response header, if present and numeric.
        retry_after: Option<u64>,
    },

    /// Any other non-success response from the API.
    #[error("{}", format_api_error(*.status, .message, .error.as_deref()))]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// The `message` field of the error body, or the raw body text.
        message: String,
        /// The provider's `error` field, if the body carried one.
        error: Option<String>,
    },

    /// The request could not be built from the given arguments.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

fn format_api_error(status: u16, message: &str, error: Option<&str>) -> String {
    match error {
        Some(error) => format!("[{status}] {error}: {message}"),
        None => format!("[{status}] {message}"),
    }
}

impl From<CredentialError> for ClientError {
    fn from(err: CredentialError) -> Self {
        Self::ConfigurationError(err.to_string())
    }
}

impl ClientError {
    /// Check if this error means the session's tokens are unusable.
    pub const fn is_authentication_error(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationError(_) | Self::TokenRefreshError(_) | Self::ConfigurationError(_)
        )
    }

    /// Check if this is a rate limit error.
    pub const fn is_rate_limit_error(&self) -> bool {
        matches!(self, Self::RateLimitError { .. })
    }

    /// Get the `Ratelimit-Reset` hint if this is a rate limit error.
    pub const fn retry_after(&self) -> Option<u64> {
        match self {
            Self::RateLimitError { retry_after } => *retry_after,
            _ => None,
        }
    }

    /// HTTP status of a failed API call.
    ///
    /// Rate limit errors report 429. Token lifecycle and transport errors
    /// return `None`.
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::RateLimitError { .. } => Some(429),
            Self::ApiError { status, .. } => Some(*status),
            _ => None,
        }
    }
}
