//! Twitch OAuth token management.
//!
//! This module provides [`TokenManager`], which hides the validate/refresh
//! protocol behind a single "give me a valid token" call.
//!
//! # Token lifecycle
//!
//! 1. The first request builds a [`TokenState`] from the configured
//!    credentials and validates it, learning the real expiry and scopes.
//! 2. Later requests reuse the cached token until it comes within
//!    [`REFRESH_MARGIN_SECS`](twitch_common::REFRESH_MARGIN_SECS) of expiry.
//! 3. A stale token is refreshed with the stored refresh token and the new
//!    state replaces the old one wholesale.
//!
//! # Examples
//!
//! ```no_run
//! use twitch_client::TokenManager;
//! use twitch_common::{Credentials, TokenState};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let credentials = Credentials::new("client-id", "client-secret", "access", "refresh")?;
//! let manager = TokenManager::new(credentials).with_refresh_observer(
//!     |state: &TokenState| -> anyhow::Result<()> {
//!         // persist the rotated refresh token somewhere
//!         println!("new token expires at {:?}", state.expires_at);
//!         Ok(())
//!     },
//! );
//!
//! let token = manager.get_token().await?;
//! # let _ = token;
//! # Ok(())
//! # }
//! ```

use serde::Deserialize;

use twitch_common::TokenState;

mod manager;

pub use manager::TokenManager;

/// Provider endpoint issuing and refreshing tokens.
pub const TOKEN_URL: &str = "https://id.twitch.tv/oauth2/token";

/// Provider endpoint reporting a token's remaining lifetime and scopes.
pub const VALIDATE_URL: &str = "https://id.twitch.tv/oauth2/validate";

/// Per-request timeout applied by the HTTP transport, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Locations of the provider's OAuth endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthEndpoints {
    /// Token endpoint (refresh and client-credentials grants).
    pub token_url: String,
    /// Validate endpoint.
    pub validate_url: String,
}

impl Default for AuthEndpoints {
    fn default() -> Self {
        Self {
            token_url: TOKEN_URL.to_string(),
            validate_url: VALIDATE_URL.to_string(),
        }
    }
}

impl AuthEndpoints {
    /// Endpoints rooted at another host, using the provider's path layout.
    ///
    /// `https://id.example` yields `https://id.example/oauth2/token` and
    /// `https://id.example/oauth2/validate`.
    pub fn from_base_url(base_url: impl AsRef<str>) -> Self {
        let base = base_url.as_ref().trim_end_matches('/');
        Self {
            token_url: format!("{base}/oauth2/token"),
            validate_url: format!("{base}/oauth2/validate"),
        }
    }
}

/// Notified after every successful refresh of the user token.
///
/// Invoked synchronously, after the new [`TokenState`] has replaced the old
/// one. An `Err` is logged and otherwise ignored; it never rolls back the
/// refresh.
///
/// Any `Fn(&TokenState) -> anyhow::Result<()>` closure is an observer.
pub trait TokenRefreshObserver: Send + Sync {
    /// Called with the state that is now current.
    ///
    /// # Errors
    ///
    /// Implementations may fail, e.g. when persisting tokens; the failure is
    /// not propagated to the caller that triggered the refresh.
    fn on_token_refresh(&self, state: &TokenState) -> anyhow::Result<()>;
}

impl<F> TokenRefreshObserver for F
where
    F: Fn(&TokenState) -> anyhow::Result<()> + Send + Sync,
{
    fn on_token_refresh(&self, state: &TokenState) -> anyhow::Result<()> {
        self(state)
    }
}

/// Token endpoint response, shared by the refresh and client-credentials grants.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub scope: Option<Scopes>,
}

/// Granted scopes, either as a list or as a space-delimited string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Scopes {
    List(Vec<String>),
    Delimited(String),
}

impl From<Scopes> for Vec<String> {
    fn from(scopes: Scopes) -> Self {
        match scopes {
            Scopes::List(list) => list,
            Scopes::Delimited(s) => s.split_whitespace().map(str::to_string).collect(),
        }
    }
}

/// Validate endpoint response.
#[derive(Debug, Deserialize)]
pub(crate) struct ValidateResponse {
    #[serde(default)]
    pub expires_in: i64,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}
