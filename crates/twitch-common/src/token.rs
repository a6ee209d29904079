use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::credentials::Credentials;

/// Tokens expiring within this many seconds are treated as expired.
pub const REFRESH_MARGIN_SECS: i64 = 300;

/// Lifetime assumed when the token endpoint omits `expires_in`.
pub const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

/// Snapshot of the user token pair and what the provider told us about it.
///
/// The token manager never mutates a `TokenState` in place; every refresh or
/// validation produces a new value that replaces the old one.
///
/// `Serialize`/`Deserialize` are implemented so refresh observers can
/// persist rotated tokens. `Debug` output redacts both tokens.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenState {
    /// Bearer token for API calls.
    pub access_token: String,
    /// Token exchanged for a new access token on refresh.
    pub refresh_token: String,
    /// When the access token stops being valid, if known.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    /// Scopes granted to the access token.
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl fmt::Debug for TokenState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenState")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("scopes", &self.scopes)
            .finish()
    }
}

impl TokenState {
    /// Creates a state with unknown expiry and no scopes.
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            expires_at: None,
            scopes: Vec::new(),
        }
    }

    /// Initial state built from configured credentials.
    #[must_use]
    pub fn from_credentials(credentials: &Credentials) -> Self {
        Self::new(
            credentials.access_token().expose_secret(),
            credentials.refresh_token().expose_secret(),
        )
    }

    #[must_use]
    pub fn with_expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    #[must_use]
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Check if the access token must be refreshed before use.
    ///
    /// Returns `true` when the expiry is unknown, already past, or falls
    /// within `margin_seconds` of `now` (inclusive).
    #[must_use]
    pub fn needs_refresh(&self, now: DateTime<Utc>, margin_seconds: i64) -> bool {
        expires_within(self.expires_at, now, margin_seconds)
    }

    /// Seconds until the access token expires, or `None` if unknown.
    #[must_use]
    pub fn seconds_until_expiry(&self) -> Option<i64> {
        self.expires_at
            .map(|expires_at| (expires_at - Utc::now()).num_seconds())
    }
}

/// Application access token obtained through the client-credentials grant.
///
/// App tokens carry no refresh token; a stale one is simply replaced by
/// requesting a new one.
#[derive(Clone, PartialEq, Eq)]
pub struct AppToken {
    /// Bearer token for app-authenticated API calls.
    pub access_token: String,
    /// When the token stops being valid.
    pub expires_at: DateTime<Utc>,
}

impl fmt::Debug for AppToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppToken")
            .field("access_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl AppToken {
    pub fn new(access_token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at,
        }
    }

    /// Same rule as [`TokenState::needs_refresh`].
    #[must_use]
    pub fn needs_refresh(&self, now: DateTime<Utc>, margin_seconds: i64) -> bool {
        expires_within(Some(self.expires_at), now, margin_seconds)
    }
}

/// The instant `expires_in` seconds after `now`.
///
/// Returns `None` when the result is not representable, e.g. for an
/// `expires_in` reported by a misbehaving server.
#[must_use]
pub fn expiry_after(now: DateTime<Utc>, expires_in: i64) -> Option<DateTime<Utc>> {
    TimeDelta::try_seconds(expires_in).and_then(|lifetime| now.checked_add_signed(lifetime))
}

fn expires_within(expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>, margin: i64) -> bool {
    let Some(expires_at) = expires_at else {
        return true;
    };
    // A margin past the end of time covers every expiry
    expiry_after(now, margin).is_none_or(|threshold| threshold >= expires_at)
}
