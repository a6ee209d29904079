//! # twitch-client
//!
//! OAuth token lifecycle and Helix API access for Twitch bots and tools.
//!
//! This crate keeps a user access token valid for as long as the refresh
//! token stays good, and wraps Helix calls so that each one goes out with a
//! current token. Provides:
//! - [`TokenManager`]: validates, caches and refreshes the user token, and
//!   obtains app tokens through the client-credentials grant
//! - [`HelixClient`]: `GET`/`POST`/`PATCH`/`PUT`/`DELETE` with user or app tokens
//! - [`AccessTokenProvider`]: the seam between the two, for custom token sources
//!
//! ## Example
//!
//! ```no_run
//! use twitch_client::{HelixClient, TokenManager};
//! use twitch_common::EnvCredentialSource;
//! use serde_json::json;
//!
//! # async fn example() -> anyhow::Result<()> {
//! // Reads TWITCH_* variables, falling back to ~/.twitch-secrets/.env
//! let manager = TokenManager::from_source(&EnvCredentialSource::new())?;
//! let client = HelixClient::with_token_manager(manager);
//!
//! let streams = client.get("streams", &json!({ "user_login": "twitchdev" })).await?;
//! println!("{streams}");
//!
//! client.close().await;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;

pub mod auth;
pub mod error;
pub mod helix;

pub use auth::{AuthEndpoints, TokenManager, TokenRefreshObserver};
pub use error::ClientError;
pub use helix::HelixClient;
pub use twitch_common::{CredentialSource, Credentials, EnvCredentialSource, TokenState};

/// Source of bearer tokens for [`HelixClient`].
///
/// Implemented by [`TokenManager`]. Implementations must hand out tokens that
/// are currently valid and must be safe to share between tasks.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Application client ID sent in the `Client-Id` header.
    fn client_id(&self) -> &str;

    /// A currently valid user access token.
    ///
    /// # Errors
    ///
    /// Returns an error if no valid token can be obtained; the request that
    /// needed it is not sent.
    async fn user_token(&self) -> Result<String, ClientError>;

    /// A currently valid app access token.
    ///
    /// # Errors
    ///
    /// Returns an error if no valid token can be obtained; the request that
    /// needed it is not sent.
    async fn app_token(&self) -> Result<String, ClientError>;

    /// Releases any resources held by the provider. Must be idempotent.
    async fn close(&self);
}
