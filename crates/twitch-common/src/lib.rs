//! # twitch-common
//!
//! Credential and token types shared by the Twitch API client.
//!
//! This crate holds the pure data side of the client:
//! - [`Credentials`]: the static client identity and the initial user token pair
//! - [`CredentialSource`]: the seam through which credentials are resolved
//! - [`TokenState`] and [`AppToken`]: token snapshots owned by the token manager
//!
//! ## Example
//!
//! ```
//! use twitch_common::{CredentialSource, Credentials, TokenState};
//!
//! let credentials = Credentials::new("client-id", "client-secret", "access", "refresh")?
//!     .with_channel("somechannel");
//!
//! // A loaded credential set is itself a source
//! let loaded = credentials.load()?;
//! assert_eq!(loaded.client_id(), "client-id");
//!
//! let state = TokenState::from_credentials(&loaded);
//! assert!(state.expires_at.is_none());
//! # Ok::<(), twitch_common::CredentialError>(())
//! ```

/// Client identity and credential resolution.
///
/// Provides [`Credentials`] plus the environment and dotenv backed source.
pub mod credentials;
/// Errors raised while resolving credentials.
pub mod error;
/// Token snapshots for user and application tokens.
pub mod token;

pub use credentials::{CredentialSource, Credentials, EnvCredentialSource};
pub use error::CredentialError;
pub use token::{AppToken, DEFAULT_EXPIRES_IN_SECS, REFRESH_MARGIN_SECS, TokenState, expiry_after};
