//! Static client identity and the initial user token pair.
//!
//! [`Credentials`] are immutable once loaded. They are resolved through the
//! [`CredentialSource`] trait so that the token manager never depends on a
//! particular file or environment layout.
//!
//! # Environment
//!
//! [`EnvCredentialSource`] reads the following variables, falling back to a
//! dotenv file for any variable not set in the process environment:
//!
//! | Variable | Required |
//! |----------|----------|
//! | `TWITCH_CLIENT_ID` | yes |
//! | `TWITCH_CLIENT_SECRET` | yes |
//! | `TWITCH_ACCESS_TOKEN` | yes |
//! | `TWITCH_REFRESH_TOKEN` | yes |
//! | `TWITCH_BOT_USERNAME` | no |
//! | `TWITCH_CHANNEL` | no |
//!
//! The dotenv file location is taken from `TWITCH_ENV_FILE`, defaulting to
//! `~/.twitch-secrets/.env`. A missing file is not an error.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use log::debug;
use secrecy::SecretString;

use crate::error::CredentialError;

/// Environment variable holding the application client id.
pub const CLIENT_ID_VAR: &str = "TWITCH_CLIENT_ID";
/// Environment variable holding the application client secret.
pub const CLIENT_SECRET_VAR: &str = "TWITCH_CLIENT_SECRET";
/// Environment variable holding the initial user access token.
pub const ACCESS_TOKEN_VAR: &str = "TWITCH_ACCESS_TOKEN";
/// Environment variable holding the initial user refresh token.
pub const REFRESH_TOKEN_VAR: &str = "TWITCH_REFRESH_TOKEN";
/// Environment variable holding the optional bot account name.
pub const BOT_USERNAME_VAR: &str = "TWITCH_BOT_USERNAME";
/// Environment variable holding the optional channel name.
pub const CHANNEL_VAR: &str = "TWITCH_CHANNEL";
/// Environment variable overriding the dotenv file location.
pub const ENV_FILE_VAR: &str = "TWITCH_ENV_FILE";
/// Default dotenv file location, relative to the home directory.
pub const DEFAULT_ENV_FILE: &str = ".twitch-secrets/.env";

/// Client identity plus the user token pair the session starts from.
///
/// # Security
///
/// The client secret and both tokens are stored using the `secrecy` crate
/// and never appear in `Debug` output.
#[derive(Clone)]
pub struct Credentials {
    client_id: String,
    client_secret: SecretString,
    access_token: SecretString,
    refresh_token: SecretString,
    bot_username: Option<String>,
    channel: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("bot_username", &self.bot_username)
            .field("channel", &self.channel)
            .finish()
    }
}

impl Credentials {
    /// Creates a credential set from the four required values.
    ///
    /// # Examples
    ///
    /// ```
    /// use twitch_common::Credentials;
    ///
    /// let credentials = Credentials::new("id", "secret", "access", "refresh")?;
    /// assert_eq!(credentials.client_id(), "id");
    /// # Ok::<(), twitch_common::CredentialError>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::MissingField`] if any value is empty.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Result<Self, CredentialError> {
        Ok(Self {
            client_id: non_empty("client_id", client_id.into())?,
            client_secret: secret(non_empty("client_secret", client_secret.into())?),
            access_token: secret(non_empty("access_token", access_token.into())?),
            refresh_token: secret(non_empty("refresh_token", refresh_token.into())?),
            bot_username: None,
            channel: None,
        })
    }

    /// Builds credentials by looking each `TWITCH_*` variable up by name.
    ///
    /// Empty values are treated as absent.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::MissingField`] naming the first required
    /// variable the lookup could not resolve.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CredentialError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.is_empty());
        let required = |name: &'static str| get(name).ok_or(CredentialError::MissingField(name));

        let mut credentials = Self::new(
            required(CLIENT_ID_VAR)?,
            required(CLIENT_SECRET_VAR)?,
            required(ACCESS_TOKEN_VAR)?,
            required(REFRESH_TOKEN_VAR)?,
        )?;
        credentials.bot_username = get(BOT_USERNAME_VAR);
        credentials.channel = get(CHANNEL_VAR);

        Ok(credentials)
    }

    /// Sets the bot account name.
    #[must_use]
    pub fn with_bot_username(mut self, bot_username: impl Into<String>) -> Self {
        self.bot_username = Some(bot_username.into());
        self
    }

    /// Sets the channel name.
    #[must_use]
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    /// The application client id, sent as the `Client-Id` header.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    #[must_use]
    pub const fn client_secret(&self) -> &SecretString {
        &self.client_secret
    }

    /// The user access token the session was configured with.
    #[must_use]
    pub const fn access_token(&self) -> &SecretString {
        &self.access_token
    }

    /// The user refresh token the session was configured with.
    #[must_use]
    pub const fn refresh_token(&self) -> &SecretString {
        &self.refresh_token
    }

    #[must_use]
    pub fn bot_username(&self) -> Option<&str> {
        self.bot_username.as_deref()
    }

    #[must_use]
    pub fn channel(&self) -> Option<&str> {
        self.channel.as_deref()
    }
}

fn non_empty(field: &'static str, value: String) -> Result<String, CredentialError> {
    if value.is_empty() {
        Err(CredentialError::MissingField(field))
    } else {
        Ok(value)
    }
}

fn secret(value: String) -> SecretString {
    SecretString::new(value.into())
}

/// A configuration backend able to produce [`Credentials`].
pub trait CredentialSource {
    /// Resolves a complete credential set.
    ///
    /// # Errors
    ///
    /// Returns an error if a required value is missing or the backing store
    /// cannot be read.
    fn load(&self) -> Result<Credentials, CredentialError>;
}

impl CredentialSource for Credentials {
    fn load(&self) -> Result<Self, CredentialError> {
        Ok(self.clone())
    }
}

/// Resolves credentials from the process environment and a dotenv file.
///
/// Process environment variables take precedence over values in the file.
#[derive(Debug, Clone, Default)]
pub struct EnvCredentialSource {
    env_file: Option<PathBuf>,
}

impl EnvCredentialSource {
    /// Creates a source using the default dotenv file resolution.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the dotenv file from an explicit path instead.
    #[must_use]
    pub fn with_env_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.env_file = Some(path.into());
        self
    }

    /// Returns the dotenv file this source reads.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::HomeDirUnavailable`] when the default
    /// location is needed and the home directory cannot be determined.
    pub fn env_file_path(&self) -> Result<PathBuf, CredentialError> {
        if let Some(path) = &self.env_file {
            return Ok(path.clone());
        }

        match std::env::var(ENV_FILE_VAR) {
            Ok(path) if !path.is_empty() => expand_home(&path),
            _ => dirs::home_dir()
                .map(|home| home.join(DEFAULT_ENV_FILE))
                .ok_or(CredentialError::HomeDirUnavailable),
        }
    }

    fn load_with<F>(&self, env: F) -> Result<Credentials, CredentialError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = self.env_file_path()?;
        let file_values = read_env_file(&path)?;

        Credentials::from_lookup(|name| {
            env(name)
                .filter(|value| !value.is_empty())
                .or_else(|| file_values.get(name).cloned())
        })
    }
}

impl CredentialSource for EnvCredentialSource {
    fn load(&self) -> Result<Credentials, CredentialError> {
        self.load_with(|name| std::env::var(name).ok())
    }
}

fn expand_home(path: &str) -> Result<PathBuf, CredentialError> {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .ok_or(CredentialError::HomeDirUnavailable),
        None => Ok(PathBuf::from(path)),
    }
}

fn read_env_file(path: &Path) -> Result<HashMap<String, String>, CredentialError> {
    if !path.is_file() {
        debug!("No env file at {}, using process environment only", path.display());
        return Ok(HashMap::new());
    }

    let to_error = |source: dotenvy::Error| CredentialError::EnvFile {
        path: path.to_path_buf(),
        source,
    };

    let values = dotenvy::from_path_iter(path)
        .map_err(to_error)?
        .collect::<Result<HashMap<_, _>, _>>()
        .map_err(to_error)?;

    debug!("Loaded {} entries from {}", values.len(), path.display());
    Ok(values)
}
