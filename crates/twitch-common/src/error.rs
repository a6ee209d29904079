//! Error types for credential resolution.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while building or loading [`Credentials`](crate::Credentials).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CredentialError {
    /// A required credential was absent or empty.
    ///
    /// Carries the field or environment variable name that was missing.
    #[error("Missing required credential: {0}")]
    MissingField(&'static str),

    /// The dotenv file exists but could not be parsed.
    #[error("Failed to read env file {}: {source}", path.display())]
    EnvFile {
        /// Location of the offending file.
        path: PathBuf,
        /// Underlying parse or I/O failure.
        #[source]
        source: dotenvy::Error,
    },

    /// No env file override was given and the home directory is unknown.
    #[error("Could not determine home directory for the default env file")]
    HomeDirUnavailable,
}
