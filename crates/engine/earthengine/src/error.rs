//! Error types for the Earth Engine client

use std::path::PathBuf;

/// Errors that can occur while talking to Earth Engine
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No usable service-account credentials were found
    #[error("Credentials error: {0}")]
    Credentials(String),

    /// A key file could not be read
    #[error("Failed to read key file {path:?}: {source}")]
    KeyFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Signing the token request failed (usually a malformed private key)
    #[error("Failed to sign token request: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    /// The token endpoint refused the assertion
    #[error("Token exchange failed: {0}")]
    TokenExchange(String),

    /// Transport-level failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with an error status
    #[error("Earth Engine error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The service returned something this client did not expect
    #[error("Unexpected response format: {0}")]
    UnexpectedFormat(String),
}

/// Result type for Earth Engine operations
pub type Result<T> = std::result::Result<T, Error>;
