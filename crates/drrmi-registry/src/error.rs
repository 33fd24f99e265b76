//! Error types for registry operations.

use std::path::PathBuf;

use thiserror::Error;

use crate::digest::DigestError;

/// Errors that can occur during registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Failed to connect to the registry. An untrusted or unresolvable TLS
    /// certificate (including an absent default CA bundle) surfaces here.
    #[error("Failed to connect to registry at {url}: {source}")]
    ConnectionFailed {
        /// Registry URL.
        url: String,
        /// Underlying error.
        #[source]
        source: reqwest::Error,
    },

    /// The registry answered with an unexpected HTTP status.
    #[error("Unexpected response from registry: {status} - {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body or error message.
        message: String,
    },

    /// The registry returned a body that does not match the expected JSON
    /// shape.
    #[error("Malformed registry response: {source}")]
    Json {
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// The configured credentials cannot be encoded into an HTTP header.
    #[error("Authentication failed: {message}")]
    AuthenticationFailed {
        /// Error message.
        message: String,
    },

    /// The configured CA bundle could not be read.
    #[error("Failed to read CA bundle at {path}: {source}")]
    CaRead {
        /// CA bundle path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The configured CA bundle is not a valid PEM certificate.
    #[error("Invalid CA bundle at {path}: {message}")]
    CaInvalid {
        /// CA bundle path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// The registry returned a malformed `docker-content-digest` header.
    #[error("Invalid digest header: {source}")]
    Digest {
        /// Underlying error.
        #[from]
        source: DigestError,
    },
}

impl From<reqwest::Error> for RegistryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() {
            Self::ConnectionFailed {
                url: err
                    .url()
                    .map_or_else(|| "unknown".to_string(), ToString::to_string),
                source: err,
            }
        } else {
            Self::Http {
                status: err.status().map_or(0, |s| s.as_u16()),
                message: err.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for RegistryError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json { source: err }
    }
}
