//! Content digest type for manifest addressing.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Errors that can occur when parsing a content digest.
#[derive(Debug, Error)]
pub enum DigestError {
    /// The digest string is not of the form `algorithm:hex`.
    #[error("Invalid digest format: {0}")]
    InvalidFormat(String),

    /// The digest uses an algorithm this client does not recognize.
    #[error("Unsupported digest algorithm: {0}")]
    UnsupportedAlgorithm(String),
}

/// A content digest (`algorithm:hex`) identifying a manifest.
///
/// The registry's delete operation is defined only over digests, never tag
/// names; tags are mutable aliases, the digest is the stable content
/// identity. A `Digest` is obtained from the `docker-content-digest`
/// response header and passed back verbatim in the delete request path.
///
/// # Examples
///
/// ```
/// use drrmi_registry::Digest;
///
/// let digest: Digest = "sha256:6c3c624b58dbbcd3c0dd82b4c53f04194d1247c6eebdaab7c610cf7d66709b3b"
///     .parse()
///     .unwrap();
/// assert_eq!(digest.algorithm(), "sha256");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Digest {
    algorithm: String,
    hex: String,
}

impl Digest {
    /// Returns the algorithm component (e.g. `sha256`).
    #[must_use]
    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    /// Returns the hex-encoded hash component.
    #[must_use]
    pub fn hex(&self) -> &str {
        &self.hex
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.hex)
    }
}

impl FromStr for Digest {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((algorithm, hex)) = s.split_once(':') else {
            return Err(DigestError::InvalidFormat(s.to_string()));
        };

        if !matches!(algorithm, "sha256" | "sha512") {
            return Err(DigestError::UnsupportedAlgorithm(algorithm.to_string()));
        }

        if hex.is_empty() || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(DigestError::InvalidFormat(s.to_string()));
        }

        Ok(Self {
            algorithm: algorithm.to_string(),
            hex: hex.to_string(),
        })
    }
}
