//! # DRRMI Registry
//!
//! Docker Registry HTTP API v2 client for interactive tag deletion.
//!
//! This crate provides the protocol core of the `drrmi` tool: the catalog,
//! tag-list, digest-lookup, and manifest-delete operations, plus the
//! startup-time credential and TLS-trust resolution policy.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use drrmi_registry::{RegistryAuth, RegistryClient, RegistryConfig, TrustConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RegistryConfig::new("https://registry.example.com:5000")
//!         .with_auth(RegistryAuth::basic("user", "pass"))
//!         .with_trust(TrustConfig::resolve("registry.example.com:5000", None, None));
//!
//!     let client = RegistryClient::new(config)?;
//!
//!     for name in client.list_repositories().await? {
//!         if let Some(digest) = client.digest(&name, "stale").await? {
//!             let deleted = client.delete_manifest(&name, &digest).await?;
//!             println!("{name}: deleted = {deleted}");
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! Deleting a tag only removes the manifest reference; the registry's
//! garbage collector must run separately to reclaim the underlying blobs.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod client;
mod config;
mod credentials;
mod digest;
mod error;
mod v2;

pub use client::RegistryClient;
pub use config::{RegistryAuth, RegistryConfig, TrustConfig};
pub use credentials::{resolve as resolve_credential, Credential, CredentialError};
pub use digest::{Digest, DigestError};
pub use error::RegistryError;
pub use v2::{Catalog, TagList, DOCKER_CONTENT_DIGEST, MANIFEST_V2_MEDIA_TYPE};
