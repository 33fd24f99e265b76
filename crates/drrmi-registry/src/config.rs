//! Configuration types for the registry client.

use std::path::PathBuf;
use std::time::Duration;

/// Per-host default CA bundle location, following the Docker daemon's
/// `certs.d` convention.
const DOCKER_CERTS_DIR: &str = "/etc/docker/certs.d";

/// Configuration for the registry client.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Registry base URL (e.g. `https://registry.example.com:5000`).
    pub url: String,

    /// Authentication configuration.
    pub auth: RegistryAuth,

    /// TLS trust configuration.
    pub trust: TrustConfig,

    /// Request timeout.
    pub timeout: Duration,

    /// User agent string.
    pub user_agent: String,
}

impl RegistryConfig {
    /// Creates a new registry configuration with the given base URL.
    ///
    /// # Examples
    ///
    /// ```
    /// use drrmi_registry::RegistryConfig;
    ///
    /// let config = RegistryConfig::new("https://registry.example.com");
    /// assert_eq!(config.url, "https://registry.example.com");
    /// ```
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            auth: RegistryAuth::Anonymous,
            trust: TrustConfig::SystemRoots,
            timeout: Duration::from_secs(30),
            user_agent: format!("drrmi/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Sets the authentication method.
    #[must_use]
    pub fn with_auth(mut self, auth: RegistryAuth) -> Self {
        self.auth = auth;
        self
    }

    /// Sets the TLS trust configuration.
    #[must_use]
    pub fn with_trust(mut self, trust: TrustConfig) -> Self {
        self.trust = trust;
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Authentication methods for registry access.
#[derive(Debug, Clone)]
pub enum RegistryAuth {
    /// No authentication.
    Anonymous,

    /// HTTP basic authentication.
    Basic {
        /// Username.
        username: String,
        /// Password.
        password: String,
    },
}

impl RegistryAuth {
    /// Creates basic authentication.
    ///
    /// # Examples
    ///
    /// ```
    /// use drrmi_registry::RegistryAuth;
    ///
    /// let auth = RegistryAuth::basic("user", "pass");
    /// ```
    #[must_use]
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// TLS trust configuration, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrustConfig {
    /// Certificate verification disabled.
    Disabled,

    /// Verify against the system root store.
    SystemRoots,

    /// Verify against a specific CA bundle.
    CaBundle(PathBuf),
}

impl TrustConfig {
    /// Resolves the trust configuration from startup options.
    ///
    /// Precedence: an explicit verify flag wins outright (`false` disables
    /// verification even when a CA path is also given, `true` selects the
    /// system roots); otherwise an explicit CA path wins; otherwise the
    /// host-derived Docker default `/etc/docker/certs.d/{host}/ca.crt`.
    ///
    /// The default path is not checked for existence here; an absent file
    /// surfaces later as a connection error from the client. Known
    /// limitation, kept for simplicity.
    ///
    /// # Examples
    ///
    /// ```
    /// use drrmi_registry::TrustConfig;
    ///
    /// let trust = TrustConfig::resolve("registry.example.com:5000", None, None);
    /// assert_eq!(
    ///     trust,
    ///     TrustConfig::CaBundle("/etc/docker/certs.d/registry.example.com:5000/ca.crt".into())
    /// );
    /// ```
    #[must_use]
    pub fn resolve(host: &str, verify: Option<bool>, ca_path: Option<PathBuf>) -> Self {
        match (verify, ca_path) {
            (Some(false), _) => Self::Disabled,
            (Some(true), _) => Self::SystemRoots,
            (None, Some(path)) => Self::CaBundle(path),
            (None, None) => Self::CaBundle(Self::default_ca_path(host)),
        }
    }

    /// Returns the Docker-convention default CA bundle path for a host.
    #[must_use]
    pub fn default_ca_path(host: &str) -> PathBuf {
        PathBuf::from(format!("{DOCKER_CERTS_DIR}/{host}/ca.crt"))
    }
}
