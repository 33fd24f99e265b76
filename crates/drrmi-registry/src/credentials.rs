//! Credential resolution for registry authentication.
//!
//! Credentials come either from explicit configuration or from an external
//! Docker credential helper (`docker-credential-{store}`), invoked with the
//! registry host on stdin and answering with a JSON document carrying
//! `Username` and `Secret` fields.

use std::io::Write;
use std::process::{Command, Stdio};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// A resolved username/password pair, attached to every registry request as
/// HTTP basic authentication.
#[derive(Debug, Clone)]
pub struct Credential {
    /// Username.
    pub username: String,
    /// Password.
    pub password: String,
}

/// Errors that can occur while resolving credentials.
///
/// All of these are fatal at startup: no request can be authenticated
/// without credentials.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The credential helper could not be spawned or communicated with.
    #[error("Credential helper {helper} unavailable: {source}")]
    Unavailable {
        /// Helper program name.
        helper: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The credential helper exited with a failure status.
    #[error("Credential helper {helper} failed: {stderr}")]
    HelperFailed {
        /// Helper program name.
        helper: String,
        /// Helper stderr output.
        stderr: String,
    },

    /// The credential helper produced output that is not valid JSON.
    #[error("Credential helper {helper} returned malformed output: {source}")]
    MalformedOutput {
        /// Helper program name.
        helper: String,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// The credential helper's output lacks a required field.
    #[error("Credential helper {helper} output is missing the {field} field")]
    MissingField {
        /// Helper program name.
        helper: String,
        /// Missing field name.
        field: &'static str,
    },
}

/// JSON document produced by `docker-credential-{store} get`.
#[derive(Debug, Deserialize)]
struct HelperReply {
    #[serde(rename = "Username")]
    username: Option<String>,
    #[serde(rename = "Secret")]
    secret: Option<String>,
}

/// Resolves a credential for `host`.
///
/// When both explicit values are present they are returned unchanged and
/// the credential helper is never invoked. Otherwise the helper named by
/// `store` is asked for the host's stored credentials.
///
/// # Errors
///
/// Returns a [`CredentialError`] if the helper must be consulted and is
/// unavailable, fails, or answers with unusable output.
pub fn resolve(
    host: &str,
    username: Option<String>,
    password: Option<String>,
    store: &str,
) -> Result<Credential, CredentialError> {
    if let (Some(username), Some(password)) = (username, password) {
        return Ok(Credential { username, password });
    }

    let helper = format!("docker-credential-{store}");
    debug!(helper, host, "resolving credentials via helper");
    let stdout = run_helper(&helper, host)?;
    parse_reply(&helper, &stdout)
}

/// Runs the helper's `get` action, feeding `host` on stdin.
fn run_helper(helper: &str, host: &str) -> Result<Vec<u8>, CredentialError> {
    let unavailable = |source| CredentialError::Unavailable {
        helper: helper.to_string(),
        source,
    };

    let mut child = Command::new(helper)
        .arg("get")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(unavailable)?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(host.as_bytes()).map_err(unavailable)?;
    }

    let output = child.wait_with_output().map_err(unavailable)?;
    if !output.status.success() {
        return Err(CredentialError::HelperFailed {
            helper: helper.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(output.stdout)
}

fn parse_reply(helper: &str, stdout: &[u8]) -> Result<Credential, CredentialError> {
    let reply: HelperReply =
        serde_json::from_slice(stdout).map_err(|source| CredentialError::MalformedOutput {
            helper: helper.to_string(),
            source,
        })?;

    let missing = |field| CredentialError::MissingField {
        helper: helper.to_string(),
        field,
    };

    Ok(Credential {
        username: reply.username.ok_or_else(|| missing("Username"))?,
        password: reply.secret.ok_or_else(|| missing("Secret"))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_credentials_skip_helper() {
        // A store name that cannot possibly resolve to an executable; the
        // helper must not be consulted when both values are explicit.
        let credential = resolve(
            "reg.example.com",
            Some("user".to_string()),
            Some("pass".to_string()),
            "definitely-not-installed",
        )
        .unwrap();
        assert_eq!(credential.username, "user");
        assert_eq!(credential.password, "pass");
    }

    #[test]
    fn test_missing_helper_is_unavailable() {
        let err = resolve("reg.example.com", None, None, "definitely-not-installed").unwrap_err();
        assert!(matches!(err, CredentialError::Unavailable { .. }));
    }

    #[test]
    fn test_parse_reply_valid() {
        let credential =
            parse_reply("helper", br#"{"Username": "user", "Secret": "hunter2"}"#).unwrap();
        assert_eq!(credential.username, "user");
        assert_eq!(credential.password, "hunter2");
    }

    #[test]
    fn test_parse_reply_missing_secret() {
        let err = parse_reply("helper", br#"{"Username": "user"}"#).unwrap_err();
        assert!(matches!(
            err,
            CredentialError::MissingField { field: "Secret", .. }
        ));
    }

    #[test]
    fn test_parse_reply_not_json() {
        let err = parse_reply("helper", b"credentials not found in native keychain").unwrap_err();
        assert!(matches!(err, CredentialError::MalformedOutput { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_helper_invocation_end_to_end() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();

        // Echoes back a credential derived from the host it receives on
        // stdin, plus a helper that fails outright.
        let good = dir.path().join("docker-credential-goodstore");
        std::fs::write(
            &good,
            "#!/bin/sh\nread host\nprintf '{\"Username\": \"u-%s\", \"Secret\": \"s\"}' \"$host\"\n",
        )
        .unwrap();
        let failing = dir.path().join("docker-credential-failstore");
        std::fs::write(&failing, "#!/bin/sh\necho 'no credentials' >&2\nexit 1\n").unwrap();
        for helper in [&good, &failing] {
            std::fs::set_permissions(helper, std::fs::Permissions::from_mode(0o755)).unwrap();
        }

        let path = std::env::var("PATH").unwrap_or_default();
        std::env::set_var("PATH", format!("{}:{path}", dir.path().display()));

        let credential = resolve("reg.example.com", None, None, "goodstore").unwrap();
        assert_eq!(credential.username, "u-reg.example.com");
        assert_eq!(credential.password, "s");

        let err = resolve("reg.example.com", None, None, "failstore").unwrap_err();
        assert!(matches!(
            err,
            CredentialError::HelperFailed { ref stderr, .. } if stderr == "no credentials"
        ));
    }
}
