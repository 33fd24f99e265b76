//! Registry HTTP API v2 client for tag deletion.
//!
//! Stateless operations against `{url}/v2/...`, all sharing one
//! authenticated, trust-configured HTTP client built at startup. Deletion
//! is a mandatory two-step: resolve the tag to its content digest, then
//! delete by digest, since the registry protocol defines deletion only over
//! digests.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use tracing::debug;

use crate::config::{RegistryAuth, RegistryConfig, TrustConfig};
use crate::digest::{Digest, DigestError};
use crate::error::RegistryError;
use crate::v2::{Catalog, TagList, DOCKER_CONTENT_DIGEST, MANIFEST_V2_MEDIA_TYPE};

/// Client for a single Docker-distribution-compatible registry.
#[derive(Debug)]
pub struct RegistryClient {
    config: RegistryConfig,
    http: reqwest::Client,
}

impl RegistryClient {
    /// Creates a new registry client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured CA bundle cannot be read or the
    /// HTTP client cannot be created.
    pub fn new(config: RegistryConfig) -> Result<Self, RegistryError> {
        let http = Self::build_http_client(&config)?;

        Ok(Self { config, http })
    }

    /// Returns the registry configuration.
    #[must_use]
    pub const fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Lists all repository names in the registry's catalog.
    ///
    /// # Errors
    ///
    /// Returns an error on a non-2xx status or a malformed body.
    pub async fn list_repositories(&self) -> Result<Vec<String>, RegistryError> {
        let url = format!("{}/v2/_catalog", self.config.url);
        debug!(url, "fetching catalog");

        let body = self.fetch_json(&url).await?;
        let catalog: Catalog = serde_json::from_str(&body)?;
        Ok(catalog.repositories)
    }

    /// Lists the tags of a repository, in server order.
    ///
    /// A `null` or absent `tags` field means the repository has no tags and
    /// yields an empty list, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error on a non-2xx status or a malformed body.
    pub async fn list_tags(&self, name: &str) -> Result<Vec<String>, RegistryError> {
        let url = format!("{}/v2/{name}/tags/list", self.config.url);
        debug!(url, "fetching tag list");

        let body = self.fetch_json(&url).await?;
        let tags: TagList = serde_json::from_str(&body)?;
        Ok(tags.into_tags())
    }

    /// Resolves a tag to its manifest content digest.
    ///
    /// Issues a HEAD request negotiating the schema-2 manifest media type;
    /// the registry only reports a digest for the type it negotiates.
    /// Returns `None` when the response carries no `docker-content-digest`
    /// header (unknown tag, or a registry that does not report digests for
    /// this request).
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent or the header value
    /// is not a well-formed digest.
    pub async fn digest(&self, name: &str, tag: &str) -> Result<Option<Digest>, RegistryError> {
        let url = format!("{}/v2/{name}/manifests/{tag}", self.config.url);
        debug!(url, "resolving tag digest");

        let response = self
            .http
            .head(&url)
            .headers(self.auth_headers()?)
            .header(ACCEPT, MANIFEST_V2_MEDIA_TYPE)
            .send()
            .await?;

        match response.headers().get(DOCKER_CONTENT_DIGEST) {
            Some(value) => {
                let value = value.to_str().map_err(|_| {
                    DigestError::InvalidFormat(
                        String::from_utf8_lossy(value.as_bytes()).into_owned(),
                    )
                })?;
                Ok(Some(value.parse()?))
            }
            None => Ok(None),
        }
    }

    /// Deletes the manifest identified by `digest`.
    ///
    /// Returns `true` only for HTTP 202 Accepted; any other status is a
    /// plain non-success, letting batch deletion continue past one tag's
    /// failure.
    ///
    /// # Errors
    ///
    /// Returns an error only if the request cannot be sent at all.
    pub async fn delete_manifest(&self, name: &str, digest: &Digest) -> Result<bool, RegistryError> {
        let url = format!("{}/v2/{name}/manifests/{digest}", self.config.url);
        debug!(url, "deleting manifest");

        let response = self
            .http
            .delete(&url)
            .headers(self.auth_headers()?)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::ACCEPTED {
            debug!(%status, url, "delete not accepted");
        }
        Ok(status == StatusCode::ACCEPTED)
    }

    /// GETs `url` and returns the body of a 2xx response.
    async fn fetch_json(&self, url: &str) -> Result<String, RegistryError> {
        let response = self
            .http
            .get(url)
            .headers(self.auth_headers()?)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RegistryError::Http {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        Ok(response.text().await?)
    }

    /// Builds the HTTP client per the resolved trust configuration.
    fn build_http_client(config: &RegistryConfig) -> Result<reqwest::Client, RegistryError> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone());

        match &config.trust {
            TrustConfig::SystemRoots => {}
            TrustConfig::Disabled => {
                builder = builder.danger_accept_invalid_certs(true);
            }
            TrustConfig::CaBundle(path) => {
                let pem = std::fs::read(path).map_err(|source| RegistryError::CaRead {
                    path: path.clone(),
                    source,
                })?;
                let cert = reqwest::Certificate::from_pem(&pem).map_err(|e| {
                    RegistryError::CaInvalid {
                        path: path.clone(),
                        message: e.to_string(),
                    }
                })?;
                builder = builder.add_root_certificate(cert);
            }
        }

        builder.build().map_err(|e| RegistryError::ConnectionFailed {
            url: config.url.clone(),
            source: e,
        })
    }

    /// Creates authentication headers based on configuration.
    fn auth_headers(&self) -> Result<HeaderMap, RegistryError> {
        let mut headers = HeaderMap::new();

        match &self.config.auth {
            RegistryAuth::Anonymous => {}
            RegistryAuth::Basic { username, password } => {
                let credentials = base64::Engine::encode(
                    &base64::engine::general_purpose::STANDARD,
                    format!("{username}:{password}"),
                );
                headers.insert(
                    AUTHORIZATION,
                    HeaderValue::from_str(&format!("Basic {credentials}")).map_err(|_| {
                        RegistryError::AuthenticationFailed {
                            message: "Invalid credentials".to_string(),
                        }
                    })?,
                );
            }
        }

        Ok(headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SHA: &str = "sha256:6c3c624b58dbbcd3c0dd82b4c53f04194d1247c6eebdaab7c610cf7d66709b3b";

    fn client_for(server: &MockServer) -> RegistryClient {
        let config = RegistryConfig::new(server.uri())
            .with_auth(RegistryAuth::basic("user", "pass"));
        RegistryClient::new(config).unwrap()
    }

    #[test]
    fn test_client_creation() {
        let config = RegistryConfig::new("https://registry.example.com");
        assert!(RegistryClient::new(config).is_ok());
    }

    #[test]
    fn test_auth_headers_basic() {
        let config = RegistryConfig::new("https://example.com")
            .with_auth(RegistryAuth::basic("user", "pass"));
        let client = RegistryClient::new(config).unwrap();
        let headers = client.auth_headers().unwrap();
        assert_eq!(
            headers.get(AUTHORIZATION).unwrap().to_str().unwrap(),
            "Basic dXNlcjpwYXNz"
        );
    }

    #[test]
    fn test_auth_headers_anonymous() {
        let client = RegistryClient::new(RegistryConfig::new("https://example.com")).unwrap();
        assert!(client.auth_headers().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_repositories_sends_basic_auth() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/_catalog"))
            .and(header("authorization", "Basic dXNlcjpwYXNz"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "repositories": ["app", "lib/base"]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let repositories = client_for(&server).list_repositories().await.unwrap();
        assert_eq!(repositories, ["app", "lib/base"]);
    }

    #[tokio::test]
    async fn test_list_repositories_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/_catalog"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = client_for(&server).list_repositories().await.unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Http { status: 500, ref message } if message == "boom"
        ));
    }

    #[tokio::test]
    async fn test_list_repositories_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/_catalog"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client_for(&server).list_repositories().await.unwrap_err();
        assert!(matches!(err, RegistryError::Json { .. }));
    }

    #[tokio::test]
    async fn test_list_tags_preserves_server_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/app/tags/list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "app",
                "tags": ["v2", "v1"]
            })))
            .mount(&server)
            .await;

        let tags = client_for(&server).list_tags("app").await.unwrap();
        assert_eq!(tags, ["v2", "v1"]);
    }

    #[tokio::test]
    async fn test_list_tags_null_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/app/tags/list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "app",
                "tags": null
            })))
            .mount(&server)
            .await;

        let tags = client_for(&server).list_tags("app").await.unwrap();
        assert!(tags.is_empty());
    }

    #[tokio::test]
    async fn test_digest_negotiates_manifest_media_type() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/v2/app/manifests/v1"))
            .and(header("accept", MANIFEST_V2_MEDIA_TYPE))
            .respond_with(ResponseTemplate::new(200).insert_header(DOCKER_CONTENT_DIGEST, SHA))
            .expect(1)
            .mount(&server)
            .await;

        let digest = client_for(&server).digest("app", "v1").await.unwrap();
        assert_eq!(digest.unwrap().to_string(), SHA);
    }

    #[tokio::test]
    async fn test_digest_absent_header_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/v2/app/manifests/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let digest = client_for(&server).digest("app", "gone").await.unwrap();
        assert!(digest.is_none());
    }

    #[tokio::test]
    async fn test_delete_manifest_accepted() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path(format!("/v2/app/manifests/{SHA}")))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;

        let digest: Digest = SHA.parse().unwrap();
        let deleted = client_for(&server)
            .delete_manifest("app", &digest)
            .await
            .unwrap();
        assert!(deleted);
    }

    #[tokio::test]
    async fn test_delete_manifest_non_accepted_is_not_an_error() {
        let server = MockServer::start().await;
        for status in [200_u16, 400, 403, 404] {
            server.reset().await;
            Mock::given(method("DELETE"))
                .and(path(format!("/v2/app/manifests/{SHA}")))
                .respond_with(ResponseTemplate::new(status))
                .mount(&server)
                .await;

            let digest: Digest = SHA.parse().unwrap();
            let deleted = client_for(&server)
                .delete_manifest("app", &digest)
                .await
                .unwrap();
            assert!(!deleted, "status {status} must not count as deleted");
        }
    }
}
