//! Docker Registry HTTP API V2 wire types.

use serde::Deserialize;

/// Media type requested when resolving a tag to its digest.
///
/// The registry returns a `docker-content-digest` only for the manifest type
/// it negotiates; asking for the wrong media type silently yields no digest.
pub const MANIFEST_V2_MEDIA_TYPE: &str = "application/vnd.docker.distribution.manifest.v2+json";

/// Response header carrying the content digest of a manifest.
pub const DOCKER_CONTENT_DIGEST: &str = "docker-content-digest";

/// Body of `GET /v2/_catalog`.
#[derive(Debug, Deserialize)]
pub struct Catalog {
    /// Repository names known to the registry.
    pub repositories: Vec<String>,
}

/// Body of `GET /v2/{name}/tags/list`.
///
/// The `tags` field may be `null` or absent for a repository whose manifests
/// have all been deleted; both cases mean "no tags", not an error.
#[derive(Debug, Deserialize)]
pub struct TagList {
    /// Tags of the repository, if any.
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl TagList {
    /// Returns the tags, treating `null`/absent as empty.
    #[must_use]
    pub fn into_tags(self) -> Vec<String> {
        self.tags.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_parses() {
        let catalog: Catalog =
            serde_json::from_str(r#"{"repositories": ["app", "lib/base"]}"#).unwrap();
        assert_eq!(catalog.repositories, ["app", "lib/base"]);
    }

    #[test]
    fn test_tag_list_parses() {
        let tags: TagList =
            serde_json::from_str(r#"{"name": "app", "tags": ["v1", "v2"]}"#).unwrap();
        assert_eq!(tags.into_tags(), ["v1", "v2"]);
    }

    #[test]
    fn test_tag_list_null_is_empty() {
        let tags: TagList = serde_json::from_str(r#"{"name": "app", "tags": null}"#).unwrap();
        assert!(tags.into_tags().is_empty());
    }

    #[test]
    fn test_tag_list_absent_is_empty() {
        let tags: TagList = serde_json::from_str(r#"{"name": "app"}"#).unwrap();
        assert!(tags.into_tags().is_empty());
    }
}
