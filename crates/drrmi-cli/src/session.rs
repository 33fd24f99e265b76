//! Per-run cache of listed repositories and tags.
//!
//! Populated lazily by the shell commands, never evicted and never
//! persisted. Staleness against the live registry is accepted; nothing here
//! refreshes behind the user's back. Tags are keyed uniformly by repository
//! name so that `tree` and `tags` agree on what is cached.

use std::collections::HashMap;

/// Repositories and tags seen during this session.
#[derive(Debug, Default)]
pub struct SessionState {
    repositories: Vec<String>,
    tags: HashMap<String, Vec<String>>,
}

impl SessionState {
    /// Replaces the cached repository list with a fresh catalog listing.
    pub fn set_repositories(&mut self, repositories: Vec<String>) {
        self.repositories = repositories;
    }

    /// Returns the last-fetched repository list.
    pub fn repositories(&self) -> &[String] {
        &self.repositories
    }

    /// Returns whether `name` was present in the last catalog listing.
    pub fn has_repository(&self, name: &str) -> bool {
        self.repositories.iter().any(|r| r == name)
    }

    /// Caches the tags of a repository, sorted lexicographically, and
    /// returns the sorted slice.
    pub fn cache_tags(&mut self, name: &str, mut tags: Vec<String>) -> &[String] {
        tags.sort();
        let entry = self.tags.entry(name.to_string()).or_default();
        *entry = tags;
        entry
    }

    /// Returns the cached tags for a repository, if any were fetched.
    pub fn tags_for(&self, name: &str) -> Option<&[String]> {
        self.tags.get(name).map(Vec::as_slice)
    }

    /// Repository names starting with `prefix`, for completion.
    pub fn repository_candidates(&self, prefix: &str) -> Vec<String> {
        self.repositories
            .iter()
            .filter(|r| r.starts_with(prefix))
            .cloned()
            .collect()
    }

    /// Cached tags of `name` starting with `prefix` and not already listed
    /// in `used`, for completion of further `rmi` arguments.
    pub fn tag_candidates(&self, name: &str, prefix: &str, used: &[&str]) -> Vec<String> {
        self.tags_for(name)
            .unwrap_or_default()
            .iter()
            .filter(|t| t.starts_with(prefix) && !used.contains(&t.as_str()))
            .cloned()
            .collect()
    }
}
