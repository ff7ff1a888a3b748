//! Remote reference lookup.
//!
//! The resolvers only see the [`RefLookup`] trait. [`GitHubClient`] talks to
//! the GitHub REST API over blocking HTTP; [`MemoryLookup`] answers from
//! in-memory tables for offline runs and tests.

use std::cell::Cell;
use std::collections::HashMap;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::config::PinConfig;
use crate::errors::{PinError, Result};
use crate::types::{GitObject, TagRef};

/// Read operations against a service that knows a repository's tags.
///
/// `repo` is always a bare `owner/name`. `Ok(None)` means the service
/// reported that the requested item does not exist.
pub trait RefLookup {
    /// Looks up a single tag reference by exact name.
    fn get_tag_ref(&self, repo: &str, tag: &str) -> Result<Option<GitObject>>;

    /// Dereferences an annotated tag object to the object it designates.
    fn get_tag_object(&self, repo: &str, sha: &str) -> Result<Option<GitObject>>;

    /// Lists every tag reference in the repository.
    fn list_tag_refs(&self, repo: &str) -> Result<Option<Vec<TagRef>>>;
}

// ---------------------------------------------------------------------------
// GitHub REST API
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RefPayload {
    #[serde(rename = "ref")]
    name: String,
    object: GitObject,
}

#[derive(Debug, Deserialize)]
struct TagObjectPayload {
    object: GitObject,
}

/// Unauthenticated GitHub REST API client.
pub struct GitHubClient {
    agent: ureq::Agent,
    api_base_url: String,
    user_agent: String,
}

impl GitHubClient {
    /// Builds a client from the API base URL, user agent and timeout in
    /// `config`.
    pub fn new(config: &PinConfig) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_secs)))
            .build()
            .into();

        Self {
            agent,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            user_agent: config.user_agent.clone(),
        }
    }

    fn repo_url(&self, repo: &str, tail: &str) -> String {
        format!("{}/repos/{}/{}", self.api_base_url, repo, tail)
    }

    /// Issues a GET and decodes the JSON body. A 404 maps to `Ok(None)`.
    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>> {
        debug!(url, "GET");
        let response = self
            .agent
            .get(url)
            .header("User-Agent", self.user_agent.as_str())
            .header("Accept", "application/vnd.github+json")
            .call();

        match response {
            Ok(mut response) => {
                let body = response
                    .body_mut()
                    .read_json::<T>()
                    .map_err(|e| PinError::LookupFailed {
                        message: format!("failed to decode response: {e}"),
                        url: url.to_string(),
                    })?;
                Ok(Some(body))
            }
            Err(ureq::Error::StatusCode(404)) => Ok(None),
            Err(ureq::Error::StatusCode(code)) => Err(PinError::LookupFailed {
                message: format!("HTTP status {code}"),
                url: url.to_string(),
            }),
            Err(e) => Err(PinError::LookupFailed {
                message: e.to_string(),
                url: url.to_string(),
            }),
        }
    }
}

impl RefLookup for GitHubClient {
    fn get_tag_ref(&self, repo: &str, tag: &str) -> Result<Option<GitObject>> {
        let url = self.repo_url(repo, &format!("git/ref/tags/{tag}"));
        let payload: Option<RefPayload> = self.get_json(&url)?;
        Ok(payload.map(|p| p.object))
    }

    fn get_tag_object(&self, repo: &str, sha: &str) -> Result<Option<GitObject>> {
        let url = self.repo_url(repo, &format!("git/tags/{sha}"));
        let payload: Option<TagObjectPayload> = self.get_json(&url)?;
        Ok(payload.map(|p| p.object))
    }

    fn list_tag_refs(&self, repo: &str) -> Result<Option<Vec<TagRef>>> {
        let url = self.repo_url(repo, "git/refs/tags");
        let payload: Option<Vec<RefPayload>> = self.get_json(&url)?;
        Ok(payload.map(|refs| {
            refs.into_iter()
                .map(|r| TagRef {
                    name: r
                        .name
                        .strip_prefix("refs/tags/")
                        .unwrap_or(&r.name)
                        .to_string(),
                    object: r.object,
                })
                .collect()
        }))
    }
}

// ---------------------------------------------------------------------------
// In-memory lookup
// ---------------------------------------------------------------------------

/// Lookup backed by in-memory tables.
///
/// Repositories are registered with their tags; annotated tag objects are
/// registered separately. Repositories marked as failing return
/// `LookupFailed` from every call. Call counters let callers check which
/// requests a run actually made.
#[derive(Debug, Default)]
pub struct MemoryLookup {
    tags: HashMap<String, Vec<TagRef>>,
    tag_objects: HashMap<(String, String), GitObject>,
    failing: Vec<String>,
    ref_calls: Cell<usize>,
    object_calls: Cell<usize>,
    list_calls: Cell<usize>,
}

impl MemoryLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a lightweight tag pointing directly at a commit.
    pub fn with_commit_tag(mut self, repo: &str, tag: &str, commit: &str) -> Self {
        self.tags.entry(repo.to_string()).or_default().push(TagRef {
            name: tag.to_string(),
            object: GitObject::commit(commit),
        });
        self
    }

    /// Registers an annotated tag: the ref points at `tag_sha`, which
    /// dereferences to `commit`.
    pub fn with_annotated_tag(mut self, repo: &str, tag: &str, tag_sha: &str, commit: &str) -> Self {
        self.tags.entry(repo.to_string()).or_default().push(TagRef {
            name: tag.to_string(),
            object: GitObject::tag(tag_sha),
        });
        self.tag_objects.insert(
            (repo.to_string(), tag_sha.to_string()),
            GitObject::commit(commit),
        );
        self
    }

    /// Makes every lookup against `repo` fail.
    pub fn with_failing_repo(mut self, repo: &str) -> Self {
        self.failing.push(repo.to_string());
        self
    }

    /// Number of `get_tag_ref` calls made so far.
    pub fn ref_calls(&self) -> usize {
        self.ref_calls.get()
    }

    /// Number of `get_tag_object` calls made so far.
    pub fn object_calls(&self) -> usize {
        self.object_calls.get()
    }

    /// Number of `list_tag_refs` calls made so far.
    pub fn list_calls(&self) -> usize {
        self.list_calls.get()
    }

    fn check_failing(&self, repo: &str, what: &str) -> Result<()> {
        if self.failing.iter().any(|r| r == repo) {
            return Err(PinError::LookupFailed {
                message: "simulated failure".to_string(),
                url: format!("memory://{repo}/{what}"),
            });
        }
        Ok(())
    }
}

impl RefLookup for MemoryLookup {
    fn get_tag_ref(&self, repo: &str, tag: &str) -> Result<Option<GitObject>> {
        self.ref_calls.set(self.ref_calls.get() + 1);
        self.check_failing(repo, tag)?;
        Ok(self
            .tags
            .get(repo)
            .and_then(|tags| tags.iter().find(|t| t.name == tag))
            .map(|t| t.object.clone()))
    }

    fn get_tag_object(&self, repo: &str, sha: &str) -> Result<Option<GitObject>> {
        self.object_calls.set(self.object_calls.get() + 1);
        self.check_failing(repo, sha)?;
        Ok(self
            .tag_objects
            .get(&(repo.to_string(), sha.to_string()))
            .cloned())
    }

    fn list_tag_refs(&self, repo: &str) -> Result<Option<Vec<TagRef>>> {
        self.list_calls.set(self.list_calls.get() + 1);
        self.check_failing(repo, "tags")?;
        Ok(self.tags.get(repo).cloned())
    }
}
