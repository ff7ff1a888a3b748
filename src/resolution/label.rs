use std::cmp::Ordering;

use tracing::{debug, warn};

use crate::errors::Result;
use crate::lookup::RefLookup;
use crate::types::{is_version_label, ObjectKind, TagRef};

use super::owner_repo;

/// Finds the human-readable version label for a pinned commit.
pub struct LabelResolver<'a> {
    lookup: &'a dyn RefLookup,
}

impl<'a> LabelResolver<'a> {
    pub fn new(lookup: &'a dyn RefLookup) -> Self {
        Self { lookup }
    }

    /// Returns the best tag pointing at `commit`, or `None` if no tag does.
    ///
    /// Fetches all tags of the repository in one request and dereferences
    /// annotated tags one level each. A tag whose dereference fails is
    /// skipped. A repository whose tag list cannot be found yields `None`.
    pub fn resolve(&self, slug: &str, commit: &str) -> Result<Option<String>> {
        let repo = owner_repo(slug)?;

        let Some(tags) = self.lookup.list_tag_refs(&repo)? else {
            warn!(repo = %repo, "could not fetch tags");
            return Ok(None);
        };

        let mut candidates = Vec::new();
        for tag in &tags {
            if self.target_commit(&repo, tag).as_deref() == Some(commit) {
                candidates.push(tag.name.clone());
            }
        }

        debug!(repo = %repo, sha = commit, candidates = ?candidates, "matching tags");
        Ok(select_label(&candidates))
    }

    /// The commit a tag designates, or `None` when it cannot be determined.
    fn target_commit(&self, repo: &str, tag: &TagRef) -> Option<String> {
        match tag.object.kind {
            ObjectKind::Commit => Some(tag.object.sha.clone()),
            ObjectKind::Tag => match self.lookup.get_tag_object(repo, &tag.object.sha) {
                Ok(Some(target)) => Some(target.sha),
                Ok(None) => {
                    debug!(repo, tag = %tag.name, "annotated tag object not found");
                    None
                }
                Err(e) => {
                    warn!(repo, tag = %tag.name, error = %e, "failed to dereference tag");
                    None
                }
            },
            ObjectKind::Other => {
                debug!(repo, tag = %tag.name, kind = tag.object.kind.as_str(), "skipping tag");
                None
            }
        }
    }
}

/// Picks the preferred label among tags pointing at the same commit.
///
/// Version labels (`v1`, `v1.2.3`) win over anything else; among them the
/// one with the fewest dot-separated components is chosen, ties broken by
/// plain string order (so `v10` sorts before `v9`). Without any version
/// label the first candidate is returned.
pub fn select_label(candidates: &[String]) -> Option<String> {
    candidates
        .iter()
        .filter(|c| is_version_label(c))
        .min_by(|a, b| compare_labels(a, b))
        .or_else(|| candidates.first())
        .cloned()
}

fn compare_labels(a: &str, b: &str) -> Ordering {
    let components = |s: &str| s.split('.').count();
    components(a)
        .cmp(&components(b))
        .then_with(|| a.cmp(b))
}
