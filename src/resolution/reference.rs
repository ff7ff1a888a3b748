use tracing::{debug, warn};

use crate::errors::{PinError, Result};
use crate::lookup::RefLookup;
use crate::types::ObjectKind;

use super::owner_repo;

/// Resolves a version tag to the commit id it currently points at.
pub struct ReferenceResolver<'a> {
    lookup: &'a dyn RefLookup,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(lookup: &'a dyn RefLookup) -> Self {
        Self { lookup }
    }

    /// Resolves `tag` in the repository named by `slug`.
    ///
    /// Returns `Ok(None)` when the tag does not exist. An annotated tag is
    /// dereferenced exactly once; if that second lookup finds nothing the
    /// tag is treated as unresolved rather than pinned to the tag object.
    pub fn resolve(&self, slug: &str, tag: &str) -> Result<Option<String>> {
        let repo = owner_repo(slug)?;

        let Some(object) = self.lookup.get_tag_ref(&repo, tag)? else {
            warn!(repo = %repo, tag, "could not find tag");
            return Ok(None);
        };

        match object.kind {
            ObjectKind::Commit => Ok(Some(object.sha)),
            ObjectKind::Tag => {
                debug!(repo = %repo, tag, sha = %object.sha, "dereferencing annotated tag");
                match self.lookup.get_tag_object(&repo, &object.sha)? {
                    Some(target) => Ok(Some(target.sha)),
                    None => {
                        warn!(repo = %repo, tag, sha = %object.sha, "annotated tag object not found");
                        Ok(None)
                    }
                }
            }
            ObjectKind::Other => Err(PinError::LookupFailed {
                message: format!("tag '{tag}' points at an unsupported object type"),
                url: format!("{repo}@{tag}"),
            }),
        }
    }
}
