/// Reference resolution module.
///
/// Converts between mutable version tags and immutable commit ids by
/// querying a [`RefLookup`](crate::lookup::RefLookup).
mod label;
mod reference;

pub use label::{select_label, LabelResolver};
pub use reference::ReferenceResolver;

use crate::errors::{PinError, Result};

/// Reduces a repository slug to the `owner/name` used for lookups.
///
/// Any subpath after the first two segments is dropped.
pub fn owner_repo(slug: &str) -> Result<String> {
    let mut parts = slug.split('/');
    match (parts.next(), parts.next()) {
        (Some(owner), Some(name)) if !owner.is_empty() && !name.is_empty() => {
            Ok(format!("{owner}/{name}"))
        }
        _ => Err(PinError::InvalidSlug {
            slug: slug.to_string(),
        }),
    }
}
