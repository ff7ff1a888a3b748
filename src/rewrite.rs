//! Line classification and rewriting.
//!
//! Lines are matched as raw text, never parsed as YAML. Only lines of the
//! form `<indent>uses: <owner>/<repo>[/<path>]@<ref>[ <comment>]` are
//! candidates; everything else passes through untouched.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{info, warn};

use crate::lookup::RefLookup;
use crate::resolution::{LabelResolver, ReferenceResolver};
use crate::types::{LineShape, RefKind, RewriteOutcome, StepReference};

/// Separator written between a pinned ref and a newly added label comment.
const COMMENT_SEPARATOR: &str = "  ";

static STEP_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\s+uses:\s+)([\w-]+/[\w-]+(?:/[\w-]+)*?)@([^\s#]+)(\s*)(#.*)?$")
        .expect("step line pattern is valid")
});

/// Splits a line into its step reference parts, if it is a `uses:` line.
pub fn parse_step(line: &str) -> Option<StepReference> {
    let caps = STEP_LINE.captures(line)?;
    Some(StepReference {
        prefix: caps[1].to_string(),
        repository_slug: caps[2].to_string(),
        git_ref: caps[3].to_string(),
        separator: caps[4].to_string(),
        trailing_comment: caps.get(5).map(|m| m.as_str().to_string()),
    })
}

/// Classifies a line into exactly one [`LineShape`].
///
/// The pinned check precedes the tag check; refs that are neither a commit
/// id nor a version tag make the line unrelated.
pub fn classify(line: &str) -> LineShape {
    let Some(step) = parse_step(line) else {
        return LineShape::Unrelated;
    };

    match step.ref_kind() {
        RefKind::CommitId if step.has_label_comment() => LineShape::PinnedAnnotated(step),
        RefKind::CommitId => LineShape::PinnedBare(step),
        RefKind::VersionTag => LineShape::TagReference(step),
        RefKind::Other => LineShape::Unrelated,
    }
}

/// Rewrites single lines, pinning tags and labelling bare commit pins.
pub struct LineRewriter<'a> {
    references: ReferenceResolver<'a>,
    labels: LabelResolver<'a>,
}

impl<'a> LineRewriter<'a> {
    pub fn new(lookup: &'a dyn RefLookup) -> Self {
        Self {
            references: ReferenceResolver::new(lookup),
            labels: LabelResolver::new(lookup),
        }
    }

    /// Processes one line (without its line terminator).
    ///
    /// Lookup failures never propagate: they are logged and the line is
    /// returned unchanged.
    pub fn process(&self, line: &str) -> RewriteOutcome {
        match classify(line) {
            LineShape::Unrelated | LineShape::PinnedAnnotated(_) => RewriteOutcome::unchanged(line),
            LineShape::PinnedBare(step) => self.annotate(line, &step),
            LineShape::TagReference(step) => self.pin(line, &step),
        }
    }

    fn annotate(&self, line: &str, step: &StepReference) -> RewriteOutcome {
        info!(repo = %step.repository_slug, sha = %step.git_ref, "found pinned action without version");
        match self.labels.resolve(&step.repository_slug, &step.git_ref) {
            Ok(Some(label)) => {
                info!(label = %label, "added version comment");
                RewriteOutcome::changed(format!(
                    "{}{}@{}{COMMENT_SEPARATOR}# {label}",
                    step.prefix, step.repository_slug, step.git_ref
                ))
            }
            Ok(None) => {
                info!(repo = %step.repository_slug, "could not find version tag for this SHA");
                RewriteOutcome::unchanged(line)
            }
            Err(e) => {
                warn!(repo = %step.repository_slug, error = %e, "label lookup failed");
                RewriteOutcome::unchanged(line)
            }
        }
    }

    fn pin(&self, line: &str, step: &StepReference) -> RewriteOutcome {
        info!(repo = %step.repository_slug, tag = %step.git_ref, "found tag reference");
        match self.references.resolve(&step.repository_slug, &step.git_ref) {
            Ok(Some(sha)) => {
                info!(sha = %sha, "pinned");
                // A bare `#` counts as no comment.
                let comment = match &step.trailing_comment {
                    Some(comment) if step.has_label_comment() => {
                        format!("{}{comment}", step.separator)
                    }
                    _ => format!("{COMMENT_SEPARATOR}# {}", step.git_ref),
                };
                RewriteOutcome::changed(format!(
                    "{}{}@{sha}{comment}",
                    step.prefix, step.repository_slug
                ))
            }
            Ok(None) => {
                info!(repo = %step.repository_slug, tag = %step.git_ref, "skipped, could not resolve");
                RewriteOutcome::unchanged(line)
            }
            Err(e) => {
                warn!(repo = %step.repository_slug, tag = %step.git_ref, error = %e, "tag lookup failed");
                RewriteOutcome::unchanged(line)
            }
        }
    }
}
