use std::path::PathBuf;

use serde::Deserialize;

/// Kind of git object a reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Commit,
    /// An annotated tag object that must be dereferenced once.
    Tag,
    #[serde(other)]
    Other,
}

impl ObjectKind {
    /// Returns the string representation used by the lookup API.
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Commit => "commit",
            ObjectKind::Tag => "tag",
            ObjectKind::Other => "other",
        }
    }
}

/// A git object as reported by the lookup service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GitObject {
    pub sha: String,
    #[serde(rename = "type")]
    pub kind: ObjectKind,
}

impl GitObject {
    pub fn commit(sha: impl Into<String>) -> Self {
        Self {
            sha: sha.into(),
            kind: ObjectKind::Commit,
        }
    }

    pub fn tag(sha: impl Into<String>) -> Self {
        Self {
            sha: sha.into(),
            kind: ObjectKind::Tag,
        }
    }
}

/// A tag reference: the tag name (without `refs/tags/`) and the object it
/// points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRef {
    pub name: String,
    pub object: GitObject,
}

/// Classification of the literal ref after the `@` in a step reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefKind {
    /// A mutable version label such as `v4` or `5.0.1`.
    VersionTag,
    /// Exactly 40 lowercase hexadecimal characters.
    CommitId,
    Other,
}

impl RefKind {
    /// Classifies a ref string without consulting the lookup service.
    ///
    /// The commit check runs first, so an all-digit 40 character ref is a
    /// commit id.
    pub fn of(git_ref: &str) -> RefKind {
        if is_commit_id(git_ref) {
            RefKind::CommitId
        } else if is_version_tag(git_ref) {
            RefKind::VersionTag
        } else {
            RefKind::Other
        }
    }
}

/// Returns `true` for exactly 40 lowercase hex characters.
pub fn is_commit_id(s: &str) -> bool {
    s.len() == 40 && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Returns `true` for `v?\d+(\.\d+)*`.
pub fn is_version_tag(s: &str) -> bool {
    let digits = s.strip_prefix('v').unwrap_or(s);
    dotted_numbers(digits)
}

/// Returns `true` for labels eligible for preferred selection: `v\d+(\.\d+)*`.
pub fn is_version_label(s: &str) -> bool {
    s.strip_prefix('v').is_some_and(dotted_numbers)
}

fn dotted_numbers(s: &str) -> bool {
    !s.is_empty()
        && s
            .split('.')
            .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()))
}

/// A `uses:` line split into its parts.
///
/// `prefix` keeps the original indentation and `uses:` token verbatim, and
/// `separator` is the whitespace between the ref and the trailing comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReference {
    pub prefix: String,
    /// `owner/name[/subpath...]`.
    pub repository_slug: String,
    pub git_ref: String,
    pub separator: String,
    /// The trailing comment including its leading `#`.
    pub trailing_comment: Option<String>,
}

impl StepReference {
    pub fn ref_kind(&self) -> RefKind {
        RefKind::of(&self.git_ref)
    }

    /// A comment is bare when it is absent or holds nothing but `#`.
    pub fn has_label_comment(&self) -> bool {
        self.trailing_comment
            .as_deref()
            .map(str::trim)
            .is_some_and(|c| !c.is_empty() && c != "#")
    }
}

/// The shape of a single line, produced by one classification step.
///
/// Variants are checked in declaration order: pinned shapes take precedence
/// over tag references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineShape {
    /// Pinned to a commit and already carrying a label comment.
    PinnedAnnotated(StepReference),
    /// Pinned to a commit with no comment or a bare `#`.
    PinnedBare(StepReference),
    /// Referencing a mutable version tag.
    TagReference(StepReference),
    Unrelated,
}

/// Result of rewriting one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOutcome {
    pub new_line: String,
    pub changed: bool,
}

impl RewriteOutcome {
    pub fn unchanged(line: &str) -> Self {
        Self {
            new_line: line.to_string(),
            changed: false,
        }
    }

    pub fn changed(new_line: String) -> Self {
        Self {
            new_line,
            changed: true,
        }
    }
}

/// Result of rewriting a file's text content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRewrite {
    pub content: String,
    /// Number of lines that changed.
    pub changes: usize,
}

/// Outcome of processing one workflow file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub path: PathBuf,
    pub changes: usize,
    /// Whether the file was written back to disk.
    pub written: bool,
}

/// A file that could not be processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Accumulated results of a run over one file or a directory of files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub reports: Vec<FileReport>,
    pub failures: Vec<FileFailure>,
    pub total_changes: usize,
}

impl RunSummary {
    /// Adds a file report and returns the updated summary.
    pub fn with_report(mut self, report: FileReport) -> Self {
        self.total_changes += report.changes;
        self.reports.push(report);
        self
    }

    /// Adds a failed file and returns the updated summary.
    pub fn with_failure(mut self, failure: FileFailure) -> Self {
        self.failures.push(failure);
        self
    }
}
