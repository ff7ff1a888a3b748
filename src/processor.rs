use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};
use walkdir::WalkDir;

use crate::config::{should_include_file, PinConfig};
use crate::errors::{PinError, Result};
use crate::rewrite::LineRewriter;
use crate::types::{ContentRewrite, FileFailure, FileReport, RunSummary};

/// Rewrites every line of `content` in order.
///
/// The text is split on `\n` and re-joined the same way, so the line count
/// and a trailing newline survive unchanged. A `\r` before the newline is
/// kept out of the match and restored afterwards.
pub fn rewrite_content(content: &str, rewriter: &LineRewriter<'_>) -> ContentRewrite {
    let mut changes = 0;
    let lines: Vec<String> = content
        .split('\n')
        .map(|raw| {
            let (line, cr) = match raw.strip_suffix('\r') {
                Some(stripped) => (stripped, "\r"),
                None => (raw, ""),
            };
            let outcome = rewriter.process(line);
            if outcome.changed {
                changes += 1;
            }
            format!("{}{cr}", outcome.new_line)
        })
        .collect();

    ContentRewrite {
        content: lines.join("\n"),
        changes,
    }
}

/// Processes a single workflow file.
///
/// The file is written back only when something changed and `dry_run` is
/// off.
pub fn process_file(path: &Path, rewriter: &LineRewriter<'_>, dry_run: bool) -> Result<FileReport> {
    info!(path = %path.display(), "processing");

    let source = fs::read_to_string(path).map_err(|e| PinError::File {
        message: format!("failed to read: {e}"),
        path: path.display().to_string(),
    })?;

    let result = rewrite_content(&source, rewriter);
    let written = result.changes > 0 && !dry_run;
    if written {
        write_atomic(path, &result.content)?;
    }

    Ok(FileReport {
        path: path.to_path_buf(),
        changes: result.changes,
        written,
    })
}

/// Writes to a temporary file next to the real target and renames it into
/// place, so a partial write never truncates a workflow.
///
/// A symlinked workflow is resolved first, so the link survives and its
/// target is updated. The target's permissions carry over to the new file.
fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let file_error = |message: String| PinError::File {
        message,
        path: path.display().to_string(),
    };

    let target = fs::canonicalize(path)
        .map_err(|e| file_error(format!("failed to resolve path: {e}")))?;
    let permissions = fs::metadata(&target)
        .map_err(|e| file_error(format!("failed to read metadata: {e}")))?
        .permissions();
    let tmp_path = target.with_extension("actionpin.tmp");

    fs::write(&tmp_path, content).map_err(|e| {
        file_error(format!(
            "failed to write temporary file '{}': {e}",
            tmp_path.display()
        ))
    })?;

    let replaced = fs::set_permissions(&tmp_path, permissions)
        .and_then(|()| fs::rename(&tmp_path, &target));
    replaced.map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        file_error(format!("failed to replace file: {e}"))
    })
}

/// Lists workflow files directly inside `dir` (no recursion), sorted by
/// file name. Symlinks to files are followed; entries that cannot be read
/// (such as dangling links) are skipped.
pub fn discover_workflow_files(dir: &Path, config: &PinConfig) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(PinError::File {
            message: "not a directory".to_string(),
            path: dir.display().to_string(),
        });
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if should_include_file(&name, config) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Processes a file, or every workflow file in a directory.
///
/// A file that fails to read or write is recorded in the summary and does
/// not stop the remaining files.
pub fn run(
    target: &Path,
    rewriter: &LineRewriter<'_>,
    config: &PinConfig,
    dry_run: bool,
) -> Result<RunSummary> {
    let files = if target.is_file() {
        vec![target.to_path_buf()]
    } else if target.is_dir() {
        discover_workflow_files(target, config)?
    } else {
        return Err(PinError::InvalidPath {
            path: target.display().to_string(),
        });
    };

    let summary = files
        .iter()
        .fold(RunSummary::default(), |summary, path| {
            match process_file(path, rewriter, dry_run) {
                Ok(report) => summary.with_report(report),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to process file");
                    summary.with_failure(FileFailure {
                        path: path.clone(),
                        message: e.to_string(),
                    })
                }
            }
        });

    Ok(summary)
}
