use thiserror::Error;

/// Errors that can occur while pinning action references.
///
/// A reference that simply does not exist is not an error; resolvers report
/// that case as `Ok(None)`.
#[derive(Error, Debug)]
pub enum PinError {
    #[error("invalid repository slug '{slug}': expected owner/name[/path]")]
    InvalidSlug { slug: String },

    #[error("lookup failed: {message} (url: {url})")]
    LookupFailed { message: String, url: String },

    #[error("'{path}' is not a valid file or directory")]
    InvalidPath { path: String },

    #[error("file error: {message} (path: {path})")]
    File { message: String, path: String },

    #[error("config error: {message}")]
    Config { message: String },
}

/// Convenience alias for results using `PinError`.
pub type Result<T> = std::result::Result<T, PinError>;
