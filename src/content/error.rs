//! Errors raised while reading and parsing content items

use std::path::PathBuf;

use thiserror::Error;

/// Failure to load or parse a single content item, or the whole source
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("no front-matter block: content must start with a `---` line and close with another")]
    MissingFrontMatter,

    #[error("invalid front-matter on line {line}: {message}")]
    InvalidFrontMatter { line: usize, message: String },

    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("invalid date `{value}` in field `{field}`")]
    InvalidDate { field: &'static str, value: String },

    #[error("content source unavailable: {}", .0.display())]
    SourceUnavailable(PathBuf),

    #[error("invalid include pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
