use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::exif::TagId;

/// Errors from the tag directory codec and the entry editor.
#[derive(Debug, Error)]
pub enum Error {
    /// The container carries no tag directory (or is not a container this
    /// crate understands). Callers treat this as "no metadata".
    #[error("no EXIF directory: {0}")]
    Format(&'static str),
    /// A directory is present but malformed.
    #[error("corrupt EXIF directory: {0}")]
    Corrupt(String),
    /// An edit names a tag that is unknown or not editable.
    #[error("tag {0} is not an editable entry")]
    InvalidTag(TagId),
    /// A value cannot be represented within the format's constraints.
    #[error("cannot encode EXIF directory: {0}")]
    Encode(String),
}

/// Why [`MetadataSession::load`](crate::session::MetadataSession::load) failed.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("corrupt metadata in {}: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },
}

/// Why [`MetadataSession::commit`](crate::session::MetadataSession::commit) failed.
#[derive(Debug, Error)]
pub enum CommitError {
    #[error("no image is loaded")]
    NothingLoaded,
    #[error("tag {0} is not an editable entry")]
    InvalidTag(TagId),
    #[error("cannot encode metadata: {0}")]
    Encode(String),
    #[error("cannot write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl From<Error> for CommitError {
    fn from(err: Error) -> Self {
        match err {
            Error::InvalidTag(tag) => CommitError::InvalidTag(tag),
            Error::Encode(msg) => CommitError::Encode(msg),
            other => CommitError::Encode(other.to_string()),
        }
    }
}
