/// Error types shared by the store, the session gate and the portal.
///
/// A missing record id is never an error here: lookups return `None` and
/// updates/deletes on unknown ids are silent no-ops. A rejected login is an
/// `AuthOutcome`, not an error either.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The SQLite catalog could not complete the operation
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),

    /// Upload extension outside the accepted set
    #[error("unsupported file type: {file_name}")]
    UnsupportedFile { file_name: String },

    #[error("{file_name} is not a readable image: {source}")]
    InvalidImage {
        file_name: String,
        #[source]
        source: image::ImageError,
    },

    /// Store action attempted without a live session token
    #[error("not logged in or session expired")]
    Unauthorized,
}

impl Error {
    /// True for failures of the backing medium (the caller may offer a manual retry)
    pub fn is_storage(&self) -> bool {
        matches!(self, Error::Storage(_) | Error::Io(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
