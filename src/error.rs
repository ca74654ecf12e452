//! Crate-wide error taxonomy

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A single metrics read failed. The tick is skipped; nothing is
    /// persisted and the loop keeps running.
    #[error("system metrics unavailable: {0}")]
    MetricsUnavailable(String),

    /// Rejected at the call boundary; session state is unchanged.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The backing database could not be opened or its schema created.
    /// Fatal to startup.
    #[error("storage unavailable at {}: {source}", .path.display())]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// A single append failed. Recording continues; the row is lost.
    #[error("failed to append sample: {0}")]
    WriteFailed(#[source] rusqlite::Error),

    #[error("failed to read samples: {0}")]
    ReadFailed(#[source] rusqlite::Error),
}
