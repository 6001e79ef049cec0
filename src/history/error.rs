use std::path::PathBuf;
use thiserror::Error;

/// Why an append was refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// Content is larger than the configured limit
    TooLarge { size: usize, max: usize },
    /// Content is empty or only whitespace
    Empty,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::TooLarge { size, max } => {
                write!(f, "content is {size} bytes, limit is {max} bytes")
            }
            RejectReason::Empty => write!(f, "content is empty"),
        }
    }
}

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Rejected: {0}")]
    Rejected(RejectReason),

    #[error("Search query must not be empty")]
    InvalidQuery,

    #[error("No entry with index {0}")]
    NotFound(u64),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("History file {} is corrupt: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },
}

impl HistoryError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        HistoryError::Io {
            path: path.into(),
            source,
        }
    }

    /// True for failures of the underlying file rather than of the request
    pub fn is_storage(&self) -> bool {
        matches!(self, HistoryError::Io { .. } | HistoryError::Corrupt { .. })
    }
}

pub type HistoryResult<T> = Result<T, HistoryError>;
