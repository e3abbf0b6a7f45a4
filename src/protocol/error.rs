use std::io;
use thiserror::Error;

/// Errors surfaced by the response pipeline.
///
/// All failures are reported synchronously to the caller of the failing
/// operation; nothing is retried internally. A failed transmission is a
/// whole-new-response decision for the caller, since the attached source may
/// already be partially drained.
#[derive(Debug, Error)]
pub enum ResponseError {
    /// The handle offered to `attach` is not a readable source anymore.
    #[error("invalid source handle: {reason}")]
    InvalidSource { reason: String },

    /// Direct byte content was assigned to a stream-backed response.
    #[error("content cannot be set on a stream-backed response")]
    ContentNotSupported,

    /// A body send was attempted with no source attached.
    #[error("no source handle attached to the response")]
    MissingSource,

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ResponseError {
    pub fn invalid_source<S: ToString>(reason: S) -> Self {
        Self::InvalidSource { reason: reason.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }

    /// True for failures that occur strictly before any body byte is copied,
    /// leaving the response replayable on the same instance.
    pub fn is_replayable(&self) -> bool {
        matches!(self, Self::MissingSource)
    }
}
