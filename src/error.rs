//! Error taxonomy shared by every stream operation.

use std::io;

/// Failure of a [`crate::StreamHandle`] operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The backend reported a failure (open, short write, release, size).
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    /// The handle has no live backend (closed, freed or dropped).
    #[error("invalid stream handle: the backend has already been released")]
    InvalidHandle,

    /// Malformed construction parameters.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        Error::Io {
            context: context.into(),
            source,
        }
    }

    /// The underlying [`io::ErrorKind`], when this is an I/O failure.
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            Error::Io { source, .. } => Some(source.kind()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
