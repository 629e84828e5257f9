//! Error types for replay persistence.

use std::fmt;
use std::io;

/// Errors surfaced when loading or saving a replay file.
///
/// Three user-visible failure classes: the stream failed (`Io`), the
/// file is not a recognized/intact replay (`Corrupted`), or it was
/// written by a newer release (`UnsupportedVersion`). Structural
/// violations produced by *this* process (scene ordering, frame link
/// bookkeeping) are bugs, not errors, and panic instead.
#[derive(Debug)]
pub enum ReplayError {
    /// An I/O error occurred during read or write.
    Io(io::Error),
    /// The file is not a recognized replay file or its header, scene
    /// table or payload is damaged.
    Corrupted {
        /// Human-readable description of what went wrong.
        detail: String,
    },
    /// The file's major format version is ahead of this reader.
    ///
    /// Distinct from [`ReplayError::Corrupted`] so the caller can say
    /// "upgrade required" rather than "file is damaged".
    UnsupportedVersion {
        /// Major version found in the file.
        major: u8,
        /// Minor version found in the file.
        minor: u8,
    },
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Corrupted { detail } => write!(f, "corrupted replay file: {detail}"),
            Self::UnsupportedVersion { major, minor } => {
                write!(f, "unsupported replay format version {major}.{minor}")
            }
        }
    }
}

impl std::error::Error for ReplayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ReplayError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl ReplayError {
    /// Shorthand for a [`ReplayError::Corrupted`] with the given detail.
    pub(crate) fn corrupted(detail: impl Into<String>) -> Self {
        Self::Corrupted {
            detail: detail.into(),
        }
    }
}
