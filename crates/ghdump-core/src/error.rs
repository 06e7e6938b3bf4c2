//! Error types for loading and rendering.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Loading and rendering errors
#[derive(Debug, Error)]
pub enum Error {
    /// Source file could not be opened
    #[error("cannot open {}: {source}", path.display())]
    Open {
        /// Path that failed to open
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// File metadata could not be queried
    #[error("cannot stat {}: {source}", path.display())]
    Metadata {
        /// Path that failed the metadata query
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Source is a directory, device or other non-regular file
    #[error("{} is not a regular file", path.display())]
    NotRegularFile {
        /// Offending path
        path: PathBuf,
    },

    /// File is larger than addressable memory
    #[error("{} is too large to load ({size} bytes)", path.display())]
    TooLarge {
        /// Offending path
        path: PathBuf,
        /// Reported file size
        size: u64,
    },

    /// Reading a streaming source failed
    #[error("cannot read source: {source}")]
    SourceRead {
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// A partition worker failed to seek or read its range
    #[error("partition {index} [{start}, {end}) read failed: {source}")]
    PartitionRead {
        /// Partition index
        index: usize,
        /// First byte of the partition
        start: u64,
        /// One past the last byte of the partition
        end: u64,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// A partition worker thread could not be started
    #[error("cannot spawn partition worker {index}: {source}")]
    Spawn {
        /// Partition index
        index: usize,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// A partition worker panicked
    #[error("partition worker {index} panicked")]
    WorkerPanicked {
        /// Partition index
        index: usize,
    },

    /// An option value is out of range
    #[error("invalid option: {0}")]
    InvalidOption(String),

    /// Writing formatted output failed
    #[error("cannot write {target}: {source}")]
    Output {
        /// Destination description (file path or `stdout`)
        target: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The operation was cancelled through a [`crate::CancelToken`]
    #[error("operation cancelled")]
    Cancelled,
}

/// Coarse error category, used to pick a process exit status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing, unreadable or unsuitable input file
    Input,
    /// Bad option value
    Usage,
    /// Partitioned read failure
    PartitionRead,
    /// Destination could not be written
    Output,
    /// Cancelled by the caller
    Cancelled,
    /// Bug or worker panic
    Internal,
}

impl Error {
    /// Classify this error
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Open { .. }
            | Self::Metadata { .. }
            | Self::NotRegularFile { .. }
            | Self::TooLarge { .. }
            | Self::SourceRead { .. } => ErrorKind::Input,
            Self::InvalidOption(_) => ErrorKind::Usage,
            Self::PartitionRead { .. } => ErrorKind::PartitionRead,
            Self::Output { .. } => ErrorKind::Output,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Spawn { .. } | Self::WorkerPanicked { .. } => ErrorKind::Internal,
        }
    }

    pub(crate) fn output(target: impl Into<String>, source: io::Error) -> Self {
        Self::Output {
            target: target.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let err = Error::Open {
            path: PathBuf::from("/nope"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert_eq!(err.kind(), ErrorKind::Input);
        assert_eq!(
            Error::InvalidOption("x".into()).kind(),
            ErrorKind::Usage
        );
        assert_eq!(Error::Cancelled.kind(), ErrorKind::Cancelled);
        assert_eq!(
            Error::WorkerPanicked { index: 2 }.kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_partition_error_message() {
        let err = Error::PartitionRead {
            index: 3,
            start: 10,
            end: 20,
            source: io::Error::from(io::ErrorKind::UnexpectedEof),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("partition 3 [10, 20) read failed"));
        assert_eq!(err.kind(), ErrorKind::PartitionRead);
    }
}
