use std::io;
use thiserror::Error;

/// Error type for sniffing and reading operations.
///
/// Only conditions that make further reading unsafe are errors. Ragged rows,
/// conversion failures and similar problems surface as [`crate::Warning`]s.
#[derive(Error, Debug)]
pub enum ScoutError {
    /// IO error while reading or seeking the underlying stream.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The byte stream could not be decoded with the resolved code page.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// A look-ahead ran past the retained buffer so the read position can
    /// not be restored.
    #[error("Buffer position lost at line {line}, record {record}; reading can not continue")]
    BufferInconsistency { line: usize, record: u64 },

    /// Reading was cancelled through a [`crate::CancellationToken`].
    #[error("Reading cancelled after record {record}")]
    Cancelled { record: u64 },

    /// Empty file or no data.
    #[error("Empty file or no data to analyze")]
    EmptyData,

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ScoutError {
    /// Returns true if this error was raised by a cancellation request.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ScoutError::Cancelled { .. })
    }
}

/// Result type alias for sniffing and reading operations.
pub type Result<T> = std::result::Result<T, ScoutError>;
