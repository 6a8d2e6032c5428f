use thiserror::Error;

/// Failure of a read operation.
///
/// The site that detects the problem posts a diagnostic and returns one of
/// these; callers only propagate it. A container that was being filled when
/// the error happened keeps whatever was read before the failure.
#[derive(Debug, Error)]
pub enum ReadError {
    /// Malformed input at a known position.
    #[error("line {line}: {message}")]
    Invalid {
        /// Line number in the input (1-based, 0 for binary streams).
        line: usize,
        /// Human readable description, identical to the posted diagnostic.
        message: String,
    },

    /// The stream ended in the middle of a value.
    #[error("premature end of file at line {line}")]
    PrematureEof {
        /// Line number where the stream ran out.
        line: usize,
    },

    /// Underlying I/O failure while loading the stream.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ReadError {
    /// The line the error refers to, if any.
    pub const fn line(&self) -> Option<usize> {
        match self {
            Self::Invalid { line, .. } | Self::PrematureEof { line } => Some(*line),
            Self::Io(_) => None,
        }
    }
}
