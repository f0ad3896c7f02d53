/// Result alias that carries the custom [`WaveError`] type.
pub type Result<T> = std::result::Result<T, WaveError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum WaveError {
    /// The four leading bytes of a format chunk were not `"fmt "`.
    #[error("offset mismatch or data does not contain a wave format chunk (found {found:02x?})")]
    SignatureMismatch { found: [u8; 4] },
    /// The stream does not start with a `RIFF` / `WAVE` file header.
    #[error("stream is not a RIFF WAVE file")]
    NotRiff,
    /// A chunk required to make sense of the file could not be found.
    #[error("required `{0}` chunk not found")]
    MissingChunk(&'static str),
    /// Arguments handed to a writer cannot be encoded.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// A configuration file could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
    /// Free-form message for the application layer.
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors, including truncated streams.
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl WaveError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }

    /// Creates an [`WaveError::InvalidInput`] error.
    pub fn invalid_input<T: Into<String>>(msg: T) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Returns `true` when the error was caused by the stream ending early.
    pub fn is_truncated(&self) -> bool {
        matches!(self, Self::Io(err) if err.kind() == std::io::ErrorKind::UnexpectedEof)
    }
}

impl From<&str> for WaveError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for WaveError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
