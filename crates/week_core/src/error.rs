use thiserror::Error;

/// Failure surfaced to callers. Every variant carries a stable code that the
/// CLI prints ahead of the message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    /// The caller supplied something unusable: blank text, unknown id or day.
    #[error("invalid_input - {0}")]
    InvalidInput(String),
    /// Stored or configured data could not be understood.
    #[error("invalid_data - {0}")]
    InvalidData(String),
    #[error("io_error - {0}")]
    Io(String),
}

impl AppError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData(message.into())
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::Io(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::InvalidData(_) => "invalid_data",
            Self::Io(_) => "io_error",
        }
    }

    pub fn message(&self) -> &str {
        let (Self::InvalidInput(message) | Self::InvalidData(message) | Self::Io(message)) = self;
        message
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::invalid_data(err.to_string())
    }
}
