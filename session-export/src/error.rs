use thiserror::Error;

/// Reasons a host refuses a download request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("Download cancelled by user")]
    Cancelled,

    #[error("Invalid download path: {0}")]
    InvalidPath(String),

    #[error("Host rejected download: {0}")]
    Host(String),
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to serialize sessions: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, ExportError>;
