//! Error types for the spectacle client

use thiserror::Error;

/// Result type alias for spectacle operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the spectacle client
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Undecodable discovery beacon; dropped and logged, never fatal
    #[error("malformed beacon: {0}")]
    MalformedBeacon(String),

    /// Stream transport error (connect failure, idle timeout, mid-stream error)
    #[error("stream error: {0}")]
    Stream(String),

    /// Pathological stream data: an unterminated frame outgrew the buffer cap
    #[error("corrupt stream: {0}")]
    StreamCorrupt(String),

    /// Upload exchange error (transport, status, or response shape)
    #[error("upload error: {0}")]
    Upload(String),

    /// Speech recognizer or speech output error
    #[error("speech error: {0}")]
    Speech(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
