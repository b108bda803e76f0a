//! Error types for the Fandom assistant

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Page not found: {0}")]
    NotFound(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl Error {
    /// Message without the variant prefix, used for inline transcript tags.
    pub fn detail(&self) -> String {
        match self {
            Error::Network(msg)
            | Error::NotFound(msg)
            | Error::Parse(msg)
            | Error::Provider(msg)
            | Error::Config(msg)
            | Error::InvalidArgument(msg)
            | Error::SerializationError(msg) => msg.clone(),
            Error::IoError(err) => err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Network(err.to_string())
    }
}
