use thiserror::Error;

#[derive(Debug, Error)]
pub enum MapError {
    #[error("i/o error: {0}")]
    Io(String),
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("boundary fetch aborted")]
    Aborted,
    #[error("WebAssembly error: {0}")]
    Wasm(String),
}

impl From<reqwest::Error> for MapError {
    fn from(err: reqwest::Error) -> Self {
        MapError::Http(err.to_string())
    }
}

impl From<serde_json::Error> for MapError {
    fn from(err: serde_json::Error) -> Self {
        MapError::Serialization(err.to_string())
    }
}

impl From<std::fmt::Error> for MapError {
    fn from(err: std::fmt::Error) -> Self {
        MapError::Serialization(err.to_string())
    }
}
