//! Error types for mixfold

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// mixfold errors
#[derive(Error, Debug)]
pub enum Error {
    /// The input stylesheet could not be parsed; the pipeline never runs.
    #[error("CSS parse error: {0}")]
    Parse(String),

    /// An internal contract of the lattice or statement generator was broken.
    #[error("Invariant violation: {0}")]
    Invariant(String),

    /// The destination cannot be written.
    #[error("Output error: {0}")]
    Output(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_norway::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shorthand used by the lattice and generator when a contract breaks
    pub(crate) fn invariant(message: impl Into<String>) -> Self {
        Error::Invariant(message.into())
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}
