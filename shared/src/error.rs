//! Error types for the appointment inbox Lambda functions.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the appointment inbox Lambda functions.
#[derive(Error, Debug)]
pub enum Error {
    /// Wrong HTTP verb
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Validation error (missing required field)
    #[error("Validation error: {0}")]
    Validation(String),

    /// No JSON object could be located or decoded in the model output
    #[error("Extraction error: {0}")]
    ExtractionParse(String),

    /// Generative model call failed
    #[error("Model error: {0}")]
    Model(String),

    /// Document store failure (including not-found and permission failures)
    #[error("Store error: {0}")]
    Store(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP transport error
    #[error("Request error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::MethodNotAllowed => 405,
            Error::Validation(_) => 400,
            _ => 500,
        }
    }
}
