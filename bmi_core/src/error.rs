//! Error types for the bmi_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for bmi_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Name, weight or height rejected at the boundary or by the engine
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The measurement store could not be read or written
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Persistence(format!("SQLite error: {}", err))
    }
}

impl Error {
    /// True for errors the user can fix by re-entering values
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Error::InvalidInput(_))
    }
}
