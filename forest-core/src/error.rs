//! Error types for the forest core.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ForestError>;

/// Errors produced while validating input or loading configuration.
///
/// None of these are fatal: the caller is expected to surface the message
/// and let the user correct the input.
#[derive(Error, Debug)]
pub enum ForestError {
    #[error("Invalid token count: {0}")]
    InvalidTokens(String),

    #[error("Could not detect a token column in the CSV")]
    NoTokenColumn,

    #[error("The CSV contains no usage rows")]
    EmptyUsage,

    #[error("Invalid config value for `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
