/*!
 * Error types for the tarjama application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

impl ProviderError {
    /// Whether retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::ConnectionError(_) | Self::RateLimitExceeded(_) => true,
            Self::ApiError { status_code, .. } => *status_code >= 500,
            _ => false,
        }
    }
}

/// Errors raised by the glossary and translation memory stores
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// The store file exists but could not be read
    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The store file could not be rewritten
    #[error("Failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The store file is not a flat JSON object of strings
    #[error("Malformed store file {path:?}: {message}")]
    Corrupt {
        path: PathBuf,
        message: String,
    },
}

/// Errors raised when an input document cannot be parsed or serialized
#[derive(Error, Debug)]
pub enum FormatError {
    /// Input is not valid UTF-8
    #[error("Invalid UTF-8 in input: {0}")]
    Encoding(String),

    /// Input is not well-formed XML
    #[error("Malformed XML: {0}")]
    Xml(String),

    /// The file extension does not map to a supported format
    #[error("Unsupported input format: {0}")]
    Unsupported(String),
}

/// Errors that can occur during translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error persisting to the glossary or the translation memory
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from the glossary or translation memory stores
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Error parsing or writing the document
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A job was started while another one is still running
    #[error("A translation job is already running")]
    JobAlreadyRunning,

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<TranslationError> for AppError {
    fn from(error: TranslationError) -> Self {
        match error {
            TranslationError::Provider(e) => Self::Provider(e),
            TranslationError::Persistence(e) => Self::Persistence(e),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
