//! Error types and handling for the `SkyCast` service

use thiserror::Error;

/// Main error type for the `SkyCast` service
#[derive(Error, Debug)]
pub enum SkycastError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Export request arrived without a format keyword
    #[error("Format parameter is required")]
    MissingFormat,

    /// Export request arrived without a location identifier or coordinates
    #[error("Location or coordinates are required")]
    MissingLocation,

    /// Export format keyword is not one we can render
    #[error("Unsupported format: {keyword}")]
    UnsupportedFormat { keyword: String },

    /// Input validation errors
    #[error("{message}")]
    Validation { message: String },

    /// A requested record does not exist
    #[error("{message}")]
    NotFound { message: String },

    /// Attempt to create a record that already exists
    #[error("{message}")]
    Conflict { message: String },

    /// The upstream weather API returned an error
    #[error("Upstream weather API error: {message}")]
    Upstream { message: String },

    /// A renderer failed while assembling its output
    #[error("Failed to render report: {message}")]
    Render { message: String },

    /// Database operation errors
    #[error("Database error: {source}")]
    Store {
        #[from]
        source: rusqlite::Error,
    },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl SkycastError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new not-found error
    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a new conflict error
    pub fn conflict<S: Into<String>>(message: S) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Create a new upstream API error
    pub fn upstream<S: Into<String>>(message: S) -> Self {
        Self::Upstream {
            message: message.into(),
        }
    }

    /// Create a new render error
    pub fn render<S: Into<String>>(message: S) -> Self {
        Self::Render {
            message: message.into(),
        }
    }

    /// Create a new unsupported-format error
    pub fn unsupported_format<S: Into<String>>(keyword: S) -> Self {
        Self::UnsupportedFormat {
            keyword: keyword.into(),
        }
    }
}
