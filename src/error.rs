//! Error types and handling infrastructure for slidewise.
//!
//! This module provides a centralized error handling system using `thiserror` for
//! custom error types. The binary layers `anyhow` on top for application-level context.
//!
//! ## Design Principles
//!
//! - **User-friendly messages**: Every error is rendered verbatim in the response panel or
//!   status line, so messages must read well on their own
//! - **Context preservation**: Endpoint paths and page numbers travel with the error
//! - **Consistency**: Standardized Result type across all modules

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for slidewise operations.
///
/// Covers backend communication, document loading and rendering, configuration
/// and terminal interaction.
#[derive(Error, Debug)]
pub enum SlideError {
    /// Transport-level failure talking to the backend (connection refused, reset, ...)
    #[error("Request to {endpoint} failed: {source}")]
    Http {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The backend did not answer within the configured timeout
    #[error("Request to {endpoint} timed out")]
    Timeout { endpoint: String },

    /// The backend answered with a non-success HTTP status and no usable payload
    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },

    /// The backend answered but reported `success: false`
    #[error("{message}")]
    Backend { message: String },

    /// The payload could not be decoded into the expected shape
    #[error("Malformed response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    /// Document bytes could not be opened as a paged document
    #[error("Document error: {message}")]
    Document { message: String },

    /// Requested page is outside the document
    #[error("Page {page} out of bounds (total: {total})")]
    PageOutOfRange { page: u32, total: u32 },

    /// Rasterizing a page failed
    #[error("Failed to render slide {page}: {message}")]
    Render { page: u32, message: String },

    /// File system related errors (file not found, permission denied, etc.)
    #[error("File operation failed: {message}")]
    FileError {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// File not found specifically (common case for user feedback)
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Path exists but is not a regular file
    #[error("Path is not a regular file: {path}")]
    NotAFile { path: PathBuf },

    /// Configuration related errors
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Generic error for cases not covered by specific variants
    #[error("Operation failed: {message}")]
    Other { message: String },
}

/// Standard Result type for slidewise operations.
pub type Result<T> = std::result::Result<T, SlideError>;

impl SlideError {
    /// Classify a reqwest error raised while talking to `endpoint`
    pub fn http(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        let endpoint = endpoint.into();
        if source.is_timeout() {
            Self::Timeout { endpoint }
        } else {
            Self::Http { endpoint, source }
        }
    }

    /// Create a Backend error carrying the server-provided message
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// Create a Decode error for a malformed payload
    pub fn decode(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create a Document error with a descriptive message
    pub fn document(message: impl Into<String>) -> Self {
        Self::Document {
            message: message.into(),
        }
    }

    /// Create a Render error for the given page
    pub fn render(page: u32, message: impl Into<String>) -> Self {
        Self::Render {
            page,
            message: message.into(),
        }
    }

    /// Create a FileError from an io::Error with additional context
    pub fn file_error(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::FileError {
            message: message.into(),
            source,
        }
    }

    /// Create a ConfigError with a descriptive message
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a generic Other error with a descriptive message
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// True for failures of the transport itself rather than of the payload
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Http { .. } | Self::Timeout { .. } | Self::Status { .. }
        )
    }
}

// Automatic conversion from io::Error to SlideError
impl From<std::io::Error> for SlideError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::FileError {
                message: "File not found".to_string(),
                source: err,
            },
            std::io::ErrorKind::PermissionDenied => Self::FileError {
                message: "Permission denied".to_string(),
                source: err,
            },
            _ => Self::FileError {
                message: "IO operation failed".to_string(),
                source: err,
            },
        }
    }
}
