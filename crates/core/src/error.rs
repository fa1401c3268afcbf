//! Error types for Plainpage operations.
//!
//! This module defines the main error type [`PlainpageError`] which represents
//! every failure that can surface from cleaning, extraction, splicing,
//! fetching, and content generation.
//!
//! Heuristic classification failures (for example a header navigation check
//! that cannot be evaluated) never reach callers: the filters catch them and
//! keep the element.
//!
//! # Example
//!
//! ```rust
//! use plainpage_core::{Document, PlainpageError, SpliceConfig, splice_main_content};
//!
//! let doc = Document::parse("<html><body><main>OLD</main></body></html>");
//! match splice_main_content(&doc, "<main>NEW</main>", &SpliceConfig::default()) {
//!     Ok(html) => assert!(html.contains("NEW")),
//!     Err(PlainpageError::NotFound(what)) => eprintln!("missing {what}"),
//!     Err(e) => eprintln!("Error: {e}"),
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Plainpage operations.
#[derive(Error, Debug)]
pub enum PlainpageError {
    /// A required anchor element is absent.
    ///
    /// Returned when splicing and the original document has no main-content
    /// candidate to replace.
    #[error("Element not found: {0}")]
    NotFound(String),

    /// Replacement markup cannot be normalized into a single root element.
    #[error("Malformed replacement markup: {0}")]
    Malformed(String),

    /// A signature pattern does not compile.
    ///
    /// Filters treat this as "unclassifiable" and keep the element.
    #[error("Invalid signature pattern: {0}")]
    InvalidSignature(String),

    /// HTTP request errors from reqwest.
    #[cfg(feature = "fetch")]
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Request timeout.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The content generator answered without usable content.
    #[error("Content generator failed: {0}")]
    Generator(String),

    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// File I/O errors.
    #[error("Failed to write to file: {0}")]
    WriteError(#[from] std::io::Error),

    /// JSON (de)serialization errors for signature files and API payloads.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type alias for PlainpageError.
pub type Result<T> = std::result::Result<T, PlainpageError>;
