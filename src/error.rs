//! Error types for txtbook operations.

use thiserror::Error;

/// Errors that can occur while ingesting or reading a document.
///
/// Decoding and structure detection never fail: they degrade to a lossy
/// UTF-8 decode and to paragraph chunking respectively, and report that
/// through [`DetectionMethod`](crate::DetectionMethod) and
/// [`Segmentation::is_fallback`](crate::Segmentation::is_fallback).
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("document has no content after sanitizing")]
    EmptyContent,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("page {page} is out of range (document has {total_pages} pages)")]
    PageOutOfRange { page: usize, total_pages: usize },

    #[error("fetch failed: {0}")]
    Fetch(String),

    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("invalid session state: {0}")]
    InvalidState(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
