//! Error types for the extraction pipeline.
//!
//! Opening the document is the only fatal failure; everything recoverable
//! (unreadable pages, unparseable labels, duplicate ids) is surfaced as an
//! extraction issue on the result instead of an error.

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("failed to open document: {0}")]
    DocumentOpenFailed(String),
}

pub type Result<T> = std::result::Result<T, ExtractError>;
