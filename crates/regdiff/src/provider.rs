//! Abstract source of positioned text fragments.
//!
//! The pipeline never touches PDF bytes directly; it pulls pages of
//! [`PositionedFragment`]s from a provider. The `pdf` feature supplies a
//! pdfium-backed implementation; tests supply fixture providers.

use crate::types::PositionedFragment;

/// One page of extracted content plus its viewport height.
#[derive(Debug, Clone, PartialEq)]
pub struct PageContent {
    pub fragments: Vec<PositionedFragment>,
    pub height: f32,
}

/// Failure modes of a page read.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The requested page index is past the end of the document. The
    /// extraction loop treats this as end-of-document, not as a fault.
    #[error("page {0} is out of range")]
    PageOutOfRange(u32),

    /// The page exists but its text content could not be read. The page is
    /// skipped and the loss is surfaced as an extraction issue.
    #[error("page {page}: {reason}")]
    PageFailed { page: u32, reason: String },
}

/// Pull-based access to a document's positioned text, one page at a time.
///
/// Implementations release any per-page handles before returning; the
/// document itself is dropped with the provider, including on error paths.
pub trait DocumentTextProvider {
    /// Number of pages, when the backing library reports it up front.
    /// Providers that only discover the end lazily may over-report; the
    /// extraction loop stops at the first [`ProviderError::PageOutOfRange`].
    fn page_count(&self) -> u32;

    /// Read one page. `index` is 0-based.
    fn page(&mut self, index: u32) -> Result<PageContent, ProviderError>;
}

/// In-memory provider over pre-built pages. Used by tests and by callers
/// that already hold fragments from another extraction library.
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    pages: Vec<PageContent>,
}

impl StaticProvider {
    pub fn new(pages: Vec<PageContent>) -> Self {
        Self { pages }
    }
}

impl DocumentTextProvider for StaticProvider {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page(&mut self, index: u32) -> Result<PageContent, ProviderError> {
        self.pages
            .get(index as usize)
            .cloned()
            .ok_or(ProviderError::PageOutOfRange(index))
    }
}
