//! Pdfium-backed fragment provider.
//!
//! Requires the `pdf` feature. The document handle lives only for the
//! duration of [`extract`]; pages are read and released one at a time.

use pdfium_render::prelude::*;

use crate::config::TuningConfig;
use crate::error::{ExtractError, Result};
use crate::extract::extract_from_provider;
use crate::provider::{DocumentTextProvider, PageContent, ProviderError};
use crate::types::{ExtractedDocument, PositionedFragment, Side};

/// Extract a clause tree from raw PDF bytes.
///
/// Fails only when the pdfium library cannot be bound or the document
/// cannot be opened; per-page read failures surface as issues on the
/// returned document.
pub fn extract(buffer: &[u8], side: Side, config: &TuningConfig) -> Result<ExtractedDocument> {
    let bindings = Pdfium::bind_to_system_library()
        .map_err(|e| ExtractError::DocumentOpenFailed(format!("pdfium unavailable: {e:?}")))?;
    let pdfium = Pdfium::new(bindings);
    let document = pdfium
        .load_pdf_from_byte_slice(buffer, None)
        .map_err(|e| ExtractError::DocumentOpenFailed(format!("{e:?}")))?;

    let mut provider = PdfiumProvider { document: &document };
    extract_from_provider(&mut provider, side, config)
}

struct PdfiumProvider<'a, 'b> {
    document: &'b PdfDocument<'a>,
}

impl DocumentTextProvider for PdfiumProvider<'_, '_> {
    fn page_count(&self) -> u32 {
        self.document.pages().len() as u32
    }

    fn page(&mut self, index: u32) -> std::result::Result<PageContent, ProviderError> {
        let pages = self.document.pages();
        if index >= pages.len() as u32 {
            return Err(ProviderError::PageOutOfRange(index));
        }
        let page_number = index + 1;
        let page = pages.get(index as PdfPageIndex).map_err(|e| ProviderError::PageFailed {
            page: page_number,
            reason: format!("{e:?}"),
        })?;

        let height = page.height().value;
        let page_text = page.text().map_err(|e| ProviderError::PageFailed {
            page: page_number,
            reason: format!("failed to get page text: {e:?}"),
        })?;

        let segments = page_text.segments();
        let segment_count = segments.len();
        let mut fragments = Vec::with_capacity(segment_count);
        for i in 0..segment_count {
            let Ok(segment) = segments.get(i) else {
                continue;
            };
            let text = segment.text();
            if text.trim().is_empty() {
                continue;
            }
            let bounds = segment.bounds();
            fragments.push(PositionedFragment {
                text,
                x: bounds.left().value,
                y: bounds.bottom().value,
                width: bounds.width().value,
                height: bounds.height().value,
            });
        }

        Ok(PageContent { fragments, height })
    }
}
