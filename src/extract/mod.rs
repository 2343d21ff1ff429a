//! PDF content extraction.
//!
//! The extractor turns each PDF page into a normalized [`PageContent`]
//! record: glyph runs, rule segments, filled rectangles, images, and link
//! annotations, all in top-left page coordinates. The rest of the pipeline
//! never sees a PDF object.
//!
//! [`TextExtractor`] is the replaceable seam for the glyph-run portion: an
//! OCR back-end can produce the same records from a rendered page.

mod pdf;

pub use pdf::{ContentStreamExtractor, PageHandle, PdfExtractor};

use crate::error::Result;
use crate::model::{PageContent, TextElement};

/// Replaceable glyph-run extraction strategy.
///
/// Implementations receive a handle to one page and the page height in
/// points, and return glyph runs in top-left coordinates. The default
/// implementation interprets the page's content stream; an OCR back-end
/// would rasterize and recognize instead.
pub trait TextExtractor: Send + Sync {
    fn extract_text(&self, page: &PageHandle<'_>, page_height: f32) -> Result<Vec<TextElement>>;
}

/// Convenience: extract every page of a PDF held in memory.
pub fn extract_pages(data: &[u8]) -> Result<Vec<PageContent>> {
    let extractor = PdfExtractor::from_bytes(data)?;
    let mut pages = Vec::new();
    for number in 1..=extractor.page_count() {
        pages.push(extractor.extract_page(number)?);
    }
    Ok(pages)
}
