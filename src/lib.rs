//! # pdf2docx
//!
//! Converts PDF documents into OOXML wordprocessing packages (`.docx`),
//! reconstructing logical layout from positioned glyph runs and vector
//! paths: paragraphs, multi-column text, tables with merged cells, borders
//! and shading, inline images, and hyperlinks.
//!
//! ## Quick Start
//!
//! ```no_run
//! fn main() -> pdf2docx::Result<()> {
//!     pdf2docx::convert("report.pdf", "report.docx")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! 1. **Extraction** ([`extract`]): each page becomes a normalized
//!    [`PageContent`] record in top-left coordinates. The glyph-run stage
//!    sits behind the [`TextExtractor`] trait so OCR back-ends can plug in.
//! 2. **Analysis** ([`analyze`]): the table detector recovers row/column
//!    grids from rule segments, the layout analyzer groups the remaining
//!    glyphs into lines, columns, and paragraphs, and the page assembler
//!    orders everything by reading position.
//! 3. **Packaging** ([`docx`]): the analyzed document is serialized into
//!    the zipped multi-part OOXML container.

pub mod analyze;
pub mod convert;
pub mod docx;
pub mod error;
pub mod extract;
pub mod geometry;
pub mod model;
pub mod units;

pub use analyze::{LayoutAnalyzer, LayoutOptions, PageAnalyzer, TableDetector, TableDetectorConfig};
pub use convert::{CancelToken, ConvertOptions, DocxConverter, PdfConverter, Source};
pub use docx::DocxPackager;
pub use error::{Error, Result};
pub use extract::{PdfExtractor, TextExtractor};
pub use model::{
    Alignment, BorderLine, BorderStyle, ContentBlock, DetectedTable, DocumentStructure,
    ImageElement, ImageFormat, LinkAnnotation, PageContent, PageStructure, TableCell,
    TextElement, TextLine, TextParagraph, TextRun,
};

use std::path::Path;

/// Convert a PDF file to a `.docx` file with default options.
///
/// # Example
///
/// ```no_run
/// pdf2docx::convert("input.pdf", "output.docx").unwrap();
/// ```
pub fn convert<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output: Q) -> Result<()> {
    convert_with_options(input, output, &ConvertOptions::default())
}

/// Convert a PDF file to a `.docx` file with custom options.
pub fn convert_with_options<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    options: &ConvertOptions,
) -> Result<()> {
    PdfConverter::new().convert(input.as_ref(), output.as_ref(), options)
}

/// Convert a PDF to `.docx` bytes.
///
/// # Example
///
/// ```no_run
/// let pdf = std::fs::read("input.pdf").unwrap();
/// let docx = pdf2docx::convert_to_bytes(
///     pdf2docx::Source::Bytes(&pdf),
///     &pdf2docx::ConvertOptions::default(),
/// )
/// .unwrap();
/// ```
pub fn convert_to_bytes(source: Source<'_>, options: &ConvertOptions) -> Result<Vec<u8>> {
    PdfConverter::new().convert_to_bytes(source, options)
}

/// Builder for configured conversions.
///
/// # Example
///
/// ```no_run
/// use pdf2docx::Pdf2Docx;
///
/// Pdf2Docx::new()
///     .images(false)
///     .pages(1, Some(10))
///     .convert("input.pdf", "output.docx")?;
/// # Ok::<(), pdf2docx::Error>(())
/// ```
pub struct Pdf2Docx {
    options: ConvertOptions,
}

impl Pdf2Docx {
    pub fn new() -> Self {
        Self {
            options: ConvertOptions::default(),
        }
    }

    /// Enable or disable image embedding.
    pub fn images(mut self, enabled: bool) -> Self {
        self.options = self.options.with_images(enabled);
        self
    }

    /// Enable or disable table detection.
    pub fn tables(mut self, enabled: bool) -> Self {
        self.options = self.options.with_tables(enabled);
        self
    }

    /// Enable or disable hyperlink attachment.
    pub fn hyperlinks(mut self, enabled: bool) -> Self {
        self.options = self.options.with_hyperlinks(enabled);
        self
    }

    /// Restrict the page range (1-indexed, inclusive).
    pub fn pages(mut self, start: u32, end: Option<u32>) -> Self {
        self.options = self.options.with_page_range(start, end);
        self
    }

    /// Cap the number of converted pages.
    pub fn max_pages(mut self, max: u32) -> Self {
        self.options = self.options.with_max_pages(max);
        self
    }

    /// Override layout analyzer tuning.
    pub fn layout(mut self, layout: LayoutOptions) -> Self {
        self.options = self.options.with_layout(layout);
        self
    }

    /// Override table detector tuning.
    pub fn detector(mut self, detector: TableDetectorConfig) -> Self {
        self.options = self.options.with_detector(detector);
        self
    }

    /// Access the assembled options.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Run the conversion to a file.
    pub fn convert<P: AsRef<Path>, Q: AsRef<Path>>(&self, input: P, output: Q) -> Result<()> {
        convert_with_options(input, output, &self.options)
    }

    /// Run the conversion to bytes.
    pub fn convert_to_bytes(&self, source: Source<'_>) -> Result<Vec<u8>> {
        convert_to_bytes(source, &self.options)
    }
}

impl Default for Pdf2Docx {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_options() {
        let builder = Pdf2Docx::new()
            .images(false)
            .tables(false)
            .hyperlinks(false)
            .pages(2, Some(4))
            .max_pages(2);
        let options = builder.options();
        assert!(!options.include_images);
        assert!(!options.include_tables);
        assert!(!options.include_hyperlinks);
        assert_eq!(options.start_page, 2);
        assert_eq!(options.end_page, Some(4));
        assert_eq!(options.max_pages, Some(2));
    }

    #[test]
    fn test_convert_to_bytes_rejects_garbage() {
        let result = convert_to_bytes(Source::Bytes(b"garbage"), &ConvertOptions::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_convert_missing_file() {
        let result = convert("does-not-exist.pdf", "out.docx");
        assert!(matches!(result, Err(Error::InputMissing(_))));
    }
}
