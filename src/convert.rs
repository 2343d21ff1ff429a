//! Conversion pipeline: extraction → analysis → packaging.
//!
//! The pipeline is synchronous and single-threaded per document. Callers
//! that want background conversion wrap it in a worker; the core takes an
//! optional cancellation token it checks at page boundaries, never
//! mid-page.

use std::fs;
use std::io::Read;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::analyze::{LayoutAnalyzer, LayoutOptions, PageAnalyzer, TableDetector, TableDetectorConfig};
use crate::docx::DocxPackager;
use crate::error::{Error, Result};
use crate::extract::{PdfExtractor, TextExtractor};
use crate::model::DocumentStructure;

/// Conversion options.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Embed raster images in the output
    pub include_images: bool,
    /// Detect and emit tables
    pub include_tables: bool,
    /// Attach hyperlink annotations to text runs
    pub include_hyperlinks: bool,
    /// First page to convert (1-indexed)
    pub start_page: u32,
    /// Last page to convert; `None` means the last page of the document
    pub end_page: Option<u32>,
    /// Upper bound on the number of converted pages
    pub max_pages: Option<u32>,
    /// Layout analyzer tuning
    pub layout: LayoutOptions,
    /// Table detector tuning
    pub detector: TableDetectorConfig,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            include_images: true,
            include_tables: true,
            include_hyperlinks: true,
            start_page: 1,
            end_page: None,
            max_pages: None,
            layout: LayoutOptions::default(),
            detector: TableDetectorConfig::default(),
        }
    }
}

impl ConvertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_images(mut self, enabled: bool) -> Self {
        self.include_images = enabled;
        self
    }

    pub fn with_tables(mut self, enabled: bool) -> Self {
        self.include_tables = enabled;
        self
    }

    pub fn with_hyperlinks(mut self, enabled: bool) -> Self {
        self.include_hyperlinks = enabled;
        self
    }

    pub fn with_page_range(mut self, start: u32, end: Option<u32>) -> Self {
        self.start_page = start;
        self.end_page = end;
        self
    }

    pub fn with_max_pages(mut self, max: u32) -> Self {
        self.max_pages = Some(max);
        self
    }

    pub fn with_layout(mut self, layout: LayoutOptions) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_detector(mut self, detector: TableDetectorConfig) -> Self {
        self.detector = detector;
        self
    }
}

/// Cooperative cancellation handle, checked at page boundaries.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Input source for byte-level conversion.
pub enum Source<'a> {
    Path(&'a Path),
    Bytes(&'a [u8]),
    Reader(&'a mut dyn Read),
}

/// The full conversion contract. Alternative back-ends implement this.
pub trait DocxConverter {
    /// Convert a PDF file into a `.docx` file at `output`.
    fn convert(&self, input: &Path, output: &Path, options: &ConvertOptions) -> Result<()>;

    /// Convert a PDF into `.docx` bytes.
    fn convert_to_bytes(&self, source: Source<'_>, options: &ConvertOptions) -> Result<Vec<u8>>;
}

/// The default converter.
pub struct PdfConverter {
    text_extractor: Option<Arc<dyn TextExtractor>>,
}

impl PdfConverter {
    pub fn new() -> Self {
        Self {
            text_extractor: None,
        }
    }

    /// Swap in an alternative glyph-run extractor (e.g. OCR).
    pub fn with_text_extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.text_extractor = Some(extractor);
        self
    }

    /// The synchronous core: convert with optional cancellation and a
    /// progress sink receiving 0–100.
    pub fn convert_with_progress(
        &self,
        source: Source<'_>,
        options: &ConvertOptions,
        cancel: Option<&CancelToken>,
        mut progress: Option<&mut dyn FnMut(u8)>,
    ) -> Result<Vec<u8>> {
        let mut report = |value: u8| {
            if let Some(sink) = progress.as_deref_mut() {
                sink(value);
            }
        };
        let check = |cancel: Option<&CancelToken>| -> Result<()> {
            cancel.map_or(Ok(()), |token| token.check())
        };

        report(0);
        check(cancel)?;

        let mut extractor = match source {
            Source::Path(path) => PdfExtractor::open(path)?,
            Source::Bytes(bytes) => PdfExtractor::from_bytes(bytes)?,
            Source::Reader(reader) => PdfExtractor::from_reader(reader)?,
        };
        if let Some(text_extractor) = &self.text_extractor {
            extractor = extractor.with_text_extractor(Arc::clone(text_extractor));
        }
        report(20);
        check(cancel)?;

        let page_count = extractor.page_count();
        let pages = selected_pages(options, page_count)?;

        let analyzer = PageAnalyzer::new(
            TableDetector::with_config(options.detector.clone()),
            LayoutAnalyzer::with_options(options.layout.clone()),
        )
        .with_tables(options.include_tables)
        .with_images(options.include_images)
        .with_hyperlinks(options.include_hyperlinks);

        let mut document = DocumentStructure::new();
        let total = pages.len().max(1);
        for (index, number) in pages.iter().enumerate() {
            check(cancel)?;
            let content = extractor.extract_page(*number)?;
            document.add_page(analyzer.analyze(&content));
            let slice = 20 + ((index + 1) * 70 / total) as u8;
            report(slice);
        }

        check(cancel)?;
        let packager =
            DocxPackager::new().with_spacing_after(options.layout.paragraph_spacing_after);
        let bytes = packager.generate(&document)?;
        report(100);
        Ok(bytes)
    }
}

impl Default for PdfConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl DocxConverter for PdfConverter {
    fn convert(&self, input: &Path, output: &Path, options: &ConvertOptions) -> Result<()> {
        let bytes = self.convert_to_bytes(Source::Path(input), options)?;
        if let Err(e) = fs::write(output, &bytes) {
            // Never leave a partial package behind
            let _ = fs::remove_file(output);
            return Err(e.into());
        }
        Ok(())
    }

    fn convert_to_bytes(&self, source: Source<'_>, options: &ConvertOptions) -> Result<Vec<u8>> {
        self.convert_with_progress(source, options, None, None)
    }
}

/// Resolve the selected page numbers, ascending.
fn selected_pages(options: &ConvertOptions, page_count: u32) -> Result<Vec<u32>> {
    if options.start_page == 0 {
        return Err(Error::InvalidPageRange("pages are 1-indexed".to_string()));
    }
    let end = options.end_page.unwrap_or(page_count).min(page_count);
    if options.start_page > end && page_count > 0 {
        return Err(Error::InvalidPageRange(format!(
            "start page {} is beyond end page {}",
            options.start_page, end
        )));
    }
    let mut pages: Vec<u32> = (options.start_page..=end).collect();
    if let Some(max) = options.max_pages {
        pages.truncate(max as usize);
    }
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_builder() {
        let options = ConvertOptions::new()
            .with_images(false)
            .with_tables(false)
            .with_page_range(2, Some(5))
            .with_max_pages(3);
        assert!(!options.include_images);
        assert!(!options.include_tables);
        assert!(options.include_hyperlinks);
        assert_eq!(options.start_page, 2);
        assert_eq!(options.end_page, Some(5));
        assert_eq!(options.max_pages, Some(3));
    }

    #[test]
    fn test_selected_pages_defaults() {
        let pages = selected_pages(&ConvertOptions::default(), 3).unwrap();
        assert_eq!(pages, vec![1, 2, 3]);
    }

    #[test]
    fn test_selected_pages_range_and_cap() {
        let options = ConvertOptions::new().with_page_range(2, Some(10)).with_max_pages(2);
        let pages = selected_pages(&options, 5).unwrap();
        assert_eq!(pages, vec![2, 3]);
    }

    #[test]
    fn test_selected_pages_invalid() {
        let options = ConvertOptions::new().with_page_range(9, Some(3));
        assert!(selected_pages(&options, 5).is_err());

        let options = ConvertOptions::new().with_page_range(0, None);
        assert!(selected_pages(&options, 5).is_err());
    }

    #[test]
    fn test_cancel_token() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        token.cancel();
        assert!(token.is_cancelled());
        assert!(matches!(token.check(), Err(Error::Cancelled)));
    }

    #[test]
    fn test_cancelled_before_start_aborts() {
        let converter = PdfConverter::new();
        let token = CancelToken::new();
        token.cancel();
        let result = converter.convert_with_progress(
            Source::Bytes(b"%PDF-1.4 stub"),
            &ConvertOptions::default(),
            Some(&token),
            None,
        );
        assert!(matches!(result, Err(Error::Cancelled)));
    }
}
