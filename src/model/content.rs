//! Extracted page content records.
//!
//! Everything here is in typographic points with a top-left origin; the
//! extractor performs the coordinate flip from PDF space.

use serde::{Deserialize, Serialize};

use crate::geometry::{LineSegment, Rect, RectangleElement};

/// A positioned glyph run from the text extractor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextElement {
    /// The text content
    pub text: String,
    /// Bounding box on the page
    pub bounds: Rect,
    /// Cleaned font name (subset prefixes like "ABCDEF+" stripped)
    pub font_name: String,
    /// Font size in points
    pub font_size: f32,
    /// Whether the font appears to be bold
    pub is_bold: bool,
    /// Whether the font appears to be italic
    pub is_italic: bool,
    /// Text color as hex RGB
    pub color: String,
}

impl TextElement {
    /// Create a glyph run, inferring bold/italic from the font name when
    /// the extractor has no explicit flags.
    pub fn new(
        text: impl Into<String>,
        bounds: Rect,
        font_name: impl Into<String>,
        font_size: f32,
    ) -> Self {
        let font_name = clean_font_name(&font_name.into());
        let lower = font_name.to_lowercase();
        let is_bold =
            lower.contains("bold") || lower.contains("black") || lower.contains("heavy");
        let is_italic = lower.contains("italic") || lower.contains("oblique");

        Self {
            text: text.into(),
            bounds,
            font_name,
            font_size,
            is_bold,
            is_italic,
            color: "000000".to_string(),
        }
    }

    /// Average advance per character, estimated from the bounding box.
    pub fn avg_char_width(&self) -> f32 {
        let chars = self.text.chars().count();
        if chars > 0 && self.bounds.width() > 0.0 {
            self.bounds.width() / chars as f32
        } else {
            self.font_size * 0.5
        }
    }
}

/// Strip a subset prefix ("ABCDEF+Helvetica" → "Helvetica").
pub fn clean_font_name(name: &str) -> String {
    match name.split_once('+') {
        Some((prefix, rest)) if prefix.len() == 6 && prefix.chars().all(|c| c.is_ascii_uppercase()) => {
            rest.to_string()
        }
        _ => name.to_string(),
    }
}

/// Raster image format of an embedded image payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Tiff,
}

impl ImageFormat {
    /// File extension used inside the package. "jpeg" normalizes to "jpg".
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Gif => "gif",
            ImageFormat::Bmp => "bmp",
            ImageFormat::Tiff => "tiff",
        }
    }

    /// MIME content type for `[Content_Types].xml`.
    pub fn content_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Bmp => "image/bmp",
            ImageFormat::Tiff => "image/tiff",
        }
    }

    /// Detect the format from magic bytes.
    pub fn detect(data: &[u8]) -> Option<ImageFormat> {
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some(ImageFormat::Png)
        } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageFormat::Jpeg)
        } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            Some(ImageFormat::Gif)
        } else if data.starts_with(b"BM") {
            Some(ImageFormat::Bmp)
        } else if data.starts_with(&[0x49, 0x49, 0x2A, 0x00])
            || data.starts_with(&[0x4D, 0x4D, 0x00, 0x2A])
        {
            Some(ImageFormat::Tiff)
        } else {
            None
        }
    }
}

/// A raster image placed on the page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageElement {
    /// Encoded image bytes, embedded as-is into the package
    #[serde(skip_serializing)]
    pub data: Vec<u8>,
    pub format: ImageFormat,
    /// Placement on the page in points
    pub bounds: Rect,
    /// Pixel dimensions of the payload
    pub pixel_width: u32,
    pub pixel_height: u32,
}

/// A hyperlink annotation rectangle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkAnnotation {
    pub bounds: Rect,
    pub uri: String,
}

/// The normalized content of one page, as handed over by the extractor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageContent {
    /// Page number (1-indexed)
    pub number: u32,
    /// Page width in points
    pub width: f32,
    /// Page height in points
    pub height: f32,
    /// Positioned glyph runs
    pub text_elements: Vec<TextElement>,
    /// Stroked line segments
    pub lines: Vec<LineSegment>,
    /// Filled / stroked rectangles
    pub rectangles: Vec<RectangleElement>,
    /// Raster images
    pub images: Vec<ImageElement>,
    /// Hyperlink annotations
    pub links: Vec<LinkAnnotation>,
}

impl PageContent {
    pub fn new(number: u32, width: f32, height: f32) -> Self {
        Self {
            number,
            width,
            height,
            ..Default::default()
        }
    }

    /// Check if the page carries no extractable content at all.
    pub fn is_empty(&self) -> bool {
        self.text_elements.is_empty()
            && self.lines.is_empty()
            && self.rectangles.is_empty()
            && self.images.is_empty()
    }
}
