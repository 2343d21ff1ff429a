//! Page- and document-level structure.

use serde::{Deserialize, Serialize};

use super::content::ImageElement;
use super::paragraph::TextParagraph;
use super::table::DetectedTable;
use crate::geometry::Rect;

/// A block of content in reading order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Paragraph(TextParagraph),
    Table(DetectedTable),
    Image(ImageElement),
}

impl ContentBlock {
    pub fn bounds(&self) -> Rect {
        match self {
            ContentBlock::Paragraph(p) => p.bounds,
            ContentBlock::Table(t) => t.bounds,
            ContentBlock::Image(i) => i.bounds,
        }
    }

    pub fn is_paragraph(&self) -> bool {
        matches!(self, ContentBlock::Paragraph(_))
    }

    pub fn is_table(&self) -> bool {
        matches!(self, ContentBlock::Table(_))
    }

    pub fn is_image(&self) -> bool {
        matches!(self, ContentBlock::Image(_))
    }
}

/// A fully-analyzed page: blocks sorted by (top, left).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageStructure {
    /// Page number (1-indexed)
    pub number: u32,
    /// Width in points
    pub width: f32,
    /// Height in points
    pub height: f32,
    pub blocks: Vec<ContentBlock>,
}

impl PageStructure {
    pub fn new(number: u32, width: f32, height: f32) -> Self {
        Self {
            number,
            width,
            height,
            blocks: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Sort blocks into reading order by (top, left) ascending.
    pub fn sort_blocks(&mut self) {
        self.blocks.sort_by(|a, b| {
            let ba = a.bounds();
            let bb = b.bounds();
            ba.top
                .partial_cmp(&bb.top)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(
                    ba.left
                        .partial_cmp(&bb.left)
                        .unwrap_or(std::cmp::Ordering::Equal),
                )
        });
    }
}

/// The analyzed document handed to the packager.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentStructure {
    pub pages: Vec<PageStructure>,
}

impl DocumentStructure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_page(&mut self, page: PageStructure) {
        self.pages.push(page);
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}
