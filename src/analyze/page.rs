//! Page assembly: tables, remaining text, hyperlinks, and images combined
//! into one block list in reading order.

use crate::analyze::layout::LayoutAnalyzer;
use crate::analyze::table::TableDetector;
use crate::model::{ContentBlock, PageContent, PageStructure, TextElement};

/// Assembles one page's analyzed structure from its extracted content.
///
/// The detector runs first because layout analysis must not see glyph runs
/// that belong to table cells.
pub struct PageAnalyzer {
    detector: TableDetector,
    layout: LayoutAnalyzer,
    include_tables: bool,
    include_images: bool,
    include_hyperlinks: bool,
}

impl PageAnalyzer {
    pub fn new(detector: TableDetector, layout: LayoutAnalyzer) -> Self {
        Self {
            detector,
            layout,
            include_tables: true,
            include_images: true,
            include_hyperlinks: true,
        }
    }

    pub fn with_tables(mut self, enabled: bool) -> Self {
        self.include_tables = enabled;
        self
    }

    pub fn with_images(mut self, enabled: bool) -> Self {
        self.include_images = enabled;
        self
    }

    pub fn with_hyperlinks(mut self, enabled: bool) -> Self {
        self.include_hyperlinks = enabled;
        self
    }

    /// Analyze a page into blocks sorted by (top, left).
    pub fn analyze(&self, content: &PageContent) -> PageStructure {
        let mut page = PageStructure::new(content.number, content.width, content.height);

        let tables = if self.include_tables {
            self.detector.detect(content, &self.layout)
        } else {
            Vec::new()
        };

        // Glyph runs whose midpoint falls inside a table belong to that
        // table's cells, not to free-flowing text
        let remaining: Vec<TextElement> = content
            .text_elements
            .iter()
            .filter(|t| {
                !tables
                    .iter()
                    .any(|table| table.bounds.contains_point(t.bounds.mid_x(), t.bounds.mid_y()))
            })
            .cloned()
            .collect();

        let mut paragraphs = self.layout.analyze(&remaining, content.width);

        if self.include_hyperlinks && !content.links.is_empty() {
            for paragraph in &mut paragraphs {
                for line in &mut paragraph.lines {
                    for link in &content.links {
                        if !line.bounds.intersects(&link.bounds) {
                            continue;
                        }
                        for run in &mut line.runs {
                            if run.hyperlink.is_none() && run.bounds.intersects(&link.bounds) {
                                run.hyperlink = Some(link.uri.clone());
                            }
                        }
                    }
                }
            }
        }

        for paragraph in paragraphs {
            if !paragraph.is_empty() {
                page.blocks.push(ContentBlock::Paragraph(paragraph));
            }
        }
        for table in tables {
            page.blocks.push(ContentBlock::Table(table));
        }
        if self.include_images {
            for image in &content.images {
                let in_table = page.blocks.iter().any(|b| match b {
                    ContentBlock::Table(t) => t.bounds.contains(&image.bounds),
                    _ => false,
                });
                if !in_table {
                    page.blocks.push(ContentBlock::Image(image.clone()));
                }
            }
        }

        page.sort_blocks();
        page
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{LineSegment, Rect};
    use crate::model::{ImageElement, ImageFormat, LinkAnnotation};

    fn analyzer() -> PageAnalyzer {
        PageAnalyzer::new(TableDetector::new(), LayoutAnalyzer::new())
    }

    fn text(s: &str, left: f32, top: f32, width: f32) -> TextElement {
        TextElement::new(s, Rect::new(left, top, left + width, top + 12.0), "Helvetica", 12.0)
    }

    fn grid_lines() -> Vec<LineSegment> {
        let h = |y: f32| LineSegment::new(100.0, y, 300.0, y, 1.0, "000000");
        let v = |x: f32| LineSegment::new(x, 400.0, x, 500.0, 1.0, "000000");
        vec![h(400.0), h(450.0), h(500.0), v(100.0), v(200.0), v(300.0)]
    }

    #[test]
    fn test_table_text_excluded_from_paragraphs() {
        let mut content = PageContent::new(1, 612.0, 792.0);
        content.lines = grid_lines();
        content.text_elements.push(text("cell text", 110.0, 415.0, 60.0));
        content.text_elements.push(text("body text", 72.0, 100.0, 100.0));

        let page = analyzer().analyze(&content);
        let paragraphs: Vec<_> = page
            .blocks
            .iter()
            .filter(|b| b.is_paragraph())
            .collect();
        assert_eq!(paragraphs.len(), 1);
        if let ContentBlock::Paragraph(p) = paragraphs[0] {
            assert_eq!(p.plain_text(), "body text");
        }
        assert_eq!(page.blocks.iter().filter(|b| b.is_table()).count(), 1);
    }

    #[test]
    fn test_blocks_in_reading_order() {
        let mut content = PageContent::new(1, 612.0, 792.0);
        content.lines = grid_lines();
        content.text_elements.push(text("below table", 72.0, 600.0, 100.0));
        content.text_elements.push(text("above table", 72.0, 100.0, 100.0));

        let page = analyzer().analyze(&content);
        assert_eq!(page.blocks.len(), 3);
        assert!(page.blocks[0].is_paragraph());
        assert!(page.blocks[1].is_table());
        assert!(page.blocks[2].is_paragraph());
    }

    #[test]
    fn test_hyperlink_attachment_first_match_wins() {
        let mut content = PageContent::new(1, 612.0, 792.0);
        content.text_elements.push(text("click here", 72.0, 100.0, 80.0));
        content.links.push(LinkAnnotation {
            bounds: Rect::new(70.0, 98.0, 160.0, 115.0),
            uri: "https://first.example".to_string(),
        });
        content.links.push(LinkAnnotation {
            bounds: Rect::new(70.0, 98.0, 160.0, 115.0),
            uri: "https://second.example".to_string(),
        });

        let page = analyzer().analyze(&content);
        let ContentBlock::Paragraph(p) = &page.blocks[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(
            p.lines[0].runs[0].hyperlink.as_deref(),
            Some("https://first.example")
        );
    }

    #[test]
    fn test_hyperlinks_disabled() {
        let mut content = PageContent::new(1, 612.0, 792.0);
        content.text_elements.push(text("click here", 72.0, 100.0, 80.0));
        content.links.push(LinkAnnotation {
            bounds: Rect::new(70.0, 98.0, 160.0, 115.0),
            uri: "https://example.com".to_string(),
        });

        let page = analyzer().with_hyperlinks(false).analyze(&content);
        let ContentBlock::Paragraph(p) = &page.blocks[0] else {
            panic!("expected paragraph");
        };
        assert!(p.lines[0].runs[0].hyperlink.is_none());
    }

    #[test]
    fn test_image_inside_table_is_not_top_level() {
        let mut content = PageContent::new(1, 612.0, 792.0);
        content.lines = grid_lines();
        content.images.push(ImageElement {
            data: vec![0x89],
            format: ImageFormat::Png,
            bounds: Rect::new(110.0, 410.0, 190.0, 440.0),
            pixel_width: 80,
            pixel_height: 30,
        });
        content.images.push(ImageElement {
            data: vec![0x89],
            format: ImageFormat::Png,
            bounds: Rect::new(72.0, 100.0, 172.0, 180.0),
            pixel_width: 100,
            pixel_height: 80,
        });

        let page = analyzer().analyze(&content);
        let images: Vec<_> = page.blocks.iter().filter(|b| b.is_image()).collect();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].bounds().top, 100.0);
    }

    #[test]
    fn test_tables_disabled_keeps_text() {
        let mut content = PageContent::new(1, 612.0, 792.0);
        content.lines = grid_lines();
        content.text_elements.push(text("cell text", 110.0, 415.0, 60.0));

        let page = analyzer().with_tables(false).analyze(&content);
        assert!(page.blocks.iter().all(|b| !b.is_table()));
        assert_eq!(page.blocks.iter().filter(|b| b.is_paragraph()).count(), 1);
    }
}
