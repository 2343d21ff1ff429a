//! `word/document.xml` body emission.

use super::package::{MediaStore, RelationshipTable};
use super::styles::{
    DRAWING_NS, HYPERLINK_COLOR, PICTURE_NS, RELATIONSHIPS_NS, WORDPROCESSING_NS, WP_DRAWING_NS,
};
use super::xml::{escape_xml, XML_DECLARATION};
use crate::model::{
    Alignment, ContentBlock, DetectedTable, DocumentStructure, ImageElement, TableCell, TextLine,
    TextParagraph, TextRun,
};
use crate::units::{pt_to_eighth_points, pt_to_emu, pt_to_half_points, pt_to_twips};

/// Maximum rendered image width: 6 inches.
const MAX_IMAGE_WIDTH_PT: f32 = 432.0;

/// Default page margin in the final section properties: 1 inch.
const PAGE_MARGIN_TWIPS: i64 = 1440;

/// Writes the document body, registering relationships and media as it
/// encounters hyperlinks and images.
pub(crate) struct BodyWriter<'a> {
    rels: &'a mut RelationshipTable,
    media: &'a mut MediaStore,
    spacing_after_pt: f32,
    drawing_id: usize,
}

impl<'a> BodyWriter<'a> {
    pub(crate) fn new(
        rels: &'a mut RelationshipTable,
        media: &'a mut MediaStore,
        spacing_after_pt: f32,
    ) -> Self {
        Self {
            rels,
            media,
            spacing_after_pt,
            drawing_id: 0,
        }
    }

    pub(crate) fn write_document(mut self, document: &DocumentStructure) -> String {
        let mut out = String::with_capacity(16 * 1024);
        out.push_str(XML_DECLARATION);
        out.push_str(&format!(
            "<w:document xmlns:w=\"{WORDPROCESSING_NS}\" xmlns:r=\"{RELATIONSHIPS_NS}\" \
             xmlns:wp=\"{WP_DRAWING_NS}\" xmlns:a=\"{DRAWING_NS}\" xmlns:pic=\"{PICTURE_NS}\">"
        ));
        out.push_str("<w:body>");

        for (index, page) in document.pages.iter().enumerate() {
            if index > 0 {
                // Page break between pages, never after the last one
                out.push_str("<w:p><w:r><w:br w:type=\"page\"/></w:r></w:p>");
            }
            for block in &page.blocks {
                match block {
                    ContentBlock::Paragraph(paragraph) => self.write_paragraph(&mut out, paragraph),
                    ContentBlock::Table(table) => self.write_table(&mut out, table),
                    ContentBlock::Image(image) => self.write_image(&mut out, image),
                }
            }
        }

        self.write_section_properties(&mut out, document);
        out.push_str("</w:body></w:document>");
        out
    }

    /// Final section properties from the first page's dimensions.
    fn write_section_properties(&self, out: &mut String, document: &DocumentStructure) {
        let (width, height) = document
            .pages
            .first()
            .map(|p| (p.width, p.height))
            .unwrap_or((612.0, 792.0));
        out.push_str(&format!(
            "<w:sectPr><w:pgSz w:w=\"{}\" w:h=\"{}\"/>\
             <w:pgMar w:top=\"{m}\" w:right=\"{m}\" w:bottom=\"{m}\" w:left=\"{m}\" \
             w:header=\"720\" w:footer=\"720\" w:gutter=\"0\"/></w:sectPr>",
            pt_to_twips(width),
            pt_to_twips(height),
            m = PAGE_MARGIN_TWIPS,
        ));
    }

    fn write_paragraph(&mut self, out: &mut String, paragraph: &TextParagraph) {
        if paragraph.lines.is_empty() {
            out.push_str("<w:p/>");
            return;
        }

        out.push_str("<w:p><w:pPr>");
        let line_height = paragraph
            .lines
            .first()
            .map(|l| l.line_height)
            .filter(|h| *h > 0.0)
            .unwrap_or(13.8);
        out.push_str(&format!(
            "<w:spacing w:after=\"{}\" w:line=\"{}\" w:lineRule=\"atLeast\"/>",
            pt_to_twips(self.spacing_after_pt),
            pt_to_twips(line_height),
        ));
        match paragraph.alignment {
            Alignment::Left => {}
            Alignment::Center => out.push_str("<w:jc w:val=\"center\"/>"),
            Alignment::Right => out.push_str("<w:jc w:val=\"right\"/>"),
            Alignment::Justify => out.push_str("<w:jc w:val=\"both\"/>"),
        }
        out.push_str("</w:pPr>");

        for (index, line) in paragraph.lines.iter().enumerate() {
            if index > 0 {
                // A bare space run keeps words from concatenating when the
                // consumer reflows the joined lines
                out.push_str("<w:r><w:t xml:space=\"preserve\"> </w:t></w:r>");
            }
            self.write_line_runs(out, line);
        }
        out.push_str("</w:p>");
    }

    /// Emit a line's runs, grouping consecutive runs that share a
    /// hyperlink target under one hyperlink element.
    fn write_line_runs(&mut self, out: &mut String, line: &TextLine) {
        let runs = &line.runs;
        let mut index = 0;
        while index < runs.len() {
            match &runs[index].hyperlink {
                Some(uri) => {
                    let rel_id = self.rels.add_hyperlink(uri);
                    out.push_str(&format!("<w:hyperlink r:id=\"{rel_id}\">"));
                    while index < runs.len() && runs[index].hyperlink.as_deref() == Some(uri.as_str())
                    {
                        write_run(out, &runs[index], true);
                        index += 1;
                    }
                    out.push_str("</w:hyperlink>");
                }
                None => {
                    write_run(out, &runs[index], false);
                    index += 1;
                }
            }
        }
    }

    fn write_table(&mut self, out: &mut String, table: &DetectedTable) {
        out.push_str("<w:tbl><w:tblPr>");
        out.push_str(&format!(
            "<w:tblW w:w=\"{}\" w:type=\"dxa\"/>",
            pt_to_twips(table.bounds.width())
        ));
        out.push_str("<w:tblBorders>");
        for side in ["top", "left", "bottom", "right", "insideH", "insideV"] {
            out.push_str(&format!(
                "<w:{side} w:val=\"single\" w:sz=\"4\" w:space=\"0\" w:color=\"auto\"/>"
            ));
        }
        out.push_str("</w:tblBorders>");
        out.push_str("<w:tblLayout w:type=\"fixed\"/>");
        out.push_str("</w:tblPr>");

        out.push_str("<w:tblGrid>");
        for width in &table.column_widths {
            out.push_str(&format!("<w:gridCol w:w=\"{}\"/>", pt_to_twips(*width)));
        }
        out.push_str("</w:tblGrid>");

        let owners = owner_matrix(table);

        for r in 0..table.row_count {
            out.push_str("<w:tr><w:trPr>");
            out.push_str(&format!(
                "<w:trHeight w:val=\"{}\" w:hRule=\"atLeast\"/>",
                pt_to_twips(table.row_heights[r])
            ));
            out.push_str("</w:trPr>");

            let mut c = 0;
            while c < table.col_count {
                let cell = &table.cells[r][c];
                if cell.is_origin() {
                    self.write_cell(out, table, cell);
                    c += cell.col_span;
                    continue;
                }
                let (owner_row, owner_col) = owners[r][c];
                let owner = &table.cells[owner_row][owner_col];
                if owner_row < r && owner_col == c {
                    // Below a vertical-merge origin: a minimal
                    // continuation cell keeps the grid consistent
                    write_vmerge_continuation(out, table, owner);
                    c += owner.col_span;
                } else {
                    // Absorbed by a horizontal span: skipped entirely
                    c += 1;
                }
            }
            out.push_str("</w:tr>");
        }
        out.push_str("</w:tbl>");

        // Trailing empty paragraph keeps the table from fusing with
        // whatever follows
        out.push_str("<w:p/>");
    }

    fn write_cell(&mut self, out: &mut String, table: &DetectedTable, cell: &TableCell) {
        out.push_str("<w:tc><w:tcPr>");
        out.push_str(&format!(
            "<w:tcW w:w=\"{}\" w:type=\"dxa\"/>",
            pt_to_twips(table.spanned_width(cell))
        ));
        if cell.col_span > 1 {
            out.push_str(&format!("<w:gridSpan w:val=\"{}\"/>", cell.col_span));
        }
        if cell.row_span > 1 {
            out.push_str("<w:vMerge w:val=\"restart\"/>");
        }

        out.push_str("<w:tcBorders>");
        for (side, border) in [
            ("top", &cell.borders.top),
            ("left", &cell.borders.left),
            ("bottom", &cell.borders.bottom),
            ("right", &cell.borders.right),
        ] {
            if border.is_visible() {
                out.push_str(&format!(
                    "<w:{side} w:val=\"single\" w:sz=\"{}\" w:space=\"0\" w:color=\"{}\"/>",
                    pt_to_eighth_points(border.width_pt),
                    escape_xml(&border.color),
                ));
            } else {
                out.push_str(&format!("<w:{side} w:val=\"nil\"/>"));
            }
        }
        out.push_str("</w:tcBorders>");

        if let Some(fill) = &cell.background_color {
            out.push_str(&format!(
                "<w:shd w:val=\"clear\" w:color=\"auto\" w:fill=\"{}\"/>",
                escape_xml(fill)
            ));
        }
        out.push_str("</w:tcPr>");

        if cell.content.is_empty() {
            // Every cell must contain at least one paragraph
            out.push_str("<w:p/>");
        } else {
            for paragraph in &cell.content {
                self.write_paragraph(out, paragraph);
            }
        }
        out.push_str("</w:tc>");
    }

    fn write_image(&mut self, out: &mut String, image: &ImageElement) {
        let mut width = image.bounds.width();
        let mut height = image.bounds.height();
        if width <= 0.0 || height <= 0.0 {
            // Fall back to the pixel dimensions at 96 dpi
            width = image.pixel_width as f32 * 0.75;
            height = image.pixel_height as f32 * 0.75;
        }
        if width > MAX_IMAGE_WIDTH_PT {
            height *= MAX_IMAGE_WIDTH_PT / width;
            width = MAX_IMAGE_WIDTH_PT;
        }
        let cx = pt_to_emu(width);
        let cy = pt_to_emu(height);

        let filename = self.media.add(image.format, image.data.clone());
        let rel_id = self.rels.add_image(format!("media/{filename}"));
        self.drawing_id += 1;
        let id = self.drawing_id;

        out.push_str("<w:p><w:r><w:drawing>");
        out.push_str(&format!(
            "<wp:inline distT=\"0\" distB=\"0\" distL=\"0\" distR=\"0\">\
             <wp:extent cx=\"{cx}\" cy=\"{cy}\"/>\
             <wp:docPr id=\"{id}\" name=\"{filename}\"/>\
             <a:graphic>\
             <a:graphicData uri=\"{PICTURE_NS}\">\
             <pic:pic>\
             <pic:nvPicPr><pic:cNvPr id=\"{id}\" name=\"{filename}\"/><pic:cNvPicPr/></pic:nvPicPr>\
             <pic:blipFill><a:blip r:embed=\"{rel_id}\"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill>\
             <pic:spPr><a:xfrm><a:off x=\"0\" y=\"0\"/><a:ext cx=\"{cx}\" cy=\"{cy}\"/></a:xfrm>\
             <a:prstGeom prst=\"rect\"><a:avLst/></a:prstGeom></pic:spPr>\
             </pic:pic>\
             </a:graphicData>\
             </a:graphic>\
             </wp:inline>"
        ));
        out.push_str("</w:drawing></w:r></w:p>");
    }
}

/// Emit a run with its properties. Hyperlinked runs get the hyperlink
/// color and a single underline.
fn write_run(out: &mut String, run: &TextRun, hyperlinked: bool) {
    out.push_str("<w:r><w:rPr>");
    let font = escape_xml(&run.font_name);
    out.push_str(&format!(
        "<w:rFonts w:ascii=\"{font}\" w:hAnsi=\"{font}\" w:cs=\"{font}\"/>"
    ));
    if run.is_bold {
        out.push_str("<w:b/>");
    }
    if run.is_italic {
        out.push_str("<w:i/>");
    }
    if hyperlinked {
        out.push_str(&format!("<w:color w:val=\"{HYPERLINK_COLOR}\"/>"));
    } else if !run.color.is_empty() && run.color != "000000" && run.color != "auto" {
        out.push_str(&format!("<w:color w:val=\"{}\"/>", escape_xml(&run.color)));
    }
    let half_points = pt_to_half_points(run.font_size);
    out.push_str(&format!(
        "<w:sz w:val=\"{half_points}\"/><w:szCs w:val=\"{half_points}\"/>"
    ));
    if hyperlinked {
        out.push_str("<w:u w:val=\"single\"/>");
    }
    out.push_str("</w:rPr>");
    out.push_str(&format!(
        "<w:t xml:space=\"preserve\">{}</w:t>",
        escape_xml(&run.text)
    ));
    out.push_str("</w:r>");
}

/// A minimal continuation cell below a vertical-merge origin.
fn write_vmerge_continuation(out: &mut String, table: &DetectedTable, owner: &TableCell) {
    out.push_str("<w:tc><w:tcPr>");
    out.push_str(&format!(
        "<w:tcW w:w=\"{}\" w:type=\"dxa\"/>",
        pt_to_twips(table.spanned_width(owner))
    ));
    if owner.col_span > 1 {
        out.push_str(&format!("<w:gridSpan w:val=\"{}\"/>", owner.col_span));
    }
    out.push_str("<w:vMerge/>");
    out.push_str("</w:tcPr><w:p/></w:tc>");
}

/// Map every grid position to the origin cell that owns it.
fn owner_matrix(table: &DetectedTable) -> Vec<Vec<(usize, usize)>> {
    let mut owners = vec![vec![(0usize, 0usize); table.col_count]; table.row_count];
    for r in 0..table.row_count {
        for c in 0..table.col_count {
            let cell = &table.cells[r][c];
            if !cell.is_origin() {
                continue;
            }
            for rr in r..(r + cell.row_span).min(table.row_count) {
                for cc in c..(c + cell.col_span).min(table.col_count) {
                    owners[rr][cc] = (r, c);
                }
            }
        }
    }
    owners
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::model::{PageStructure, TextLine};

    fn run(text: &str) -> TextRun {
        TextRun {
            text: text.to_string(),
            bounds: Rect::new(72.0, 100.0, 172.0, 112.0),
            font_name: "Helvetica".to_string(),
            font_size: 12.0,
            is_bold: false,
            is_italic: false,
            color: "000000".to_string(),
            hyperlink: None,
        }
    }

    fn body_of(document: &DocumentStructure) -> String {
        let mut rels = RelationshipTable::default();
        let mut media = MediaStore::default();
        BodyWriter::new(&mut rels, &mut media, 6.0).write_document(document)
    }

    fn single_paragraph_doc(paragraph: TextParagraph) -> DocumentStructure {
        let mut doc = DocumentStructure::new();
        let mut page = PageStructure::new(1, 612.0, 792.0);
        page.blocks.push(ContentBlock::Paragraph(paragraph));
        doc.add_page(page);
        doc
    }

    #[test]
    fn test_text_is_escaped() {
        let mut line = TextLine::new(
            vec![run("Price: 5 < 10 & 'hello' \"world\"")],
            Rect::new(72.0, 100.0, 400.0, 112.0),
        );
        line.line_height = 13.8;
        let doc = single_paragraph_doc(TextParagraph::new(vec![line]));
        let xml = body_of(&doc);

        assert!(xml.contains("&lt;"));
        assert!(xml.contains("&amp;"));
        assert!(xml.contains("&apos;"));
        assert!(xml.contains("&quot;"));
        assert!(!xml.contains("5 < 10"));
    }

    #[test]
    fn test_whitespace_run_between_lines() {
        let mut l1 = TextLine::new(vec![run("first")], Rect::new(72.0, 100.0, 172.0, 112.0));
        let mut l2 = TextLine::new(vec![run("second")], Rect::new(72.0, 114.0, 172.0, 126.0));
        l1.line_height = 13.8;
        l2.line_height = 13.8;
        let doc = single_paragraph_doc(TextParagraph::new(vec![l1, l2]));
        let xml = body_of(&doc);

        assert!(xml.contains("<w:r><w:t xml:space=\"preserve\"> </w:t></w:r>"));
    }

    #[test]
    fn test_justify_maps_to_both() {
        let mut line = TextLine::new(vec![run("text")], Rect::new(72.0, 100.0, 540.0, 112.0));
        line.line_height = 13.8;
        let mut paragraph = TextParagraph::new(vec![line]);
        paragraph.alignment = Alignment::Justify;
        let xml = body_of(&single_paragraph_doc(paragraph));

        assert!(xml.contains("<w:jc w:val=\"both\"/>"));
    }

    #[test]
    fn test_left_alignment_omits_jc() {
        let mut line = TextLine::new(vec![run("text")], Rect::new(72.0, 100.0, 172.0, 112.0));
        line.line_height = 13.8;
        let xml = body_of(&single_paragraph_doc(TextParagraph::new(vec![line])));

        assert!(!xml.contains("<w:jc"));
    }

    #[test]
    fn test_page_break_between_pages_only() {
        let mut doc = DocumentStructure::new();
        doc.add_page(PageStructure::new(1, 612.0, 792.0));
        doc.add_page(PageStructure::new(2, 612.0, 792.0));
        let xml = body_of(&doc);

        assert_eq!(xml.matches("<w:br w:type=\"page\"/>").count(), 1);
    }

    #[test]
    fn test_section_properties_from_first_page() {
        let mut doc = DocumentStructure::new();
        doc.add_page(PageStructure::new(1, 612.0, 792.0));
        let xml = body_of(&doc);

        assert!(xml.contains("<w:pgSz w:w=\"12240\" w:h=\"15840\"/>"));
        assert!(xml.contains("w:top=\"1440\""));
    }

    #[test]
    fn test_hyperlink_run_wrapped_and_styled() {
        let mut linked = run("click");
        linked.hyperlink = Some("https://example.com/?a=1&b=2".to_string());
        let mut line = TextLine::new(vec![linked], Rect::new(72.0, 100.0, 172.0, 112.0));
        line.line_height = 13.8;

        let mut rels = RelationshipTable::default();
        let mut media = MediaStore::default();
        let doc = single_paragraph_doc(TextParagraph::new(vec![line]));
        let xml = BodyWriter::new(&mut rels, &mut media, 6.0).write_document(&doc);

        assert!(xml.contains("<w:hyperlink r:id=\"rId1\">"));
        assert!(xml.contains("<w:u w:val=\"single\"/>"));
        assert!(xml.contains(&format!("<w:color w:val=\"{HYPERLINK_COLOR}\"/>")));
    }

    #[test]
    fn test_font_size_in_half_points() {
        let mut line = TextLine::new(vec![run("x")], Rect::new(72.0, 100.0, 80.0, 112.0));
        line.line_height = 13.8;
        let xml = body_of(&single_paragraph_doc(TextParagraph::new(vec![line])));

        assert!(xml.contains("<w:sz w:val=\"24\"/>"));
    }

    #[test]
    fn test_image_width_clamped_to_six_inches() {
        let mut doc = DocumentStructure::new();
        let mut page = PageStructure::new(1, 612.0, 792.0);
        page.blocks.push(ContentBlock::Image(ImageElement {
            data: vec![0x89, 0x50],
            format: crate::model::ImageFormat::Png,
            bounds: Rect::new(0.0, 0.0, 864.0, 432.0),
            pixel_width: 1200,
            pixel_height: 600,
        }));
        doc.add_page(page);

        let mut rels = RelationshipTable::default();
        let mut media = MediaStore::default();
        let xml = BodyWriter::new(&mut rels, &mut media, 6.0).write_document(&doc);

        // 432 pt = 6 in = 5486400 EMU; height scaled to 216 pt
        assert!(xml.contains("cx=\"5486400\""));
        assert!(xml.contains("cy=\"2743200\""));
        assert_eq!(media.entries().len(), 1);
    }
}
