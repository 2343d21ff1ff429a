//! lopdf-backed content extraction.
//!
//! Interprets each page's content stream once for text (via the default
//! [`ContentStreamExtractor`]) and once for vector graphics and images,
//! and reads link annotations from the page dictionary. All output is
//! flipped into top-left coordinates.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use super::TextExtractor;
use crate::error::{Error, Result};
use crate::geometry::{LineSegment, Rect, RectangleElement};
use crate::model::{ImageElement, ImageFormat, LinkAnnotation, PageContent, TextElement};

/// A borrowed view of one page, given to [`TextExtractor`] implementations.
pub struct PageHandle<'a> {
    pub(crate) doc: &'a LopdfDocument,
    pub(crate) id: ObjectId,
    /// Page number (1-indexed)
    pub number: u32,
}

/// Page-level PDF extractor.
pub struct PdfExtractor {
    doc: LopdfDocument,
    text_extractor: Arc<dyn TextExtractor>,
}

impl std::fmt::Debug for PdfExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfExtractor").finish_non_exhaustive()
    }
}

impl PdfExtractor {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::InputMissing(path.to_path_buf()));
        }
        let doc = LopdfDocument::load(path)?;
        Ok(Self::from_document(doc))
    }

    /// Load a PDF from an in-memory byte slice.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if !data.starts_with(b"%PDF-") {
            return Err(Error::PdfParse("missing %PDF header".to_string()));
        }
        let doc = LopdfDocument::load_mem(data)?;
        Ok(Self::from_document(doc))
    }

    /// Load a PDF from a reader.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(&data)
    }

    fn from_document(doc: LopdfDocument) -> Self {
        Self {
            doc,
            text_extractor: Arc::new(ContentStreamExtractor),
        }
    }

    /// Replace the glyph-run extraction strategy (e.g. an OCR back-end).
    pub fn with_text_extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.text_extractor = extractor;
        self
    }

    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// Extract the normalized content of one page.
    pub fn extract_page(&self, number: u32) -> Result<PageContent> {
        let pages = self.doc.get_pages();
        let page_id = *pages
            .get(&number)
            .ok_or(Error::PageOutOfRange(number, pages.len() as u32))?;

        let (width, height) = self.page_dimensions(page_id);
        let mut content = PageContent::new(number, width, height);

        let handle = PageHandle {
            doc: &self.doc,
            id: page_id,
            number,
        };
        match self.text_extractor.extract_text(&handle, height) {
            Ok(text) => content.text_elements = text,
            Err(e) => {
                log::warn!("page {number}: text extraction failed: {e}");
            }
        }
        if content.text_elements.is_empty() {
            log::warn!("page {number}: no extractable text operators");
        }

        match self.extract_graphics(page_id, height) {
            Ok((lines, rectangles, images)) => {
                content.lines = lines;
                content.rectangles = rectangles;
                content.images = images;
            }
            Err(e) => {
                log::warn!("page {number}: graphics extraction failed: {e}");
            }
        }

        content.links = self.extract_links(page_id, height);
        Ok(content)
    }

    fn page_dimensions(&self, page_id: ObjectId) -> (f32, f32) {
        if let Ok(dict) = self.doc.get_dictionary(page_id) {
            if let Some(media_box) = resolve_array(&self.doc, dict.get(b"MediaBox").ok()) {
                if media_box.len() >= 4 {
                    let x0 = object_number(&media_box[0]).unwrap_or(0.0);
                    let y0 = object_number(&media_box[1]).unwrap_or(0.0);
                    let x1 = object_number(&media_box[2]).unwrap_or(612.0);
                    let y1 = object_number(&media_box[3]).unwrap_or(792.0);
                    return ((x1 - x0).abs(), (y1 - y0).abs());
                }
            }
        }
        (612.0, 792.0)
    }

    /// Walk the content stream for painted paths and placed images.
    fn extract_graphics(
        &self,
        page_id: ObjectId,
        page_height: f32,
    ) -> Result<(Vec<LineSegment>, Vec<RectangleElement>, Vec<ImageElement>)> {
        let data = page_content_bytes(&self.doc, page_id)?;
        let content = lopdf::content::Content::decode(&data)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        let mut state = GraphicsState::default();
        let mut stack: Vec<GraphicsState> = Vec::new();
        let mut path = PathBuilder::default();

        let mut lines = Vec::new();
        let mut rectangles = Vec::new();
        let mut images = Vec::new();

        for op in &content.operations {
            let operands = &op.operands;
            match op.operator.as_str() {
                "q" => stack.push(state.clone()),
                "Q" => {
                    if let Some(saved) = stack.pop() {
                        state = saved;
                    }
                }
                "cm" => {
                    if let Some(m) = matrix_from_operands(operands) {
                        state.ctm = m.multiplied(&state.ctm);
                    }
                }
                "w" => {
                    if let Some(v) = operands.first().and_then(object_number) {
                        state.line_width = v;
                    }
                }
                "RG" => state.stroke_color = rgb_hex(operands),
                "rg" => state.fill_color = rgb_hex(operands),
                "G" => state.stroke_color = gray_hex(operands),
                "g" => state.fill_color = gray_hex(operands),
                "K" => state.stroke_color = cmyk_hex(operands),
                "k" => state.fill_color = cmyk_hex(operands),
                "m" => {
                    if let (Some(x), Some(y)) = first_two_numbers(operands) {
                        path.move_to(x, y);
                    }
                }
                "l" => {
                    if let (Some(x), Some(y)) = first_two_numbers(operands) {
                        path.line_to(x, y);
                    }
                }
                "h" => path.close(),
                "re" => {
                    if operands.len() >= 4 {
                        let vals: Vec<f32> =
                            operands.iter().filter_map(object_number).collect();
                        if vals.len() >= 4 {
                            path.rect(vals[0], vals[1], vals[2], vals[3]);
                        }
                    }
                }
                "S" | "s" => {
                    if op.operator == "s" {
                        path.close();
                    }
                    path.emit_stroked(&state, page_height, &mut lines, &mut rectangles);
                    path.clear();
                }
                "f" | "F" | "f*" => {
                    path.emit_filled(&state, page_height, &mut rectangles);
                    path.clear();
                }
                "B" | "B*" | "b" | "b*" => {
                    if op.operator.starts_with('b') {
                        path.close();
                    }
                    path.emit_filled(&state, page_height, &mut rectangles);
                    path.emit_stroked(&state, page_height, &mut lines, &mut rectangles);
                    path.clear();
                }
                "n" => path.clear(),
                "Do" => {
                    if let Some(Object::Name(name)) = operands.first() {
                        match self.extract_image(page_id, name, &state, page_height) {
                            Ok(Some(image)) => images.push(image),
                            Ok(None) => {}
                            Err(e) => {
                                log::warn!("image XObject skipped: {e}");
                            }
                        }
                    }
                }
                _ => {}
            }
        }

        Ok((lines, rectangles, images))
    }

    /// Extract one placed image XObject, positioned by the current CTM.
    fn extract_image(
        &self,
        page_id: ObjectId,
        name: &[u8],
        state: &GraphicsState,
        page_height: f32,
    ) -> Result<Option<ImageElement>> {
        let Some(object_id) = self.find_xobject(page_id, name) else {
            return Ok(None);
        };
        let object = self.doc.get_object(object_id)?;
        let Object::Stream(stream) = object else {
            return Ok(None);
        };
        let subtype = stream
            .dict
            .get(b"Subtype")
            .ok()
            .and_then(|o| o.as_name_str().ok());
        if subtype != Some("Image") {
            return Ok(None);
        }

        let pixel_width = stream
            .dict
            .get(b"Width")
            .ok()
            .and_then(|o| o.as_i64().ok())
            .unwrap_or(0) as u32;
        let pixel_height = stream
            .dict
            .get(b"Height")
            .ok()
            .and_then(|o| o.as_i64().ok())
            .unwrap_or(0) as u32;

        let filter = primary_filter(&stream.dict);
        let (format, data) = match filter.as_deref() {
            Some("DCTDecode") => (ImageFormat::Jpeg, stream.content.clone()),
            _ => {
                // Anything else is only usable when the decoded payload is
                // already a recognizable raster format
                let decoded = stream
                    .decompressed_content()
                    .unwrap_or_else(|_| stream.content.clone());
                match ImageFormat::detect(&decoded) {
                    Some(format) => (format, decoded),
                    None => {
                        return Err(Error::PdfParse(format!(
                            "unsupported image encoding {:?}",
                            filter.as_deref().unwrap_or("raw")
                        )));
                    }
                }
            }
        };

        // An image occupies the unit square transformed by the CTM
        let corners = [
            state.ctm.apply(0.0, 0.0),
            state.ctm.apply(1.0, 0.0),
            state.ctm.apply(0.0, 1.0),
            state.ctm.apply(1.0, 1.0),
        ];
        let min_x = corners.iter().map(|p| p.0).fold(f32::MAX, f32::min);
        let max_x = corners.iter().map(|p| p.0).fold(f32::MIN, f32::max);
        let min_y = corners.iter().map(|p| p.1).fold(f32::MAX, f32::min);
        let max_y = corners.iter().map(|p| p.1).fold(f32::MIN, f32::max);
        let bounds = Rect::new(min_x, page_height - max_y, max_x, page_height - min_y);

        Ok(Some(ImageElement {
            data,
            format,
            bounds,
            pixel_width,
            pixel_height,
        }))
    }

    fn find_xobject(&self, page_id: ObjectId, name: &[u8]) -> Option<ObjectId> {
        let page_dict = self.doc.get_dictionary(page_id).ok()?;
        let resources = resolve_dict(&self.doc, page_dict.get(b"Resources").ok()?)?;
        let xobjects = resolve_dict(&self.doc, resources.get(b"XObject").ok()?)?;
        xobjects.get(name).ok()?.as_reference().ok()
    }

    /// Read `Link` annotations with URI actions.
    fn extract_links(&self, page_id: ObjectId, page_height: f32) -> Vec<LinkAnnotation> {
        let mut links = Vec::new();
        let Ok(page_dict) = self.doc.get_dictionary(page_id) else {
            return links;
        };
        let Some(annots) = resolve_array(&self.doc, page_dict.get(b"Annots").ok()) else {
            return links;
        };

        for annot in &annots {
            match self.parse_link_annotation(annot, page_height) {
                Ok(Some(link)) => links.push(link),
                Ok(None) => {}
                Err(e) => {
                    log::warn!("malformed link annotation skipped: {e}");
                }
            }
        }
        links
    }

    fn parse_link_annotation(
        &self,
        annot: &Object,
        page_height: f32,
    ) -> Result<Option<LinkAnnotation>> {
        let dict = resolve_dict(&self.doc, annot)
            .ok_or_else(|| Error::PdfParse("annotation is not a dictionary".to_string()))?;

        let subtype = dict.get(b"Subtype").ok().and_then(|o| o.as_name_str().ok());
        if subtype != Some("Link") {
            return Ok(None);
        }

        let action = dict
            .get(b"A")
            .ok()
            .and_then(|o| resolve_dict(&self.doc, o));
        let Some(action) = action else {
            return Ok(None);
        };
        let action_type = action.get(b"S").ok().and_then(|o| o.as_name_str().ok());
        if action_type != Some("URI") {
            return Ok(None);
        }
        let uri = action
            .get(b"URI")
            .map_err(|e| Error::PdfParse(e.to_string()))?;
        let uri = match uri {
            Object::String(bytes, _) => String::from_utf8_lossy(bytes).to_string(),
            _ => return Err(Error::PdfParse("URI action without string".to_string())),
        };

        let rect = dict
            .get(b"Rect")
            .map_err(|e| Error::PdfParse(e.to_string()))?;
        let rect = rect
            .as_array()
            .map_err(|e| Error::PdfParse(e.to_string()))?;
        if rect.len() < 4 {
            return Err(Error::PdfParse("annotation Rect too short".to_string()));
        }
        let vals: Vec<f32> = rect.iter().filter_map(object_number).collect();
        if vals.len() < 4 {
            return Err(Error::PdfParse("annotation Rect not numeric".to_string()));
        }

        Ok(Some(LinkAnnotation {
            bounds: Rect::new(
                vals[0].min(vals[2]),
                page_height - vals[1].max(vals[3]),
                vals[0].max(vals[2]),
                page_height - vals[1].min(vals[3]),
            ),
            uri,
        }))
    }
}

// ---------------------------------------------------------------------------
// Content-stream text extraction
// ---------------------------------------------------------------------------

/// Default [`TextExtractor`]: interprets the page content stream, tracking
/// the text matrix and per-font encodings.
pub struct ContentStreamExtractor;

impl TextExtractor for ContentStreamExtractor {
    fn extract_text(&self, page: &PageHandle<'_>, page_height: f32) -> Result<Vec<TextElement>> {
        let doc = page.doc;
        let data = page_content_bytes(doc, page.id)?;
        let content = lopdf::content::Content::decode(&data)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        let fonts = doc.get_page_fonts(page.id).unwrap_or_default();

        let mut elements = Vec::new();
        let mut matrix = TextMatrix::default();
        let mut font_name: Vec<u8> = Vec::new();
        let mut base_font = String::from("Unknown");
        let mut font_size = 12.0f32;
        let mut leading = 0.0f32;
        let mut fill_color = String::from("000000");
        let mut in_text = false;

        let push_text = |text: String,
                             matrix: &TextMatrix,
                             base_font: &str,
                             font_size: f32,
                             fill_color: &str,
                             elements: &mut Vec<TextElement>| {
            if text.trim().is_empty() {
                return;
            }
            let (x, y) = matrix.position();
            let size = font_size * matrix.scale();
            let width = text.chars().count() as f32 * size * 0.5;
            let bounds = Rect::new(
                x,
                page_height - y - size * 0.8,
                x + width,
                page_height - y + size * 0.2,
            );
            let mut element = TextElement::new(text, bounds, base_font, size);
            element.color = fill_color.to_string();
            elements.push(element);
        };

        for op in &content.operations {
            let operands = &op.operands;
            match op.operator.as_str() {
                "BT" => {
                    in_text = true;
                    matrix = TextMatrix::default();
                }
                "ET" => in_text = false,
                "Tf" => {
                    if operands.len() >= 2 {
                        if let Object::Name(name) = &operands[0] {
                            font_name = name.clone();
                            base_font = fonts
                                .get(name.as_slice())
                                .and_then(|f| f.get(b"BaseFont").ok())
                                .and_then(|o| o.as_name().ok())
                                .map(|n| String::from_utf8_lossy(n).to_string())
                                .unwrap_or_else(|| {
                                    String::from_utf8_lossy(name.as_slice()).to_string()
                                });
                        }
                        font_size = object_number(&operands[1]).unwrap_or(12.0);
                    }
                }
                "TL" => {
                    if let Some(v) = operands.first().and_then(object_number) {
                        leading = v;
                    }
                }
                "Td" => {
                    if let (Some(tx), Some(ty)) = first_two_numbers(operands) {
                        matrix.translate(tx, ty);
                    }
                }
                "TD" => {
                    if let (Some(tx), Some(ty)) = first_two_numbers(operands) {
                        leading = -ty;
                        matrix.translate(tx, ty);
                    }
                }
                "Tm" => {
                    if let Some(m) = matrix_from_operands(operands) {
                        matrix.set(m);
                    }
                }
                "T*" => matrix.next_line(leading),
                "rg" => {
                    if let Some(hex) = rgb_hex(operands) {
                        fill_color = hex;
                    }
                }
                "g" => {
                    if let Some(hex) = gray_hex(operands) {
                        fill_color = hex;
                    }
                }
                "k" => {
                    if let Some(hex) = cmyk_hex(operands) {
                        fill_color = hex;
                    }
                }
                "Tj" => {
                    if in_text {
                        if let Some(Object::String(bytes, _)) = operands.first() {
                            let text = decode_with_font(doc, &fonts, &font_name, bytes);
                            push_text(
                                text,
                                &matrix,
                                &base_font,
                                font_size,
                                &fill_color,
                                &mut elements,
                            );
                        }
                    }
                }
                "TJ" => {
                    if in_text {
                        if let Some(Object::Array(parts)) = operands.first() {
                            let mut combined = String::new();
                            for part in parts {
                                match part {
                                    Object::String(bytes, _) => {
                                        combined.push_str(&decode_with_font(
                                            doc, &fonts, &font_name, bytes,
                                        ));
                                    }
                                    Object::Integer(n) => {
                                        // Large negative adjustments stand in
                                        // for word spaces
                                        if (-(*n as f32)) > 200.0
                                            && !combined.is_empty()
                                            && !combined.ends_with(' ')
                                        {
                                            combined.push(' ');
                                        }
                                    }
                                    Object::Real(n) => {
                                        if -n > 200.0
                                            && !combined.is_empty()
                                            && !combined.ends_with(' ')
                                        {
                                            combined.push(' ');
                                        }
                                    }
                                    _ => {}
                                }
                            }
                            push_text(
                                combined,
                                &matrix,
                                &base_font,
                                font_size,
                                &fill_color,
                                &mut elements,
                            );
                        }
                    }
                }
                "'" | "\"" => {
                    matrix.next_line(leading);
                    if in_text {
                        let text_index = if op.operator == "\"" { 2 } else { 0 };
                        if let Some(Object::String(bytes, _)) = operands.get(text_index) {
                            let text = decode_with_font(doc, &fonts, &font_name, bytes);
                            push_text(
                                text,
                                &matrix,
                                &base_font,
                                font_size,
                                &fill_color,
                                &mut elements,
                            );
                        }
                    }
                }
                _ => {}
            }
        }

        Ok(elements)
    }
}

fn decode_with_font(
    doc: &LopdfDocument,
    fonts: &std::collections::BTreeMap<Vec<u8>, &Dictionary>,
    font_name: &[u8],
    bytes: &[u8],
) -> String {
    if let Some(font) = fonts.get(font_name) {
        if let Ok(encoding) = font.get_font_encoding(doc) {
            if let Ok(text) = LopdfDocument::decode_text(&encoding, bytes) {
                return text;
            }
        }
    }
    decode_text_simple(bytes)
}

/// Simple text decoding fallback when no encoding is available.
fn decode_text_simple(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks(2)
            .filter_map(|c| {
                if c.len() == 2 {
                    Some(u16::from_be_bytes([c[0], c[1]]))
                } else {
                    None
                }
            })
            .collect();
        return String::from_utf16(&utf16).unwrap_or_default();
    }
    if let Ok(s) = String::from_utf8(bytes.to_vec()) {
        return s;
    }
    bytes.iter().map(|&b| b as char).collect()
}

// ---------------------------------------------------------------------------
// Shared content-stream plumbing
// ---------------------------------------------------------------------------

/// Concatenated, decompressed content stream bytes for a page.
fn page_content_bytes(doc: &LopdfDocument, page_id: ObjectId) -> Result<Vec<u8>> {
    let page_dict = doc
        .get_dictionary(page_id)
        .map_err(|e| Error::PdfParse(e.to_string()))?;
    let contents = page_dict
        .get(b"Contents")
        .map_err(|e| Error::PdfParse(e.to_string()))?;

    match contents {
        Object::Reference(r) => {
            if let Ok(Object::Stream(s)) = doc.get_object(*r) {
                return s
                    .decompressed_content()
                    .map_err(|e| Error::PdfParse(e.to_string()));
            }
            Err(Error::PdfParse("Invalid content stream".to_string()))
        }
        Object::Array(arr) => {
            let mut content = Vec::new();
            for obj in arr {
                if let Object::Reference(r) = obj {
                    if let Ok(Object::Stream(s)) = doc.get_object(*r) {
                        if let Ok(data) = s.decompressed_content() {
                            content.extend_from_slice(&data);
                            content.push(b' ');
                        }
                    }
                }
            }
            Ok(content)
        }
        Object::Stream(s) => s
            .decompressed_content()
            .map_err(|e| Error::PdfParse(e.to_string())),
        _ => Err(Error::PdfParse("Invalid content stream".to_string())),
    }
}

/// A 2-D affine transform in PDF order: a b c d e f.
#[derive(Debug, Clone, Copy)]
struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Default for Matrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }
}

impl Matrix {
    fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    /// `self × other` in PDF matrix convention.
    fn multiplied(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    /// Approximate uniform scale factor.
    fn scale(&self) -> f32 {
        (self.a * self.d - self.b * self.c).abs().sqrt().max(0.01)
    }
}

/// Text positioning state for the text object being interpreted.
#[derive(Debug, Default)]
struct TextMatrix {
    matrix: Matrix,
    line_origin: (f32, f32),
}

impl TextMatrix {
    fn set(&mut self, m: Matrix) {
        self.matrix = m;
        self.line_origin = (m.e, m.f);
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        let (x, y) = (
            self.line_origin.0 + tx * self.matrix.a + ty * self.matrix.c,
            self.line_origin.1 + tx * self.matrix.b + ty * self.matrix.d,
        );
        self.matrix.e = x;
        self.matrix.f = y;
        self.line_origin = (x, y);
    }

    fn next_line(&mut self, leading: f32) {
        let leading = if leading > 0.0 { leading } else { 12.0 };
        self.translate(0.0, -leading);
    }

    fn position(&self) -> (f32, f32) {
        (self.matrix.e, self.matrix.f)
    }

    fn scale(&self) -> f32 {
        self.matrix.scale()
    }
}

/// Stroke/fill state tracked through `q`/`Q`.
#[derive(Debug, Clone)]
struct GraphicsState {
    ctm: Matrix,
    stroke_color: Option<String>,
    fill_color: Option<String>,
    line_width: f32,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: Matrix::default(),
            stroke_color: Some("000000".to_string()),
            fill_color: Some("000000".to_string()),
            line_width: 1.0,
        }
    }
}

/// Accumulates path construction operators until a painting operator.
#[derive(Debug, Default)]
struct PathBuilder {
    /// Straight segments from `m`/`l`/`h`, in user space
    segments: Vec<(f32, f32, f32, f32)>,
    /// Rectangles from `re`, in user space as (x, y, w, h)
    rects: Vec<(f32, f32, f32, f32)>,
    current: Option<(f32, f32)>,
    subpath_start: Option<(f32, f32)>,
}

impl PathBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        self.current = Some((x, y));
        self.subpath_start = Some((x, y));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        if let Some((cx, cy)) = self.current {
            self.segments.push((cx, cy, x, y));
        }
        self.current = Some((x, y));
    }

    fn close(&mut self) {
        if let (Some((cx, cy)), Some((sx, sy))) = (self.current, self.subpath_start) {
            if (cx - sx).abs() > f32::EPSILON || (cy - sy).abs() > f32::EPSILON {
                self.segments.push((cx, cy, sx, sy));
            }
            self.current = Some((sx, sy));
        }
    }

    fn rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.rects.push((x, y, w, h));
        self.current = Some((x, y));
        self.subpath_start = Some((x, y));
    }

    fn clear(&mut self) {
        self.segments.clear();
        self.rects.clear();
        self.current = None;
        self.subpath_start = None;
    }

    /// Emit stroked geometry: segments become rule lines, rectangles
    /// become stroked rectangle elements (their edges double as rules via
    /// thin-rect synthesis later when applicable).
    fn emit_stroked(
        &self,
        state: &GraphicsState,
        page_height: f32,
        lines: &mut Vec<LineSegment>,
        rectangles: &mut Vec<RectangleElement>,
    ) {
        let color = state
            .stroke_color
            .clone()
            .unwrap_or_else(|| "000000".to_string());
        let thickness = (state.line_width * state.ctm.scale()).max(0.1);

        for (x1, y1, x2, y2) in &self.segments {
            let (ax, ay) = state.ctm.apply(*x1, *y1);
            let (bx, by) = state.ctm.apply(*x2, *y2);
            lines.push(LineSegment::new(
                ax,
                page_height - ay,
                bx,
                page_height - by,
                thickness,
                color.clone(),
            ));
        }
        for rect in &self.rects {
            let bounds = transform_rect(*rect, &state.ctm, page_height);
            // Stroked rectangles contribute their four edges as rules
            lines.push(LineSegment::new(
                bounds.left,
                bounds.top,
                bounds.right,
                bounds.top,
                thickness,
                color.clone(),
            ));
            lines.push(LineSegment::new(
                bounds.left,
                bounds.bottom,
                bounds.right,
                bounds.bottom,
                thickness,
                color.clone(),
            ));
            lines.push(LineSegment::new(
                bounds.left,
                bounds.top,
                bounds.left,
                bounds.bottom,
                thickness,
                color.clone(),
            ));
            lines.push(LineSegment::new(
                bounds.right,
                bounds.top,
                bounds.right,
                bounds.bottom,
                thickness,
                color.clone(),
            ));
            rectangles.push(RectangleElement {
                bounds,
                fill_color: None,
                stroke_color: Some(color.clone()),
                stroke_width: thickness,
            });
        }
    }

    /// Emit filled rectangles. Non-rectangular filled paths carry no
    /// table signal and are dropped.
    fn emit_filled(
        &self,
        state: &GraphicsState,
        page_height: f32,
        rectangles: &mut Vec<RectangleElement>,
    ) {
        let Some(color) = state.fill_color.clone() else {
            return;
        };
        for rect in &self.rects {
            let bounds = transform_rect(*rect, &state.ctm, page_height);
            rectangles.push(RectangleElement {
                bounds,
                fill_color: Some(color.clone()),
                stroke_color: None,
                stroke_width: 0.0,
            });
        }
    }
}

fn transform_rect(rect: (f32, f32, f32, f32), ctm: &Matrix, page_height: f32) -> Rect {
    let (x, y, w, h) = rect;
    let corners = [
        ctm.apply(x, y),
        ctm.apply(x + w, y),
        ctm.apply(x, y + h),
        ctm.apply(x + w, y + h),
    ];
    let min_x = corners.iter().map(|p| p.0).fold(f32::MAX, f32::min);
    let max_x = corners.iter().map(|p| p.0).fold(f32::MIN, f32::max);
    let min_y = corners.iter().map(|p| p.1).fold(f32::MAX, f32::min);
    let max_y = corners.iter().map(|p| p.1).fold(f32::MIN, f32::max);
    Rect::new(min_x, page_height - max_y, max_x, page_height - min_y)
}

fn object_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

fn first_two_numbers(operands: &[Object]) -> (Option<f32>, Option<f32>) {
    (
        operands.first().and_then(object_number),
        operands.get(1).and_then(object_number),
    )
}

fn matrix_from_operands(operands: &[Object]) -> Option<Matrix> {
    if operands.len() < 6 {
        return None;
    }
    let vals: Vec<f32> = operands.iter().take(6).filter_map(object_number).collect();
    if vals.len() < 6 {
        return None;
    }
    Some(Matrix {
        a: vals[0],
        b: vals[1],
        c: vals[2],
        d: vals[3],
        e: vals[4],
        f: vals[5],
    })
}

fn component_hex(value: f32) -> String {
    format!("{:02X}", (value.clamp(0.0, 1.0) * 255.0).round() as u8)
}

fn rgb_hex(operands: &[Object]) -> Option<String> {
    if operands.len() < 3 {
        return None;
    }
    let r = object_number(&operands[0])?;
    let g = object_number(&operands[1])?;
    let b = object_number(&operands[2])?;
    Some(format!(
        "{}{}{}",
        component_hex(r),
        component_hex(g),
        component_hex(b)
    ))
}

fn gray_hex(operands: &[Object]) -> Option<String> {
    let v = operands.first().and_then(object_number)?;
    let c = component_hex(v);
    Some(format!("{c}{c}{c}"))
}

fn cmyk_hex(operands: &[Object]) -> Option<String> {
    if operands.len() < 4 {
        return None;
    }
    let c = object_number(&operands[0])?;
    let m = object_number(&operands[1])?;
    let y = object_number(&operands[2])?;
    let k = object_number(&operands[3])?;
    Some(format!(
        "{}{}{}",
        component_hex((1.0 - c) * (1.0 - k)),
        component_hex((1.0 - m) * (1.0 - k)),
        component_hex((1.0 - y) * (1.0 - k)),
    ))
}

fn primary_filter(dict: &Dictionary) -> Option<String> {
    match dict.get(b"Filter").ok()? {
        Object::Name(n) => Some(String::from_utf8_lossy(n).to_string()),
        Object::Array(arr) => arr
            .first()
            .and_then(|o| o.as_name().ok())
            .map(|n| String::from_utf8_lossy(n).to_string()),
        _ => None,
    }
}

fn resolve_dict<'a>(doc: &'a LopdfDocument, obj: &'a Object) -> Option<&'a Dictionary> {
    match obj {
        Object::Dictionary(d) => Some(d),
        Object::Reference(r) => doc.get_dictionary(*r).ok(),
        _ => None,
    }
}

fn resolve_array(doc: &LopdfDocument, obj: Option<&Object>) -> Option<Vec<Object>> {
    match obj? {
        Object::Array(arr) => Some(arr.clone()),
        Object::Reference(r) => match doc.get_object(*r).ok()? {
            Object::Array(arr) => Some(arr.clone()),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes_rejects_non_pdf() {
        assert!(PdfExtractor::from_bytes(b"not a pdf at all").is_err());
        assert!(PdfExtractor::from_bytes(b"").is_err());
    }

    #[test]
    fn test_open_missing_file() {
        let err = PdfExtractor::open("definitely/not/here.pdf").unwrap_err();
        assert!(matches!(err, Error::InputMissing(_)));
    }

    #[test]
    fn test_matrix_apply_and_multiply() {
        let translate = Matrix {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 10.0,
            f: 20.0,
        };
        assert_eq!(translate.apply(5.0, 5.0), (15.0, 25.0));

        let scale = Matrix {
            a: 2.0,
            b: 0.0,
            c: 0.0,
            d: 2.0,
            e: 0.0,
            f: 0.0,
        };
        let combined = scale.multiplied(&translate);
        assert_eq!(combined.apply(1.0, 1.0), (12.0, 22.0));
        assert_eq!(scale.scale(), 2.0);
    }

    #[test]
    fn test_path_builder_stroke_flips_y() {
        let mut path = PathBuilder::default();
        path.move_to(100.0, 692.0);
        path.line_to(300.0, 692.0);

        let state = GraphicsState::default();
        let mut lines = Vec::new();
        let mut rects = Vec::new();
        path.emit_stroked(&state, 792.0, &mut lines, &mut rects);

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].y1, 100.0);
        assert_eq!(lines[0].y2, 100.0);
    }

    #[test]
    fn test_path_builder_filled_rect() {
        let mut path = PathBuilder::default();
        path.rect(100.0, 100.0, 200.0, 50.0);

        let state = GraphicsState::default();
        let mut rects = Vec::new();
        path.emit_filled(&state, 792.0, &mut rects);

        assert_eq!(rects.len(), 1);
        let bounds = rects[0].bounds;
        assert_eq!(bounds.left, 100.0);
        assert_eq!(bounds.top, 792.0 - 150.0);
        assert_eq!(bounds.width(), 200.0);
        assert_eq!(bounds.height(), 50.0);
    }

    #[test]
    fn test_color_conversions() {
        assert_eq!(
            rgb_hex(&[
                Object::Real(1.0),
                Object::Real(0.0),
                Object::Real(0.0)
            ])
            .unwrap(),
            "FF0000"
        );
        assert_eq!(gray_hex(&[Object::Real(0.0)]).unwrap(), "000000");
        assert_eq!(gray_hex(&[Object::Real(1.0)]).unwrap(), "FFFFFF");
        assert_eq!(
            cmyk_hex(&[
                Object::Real(0.0),
                Object::Real(0.0),
                Object::Real(0.0),
                Object::Real(1.0)
            ])
            .unwrap(),
            "000000"
        );
    }

    #[test]
    fn test_decode_text_simple() {
        assert_eq!(decode_text_simple(b"Hello"), "Hello");
        // UTF-16BE with BOM
        let bytes = vec![0xFE, 0xFF, 0x00, 0x48, 0x00, 0x69];
        assert_eq!(decode_text_simple(&bytes), "Hi");
    }
}
