//! Package assembly: relationships, media, content types, and the zip
//! container.

use std::collections::HashMap;
use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::document::BodyWriter;
use super::styles::{settings_xml, styles_xml};
use super::xml::{escape_xml, XML_DECLARATION};
use crate::error::Result;
use crate::model::{DocumentStructure, ImageFormat};

const REL_TYPE_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const REL_TYPE_STYLES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
const REL_TYPE_SETTINGS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/settings";
const REL_TYPE_IMAGE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
const REL_TYPE_HYPERLINK: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";

/// One entry in a relationship part.
#[derive(Debug, Clone)]
pub(crate) struct Relationship {
    pub id: String,
    pub rel_type: &'static str,
    pub target: String,
    pub external: bool,
}

/// The document part's relationship table. IDs are handed out in order:
/// `rId1` styles, `rId2` settings, then media and hyperlinks as the body
/// references them.
#[derive(Debug)]
pub(crate) struct RelationshipTable {
    entries: Vec<Relationship>,
    hyperlinks: HashMap<String, String>,
    next_id: usize,
}

impl Default for RelationshipTable {
    fn default() -> Self {
        Self::new()
    }
}

impl RelationshipTable {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
            hyperlinks: HashMap::new(),
            next_id: 1,
        }
    }

    fn allocate(&mut self) -> String {
        let id = format!("rId{}", self.next_id);
        self.next_id += 1;
        id
    }

    pub(crate) fn add_internal(&mut self, rel_type: &'static str, target: String) -> String {
        let id = self.allocate();
        self.entries.push(Relationship {
            id: id.clone(),
            rel_type,
            target,
            external: false,
        });
        id
    }

    /// Register an image target and return its relationship id.
    pub(crate) fn add_image(&mut self, target: String) -> String {
        self.add_internal(REL_TYPE_IMAGE, target)
    }

    /// Register a hyperlink, deduplicated by URI. Hyperlink targets are
    /// always external.
    pub(crate) fn add_hyperlink(&mut self, uri: &str) -> String {
        if let Some(id) = self.hyperlinks.get(uri) {
            return id.clone();
        }
        let id = self.allocate();
        self.entries.push(Relationship {
            id: id.clone(),
            rel_type: REL_TYPE_HYPERLINK,
            target: uri.to_string(),
            external: true,
        });
        self.hyperlinks.insert(uri.to_string(), id.clone());
        id
    }

    fn to_xml(&self) -> String {
        let mut out = String::with_capacity(256 + self.entries.len() * 128);
        out.push_str(XML_DECLARATION);
        out.push_str(
            "<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">",
        );
        for rel in &self.entries {
            out.push_str("<Relationship Id=\"");
            out.push_str(&rel.id);
            out.push_str("\" Type=\"");
            out.push_str(rel.rel_type);
            out.push_str("\" Target=\"");
            out.push_str(&escape_xml(&rel.target));
            out.push('"');
            if rel.external {
                out.push_str(" TargetMode=\"External\"");
            }
            out.push_str("/>");
        }
        out.push_str("</Relationships>");
        out
    }
}

/// One media payload destined for `word/media/`.
#[derive(Debug, Clone)]
pub(crate) struct MediaEntry {
    pub filename: String,
    pub format: ImageFormat,
    pub data: Vec<u8>,
}

/// Media store with monotonically-numbered filenames.
#[derive(Debug)]
pub(crate) struct MediaStore {
    entries: Vec<MediaEntry>,
    next_index: usize,
}

impl Default for MediaStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaStore {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_index: 1,
        }
    }

    /// Store a payload and return its package filename, e.g. "image1.png".
    pub(crate) fn add(&mut self, format: ImageFormat, data: Vec<u8>) -> String {
        let filename = format!("image{}.{}", self.next_index, format.extension());
        self.next_index += 1;
        self.entries.push(MediaEntry {
            filename: filename.clone(),
            format,
            data,
        });
        filename
    }

    pub(crate) fn entries(&self) -> &[MediaEntry] {
        &self.entries
    }
}

/// The OOXML document packager.
///
/// Relationship ids and media filenames are owned by the packager instance
/// and reset at the start of every [`generate`](Self::generate) call, so a
/// packager can be reused across documents.
pub struct DocxPackager {
    /// Spacing after each paragraph, in points
    spacing_after_pt: f32,
}

impl DocxPackager {
    pub fn new() -> Self {
        Self {
            spacing_after_pt: 6.0,
        }
    }

    pub fn with_spacing_after(mut self, points: f32) -> Self {
        self.spacing_after_pt = points;
        self
    }

    /// Serialize a document into `.docx` bytes.
    pub fn generate(&self, document: &DocumentStructure) -> Result<Vec<u8>> {
        // Fresh per-call state: counters must not leak between documents
        let mut rels = RelationshipTable::new();
        let mut media = MediaStore::new();

        rels.add_internal(REL_TYPE_STYLES, "styles.xml".to_string());
        rels.add_internal(REL_TYPE_SETTINGS, "settings.xml".to_string());

        let body = BodyWriter::new(&mut rels, &mut media, self.spacing_after_pt)
            .write_document(document);

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let mut write_part = |zip: &mut ZipWriter<Cursor<Vec<u8>>>,
                              name: &str,
                              bytes: &[u8]|
         -> Result<()> {
            zip.start_file(name, options)?;
            zip.write_all(bytes)?;
            Ok(())
        };

        write_part(&mut zip, "[Content_Types].xml", content_types_xml(&media).as_bytes())?;
        write_part(&mut zip, "_rels/.rels", root_rels_xml().as_bytes())?;
        write_part(&mut zip, "word/document.xml", body.as_bytes())?;
        write_part(&mut zip, "word/_rels/document.xml.rels", rels.to_xml().as_bytes())?;
        write_part(&mut zip, "word/styles.xml", styles_xml().as_bytes())?;
        write_part(&mut zip, "word/settings.xml", settings_xml().as_bytes())?;
        for entry in media.entries() {
            write_part(
                &mut zip,
                &format!("word/media/{}", entry.filename),
                &entry.data,
            )?;
        }

        let cursor = zip.finish()?;
        log::debug!(
            "packager: wrote {} media entries, {} bytes total",
            media.entries().len(),
            cursor.get_ref().len()
        );
        Ok(cursor.into_inner())
    }
}

impl Default for DocxPackager {
    fn default() -> Self {
        Self::new()
    }
}

/// The root relationship part: points at the main document.
fn root_rels_xml() -> String {
    let mut out = String::with_capacity(384);
    out.push_str(XML_DECLARATION);
    out.push_str(
        "<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">",
    );
    out.push_str("<Relationship Id=\"rId1\" Type=\"");
    out.push_str(REL_TYPE_OFFICE_DOCUMENT);
    out.push_str("\" Target=\"word/document.xml\"/>");
    out.push_str("</Relationships>");
    out
}

/// The content-type map: fixed defaults and overrides plus one `Default`
/// entry per distinct media extension in use.
fn content_types_xml(media: &MediaStore) -> String {
    let mut out = String::with_capacity(1024);
    out.push_str(XML_DECLARATION);
    out.push_str("<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">");
    out.push_str(
        "<Default Extension=\"rels\" \
         ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>",
    );
    out.push_str("<Default Extension=\"xml\" ContentType=\"application/xml\"/>");

    let mut seen: Vec<&'static str> = Vec::new();
    for entry in media.entries() {
        let ext = entry.format.extension();
        if !seen.contains(&ext) {
            seen.push(ext);
            out.push_str("<Default Extension=\"");
            out.push_str(ext);
            out.push_str("\" ContentType=\"");
            out.push_str(entry.format.content_type());
            out.push_str("\"/>");
        }
    }

    out.push_str(
        "<Override PartName=\"/word/document.xml\" \
         ContentType=\"application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml\"/>",
    );
    out.push_str(
        "<Override PartName=\"/word/styles.xml\" \
         ContentType=\"application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml\"/>",
    );
    out.push_str(
        "<Override PartName=\"/word/settings.xml\" \
         ContentType=\"application/vnd.openxmlformats-officedocument.wordprocessingml.settings+xml\"/>",
    );
    out.push_str("</Types>");
    out
}
