//! OOXML wordprocessing package writer.
//!
//! Turns an analyzed [`DocumentStructure`](crate::model::DocumentStructure)
//! into the zipped multi-part `.docx` container. Part names, the
//! relationship graph, and XML escaping are strict: a consumer rejects the
//! whole file over a single malformed part.

mod document;
mod package;
mod styles;
mod xml;

pub use package::DocxPackager;
pub use xml::escape_xml;
