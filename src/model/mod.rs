//! Document model types.
//!
//! Two families live here: the *input* records produced by the content
//! extractor (`content`), and the *analyzed* tree produced by the table
//! detector, layout analyzer, and page assembler (`paragraph`, `table`,
//! `document`). Input records are read-only once extracted; the analysis
//! stages build fresh output trees.

mod content;
mod document;
mod paragraph;
mod table;

pub use content::{ImageElement, ImageFormat, LinkAnnotation, PageContent, TextElement};
pub use document::{ContentBlock, DocumentStructure, PageStructure};
pub use paragraph::{Alignment, TextLine, TextParagraph, TextRun};
pub use table::{BorderLine, BorderStyle, CellBorders, DetectedTable, TableCell};
