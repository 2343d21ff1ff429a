//! Layout reconstruction: table detection, line/paragraph analysis, and
//! page assembly.

mod layout;
mod page;
mod table;

pub use layout::{element_in_region, LayoutAnalyzer, LayoutOptions};
pub use page::PageAnalyzer;
pub use table::{TableDetector, TableDetectorConfig};
