//! Table types produced by the detector.

use serde::{Deserialize, Serialize};

use super::paragraph::TextParagraph;
use crate::geometry::Rect;

/// Visual style of a single cell border.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderLine {
    Single,
    Dashed,
    Dotted,
    #[default]
    None,
}

/// One resolved cell border.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorderStyle {
    /// Width in points; zero for `BorderLine::None`
    pub width_pt: f32,
    /// Hex RGB
    pub color: String,
    pub line: BorderLine,
}

impl BorderStyle {
    pub fn none() -> Self {
        Self {
            width_pt: 0.0,
            color: "000000".to_string(),
            line: BorderLine::None,
        }
    }

    pub fn single(width_pt: f32, color: impl Into<String>) -> Self {
        Self {
            width_pt,
            color: color.into(),
            line: BorderLine::Single,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.line != BorderLine::None
    }
}

impl Default for BorderStyle {
    fn default() -> Self {
        Self::none()
    }
}

/// The four borders of a cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CellBorders {
    pub top: BorderStyle,
    pub bottom: BorderStyle,
    pub left: BorderStyle,
    pub right: BorderStyle,
}

/// One cell in the dense matrix.
///
/// Merged regions are expressed with spans on the origin cell plus a
/// continuation flag on every absorbed cell; continuation cells stay in the
/// matrix so iteration never needs back-references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableCell {
    /// Origin position in the grid
    pub row: usize,
    pub col: usize,
    /// Spans are ≥ 1; both are 1 for an unmerged cell
    pub row_span: usize,
    pub col_span: usize,
    pub bounds: Rect,
    pub borders: CellBorders,
    /// Hex RGB fill, when a filled rectangle shades the cell
    pub background_color: Option<String>,
    pub content: Vec<TextParagraph>,
    /// True for non-origin cells absorbed by a merge
    pub is_merged_continuation: bool,
}

impl TableCell {
    pub fn new(row: usize, col: usize, bounds: Rect) -> Self {
        Self {
            row,
            col,
            row_span: 1,
            col_span: 1,
            bounds,
            borders: CellBorders::default(),
            background_color: None,
            content: Vec::new(),
            is_merged_continuation: false,
        }
    }

    pub fn is_origin(&self) -> bool {
        !self.is_merged_continuation
    }

    pub fn plain_text(&self) -> String {
        self.content
            .iter()
            .map(|p| p.plain_text())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// A cell counts as populated when any paragraph has non-whitespace text.
    pub fn has_text(&self) -> bool {
        self.content.iter().any(|p| !p.is_empty())
    }
}

/// A validated table with its dense cell matrix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedTable {
    pub bounds: Rect,
    pub row_count: usize,
    pub col_count: usize,
    /// `cells[row][col]`, dense: every grid position is present
    pub cells: Vec<Vec<TableCell>>,
    /// Column widths in points; sums to `bounds.width()`
    pub column_widths: Vec<f32>,
    /// Row heights in points; sums to `bounds.height()`
    pub row_heights: Vec<f32>,
    /// Detection confidence in [0, 1]
    pub confidence: f32,
}

impl DetectedTable {
    pub fn cell(&self, row: usize, col: usize) -> Option<&TableCell> {
        self.cells.get(row).and_then(|r| r.get(col))
    }

    /// Iterate over origin (non-continuation) cells.
    pub fn origin_cells(&self) -> impl Iterator<Item = &TableCell> {
        self.cells
            .iter()
            .flat_map(|row| row.iter())
            .filter(|c| c.is_origin())
    }

    /// Total width of the columns spanned by the cell at (row, col).
    pub fn spanned_width(&self, cell: &TableCell) -> f32 {
        self.column_widths[cell.col..cell.col + cell.col_span]
            .iter()
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_border_style_none_is_invisible() {
        let b = BorderStyle::none();
        assert!(!b.is_visible());
        assert_eq!(b.width_pt, 0.0);

        let s = BorderStyle::single(1.0, "FF0000");
        assert!(s.is_visible());
    }

    #[test]
    fn test_cell_defaults() {
        let cell = TableCell::new(0, 0, Rect::new(0.0, 0.0, 50.0, 20.0));
        assert!(cell.is_origin());
        assert_eq!(cell.row_span, 1);
        assert_eq!(cell.col_span, 1);
        assert!(!cell.has_text());
    }
}
