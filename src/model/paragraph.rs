//! Paragraph, line, and run types produced by layout analysis.

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

/// Paragraph alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

/// A maximal contiguous fragment of a line sharing one set of formatting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    pub bounds: Rect,
    pub font_name: String,
    pub font_size: f32,
    pub is_bold: bool,
    pub is_italic: bool,
    /// Hex RGB
    pub color: String,
    /// Target URI when the run sits under a hyperlink annotation
    pub hyperlink: Option<String>,
}

impl TextRun {
    /// Formatting equivalence used when folding adjacent glyph runs.
    /// Font sizes within half a point count as equal.
    pub fn same_formatting(&self, other: &TextRun) -> bool {
        self.font_name == other.font_name
            && (self.font_size - other.font_size).abs() <= 0.5
            && self.is_bold == other.is_bold
            && self.is_italic == other.is_italic
            && self.color == other.color
            && self.hyperlink == other.hyperlink
    }

    pub fn is_whitespace(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// A horizontal line of text: ordered runs plus geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextLine {
    pub runs: Vec<TextRun>,
    pub bounds: Rect,
    /// Set by the layout analyzer: dominant font size × line-spacing factor.
    pub line_height: f32,
}

impl TextLine {
    pub fn new(runs: Vec<TextRun>, bounds: Rect) -> Self {
        Self {
            runs,
            bounds,
            line_height: 0.0,
        }
    }

    /// Font size of the run carrying the most text.
    pub fn dominant_font_size(&self) -> f32 {
        self.runs
            .iter()
            .max_by_key(|r| r.text.chars().count())
            .map(|r| r.font_size)
            .unwrap_or(12.0)
    }

    /// Concatenated text of all runs.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(|r| r.is_whitespace())
    }
}

/// A paragraph: ordered lines, union bounds, and classified alignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextParagraph {
    pub lines: Vec<TextLine>,
    pub bounds: Rect,
    pub alignment: Alignment,
}

impl TextParagraph {
    pub fn new(lines: Vec<TextLine>) -> Self {
        let bounds = lines
            .iter()
            .map(|l| l.bounds)
            .reduce(|a, b| a.union(&b))
            .unwrap_or_else(Rect::zero);
        Self {
            lines,
            bounds,
            alignment: Alignment::Left,
        }
    }

    /// Plain text with lines joined by newlines.
    pub fn plain_text(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.text())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|l| l.is_empty())
    }
}
