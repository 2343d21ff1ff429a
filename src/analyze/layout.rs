//! Layout analysis: glyph runs → lines → columns → paragraphs.
//!
//! The analyzer works on glyph runs that are already outside any detected
//! table region. It groups runs into baselines with a running-mean walk,
//! folds equally-formatted neighbors into runs, detects multi-column
//! layouts from vertical whitespace bands, and assembles paragraphs with
//! gap heuristics before classifying their alignment.

use crate::geometry::Rect;
use crate::model::{Alignment, TextElement, TextLine, TextParagraph, TextRun};

/// Default page margin assumed for alignment classification, in points.
const DEFAULT_MARGIN: f32 = 72.0;

/// Tuning options for layout analysis.
#[derive(Debug, Clone)]
pub struct LayoutOptions {
    /// Base Y tolerance for grouping runs into one line, in points
    pub line_tolerance: f32,
    /// A vertical gap above `avg_line_height × this` starts a new paragraph
    pub paragraph_gap_multiplier: f32,
    /// Minimum vertical whitespace band width that separates columns
    pub min_column_gap: f32,
    /// Line height = dominant font size × this
    pub line_spacing: f32,
    /// Spacing after each paragraph, in points
    pub paragraph_spacing_after: f32,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            line_tolerance: 3.0,
            paragraph_gap_multiplier: 1.3,
            min_column_gap: 20.0,
            line_spacing: 1.15,
            paragraph_spacing_after: 6.0,
        }
    }
}

/// Check whether a glyph run belongs to a region.
///
/// The run's vertical midpoint must lie within the region expanded by 2 pt,
/// and at least half of its horizontal extent must overlap the region.
/// Pure midpoint containment misclassifies text that kisses a cell border.
pub fn element_in_region(element: &TextElement, region: &Rect) -> bool {
    let expanded = region.inflated(2.0);
    let mid_y = element.bounds.mid_y();
    if mid_y < expanded.top || mid_y > expanded.bottom {
        return false;
    }
    let overlap = element.bounds.horizontal_overlap(&expanded);
    let width = element.bounds.width();
    width <= 0.0 || overlap >= width * 0.5
}

/// Glyph-run layout analyzer.
pub struct LayoutAnalyzer {
    options: LayoutOptions,
}

impl LayoutAnalyzer {
    pub fn new() -> Self {
        Self {
            options: LayoutOptions::default(),
        }
    }

    pub fn with_options(options: LayoutOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    /// Analyze a full page: the horizontal extent is `[0, page_width)`.
    pub fn analyze(&self, elements: &[TextElement], page_width: f32) -> Vec<TextParagraph> {
        self.analyze_range(elements, 0.0, page_width)
    }

    /// Analyze glyph runs within a horizontal extent (a page or a table
    /// cell). Returns paragraphs in reading order.
    pub fn analyze_range(&self, elements: &[TextElement], left: f32, right: f32) -> Vec<TextParagraph> {
        if elements.is_empty() || right <= left {
            return Vec::new();
        }

        let lines = self.group_lines(elements);
        log::debug!("layout: {} runs grouped into {} lines", elements.len(), lines.len());

        let ordered = self.order_by_columns(lines, left, right);
        let mut paragraphs = self.assemble_paragraphs(ordered);

        for paragraph in &mut paragraphs {
            paragraph.alignment = self.classify_alignment(paragraph, left, right);
        }
        paragraphs
    }

    /// Group glyph runs into text lines with a running-mean baseline walk.
    ///
    /// Idempotent: lines that come back through the grouper regroup to the
    /// same lines, because every member's midpoint stays within tolerance
    /// of the line mean.
    pub fn group_lines(&self, elements: &[TextElement]) -> Vec<TextLine> {
        if elements.is_empty() {
            return Vec::new();
        }

        let mut sorted: Vec<&TextElement> = elements.iter().collect();
        sorted.sort_by(|a, b| {
            a.bounds
                .top
                .partial_cmp(&b.bounds.top)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(
                    a.bounds
                        .left
                        .partial_cmp(&b.bounds.left)
                        .unwrap_or(std::cmp::Ordering::Equal),
                )
        });

        let mut lines = Vec::new();
        let mut current: Vec<&TextElement> = Vec::new();
        let mut mean_y = 0.0f32;

        for element in sorted {
            let mid_y = element.bounds.mid_y();
            let tolerance = self
                .options
                .line_tolerance
                .max(element.bounds.height() * 0.5);

            if current.is_empty() || (mid_y - mean_y).abs() <= tolerance {
                current.push(element);
                mean_y = current.iter().map(|e| e.bounds.mid_y()).sum::<f32>()
                    / current.len() as f32;
            } else {
                lines.push(self.build_line(&mut current));
                current.push(element);
                mean_y = mid_y;
            }
        }
        if !current.is_empty() {
            lines.push(self.build_line(&mut current));
        }

        lines
    }

    /// Sort a line's members left-to-right and fold them into runs.
    fn build_line(&self, members: &mut Vec<&TextElement>) -> TextLine {
        members.sort_by(|a, b| {
            a.bounds
                .left
                .partial_cmp(&b.bounds.left)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let bounds = members
            .iter()
            .map(|e| e.bounds)
            .reduce(|a, b| a.union(&b))
            .unwrap_or_else(Rect::zero);

        let runs = fold_runs(members);
        members.clear();
        TextLine::new(runs, bounds)
    }

    /// Detect column bands and return lines in reading order: columns
    /// left-to-right, lines top-to-bottom within each column.
    fn order_by_columns(&self, lines: Vec<TextLine>, left: f32, right: f32) -> Vec<TextLine> {
        let ranges = self.detect_columns(&lines, left, right);
        if ranges.len() <= 1 {
            let mut lines = lines;
            sort_top_to_bottom(&mut lines);
            return lines;
        }

        log::debug!("layout: {} columns detected", ranges.len());

        let mut columns: Vec<Vec<TextLine>> = vec![Vec::new(); ranges.len()];
        for line in lines {
            let best = ranges
                .iter()
                .enumerate()
                .max_by(|(_, a), (_, b)| {
                    let oa = overlap_1d(line.bounds.left, line.bounds.right, a.0, a.1);
                    let ob = overlap_1d(line.bounds.left, line.bounds.right, b.0, b.1);
                    oa.partial_cmp(&ob).unwrap_or(std::cmp::Ordering::Equal)
                })
                .map(|(i, _)| i)
                .unwrap_or(0);
            columns[best].push(line);
        }

        let mut ordered = Vec::new();
        for mut column in columns {
            sort_top_to_bottom(&mut column);
            ordered.extend(column);
        }
        ordered
    }

    /// Find column ranges from vertical whitespace bands.
    ///
    /// Builds a 1-pt occupancy histogram over the horizontal extent and
    /// looks for zero bands of at least `min_column_gap` width within the
    /// central 80% (the outer 10% margins on each side are ignored so page
    /// margins never read as gutters).
    fn detect_columns(&self, lines: &[TextLine], left: f32, right: f32) -> Vec<(f32, f32)> {
        let width = right - left;
        if lines.is_empty() || width <= 0.0 {
            return vec![(left, right)];
        }

        let buckets = width.ceil() as usize;
        let mut occupancy = vec![0u32; buckets.max(1)];
        for line in lines {
            let lo = ((line.bounds.left - left).floor().max(0.0)) as usize;
            let hi = ((line.bounds.right - left).ceil()).min(width) as usize;
            for slot in occupancy
                .iter_mut()
                .take((hi + 1).min(buckets))
                .skip(lo.min(buckets))
            {
                *slot += 1;
            }
        }

        let central_lo = (width * 0.1) as usize;
        let central_hi = ((width * 0.9) as usize).min(buckets);

        // Maximal zero runs within the central band
        let mut gaps: Vec<(usize, usize)> = Vec::new();
        let mut gap_start: Option<usize> = None;
        for i in central_lo..central_hi {
            if occupancy[i] == 0 {
                gap_start.get_or_insert(i);
            } else if let Some(start) = gap_start.take() {
                gaps.push((start, i));
            }
        }
        if let Some(start) = gap_start {
            gaps.push((start, central_hi));
        }

        let qualifying: Vec<(f32, f32)> = gaps
            .into_iter()
            .filter(|(s, e)| (e - s) as f32 >= self.options.min_column_gap)
            .map(|(s, e)| (left + s as f32, left + e as f32))
            .collect();

        if qualifying.is_empty() {
            return vec![(left, right)];
        }

        let mut ranges = Vec::new();
        let mut start = left;
        for (gap_start, gap_end) in &qualifying {
            ranges.push((start, *gap_start));
            start = *gap_end;
        }
        ranges.push((start, right));

        // Drop ranges that ended up with no lines
        ranges.retain(|(lo, hi)| {
            lines
                .iter()
                .any(|l| overlap_1d(l.bounds.left, l.bounds.right, *lo, *hi) > 0.0)
        });
        ranges
    }

    /// Assemble ordered lines into paragraphs.
    ///
    /// A new paragraph starts on a large vertical gap, a font-size shift
    /// above 2 pt, or an indentation shift wider than the average line
    /// height. Each line's height is fixed here from its dominant font size.
    fn assemble_paragraphs(&self, lines: Vec<TextLine>) -> Vec<TextParagraph> {
        let mut lines = lines;
        if lines.is_empty() {
            return Vec::new();
        }

        let avg_line_height = lines
            .iter()
            .map(|l| l.bounds.height())
            .sum::<f32>()
            / lines.len() as f32;
        let gap_threshold = avg_line_height * self.options.paragraph_gap_multiplier;

        for line in &mut lines {
            line.line_height = line.dominant_font_size() * self.options.line_spacing;
        }

        let mut paragraphs = Vec::new();
        let mut current: Vec<TextLine> = Vec::new();

        for line in lines {
            let brk = current.last().is_some_and(|prev| {
                let gap = line.bounds.top - prev.bounds.bottom;
                gap > gap_threshold
                    || (line.dominant_font_size() - prev.dominant_font_size()).abs() > 2.0
                    || (line.bounds.left - prev.bounds.left).abs() > avg_line_height
            });
            if brk {
                paragraphs.push(TextParagraph::new(std::mem::take(&mut current)));
            }
            current.push(line);
        }
        if !current.is_empty() {
            paragraphs.push(TextParagraph::new(current));
        }
        paragraphs
    }

    /// Classify paragraph alignment against the analyzed extent.
    fn classify_alignment(&self, paragraph: &TextParagraph, left: f32, right: f32) -> Alignment {
        let text_area_width = (right - left) - 2.0 * DEFAULT_MARGIN;
        if text_area_width <= 0.0 || paragraph.lines.is_empty() {
            return Alignment::Left;
        }

        let lines = &paragraph.lines;
        let center = (left + right) / 2.0;
        let area_left = left + DEFAULT_MARGIN;
        let area_right = right - DEFAULT_MARGIN;

        let mean_left = lines.iter().map(|l| l.bounds.left).sum::<f32>() / lines.len() as f32;
        let mean_right = lines.iter().map(|l| l.bounds.right).sum::<f32>() / lines.len() as f32;

        // Justified: every line but the last stretches across the text area
        if lines.len() >= 2
            && lines[..lines.len() - 1]
                .iter()
                .all(|l| l.bounds.width() > 0.9 * text_area_width)
        {
            return Alignment::Justify;
        }

        // Centered: midpoints cluster on the page center, and the text is
        // visibly narrower than the full text area
        let center_tolerance = (0.05 * text_area_width).min(15.0);
        if lines.len() >= 2
            && lines
                .iter()
                .all(|l| (l.bounds.mid_x() - center).abs() < center_tolerance)
            && mean_left > area_left + 20.0
        {
            return Alignment::Center;
        }

        // Right-aligned: right edges flush near the right margin
        let max_right = lines
            .iter()
            .map(|l| l.bounds.right)
            .fold(f32::MIN, f32::max);
        let min_right = lines
            .iter()
            .map(|l| l.bounds.right)
            .fold(f32::MAX, f32::min);
        if lines.len() >= 2
            && max_right - min_right < 5.0
            && (mean_right - area_right).abs() < 10.0
            && mean_left > area_left + 20.0
        {
            return Alignment::Right;
        }

        Alignment::Left
    }
}

impl Default for LayoutAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Fold adjacent equally-formatted glyph runs into `TextRun`s, inserting a
/// single space when the horizontal gap exceeds 30% of the previous run's
/// average character width.
fn fold_runs(members: &[&TextElement]) -> Vec<TextRun> {
    let mut runs: Vec<TextRun> = Vec::new();

    for element in members {
        let candidate = TextRun {
            text: element.text.clone(),
            bounds: element.bounds,
            font_name: element.font_name.clone(),
            font_size: element.font_size,
            is_bold: element.is_bold,
            is_italic: element.is_italic,
            color: element.color.clone(),
            hyperlink: None,
        };

        match runs.last_mut() {
            Some(prev) if prev.same_formatting(&candidate) => {
                let gap = element.bounds.left - prev.bounds.right;
                let prev_char_width = prev_avg_char_width(prev);
                if gap > 0.3 * prev_char_width
                    && !prev.text.ends_with(' ')
                    && !element.text.starts_with(' ')
                {
                    prev.text.push(' ');
                }
                prev.text.push_str(&element.text);
                prev.bounds = prev.bounds.union(&element.bounds);
            }
            _ => runs.push(candidate),
        }
    }

    runs
}

fn prev_avg_char_width(run: &TextRun) -> f32 {
    let chars = run.text.chars().count();
    if chars > 0 && run.bounds.width() > 0.0 {
        run.bounds.width() / chars as f32
    } else {
        run.font_size * 0.5
    }
}

fn sort_top_to_bottom(lines: &mut [TextLine]) {
    lines.sort_by(|a, b| {
        a.bounds
            .top
            .partial_cmp(&b.bounds.top)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(
                a.bounds
                    .left
                    .partial_cmp(&b.bounds.left)
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
    });
}

fn overlap_1d(a_lo: f32, a_hi: f32, b_lo: f32, b_hi: f32) -> f32 {
    (a_hi.min(b_hi) - a_lo.max(b_lo)).max(0.0)
}
