//! Table detection from vector rules.
//!
//! Tables are recovered from the page's line segments (and thin filled
//! rectangles standing in for rules): the detector snaps segment positions
//! into candidate row/column boundaries, validates candidates against the
//! page, scores them, and only then builds the dense cell matrix with
//! merges, borders, and shading.

use crate::analyze::layout::{element_in_region, LayoutAnalyzer};
use crate::geometry::{LineSegment, Orientation, Rect};
use crate::model::{
    BorderStyle, DetectedTable, PageContent, TableCell, TextElement,
};

/// Table detector configuration.
#[derive(Debug, Clone)]
pub struct TableDetectorConfig {
    /// Segments shorter than this are ignored, in points
    pub min_line_length: f32,
    /// Snap tolerance ε when folding nearby boundary positions, in points
    pub snap_tolerance: f32,
    /// Minimum number of rows to accept a grid
    pub min_rows: usize,
    /// Minimum number of columns to accept a grid
    pub min_cols: usize,
    /// Candidates scoring below this are rejected
    pub confidence_threshold: f32,
}

impl Default for TableDetectorConfig {
    fn default() -> Self {
        Self {
            min_line_length: 8.0,
            snap_tolerance: 3.0,
            min_rows: 2,
            min_cols: 2,
            confidence_threshold: 0.4,
        }
    }
}

/// A proposed grid before validation: candidate column and row boundaries.
#[derive(Debug, Clone)]
struct GridCandidate {
    xs: Vec<f32>,
    ys: Vec<f32>,
}

impl GridCandidate {
    fn row_count(&self) -> usize {
        self.ys.len().saturating_sub(1)
    }

    fn col_count(&self) -> usize {
        self.xs.len().saturating_sub(1)
    }

    fn bounds(&self) -> Rect {
        Rect::new(
            *self.xs.first().unwrap_or(&0.0),
            *self.ys.first().unwrap_or(&0.0),
            *self.xs.last().unwrap_or(&0.0),
            *self.ys.last().unwrap_or(&0.0),
        )
    }
}

/// Grid-based table detector.
pub struct TableDetector {
    config: TableDetectorConfig,
}

impl TableDetector {
    pub fn new() -> Self {
        Self {
            config: TableDetectorConfig::default(),
        }
    }

    pub fn with_config(config: TableDetectorConfig) -> Self {
        Self { config }
    }

    /// Detect tables on a page. The layout analyzer is used to turn each
    /// cell's glyph runs into paragraphs.
    pub fn detect(&self, page: &PageContent, layout: &LayoutAnalyzer) -> Vec<DetectedTable> {
        let (horizontal, vertical) = self.collect_segments(page);
        log::debug!(
            "table detector: page {}: {} horizontal, {} vertical rule segments",
            page.number,
            horizontal.len(),
            vertical.len()
        );

        if horizontal.len() < 2 || vertical.len() < 2 {
            return Vec::new();
        }

        let eps = self.config.snap_tolerance;
        let global = GridCandidate {
            xs: snap_positions(vertical.iter().map(|s| s.axis_position()).collect(), eps),
            ys: snap_positions(horizontal.iter().map(|s| s.axis_position()).collect(), eps),
        };

        let mut candidates = Vec::new();
        if self.validate(&global, &horizontal, &vertical, page) {
            candidates.push(global);
        } else {
            log::debug!("table detector: global candidate rejected, trying sub-grids");
            candidates = self.sub_grid_candidates(&horizontal, &vertical, page);
        }

        // Largest first, then greedily keep non-overlapping grids
        candidates.sort_by(|a, b| {
            (b.row_count() * b.col_count()).cmp(&(a.row_count() * a.col_count()))
        });
        let mut accepted: Vec<GridCandidate> = Vec::new();
        for candidate in candidates {
            let bounds = candidate.bounds();
            if !accepted.iter().any(|a| a.bounds().intersects(&bounds)) {
                accepted.push(candidate);
            }
        }

        let mut tables = Vec::new();
        for candidate in accepted {
            let confidence =
                self.confidence(&candidate, &horizontal, &vertical, &page.text_elements);
            if confidence < self.config.confidence_threshold {
                log::debug!(
                    "table detector: candidate {}x{} rejected, confidence {:.2} < {:.2}",
                    candidate.row_count(),
                    candidate.col_count(),
                    confidence,
                    self.config.confidence_threshold
                );
                continue;
            }
            tables.push(self.build_table(candidate, confidence, &horizontal, &vertical, page, layout));
        }

        tables.sort_by(|a, b| {
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
        tables
    }

    /// Gather usable rule segments: the page's stroked lines plus thin
    /// filled rectangles, normalized, length-filtered, and split by
    /// orientation. Diagonals are discarded.
    fn collect_segments(&self, page: &PageContent) -> (Vec<LineSegment>, Vec<LineSegment>) {
        let mut horizontal = Vec::new();
        let mut vertical = Vec::new();

        let synthesized = page.rectangles.iter().filter_map(|r| r.as_line_segment());
        for segment in page.lines.iter().cloned().chain(synthesized) {
            if segment.length() < self.config.min_line_length {
                continue;
            }
            match segment.orientation() {
                Orientation::Horizontal => horizontal.push(segment.normalized()),
                Orientation::Vertical => vertical.push(segment.normalized()),
                Orientation::Other => {}
            }
        }
        (horizontal, vertical)
    }

    /// Build sub-grid candidates by clustering each orientation along its
    /// secondary (extent) axis and pairing clusters whose bounding boxes
    /// overlap. Each pair proposes a grid from the lines inside the two
    /// clusters' mutual region, so stacked or side-by-side tables separate.
    fn sub_grid_candidates(
        &self,
        horizontal: &[LineSegment],
        vertical: &[LineSegment],
        page: &PageContent,
    ) -> Vec<GridCandidate> {
        let eps = self.config.snap_tolerance;
        let h_clusters = cluster_segments(horizontal, eps * 3.0);
        let v_clusters = cluster_segments(vertical, eps * 3.0);

        let mut candidates = Vec::new();
        for h_cluster in &h_clusters {
            let h_bounds = cluster_bounds(h_cluster).inflated(eps);
            for v_cluster in &v_clusters {
                let v_bounds = cluster_bounds(v_cluster).inflated(eps);
                if !h_bounds.intersects(&v_bounds) {
                    continue;
                }
                let region = Rect::new(
                    h_bounds.left.max(v_bounds.left),
                    h_bounds.top.max(v_bounds.top),
                    h_bounds.right.min(v_bounds.right),
                    h_bounds.bottom.min(v_bounds.bottom),
                );
                let candidate = GridCandidate {
                    xs: snap_positions(
                        v_cluster
                            .iter()
                            .filter(|s| segment_bounds(s).intersects(&region))
                            .map(|s| s.axis_position())
                            .collect(),
                        eps,
                    ),
                    ys: snap_positions(
                        h_cluster
                            .iter()
                            .filter(|s| segment_bounds(s).intersects(&region))
                            .map(|s| s.axis_position())
                            .collect(),
                        eps,
                    ),
                };
                if self.validate(&candidate, horizontal, vertical, page) {
                    candidates.push(candidate);
                }
            }
        }
        candidates
    }

    /// Validate a candidate grid against the page.
    fn validate(
        &self,
        candidate: &GridCandidate,
        horizontal: &[LineSegment],
        vertical: &[LineSegment],
        page: &PageContent,
    ) -> bool {
        if candidate.xs.len() < 2 || candidate.ys.len() < 2 {
            return false;
        }
        let rows = candidate.row_count();
        let cols = candidate.col_count();
        if rows < self.config.min_rows || cols < self.config.min_cols {
            return false;
        }

        // A grid spanning most of the page in both axes is a page frame,
        // not a table
        let bounds = candidate.bounds();
        if bounds.width() > page.width * 0.8 && bounds.height() > page.height * 0.8 {
            log::debug!("table detector: candidate rejected as page-border frame");
            return false;
        }

        let eps = self.config.snap_tolerance;

        // Every outer edge needs at least one segment endpoint on it
        let edges_ok = edge_has_endpoint(horizontal, vertical, candidate.ys[0], eps, true)
            && edge_has_endpoint(horizontal, vertical, candidate.ys[rows], eps, true)
            && edge_has_endpoint(horizontal, vertical, candidate.xs[0], eps, false)
            && edge_has_endpoint(horizontal, vertical, candidate.xs[cols], eps, false);
        if !edges_ok {
            log::debug!("table detector: candidate rejected, missing outer edge evidence");
            return false;
        }

        // Interior coverage: at least half of the interior boundary
        // positions must carry a matching segment
        let found_h = interior_hits(&candidate.ys[1..rows], horizontal, eps);
        let found_v = interior_hits(&candidate.xs[1..cols], vertical, eps);
        let need_h = rows.saturating_sub(1).div_ceil(2);
        let need_v = cols.saturating_sub(1).div_ceil(2);
        if found_h < need_h || found_v < need_v {
            log::debug!(
                "table detector: candidate rejected, interior coverage {}/{} h, {}/{} v",
                found_h,
                need_h,
                found_v,
                need_v
            );
            return false;
        }

        true
    }

    /// Score a validated grid in [0, 1]: interior-line density (40%), cell
    /// text coverage (40%), and outer-border completeness (20%).
    fn confidence(
        &self,
        candidate: &GridCandidate,
        horizontal: &[LineSegment],
        vertical: &[LineSegment],
        text: &[TextElement],
    ) -> f32 {
        let eps = self.config.snap_tolerance;
        let rows = candidate.row_count();
        let cols = candidate.col_count();

        let expected_h = rows - 1;
        let expected_v = cols - 1;
        let ratio_h = if expected_h == 0 {
            1.0
        } else {
            interior_hits(&candidate.ys[1..rows], horizontal, eps) as f32 / expected_h as f32
        };
        let ratio_v = if expected_v == 0 {
            1.0
        } else {
            interior_hits(&candidate.xs[1..cols], vertical, eps) as f32 / expected_v as f32
        };
        let density = (ratio_h + ratio_v) / 2.0;

        let mut populated = 0usize;
        for r in 0..rows {
            for c in 0..cols {
                let cell = Rect::new(
                    candidate.xs[c],
                    candidate.ys[r],
                    candidate.xs[c + 1],
                    candidate.ys[r + 1],
                );
                if text
                    .iter()
                    .any(|t| !t.text.trim().is_empty() && element_in_region(t, &cell))
                {
                    populated += 1;
                }
            }
        }
        let coverage = populated as f32 / (rows * cols) as f32;

        let outer = [
            segment_along(horizontal, candidate.ys[0], eps),
            segment_along(horizontal, candidate.ys[rows], eps),
            segment_along(vertical, candidate.xs[0], eps),
            segment_along(vertical, candidate.xs[cols], eps),
        ]
        .iter()
        .filter(|present| **present)
        .count() as f32
            / 4.0;

        density * 0.4 + coverage * 0.4 + outer * 0.2
    }

    /// Build the final table: cell matrix, merges, content, borders,
    /// shading.
    fn build_table(
        &self,
        candidate: GridCandidate,
        confidence: f32,
        horizontal: &[LineSegment],
        vertical: &[LineSegment],
        page: &PageContent,
        layout: &LayoutAnalyzer,
    ) -> DetectedTable {
        let rows = candidate.row_count();
        let cols = candidate.col_count();
        let xs = &candidate.xs;
        let ys = &candidate.ys;

        let mut cells: Vec<Vec<TableCell>> = (0..rows)
            .map(|r| {
                (0..cols)
                    .map(|c| {
                        TableCell::new(
                            r,
                            c,
                            Rect::new(xs[c], ys[r], xs[c + 1], ys[r + 1]),
                        )
                    })
                    .collect()
            })
            .collect();

        self.merge_cells(&mut cells, xs, ys, horizontal, vertical);
        self.populate_cells(&mut cells, page, layout);
        self.resolve_borders(&mut cells, horizontal, vertical);
        self.apply_shading(&mut cells, page);

        DetectedTable {
            bounds: candidate.bounds(),
            row_count: rows,
            col_count: cols,
            column_widths: xs.windows(2).map(|w| w[1] - w[0]).collect(),
            row_heights: ys.windows(2).map(|w| w[1] - w[0]).collect(),
            cells,
            confidence,
        }
    }

    /// Detect merged cells. Horizontal merges first: a missing vertical
    /// separator between two columns joins them. Then vertical merges: a
    /// missing horizontal separator below an origin extends it downward
    /// across its full (possibly already-widened) width.
    fn merge_cells(
        &self,
        cells: &mut [Vec<TableCell>],
        xs: &[f32],
        ys: &[f32],
        horizontal: &[LineSegment],
        vertical: &[LineSegment],
    ) {
        let eps = self.config.snap_tolerance;
        let rows = cells.len();
        let cols = xs.len() - 1;

        for r in 0..rows {
            let row_span = (ys[r], ys[r + 1]);
            let row_height = ys[r + 1] - ys[r];
            let mut origin = 0usize;
            for c in 0..cols.saturating_sub(1) {
                let coverage = union_coverage(vertical, xs[c + 1], eps, row_span);
                if coverage >= 0.8 * row_height {
                    origin = c + 1;
                } else {
                    cells[r][origin].col_span += 1;
                    cells[r][origin].bounds.right = xs[c + 2];
                    cells[r][c + 1].is_merged_continuation = true;
                }
            }
        }

        for r in 0..rows.saturating_sub(1) {
            for c in 0..cols {
                if cells[r][c].is_merged_continuation {
                    continue;
                }
                let col_span = cells[r][c].col_span;
                let width_span = (xs[c], xs[c + col_span]);
                let width = width_span.1 - width_span.0;

                let mut row_span = cells[r][c].row_span;
                while r + row_span < rows {
                    let coverage =
                        union_coverage(horizontal, ys[r + row_span], eps, width_span);
                    if coverage >= width - 2.0 * eps {
                        break;
                    }
                    for cc in c..c + col_span {
                        cells[r + row_span][cc].is_merged_continuation = true;
                    }
                    row_span += 1;
                    cells[r][c].bounds.bottom = ys[r + row_span];
                }
                cells[r][c].row_span = row_span;
            }
        }
    }

    /// Assign glyph runs to origin cells and lay them out as paragraphs.
    fn populate_cells(
        &self,
        cells: &mut [Vec<TableCell>],
        page: &PageContent,
        layout: &LayoutAnalyzer,
    ) {
        for row in cells.iter_mut() {
            for cell in row.iter_mut() {
                if cell.is_merged_continuation {
                    continue;
                }
                let members: Vec<TextElement> = page
                    .text_elements
                    .iter()
                    .filter(|t| element_in_region(t, &cell.bounds))
                    .cloned()
                    .collect();
                if members.is_empty() {
                    continue;
                }
                cell.content =
                    layout.analyze_range(&members, cell.bounds.left, cell.bounds.right);
            }
        }
    }

    /// Attach border styles from the segment with the largest overlap on
    /// each cell edge.
    fn resolve_borders(
        &self,
        cells: &mut [Vec<TableCell>],
        horizontal: &[LineSegment],
        vertical: &[LineSegment],
    ) {
        let eps = self.config.snap_tolerance;
        for row in cells.iter_mut() {
            for cell in row.iter_mut() {
                if cell.is_merged_continuation {
                    continue;
                }
                let b = cell.bounds;
                cell.borders.top = edge_border(horizontal, b.top, eps, (b.left, b.right));
                cell.borders.bottom = edge_border(horizontal, b.bottom, eps, (b.left, b.right));
                cell.borders.left = edge_border(vertical, b.left, eps, (b.top, b.bottom));
                cell.borders.right = edge_border(vertical, b.right, eps, (b.top, b.bottom));
            }
        }
    }

    /// Shade cells covered by filled rectangles. First rectangle covering
    /// at least 70% of the cell area wins.
    fn apply_shading(&self, cells: &mut [Vec<TableCell>], page: &PageContent) {
        for row in cells.iter_mut() {
            for cell in row.iter_mut() {
                if cell.is_merged_continuation {
                    continue;
                }
                for rect in &page.rectangles {
                    let Some(fill) = &rect.fill_color else { continue };
                    if rect.bounds.intersection_area(&cell.bounds) >= 0.7 * cell.bounds.area() {
                        cell.background_color = Some(fill.clone());
                        break;
                    }
                }
            }
        }
    }
}

impl Default for TableDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Snap-and-dedupe a multiset of boundary positions: sort, then fold each
/// value into the running cluster when it lies within ε of the cluster
/// mean; the cluster position is the arithmetic mean of its members.
fn snap_positions(mut values: Vec<f32>, eps: f32) -> Vec<f32> {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mut means: Vec<f32> = Vec::new();
    let mut counts: Vec<usize> = Vec::new();
    for v in values {
        match (means.last_mut(), counts.last_mut()) {
            (Some(mean), Some(count)) if (v - *mean).abs() <= eps => {
                *count += 1;
                *mean += (v - *mean) / *count as f32;
            }
            _ => {
                means.push(v);
                counts.push(1);
            }
        }
    }
    means
}

/// Cluster segments along their secondary (extent) axis: two horizontal
/// lines belong to the same cluster when their x-extents come within `gap`
/// of each other, and symmetrically for vertical lines. Lines of one table
/// share an extent; lines of a neighboring table do not.
fn cluster_segments(segments: &[LineSegment], gap: f32) -> Vec<Vec<LineSegment>> {
    let mut sorted: Vec<LineSegment> = segments.to_vec();
    sorted.sort_by(|a, b| {
        a.span()
            .0
            .partial_cmp(&b.span().0)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut clusters: Vec<(f32, Vec<LineSegment>)> = Vec::new();
    for segment in sorted {
        let (lo, hi) = segment.span();
        match clusters.last_mut() {
            Some((max_end, members)) if lo <= *max_end + gap => {
                *max_end = max_end.max(hi);
                members.push(segment);
            }
            _ => clusters.push((hi, vec![segment])),
        }
    }
    clusters.into_iter().map(|(_, members)| members).collect()
}

fn segment_bounds(segment: &LineSegment) -> Rect {
    Rect::new(segment.x1, segment.y1, segment.x2, segment.y2)
}

fn cluster_bounds(cluster: &[LineSegment]) -> Rect {
    cluster
        .iter()
        .map(segment_bounds)
        .reduce(|a, b| a.union(&b))
        .unwrap_or_else(Rect::zero)
}

/// Check that some segment endpoint lies on an outer edge coordinate.
/// For a horizontal edge (a row boundary) the evidence can be a horizontal
/// segment at that Y or a vertical segment ending there; symmetrically for
/// column boundaries.
fn edge_has_endpoint(
    horizontal: &[LineSegment],
    vertical: &[LineSegment],
    coordinate: f32,
    eps: f32,
    is_row_boundary: bool,
) -> bool {
    if is_row_boundary {
        horizontal
            .iter()
            .any(|s| (s.axis_position() - coordinate).abs() <= eps)
            || vertical
                .iter()
                .any(|s| (s.y1 - coordinate).abs() <= eps || (s.y2 - coordinate).abs() <= eps)
    } else {
        vertical
            .iter()
            .any(|s| (s.axis_position() - coordinate).abs() <= eps)
            || horizontal
                .iter()
                .any(|s| (s.x1 - coordinate).abs() <= eps || (s.x2 - coordinate).abs() <= eps)
    }
}

/// Count interior boundary positions that carry a matching segment.
fn interior_hits(positions: &[f32], segments: &[LineSegment], eps: f32) -> usize {
    positions
        .iter()
        .filter(|p| segment_along(segments, **p, eps))
        .count()
}

/// Check whether any segment runs along the given cross-axis position.
fn segment_along(segments: &[LineSegment], position: f32, eps: f32) -> bool {
    segments
        .iter()
        .any(|s| (s.axis_position() - position).abs() <= eps)
}

/// Union length of segments at a cross-axis position, clipped to a span.
fn union_coverage(segments: &[LineSegment], position: f32, eps: f32, span: (f32, f32)) -> f32 {
    let mut intervals: Vec<(f32, f32)> = segments
        .iter()
        .filter(|s| (s.axis_position() - position).abs() <= eps)
        .map(|s| {
            let (lo, hi) = s.span();
            (lo.max(span.0), hi.min(span.1))
        })
        .filter(|(lo, hi)| hi > lo)
        .collect();
    intervals.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    let mut total = 0.0;
    let mut current: Option<(f32, f32)> = None;
    for (lo, hi) in intervals {
        match current {
            Some((clo, chi)) if lo <= chi => current = Some((clo, chi.max(hi))),
            Some((clo, chi)) => {
                total += chi - clo;
                current = Some((lo, hi));
            }
            None => current = Some((lo, hi)),
        }
    }
    if let Some((lo, hi)) = current {
        total += hi - lo;
    }
    total
}

/// Resolve one cell edge to the best-overlapping segment, or no border.
fn edge_border(
    segments: &[LineSegment],
    position: f32,
    eps: f32,
    span: (f32, f32),
) -> BorderStyle {
    let mut best: Option<(&LineSegment, f32)> = None;
    for segment in segments {
        if (segment.axis_position() - position).abs() > eps {
            continue;
        }
        let (lo, hi) = segment.span();
        let overlap = (hi.min(span.1) - lo.max(span.0)).max(0.0);
        if overlap <= 0.0 {
            continue;
        }
        if best.map(|(_, o)| overlap > o).unwrap_or(true) {
            best = Some((segment, overlap));
        }
    }
    match best {
        Some((segment, _)) => BorderStyle::single(segment.thickness, segment.color.clone()),
        None => BorderStyle::none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::RectangleElement;

    fn h_line(y: f32, x1: f32, x2: f32) -> LineSegment {
        LineSegment::new(x1, y, x2, y, 1.0, "000000")
    }

    fn v_line(x: f32, y1: f32, y2: f32) -> LineSegment {
        LineSegment::new(x, y1, x, y2, 1.0, "000000")
    }

    fn page_with(lines: Vec<LineSegment>) -> PageContent {
        let mut page = PageContent::new(1, 612.0, 792.0);
        page.lines = lines;
        page
    }

    fn grid_2x2() -> Vec<LineSegment> {
        vec![
            h_line(100.0, 100.0, 300.0),
            h_line(150.0, 100.0, 300.0),
            h_line(200.0, 100.0, 300.0),
            v_line(100.0, 100.0, 200.0),
            v_line(200.0, 100.0, 200.0),
            v_line(300.0, 100.0, 200.0),
        ]
    }

    #[test]
    fn test_snap_positions_folds_within_tolerance() {
        let snapped = snap_positions(vec![100.0, 101.0, 200.0, 99.5], 3.0);
        assert_eq!(snapped.len(), 2);
        assert!((snapped[0] - 100.166).abs() < 0.01);
        assert_eq!(snapped[1], 200.0);
    }

    #[test]
    fn test_detect_simple_2x2_grid() {
        let detector = TableDetector::new();
        let layout = LayoutAnalyzer::new();
        let page = page_with(grid_2x2());

        let tables = detector.detect(&page, &layout);
        assert_eq!(tables.len(), 1);

        let table = &tables[0];
        assert_eq!(table.row_count, 2);
        assert_eq!(table.col_count, 2);
        assert_eq!(table.column_widths, vec![100.0, 100.0]);
        assert_eq!(table.row_heights, vec![50.0, 50.0]);
        assert!(table.confidence >= 0.4);

        // All four outer borders present on the corner cells
        let top_left = table.cell(0, 0).unwrap();
        assert!(top_left.borders.top.is_visible());
        assert!(top_left.borders.left.is_visible());
        let bottom_right = table.cell(1, 1).unwrap();
        assert!(bottom_right.borders.bottom.is_visible());
        assert!(bottom_right.borders.right.is_visible());

        // No text anywhere
        assert!(table.origin_cells().all(|c| !c.has_text()));
    }

    #[test]
    fn test_page_border_frame_rejected() {
        let detector = TableDetector::new();
        let layout = LayoutAnalyzer::new();
        // ~90% of the page in both axes
        let page = page_with(vec![
            h_line(40.0, 30.0, 582.0),
            h_line(396.0, 30.0, 582.0),
            h_line(752.0, 30.0, 582.0),
            v_line(30.0, 40.0, 752.0),
            v_line(306.0, 40.0, 752.0),
            v_line(582.0, 40.0, 752.0),
        ]);

        let tables = detector.detect(&page, &layout);
        assert!(tables.is_empty());
    }

    #[test]
    fn test_single_box_rejected() {
        let detector = TableDetector::new();
        let layout = LayoutAnalyzer::new();
        // A closed rectangle with no interior lines: 1x1
        let page = page_with(vec![
            h_line(100.0, 100.0, 300.0),
            h_line(200.0, 100.0, 300.0),
            v_line(100.0, 100.0, 200.0),
            v_line(300.0, 100.0, 200.0),
        ]);

        let tables = detector.detect(&page, &layout);
        assert!(tables.is_empty());
    }

    #[test]
    fn test_merged_header_row() {
        let detector = TableDetector::new();
        let layout = LayoutAnalyzer::new();
        // 2x2 grid with the column separator missing in the top row
        let page = page_with(vec![
            h_line(100.0, 100.0, 300.0),
            h_line(150.0, 100.0, 300.0),
            h_line(200.0, 100.0, 300.0),
            v_line(100.0, 100.0, 200.0),
            v_line(200.0, 150.0, 200.0), // only spans the bottom row
            v_line(300.0, 100.0, 200.0),
        ]);

        let tables = detector.detect(&page, &layout);
        assert_eq!(tables.len(), 1);

        let table = &tables[0];
        let header = table.cell(0, 0).unwrap();
        assert_eq!(header.col_span, 2);
        assert_eq!(header.bounds.right, 300.0);
        assert!(table.cell(0, 1).unwrap().is_merged_continuation);
        assert!(table.cell(1, 0).unwrap().is_origin());
        assert!(table.cell(1, 1).unwrap().is_origin());
    }

    #[test]
    fn test_vertical_merge() {
        let detector = TableDetector::new();
        let layout = LayoutAnalyzer::new();
        // 2x2 grid with the row separator missing in the left column
        let page = page_with(vec![
            h_line(100.0, 100.0, 300.0),
            h_line(150.0, 200.0, 300.0), // only spans the right column
            h_line(200.0, 100.0, 300.0),
            v_line(100.0, 100.0, 200.0),
            v_line(200.0, 100.0, 200.0),
            v_line(300.0, 100.0, 200.0),
        ]);

        let tables = detector.detect(&page, &layout);
        assert_eq!(tables.len(), 1);

        let table = &tables[0];
        let tall = table.cell(0, 0).unwrap();
        assert_eq!(tall.row_span, 2);
        assert_eq!(tall.bounds.bottom, 200.0);
        assert!(table.cell(1, 0).unwrap().is_merged_continuation);
        assert!(table.cell(0, 1).unwrap().is_origin());
    }

    #[test]
    fn test_cell_population() {
        let detector = TableDetector::new();
        let layout = LayoutAnalyzer::new();
        let mut page = page_with(grid_2x2());
        page.text_elements.push(TextElement::new(
            "Name",
            Rect::new(110.0, 115.0, 150.0, 127.0),
            "Helvetica",
            12.0,
        ));

        let tables = detector.detect(&page, &layout);
        let table = &tables[0];
        let cell = table.cell(0, 0).unwrap();
        assert!(cell.has_text());
        assert_eq!(cell.content[0].plain_text(), "Name");
        assert!(!table.cell(0, 1).unwrap().has_text());
    }

    #[test]
    fn test_shading_from_filled_rect() {
        let detector = TableDetector::new();
        let layout = LayoutAnalyzer::new();
        let mut page = page_with(grid_2x2());
        // Fully covers the (0,0) cell
        page.rectangles.push(RectangleElement::filled(
            Rect::new(100.0, 100.0, 200.0, 150.0),
            "DDEEFF",
        ));

        let tables = detector.detect(&page, &layout);
        let table = &tables[0];
        assert_eq!(
            table.cell(0, 0).unwrap().background_color.as_deref(),
            Some("DDEEFF")
        );
        assert!(table.cell(0, 1).unwrap().background_color.is_none());
    }

    #[test]
    fn test_two_separate_tables_via_sub_grids() {
        let detector = TableDetector::new();
        let layout = LayoutAnalyzer::new();
        // Two wide 2x2 grids near the top and bottom of the page; the
        // global candidate spans >80% of both page dimensions and is
        // rejected as a frame, forcing sub-grid clustering.
        let lines = vec![
            h_line(60.0, 40.0, 580.0),
            h_line(110.0, 40.0, 580.0),
            h_line(160.0, 40.0, 580.0),
            v_line(40.0, 60.0, 160.0),
            v_line(310.0, 60.0, 160.0),
            v_line(580.0, 60.0, 160.0),
            h_line(660.0, 40.0, 580.0),
            h_line(710.0, 40.0, 580.0),
            h_line(760.0, 40.0, 580.0),
            v_line(40.0, 660.0, 760.0),
            v_line(310.0, 660.0, 760.0),
            v_line(580.0, 660.0, 760.0),
        ];
        let page = page_with(lines);

        let tables = detector.detect(&page, &layout);
        assert_eq!(tables.len(), 2);
        assert!(tables[0].bounds.top < tables[1].bounds.top);
        for table in &tables {
            assert_eq!(table.row_count, 2);
            assert_eq!(table.col_count, 2);
        }
    }

    #[test]
    fn test_union_coverage() {
        let segments = vec![v_line(200.0, 100.0, 140.0), v_line(200.0, 160.0, 200.0)];
        // Two pieces covering 40 + 40 of the 100pt span
        let coverage = union_coverage(&segments, 200.0, 3.0, (100.0, 200.0));
        assert!((coverage - 80.0).abs() < 0.01);
    }

    #[test]
    fn test_thin_rect_counts_as_rule() {
        let detector = TableDetector::new();
        let layout = LayoutAnalyzer::new();
        let mut page = page_with(vec![
            h_line(100.0, 100.0, 300.0),
            h_line(150.0, 100.0, 300.0),
            v_line(100.0, 100.0, 200.0),
            v_line(200.0, 100.0, 200.0),
            v_line(300.0, 100.0, 200.0),
        ]);
        // Bottom rule drawn as a 1pt-tall filled box
        page.rectangles.push(RectangleElement::filled(
            Rect::new(100.0, 199.5, 300.0, 200.5),
            "000000",
        ));

        let tables = detector.detect(&page, &layout);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].row_count, 2);
    }
}
