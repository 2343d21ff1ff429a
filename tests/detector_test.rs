//! Integration tests for grid detection against the documented scenarios.

use pdf2docx::geometry::{LineSegment, Rect};
use pdf2docx::{LayoutAnalyzer, PageContent, TableDetector, TextElement};

fn h_line(y: f32, x1: f32, x2: f32) -> LineSegment {
    LineSegment::new(x1, y, x2, y, 1.0, "000000")
}

fn v_line(x: f32, y1: f32, y2: f32) -> LineSegment {
    LineSegment::new(x, y1, x, y2, 1.0, "000000")
}

fn letter_page(lines: Vec<LineSegment>) -> PageContent {
    let mut page = PageContent::new(1, 612.0, 792.0);
    page.lines = lines;
    page
}

/// Scenario: three horizontal and three vertical rules forming a 2x2 grid.
#[test]
fn simple_2x2_grid_detected() {
    let page = letter_page(vec![
        h_line(100.0, 100.0, 300.0),
        h_line(150.0, 100.0, 300.0),
        h_line(200.0, 100.0, 300.0),
        v_line(100.0, 100.0, 200.0),
        v_line(200.0, 100.0, 200.0),
        v_line(300.0, 100.0, 200.0),
    ]);

    let tables = TableDetector::new().detect(&page, &LayoutAnalyzer::new());
    assert_eq!(tables.len(), 1);

    let table = &tables[0];
    assert_eq!(table.row_count, 2);
    assert_eq!(table.col_count, 2);
    assert_eq!(table.column_widths, vec![100.0, 100.0]);
    assert_eq!(table.row_heights, vec![50.0, 50.0]);

    // All four outer borders present
    assert!(table.cell(0, 0).unwrap().borders.top.is_visible());
    assert!(table.cell(0, 0).unwrap().borders.left.is_visible());
    assert!(table.cell(1, 1).unwrap().borders.bottom.is_visible());
    assert!(table.cell(1, 1).unwrap().borders.right.is_visible());

    // All cells empty
    for cell in table.origin_cells() {
        assert!(!cell.has_text());
    }
}

/// Scenario: a frame covering ~90% of the page in both axes is decoration.
#[test]
fn page_border_frame_rejected() {
    let page = letter_page(vec![
        h_line(40.0, 30.0, 582.0),
        h_line(396.0, 30.0, 582.0),
        h_line(752.0, 30.0, 582.0),
        v_line(30.0, 40.0, 752.0),
        v_line(306.0, 40.0, 752.0),
        v_line(582.0, 40.0, 752.0),
    ]);

    let tables = TableDetector::new().detect(&page, &LayoutAnalyzer::new());
    assert!(tables.is_empty());
}

/// Scenario: a single closed box has one row and one column.
#[test]
fn single_box_rejected() {
    let page = letter_page(vec![
        h_line(100.0, 100.0, 300.0),
        h_line(200.0, 100.0, 300.0),
        v_line(100.0, 100.0, 200.0),
        v_line(300.0, 100.0, 200.0),
    ]);

    let tables = TableDetector::new().detect(&page, &LayoutAnalyzer::new());
    assert!(tables.is_empty());
}

/// Scenario: removing the top row's column separator merges the header.
#[test]
fn merged_header_detected() {
    let page = letter_page(vec![
        h_line(100.0, 100.0, 300.0),
        h_line(150.0, 100.0, 300.0),
        h_line(200.0, 100.0, 300.0),
        v_line(100.0, 100.0, 200.0),
        v_line(200.0, 150.0, 200.0),
        v_line(300.0, 100.0, 200.0),
    ]);

    let tables = TableDetector::new().detect(&page, &LayoutAnalyzer::new());
    assert_eq!(tables.len(), 1);

    let table = &tables[0];
    assert_eq!(table.cell(0, 0).unwrap().col_span, 2);
    assert!(table.cell(0, 1).unwrap().is_merged_continuation);
}

#[test]
fn accepted_tables_satisfy_dimension_invariants() {
    let mut page = letter_page(vec![
        h_line(100.0, 100.0, 400.0),
        h_line(140.0, 100.0, 400.0),
        h_line(180.0, 100.0, 400.0),
        h_line(220.0, 100.0, 400.0),
        v_line(100.0, 100.0, 220.0),
        v_line(200.0, 100.0, 220.0),
        v_line(300.0, 100.0, 220.0),
        v_line(400.0, 100.0, 220.0),
    ]);
    page.text_elements.push(TextElement::new(
        "data",
        Rect::new(110.0, 110.0, 150.0, 122.0),
        "Helvetica",
        10.0,
    ));

    let tables = TableDetector::new().detect(&page, &LayoutAnalyzer::new());
    assert_eq!(tables.len(), 1);

    for table in &tables {
        assert!(table.row_count >= 2);
        assert!(table.col_count >= 2);
        assert!(table.confidence >= 0.4);
        assert!(
            !(table.bounds.width() > 612.0 * 0.8 && table.bounds.height() > 792.0 * 0.8),
            "accepted table must not span most of the page in both axes"
        );

        let width_sum: f32 = table.column_widths.iter().sum();
        let height_sum: f32 = table.row_heights.iter().sum();
        assert!((width_sum - table.bounds.width()).abs() <= 1.0);
        assert!((height_sum - table.bounds.height()).abs() <= 1.0);
    }
}

#[test]
fn merge_continuation_invariant_holds() {
    // 3x3 grid missing two separators: one vertical (top row), one
    // horizontal (left column)
    let page = letter_page(vec![
        h_line(100.0, 100.0, 400.0),
        h_line(150.0, 200.0, 400.0), // missing over the left column
        h_line(200.0, 100.0, 400.0),
        h_line(250.0, 100.0, 400.0),
        v_line(100.0, 100.0, 250.0),
        v_line(200.0, 100.0, 250.0),
        v_line(300.0, 150.0, 250.0), // missing in the top row
        v_line(400.0, 100.0, 250.0),
    ]);

    let tables = TableDetector::new().detect(&page, &LayoutAnalyzer::new());
    assert_eq!(tables.len(), 1);
    let table = &tables[0];

    for cell in table.origin_cells() {
        assert!(cell.row_span >= 1 && cell.col_span >= 1);
        for r in cell.row..cell.row + cell.row_span {
            for c in cell.col..cell.col + cell.col_span {
                if r == cell.row && c == cell.col {
                    continue;
                }
                assert!(
                    table.cell(r, c).unwrap().is_merged_continuation,
                    "cell ({r},{c}) inside span of ({},{}) must be a continuation",
                    cell.row,
                    cell.col
                );
            }
        }
    }

    // Every cell is either an origin or a continuation
    for r in 0..table.row_count {
        for c in 0..table.col_count {
            let cell = table.cell(r, c).unwrap();
            assert!(cell.is_origin() || cell.is_merged_continuation);
        }
    }
}

#[test]
fn short_segments_are_ignored() {
    // Tick marks below the minimum length must not create a grid
    let page = letter_page(vec![
        h_line(100.0, 100.0, 104.0),
        h_line(150.0, 100.0, 104.0),
        v_line(100.0, 100.0, 104.0),
        v_line(150.0, 100.0, 104.0),
    ]);

    let tables = TableDetector::new().detect(&page, &LayoutAnalyzer::new());
    assert!(tables.is_empty());
}

#[test]
fn cell_text_lands_in_the_right_cell() {
    let mut page = letter_page(vec![
        h_line(100.0, 100.0, 300.0),
        h_line(150.0, 100.0, 300.0),
        h_line(200.0, 100.0, 300.0),
        v_line(100.0, 100.0, 200.0),
        v_line(200.0, 100.0, 200.0),
        v_line(300.0, 100.0, 200.0),
    ]);
    page.text_elements.push(TextElement::new(
        "Alice",
        Rect::new(110.0, 115.0, 150.0, 127.0),
        "Helvetica",
        12.0,
    ));
    page.text_elements.push(TextElement::new(
        "Bob",
        Rect::new(210.0, 165.0, 240.0, 177.0),
        "Helvetica",
        12.0,
    ));

    let tables = TableDetector::new().detect(&page, &LayoutAnalyzer::new());
    let table = &tables[0];
    assert_eq!(table.cell(0, 0).unwrap().plain_text(), "Alice");
    assert_eq!(table.cell(1, 1).unwrap().plain_text(), "Bob");
    assert!(!table.cell(0, 1).unwrap().has_text());
    assert!(!table.cell(1, 0).unwrap().has_text());
}
