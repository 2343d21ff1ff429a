//! Measurement unit conversions for OOXML output.
//!
//! The document model works in typographic points throughout; the OOXML
//! vocabulary wants twips for page and table measurements, EMU for drawing
//! extents, half-points for font sizes, and eighths of a point for border
//! widths.

/// Points per inch.
pub const POINTS_PER_INCH: f32 = 72.0;

/// Twips (twentieths of a point) per point.
pub const TWIPS_PER_POINT: f32 = 20.0;

/// English Metric Units per inch.
pub const EMU_PER_INCH: i64 = 914_400;

/// English Metric Units per point (914400 / 72).
pub const EMU_PER_POINT: i64 = 12_700;

/// Convert points to twips, rounded to the nearest integer.
pub fn pt_to_twips(pt: f32) -> i64 {
    (pt * TWIPS_PER_POINT).round() as i64
}

/// Convert points to English Metric Units.
pub fn pt_to_emu(pt: f32) -> i64 {
    (pt * EMU_PER_POINT as f32).round() as i64
}

/// Convert a font size in points to half-points.
pub fn pt_to_half_points(pt: f32) -> i64 {
    (pt * 2.0).round() as i64
}

/// Convert a border width in points to eighths of a point.
///
/// The output format rejects zero-width visible borders, so the result is
/// clamped to at least 1.
pub fn pt_to_eighth_points(pt: f32) -> i64 {
    ((pt * 8.0).round() as i64).max(1)
}

/// Convert inches to points.
pub fn inches_to_pt(inches: f32) -> f32 {
    inches * POINTS_PER_INCH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pt_to_twips() {
        assert_eq!(pt_to_twips(72.0), 1440);
        assert_eq!(pt_to_twips(1.0), 20);
        assert_eq!(pt_to_twips(0.0), 0);
    }

    #[test]
    fn test_pt_to_emu() {
        assert_eq!(pt_to_emu(72.0), EMU_PER_INCH);
        assert_eq!(pt_to_emu(1.0), 12_700);
    }

    #[test]
    fn test_pt_to_half_points() {
        assert_eq!(pt_to_half_points(12.0), 24);
        assert_eq!(pt_to_half_points(10.5), 21);
    }

    #[test]
    fn test_pt_to_eighth_points_clamps_to_one() {
        assert_eq!(pt_to_eighth_points(1.0), 8);
        assert_eq!(pt_to_eighth_points(0.05), 1);
        assert_eq!(pt_to_eighth_points(0.0), 1);
    }

    #[test]
    fn test_inches_to_pt() {
        assert_eq!(inches_to_pt(1.0), 72.0);
        assert_eq!(inches_to_pt(8.5), 612.0);
    }
}
