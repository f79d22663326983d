//! Unit conversions. Layout works in points (1/72 inch).

pub const POINTS_PER_INCH: f64 = 72.0;
pub const POINTS_PER_CM: f64 = 28.35;
pub const POINTS_PER_MM: f64 = 2.835;
pub const TWIPS_PER_POINT: f64 = 20.0;

/// Points per character unit of an Excel column width.
pub const POINTS_PER_CHARACTER: f64 = 7.5;

pub fn inches_to_points(inches: f64) -> f64 {
    inches * POINTS_PER_INCH
}

pub fn points_to_inches(points: f64) -> f64 {
    points / POINTS_PER_INCH
}

pub fn cm_to_points(cm: f64) -> f64 {
    cm * POINTS_PER_CM
}

pub fn mm_to_points(mm: f64) -> f64 {
    mm * POINTS_PER_MM
}

pub fn twips_to_points(twips: f64) -> f64 {
    twips / TWIPS_PER_POINT
}

/// Convert device pixels at `dpi` to points.
pub fn pixels_to_points(pixels: f64, dpi: f64) -> f64 {
    if dpi <= 0.0 {
        return pixels;
    }
    pixels * POINTS_PER_INCH / dpi
}

/// Convert points to device pixels at `dpi`.
pub fn points_to_pixels(points: f64, dpi: f64) -> f64 {
    points * dpi / POINTS_PER_INCH
}

/// Convert an Excel column width (in characters) to points.
pub fn characters_to_points(chars: f64) -> f64 {
    chars * POINTS_PER_CHARACTER
}
