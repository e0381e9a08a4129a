//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

use super::params::BoundingBox;

/// Calculate the dimensions of an image scaled to fit inside a bounding box.
///
/// Aspect ratio is preserved and nothing is cropped. The result touches the
/// box on at least one edge. With `enlarge` off, images that already fit
/// keep their original size.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `bounds` - Box the result must fit inside
/// * `enlarge` - Whether images smaller than the box are scaled up
///
/// # Returns
/// * `(width, height)` - Output dimensions, each at least 1px
///
/// # Examples
/// ```
/// # use sketchbook::imaging::{BoundingBox, calculate_fit_dimensions};
/// // 4000x3000 landscape into 2000x2000 → 2000x1500
/// assert_eq!(calculate_fit_dimensions((4000, 3000), BoundingBox::square(2000), true), (2000, 1500));
///
/// // 640x480 into 800x800 → 800x600, or unchanged without enlarging
/// assert_eq!(calculate_fit_dimensions((640, 480), BoundingBox::square(800), true), (800, 600));
/// assert_eq!(calculate_fit_dimensions((640, 480), BoundingBox::square(800), false), (640, 480));
/// ```
pub fn calculate_fit_dimensions(
    source: (u32, u32),
    bounds: BoundingBox,
    enlarge: bool,
) -> (u32, u32) {
    let (src_w, src_h) = source;
    if src_w == 0 || src_h == 0 {
        return (src_w, src_h);
    }
    if !enlarge && src_w <= bounds.width && src_h <= bounds.height {
        return (src_w, src_h);
    }

    let scale_w = bounds.width as f64 / src_w as f64;
    let scale_h = bounds.height as f64 / src_h as f64;
    let scale = scale_w.min(scale_h);

    let w = ((src_w as f64 * scale).round() as u32).clamp(1, bounds.width.max(1));
    let h = ((src_h as f64 * scale).round() as u32).clamp(1, bounds.height.max(1));
    (w, h)
}
