//! Placement geometry
//!
//! Maps a normalized, top-left-origin placement onto PDF device space, whose
//! origin is the bottom-left corner of the page.

use crate::error::PlacementError;
use crate::placement::Placement;

/// Page dimensions in PDF points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Rectangle in device space (bottom-left origin)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceRect {
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
    pub top: f64,
}

impl DeviceRect {
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }

    /// Pixel size of an image drawn into this rectangle, never below 1x1
    pub fn pixel_size(&self) -> (u32, u32) {
        let side = |len: f64| len.round().max(1.0) as u32;
        (side(self.width()), side(self.height()))
    }
}

/// Resolve a placement against the target page size
///
/// The result is not clipped: a placement whose `y + height` exceeds 1
/// produces a rectangle that extends past the page edge.
pub fn resolve(placement: &Placement, page: PageSize) -> Result<DeviceRect, PlacementError> {
    placement.validate_bounds()?;

    let abs_width = placement.width * page.width;
    let abs_height = placement.height * page.height;
    let left = placement.x * page.width;
    let bottom = page.height - placement.y * page.height - abs_height;

    Ok(DeviceRect {
        left,
        bottom,
        right: left + abs_width,
        top: bottom + abs_height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LETTER: PageSize = PageSize {
        width: 612.0,
        height: 792.0,
    };

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_full_page_placement() {
        let rect = resolve(&Placement::new(0, 0.0, 0.0, 1.0, 1.0), LETTER).unwrap();
        assert_eq!(
            rect,
            DeviceRect {
                left: 0.0,
                bottom: 0.0,
                right: 612.0,
                top: 792.0
            }
        );
    }

    #[test]
    fn test_top_placement_touches_top_edge() {
        let placement = Placement::new(0, 0.25, 0.0, 0.5, 0.1);
        let rect = resolve(&placement, LETTER).unwrap();

        assert!(close(rect.bottom + rect.height(), LETTER.height));
        assert!(close(rect.left, 153.0));
        assert!(close(rect.width(), 306.0));
    }

    #[test]
    fn test_bottom_placement_touches_bottom_edge() {
        let placement = Placement::new(0, 0.0, 0.8, 0.3, 0.2);
        let rect = resolve(&placement, LETTER).unwrap();

        assert!(close(rect.bottom, 0.0));
        assert!(close(rect.top, 0.2 * LETTER.height));
    }

    #[test]
    fn test_overflowing_placement_is_not_clipped() {
        let placement = Placement::new(0, 0.0, 0.9, 0.5, 0.5);
        let rect = resolve(&placement, LETTER).unwrap();

        assert!(rect.bottom < 0.0);
        assert!(close(rect.height(), 0.5 * LETTER.height));
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        let err = resolve(&Placement::new(0, 0.0, 0.0, 1.0000001, 0.5), LETTER).unwrap_err();
        assert!(matches!(
            err,
            PlacementError::ValueOutOfRange { field: "width", .. }
        ));

        assert!(resolve(&Placement::new(0, 0.0, 0.0, 0.0, 0.5), LETTER).is_err());
        assert!(resolve(&Placement::new(0, 0.0, 0.0, 0.0001, 0.5), LETTER).is_ok());
    }

    #[test]
    fn test_pixel_size_floors_at_one() {
        let rect = resolve(&Placement::new(0, 0.0, 0.0, 0.0001, 0.0001), LETTER).unwrap();
        assert_eq!(rect.pixel_size(), (1, 1));

        let rect = resolve(&Placement::new(0, 0.0, 0.0, 0.5, 0.25), LETTER).unwrap();
        assert_eq!(rect.pixel_size(), (306, 198));
    }
}
