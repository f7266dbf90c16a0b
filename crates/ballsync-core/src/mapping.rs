//! Image pixel space to target plane mapping.
//!
//! Pixel (0, 0) is the top-left corner of the image. It lands at
//! `(+target_width / 2, 0, +target_height / 2)`: the horizontal axis is
//! mirrored and image rows grow toward negative depth.

use serde::{Deserialize, Serialize};

/// A point in the presentation coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetPosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Fixed affine transform from image pixels to the target plane.
///
/// # Examples
/// ```
/// use ballsync_core::CoordinateMapper;
///
/// let mapper = CoordinateMapper::new(1280.0, 720.0, 10.0, 5.0);
/// let pos = mapper.map(0, 0);
/// assert_eq!((pos.x, pos.y, pos.z), (5.0, 0.0, 2.5));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    image_width: f64,
    image_height: f64,
    target_width: f64,
    target_height: f64,
}

impl CoordinateMapper {
    pub fn new(image_width: f64, image_height: f64, target_width: f64, target_height: f64) -> Self {
        Self {
            image_width,
            image_height,
            target_width,
            target_height,
        }
    }

    /// Map a pixel to the target plane. No clamping: pixels outside the
    /// image map outside the target extents.
    pub fn map(&self, pixel_x: i32, pixel_y: i32) -> TargetPosition {
        let px = f64::from(pixel_x);
        let py = f64::from(pixel_y);
        let x = -((px / self.image_width) * self.target_width - self.target_width / 2.0);
        let z = (self.image_height - py) / self.image_height * self.target_height
            - self.target_height / 2.0;
        TargetPosition { x, y: 0.0, z }
    }
}

#[cfg(test)]
mod tests {
    use super::CoordinateMapper;

    fn mapper() -> CoordinateMapper {
        CoordinateMapper::new(1280.0, 720.0, 10.0, 5.0)
    }

    #[test]
    fn top_left_maps_to_positive_corner() {
        let pos = mapper().map(0, 0);
        assert_eq!((pos.x, pos.y, pos.z), (5.0, 0.0, 2.5));
    }

    #[test]
    fn center_maps_to_origin() {
        let pos = mapper().map(640, 360);
        assert_eq!((pos.x, pos.y, pos.z), (0.0, 0.0, 0.0));
    }

    #[test]
    fn bottom_right_maps_to_negative_corner() {
        let pos = mapper().map(1280, 720);
        assert_eq!((pos.x, pos.y, pos.z), (-5.0, 0.0, -2.5));
    }

    #[test]
    fn outside_pixels_are_not_clamped() {
        let pos = mapper().map(-1280, 1440);
        assert_eq!(pos.x, 15.0);
        assert_eq!(pos.z, -7.5);
    }
}
