// SPDX-License-Identifier: MPL-2.0
//! Linear geo-referencing of a raster grid.

use super::geometry::Point;

/// Maps pixel indices to a shared cartographic frame.
///
/// `carto_x = origin_x + step * pixel_x` and, since rows grow downwards
/// while northings grow upwards, `carto_y = origin_y - step * pixel_y`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orientation {
    origin_x: f64,
    origin_y: f64,
    step: f64,
}

impl Orientation {
    /// Returns `None` unless every field is finite and `step` is non-zero.
    #[must_use]
    pub fn new(origin_x: f64, origin_y: f64, step: f64) -> Option<Self> {
        if !origin_x.is_finite() || !origin_y.is_finite() || !step.is_finite() || step == 0.0 {
            return None;
        }
        Some(Self {
            origin_x,
            origin_y,
            step,
        })
    }

    #[must_use]
    pub fn origin_x(&self) -> f64 {
        self.origin_x
    }

    #[must_use]
    pub fn origin_y(&self) -> f64 {
        self.origin_y
    }

    #[must_use]
    pub fn step(&self) -> f64 {
        self.step
    }

    #[must_use]
    pub fn pixel_to_cartographic(&self, pixel: Point) -> Point {
        Point::new(
            self.origin_x + self.step * pixel.x,
            self.origin_y - self.step * pixel.y,
        )
    }

    #[must_use]
    pub fn cartographic_to_pixel(&self, carto: Point) -> Point {
        Point::new(
            (carto.x - self.origin_x) / self.step,
            (self.origin_y - carto.y) / self.step,
        )
    }
}
