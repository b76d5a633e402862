// SPDX-License-Identifier: MPL-2.0
//! Per-layer view transform.
//!
//! The global frame is the view: one global unit is one screen pixel. A
//! layer's local frame is its native pixel (or geometry) frame. The
//! transform holds how many local units one view unit covers
//! (`zoom_factor`) and where the view origin falls in local units
//! (`translation`):
//!
//! ```text
//! local  = rotate_to_local(zoom_factor * global - translation)
//! global = (rotate_from_local(local) + translation) / zoom_factor
//! ```

use super::geometry::{PixelPoint, Point};
use super::newtypes::ZoomFactor;

/// Frame the layer reports its coordinates in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoordinateMode {
    #[default]
    Pixel,
    Cartographic,
}

/// Quarter-turn rotation of a layer inside the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Maps 0, 90, 180 and 270 (and their multiples of 360) to a rotation.
    #[must_use]
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        match degrees.rem_euclid(360) {
            0 => Some(Rotation::Deg0),
            90 => Some(Rotation::Deg90),
            180 => Some(Rotation::Deg180),
            270 => Some(Rotation::Deg270),
            _ => None,
        }
    }

    #[must_use]
    pub fn degrees(self) -> i32 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayerTransform {
    zoom_factor: ZoomFactor,
    translation_x: f64,
    translation_y: f64,
    coordinate_mode: CoordinateMode,
    resolution: f64,
    width: u32,
    height: u32,
    rotation: Rotation,
}

impl Default for LayerTransform {
    fn default() -> Self {
        Self {
            zoom_factor: ZoomFactor::default(),
            translation_x: 0.0,
            translation_y: 0.0,
            coordinate_mode: CoordinateMode::Pixel,
            resolution: 1.0,
            width: 0,
            height: 0,
            rotation: Rotation::Deg0,
        }
    }
}

impl LayerTransform {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------------
    // Conversions
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn to_local(&self, global: Point) -> Point {
        let zoom = self.zoom_factor.value();
        let shifted = Point::new(
            zoom * global.x - self.translation_x,
            zoom * global.y - self.translation_y,
        );
        self.rotated_coordinate_to_local(shifted)
    }

    #[must_use]
    pub fn from_local(&self, local: Point) -> Point {
        let zoom = self.zoom_factor.value();
        let unrotated = self.rotated_coordinate_from_local(local);
        Point::new(
            (unrotated.x + self.translation_x) / zoom,
            (unrotated.y + self.translation_y) / zoom,
        )
    }

    /// Integer variant of [`to_local`](Self::to_local): `trunc(value + offset)`.
    #[must_use]
    pub fn to_local_int(&self, global: Point, offset: f64) -> PixelPoint {
        truncate_with_offset(self.to_local(global), offset)
    }

    /// Integer variant of [`from_local`](Self::from_local): `trunc(value + offset)`.
    #[must_use]
    pub fn from_local_int(&self, local: Point, offset: f64) -> PixelPoint {
        truncate_with_offset(self.from_local(local), offset)
    }

    /// Maps a point of the view-aligned local frame into the layer's
    /// unrotated frame, using the stored width and height.
    #[must_use]
    pub fn rotated_coordinate_to_local(&self, p: Point) -> Point {
        let w = f64::from(self.width);
        let h = f64::from(self.height);
        match self.rotation {
            Rotation::Deg0 => p,
            Rotation::Deg90 => Point::new(p.y, h - p.x),
            Rotation::Deg180 => Point::new(w - p.x, h - p.y),
            Rotation::Deg270 => Point::new(w - p.y, p.x),
        }
    }

    /// Inverse of [`rotated_coordinate_to_local`](Self::rotated_coordinate_to_local).
    #[must_use]
    pub fn rotated_coordinate_from_local(&self, p: Point) -> Point {
        let w = f64::from(self.width);
        let h = f64::from(self.height);
        match self.rotation {
            Rotation::Deg0 => p,
            Rotation::Deg90 => Point::new(h - p.y, p.x),
            Rotation::Deg180 => Point::new(w - p.x, h - p.y),
            Rotation::Deg270 => Point::new(p.y, w - p.x),
        }
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Pans by a view-unit delta, scaled into local units.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        let zoom = self.zoom_factor.value();
        self.translation_x += dx * zoom;
        self.translation_y += dy * zoom;
    }

    /// Zooms by `factor` keeping the local point under the anchor in place.
    ///
    /// Translation is updated before the zoom factor. Non-positive or
    /// non-finite factors are ignored. Near the zoom bounds only the part of
    /// `factor` that fits is applied.
    pub fn zoom(&mut self, factor: f64, anchor_x: f64, anchor_y: f64) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let zoom = self.zoom_factor.value();
        let scaled = self.zoom_factor.scaled(factor);
        // The stored zoom is clamped; the anchor must follow the applied ratio.
        let effective = scaled.value() / zoom;
        self.translation_x += anchor_x * zoom * (effective - 1.0);
        self.translation_y += anchor_y * zoom * (effective - 1.0);
        self.zoom_factor = scaled;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn zoom_factor(&self) -> f64 {
        self.zoom_factor.value()
    }

    pub fn set_zoom_factor(&mut self, zoom: f64) {
        self.zoom_factor = ZoomFactor::new(zoom);
    }

    #[must_use]
    pub fn translation_x(&self) -> f64 {
        self.translation_x
    }

    #[must_use]
    pub fn translation_y(&self) -> f64 {
        self.translation_y
    }

    #[must_use]
    pub fn translation(&self) -> Point {
        Point::new(self.translation_x, self.translation_y)
    }

    pub fn set_translation_x(&mut self, tx: f64) {
        self.translation_x = tx;
    }

    pub fn set_translation_y(&mut self, ty: f64) {
        self.translation_y = ty;
    }

    pub fn set_translation(&mut self, tx: f64, ty: f64) {
        self.translation_x = tx;
        self.translation_y = ty;
    }

    #[must_use]
    pub fn coordinate_mode(&self) -> CoordinateMode {
        self.coordinate_mode
    }

    pub fn set_coordinate_mode(&mut self, mode: CoordinateMode) {
        self.coordinate_mode = mode;
    }

    #[must_use]
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    pub fn set_resolution(&mut self, resolution: f64) {
        self.resolution = resolution;
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn set_dimensions(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    #[must_use]
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Sets the rotation together with the dimensions it pivots on.
    pub fn set_orientation(&mut self, rotation: Rotation, width: u32, height: u32) {
        self.rotation = rotation;
        self.width = width;
        self.height = height;
    }
}

#[allow(clippy::cast_possible_truncation)]
fn truncate_with_offset(p: Point, offset: f64) -> PixelPoint {
    PixelPoint::new((p.x + offset).trunc() as i64, (p.y + offset).trunc() as i64)
}
