// SPDX-License-Identifier: MPL-2.0
//! Layers: the units of visual content stacked by [`LayerStack`](crate::stack::LayerStack).
//!
//! A [`Layer`] carries what every kind shares (name, flags, transform,
//! orientation, redraw state). Format-specific behaviour dispatches on
//! [`LayerKind`] only where the payload differs.

pub mod ghost;
pub mod image;
pub mod params;
pub mod vector;

pub use ghost::{CaptureStatus, Circle, GeometryKind, GhostLayer};
pub use image::{ChannelConverter, DisplayParameters, ImageLayer, Sample};
pub use params::{ImageLayerParameters, LayerParameters, VectorLayerParameters};
pub use vector::{
    Color, Feature, FillStyle, Geometry, LineStyle, ProjectedFrame, VectorLayer, VectorStyle,
};

use crate::domain::{LayerTransform, Orientation, PixelPoint, Point};
use crate::error::Result;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub enum LayerKind {
    Image(ImageLayer),
    Vector(VectorLayer),
}

impl LayerKind {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            LayerKind::Image(_) => "image",
            LayerKind::Vector(_) => "vector",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Layer {
    name: String,
    filename: Option<PathBuf>,
    visible: bool,
    transformable: bool,
    transform: LayerTransform,
    orientation: Option<Orientation>,
    needs_redraw: bool,
    kind: LayerKind,
}

impl Layer {
    fn with_kind(name: impl Into<String>, kind: LayerKind) -> Self {
        Self {
            name: name.into(),
            filename: None,
            visible: true,
            transformable: true,
            transform: LayerTransform::default(),
            orientation: None,
            needs_redraw: true,
            kind,
        }
    }

    /// Builds an image layer; the transform records the pixel dimensions.
    #[must_use]
    pub fn image(name: impl Into<String>, payload: ImageLayer) -> Self {
        let mut layer = Self::with_kind(name, LayerKind::Image(payload));
        layer.sync_dimensions();
        layer
    }

    #[must_use]
    pub fn vector(name: impl Into<String>, payload: VectorLayer) -> Self {
        Self::with_kind(name, LayerKind::Vector(payload))
    }

    #[must_use]
    pub fn with_filename(mut self, path: impl Into<PathBuf>) -> Self {
        self.filename = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = Some(orientation);
        self
    }

    fn sync_dimensions(&mut self) {
        if let LayerKind::Image(img) = &self.kind {
            let rotation = self.transform.rotation();
            self.transform
                .set_orientation(rotation, img.width(), img.height());
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    #[must_use]
    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    pub fn set_filename(&mut self, path: impl Into<PathBuf>) {
        self.filename = Some(path.into());
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    #[must_use]
    pub fn is_transformable(&self) -> bool {
        self.transformable
    }

    pub fn set_transformable(&mut self, transformable: bool) {
        self.transformable = transformable;
    }

    #[must_use]
    pub fn transform(&self) -> &LayerTransform {
        &self.transform
    }

    /// Mutable access to the transform; marks the layer for redraw.
    pub fn transform_mut(&mut self) -> &mut LayerTransform {
        self.needs_redraw = true;
        &mut self.transform
    }

    #[must_use]
    pub fn orientation(&self) -> Option<&Orientation> {
        self.orientation.as_ref()
    }

    #[must_use]
    pub fn has_orientation(&self) -> bool {
        self.orientation.is_some()
    }

    #[must_use]
    pub fn needs_redraw(&self) -> bool {
        self.needs_redraw
    }

    pub fn invalidate(&mut self) {
        self.needs_redraw = true;
    }

    #[must_use]
    pub fn kind(&self) -> &LayerKind {
        &self.kind
    }

    /// Mutable access to the payload; marks the layer for redraw.
    pub fn kind_mut(&mut self) -> &mut LayerKind {
        self.needs_redraw = true;
        &mut self.kind
    }

    #[must_use]
    pub fn is_vector(&self) -> bool {
        matches!(self.kind, LayerKind::Vector(_))
    }

    #[must_use]
    pub fn as_image(&self) -> Option<&ImageLayer> {
        match &self.kind {
            LayerKind::Image(img) => Some(img),
            LayerKind::Vector(_) => None,
        }
    }

    #[must_use]
    pub fn as_vector(&self) -> Option<&VectorLayer> {
        match &self.kind {
            LayerKind::Vector(vec) => Some(vec),
            LayerKind::Image(_) => None,
        }
    }

    // -------------------------------------------------------------------------
    // Geometry
    // -------------------------------------------------------------------------

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.transform_mut().translate(dx, dy);
    }

    pub fn zoom(&mut self, factor: f64, anchor: Point) {
        self.transform_mut().zoom(factor, anchor.x, anchor.y);
    }

    /// Sets zoom 1 and translation 0, keeping the other transform fields.
    pub fn reset_view(&mut self) {
        let t = self.transform_mut();
        t.set_zoom_factor(1.0);
        t.set_translation(0.0, 0.0);
    }

    // -------------------------------------------------------------------------
    // Capabilities
    // -------------------------------------------------------------------------

    /// Formatted value under a global point, `None` when the layer has no
    /// data there.
    #[must_use]
    pub fn pixel_value(&self, global: Point, tolerance: f64) -> Option<String> {
        let local = self.transform.to_local(global);
        match &self.kind {
            LayerKind::Image(img) => {
                #[allow(clippy::cast_possible_truncation)]
                let pixel = PixelPoint::new(local.x.floor() as i64, local.y.floor() as i64);
                img.pixel_value(pixel)
            }
            LayerKind::Vector(vec) => {
                vec.pixel_value(local, tolerance * self.transform.zoom_factor())
            }
        }
    }

    /// Image layers always hold writable pixels; vector layers need at
    /// least one feature.
    #[must_use]
    pub fn is_saveable(&self) -> bool {
        match &self.kind {
            LayerKind::Image(_) => true,
            LayerKind::Vector(vec) => !vec.is_empty(),
        }
    }

    /// Cropped copy of the local region spanned by two corners.
    ///
    /// The copy's local origin is the region's min corner. An oriented
    /// layer yields an orientation shifted accordingly. `None` when the
    /// region holds no data.
    #[must_use]
    pub fn crop(&self, p0: PixelPoint, p1: PixelPoint) -> Option<Layer> {
        let kind = match &self.kind {
            LayerKind::Image(img) => LayerKind::Image(img.crop(p0, p1)?),
            LayerKind::Vector(vec) => LayerKind::Vector(vec.crop(p0, p1)?),
        };
        let mut layer = Layer::with_kind(format!("{} (crop)", self.name), kind);
        layer.sync_dimensions();
        let min = self.crop_origin(p0, p1);
        layer.orientation = self.orientation.and_then(|o| {
            let origin = o.pixel_to_cartographic(min.into());
            Orientation::new(origin.x, origin.y, o.step())
        });
        Some(layer)
    }

    /// Local point that becomes the origin of a crop spanned by two corners.
    ///
    /// Image crops cannot start before the first pixel; vector crops start
    /// exactly at the min corner.
    #[must_use]
    pub fn crop_origin(&self, p0: PixelPoint, p1: PixelPoint) -> PixelPoint {
        let min = PixelPoint::new(p0.x.min(p1.x), p0.y.min(p1.y));
        match self.kind {
            LayerKind::Image(_) => PixelPoint::new(min.x.max(0), min.y.max(0)),
            LayerKind::Vector(_) => min,
        }
    }

    /// Redraws into a view-sized frame. Success clears the redraw flag;
    /// failure leaves it set.
    pub fn update(&mut self, view_width: u32, view_height: u32) -> Result<()> {
        match &mut self.kind {
            LayerKind::Image(img) => img.render(&self.transform, view_width, view_height)?,
            LayerKind::Vector(vec) => vec.render(&self.transform, view_width, view_height),
        }
        self.needs_redraw = false;
        Ok(())
    }

    /// Multi-line human readable summary.
    #[must_use]
    pub fn infos(&self) -> String {
        let mut out = format!("Name: {}\nKind: {}\n", self.name, self.kind.name());
        if let Some(path) = &self.filename {
            out.push_str(&format!("File: {}\n", path.display()));
        }
        match &self.kind {
            LayerKind::Image(img) => out.push_str(&format!(
                "Size: {} x {}\nChannels: {}\n",
                img.width(),
                img.height(),
                img.channel_count()
            )),
            LayerKind::Vector(vec) => {
                out.push_str(&format!("Features: {}\n", vec.features().len()));
            }
        }
        if let Some(o) = &self.orientation {
            out.push_str(&format!(
                "Origin: ({}, {})\nStep: {}\n",
                o.origin_x(),
                o.origin_y(),
                o.step()
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image_rs::{DynamicImage, GrayImage, Luma};

    fn gray(width: u32, height: u32) -> Layer {
        let buffer = GrayImage::from_fn(width, height, |x, y| Luma([(x + 10 * y) as u8]));
        Layer::image("gray", ImageLayer::new(DynamicImage::ImageLuma8(buffer)))
    }

    #[test]
    fn new_layer_defaults() {
        let layer = gray(4, 3);
        assert!(layer.is_visible());
        assert!(layer.is_transformable());
        assert!(layer.needs_redraw());
        assert!(!layer.has_orientation());
        assert_eq!(layer.transform().width(), 4);
        assert_eq!(layer.transform().height(), 3);
    }

    #[test]
    fn pixel_value_goes_through_transform() {
        let mut layer = gray(8, 8);
        layer.transform_mut().set_zoom_factor(2.0);
        // local = 2 * global
        assert_eq!(
            layer.pixel_value(Point::new(1.2, 1.0), 3.0),
            Some("22".to_string())
        );
        assert_eq!(layer.pixel_value(Point::new(5.0, 0.0), 3.0), None);
    }

    #[test]
    fn update_clears_redraw_flag_only_on_success() {
        let mut layer = gray(2, 2);
        layer.update(4, 4).expect("render");
        assert!(!layer.needs_redraw());

        if let LayerKind::Image(img) = layer.kind_mut() {
            img.display_mut().intensity_max = 0.0;
        }
        assert!(layer.needs_redraw());
        assert!(layer.update(4, 4).is_err());
        assert!(layer.needs_redraw());
    }

    #[test]
    fn geometric_mutations_mark_dirty() {
        let mut layer = gray(2, 2);
        layer.update(2, 2).expect("render");
        layer.translate(1.0, 0.0);
        assert!(layer.needs_redraw());
        layer.update(2, 2).expect("render");
        layer.zoom(2.0, Point::new(1.0, 1.0));
        assert!(layer.needs_redraw());
    }

    #[test]
    fn crop_shifts_orientation_origin() {
        let ori = Orientation::new(100.0, 200.0, 2.0).unwrap();
        let layer = gray(10, 10).with_orientation(ori);
        let cropped = layer
            .crop(PixelPoint::new(2, 3), PixelPoint::new(6, 8))
            .expect("crop");
        let o = cropped.orientation().expect("orientation");
        assert_eq!((o.origin_x(), o.origin_y(), o.step()), (104.0, 194.0, 2.0));
        assert_eq!(cropped.transform().width(), 4);
        assert_eq!(cropped.name(), "gray (crop)");
    }

    #[test]
    fn vector_hit_tolerance_is_in_view_pixels() {
        let mut layer = Layer::vector(
            "pins",
            VectorLayer::new(vec![Feature::new(Geometry::Point(Point::new(5.0, -5.0)))]),
        );
        layer.transform_mut().set_zoom_factor(2.0);
        // one view pixel off the pin is two local units at zoom 2
        let query = Point::new(3.5, 2.5);
        assert!(layer.pixel_value(query, 1.0).is_some());
        assert!(layer.pixel_value(query, 0.9).is_none());
    }

    #[test]
    fn vector_saveable_only_with_features() {
        let empty = Layer::vector("v", VectorLayer::default());
        assert!(!empty.is_saveable());
        let filled = Layer::vector(
            "v",
            VectorLayer::new(vec![Feature::new(Geometry::Point(Point::new(0.0, 0.0)))]),
        );
        assert!(filled.is_saveable());
        assert!(gray(1, 1).is_saveable());
    }

    #[test]
    fn infos_mentions_size_and_origin() {
        let layer = gray(3, 2)
            .with_filename("/data/a.tif")
            .with_orientation(Orientation::new(1.0, 2.0, 0.5).unwrap());
        let infos = layer.infos();
        assert!(infos.contains("Size: 3 x 2"));
        assert!(infos.contains("Step: 0.5"));
        assert!(infos.contains("a.tif"));
    }
}
