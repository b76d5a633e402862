// SPDX-License-Identifier: MPL-2.0
//! Construction parameters: everything needed to rebuild a layer from its
//! file plus the display state it had.

use super::{Color, FillStyle, Layer, LayerKind, LineStyle};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub struct ImageLayerParameters {
    pub path: PathBuf,
    pub visible: bool,
    pub transformable: bool,
    pub alpha: u8,
    pub gamma: f64,
    pub intensity_min: f64,
    pub intensity_max: f64,
    pub is_transparent: bool,
    pub transparency_min: f64,
    pub transparency_max: f64,
    pub zoom_factor: f64,
    pub translation_x: f64,
    pub translation_y: f64,
    pub use_alpha_channel: bool,
    pub alpha_channel_index: usize,
}

impl ImageLayerParameters {
    /// Defaults matching a freshly loaded 8-bit image.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            visible: true,
            transformable: true,
            alpha: 255,
            gamma: 1.0,
            intensity_min: 0.0,
            intensity_max: 255.0,
            is_transparent: false,
            transparency_min: 0.0,
            transparency_max: 0.0,
            zoom_factor: 1.0,
            translation_x: 0.0,
            translation_y: 0.0,
            use_alpha_channel: false,
            alpha_channel_index: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VectorLayerParameters {
    pub path: PathBuf,
    pub visible: bool,
    pub transformable: bool,
    pub point_color: Color,
    pub point_width: u32,
    pub line_color: Color,
    pub line_width: u32,
    pub line_style: LineStyle,
    pub polygon_border_color: Color,
    pub polygon_border_width: u32,
    pub polygon_border_style: LineStyle,
    pub polygon_inner_color: Color,
    pub polygon_inner_style: FillStyle,
    pub zoom_factor: f64,
    pub translation_x: f64,
    pub translation_y: f64,
}

impl VectorLayerParameters {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let style = super::VectorStyle::default();
        Self {
            path: path.into(),
            visible: true,
            transformable: true,
            point_color: style.point_color,
            point_width: style.point_width,
            line_color: style.line_color,
            line_width: style.line_width,
            line_style: style.line_style,
            polygon_border_color: style.polygon_border_color,
            polygon_border_width: style.polygon_border_width,
            polygon_border_style: style.polygon_border_style,
            polygon_inner_color: style.polygon_inner_color,
            polygon_inner_style: style.polygon_inner_style,
            zoom_factor: 1.0,
            translation_x: 0.0,
            translation_y: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayerParameters {
    Image(ImageLayerParameters),
    Vector(VectorLayerParameters),
}

impl LayerParameters {
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            LayerParameters::Image(p) => &p.path,
            LayerParameters::Vector(p) => &p.path,
        }
    }

    /// Captures the current state of a file-backed layer.
    ///
    /// `None` for layers that were never loaded from or saved to a file.
    #[must_use]
    pub fn from_layer(layer: &Layer) -> Option<Self> {
        let path = layer.filename()?.to_path_buf();
        let t = layer.transform();
        Some(match layer.kind() {
            LayerKind::Image(img) => {
                let d = img.display();
                LayerParameters::Image(ImageLayerParameters {
                    path,
                    visible: layer.is_visible(),
                    transformable: layer.is_transformable(),
                    alpha: d.alpha,
                    gamma: d.gamma,
                    intensity_min: d.intensity_min,
                    intensity_max: d.intensity_max,
                    is_transparent: d.is_transparent,
                    transparency_min: d.transparency_min,
                    transparency_max: d.transparency_max,
                    zoom_factor: t.zoom_factor(),
                    translation_x: t.translation_x(),
                    translation_y: t.translation_y(),
                    use_alpha_channel: d.use_alpha_channel,
                    alpha_channel_index: d.alpha_channel_index,
                })
            }
            LayerKind::Vector(vec) => {
                let s = vec.style();
                LayerParameters::Vector(VectorLayerParameters {
                    path,
                    visible: layer.is_visible(),
                    transformable: layer.is_transformable(),
                    point_color: s.point_color,
                    point_width: s.point_width,
                    line_color: s.line_color,
                    line_width: s.line_width,
                    line_style: s.line_style,
                    polygon_border_color: s.polygon_border_color,
                    polygon_border_width: s.polygon_border_width,
                    polygon_border_style: s.polygon_border_style,
                    polygon_inner_color: s.polygon_inner_color,
                    polygon_inner_style: s.polygon_inner_style,
                    zoom_factor: t.zoom_factor(),
                    translation_x: t.translation_x(),
                    translation_y: t.translation_y(),
                })
            }
        })
    }

    /// Applies every field to `layer` in declaration order.
    ///
    /// Fields that do not match the layer's kind are skipped.
    pub fn apply(&self, layer: &mut Layer) {
        match self {
            LayerParameters::Image(p) => apply_image(p, layer),
            LayerParameters::Vector(p) => apply_vector(p, layer),
        }
    }
}

fn apply_image(p: &ImageLayerParameters, layer: &mut Layer) {
    layer.set_visible(p.visible);
    layer.set_transformable(p.transformable);
    if let LayerKind::Image(img) = layer.kind_mut() {
        let d = img.display_mut();
        d.alpha = p.alpha;
        d.gamma = p.gamma;
        d.intensity_min = p.intensity_min;
        d.intensity_max = p.intensity_max;
        d.is_transparent = p.is_transparent;
        d.transparency_min = p.transparency_min;
        d.transparency_max = p.transparency_max;
    }
    let t = layer.transform_mut();
    t.set_zoom_factor(p.zoom_factor);
    t.set_translation_x(p.translation_x);
    t.set_translation_y(p.translation_y);
    if let LayerKind::Image(img) = layer.kind_mut() {
        let d = img.display_mut();
        d.use_alpha_channel = p.use_alpha_channel;
        d.alpha_channel_index = p.alpha_channel_index;
    }
}

fn apply_vector(p: &VectorLayerParameters, layer: &mut Layer) {
    layer.set_visible(p.visible);
    layer.set_transformable(p.transformable);
    if let LayerKind::Vector(vec) = layer.kind_mut() {
        let s = vec.style_mut();
        s.point_color = p.point_color;
        s.point_width = p.point_width;
        s.line_color = p.line_color;
        s.line_width = p.line_width;
        s.line_style = p.line_style;
        s.polygon_border_color = p.polygon_border_color;
        s.polygon_border_width = p.polygon_border_width;
        s.polygon_border_style = p.polygon_border_style;
        s.polygon_inner_color = p.polygon_inner_color;
        s.polygon_inner_style = p.polygon_inner_style;
    }
    let t = layer.transform_mut();
    t.set_zoom_factor(p.zoom_factor);
    t.set_translation_x(p.translation_x);
    t.set_translation_y(p.translation_y);
}
