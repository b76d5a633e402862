// SPDX-License-Identifier: MPL-2.0
//! Vector payload: features, drawing style and the projected frame.
//!
//! Feature coordinates are cartographic (easting, northing). The layer's
//! local frame flips the northing so that it grows downwards like image
//! rows: `local = (x, -y)`.

use crate::domain::{LayerTransform, PixelPoint, Point, Rect};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const RED: Color = Color::new(255, 0, 0);
    pub const GREEN: Color = Color::new(0, 255, 0);
    pub const BLUE: Color = Color::new(0, 0, 255);

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#rrggbb` form used in display configuration files.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(format!("invalid colour: {}", s));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| format!("invalid colour: {}", s))
        };
        Ok(Color::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

/// Pen style for lines and polygon borders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStyle {
    #[default]
    Solid,
    Dot,
    LongDash,
    ShortDash,
    DotDash,
    Transparent,
}

impl LineStyle {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LineStyle::Solid => "solid",
            LineStyle::Dot => "dot",
            LineStyle::LongDash => "long_dash",
            LineStyle::ShortDash => "short_dash",
            LineStyle::DotDash => "dot_dash",
            LineStyle::Transparent => "transparent",
        }
    }
}

impl FromStr for LineStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "solid" => Ok(LineStyle::Solid),
            "dot" => Ok(LineStyle::Dot),
            "long_dash" => Ok(LineStyle::LongDash),
            "short_dash" => Ok(LineStyle::ShortDash),
            "dot_dash" => Ok(LineStyle::DotDash),
            "transparent" => Ok(LineStyle::Transparent),
            other => Err(format!("invalid line style: {}", other)),
        }
    }
}

/// Brush style for polygon interiors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillStyle {
    #[default]
    Solid,
    Transparent,
    CrossHatch,
    DiagonalHatch,
}

impl FillStyle {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FillStyle::Solid => "solid",
            FillStyle::Transparent => "transparent",
            FillStyle::CrossHatch => "cross_hatch",
            FillStyle::DiagonalHatch => "diagonal_hatch",
        }
    }
}

impl FromStr for FillStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "solid" => Ok(FillStyle::Solid),
            "transparent" => Ok(FillStyle::Transparent),
            "cross_hatch" => Ok(FillStyle::CrossHatch),
            "diagonal_hatch" => Ok(FillStyle::DiagonalHatch),
            other => Err(format!("invalid fill style: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorStyle {
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
}

impl Default for VectorStyle {
    fn default() -> Self {
        Self {
            point_color: Color::RED,
            point_width: 3,
            line_color: Color::BLUE,
            line_width: 1,
            line_style: LineStyle::Solid,
            polygon_border_color: Color::GREEN,
            polygon_border_width: 1,
            polygon_border_style: LineStyle::Solid,
            polygon_inner_color: Color::GREEN,
            polygon_inner_style: FillStyle::Transparent,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Point),
    LineString(Vec<Point>),
    /// Closed ring; the closing vertex is implicit.
    Polygon(Vec<Point>),
}

impl Geometry {
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Geometry::Point(_) => "point",
            Geometry::LineString(_) => "line",
            Geometry::Polygon(_) => "polygon",
        }
    }

    #[must_use]
    pub fn vertices(&self) -> &[Point] {
        match self {
            Geometry::Point(p) => std::slice::from_ref(p),
            Geometry::LineString(points) | Geometry::Polygon(points) => points,
        }
    }

    fn map(&self, f: impl Fn(Point) -> Point) -> Geometry {
        match self {
            Geometry::Point(p) => Geometry::Point(f(*p)),
            Geometry::LineString(points) => {
                Geometry::LineString(points.iter().map(|p| f(*p)).collect())
            }
            Geometry::Polygon(points) => Geometry::Polygon(points.iter().map(|p| f(*p)).collect()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub name: Option<String>,
    pub geometry: Geometry,
}

impl Feature {
    #[must_use]
    pub fn new(geometry: Geometry) -> Self {
        Self {
            name: None,
            geometry,
        }
    }

    #[must_use]
    pub fn named(name: impl Into<String>, geometry: Geometry) -> Self {
        Self {
            name: Some(name.into()),
            geometry,
        }
    }
}

/// Feature geometry projected into view coordinates by the last render.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedFrame {
    pub width: u32,
    pub height: u32,
    pub shapes: Vec<Geometry>,
}

fn to_local(p: Point) -> Point {
    Point::new(p.x, -p.y)
}

fn from_local(p: Point) -> Point {
    Point::new(p.x, -p.y)
}

#[derive(Debug, Clone, Default)]
pub struct VectorLayer {
    features: Vec<Feature>,
    style: VectorStyle,
    frame: Option<ProjectedFrame>,
}

impl VectorLayer {
    #[must_use]
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            features,
            style: VectorStyle::default(),
            frame: None,
        }
    }

    #[must_use]
    pub fn with_style(mut self, style: VectorStyle) -> Self {
        self.style = style;
        self
    }

    #[must_use]
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn push(&mut self, feature: Feature) {
        self.features.push(feature);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    #[must_use]
    pub fn style(&self) -> &VectorStyle {
        &self.style
    }

    pub fn style_mut(&mut self) -> &mut VectorStyle {
        &mut self.style
    }

    #[must_use]
    pub fn frame(&self) -> Option<&ProjectedFrame> {
        self.frame.as_ref()
    }

    /// Bounding box of every vertex in the local frame.
    #[must_use]
    pub fn local_bounds(&self) -> Option<Rect> {
        let mut vertices = self
            .features
            .iter()
            .flat_map(|f| f.geometry.vertices().iter().copied().map(to_local));
        let first = vertices.next()?;
        Some(vertices.fold(Rect::from_corners(first, first), |acc, p| {
            Rect::from_corners(
                Point::new(acc.min.x.min(p.x), acc.min.y.min(p.y)),
                Point::new(acc.max.x.max(p.x), acc.max.y.max(p.y)),
            )
        }))
    }

    /// Describes the first feature within `tolerance` local units of `local`.
    ///
    /// Points and lines answer within the tolerance; polygons answer inside
    /// their ring or near their border.
    #[must_use]
    pub fn pixel_value(&self, local: Point, tolerance: f64) -> Option<String> {
        let p = from_local(local);
        let (index, feature) = self.features.iter().enumerate().find(|(_, f)| {
            let vertices = f.geometry.vertices();
            match &f.geometry {
                Geometry::Point(q) => p.distance(*q) <= tolerance,
                Geometry::LineString(_) => vertices
                    .windows(2)
                    .any(|w| p.distance_to_segment(w[0], w[1]) <= tolerance),
                Geometry::Polygon(ring) => {
                    p.is_inside_ring(ring)
                        || ring
                            .iter()
                            .zip(ring.iter().cycle().skip(1))
                            .any(|(a, b)| p.distance_to_segment(*a, *b) <= tolerance)
                }
            }
        })?;
        Some(match &feature.name {
            Some(name) => format!("{} ({})", name, feature.geometry.kind_name()),
            None => format!("#{} ({})", index, feature.geometry.kind_name()),
        })
    }

    /// Keeps the features with at least one vertex inside the local region
    /// spanned by two corners, shifted so that the region's min corner
    /// becomes the new local origin.
    #[must_use]
    pub fn crop(&self, p0: PixelPoint, p1: PixelPoint) -> Option<VectorLayer> {
        let region = Rect::from_corners(p0.into(), p1.into());
        if region.width() <= 0.0 || region.height() <= 0.0 {
            return None;
        }
        let origin = region.min;
        let features: Vec<Feature> = self
            .features
            .iter()
            .filter(|f| {
                f.geometry
                    .vertices()
                    .iter()
                    .any(|v| region.contains(to_local(*v)))
            })
            .map(|f| Feature {
                name: f.name.clone(),
                geometry: f
                    .geometry
                    .map(|v| from_local(to_local(v) - origin)),
            })
            .collect();
        if features.is_empty() {
            return None;
        }
        Some(VectorLayer {
            features,
            style: self.style.clone(),
            frame: None,
        })
    }

    /// Projects every feature into view coordinates.
    pub fn render(&mut self, transform: &LayerTransform, width: u32, height: u32) {
        let shapes = self
            .features
            .iter()
            .map(|f| f.geometry.map(|v| transform.from_local(to_local(v))))
            .collect();
        self.frame = Some(ProjectedFrame {
            width,
            height,
            shapes,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_layer() -> VectorLayer {
        VectorLayer::new(vec![
            Feature::named("well", Geometry::Point(Point::new(10.0, -10.0))),
            Feature::new(Geometry::LineString(vec![
                Point::new(0.0, 0.0),
                Point::new(100.0, 0.0),
            ])),
            Feature::named(
                "field",
                Geometry::Polygon(vec![
                    Point::new(50.0, -50.0),
                    Point::new(80.0, -50.0),
                    Point::new(80.0, -80.0),
                    Point::new(50.0, -80.0),
                ]),
            ),
        ])
    }

    #[test]
    fn color_hex_round_trip() {
        let color = Color::new(18, 52, 255);
        assert_eq!(color.to_hex(), "#1234ff");
        assert_eq!("#1234ff".parse::<Color>(), Ok(color));
        assert!("#12".parse::<Color>().is_err());
        assert!("#zzzzzz".parse::<Color>().is_err());
    }

    #[test]
    fn styles_parse_their_names() {
        for style in [LineStyle::Solid, LineStyle::DotDash, LineStyle::Transparent] {
            assert_eq!(style.as_str().parse::<LineStyle>(), Ok(style));
        }
        assert_eq!("cross_hatch".parse::<FillStyle>(), Ok(FillStyle::CrossHatch));
        assert!("wavy".parse::<FillStyle>().is_err());
    }

    #[test]
    fn pixel_value_hits_each_geometry_kind() {
        let layer = sample_layer();
        // local y is the negated northing
        assert_eq!(
            layer.pixel_value(Point::new(11.0, 10.0), 3.0),
            Some("well (point)".to_string())
        );
        assert_eq!(
            layer.pixel_value(Point::new(40.0, 1.0), 3.0),
            Some("#1 (line)".to_string())
        );
        assert_eq!(
            layer.pixel_value(Point::new(60.0, 60.0), 3.0),
            Some("field (polygon)".to_string())
        );
        assert_eq!(layer.pixel_value(Point::new(30.0, 30.0), 3.0), None);
    }

    #[test]
    fn crop_keeps_intersecting_features_and_rebases() {
        let layer = sample_layer();
        let cropped = layer
            .crop(PixelPoint::new(5, 5), PixelPoint::new(20, 20))
            .expect("well lies inside");
        assert_eq!(cropped.features().len(), 1);
        assert_eq!(
            cropped.features()[0].geometry,
            Geometry::Point(Point::new(5.0, -5.0))
        );
        assert!(layer
            .crop(PixelPoint::new(200, 200), PixelPoint::new(300, 300))
            .is_none());
    }

    #[test]
    fn render_projects_through_transform() {
        let mut layer = sample_layer();
        let mut transform = LayerTransform::default();
        transform.set_zoom_factor(2.0);
        layer.render(&transform, 64, 64);
        let frame = layer.frame().expect("frame");
        assert_eq!(frame.shapes.len(), 3);
        assert_eq!(frame.shapes[0], Geometry::Point(Point::new(5.0, 5.0)));
    }

    #[test]
    fn local_bounds_cover_all_vertices() {
        let bounds = sample_layer().local_bounds().expect("bounds");
        assert_eq!(bounds.min, Point::new(0.0, -0.0));
        assert_eq!(bounds.max, Point::new(100.0, 80.0));
        assert!(VectorLayer::default().local_bounds().is_none());
    }
}
