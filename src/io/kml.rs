// SPDX-License-Identifier: MPL-2.0
//! Read-only KML codec.
//!
//! Every `Point`, `LineString` and `Polygon` (outer ring only) of every
//! `Placemark` becomes one feature named after the placemark.

use super::{layer_name_from_path, LayerCodec};
use crate::domain::Point;
use crate::error::{FormatError, Result};
use crate::layer::{Feature, Geometry, Layer, VectorLayer};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GeometryTag {
    Point,
    LineString,
    Polygon,
}

/// Parses `x,y[,z]` tuples separated by whitespace.
fn parse_coordinates(text: &str) -> Result<Vec<Point>> {
    text.split_whitespace()
        .map(|tuple| {
            let mut parts = tuple.split(',');
            let mut next = || -> Result<f64> {
                parts
                    .next()
                    .and_then(|v| v.trim().parse::<f64>().ok())
                    .ok_or_else(|| FormatError::Decode(format!("bad coordinate: {}", tuple)).into())
            };
            Ok(Point::new(next()?, next()?))
        })
        .collect()
}

fn build_geometry(tag: GeometryTag, mut points: Vec<Point>) -> Result<Geometry> {
    match tag {
        GeometryTag::Point => points
            .first()
            .copied()
            .map(Geometry::Point)
            .ok_or_else(|| FormatError::Decode("empty point".to_string()).into()),
        GeometryTag::LineString => Ok(Geometry::LineString(points)),
        GeometryTag::Polygon => {
            if points.len() > 1 && points.first() == points.last() {
                points.pop();
            }
            Ok(Geometry::Polygon(points))
        }
    }
}

/// Extracts the features of a KML document.
pub fn parse_kml(xml: &str) -> Result<Vec<Feature>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut features = Vec::new();
    let mut placemark_name: Option<String> = None;
    let mut in_placemark = false;
    let mut in_name = false;
    let mut in_coordinates = false;
    let mut in_inner_boundary = false;
    let mut geometry: Option<GeometryTag> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"Placemark" => {
                    in_placemark = true;
                    placemark_name = None;
                }
                b"name" if in_placemark => in_name = true,
                b"Point" => geometry = Some(GeometryTag::Point),
                b"LineString" => geometry = Some(GeometryTag::LineString),
                b"Polygon" => geometry = Some(GeometryTag::Polygon),
                b"innerBoundaryIs" => in_inner_boundary = true,
                b"coordinates" => in_coordinates = true,
                _ => {}
            },
            Event::Text(e) => {
                let text = e.unescape()?;
                if in_name {
                    placemark_name = Some(text.trim().to_string());
                } else if in_coordinates && !in_inner_boundary && in_placemark {
                    if let Some(tag) = geometry {
                        let geometry = build_geometry(tag, parse_coordinates(&text)?)?;
                        features.push(Feature {
                            name: placemark_name.clone(),
                            geometry,
                        });
                    }
                }
            }
            Event::CData(e) if in_name => {
                placemark_name = Some(String::from_utf8_lossy(&e).trim().to_string());
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"Placemark" => {
                    in_placemark = false;
                    placemark_name = None;
                }
                b"name" => in_name = false,
                b"Point" | b"LineString" | b"Polygon" => geometry = None,
                b"innerBoundaryIs" => in_inner_boundary = false,
                b"coordinates" => in_coordinates = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(features)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct KmlCodec;

impl LayerCodec for KmlCodec {
    fn name(&self) -> &'static str {
        "kml"
    }

    fn load(&self, path: &Path) -> Result<Layer> {
        let xml = std::fs::read_to_string(path)?;
        let features = parse_kml(&xml)?;
        Ok(Layer::vector(
            layer_name_from_path(path),
            VectorLayer::new(features),
        ))
    }

    fn save(&self, layer: &Layer, _path: &Path) -> Result<()> {
        Err(FormatError::Unsupported {
            layer_kind: layer.kind().name(),
            operation: "save",
        }
        .into())
    }
}
