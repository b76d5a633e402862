// SPDX-License-Identifier: MPL-2.0
//! Serialized vector snapshots in three flavours sharing one document model:
//! TOML text (`.txt`), XML (`.xml`) and CBOR binary (`.bin`).

use super::xml::{attributes, parse_opt, parse_req, style_attributes, style_from_attributes};
use super::{layer_name_from_path, LayerCodec};
use crate::domain::Point;
use crate::error::{Error, FormatError, Result};
use crate::layer::{Feature, Geometry, Layer, LayerKind, VectorLayer, VectorStyle};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufReader, BufWriter};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotKind {
    Point,
    Line,
    Polygon,
}

impl SnapshotKind {
    fn as_str(self) -> &'static str {
        match self {
            SnapshotKind::Point => "point",
            SnapshotKind::Line => "line",
            SnapshotKind::Polygon => "polygon",
        }
    }

    fn parse(raw: &str) -> Result<Self> {
        match raw {
            "point" => Ok(SnapshotKind::Point),
            "line" => Ok(SnapshotKind::Line),
            "polygon" => Ok(SnapshotKind::Polygon),
            other => Err(FormatError::Decode(format!("unknown feature kind: {}", other)).into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotFeature {
    pub kind: SnapshotKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub coordinates: Vec<[f64; 2]>,
}

impl SnapshotFeature {
    fn from_feature(feature: &Feature) -> Self {
        let kind = match feature.geometry {
            Geometry::Point(_) => SnapshotKind::Point,
            Geometry::LineString(_) => SnapshotKind::Line,
            Geometry::Polygon(_) => SnapshotKind::Polygon,
        };
        Self {
            kind,
            name: feature.name.clone(),
            coordinates: feature
                .geometry
                .vertices()
                .iter()
                .map(|p| [p.x, p.y])
                .collect(),
        }
    }

    fn into_feature(self) -> Result<Feature> {
        let points: Vec<Point> = self
            .coordinates
            .iter()
            .map(|[x, y]| Point::new(*x, *y))
            .collect();
        let geometry = match self.kind {
            SnapshotKind::Point => match points.as_slice() {
                [p] => Geometry::Point(*p),
                _ => {
                    return Err(FormatError::Decode(format!(
                        "point feature needs exactly one coordinate, got {}",
                        points.len()
                    ))
                    .into())
                }
            },
            SnapshotKind::Line => Geometry::LineString(points),
            SnapshotKind::Polygon => Geometry::Polygon(points),
        };
        Ok(Feature {
            name: self.name,
            geometry,
        })
    }
}

/// On-disk form of a vector layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotDocument {
    pub name: String,
    #[serde(default)]
    pub style: VectorStyle,
    #[serde(default)]
    pub features: Vec<SnapshotFeature>,
}

impl SnapshotDocument {
    #[must_use]
    pub fn from_layer(name: &str, layer: &VectorLayer) -> Self {
        Self {
            name: name.to_string(),
            style: layer.style().clone(),
            features: layer
                .features()
                .iter()
                .map(SnapshotFeature::from_feature)
                .collect(),
        }
    }

    pub fn into_layer(self) -> Result<Layer> {
        let features = self
            .features
            .into_iter()
            .map(SnapshotFeature::into_feature)
            .collect::<Result<Vec<_>>>()?;
        Ok(Layer::vector(
            self.name,
            VectorLayer::new(features).with_style(self.style),
        ))
    }
}

// =============================================================================
// XML
// =============================================================================

const XML_ROOT: &str = "vector_layer";

fn write_xml(doc: &SnapshotDocument) -> Result<Vec<u8>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new(XML_ROOT);
    root.push_attribute(("name", doc.name.as_str()));
    writer.write_event(Event::Start(root))?;

    let mut style = BytesStart::new("style");
    for (key, value) in style_attributes(&doc.style) {
        style.push_attribute((key, value.as_str()));
    }
    writer.write_event(Event::Empty(style))?;

    for feature in &doc.features {
        let mut start = BytesStart::new("feature");
        start.push_attribute(("kind", feature.kind.as_str()));
        if let Some(name) = &feature.name {
            start.push_attribute(("name", name.as_str()));
        }
        writer.write_event(Event::Start(start))?;
        for [x, y] in &feature.coordinates {
            let mut coord = BytesStart::new("coord");
            coord.push_attribute(("x", x.to_string().as_str()));
            coord.push_attribute(("y", y.to_string().as_str()));
            writer.write_event(Event::Empty(coord))?;
        }
        writer.write_event(Event::End(BytesEnd::new("feature")))?;
    }

    writer.write_event(Event::End(BytesEnd::new(XML_ROOT)))?;
    Ok(writer.into_inner())
}

fn read_xml(xml: &str) -> Result<SnapshotDocument> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut doc: Option<SnapshotDocument> = None;
    let mut current: Option<SnapshotFeature> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => {
                let attrs = attributes(&e)?;
                match e.local_name().as_ref() {
                    b"vector_layer" => {
                        doc = Some(SnapshotDocument {
                            name: parse_opt(&attrs, "name")?.unwrap_or_default(),
                            style: VectorStyle::default(),
                            features: Vec::new(),
                        });
                    }
                    b"style" => {
                        if let Some(doc) = doc.as_mut() {
                            doc.style = style_from_attributes(&attrs)?;
                        }
                    }
                    b"feature" => {
                        let kind: String = parse_req(&attrs, "kind")?;
                        current = Some(SnapshotFeature {
                            kind: SnapshotKind::parse(&kind)?,
                            name: parse_opt(&attrs, "name")?,
                            coordinates: Vec::new(),
                        });
                    }
                    b"coord" => {
                        if let Some(feature) = current.as_mut() {
                            feature
                                .coordinates
                                .push([parse_req(&attrs, "x")?, parse_req(&attrs, "y")?]);
                        }
                    }
                    _ => {}
                }
            }
            Event::End(e) if e.local_name().as_ref() == b"feature" => {
                if let (Some(doc), Some(feature)) = (doc.as_mut(), current.take()) {
                    doc.features.push(feature);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    doc.ok_or_else(|| FormatError::Decode(format!("missing <{}> element", XML_ROOT)).into())
}

// =============================================================================
// Codec
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotCodec {
    Text,
    Xml,
    Binary,
}

impl SnapshotCodec {
    pub fn read(&self, path: &Path) -> Result<SnapshotDocument> {
        match self {
            SnapshotCodec::Text => {
                let content = fs::read_to_string(path)?;
                toml::from_str(&content)
                    .map_err(|e| Error::Format(FormatError::Decode(e.to_string())))
            }
            SnapshotCodec::Xml => read_xml(&fs::read_to_string(path)?),
            SnapshotCodec::Binary => {
                let reader = BufReader::new(fs::File::open(path)?);
                Ok(ciborium::from_reader(reader)?)
            }
        }
    }

    pub fn write(&self, doc: &SnapshotDocument, path: &Path) -> Result<()> {
        match self {
            SnapshotCodec::Text => {
                let content = toml::to_string_pretty(doc)
                    .map_err(|e| Error::Format(FormatError::Encode(e.to_string())))?;
                fs::write(path, content)?;
            }
            SnapshotCodec::Xml => fs::write(path, write_xml(doc)?)?,
            SnapshotCodec::Binary => {
                let writer = BufWriter::new(fs::File::create(path)?);
                ciborium::into_writer(doc, writer)?;
            }
        }
        Ok(())
    }
}

impl LayerCodec for SnapshotCodec {
    fn name(&self) -> &'static str {
        match self {
            SnapshotCodec::Text => "text snapshot",
            SnapshotCodec::Xml => "xml snapshot",
            SnapshotCodec::Binary => "binary snapshot",
        }
    }

    fn load(&self, path: &Path) -> Result<Layer> {
        let mut doc = self.read(path)?;
        if doc.name.is_empty() {
            doc.name = layer_name_from_path(path);
        }
        doc.into_layer()
    }

    fn save(&self, layer: &Layer, path: &Path) -> Result<()> {
        let LayerKind::Vector(vec) = layer.kind() else {
            return Err(FormatError::Unsupported {
                layer_kind: layer.kind().name(),
                operation: "save",
            }
            .into());
        };
        self.write(&SnapshotDocument::from_layer(layer.name(), vec), path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::{Color, ImageLayer, LineStyle};
    use image_rs::{DynamicImage, GrayImage};
    use tempfile::tempdir;

    fn sample_layer() -> Layer {
        let mut style = VectorStyle::default();
        style.line_color = Color::new(10, 20, 30);
        style.line_style = LineStyle::LongDash;
        Layer::vector(
            "parcels",
            VectorLayer::new(vec![
                Feature::named("corner <A>", Geometry::Point(Point::new(1.5, -2.0))),
                Feature::new(Geometry::LineString(vec![
                    Point::new(0.0, 0.0),
                    Point::new(3.0, 4.0),
                ])),
                Feature::named(
                    "lot",
                    Geometry::Polygon(vec![
                        Point::new(0.0, 0.0),
                        Point::new(1.0, 0.0),
                        Point::new(1.0, 1.0),
                    ]),
                ),
            ])
            .with_style(style),
        )
    }

    #[test]
    fn every_flavour_preserves_features_and_style() {
        let dir = tempdir().expect("temp dir");
        let layer = sample_layer();
        let source = layer.as_vector().expect("vector");
        for (codec, file) in [
            (SnapshotCodec::Text, "a.txt"),
            (SnapshotCodec::Xml, "a.xml"),
            (SnapshotCodec::Binary, "a.bin"),
        ] {
            let path = dir.path().join(file);
            codec.save(&layer, &path).expect("save");
            let loaded = codec.load(&path).expect("load");
            assert_eq!(loaded.name(), "parcels", "{}", codec.name());
            let vec = loaded.as_vector().expect("vector");
            assert_eq!(vec.features(), source.features(), "{}", codec.name());
            assert_eq!(vec.style(), source.style(), "{}", codec.name());
        }
    }

    #[test]
    fn text_snapshot_is_readable_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("a.txt");
        SnapshotCodec::Text.save(&sample_layer(), &path).expect("save");
        let content = fs::read_to_string(&path).expect("read");
        assert!(content.contains("name = \"parcels\""));
        assert!(content.contains("[[features]]"));
    }

    #[test]
    fn point_with_two_coordinates_is_rejected() {
        let doc = SnapshotDocument {
            name: "bad".into(),
            style: VectorStyle::default(),
            features: vec![SnapshotFeature {
                kind: SnapshotKind::Point,
                name: None,
                coordinates: vec![[0.0, 0.0], [1.0, 1.0]],
            }],
        };
        assert!(matches!(
            doc.into_layer(),
            Err(Error::Format(FormatError::Decode(_)))
        ));
    }

    #[test]
    fn xml_without_root_is_rejected() {
        assert!(read_xml("<other/>").is_err());
        assert!(read_xml("<vector_layer><feature kind=\"blob\"/></vector_layer>").is_err());
    }

    #[test]
    fn unnamed_document_takes_file_name() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("unnamed.txt");
        fs::write(&path, "name = \"\"\n").expect("write");
        let layer = SnapshotCodec::Text.load(&path).expect("load");
        assert_eq!(layer.name(), "unnamed.txt");
    }

    #[test]
    fn image_layers_cannot_be_snapshotted() {
        let dir = tempdir().expect("temp dir");
        let layer = Layer::image(
            "img",
            ImageLayer::new(DynamicImage::ImageLuma8(GrayImage::new(1, 1))),
        );
        assert!(SnapshotCodec::Binary
            .save(&layer, &dir.path().join("x.bin"))
            .is_err());
    }
}
