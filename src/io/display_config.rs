// SPDX-License-Identifier: MPL-2.0
//! Display configuration: the construction parameters of every row of a
//! stack, saved as one XML document so the stack can be rebuilt later.
//!
//! ```xml
//! <display_configuration>
//!   <image_layer path="ortho.tif" visible="true" alpha="255" ... />
//!   <vector_layer path="roads.kml" line_color="#ff0000" ... />
//! </display_configuration>
//! ```

use super::xml::{attributes, parse_opt, parse_req, style_attributes, style_from_attributes};
use crate::error::{FormatError, Result};
use crate::layer::{ImageLayerParameters, LayerParameters, VectorLayerParameters, VectorStyle};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

const ROOT: &str = "display_configuration";
const EXTENSION: &str = "xml";

fn image_attributes(p: &ImageLayerParameters) -> Vec<(&'static str, String)> {
    vec![
        ("path", p.path.display().to_string()),
        ("visible", p.visible.to_string()),
        ("transformable", p.transformable.to_string()),
        ("alpha", p.alpha.to_string()),
        ("gamma", p.gamma.to_string()),
        ("intensity_min", p.intensity_min.to_string()),
        ("intensity_max", p.intensity_max.to_string()),
        ("is_transparent", p.is_transparent.to_string()),
        ("transparency_min", p.transparency_min.to_string()),
        ("transparency_max", p.transparency_max.to_string()),
        ("zoom_factor", p.zoom_factor.to_string()),
        ("translation_x", p.translation_x.to_string()),
        ("translation_y", p.translation_y.to_string()),
        ("use_alpha_channel", p.use_alpha_channel.to_string()),
        ("alpha_channel_index", p.alpha_channel_index.to_string()),
    ]
}

fn vector_attributes(p: &VectorLayerParameters) -> Vec<(&'static str, String)> {
    let style = VectorStyle {
        point_color: p.point_color,
        point_width: p.point_width,
        line_color: p.line_color,
        line_width: p.line_width,
        line_style: p.line_style,
        polygon_border_color: p.polygon_border_color,
        polygon_border_width: p.polygon_border_width,
        polygon_border_style: p.polygon_border_style,
        polygon_inner_color: p.polygon_inner_color,
        polygon_inner_style: p.polygon_inner_style,
    };
    let mut attrs = vec![
        ("path", p.path.display().to_string()),
        ("visible", p.visible.to_string()),
        ("transformable", p.transformable.to_string()),
    ];
    attrs.extend(style_attributes(&style));
    attrs.extend([
        ("zoom_factor", p.zoom_factor.to_string()),
        ("translation_x", p.translation_x.to_string()),
        ("translation_y", p.translation_y.to_string()),
    ]);
    attrs
}

fn image_from_attributes(attrs: &HashMap<String, String>) -> Result<ImageLayerParameters> {
    let path: String = parse_req(attrs, "path")?;
    let d = ImageLayerParameters::new(path);
    Ok(ImageLayerParameters {
        visible: parse_opt(attrs, "visible")?.unwrap_or(d.visible),
        transformable: parse_opt(attrs, "transformable")?.unwrap_or(d.transformable),
        alpha: parse_opt(attrs, "alpha")?.unwrap_or(d.alpha),
        gamma: parse_opt(attrs, "gamma")?.unwrap_or(d.gamma),
        intensity_min: parse_opt(attrs, "intensity_min")?.unwrap_or(d.intensity_min),
        intensity_max: parse_opt(attrs, "intensity_max")?.unwrap_or(d.intensity_max),
        is_transparent: parse_opt(attrs, "is_transparent")?.unwrap_or(d.is_transparent),
        transparency_min: parse_opt(attrs, "transparency_min")?.unwrap_or(d.transparency_min),
        transparency_max: parse_opt(attrs, "transparency_max")?.unwrap_or(d.transparency_max),
        zoom_factor: parse_opt(attrs, "zoom_factor")?.unwrap_or(d.zoom_factor),
        translation_x: parse_opt(attrs, "translation_x")?.unwrap_or(d.translation_x),
        translation_y: parse_opt(attrs, "translation_y")?.unwrap_or(d.translation_y),
        use_alpha_channel: parse_opt(attrs, "use_alpha_channel")?.unwrap_or(d.use_alpha_channel),
        alpha_channel_index: parse_opt(attrs, "alpha_channel_index")?
            .unwrap_or(d.alpha_channel_index),
        path: d.path,
    })
}

fn vector_from_attributes(attrs: &HashMap<String, String>) -> Result<VectorLayerParameters> {
    let path: String = parse_req(attrs, "path")?;
    let d = VectorLayerParameters::new(path);
    let style = style_from_attributes(attrs)?;
    Ok(VectorLayerParameters {
        visible: parse_opt(attrs, "visible")?.unwrap_or(d.visible),
        transformable: parse_opt(attrs, "transformable")?.unwrap_or(d.transformable),
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
        zoom_factor: parse_opt(attrs, "zoom_factor")?.unwrap_or(d.zoom_factor),
        translation_x: parse_opt(attrs, "translation_x")?.unwrap_or(d.translation_x),
        translation_y: parse_opt(attrs, "translation_y")?.unwrap_or(d.translation_y),
        path: d.path,
    })
}

/// Path the configuration is actually written to: `path` with its
/// extension forced to `.xml`.
#[must_use]
pub fn config_path(path: &Path) -> PathBuf {
    path.with_extension(EXTENSION)
}

/// Serializes `rows` in order. Returns the path written.
pub fn write_display_config(path: &Path, rows: &[LayerParameters]) -> Result<PathBuf> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new(ROOT)))?;

    for row in rows {
        let (tag, attrs) = match row {
            LayerParameters::Image(p) => ("image_layer", image_attributes(p)),
            LayerParameters::Vector(p) => ("vector_layer", vector_attributes(p)),
        };
        let mut element = BytesStart::new(tag);
        for (key, value) in &attrs {
            element.push_attribute((*key, value.as_str()));
        }
        writer.write_event(Event::Empty(element))?;
    }

    writer.write_event(Event::End(BytesEnd::new(ROOT)))?;

    let target = config_path(path);
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(&target, writer.into_inner())?;
    Ok(target)
}

/// Parses a display configuration in document order.
pub fn parse_display_config(xml: &str) -> Result<Vec<LayerParameters>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut seen_root = false;
    let mut rows = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"display_configuration" => seen_root = true,
                b"image_layer" if seen_root => {
                    rows.push(LayerParameters::Image(image_from_attributes(&attributes(&e)?)?));
                }
                b"vector_layer" if seen_root => {
                    rows.push(LayerParameters::Vector(vector_from_attributes(
                        &attributes(&e)?,
                    )?));
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_root {
        return Err(FormatError::Decode(format!("missing <{}> element", ROOT)).into());
    }
    Ok(rows)
}

/// Reads a display configuration file. Only `.xml` files are accepted.
pub fn read_display_config(path: &Path) -> Result<Vec<LayerParameters>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .ok_or(FormatError::MissingExtension)?;
    if !ext.eq_ignore_ascii_case(EXTENSION) {
        return Err(FormatError::UnsupportedExtension(ext.to_lowercase()).into());
    }
    parse_display_config(&fs::read_to_string(path)?)
}
