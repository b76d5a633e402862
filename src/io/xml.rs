// SPDX-License-Identifier: MPL-2.0
//! Attribute helpers shared by the XML snapshot and display configuration.

use crate::error::{FormatError, Result};
use crate::layer::VectorStyle;
use quick_xml::events::BytesStart;
use std::collections::HashMap;
use std::str::FromStr;

/// Collects the unescaped attributes of an element.
pub(crate) fn attributes(e: &BytesStart<'_>) -> Result<HashMap<String, String>> {
    let mut map = HashMap::new();
    for attr in e.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        map.insert(key, value);
    }
    Ok(map)
}

/// Parses an optional attribute.
pub(crate) fn parse_opt<T: FromStr>(attrs: &HashMap<String, String>, key: &str) -> Result<Option<T>> {
    match attrs.get(key) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| FormatError::Decode(format!("invalid {} attribute: {}", key, raw)).into()),
    }
}

/// Parses a mandatory attribute.
pub(crate) fn parse_req<T: FromStr>(attrs: &HashMap<String, String>, key: &str) -> Result<T> {
    parse_opt(attrs, key)?
        .ok_or_else(|| FormatError::Decode(format!("missing {} attribute", key)).into())
}

/// Style fields as `(attribute, value)` pairs in declaration order.
pub(crate) fn style_attributes(style: &VectorStyle) -> Vec<(&'static str, String)> {
    vec![
        ("point_color", style.point_color.to_hex()),
        ("point_width", style.point_width.to_string()),
        ("line_color", style.line_color.to_hex()),
        ("line_width", style.line_width.to_string()),
        ("line_style", style.line_style.as_str().to_string()),
        ("polygon_border_color", style.polygon_border_color.to_hex()),
        ("polygon_border_width", style.polygon_border_width.to_string()),
        ("polygon_border_style", style.polygon_border_style.as_str().to_string()),
        ("polygon_inner_color", style.polygon_inner_color.to_hex()),
        ("polygon_inner_style", style.polygon_inner_style.as_str().to_string()),
    ]
}

/// Reads style attributes over defaults; missing attributes keep the default.
pub(crate) fn style_from_attributes(attrs: &HashMap<String, String>) -> Result<VectorStyle> {
    let d = VectorStyle::default();
    Ok(VectorStyle {
        point_color: parse_opt(attrs, "point_color")?.unwrap_or(d.point_color),
        point_width: parse_opt(attrs, "point_width")?.unwrap_or(d.point_width),
        line_color: parse_opt(attrs, "line_color")?.unwrap_or(d.line_color),
        line_width: parse_opt(attrs, "line_width")?.unwrap_or(d.line_width),
        line_style: parse_opt(attrs, "line_style")?.unwrap_or(d.line_style),
        polygon_border_color: parse_opt(attrs, "polygon_border_color")?
            .unwrap_or(d.polygon_border_color),
        polygon_border_width: parse_opt(attrs, "polygon_border_width")?
            .unwrap_or(d.polygon_border_width),
        polygon_border_style: parse_opt(attrs, "polygon_border_style")?
            .unwrap_or(d.polygon_border_style),
        polygon_inner_color: parse_opt(attrs, "polygon_inner_color")?
            .unwrap_or(d.polygon_inner_color),
        polygon_inner_style: parse_opt(attrs, "polygon_inner_style")?
            .unwrap_or(d.polygon_inner_style),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::{Color, LineStyle};

    #[test]
    fn style_attributes_round_trip() {
        let mut style = VectorStyle::default();
        style.line_color = Color::new(9, 8, 7);
        style.polygon_border_style = LineStyle::ShortDash;
        let attrs: HashMap<String, String> = style_attributes(&style)
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        assert_eq!(style_from_attributes(&attrs).unwrap(), style);
    }

    #[test]
    fn parse_helpers_report_bad_values() {
        let mut attrs = HashMap::new();
        attrs.insert("width".to_string(), "wide".to_string());
        assert!(parse_opt::<u32>(&attrs, "width").is_err());
        assert_eq!(parse_opt::<u32>(&attrs, "height").unwrap(), None);
        assert!(parse_req::<u32>(&attrs, "height").is_err());
    }
}
