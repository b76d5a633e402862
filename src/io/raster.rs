// SPDX-License-Identifier: MPL-2.0
//! Raster codec backed by the `image` crate.
//!
//! Geo-referencing is read from an optional sidecar next to the image,
//! `<name>.ori`, holding a TOML table:
//!
//! ```toml
//! origin_x = 652000.0
//! origin_y = 6862000.0
//! step = 0.5
//! ```

use super::{layer_name_from_path, LayerCodec};
use crate::domain::Orientation;
use crate::error::{Error, FormatError, Result};
use crate::layer::{ImageLayer, Layer, LayerKind};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const SIDECAR_EXTENSION: &str = "ori";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct OrientationSidecar {
    origin_x: f64,
    origin_y: f64,
    step: f64,
}

/// Path of the orientation sidecar for an image path.
#[must_use]
pub fn sidecar_path(image_path: &Path) -> PathBuf {
    image_path.with_extension(SIDECAR_EXTENSION)
}

/// Reads the sidecar if present. A malformed sidecar is a decode error.
pub fn read_orientation(image_path: &Path) -> Result<Option<Orientation>> {
    let path = sidecar_path(image_path);
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&path)?;
    let sidecar: OrientationSidecar = toml::from_str(&content)
        .map_err(|e| FormatError::Decode(format!("{}: {}", path.display(), e)))?;
    Orientation::new(sidecar.origin_x, sidecar.origin_y, sidecar.step)
        .map(Some)
        .ok_or_else(|| {
            FormatError::Decode(format!("{}: step must be non-zero", path.display())).into()
        })
}

pub fn write_orientation(image_path: &Path, orientation: &Orientation) -> Result<()> {
    let sidecar = OrientationSidecar {
        origin_x: orientation.origin_x(),
        origin_y: orientation.origin_y(),
        step: orientation.step(),
    };
    let content = toml::to_string_pretty(&sidecar).map_err(Error::from)?;
    fs::write(sidecar_path(image_path), content)?;
    Ok(())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RasterCodec;

impl LayerCodec for RasterCodec {
    fn name(&self) -> &'static str {
        "raster"
    }

    fn load(&self, path: &Path) -> Result<Layer> {
        let pixels = image_rs::open(path)?;
        let orientation = read_orientation(path)?;
        let mut layer = Layer::image(layer_name_from_path(path), ImageLayer::new(pixels));
        if let Some(orientation) = orientation {
            layer = layer.with_orientation(orientation);
        }
        Ok(layer)
    }

    fn save(&self, layer: &Layer, path: &Path) -> Result<()> {
        let LayerKind::Image(img) = layer.kind() else {
            return Err(FormatError::Unsupported {
                layer_kind: layer.kind().name(),
                operation: "save",
            }
            .into());
        };
        img.pixels()
            .save(path)
            .map_err(|e| Error::Format(FormatError::Encode(e.to_string())))?;
        if let Some(orientation) = layer.orientation() {
            write_orientation(path, orientation)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::VectorLayer;
    use image_rs::{DynamicImage, GrayImage, Luma};
    use tempfile::tempdir;

    fn write_png(path: &Path) {
        let buffer = GrayImage::from_fn(3, 2, |x, y| Luma([(x * 10 + y) as u8]));
        buffer.save(path).expect("write png");
    }

    #[test]
    fn load_png_without_sidecar() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("plain.png");
        write_png(&path);

        let layer = RasterCodec.load(&path).expect("load");
        assert_eq!(layer.name(), "plain.png");
        assert!(!layer.has_orientation());
        let img = layer.as_image().expect("image");
        assert_eq!((img.width(), img.height()), (3, 2));
        assert_eq!(
            layer.pixel_value(crate::domain::Point::new(2.0, 1.0), 0.0),
            Some("21".to_string())
        );
    }

    #[test]
    fn load_reads_orientation_sidecar() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("ortho.png");
        write_png(&path);
        fs::write(
            sidecar_path(&path),
            "origin_x = 10.0\norigin_y = 20.0\nstep = 0.5\n",
        )
        .expect("sidecar");

        let layer = RasterCodec.load(&path).expect("load");
        assert_eq!(layer.orientation(), Orientation::new(10.0, 20.0, 0.5).as_ref());
    }

    #[test]
    fn zero_step_sidecar_is_rejected() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("bad.png");
        write_png(&path);
        fs::write(sidecar_path(&path), "origin_x = 0.0\norigin_y = 0.0\nstep = 0.0\n")
            .expect("sidecar");
        assert!(matches!(
            RasterCodec.load(&path),
            Err(Error::Format(FormatError::Decode(_)))
        ));
    }

    #[test]
    fn corrupt_file_is_a_format_error() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("corrupt.tif");
        fs::write(&path, b"definitely not a tiff").expect("write");
        assert!(matches!(RasterCodec.load(&path), Err(Error::Format(_))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempdir().expect("temp dir");
        assert!(matches!(
            RasterCodec.load(&dir.path().join("absent.png")),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn save_writes_image_and_sidecar() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("out.png");
        let layer = Layer::image(
            "out",
            ImageLayer::new(DynamicImage::ImageLuma8(GrayImage::new(4, 4))),
        )
        .with_orientation(Orientation::new(1.0, 2.0, 3.0).unwrap());

        RasterCodec.save(&layer, &path).expect("save");
        let reloaded = RasterCodec.load(&path).expect("reload");
        assert_eq!(reloaded.orientation(), layer.orientation());
        assert_eq!(reloaded.as_image().map(ImageLayer::width), Some(4));
    }

    #[test]
    fn save_rejects_vector_layer() {
        let dir = tempdir().expect("temp dir");
        let layer = Layer::vector("v", VectorLayer::default());
        assert!(matches!(
            RasterCodec.save(&layer, &dir.path().join("v.png")),
            Err(Error::Format(FormatError::Unsupported { .. }))
        ));
    }
}
