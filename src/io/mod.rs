// SPDX-License-Identifier: MPL-2.0
//! File codecs and the extension-keyed registry that selects them.
//!
//! Codecs are looked up by the lowercase first three characters of the
//! file extension, so `.tiff` and `.TIF` share the `tif` codec and
//! `.jpeg` maps to `jpe`.

pub mod display_config;
pub mod kml;
pub mod raster;
pub mod snapshot;
mod xml;

use crate::error::{FormatError, Result};
use crate::layer::Layer;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Supported layer file extensions
pub mod extensions {
    /// Raster formats decoded through the `image` crate
    pub const RASTER_EXTENSIONS: &[&str] = &["tif", "tiff", "jpg", "jpeg", "png", "bmp"];

    /// Vector formats
    pub const VECTOR_EXTENSIONS: &[&str] = &["shp", "kml"];

    /// Serialized vector snapshots
    pub const SERIALIZED_EXTENSIONS: &[&str] = &["txt", "xml", "bin"];

    /// Every extension a file chooser should offer.
    #[must_use]
    pub fn all_supported_extensions() -> Vec<&'static str> {
        RASTER_EXTENSIONS
            .iter()
            .chain(VECTOR_EXTENSIONS)
            .chain(SERIALIZED_EXTENSIONS)
            .copied()
            .collect()
    }

    /// Case-insensitive membership test.
    #[must_use]
    pub fn is_supported(ext: &str) -> bool {
        let ext = ext.to_lowercase();
        all_supported_extensions().contains(&ext.as_str())
    }
}

/// Reads and writes one family of layer files.
pub trait LayerCodec: Send + Sync {
    /// Short human readable codec name.
    fn name(&self) -> &'static str;

    fn load(&self, path: &Path) -> Result<Layer>;

    fn save(&self, layer: &Layer, path: &Path) -> Result<()>;
}

/// Registry key for a path: lowercase extension truncated to three characters.
pub fn extension_key(path: &Path) -> Result<String> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .ok_or(FormatError::MissingExtension)?;
    Ok(ext.to_lowercase().chars().take(3).collect())
}

#[derive(Clone, Default)]
pub struct CodecRegistry {
    codecs: HashMap<String, Arc<dyn LayerCodec>>,
}

impl std::fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys = self.keys();
        keys.sort_unstable();
        f.debug_struct("CodecRegistry").field("keys", &keys).finish()
    }
}

impl CodecRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in raster, KML and snapshot codecs.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        let raster: Arc<dyn LayerCodec> = Arc::new(raster::RasterCodec);
        for key in ["tif", "jpg", "jpe", "png", "bmp"] {
            registry.register(key, Arc::clone(&raster));
        }
        registry.register("kml", Arc::new(kml::KmlCodec));
        registry.register("txt", Arc::new(snapshot::SnapshotCodec::Text));
        registry.register("xml", Arc::new(snapshot::SnapshotCodec::Xml));
        registry.register("bin", Arc::new(snapshot::SnapshotCodec::Binary));
        registry
    }

    /// Registers `codec` under `key`, replacing any previous codec.
    pub fn register(&mut self, key: &str, codec: Arc<dyn LayerCodec>) {
        self.codecs.insert(key.to_lowercase(), codec);
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<Arc<dyn LayerCodec>> {
        self.codecs.get(key).cloned()
    }

    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        self.codecs.keys().map(String::as_str).collect()
    }

    pub fn codec_for(&self, path: &Path) -> Result<Arc<dyn LayerCodec>> {
        let key = extension_key(path)?;
        self.get(&key)
            .ok_or_else(|| FormatError::UnsupportedExtension(key).into())
    }

    /// Loads a layer and records the path it came from.
    pub fn load(&self, path: &Path) -> Result<Layer> {
        let mut layer = self.codec_for(path)?.load(path)?;
        layer.set_filename(path);
        Ok(layer)
    }

    pub fn save(&self, layer: &Layer, path: &Path) -> Result<()> {
        self.codec_for(path)?.save(layer, path)
    }
}

/// File name used as the default layer name.
pub(crate) fn layer_name_from_path(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::path::PathBuf;

    #[test]
    fn extension_key_truncates_and_lowercases() {
        assert_eq!(extension_key(Path::new("a/b.TIFF")).unwrap(), "tif");
        assert_eq!(extension_key(Path::new("photo.jpeg")).unwrap(), "jpe");
        assert_eq!(extension_key(Path::new("roads.kml")).unwrap(), "kml");
        assert!(matches!(
            extension_key(Path::new("README")),
            Err(Error::Format(FormatError::MissingExtension))
        ));
    }

    #[test]
    fn defaults_cover_supported_extensions_except_shapefiles() {
        let registry = CodecRegistry::with_defaults();
        for ext in extensions::all_supported_extensions() {
            let path = PathBuf::from(format!("file.{}", ext));
            let found = registry.codec_for(&path);
            if ext == "shp" {
                assert!(matches!(
                    found,
                    Err(Error::Format(FormatError::UnsupportedExtension(ref k))) if k == "shp"
                ));
            } else {
                assert!(found.is_ok(), "no codec for {}", ext);
            }
        }
    }

    #[test]
    fn register_overrides_existing_codec() {
        let mut registry = CodecRegistry::with_defaults();
        registry.register("TXT", Arc::new(snapshot::SnapshotCodec::Binary));
        let codec = registry.get("txt").expect("codec");
        assert_eq!(codec.name(), "binary snapshot");
    }

    #[test]
    fn is_supported_ignores_case() {
        assert!(extensions::is_supported("JPG"));
        assert!(extensions::is_supported("shp"));
        assert!(!extensions::is_supported("gif"));
    }

    #[test]
    fn layer_name_is_file_name() {
        assert_eq!(layer_name_from_path(Path::new("/x/y/ortho.tif")), "ortho.tif");
    }
}
