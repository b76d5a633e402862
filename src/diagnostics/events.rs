// SPDX-License-Identifier: MPL-2.0
//! Events reported by the layer stack.

use crate::domain::Orientation;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StackEvent {
    // ==========================================================================
    // Orientation
    // ==========================================================================
    /// The first layer's orientation became the stack orientation.
    OrientationAdopted {
        layer: String,
        orientation: Orientation,
    },

    /// An oriented layer joined an unoriented, non-empty stack.
    OrientationIgnored { layer: String },

    /// An unoriented layer copied the ghost baseline transform.
    AlignedWithGhost { layer: String },

    /// An oriented layer was placed relative to the stack orientation.
    AlignedWithOrientation { layer: String, zoom_factor: f64 },

    /// A vector layer was placed relative to the stack orientation.
    VectorAlignedWithOrientation { layer: String },

    OrientationCleared,

    // ==========================================================================
    // Rows
    // ==========================================================================
    LayerAdded { index: usize, layer: String },

    LayerRemoved { index: usize, layer: String },

    InvalidIndex { index: usize, len: usize },

    // ==========================================================================
    // Failures
    // ==========================================================================
    LoadFailed { path: PathBuf, message: String },

    SaveFailed { path: PathBuf, message: String },

    /// The crop region held no data for the layer.
    CropEmpty { layer: String },

    RenderFailed { layer: String, message: String },

    DisplayConfigFailed { path: PathBuf, message: String },
}

impl StackEvent {
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            StackEvent::OrientationAdopted { .. }
            | StackEvent::AlignedWithGhost { .. }
            | StackEvent::AlignedWithOrientation { .. }
            | StackEvent::VectorAlignedWithOrientation { .. }
            | StackEvent::OrientationCleared
            | StackEvent::LayerAdded { .. }
            | StackEvent::LayerRemoved { .. } => Severity::Info,
            StackEvent::OrientationIgnored { .. } | StackEvent::CropEmpty { .. } => {
                Severity::Warning
            }
            StackEvent::InvalidIndex { .. }
            | StackEvent::LoadFailed { .. }
            | StackEvent::SaveFailed { .. }
            | StackEvent::RenderFailed { .. }
            | StackEvent::DisplayConfigFailed { .. } => Severity::Error,
        }
    }
}

impl fmt::Display for StackEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackEvent::OrientationAdopted { layer, orientation } => write!(
                f,
                "Viewer orientation set from {} (origin {}, {}; step {})",
                layer,
                orientation.origin_x(),
                orientation.origin_y(),
                orientation.step()
            ),
            StackEvent::OrientationIgnored { layer } => write!(
                f,
                "Orientation of {} ignored: the stack was not empty and has no orientation",
                layer
            ),
            StackEvent::AlignedWithGhost { layer } => {
                write!(f, "{} aligned with the current view", layer)
            }
            StackEvent::AlignedWithOrientation { layer, zoom_factor } => write!(
                f,
                "{} aligned with the viewer orientation (zoom {})",
                layer, zoom_factor
            ),
            StackEvent::VectorAlignedWithOrientation { layer } => {
                write!(f, "{} aligned with the viewer orientation", layer)
            }
            StackEvent::OrientationCleared => write!(f, "Viewer orientation cleared"),
            StackEvent::LayerAdded { index, layer } => {
                write!(f, "Layer {} added at row {}", layer, index)
            }
            StackEvent::LayerRemoved { index, layer } => {
                write!(f, "Layer {} removed from row {}", layer, index)
            }
            StackEvent::InvalidIndex { index, len } => {
                write!(f, "Invalid row index {} (stack has {} rows)", index, len)
            }
            StackEvent::LoadFailed { path, message } => {
                write!(f, "Cannot load {}: {}", path.display(), message)
            }
            StackEvent::SaveFailed { path, message } => {
                write!(f, "Cannot save {}: {}", path.display(), message)
            }
            StackEvent::CropEmpty { layer } => {
                write!(f, "Nothing to crop in {} at this location", layer)
            }
            StackEvent::RenderFailed { layer, message } => {
                write!(f, "Cannot draw {}: {}", layer, message)
            }
            StackEvent::DisplayConfigFailed { path, message } => write!(
                f,
                "Display configuration {}: {}",
                path.display(),
                message
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severities() {
        assert_eq!(
            StackEvent::OrientationIgnored { layer: "b".into() }.severity(),
            Severity::Warning
        );
        assert_eq!(
            StackEvent::InvalidIndex { index: 4, len: 2 }.severity(),
            Severity::Error
        );
        assert_eq!(StackEvent::OrientationCleared.severity(), Severity::Info);
        assert!(Severity::Warning > Severity::Info);
    }

    #[test]
    fn display_names_the_file() {
        let event = StackEvent::LoadFailed {
            path: PathBuf::from("/tmp/corrupt.tif"),
            message: "bad header".into(),
        };
        let text = event.to_string();
        assert!(text.contains("corrupt.tif"));
        assert!(text.contains("bad header"));
    }
}
