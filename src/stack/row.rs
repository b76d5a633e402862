// SPDX-License-Identifier: MPL-2.0
//! One stack row: a layer plus the metadata its list entry displays.

use crate::config::MAX_LAYER_LABEL_CHARS;
use crate::layer::Layer;

/// Link between a row and its settings panel. `index` always equals the
/// row's current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingsBinding {
    pub index: usize,
    pub open: bool,
}

#[derive(Debug, Clone)]
pub struct Row {
    pub(super) layer: Layer,
    pub(super) label: String,
    pub(super) tooltip: String,
    pub(super) selected: bool,
    pub(super) saveable: bool,
    pub(super) settings: SettingsBinding,
}

impl Row {
    pub(super) fn new(layer: Layer, index: usize) -> Self {
        let label = truncate_label(layer.name());
        let tooltip = layer
            .filename()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        let saveable = layer.is_saveable();
        Self {
            layer,
            label,
            tooltip,
            selected: true,
            saveable,
            settings: SettingsBinding {
                index,
                open: false,
            },
        }
    }

    #[must_use]
    pub fn layer(&self) -> &Layer {
        &self.layer
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Source file of the layer, empty for layers created in memory.
    #[must_use]
    pub fn tooltip(&self) -> &str {
        &self.tooltip
    }

    #[must_use]
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    #[must_use]
    pub fn is_saveable(&self) -> bool {
        self.saveable
    }

    #[must_use]
    pub fn settings(&self) -> SettingsBinding {
        self.settings
    }
}

/// Keeps at most [`MAX_LAYER_LABEL_CHARS`] characters.
pub(crate) fn truncate_label(name: &str) -> String {
    name.chars().take(MAX_LAYER_LABEL_CHARS).collect()
}
