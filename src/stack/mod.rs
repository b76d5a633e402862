// SPDX-License-Identifier: MPL-2.0
//! The layer stack: ordered rows, the ghost overlay and the stack-wide
//! orientation.
//!
//! Rows are identified by position. Settings bindings record that position
//! and every reordering rewrites it, so removal shifts rows down through
//! adjacent swaps before dropping the last slot.
//!
//! # Example
//!
//! ```
//! use layer_lens::domain::Orientation;
//! use layer_lens::layer::{Layer, VectorLayer};
//! use layer_lens::stack::LayerStack;
//!
//! let mut stack = LayerStack::default();
//! let oriented = Layer::vector("a", VectorLayer::default())
//!     .with_orientation(Orientation::new(0.0, 0.0, 2.0).unwrap());
//! stack.add_layer(oriented);
//! assert!(stack.global_orientation().is_some());
//! ```

mod navigation;
mod observer;
mod row;

pub use navigation::{LayerStatus, StatusReport};
pub use observer::{RowChange, StackObserver};
pub use row::{Row, SettingsBinding};

use crate::config::Config;
use crate::diagnostics::{CircularBuffer, StackEvent};
use crate::domain::{Orientation, Point, Rect};
use crate::error::{Error, Result};
use crate::io::{display_config, CodecRegistry};
use crate::layer::{GhostLayer, Layer, LayerParameters};
use std::fmt;
use std::path::{Path, PathBuf};

/// Value of one visible layer under a queried point.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelReadout {
    pub layer: String,
    pub value: String,
}

/// Outcome of a continue-on-error batch.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Rows added, in input order.
    pub added: Vec<usize>,
    /// One entry per failing file.
    pub errors: Vec<(PathBuf, Error)>,
}

impl BatchReport {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

pub struct LayerStack {
    rows: Vec<Row>,
    ghost: GhostLayer,
    global_orientation: Option<Orientation>,
    observers: Vec<Box<dyn StackObserver>>,
    events: CircularBuffer<StackEvent>,
    hit_tolerance: f64,
    pixel_center_offset: f64,
    zoom_in_factor: f64,
    zoom_out_factor: f64,
    pan_step: f64,
    fast_pan_step: f64,
}

impl fmt::Debug for LayerStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayerStack")
            .field("rows", &self.rows.len())
            .field("global_orientation", &self.global_orientation)
            .field("observers", &self.observers.len())
            .field("events", &self.events.len())
            .finish()
    }
}

impl Default for LayerStack {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl LayerStack {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            rows: Vec::new(),
            ghost: GhostLayer::new(),
            global_orientation: None,
            observers: Vec::new(),
            events: CircularBuffer::new(config.event_log_capacity()),
            hit_tolerance: config.vector_hit_tolerance(),
            pixel_center_offset: config.pixel_center_offset(),
            zoom_in_factor: config.zoom_in_factor(),
            zoom_out_factor: config.zoom_out_factor(),
            pan_step: config.pan_step(false),
            fast_pan_step: config.pan_step(true),
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    #[must_use]
    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    #[must_use]
    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.rows.get(index).map(|r| &r.layer)
    }

    /// Mutable access to a layer. Callers that change what the row displays
    /// should follow up with [`LayerStack::refresh_row`].
    pub fn layer_mut(&mut self, index: usize) -> Option<&mut Layer> {
        self.rows.get_mut(index).map(|r| &mut r.layer)
    }

    pub fn layers(&self) -> impl Iterator<Item = &Layer> {
        self.rows.iter().map(|r| &r.layer)
    }

    #[must_use]
    pub fn ghost(&self) -> &GhostLayer {
        &self.ghost
    }

    pub fn ghost_mut(&mut self) -> &mut GhostLayer {
        &mut self.ghost
    }

    #[must_use]
    pub fn global_orientation(&self) -> Option<&Orientation> {
        self.global_orientation.as_ref()
    }

    #[must_use]
    pub fn is_oriented(&self) -> bool {
        self.global_orientation.is_some()
    }

    /// Most recent events, oldest first.
    #[must_use]
    pub fn events(&self) -> &CircularBuffer<StackEvent> {
        &self.events
    }

    pub fn subscribe(&mut self, observer: Box<dyn StackObserver>) {
        self.observers.push(observer);
    }

    // -------------------------------------------------------------------------
    // Notification helpers
    // -------------------------------------------------------------------------

    fn emit(&mut self, event: StackEvent) {
        for observer in &mut self.observers {
            observer.event_logged(&event);
        }
        self.events.push(event);
    }

    fn notify(&mut self, change: RowChange) {
        for observer in &mut self.observers {
            observer.row_changed(change);
        }
    }

    fn check_index(&mut self, index: usize) -> Result<()> {
        let len = self.rows.len();
        if index < len {
            return Ok(());
        }
        self.emit(StackEvent::InvalidIndex { index, len });
        Err(Error::Index { index, len })
    }

    /// Recomputes the label, tooltip and save flag of a row from its layer.
    pub fn refresh_row(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;
        let entry = &mut self.rows[index];
        entry.label = row::truncate_label(entry.layer.name());
        entry.tooltip = entry
            .layer
            .filename()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        entry.saveable = entry.layer.is_saveable();
        self.notify(RowChange::Updated(index));
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Insertion and removal
    // -------------------------------------------------------------------------

    /// Appends a layer and places it relative to the stack.
    ///
    /// The first layer of an empty stack that carries an orientation makes
    /// it the stack orientation. Later oriented layers are scaled and
    /// shifted onto that orientation; unoriented layers of an unoriented
    /// stack copy the ghost baseline.
    pub fn add_layer(&mut self, mut layer: Layer) -> usize {
        let name = layer.name().to_string();
        let own = layer.orientation().copied();

        if self.global_orientation.is_none() {
            match (self.rows.is_empty(), own) {
                (true, Some(orientation)) => {
                    self.global_orientation = Some(orientation);
                    self.emit(StackEvent::OrientationAdopted {
                        layer: name.clone(),
                        orientation,
                    });
                }
                (false, Some(_)) => {
                    self.emit(StackEvent::OrientationIgnored {
                        layer: name.clone(),
                    });
                }
                (false, None) => {
                    let ghost = self.ghost.transform();
                    let (zoom, tx, ty) = (
                        ghost.zoom_factor(),
                        ghost.translation_x(),
                        ghost.translation_y(),
                    );
                    let t = layer.transform_mut();
                    t.set_zoom_factor(zoom);
                    t.set_translation(tx, ty);
                    self.emit(StackEvent::AlignedWithGhost {
                        layer: name.clone(),
                    });
                }
                (true, None) => {}
            }
        }

        if let Some(global) = self.global_orientation {
            let first = self
                .rows
                .first()
                .map_or(layer.transform(), |r| r.layer.transform());
            let (first_zoom, first_tx, first_ty) = (
                first.zoom_factor(),
                first.translation_x(),
                first.translation_y(),
            );

            if let Some(own) = own {
                let new_zoom = global.step() / own.step();
                let init_x = (own.origin_x() - global.origin_x()) / own.step();
                let init_y = -(own.origin_y() - global.origin_y()) / own.step();
                let t = layer.transform_mut();
                t.set_zoom_factor(new_zoom * first_zoom);
                t.set_translation(init_x + first_tx * new_zoom, init_y + first_ty * new_zoom);
                let zoom_factor = t.zoom_factor();
                self.emit(StackEvent::AlignedWithOrientation {
                    layer: name.clone(),
                    zoom_factor,
                });
            }

            if layer.is_vector() {
                let t = layer.transform_mut();
                t.set_zoom_factor(first_zoom);
                t.set_translation(
                    -global.origin_x() + first_tx * global.step(),
                    global.origin_y() + first_ty * global.step(),
                );
                self.emit(StackEvent::VectorAlignedWithOrientation {
                    layer: name.clone(),
                });
            }
        }

        let resolution = self.global_orientation.map_or(1.0, |o| o.step());
        layer.transform_mut().set_resolution(resolution);
        layer.invalidate();

        let index = self.rows.len();
        self.rows.push(Row::new(layer, index));
        self.emit(StackEvent::LayerAdded { index, layer: name });
        self.notify(RowChange::Added(index));
        index
    }

    /// Removes the row at `index`, shifting the rows above it down.
    pub fn remove_layer(&mut self, index: usize) -> Result<Layer> {
        self.check_index(index)?;
        for i in index..self.rows.len() - 1 {
            self.exchange(i, i + 1);
        }
        let Some(row) = self.rows.pop() else {
            return Err(Error::Index { index, len: 0 });
        };
        if self.rows.is_empty() && self.global_orientation.take().is_some() {
            self.emit(StackEvent::OrientationCleared);
        }
        self.emit(StackEvent::LayerRemoved {
            index,
            layer: row.layer.name().to_string(),
        });
        self.notify(RowChange::Removed(index));
        Ok(row.layer)
    }

    /// Removes every row, last first.
    pub fn clear(&mut self) {
        while let Some(last) = self.rows.len().checked_sub(1) {
            if self.remove_layer(last).is_err() {
                break;
            }
        }
    }

    // -------------------------------------------------------------------------
    // Reordering
    // -------------------------------------------------------------------------

    fn exchange(&mut self, i: usize, j: usize) {
        self.rows.swap(i, j);
        self.rows[i].settings.index = i;
        self.rows[j].settings.index = j;
        self.rows[i].selected = false;
        self.rows[j].selected = true;
        self.rows[i].saveable = self.rows[i].layer.is_saveable();
        self.rows[j].saveable = self.rows[j].layer.is_saveable();
    }

    /// Exchanges two rows with their labels, tooltips and settings bindings.
    ///
    /// Afterwards row `i` is deselected and row `j` selected, whatever their
    /// previous selection.
    pub fn swap(&mut self, i: usize, j: usize) -> Result<()> {
        self.check_index(i)?;
        self.check_index(j)?;
        self.exchange(i, j);
        self.notify(RowChange::Swapped(i, j));
        Ok(())
    }

    /// Moves the first selected row one position up the list, towards
    /// index 0. Returns its new index.
    pub fn move_selected_up(&mut self) -> Option<usize> {
        let i = self.rows.iter().position(|r| r.selected)?;
        let target = i.checked_sub(1)?;
        self.swap(i, target).ok()?;
        Some(target)
    }

    pub fn move_selected_down(&mut self) -> Option<usize> {
        let i = self.rows.iter().position(|r| r.selected)?;
        let target = i + 1;
        if target >= self.rows.len() {
            return None;
        }
        self.swap(i, target).ok()?;
        Some(target)
    }

    // -------------------------------------------------------------------------
    // Row flags
    // -------------------------------------------------------------------------

    pub fn set_selected(&mut self, index: usize, selected: bool) -> Result<()> {
        self.check_index(index)?;
        self.rows[index].selected = selected;
        self.notify(RowChange::Updated(index));
        Ok(())
    }

    pub fn toggle_selected(&mut self, index: usize) -> Result<bool> {
        self.check_index(index)?;
        let selected = !self.rows[index].selected;
        self.set_selected(index, selected)?;
        Ok(selected)
    }

    /// Selects `index` and deselects every other row.
    pub fn select_only(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;
        for (i, row) in self.rows.iter_mut().enumerate() {
            row.selected = i == index;
        }
        self.notify(RowChange::Updated(index));
        Ok(())
    }

    #[must_use]
    pub fn selected_indices(&self) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, r)| r.selected)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn set_visible(&mut self, index: usize, visible: bool) -> Result<()> {
        self.check_index(index)?;
        self.rows[index].layer.set_visible(visible);
        self.notify(RowChange::Updated(index));
        Ok(())
    }

    pub fn set_transformable(&mut self, index: usize, transformable: bool) -> Result<()> {
        self.check_index(index)?;
        self.rows[index].layer.set_transformable(transformable);
        self.notify(RowChange::Updated(index));
        Ok(())
    }

    /// Opens or closes the settings panel bound to a row.
    pub fn toggle_settings(&mut self, index: usize) -> Result<bool> {
        self.check_index(index)?;
        let settings = &mut self.rows[index].settings;
        settings.open = !settings.open;
        let open = settings.open;
        self.notify(RowChange::Updated(index));
        Ok(open)
    }

    /// Inverts the visibility of every selected row.
    pub fn toggle_visibility_for_selected(&mut self) {
        for index in self.selected_indices() {
            let layer = &mut self.rows[index].layer;
            layer.set_visible(!layer.is_visible());
            self.notify(RowChange::Updated(index));
        }
    }

    /// Inverts the transformability of every selected row.
    pub fn toggle_transformability_for_selected(&mut self) {
        for index in self.selected_indices() {
            let layer = &mut self.rows[index].layer;
            layer.set_transformable(!layer.is_transformable());
            self.notify(RowChange::Updated(index));
        }
    }

    /// Zoom 1, no translation, visible and transformable for every layer.
    pub fn reset_all(&mut self) {
        for row in &mut self.rows {
            row.layer.reset_view();
            row.layer.invalidate();
            row.layer.set_transformable(true);
            row.layer.set_visible(true);
        }
        self.notify(RowChange::Reset);
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Values of every visible layer under a global point, in row order.
    #[must_use]
    pub fn query_pixel(&self, global: Point) -> Vec<PixelReadout> {
        self.rows
            .iter()
            .filter(|r| r.layer.is_visible())
            .filter_map(|r| {
                r.layer
                    .pixel_value(global, self.hit_tolerance)
                    .map(|value| PixelReadout {
                        layer: r.layer.name().to_string(),
                        value,
                    })
            })
            .collect()
    }

    // -------------------------------------------------------------------------
    // Crop
    // -------------------------------------------------------------------------

    /// Crops the layer at `index` to a global rectangle and appends the
    /// copy aligned over the source region.
    ///
    /// `Ok(None)` when the layer holds nothing inside the rectangle.
    pub fn crop(&mut self, index: usize, rect: Rect) -> Result<Option<usize>> {
        self.check_index(index)?;
        let source = &self.rows[index].layer;
        let t = source.transform();
        let p0 = t.to_local_int(rect.min, 0.0);
        let p1 = t.to_local_int(rect.max, 0.0);
        let (zoom, tx, ty) = (t.zoom_factor(), t.translation_x(), t.translation_y());

        let Some(cropped) = source.crop(p0, p1) else {
            let layer = source.name().to_string();
            self.emit(StackEvent::CropEmpty { layer });
            return Ok(None);
        };
        let origin = source.crop_origin(p0, p1);

        let new_index = self.add_layer(cropped);
        #[allow(clippy::cast_precision_loss)]
        let (ox, oy) = (origin.x as f64, origin.y as f64);
        let t = self.rows[new_index].layer.transform_mut();
        t.set_translation(ox + tx, oy + ty);
        t.set_zoom_factor(zoom);
        self.notify(RowChange::Updated(new_index));
        Ok(Some(new_index))
    }

    /// Crops every selected layer to the ghost rectangle. Returns the rows
    /// added; layers with nothing inside the rectangle are skipped.
    pub fn crop_selected(&mut self) -> Result<Vec<usize>> {
        let Some((a, b)) = self.ghost.rectangle_global() else {
            return Err(Error::State("no capture rectangle".to_string()));
        };
        let rect = Rect::from_corners(a, b);
        let mut added = Vec::new();
        for index in self.selected_indices() {
            if let Some(new_index) = self.crop(index, rect)? {
                added.push(new_index);
            }
        }
        Ok(added)
    }

    // -------------------------------------------------------------------------
    // Files
    // -------------------------------------------------------------------------

    /// Loads one file and appends it. A failed load leaves the stack as is.
    pub fn add_layer_from_file(&mut self, path: &Path, registry: &CodecRegistry) -> Result<usize> {
        match registry.load(path) {
            Ok(layer) => Ok(self.add_layer(layer)),
            Err(err) => {
                self.emit(StackEvent::LoadFailed {
                    path: path.to_path_buf(),
                    message: err.to_string(),
                });
                Err(err)
            }
        }
    }

    /// Loads every file in order, continuing past failures.
    pub fn add_layers_from_files<I, P>(&mut self, paths: I, registry: &CodecRegistry) -> BatchReport
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut report = BatchReport::default();
        for path in paths {
            let path = path.as_ref();
            match self.add_layer_from_file(path, registry) {
                Ok(index) => report.added.push(index),
                Err(err) => report.errors.push((path.to_path_buf(), err)),
            }
        }
        report
    }

    /// Writes the layer at `index` with the codec chosen by `path`.
    ///
    /// On success the layer remembers `path` as its file.
    pub fn save_layer(&mut self, index: usize, path: &Path, registry: &CodecRegistry) -> Result<()> {
        self.check_index(index)?;
        if let Err(err) = registry.save(&self.rows[index].layer, path) {
            self.emit(StackEvent::SaveFailed {
                path: path.to_path_buf(),
                message: err.to_string(),
            });
            return Err(err);
        }
        self.rows[index].layer.set_filename(path);
        self.refresh_row(index)
    }

    /// Loads the file named by `params`, appends it, then applies every
    /// parameter.
    pub fn create_layer_with_parameters(
        &mut self,
        params: &LayerParameters,
        registry: &CodecRegistry,
    ) -> Result<usize> {
        let index = self.add_layer_from_file(params.path(), registry)?;
        params.apply(&mut self.rows[index].layer);
        self.notify(RowChange::Updated(index));
        Ok(index)
    }

    /// Saves the parameters of every file-backed row. Returns the path
    /// written, which always has the `.xml` extension.
    pub fn write_display_config(&mut self, path: &Path) -> Result<PathBuf> {
        let rows: Vec<LayerParameters> = self
            .rows
            .iter()
            .filter_map(|r| LayerParameters::from_layer(&r.layer))
            .collect();
        display_config::write_display_config(path, &rows).inspect_err(|err| {
            self.emit(StackEvent::DisplayConfigFailed {
                path: path.to_path_buf(),
                message: err.to_string(),
            });
        })
    }

    /// Rebuilds rows from a display configuration, appending them after the
    /// existing rows.
    pub fn load_display_config(&mut self, path: &Path, registry: &CodecRegistry) -> Result<BatchReport> {
        let rows = display_config::read_display_config(path).inspect_err(|err| {
            self.emit(StackEvent::DisplayConfigFailed {
                path: path.to_path_buf(),
                message: err.to_string(),
            });
        })?;
        let mut report = BatchReport::default();
        for params in &rows {
            match self.create_layer_with_parameters(params, registry) {
                Ok(index) => report.added.push(index),
                Err(err) => report.errors.push((params.path().to_path_buf(), err)),
            }
        }
        Ok(report)
    }

    // -------------------------------------------------------------------------
    // Rendering
    // -------------------------------------------------------------------------

    /// Redraws every visible layer that needs it. Failed layers keep their
    /// redraw flag and are reported with their row index.
    pub fn update(&mut self, view_width: u32, view_height: u32) -> Vec<(usize, Error)> {
        let mut failures = Vec::new();
        for index in 0..self.rows.len() {
            let layer = &mut self.rows[index].layer;
            if !layer.is_visible() || !layer.needs_redraw() {
                continue;
            }
            if let Err(err) = layer.update(view_width, view_height) {
                let name = layer.name().to_string();
                self.emit(StackEvent::RenderFailed {
                    layer: name,
                    message: err.to_string(),
                });
                failures.push((index, err));
            }
        }
        failures
    }
}
