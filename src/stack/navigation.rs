// SPDX-License-Identifier: MPL-2.0
//! View navigation across the whole stack and the status readout under the
//! cursor.

use super::LayerStack;
use crate::domain::{PixelPoint, Point};
use std::path::Path;

/// One visible layer as shown in the status line.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerStatus {
    /// Layer name without its extension.
    pub name: String,
    pub value: Option<String>,
    /// `100 / zoom_factor`: the displayed size relative to native size.
    pub zoom_percent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    /// Local coordinates of the first visible layer, truncated.
    pub pixel: PixelPoint,
    /// Local coordinates of the first visible layer relative to pixel
    /// centres.
    pub sub_pixel: Point,
    /// Present when the stack is oriented.
    pub cartographic: Option<Point>,
    pub layers: Vec<LayerStatus>,
}

impl LayerStack {
    /// Pans every transformable layer and the ghost baseline by a view delta.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        for row in &mut self.rows {
            if row.layer.is_transformable() {
                row.layer.translate(dx, dy);
            }
        }
        self.ghost.transform_mut().translate(dx, dy);
    }

    /// Zooms every transformable layer and the ghost baseline around a view
    /// point. `factor < 1` magnifies.
    pub fn zoom_at(&mut self, factor: f64, anchor: Point) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        for row in &mut self.rows {
            if row.layer.is_transformable() {
                row.layer.zoom(factor, anchor);
            }
        }
        self.ghost.transform_mut().zoom(factor, anchor.x, anchor.y);
    }

    /// One zoom-in step around `anchor`, using the configured factor.
    pub fn zoom_in_at(&mut self, anchor: Point) {
        self.zoom_at(self.zoom_in_factor, anchor);
    }

    /// One zoom-out step around `anchor`, using the configured factor.
    pub fn zoom_out_at(&mut self, anchor: Point) {
        self.zoom_at(self.zoom_out_factor, anchor);
    }

    /// Pans by a whole number of configured steps on each axis.
    pub fn pan_by_steps(&mut self, steps_x: i32, steps_y: i32, fast: bool) {
        let step = if fast {
            self.fast_pan_step
        } else {
            self.pan_step
        };
        self.pan(f64::from(steps_x) * step, f64::from(steps_y) * step);
    }

    /// Status line content for a view point. `None` when nothing is visible.
    #[must_use]
    pub fn status_at(&self, global: Point) -> Option<StatusReport> {
        let first = self.rows.iter().find(|r| r.layer.is_visible())?;
        let transform = first.layer.transform();
        let local = transform.to_local(global);
        let offset = self.pixel_center_offset;

        let layers = self
            .rows
            .iter()
            .filter(|r| r.layer.is_visible())
            .map(|r| LayerStatus {
                name: Path::new(r.layer.name())
                    .file_stem()
                    .map_or_else(|| r.layer.name().to_string(), |s| s.to_string_lossy().into_owned()),
                value: r.layer.pixel_value(global, self.hit_tolerance),
                zoom_percent: 100.0 / r.layer.transform().zoom_factor(),
            })
            .collect();

        Some(StatusReport {
            pixel: transform.to_local_int(global, 0.0),
            sub_pixel: Point::new(local.x - offset, local.y - offset),
            cartographic: self
                .global_orientation
                .map(|o| o.pixel_to_cartographic(local)),
            layers,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::domain::{Orientation, PixelPoint, Point};
    use crate::layer::{ImageLayer, Layer};
    use crate::stack::LayerStack;
    use image_rs::{DynamicImage, GrayImage, Luma};

    fn gray(name: &str) -> Layer {
        let buffer = GrayImage::from_fn(10, 10, |x, y| Luma([(x + 10 * y) as u8]));
        Layer::image(name, ImageLayer::new(DynamicImage::ImageLuma8(buffer)))
    }

    #[test]
    fn pan_skips_locked_layers_but_moves_ghost() {
        let mut stack = LayerStack::default();
        stack.add_layer(gray("a"));
        stack.add_layer(gray("locked"));
        stack.set_transformable(1, false).unwrap();

        stack.pan(2.0, -1.0);
        assert_eq!(
            stack.layer(0).unwrap().transform().translation(),
            Point::new(2.0, -1.0)
        );
        assert_eq!(
            stack.layer(1).unwrap().transform().translation(),
            Point::new(0.0, 0.0)
        );
        assert_eq!(stack.ghost().transform().translation(), Point::new(2.0, -1.0));
    }

    #[test]
    fn zoom_at_keeps_anchor_fixed_for_every_layer() {
        let mut stack = LayerStack::default();
        stack.add_layer(gray("a"));
        stack.pan(3.0, 1.0);
        stack.add_layer(gray("b"));

        let anchor = Point::new(4.0, 6.0);
        let before: Vec<Point> = stack
            .layers()
            .map(|l| l.transform().to_local(anchor))
            .collect();
        stack.zoom_at(0.5, anchor);
        for (layer, local) in stack.layers().zip(before) {
            let after = layer.transform().to_local(anchor);
            assert!((after.x - local.x).abs() < 1e-9);
            assert!((after.y - local.y).abs() < 1e-9);
            assert_eq!(layer.transform().zoom_factor(), 0.5);
        }
    }

    #[test]
    fn invalid_zoom_factor_is_ignored() {
        let mut stack = LayerStack::default();
        stack.add_layer(gray("a"));
        stack.zoom_at(0.0, Point::new(1.0, 1.0));
        stack.zoom_at(f64::NAN, Point::new(1.0, 1.0));
        assert_eq!(stack.layer(0).unwrap().transform().zoom_factor(), 1.0);
    }

    #[test]
    fn zoom_and_pan_steps_follow_settings() {
        let settings: Config = toml::from_str(
            "[navigation]\nzoom_in_factor = 0.25\nzoom_out_factor = 4.0\npan_step = 2.0\nfast_pan_step = 10.0\n",
        )
        .unwrap();
        let mut stack = LayerStack::new(&settings);
        stack.add_layer(gray("a"));

        stack.zoom_in_at(Point::new(0.0, 0.0));
        assert_eq!(stack.layer(0).unwrap().transform().zoom_factor(), 0.25);
        stack.zoom_out_at(Point::new(0.0, 0.0));
        assert_eq!(stack.layer(0).unwrap().transform().zoom_factor(), 1.0);

        stack.pan_by_steps(1, -2, false);
        assert_eq!(
            stack.layer(0).unwrap().transform().translation(),
            Point::new(2.0, -4.0)
        );
        stack.pan_by_steps(1, 0, true);
        assert_eq!(
            stack.layer(0).unwrap().transform().translation(),
            Point::new(12.0, -4.0)
        );
    }

    #[test]
    fn default_steps_use_built_in_factors() {
        let mut stack = LayerStack::default();
        stack.add_layer(gray("a"));
        stack.zoom_in_at(Point::new(0.0, 0.0));
        assert_eq!(stack.layer(0).unwrap().transform().zoom_factor(), 0.5);
        stack.pan_by_steps(0, 1, true);
        assert_eq!(stack.ghost().transform().translation(), Point::new(0.0, 25.0));
    }

    #[test]
    fn status_reports_first_visible_layer_coordinates() {
        let mut stack = LayerStack::default();
        assert!(stack.status_at(Point::new(0.0, 0.0)).is_none());

        stack.add_layer(
            gray("ortho.tif").with_orientation(Orientation::new(1000.0, 2000.0, 0.5).unwrap()),
        );
        stack.layer_mut(0).unwrap().transform_mut().set_zoom_factor(2.0);

        let status = stack.status_at(Point::new(2.0, 3.0)).expect("status");
        assert_eq!(status.pixel, PixelPoint::new(4, 6));
        assert_eq!(status.sub_pixel, Point::new(3.5, 5.5));
        assert_eq!(status.cartographic, Some(Point::new(1002.0, 1997.0)));
        assert_eq!(status.layers.len(), 1);
        assert_eq!(status.layers[0].name, "ortho");
        assert_eq!(status.layers[0].value.as_deref(), Some("64"));
        assert_eq!(status.layers[0].zoom_percent, 50.0);
    }

    #[test]
    fn status_is_none_when_everything_is_hidden() {
        let mut stack = LayerStack::default();
        stack.add_layer(gray("a"));
        stack.set_visible(0, false).unwrap();
        assert!(stack.status_at(Point::new(1.0, 1.0)).is_none());
    }
}
