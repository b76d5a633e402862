// SPDX-License-Identifier: MPL-2.0
//! Interactive capture overlay.
//!
//! The ghost layer is never stored in the stack rows. It holds the view
//! baseline transform given to unoriented layers and the geometry being
//! captured. Inputs are global (view) points; geometry is kept in the
//! ghost's local frame.

use crate::domain::{LayerTransform, Point, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GeometryKind {
    #[default]
    None,
    Point,
    Circle,
    Line,
    Rectangle,
}

/// Outcome of feeding a click to the capture state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureStatus {
    /// No geometry kind is active.
    Idle,
    InProgress,
    /// The geometry is finished; the next click starts a new one.
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Circle {
    pub center: Point,
    pub radius: f64,
}

#[derive(Debug, Clone, Default)]
pub struct GhostLayer {
    transform: LayerTransform,
    kind: GeometryKind,

    point: Point,
    draw_point: bool,

    circle: Circle,
    circle_first_point_set: bool,
    draw_circle: bool,

    line: Vec<Point>,
    line_has_begun: bool,
    line_end_capture: bool,
    draw_line: bool,

    rectangle: (Point, Point),
    rectangle_first_point_set: bool,
    draw_rectangle: bool,
}

impl GhostLayer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn transform(&self) -> &LayerTransform {
        &self.transform
    }

    pub fn transform_mut(&mut self) -> &mut LayerTransform {
        &mut self.transform
    }

    #[must_use]
    pub fn geometry_kind(&self) -> GeometryKind {
        self.kind
    }

    /// Switches the active geometry kind and hides every drawn shape.
    pub fn set_geometry(&mut self, kind: GeometryKind) {
        self.kind = kind;
        self.hide_all();
    }

    fn hide_all(&mut self) {
        self.draw_point = false;
        self.draw_circle = false;
        self.draw_line = false;
        self.draw_rectangle = false;
    }

    // -------------------------------------------------------------------------
    // Capture
    // -------------------------------------------------------------------------

    /// Feeds a click at a global point.
    pub fn add_point(&mut self, global: Point) -> CaptureStatus {
        let pt = self.transform.to_local(global);
        self.hide_all();

        match self.kind {
            GeometryKind::None => CaptureStatus::Idle,
            GeometryKind::Point => {
                self.point = pt;
                self.draw_point = true;
                CaptureStatus::Complete
            }
            GeometryKind::Circle => {
                self.draw_circle = true;
                if self.circle_first_point_set {
                    self.circle.radius = self.circle.center.distance(pt);
                    self.circle_first_point_set = false;
                    CaptureStatus::Complete
                } else {
                    self.circle = Circle {
                        center: pt,
                        radius: 1.0,
                    };
                    self.circle_first_point_set = true;
                    CaptureStatus::InProgress
                }
            }
            GeometryKind::Line => {
                self.draw_line = true;
                if !self.line_has_begun {
                    self.line.clear();
                    self.line.push(pt);
                }
                self.line_has_begun = true;
                self.line.push(pt);
                if self.line_end_capture {
                    self.line_end_capture = false;
                    self.line_has_begun = false;
                    CaptureStatus::Complete
                } else {
                    CaptureStatus::InProgress
                }
            }
            GeometryKind::Rectangle => {
                self.draw_rectangle = true;
                self.rectangle.1 = pt;
                if self.rectangle_first_point_set {
                    self.rectangle_first_point_set = false;
                    CaptureStatus::Complete
                } else {
                    self.rectangle.0 = pt;
                    self.rectangle_first_point_set = true;
                    CaptureStatus::InProgress
                }
            }
        }
    }

    /// Adds the final vertex of a line and closes it.
    pub fn end_line(&mut self, global: Point) -> CaptureStatus {
        if self.kind == GeometryKind::Line {
            self.line_end_capture = true;
        }
        self.add_point(global)
    }

    /// Rubber-band update while capturing.
    pub fn update_absolute(&mut self, global: Point) {
        let pt = self.transform.to_local(global);
        match self.kind {
            GeometryKind::Circle if self.circle_first_point_set => {
                self.circle.radius = self.circle.center.distance(pt);
            }
            GeometryKind::Line if self.line_has_begun && self.line.len() > 1 => {
                if let Some(last) = self.line.last_mut() {
                    *last = pt;
                }
            }
            GeometryKind::Rectangle if self.rectangle_first_point_set => {
                self.rectangle.1 = pt;
            }
            _ => {}
        }
    }

    /// Moves the free rectangle corner by a raw delta while capturing.
    pub fn update_relative(&mut self, delta: Point) {
        if self.kind == GeometryKind::Rectangle && self.rectangle_first_point_set {
            self.rectangle.1 += delta;
        }
    }

    /// Translates the active geometry by a raw local delta.
    pub fn move_relative(&mut self, delta: Point) {
        match self.kind {
            GeometryKind::None => {}
            GeometryKind::Point => self.point += delta,
            GeometryKind::Circle => self.circle.center += delta,
            GeometryKind::Line => self.line.iter_mut().for_each(|p| *p += delta),
            GeometryKind::Rectangle => {
                self.rectangle.0 += delta;
                self.rectangle.1 += delta;
            }
        }
    }

    /// Re-centres the active geometry on a global point.
    pub fn move_absolute(&mut self, global: Point) {
        let pt = self.transform.to_local(global);
        match self.kind {
            GeometryKind::None => {}
            GeometryKind::Point => self.point = pt,
            GeometryKind::Circle => self.circle.center = pt,
            GeometryKind::Line => {
                if let Some(bary) = Point::barycenter(&self.line) {
                    let shift = pt - bary;
                    self.line.iter_mut().for_each(|p| *p += shift);
                }
            }
            GeometryKind::Rectangle => {
                let diagonal = self.rectangle.1 - self.rectangle.0;
                self.rectangle.0 = pt - diagonal * 0.5;
                self.rectangle.1 = self.rectangle.0 + diagonal;
            }
        }
    }

    // -------------------------------------------------------------------------
    // Captured geometry
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn point(&self) -> Option<Point> {
        self.draw_point.then_some(self.point)
    }

    #[must_use]
    pub fn circle(&self) -> Option<Circle> {
        self.draw_circle.then_some(self.circle)
    }

    #[must_use]
    pub fn line(&self) -> Option<&[Point]> {
        self.draw_line.then_some(self.line.as_slice())
    }

    /// The rectangle in ghost-local coordinates, normalised.
    #[must_use]
    pub fn rectangle(&self) -> Option<Rect> {
        self.draw_rectangle
            .then(|| Rect::from_corners(self.rectangle.0, self.rectangle.1))
    }

    /// Both rectangle corners mapped back to global coordinates.
    #[must_use]
    pub fn rectangle_global(&self) -> Option<(Point, Point)> {
        self.draw_rectangle.then(|| {
            (
                self.transform.from_local(self.rectangle.0),
                self.transform.from_local(self.rectangle.1),
            )
        })
    }

    #[must_use]
    pub fn is_capturing(&self) -> bool {
        match self.kind {
            GeometryKind::Circle => self.circle_first_point_set,
            GeometryKind::Line => self.line_has_begun,
            GeometryKind::Rectangle => self.rectangle_first_point_set,
            GeometryKind::None | GeometryKind::Point => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ghost(kind: GeometryKind) -> GhostLayer {
        let mut g = GhostLayer::new();
        g.set_geometry(kind);
        g
    }

    #[test]
    fn no_geometry_is_idle() {
        let mut g = GhostLayer::new();
        assert_eq!(g.add_point(Point::new(1.0, 1.0)), CaptureStatus::Idle);
        assert!(g.point().is_none());
    }

    #[test]
    fn point_completes_on_first_click() {
        let mut g = ghost(GeometryKind::Point);
        assert_eq!(g.add_point(Point::new(3.0, 4.0)), CaptureStatus::Complete);
        assert_eq!(g.point(), Some(Point::new(3.0, 4.0)));
    }

    #[test]
    fn circle_center_then_radius() {
        let mut g = ghost(GeometryKind::Circle);
        assert_eq!(g.add_point(Point::new(0.0, 0.0)), CaptureStatus::InProgress);
        assert_eq!(g.circle().map(|c| c.radius), Some(1.0));
        g.update_absolute(Point::new(0.0, 2.0));
        assert_eq!(g.circle().map(|c| c.radius), Some(2.0));
        assert_eq!(g.add_point(Point::new(3.0, 4.0)), CaptureStatus::Complete);
        assert_eq!(
            g.circle(),
            Some(Circle {
                center: Point::new(0.0, 0.0),
                radius: 5.0
            })
        );
        assert!(!g.is_capturing());
    }

    #[test]
    fn line_rubber_band_and_end_capture() {
        let mut g = ghost(GeometryKind::Line);
        g.add_point(Point::new(0.0, 0.0));
        // anchor plus moving vertex
        assert_eq!(g.line().map(<[Point]>::len), Some(2));
        g.update_absolute(Point::new(5.0, 5.0));
        assert_eq!(g.line().and_then(|l| l.last().copied()), Some(Point::new(5.0, 5.0)));

        assert_eq!(g.add_point(Point::new(10.0, 0.0)), CaptureStatus::InProgress);
        assert_eq!(g.end_line(Point::new(10.0, 10.0)), CaptureStatus::Complete);
        assert!(!g.is_capturing());
        assert_eq!(g.line().map(<[Point]>::len), Some(4));

        // next click starts a fresh line
        g.add_point(Point::new(1.0, 1.0));
        assert_eq!(g.line().map(<[Point]>::len), Some(2));
    }

    #[test]
    fn rectangle_two_clicks() {
        let mut g = ghost(GeometryKind::Rectangle);
        assert_eq!(g.add_point(Point::new(10.0, 10.0)), CaptureStatus::InProgress);
        g.update_absolute(Point::new(2.0, 4.0));
        g.update_relative(Point::new(-1.0, 0.0));
        assert_eq!(
            g.rectangle(),
            Some(Rect::from_corners(Point::new(1.0, 4.0), Point::new(10.0, 10.0)))
        );
        assert_eq!(g.add_point(Point::new(20.0, 30.0)), CaptureStatus::Complete);
        assert_eq!(
            g.rectangle(),
            Some(Rect::from_corners(Point::new(10.0, 10.0), Point::new(20.0, 30.0)))
        );
        // updates after completion are ignored
        g.update_absolute(Point::new(0.0, 0.0));
        assert_eq!(g.rectangle().map(|r| r.max), Some(Point::new(20.0, 30.0)));
    }

    #[test]
    fn move_relative_translates_every_vertex() {
        let mut g = ghost(GeometryKind::Line);
        g.add_point(Point::new(0.0, 0.0));
        g.end_line(Point::new(4.0, 0.0));
        g.move_relative(Point::new(1.0, 2.0));
        assert_eq!(
            g.line().map(<[Point]>::to_vec),
            Some(vec![
                Point::new(1.0, 2.0),
                Point::new(1.0, 2.0),
                Point::new(5.0, 2.0)
            ])
        );
    }

    #[test]
    fn move_absolute_recenters_rectangle() {
        let mut g = ghost(GeometryKind::Rectangle);
        g.add_point(Point::new(0.0, 0.0));
        g.add_point(Point::new(4.0, 2.0));
        g.move_absolute(Point::new(10.0, 10.0));
        assert_eq!(
            g.rectangle(),
            Some(Rect::from_corners(Point::new(8.0, 9.0), Point::new(12.0, 11.0)))
        );
    }

    #[test]
    fn move_absolute_recenters_line_barycenter() {
        let mut g = ghost(GeometryKind::Line);
        g.add_point(Point::new(0.0, 0.0));
        g.end_line(Point::new(3.0, 0.0));
        // vertices (0,0), (0,0), (3,0): barycenter (1,0)
        g.move_absolute(Point::new(11.0, 5.0));
        let line = g.line().expect("line").to_vec();
        assert_eq!(Point::barycenter(&line), Some(Point::new(11.0, 5.0)));
    }

    #[test]
    fn inputs_go_through_ghost_transform() {
        let mut g = ghost(GeometryKind::Point);
        g.transform_mut().set_zoom_factor(2.0);
        g.transform_mut().set_translation(1.0, 1.0);
        g.add_point(Point::new(3.0, 3.0));
        assert_eq!(g.point(), Some(Point::new(5.0, 5.0)));
    }

    #[test]
    fn switching_geometry_hides_shapes() {
        let mut g = ghost(GeometryKind::Point);
        g.add_point(Point::new(1.0, 1.0));
        g.set_geometry(GeometryKind::Circle);
        assert!(g.point().is_none());
        assert!(g.circle().is_none());
    }
}
