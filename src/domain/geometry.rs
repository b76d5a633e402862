// SPDX-License-Identifier: MPL-2.0
//! Planar geometry primitives shared by transforms, layers and capture.

use std::ops::{Add, AddAssign, Mul, Sub};

/// A point in a 2D frame (global view frame or a layer's local frame).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Shortest distance from `self` to the segment `[a, b]`.
    #[must_use]
    pub fn distance_to_segment(self, a: Point, b: Point) -> f64 {
        let ab = b - a;
        let len2 = ab.x * ab.x + ab.y * ab.y;
        if len2 == 0.0 {
            return self.distance(a);
        }
        let ap = self - a;
        let t = ((ap.x * ab.x + ap.y * ab.y) / len2).clamp(0.0, 1.0);
        self.distance(a + ab * t)
    }

    /// Arithmetic mean of `points`, `None` for an empty slice.
    #[must_use]
    pub fn barycenter(points: &[Point]) -> Option<Point> {
        if points.is_empty() {
            return None;
        }
        let sum = points
            .iter()
            .fold(Point::default(), |acc, p| acc + *p);
        let n = points.len() as f64;
        Some(Point::new(sum.x / n, sum.y / n))
    }

    /// Even-odd rule test against a closed ring.
    #[must_use]
    pub fn is_inside_ring(self, ring: &[Point]) -> bool {
        if ring.len() < 3 {
            return false;
        }
        let mut inside = false;
        let mut j = ring.len() - 1;
        for i in 0..ring.len() {
            let (pi, pj) = (ring[i], ring[j]);
            if (pi.y > self.y) != (pj.y > self.y)
                && self.x < (pj.x - pi.x) * (self.y - pi.y) / (pj.y - pi.y) + pi.x
            {
                inside = !inside;
            }
            j = i;
        }
        inside
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;
    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point::new(x, y)
    }
}

/// Integer pixel position produced by the rounding conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PixelPoint {
    pub x: i64,
    pub y: i64,
}

impl PixelPoint {
    #[must_use]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

impl From<PixelPoint> for Point {
    fn from(p: PixelPoint) -> Self {
        Point::new(p.x as f64, p.y as f64)
    }
}

/// Axis-aligned rectangle with `min <= max` on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub min: Point,
    pub max: Point,
}

impl Rect {
    /// Builds the rectangle spanned by two opposite corners in any order.
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            min: Point::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn barycenter_of_square() {
        let square = [
            Point::new(0.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(2.0, 2.0),
            Point::new(0.0, 2.0),
        ];
        assert_eq!(Point::barycenter(&square), Some(Point::new(1.0, 1.0)));
        assert_eq!(Point::barycenter(&[]), None);
    }

    #[test]
    fn segment_distance_clamps_to_endpoints() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert_eq!(Point::new(5.0, 3.0).distance_to_segment(a, b), 3.0);
        assert_eq!(Point::new(-4.0, 3.0).distance_to_segment(a, b), 5.0);
        assert_eq!(Point::new(1.0, 1.0).distance_to_segment(a, a), 2f64.sqrt());
    }

    #[test]
    fn ring_containment() {
        let ring = [
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(4.0, 4.0),
            Point::new(0.0, 4.0),
        ];
        assert!(Point::new(2.0, 2.0).is_inside_ring(&ring));
        assert!(!Point::new(5.0, 2.0).is_inside_ring(&ring));
        assert!(!Point::new(1.0, 1.0).is_inside_ring(&ring[..2]));
    }

    #[test]
    fn rect_normalizes_corners() {
        let rect = Rect::from_corners(Point::new(5.0, 1.0), Point::new(1.0, 3.0));
        assert_eq!(rect.min, Point::new(1.0, 1.0));
        assert_eq!(rect.max, Point::new(5.0, 3.0));
        assert_eq!(rect.width(), 4.0);
        assert_eq!(rect.height(), 2.0);
        assert_eq!(rect.center(), Point::new(3.0, 2.0));
        assert!(rect.contains(Point::new(2.0, 2.0)));
    }
}
