//! Geometry primitives shared by entities, the eraser and hit-testing.

use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// A captured pen sample in document space.
///
/// Pressure is nominally in `[0, 1]`; tilt is whatever the device reported.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InkPoint {
    pub x: f64,
    pub y: f64,
    #[serde(default = "default_pressure")]
    pub pressure: f64,
    #[serde(default)]
    pub tilt_x: f64,
    #[serde(default)]
    pub tilt_y: f64,
}

fn default_pressure() -> f64 {
    1.0
}

impl InkPoint {
    /// A sample at full pressure with no tilt.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            pressure: 1.0,
            tilt_x: 0.0,
            tilt_y: 0.0,
        }
    }

    pub fn with_pressure(mut self, pressure: f64) -> Self {
        self.pressure = pressure;
        self
    }

    pub fn with_tilt(mut self, tilt_x: f64, tilt_y: f64) -> Self {
        self.tilt_x = tilt_x;
        self.tilt_y = tilt_y;
        self
    }

    /// Position without the pen attributes.
    pub fn pos(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Magnitude of the tilt vector.
    pub fn tilt(&self) -> f64 {
        self.tilt_x.hypot(self.tilt_y)
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
    }

    /// Euclidean distance to a document-space point.
    pub fn distance_to(&self, point: Point) -> f64 {
        self.pos().distance(point)
    }
}

/// Axis-aligned box spanned by two corners, in any order.
pub fn rect_from_corners(a: Point, b: Point) -> Rect {
    Rect::from_points(a, b)
}

/// Bounding box of a point cloud, or `None` when empty.
pub fn points_bounds<'a>(points: impl IntoIterator<Item = &'a InkPoint>) -> Option<Rect> {
    let mut iter = points.into_iter();
    let first = iter.next()?;
    let mut rect = Rect::from_points(first.pos(), first.pos());
    for p in iter {
        rect = rect.union_pt(p.pos());
    }
    Some(rect)
}

/// Inclusive overlap test.
///
/// Unlike `Rect::intersect(..).area() > 0`, boxes that only touch, or that
/// have zero width or height, still count as overlapping.
pub fn rects_overlap(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && a.x1 >= b.x0 && a.y0 <= b.y1 && a.y1 >= b.y0
}

/// Inclusive containment test (points on the edge are inside).
pub fn rect_contains(rect: Rect, point: Point) -> bool {
    rect.x0 <= point.x && point.x <= rect.x1 && rect.y0 <= point.y && point.y <= rect.y1
}

/// Union of an iterator of boxes, or `None` when empty.
pub fn union_all(rects: impl IntoIterator<Item = Rect>) -> Option<Rect> {
    rects.into_iter().reduce(|acc, r| acc.union(r))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ink_point_defaults() {
        let p = InkPoint::new(3.0, 4.0);
        assert!((p.pressure - 1.0).abs() < f64::EPSILON);
        assert!(p.tilt().abs() < f64::EPSILON);
        assert!((p.distance_to(Point::ZERO) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_points_bounds() {
        let pts = [InkPoint::new(5.0, 1.0), InkPoint::new(-2.0, 7.0), InkPoint::new(3.0, 3.0)];
        let bounds = points_bounds(&pts).unwrap();
        assert_eq!(bounds, Rect::new(-2.0, 1.0, 5.0, 7.0));
        assert!(points_bounds(&[]).is_none());
    }

    #[test]
    fn test_overlap_is_inclusive() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(rects_overlap(a, Rect::new(10.0, 10.0, 20.0, 20.0)));
        assert!(rects_overlap(a, Rect::new(5.0, 5.0, 5.0, 5.0)));
        assert!(!rects_overlap(a, Rect::new(10.5, 0.0, 20.0, 10.0)));
    }

    #[test]
    fn test_rect_from_corners_normalizes() {
        let r = rect_from_corners(Point::new(10.0, 0.0), Point::new(0.0, 8.0));
        assert_eq!(r, Rect::new(0.0, 0.0, 10.0, 8.0));
    }

    #[test]
    fn test_union_all() {
        let u = union_all([Rect::new(0.0, 0.0, 1.0, 1.0), Rect::new(-1.0, 2.0, 0.5, 3.0)]).unwrap();
        assert_eq!(u, Rect::new(-1.0, 0.0, 1.0, 3.0));
        assert!(union_all(std::iter::empty()).is_none());
    }
}
