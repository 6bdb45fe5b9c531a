//! Freehand ink strokes.

use super::{Drawable, EntityId, Rgba};
use crate::geometry::{InkPoint, points_bounds};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Minimum rendered line width.
const MIN_SEGMENT_WIDTH: f64 = 0.5;
/// Highlighters are drawn wider than their nominal width.
const HIGHLIGHTER_WIDTH_SCALE: f64 = 2.5;
/// Highlighters are drawn translucent regardless of their color alpha.
const HIGHLIGHTER_ALPHA: f64 = 0.4;
/// Pencils are slightly thinner than pens at the same pressure.
const PENCIL_WIDTH_SCALE: f64 = 0.8;
/// Tilt magnitude below which a pencil is treated as upright.
const PENCIL_TILT_THRESHOLD: f64 = 0.1;

/// The instrument a stroke was drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PenKind {
    #[default]
    Pen,
    Pencil,
    Highlighter,
    /// Only used to track an erase gesture; never stored in a document.
    Eraser,
}

impl PenKind {
    pub fn is_eraser(self) -> bool {
        self == PenKind::Eraser
    }

    /// Persisted tag.
    pub fn as_str(self) -> &'static str {
        match self {
            PenKind::Pen => "pen",
            PenKind::Pencil => "pencil",
            PenKind::Highlighter => "highlighter",
            PenKind::Eraser => "eraser",
        }
    }
}

/// One straight piece of a rendered stroke.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeSegment {
    pub from: Point,
    pub to: Point,
    pub width: f64,
    pub color: Rgba,
}

/// An ordered sequence of pen samples.
#[derive(Debug, Clone)]
pub struct Stroke {
    pub(crate) id: EntityId,
    pub points: Vec<InkPoint>,
    pub pen_kind: PenKind,
    pub color: Rgba,
    pub width: f64,
}

impl Stroke {
    /// Create an empty stroke.
    pub fn new(pen_kind: PenKind, color: Rgba, width: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            points: Vec::new(),
            pen_kind,
            color,
            width,
        }
    }

    /// Create a black pen stroke of width 2 from existing points.
    pub fn from_points(points: Vec<InkPoint>) -> Self {
        Self {
            points,
            ..Self::new(PenKind::Pen, Rgba::black(), 2.0)
        }
    }

    /// A stroke with the same pen, color and width but different points.
    pub fn with_same_style(&self, points: Vec<InkPoint>) -> Self {
        Self {
            points,
            ..Self::new(self.pen_kind, self.color, self.width)
        }
    }

    pub fn add_point(&mut self, point: InkPoint) {
        self.points.push(point);
    }

    /// Append `point` only if it is farther than `threshold` from the last sample.
    ///
    /// Returns whether the point was kept.
    pub fn add_sampled(&mut self, point: InkPoint, threshold: f64) -> bool {
        match self.points.last() {
            Some(last) if last.distance_to(point.pos()) <= threshold => false,
            _ => {
                self.points.push(point);
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Color used for drawing; highlighters are forced translucent.
    pub fn render_color(&self) -> Rgba {
        match self.pen_kind {
            PenKind::Highlighter => self.color.with_alpha(HIGHLIGHTER_ALPHA),
            _ => self.color,
        }
    }

    /// Pressure- and tilt-aware render description, one segment per point pair.
    ///
    /// Eraser strokes and strokes with fewer than two points produce nothing.
    pub fn segments(&self) -> Vec<StrokeSegment> {
        if self.pen_kind.is_eraser() {
            return Vec::new();
        }
        let base = self.render_color();
        self.points
            .windows(2)
            .map(|pair| {
                let (p1, p2) = (pair[0], pair[1]);
                let (width, color) = match self.pen_kind {
                    PenKind::Highlighter => (self.width * HIGHLIGHTER_WIDTH_SCALE, base),
                    PenKind::Pencil => {
                        let mut width = self.width * p1.pressure * PENCIL_WIDTH_SCALE;
                        let mut color = base;
                        let tilt = p1.tilt();
                        if tilt > PENCIL_TILT_THRESHOLD {
                            width *= 1.0 + tilt * 0.5;
                            color.a *= (1.0 - tilt * 0.2).max(0.6);
                        }
                        (width, color)
                    }
                    _ => (self.width * p1.pressure, base),
                };
                StrokeSegment {
                    from: p1.pos(),
                    to: p2.pos(),
                    width: width.max(MIN_SEGMENT_WIDTH),
                    color,
                }
            })
            .collect()
    }

    /// Indices of samples within `radius` of `point`.
    pub fn indices_within(&self, point: Point, radius: f64) -> Vec<usize> {
        self.points
            .iter()
            .enumerate()
            .filter(|(_, p)| p.distance_to(point) <= radius)
            .map(|(i, _)| i)
            .collect()
    }
}

impl PartialEq for Stroke {
    fn eq(&self, other: &Self) -> bool {
        self.points == other.points
            && self.pen_kind == other.pen_kind
            && self.color == other.color
            && self.width == other.width
    }
}

impl Drawable for Stroke {
    fn id(&self) -> EntityId {
        self.id
    }

    /// Bounds of the samples, padded by the stroke width. Empty strokes give a zero rect.
    fn bounds(&self) -> Rect {
        match points_bounds(&self.points) {
            Some(rect) => rect.inflate(self.width, self.width),
            None => Rect::ZERO,
        }
    }

    fn translate(&mut self, delta: Vec2) {
        for p in &mut self.points {
            p.translate(delta);
        }
    }

    /// Sample-based test: any point within `tolerance` counts as a hit.
    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.points.iter().any(|p| p.distance_to(point) <= tolerance)
    }

    fn regenerate_id(&mut self) {
        self.id = Uuid::new_v4();
    }
}
