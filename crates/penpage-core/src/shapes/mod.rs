//! Drawable entities: freehand strokes, geometric shapes and text boxes.

mod shape;
mod stroke;
mod text_box;

pub use shape::{LineStyle, Shape, ShapeKind, ShapeOutline};
pub use stroke::{PenKind, Stroke, StrokeSegment};
pub use text_box::TextBox;

use kurbo::{Point, Rect, Vec2};
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for document entities.
///
/// Ids live only in memory; a decoded document gets fresh ones.
pub type EntityId = Uuid;

/// RGBA color with `f64` channels in `[0, 1]`.
///
/// Persisted as a four element array `[r, g, b, a]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub const fn black() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }

    pub const fn white() -> Self {
        Self::new(1.0, 1.0, 1.0, 1.0)
    }

    /// Same color with a different alpha.
    pub fn with_alpha(self, a: f64) -> Self {
        Self { a, ..self }
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::black()
    }
}

impl From<[f64; 4]> for Rgba {
    fn from([r, g, b, a]: [f64; 4]) -> Self {
        Self { r, g, b, a }
    }
}

impl From<Rgba> for [f64; 4] {
    fn from(c: Rgba) -> Self {
        [c.r, c.g, c.b, c.a]
    }
}

impl From<Rgba> for Color {
    fn from(c: Rgba) -> Self {
        Color::new([c.r as f32, c.g as f32, c.b as f32, c.a as f32])
    }
}

/// Which of the three entity collections an entity lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Stroke,
    Shape,
    TextBox,
}

/// Common contract for everything stored in a document.
pub trait Drawable {
    /// Stable identifier.
    fn id(&self) -> EntityId;

    /// Bounding box in document coordinates.
    fn bounds(&self) -> Rect;

    /// Move by an offset in document units.
    fn translate(&mut self, delta: Vec2);

    /// Check if a document point is within `tolerance` of this entity.
    fn hit_test(&self, point: Point, tolerance: f64) -> bool;

    /// Give the entity a new identity (used when pasting copies).
    fn regenerate_id(&mut self);
}

/// Owned entity of any kind; used for clipboard and history payloads.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Stroke(Stroke),
    Shape(Shape),
    TextBox(TextBox),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Stroke(_) => EntityKind::Stroke,
            Entity::Shape(_) => EntityKind::Shape,
            Entity::TextBox(_) => EntityKind::TextBox,
        }
    }

    fn as_drawable(&self) -> &dyn Drawable {
        match self {
            Entity::Stroke(s) => s,
            Entity::Shape(s) => s,
            Entity::TextBox(t) => t,
        }
    }

    fn as_drawable_mut(&mut self) -> &mut dyn Drawable {
        match self {
            Entity::Stroke(s) => s,
            Entity::Shape(s) => s,
            Entity::TextBox(t) => t,
        }
    }
}

impl Drawable for Entity {
    fn id(&self) -> EntityId {
        self.as_drawable().id()
    }

    fn bounds(&self) -> Rect {
        self.as_drawable().bounds()
    }

    fn translate(&mut self, delta: Vec2) {
        self.as_drawable_mut().translate(delta);
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.as_drawable().hit_test(point, tolerance)
    }

    fn regenerate_id(&mut self) {
        self.as_drawable_mut().regenerate_id();
    }
}

impl From<Stroke> for Entity {
    fn from(s: Stroke) -> Self {
        Entity::Stroke(s)
    }
}

impl From<Shape> for Entity {
    fn from(s: Shape) -> Self {
        Entity::Shape(s)
    }
}

impl From<TextBox> for Entity {
    fn from(t: TextBox) -> Self {
        Entity::TextBox(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::InkPoint;

    #[test]
    fn test_rgba_array_roundtrip() {
        let c = Rgba::new(0.1, 0.2, 0.3, 0.4);
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, "[0.1,0.2,0.3,0.4]");
        let back: Rgba = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn test_rgba_to_peniko() {
        let color: Color = Rgba::new(1.0, 0.5, 0.0, 0.25).into();
        assert_eq!(color.components, [1.0, 0.5, 0.0, 0.25]);
    }

    #[test]
    fn test_entity_dispatch() {
        let stroke = Stroke::from_points(vec![InkPoint::new(0.0, 0.0), InkPoint::new(10.0, 0.0)]);
        let id = stroke.id();
        let mut entity = Entity::from(stroke);
        assert_eq!(entity.kind(), EntityKind::Stroke);
        assert_eq!(entity.id(), id);

        entity.translate(Vec2::new(5.0, 5.0));
        let b = entity.bounds();
        assert!((b.x0 - (5.0 - 2.0)).abs() < 1e-9);

        entity.regenerate_id();
        assert_ne!(entity.id(), id);
    }
}
