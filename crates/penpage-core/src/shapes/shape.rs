//! Geometric shapes defined by a drag from `start` to `end`.

use super::{Drawable, EntityId, Rgba};
use crate::geometry::{rect_contains, rect_from_corners};
use kurbo::{BezPath, Ellipse, Point, Rect, Shape as _, Vec2};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use uuid::Uuid;

/// Radius below which an ellipse is not drawn.
const MIN_ELLIPSE_RADIUS: f64 = 0.1;
/// Upper bound on arrow head length.
const ARROW_HEAD_MAX: f64 = 20.0;
/// Flattening tolerance for curved outlines.
const PATH_TOLERANCE: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    #[serde(rename = "straight_line")]
    Line,
    Rectangle,
    Circle,
    Triangle,
    Pentagon,
    Arrow,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 6] = [
        ShapeKind::Line,
        ShapeKind::Rectangle,
        ShapeKind::Circle,
        ShapeKind::Triangle,
        ShapeKind::Pentagon,
        ShapeKind::Arrow,
    ];

    /// Whether the `filled` flag has any effect on this kind.
    pub fn can_fill(self) -> bool {
        !matches!(self, ShapeKind::Line | ShapeKind::Arrow)
    }
}

/// Outline dash style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

impl LineStyle {
    /// Dash pattern used while a shape is being dragged out.
    pub const PREVIEW_DASH: [f64; 2] = [5.0, 5.0];

    /// Dash lengths for the renderer, `None` for a continuous line.
    pub fn dash_pattern(self) -> Option<[f64; 2]> {
        match self {
            LineStyle::Solid => None,
            LineStyle::Dashed => Some([10.0, 5.0]),
            LineStyle::Dotted => Some([2.0, 4.0]),
        }
    }
}

/// Render description of a shape.
#[derive(Debug, Clone)]
pub struct ShapeOutline {
    /// Main outline; stroked, or filled when `fill` is set.
    pub path: BezPath,
    pub fill: bool,
    /// Arrow head triangle, always filled.
    pub head: Option<BezPath>,
}

#[derive(Debug, Clone)]
pub struct Shape {
    pub(crate) id: EntityId,
    pub kind: ShapeKind,
    pub start: Point,
    pub end: Point,
    pub color: Rgba,
    pub width: f64,
    pub filled: bool,
    pub line_style: LineStyle,
}

impl Shape {
    pub fn new(kind: ShapeKind, start: Point, end: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            start,
            end,
            color: Rgba::black(),
            width: 2.0,
            filled: false,
            line_style: LineStyle::Solid,
        }
    }

    pub fn with_style(mut self, color: Rgba, width: f64, filled: bool, line_style: LineStyle) -> Self {
        self.color = color;
        self.width = width;
        self.filled = filled;
        self.line_style = line_style;
        self
    }

    /// The dragged box, unpadded.
    pub fn frame(&self) -> Rect {
        rect_from_corners(self.start, self.end)
    }

    /// Build the render description, or `None` for degenerate geometry.
    pub fn outline(&self) -> Option<ShapeOutline> {
        let frame = self.frame();
        let fill = self.filled && self.kind.can_fill();
        let path = match self.kind {
            ShapeKind::Line => {
                let mut path = BezPath::new();
                path.move_to(self.start);
                path.line_to(self.end);
                path
            }
            ShapeKind::Rectangle => frame.to_path(PATH_TOLERANCE),
            ShapeKind::Circle => {
                let radii = Vec2::new(frame.width() / 2.0, frame.height() / 2.0);
                if radii.x < MIN_ELLIPSE_RADIUS || radii.y < MIN_ELLIPSE_RADIUS {
                    return None;
                }
                Ellipse::new(frame.center(), radii, 0.0).to_path(PATH_TOLERANCE)
            }
            ShapeKind::Triangle => {
                // Apex at the top-centre of the drag, base along the release edge.
                let mut path = BezPath::new();
                path.move_to(Point::new(frame.center().x, self.start.y));
                path.line_to(Point::new(self.start.x, self.end.y));
                path.line_to(self.end);
                path.close_path();
                path
            }
            ShapeKind::Pentagon => {
                let center = frame.center();
                let radius = frame.width().min(frame.height()) / 2.0;
                let mut path = BezPath::new();
                for i in 0..5 {
                    let angle = f64::from(i) * 2.0 * PI / 5.0 - PI / 2.0;
                    let p = center + Vec2::from_angle(angle) * radius;
                    if i == 0 {
                        path.move_to(p);
                    } else {
                        path.line_to(p);
                    }
                }
                path.close_path();
                path
            }
            ShapeKind::Arrow => return self.arrow_outline(),
        };
        Some(ShapeOutline { path, fill, head: None })
    }

    fn arrow_outline(&self) -> Option<ShapeOutline> {
        let shaft = self.end - self.start;
        let len = shaft.hypot();
        if len == 0.0 {
            return None;
        }
        let dir = shaft / len;
        let perp = Vec2::new(-dir.y, dir.x);
        let head_len = ARROW_HEAD_MAX.min(len * 0.3);
        let half_width = head_len * 0.6 / 2.0;
        let base = self.end - dir * head_len;

        let mut path = BezPath::new();
        path.move_to(self.start);
        path.line_to(self.end);

        let mut head = BezPath::new();
        head.move_to(self.end);
        head.line_to(base + perp * half_width);
        head.line_to(base - perp * half_width);
        head.close_path();

        Some(ShapeOutline {
            path,
            fill: false,
            head: Some(head),
        })
    }
}

impl PartialEq for Shape {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.start == other.start
            && self.end == other.end
            && self.color == other.color
            && self.width == other.width
            && self.filled == other.filled
            && self.line_style == other.line_style
    }
}

impl Drawable for Shape {
    fn id(&self) -> EntityId {
        self.id
    }

    fn bounds(&self) -> Rect {
        self.frame().inflate(self.width, self.width)
    }

    fn translate(&mut self, delta: Vec2) {
        self.start += delta;
        self.end += delta;
    }

    /// Box test against the padded bounds grown by `tolerance`.
    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        rect_contains(self.bounds().inflate(tolerance, tolerance), point)
    }

    fn regenerate_id(&mut self) {
        self.id = Uuid::new_v4();
    }
}
