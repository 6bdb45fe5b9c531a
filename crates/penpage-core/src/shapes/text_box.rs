//! Free-floating text annotations.

use super::{Drawable, EntityId, Rgba};
use crate::geometry::rect_contains;
use kurbo::{Point, Rect, Vec2};
use uuid::Uuid;

/// Line height as a multiple of the font size.
const LINE_HEIGHT_FACTOR: f64 = 1.5;

#[derive(Debug, Clone)]
pub struct TextBox {
    pub(crate) id: EntityId,
    /// Top-left corner.
    pub position: Point,
    pub text: String,
    pub font_size: f64,
    pub font_family: String,
    pub color: Rgba,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    /// Wrap width.
    pub width: f64,
}

impl TextBox {
    pub const DEFAULT_FONT_SIZE: f64 = 16.0;
    pub const DEFAULT_FONT_FAMILY: &'static str = "Sans";
    pub const DEFAULT_WIDTH: f64 = 200.0;

    /// Create an empty text box at `position` with default formatting.
    pub fn new(position: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            text: String::new(),
            font_size: Self::DEFAULT_FONT_SIZE,
            font_family: Self::DEFAULT_FONT_FAMILY.to_string(),
            color: Rgba::black(),
            bold: false,
            italic: false,
            underline: false,
            width: Self::DEFAULT_WIDTH,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Number of lines; an empty box still occupies one.
    pub fn line_count(&self) -> usize {
        self.text.matches('\n').count() + 1
    }

    /// Estimated height from line count and font size.
    pub fn height(&self) -> f64 {
        self.line_count() as f64 * self.font_size * LINE_HEIGHT_FACTOR
    }

    pub fn push_char(&mut self, c: char) {
        self.text.push(c);
    }

    pub fn push_str(&mut self, s: &str) {
        self.text.push_str(s);
    }

    /// Remove the last character. Returns `false` if the box was already empty.
    pub fn backspace(&mut self) -> bool {
        self.text.pop().is_some()
    }

    pub fn newline(&mut self) {
        self.text.push('\n');
    }

    /// Whether the box holds only whitespace.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

impl PartialEq for TextBox {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position
            && self.text == other.text
            && self.font_size == other.font_size
            && self.font_family == other.font_family
            && self.color == other.color
            && self.bold == other.bold
            && self.italic == other.italic
            && self.underline == other.underline
            && self.width == other.width
    }
}

impl Drawable for TextBox {
    fn id(&self) -> EntityId {
        self.id
    }

    fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.position, (self.width, self.height()))
    }

    fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        rect_contains(self.bounds().inflate(tolerance, tolerance), point)
    }

    fn regenerate_id(&mut self) {
        self.id = Uuid::new_v4();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let tb = TextBox::new(Point::new(10.0, 20.0));
        assert!((tb.font_size - 16.0).abs() < f64::EPSILON);
        assert_eq!(tb.font_family, "Sans");
        assert!((tb.width - 200.0).abs() < f64::EPSILON);
        assert!(tb.is_blank());
    }

    #[test]
    fn test_bounds_grow_with_lines() {
        let mut tb = TextBox::new(Point::new(10.0, 20.0));
        assert_eq!(tb.bounds(), Rect::new(10.0, 20.0, 210.0, 44.0));
        tb.push_str("hello");
        tb.newline();
        tb.push_char('x');
        assert_eq!(tb.line_count(), 2);
        assert_eq!(tb.bounds(), Rect::new(10.0, 20.0, 210.0, 68.0));
    }

    #[test]
    fn test_backspace() {
        let mut tb = TextBox::new(Point::ZERO).with_text("ab");
        assert!(tb.backspace());
        assert_eq!(tb.text, "a");
        assert!(tb.backspace());
        assert!(!tb.backspace());
    }

    #[test]
    fn test_blank_detection() {
        let tb = TextBox::new(Point::ZERO).with_text("  \n ");
        assert!(tb.is_blank());
        let tb = TextBox::new(Point::ZERO).with_text(" a ");
        assert!(!tb.is_blank());
    }
}
