//! Tool selection and per-tool settings.

use crate::eraser::EraserMode;
use crate::shapes::{LineStyle, PenKind, Rgba, ShapeKind, TextBox};
use serde::{Deserialize, Serialize};

/// What a pointer press does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Tool {
    /// Freehand ink (or erasing, when the pen kind is `Eraser`).
    #[default]
    Draw,
    Shape(ShapeKind),
    Select,
    Text,
}

/// Tool configuration passed into every gesture start.
///
/// Pen and eraser widths are remembered separately so switching between
/// them restores each one's last size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolState {
    pub tool: Tool,
    pub pen_kind: PenKind,
    pub color: Rgba,
    pub pen_width: f64,
    pub eraser_width: f64,
    pub eraser_mode: EraserMode,
    pub shape_filled: bool,
    pub line_style: LineStyle,
    pub font_size: f64,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl Default for ToolState {
    fn default() -> Self {
        Self {
            tool: Tool::Draw,
            pen_kind: PenKind::Pen,
            color: Rgba::black(),
            pen_width: 3.0,
            eraser_width: 20.0,
            eraser_mode: EraserMode::Pixel,
            shape_filled: false,
            line_style: LineStyle::Solid,
            font_size: TextBox::DEFAULT_FONT_SIZE,
            bold: false,
            italic: false,
            underline: false,
        }
    }
}

impl ToolState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch to freehand drawing with the given pen.
    pub fn set_pen_kind(&mut self, pen_kind: PenKind) {
        self.tool = Tool::Draw;
        self.pen_kind = pen_kind;
        log::info!("Pen kind changed to {}, width: {}", pen_kind.as_str(), self.width());
    }

    pub fn set_shape(&mut self, kind: ShapeKind) {
        self.tool = Tool::Shape(kind);
    }

    /// Width of the active instrument.
    pub fn width(&self) -> f64 {
        if self.is_erasing() {
            self.eraser_width
        } else {
            self.pen_width
        }
    }

    /// Set the width of the active instrument only.
    pub fn set_width(&mut self, width: f64) {
        if self.is_erasing() {
            self.eraser_width = width;
        } else {
            self.pen_width = width;
        }
    }

    pub fn is_erasing(&self) -> bool {
        self.tool == Tool::Draw && self.pen_kind.is_eraser()
    }

    /// An empty text box carrying the current text formatting.
    pub fn new_text_box(&self, position: kurbo::Point) -> TextBox {
        let mut text_box = TextBox::new(position);
        text_box.font_size = self.font_size;
        text_box.color = self.color;
        text_box.bold = self.bold;
        text_box.italic = self.italic;
        text_box.underline = self.underline;
        text_box
    }
}
