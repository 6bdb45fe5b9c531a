//! Draw dispatch: walks a document in paint order and hands each item to a sink.
//!
//! The engine never rasterizes anything itself. Backends implement
//! [`DrawSink`] and receive entities with their render descriptions.

use crate::camera::PageLayout;
use crate::document::{Document, Layer, PageTemplate, TemplateMark};
use crate::shapes::{LineStyle, PenKind, Shape, ShapeOutline, Stroke, StrokeSegment, TextBox};
use kurbo::{Affine, Point, Rect, Size};

/// Placement of one page in document space.
#[derive(Debug, Clone)]
pub struct PageFrame {
    pub number: u32,
    /// Page-to-document transform (a translation to the page origin).
    pub transform: Affine,
    pub size: Size,
    pub template: PageTemplate,
    pub marks: Vec<TemplateMark>,
    /// Previews and the selection overlay are only drawn on the current page.
    pub is_current: bool,
}

/// Rendering backend interface.
///
/// Coordinates are page-relative inside `begin_page`/`end_page` for paged
/// documents and document-space for a canvas.
pub trait DrawSink {
    fn begin_page(&mut self, _frame: &PageFrame) {}

    fn end_page(&mut self, _number: u32) {}

    fn draw_stroke(&mut self, stroke: &Stroke, segments: &[StrokeSegment]);

    /// `dash` is the pattern to stroke the outline with, if any.
    fn draw_shape(&mut self, shape: &Shape, outline: &ShapeOutline, dash: Option<[f64; 2]>, preview: bool);

    /// `active` is set for the box currently receiving keystrokes.
    fn draw_text_box(&mut self, text_box: &TextBox, active: bool);

    fn draw_marquee(&mut self, _rect: Rect) {}

    fn draw_selection(&mut self, _bounds: Rect, _handles: &[Point; 8]) {}
}

/// In-progress interaction state drawn above the committed entities.
#[derive(Debug, Default, Clone, Copy)]
pub struct Overlay<'a> {
    pub stroke: Option<&'a Stroke>,
    pub shape_preview: Option<&'a Shape>,
    pub active_text: Option<&'a TextBox>,
    pub marquee: Option<Rect>,
    pub selection: Option<(Rect, [Point; 8])>,
}

impl<'a> Overlay<'a> {
    pub fn with_stroke(mut self, stroke: Option<&'a Stroke>) -> Self {
        self.stroke = stroke;
        self
    }

    pub fn with_shape_preview(mut self, shape: Option<&'a Shape>) -> Self {
        self.shape_preview = shape;
        self
    }

    pub fn with_active_text(mut self, text_box: Option<&'a TextBox>) -> Self {
        self.active_text = text_box;
        self
    }

    pub fn with_marquee(mut self, rect: Option<Rect>) -> Self {
        self.marquee = rect;
        self
    }

    pub fn with_selection(mut self, selection: Option<(Rect, [Point; 8])>) -> Self {
        self.selection = selection;
        self
    }
}

fn draw_stroke(sink: &mut impl DrawSink, stroke: &Stroke) {
    if stroke.pen_kind.is_eraser() {
        return;
    }
    sink.draw_stroke(stroke, &stroke.segments());
}

fn draw_shape(sink: &mut impl DrawSink, shape: &Shape, preview: bool) {
    let Some(outline) = shape.outline() else {
        return;
    };
    let dash = if preview {
        Some(LineStyle::PREVIEW_DASH)
    } else {
        shape.line_style.dash_pattern()
    };
    sink.draw_shape(shape, &outline, dash, preview);
}

/// Draw committed entities: highlighters, other ink, shapes, then text.
pub fn draw_layer(sink: &mut impl DrawSink, layer: &Layer) {
    let strokes = layer.strokes();
    for stroke in strokes.iter().filter(|s| s.pen_kind == PenKind::Highlighter) {
        draw_stroke(sink, stroke);
    }
    for stroke in strokes.iter().filter(|s| s.pen_kind != PenKind::Highlighter) {
        draw_stroke(sink, stroke);
    }
    for shape in layer.shapes() {
        draw_shape(sink, shape, false);
    }
    for text_box in layer.text_boxes() {
        sink.draw_text_box(text_box, false);
    }
}

/// Draw interaction state above the committed layer.
pub fn draw_overlay(sink: &mut impl DrawSink, overlay: &Overlay<'_>) {
    if let Some(stroke) = overlay.stroke.filter(|s| !s.is_empty()) {
        draw_stroke(sink, stroke);
    }
    if let Some(shape) = overlay.shape_preview {
        draw_shape(sink, shape, true);
    }
    if let Some(text_box) = overlay.active_text {
        sink.draw_text_box(text_box, true);
    }
    if let Some(rect) = overlay.marquee {
        sink.draw_marquee(rect);
    }
    if let Some((bounds, handles)) = &overlay.selection {
        sink.draw_selection(*bounds, handles);
    }
}

/// Draw a whole document. Paged documents are bracketed page by page.
pub fn draw_document(
    sink: &mut impl DrawSink,
    document: &Document,
    layout: &PageLayout,
    zoom: f64,
    overlay: &Overlay<'_>,
) {
    if !document.is_paged() {
        draw_layer(sink, document.current());
        draw_overlay(sink, overlay);
        return;
    }

    let size = document.size();
    let marks = document.page_template.marks(size);
    for (number, layer) in document.pages() {
        let origin = layout.page_origin(number, zoom);
        let frame = PageFrame {
            number,
            transform: Affine::translate(origin.to_vec2()),
            size,
            template: document.page_template,
            marks: marks.clone(),
            is_current: number == document.current_page(),
        };
        sink.begin_page(&frame);
        draw_layer(sink, layer);
        if frame.is_current {
            draw_overlay(sink, overlay);
        }
        sink.end_page(number);
    }
}
