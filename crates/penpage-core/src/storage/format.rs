//! The versioned `.n2i` note format.
//!
//! Records mirror the on-disk JSON object. Every kind is written as a string
//! tag. Fields added after the first release carry defaults so that older
//! files keep loading.

use super::{StorageError, StorageResult};
use crate::document::{Document, Layer, NoteKind, PageTemplate};
use crate::geometry::InkPoint;
use crate::shapes::{LineStyle, PenKind, Rgba, Shape, ShapeKind, Stroke, TextBox};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Version written into every saved note.
pub const FORMAT_VERSION: &str = "1.0";
/// File extension of a saved note.
pub const FILE_EXTENSION: &str = "n2i";

fn default_version() -> String {
    FORMAT_VERSION.to_string()
}

fn default_font_size() -> f64 {
    TextBox::DEFAULT_FONT_SIZE
}

fn default_font_family() -> String {
    TextBox::DEFAULT_FONT_FAMILY.to_string()
}

fn default_text_width() -> f64 {
    TextBox::DEFAULT_WIDTH
}

/// A whole note as stored.
///
/// Canvas notes use `strokes`/`shapes`/`text_boxes`; paged notes use the
/// page-keyed maps. The other group is omitted when writing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteRecord {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub note_type: NoteKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default = "Rgba::white")]
    pub background_color: Rgba,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strokes: Option<Vec<StrokeRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shapes: Option<Vec<ShapeRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_boxes: Option<Vec<TextBoxRecord>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_template: Option<PageTemplate>,
    /// Signed so that a corrupt negative page number clamps instead of failing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_page: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<BTreeMap<u32, Vec<StrokeRecord>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_shapes: Option<BTreeMap<u32, Vec<ShapeRecord>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_text_boxes: Option<BTreeMap<u32, Vec<TextBoxRecord>>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeRecord {
    pub points: Vec<InkPoint>,
    pub pen_type: PenKind,
    pub color: Rgba,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeRecord {
    pub shape_type: ShapeKind,
    pub start_x: f64,
    pub start_y: f64,
    pub end_x: f64,
    pub end_y: f64,
    pub color: Rgba,
    pub width: f64,
    #[serde(default)]
    pub filled: bool,
    #[serde(default)]
    pub line_style: LineStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBoxRecord {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default)]
    pub color: Rgba,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub underline: bool,
    #[serde(default = "default_text_width")]
    pub width: f64,
}

impl From<&Stroke> for StrokeRecord {
    fn from(stroke: &Stroke) -> Self {
        Self {
            points: stroke.points.clone(),
            pen_type: stroke.pen_kind,
            color: stroke.color,
            width: stroke.width,
        }
    }
}

impl From<StrokeRecord> for Stroke {
    fn from(record: StrokeRecord) -> Self {
        let mut stroke = Stroke::new(record.pen_type, record.color, record.width);
        stroke.points = record.points;
        stroke
    }
}

impl From<&Shape> for ShapeRecord {
    fn from(shape: &Shape) -> Self {
        Self {
            shape_type: shape.kind,
            start_x: shape.start.x,
            start_y: shape.start.y,
            end_x: shape.end.x,
            end_y: shape.end.y,
            color: shape.color,
            width: shape.width,
            filled: shape.filled,
            line_style: shape.line_style,
        }
    }
}

impl From<ShapeRecord> for Shape {
    fn from(r: ShapeRecord) -> Self {
        Shape::new(r.shape_type, Point::new(r.start_x, r.start_y), Point::new(r.end_x, r.end_y))
            .with_style(r.color, r.width, r.filled, r.line_style)
    }
}

impl From<&TextBox> for TextBoxRecord {
    fn from(t: &TextBox) -> Self {
        Self {
            x: t.position.x,
            y: t.position.y,
            text: t.text.clone(),
            font_size: t.font_size,
            font_family: t.font_family.clone(),
            color: t.color,
            bold: t.bold,
            italic: t.italic,
            underline: t.underline,
            width: t.width,
        }
    }
}

impl From<TextBoxRecord> for TextBox {
    fn from(r: TextBoxRecord) -> Self {
        let mut text_box = TextBox::new(Point::new(r.x, r.y)).with_text(r.text);
        text_box.font_size = r.font_size;
        text_box.font_family = r.font_family;
        text_box.color = r.color;
        text_box.bold = r.bold;
        text_box.italic = r.italic;
        text_box.underline = r.underline;
        text_box.width = r.width;
        text_box
    }
}

fn layer_records(layer: &Layer) -> (Vec<StrokeRecord>, Vec<ShapeRecord>, Vec<TextBoxRecord>) {
    (
        layer.strokes().iter().map(StrokeRecord::from).collect(),
        layer.shapes().iter().map(ShapeRecord::from).collect(),
        layer.text_boxes().iter().map(TextBoxRecord::from).collect(),
    )
}

/// Build the record for `document`.
pub fn encode(document: &Document) -> NoteRecord {
    let mut record = NoteRecord {
        version: default_version(),
        note_type: document.note_kind(),
        width: Some(document.width),
        height: Some(document.height),
        background_color: document.background_color,
        strokes: None,
        shapes: None,
        text_boxes: None,
        page_template: None,
        current_page: None,
        pages: None,
        page_shapes: None,
        page_text_boxes: None,
    };

    if document.is_paged() {
        let mut pages = BTreeMap::new();
        let mut page_shapes = BTreeMap::new();
        let mut page_text_boxes = BTreeMap::new();
        for (number, layer) in document.pages() {
            let (strokes, shapes, text_boxes) = layer_records(layer);
            pages.insert(number, strokes);
            page_shapes.insert(number, shapes);
            page_text_boxes.insert(number, text_boxes);
        }
        record.page_template = Some(document.page_template);
        record.current_page = Some(i64::from(document.current_page()));
        record.pages = Some(pages);
        record.page_shapes = Some(page_shapes);
        record.page_text_boxes = Some(page_text_boxes);
    } else {
        let (strokes, shapes, text_boxes) = layer_records(document.current());
        record.strokes = Some(strokes);
        record.shapes = Some(shapes);
        record.text_boxes = Some(text_boxes);
    }
    record
}

fn fill_layer(
    layer: &mut Layer,
    strokes: Vec<StrokeRecord>,
    shapes: Vec<ShapeRecord>,
    text_boxes: Vec<TextBoxRecord>,
) {
    for stroke in strokes {
        layer.add_stroke(stroke.into());
    }
    for shape in shapes {
        layer.add_shape(shape.into());
    }
    for text_box in text_boxes {
        layer.add_text_box(text_box.into());
    }
}

/// Rebuild a document from its record, applying defaults for absent fields.
///
/// Every page number named by any of the three page maps becomes a page;
/// content filed under page 0 lands on page 1. Eraser strokes are dropped. Fails only for a format version this reader
/// does not understand.
pub fn decode(record: NoteRecord) -> StorageResult<Document> {
    let major = record.version.split('.').next().unwrap_or_default();
    if major != "1" {
        return Err(StorageError::Format(format!("version {}", record.version)));
    }

    let kind = record.note_type;
    let default_size = kind.default_size();
    let size = Size::new(
        record.width.unwrap_or(default_size.width),
        record.height.unwrap_or(default_size.height),
    );
    let template = record.page_template.unwrap_or_default();

    let document = match kind {
        NoteKind::Canvas => {
            let mut layer = Layer::new();
            fill_layer(
                &mut layer,
                record.strokes.unwrap_or_default(),
                record.shapes.unwrap_or_default(),
                record.text_boxes.unwrap_or_default(),
            );
            let mut document = Document::from_canvas(size, record.background_color, layer);
            document.page_template = template;
            document
        }
        NoteKind::PagedA4 => {
            let mut stroke_pages = record.pages.unwrap_or_else(|| BTreeMap::from([(1, Vec::new())]));
            let mut shape_pages = record.page_shapes.unwrap_or_default();
            let mut text_pages = record.page_text_boxes.unwrap_or_default();

            let mut numbers: Vec<u32> = stroke_pages.keys().copied().collect();
            numbers.extend(shape_pages.keys().copied());
            numbers.extend(text_pages.keys().copied());
            numbers.sort_unstable();
            numbers.dedup();

            let mut pages: BTreeMap<u32, Layer> = BTreeMap::new();
            for number in numbers {
                if number == 0 {
                    log::warn!("Page 0 in note file, merging its content into page 1");
                }
                fill_layer(
                    pages.entry(number.max(1)).or_default(),
                    stroke_pages.remove(&number).unwrap_or_default(),
                    shape_pages.remove(&number).unwrap_or_default(),
                    text_pages.remove(&number).unwrap_or_default(),
                );
            }

            let current = record.current_page.unwrap_or(1).clamp(1, i64::from(u32::MAX));
            let current = u32::try_from(current).unwrap_or(1);
            Document::from_pages(template, size, record.background_color, pages, current)
        }
    };
    Ok(document)
}

/// Serialize `document` as indented JSON.
pub fn to_json(document: &Document) -> StorageResult<String> {
    Ok(serde_json::to_string_pretty(&encode(document))?)
}

/// Parse a note from JSON.
pub fn from_json(json: &str) -> StorageResult<Document> {
    decode(serde_json::from_str(json)?)
}
