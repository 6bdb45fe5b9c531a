//! Document model: a single canvas or a stack of A4 pages.

use crate::geometry::union_all;
use crate::shapes::{Drawable, Entity, EntityId, EntityKind, Rgba, Shape, Stroke, TextBox};
use kurbo::{Line, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Canonical canvas size.
pub const CANVAS_SIZE: Size = Size::new(1920.0, 1080.0);
/// A4 at 96 DPI.
pub const A4_SIZE: Size = Size::new(794.0, 1123.0);

static EMPTY_LAYER: Layer = Layer::new();

/// How a document is partitioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NoteKind {
    #[default]
    #[serde(rename = "canvas")]
    Canvas,
    #[serde(rename = "a4_notes")]
    PagedA4,
}

impl NoteKind {
    /// Default page size for this kind.
    pub fn default_size(self) -> Size {
        match self {
            NoteKind::Canvas => CANVAS_SIZE,
            NoteKind::PagedA4 => A4_SIZE,
        }
    }
}

/// Background guides printed on every page of a paged document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageTemplate {
    #[default]
    Blank,
    Ruled,
    Grid,
    DotGrid,
}

/// A single guide mark in page-relative coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TemplateMark {
    Line(Line),
    Dot(Point),
}

impl PageTemplate {
    const RULED_SPACING: f64 = 30.0;
    const RULED_TOP: f64 = 50.0;
    const RULED_INSET: f64 = 40.0;
    const RULED_BOTTOM: f64 = 20.0;
    const GRID_SPACING: f64 = 25.0;
    const DOT_SPACING: f64 = 20.0;

    /// Guide marks for a page of the given size.
    pub fn marks(self, page: Size) -> Vec<TemplateMark> {
        let mut marks = Vec::new();
        match self {
            PageTemplate::Blank => {}
            PageTemplate::Ruled => {
                let mut y = Self::RULED_TOP;
                while y < page.height - Self::RULED_BOTTOM {
                    marks.push(TemplateMark::Line(Line::new(
                        (Self::RULED_INSET, y),
                        (page.width - Self::RULED_INSET, y),
                    )));
                    y += Self::RULED_SPACING;
                }
            }
            PageTemplate::Grid => {
                let mut x = 0.0;
                while x <= page.width {
                    marks.push(TemplateMark::Line(Line::new((x, 0.0), (x, page.height))));
                    x += Self::GRID_SPACING;
                }
                let mut y = 0.0;
                while y <= page.height {
                    marks.push(TemplateMark::Line(Line::new((0.0, y), (page.width, y))));
                    y += Self::GRID_SPACING;
                }
            }
            PageTemplate::DotGrid => {
                let mut x = Self::DOT_SPACING;
                while x < page.width {
                    let mut y = Self::DOT_SPACING;
                    while y < page.height {
                        marks.push(TemplateMark::Dot(Point::new(x, y)));
                        y += Self::DOT_SPACING;
                    }
                    x += Self::DOT_SPACING;
                }
            }
        }
        marks
    }
}

/// The three entity collections of one page (or of the canvas).
///
/// Entities are addressed by id through an index of their collection and
/// position; insertion order is draw order within a kind.
#[derive(Debug, Clone, Default)]
pub struct Layer {
    strokes: Vec<Stroke>,
    shapes: Vec<Shape>,
    text_boxes: Vec<TextBox>,
    index: BTreeMap<EntityId, (EntityKind, usize)>,
}

impl PartialEq for Layer {
    fn eq(&self, other: &Self) -> bool {
        self.strokes == other.strokes && self.shapes == other.shapes && self.text_boxes == other.text_boxes
    }
}

impl Layer {
    pub const fn new() -> Self {
        Self {
            strokes: Vec::new(),
            shapes: Vec::new(),
            text_boxes: Vec::new(),
            index: BTreeMap::new(),
        }
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn text_boxes(&self) -> &[TextBox] {
        &self.text_boxes
    }

    /// Rebuild the id index after positions shifted.
    fn reindex(&mut self) {
        self.index.clear();
        for (i, s) in self.strokes.iter().enumerate() {
            self.index.insert(s.id(), (EntityKind::Stroke, i));
        }
        for (i, s) in self.shapes.iter().enumerate() {
            self.index.insert(s.id(), (EntityKind::Shape, i));
        }
        for (i, t) in self.text_boxes.iter().enumerate() {
            self.index.insert(t.id(), (EntityKind::TextBox, i));
        }
    }

    /// Append a stroke. Eraser strokes are rejected.
    pub fn add_stroke(&mut self, stroke: Stroke) -> bool {
        if stroke.pen_kind.is_eraser() {
            log::warn!("Refusing to store an eraser stroke");
            return false;
        }
        self.index.insert(stroke.id(), (EntityKind::Stroke, self.strokes.len()));
        self.strokes.push(stroke);
        true
    }

    pub fn add_shape(&mut self, shape: Shape) {
        self.index.insert(shape.id(), (EntityKind::Shape, self.shapes.len()));
        self.shapes.push(shape);
    }

    pub fn add_text_box(&mut self, text_box: TextBox) {
        self.index.insert(text_box.id(), (EntityKind::TextBox, self.text_boxes.len()));
        self.text_boxes.push(text_box);
    }

    /// Append an entity to the collection of its kind.
    pub fn add(&mut self, entity: Entity) -> bool {
        match entity {
            Entity::Stroke(s) => self.add_stroke(s),
            Entity::Shape(s) => {
                self.add_shape(s);
                true
            }
            Entity::TextBox(t) => {
                self.add_text_box(t);
                true
            }
        }
    }

    /// Insert an entity at `index` within its collection, clamped to the end.
    pub fn insert_at(&mut self, entity: Entity, index: usize) -> bool {
        fn insert<T>(items: &mut Vec<T>, item: T, index: usize) {
            let index = index.min(items.len());
            items.insert(index, item);
        }
        match entity {
            Entity::Stroke(s) if s.pen_kind.is_eraser() => return false,
            Entity::Stroke(s) => insert(&mut self.strokes, s, index),
            Entity::Shape(s) => insert(&mut self.shapes, s, index),
            Entity::TextBox(t) => insert(&mut self.text_boxes, t, index),
        }
        self.reindex();
        true
    }

    /// Remove an entity by id, returning it with its former index.
    pub fn remove(&mut self, id: EntityId) -> Option<(Entity, usize)> {
        let (kind, i) = self.index.remove(&id)?;
        let entity = match kind {
            EntityKind::Stroke => Entity::Stroke(self.strokes.remove(i)),
            EntityKind::Shape => Entity::Shape(self.shapes.remove(i)),
            EntityKind::TextBox => Entity::TextBox(self.text_boxes.remove(i)),
        };
        self.reindex();
        Some((entity, i))
    }

    /// Replace a stroke with zero or more strokes at the same position.
    pub fn replace_stroke(&mut self, id: EntityId, replacements: Vec<Stroke>) -> Option<Stroke> {
        let i = match self.index.get(&id) {
            Some(&(EntityKind::Stroke, i)) => i,
            _ => return None,
        };
        let removed = self.strokes.splice(i..=i, replacements).next();
        self.reindex();
        removed
    }

    /// Drop every shape and text box for which `pred` holds, returning them.
    pub(crate) fn take_shapes_and_text_where(
        &mut self,
        mut pred: impl FnMut(&dyn Drawable) -> bool,
    ) -> Vec<Entity> {
        let mut removed = Vec::new();
        let (hit, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.shapes)
            .into_iter()
            .partition(|s| pred(s));
        self.shapes = kept;
        removed.extend(hit.into_iter().map(Entity::Shape));
        let (hit, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.text_boxes)
            .into_iter()
            .partition(|t| pred(t));
        self.text_boxes = kept;
        removed.extend(hit.into_iter().map(Entity::TextBox));
        if !removed.is_empty() {
            self.reindex();
        }
        removed
    }

    pub fn kind_of(&self, id: EntityId) -> Option<EntityKind> {
        self.index.get(&id).map(|&(kind, _)| kind)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.index.contains_key(&id)
    }

    /// Look up any entity by id.
    pub fn get(&self, id: EntityId) -> Option<&dyn Drawable> {
        let &(kind, i) = self.index.get(&id)?;
        match kind {
            EntityKind::Stroke => self.strokes.get(i).map(|s| s as &dyn Drawable),
            EntityKind::Shape => self.shapes.get(i).map(|s| s as &dyn Drawable),
            EntityKind::TextBox => self.text_boxes.get(i).map(|t| t as &dyn Drawable),
        }
    }

    pub fn stroke(&self, id: EntityId) -> Option<&Stroke> {
        match self.index.get(&id) {
            Some(&(EntityKind::Stroke, i)) => self.strokes.get(i),
            _ => None,
        }
    }

    /// Owned copy of an entity.
    pub fn entity(&self, id: EntityId) -> Option<Entity> {
        let &(kind, i) = self.index.get(&id)?;
        match kind {
            EntityKind::Stroke => self.strokes.get(i).cloned().map(Entity::Stroke),
            EntityKind::Shape => self.shapes.get(i).cloned().map(Entity::Shape),
            EntityKind::TextBox => self.text_boxes.get(i).cloned().map(Entity::TextBox),
        }
    }

    pub fn bounds_of(&self, id: EntityId) -> Option<Rect> {
        self.get(id).map(|d| d.bounds())
    }

    fn get_mut(&mut self, id: EntityId) -> Option<&mut dyn Drawable> {
        let &(kind, i) = self.index.get(&id)?;
        match kind {
            EntityKind::Stroke => self.strokes.get_mut(i).map(|s| s as &mut dyn Drawable),
            EntityKind::Shape => self.shapes.get_mut(i).map(|s| s as &mut dyn Drawable),
            EntityKind::TextBox => self.text_boxes.get_mut(i).map(|t| t as &mut dyn Drawable),
        }
    }

    /// Move one entity in place. Returns `false` if it is not in this layer.
    pub fn translate(&mut self, id: EntityId, delta: Vec2) -> bool {
        match self.get_mut(id) {
            Some(d) => {
                d.translate(delta);
                true
            }
            None => false,
        }
    }

    /// Every entity, strokes first, then shapes, then text boxes.
    pub fn drawables(&self) -> impl Iterator<Item = &dyn Drawable> {
        self.strokes
            .iter()
            .map(|s| s as &dyn Drawable)
            .chain(self.shapes.iter().map(|s| s as &dyn Drawable))
            .chain(self.text_boxes.iter().map(|t| t as &dyn Drawable))
    }

    pub fn ids(&self) -> Vec<EntityId> {
        self.drawables().map(|d| d.id()).collect()
    }

    /// Union of all entity bounds.
    pub fn bounds(&self) -> Option<Rect> {
        union_all(self.drawables().map(|d| d.bounds()))
    }

    pub fn len(&self) -> usize {
        self.strokes.len() + self.shapes.len() + self.text_boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.strokes.clear();
        self.shapes.clear();
        self.text_boxes.clear();
        self.index.clear();
    }
}

/// A complete note.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    note_kind: NoteKind,
    pub page_template: PageTemplate,
    pub width: f64,
    pub height: f64,
    pub background_color: Rgba,
    canvas: Layer,
    pages: BTreeMap<u32, Layer>,
    current_page: u32,
}

impl Default for Document {
    fn default() -> Self {
        Self::canvas()
    }
}

impl Document {
    /// Create an empty document of the given kind.
    pub fn new(note_kind: NoteKind, page_template: PageTemplate) -> Self {
        let size = note_kind.default_size();
        let mut pages = BTreeMap::new();
        if note_kind == NoteKind::PagedA4 {
            pages.insert(1, Layer::new());
        }
        Self {
            note_kind,
            page_template,
            width: size.width,
            height: size.height,
            background_color: Rgba::white(),
            canvas: Layer::new(),
            pages,
            current_page: 1,
        }
    }

    /// An unbounded single-canvas note.
    pub fn canvas() -> Self {
        Self::new(NoteKind::Canvas, PageTemplate::Blank)
    }

    /// A paged A4 note.
    pub fn a4(template: PageTemplate) -> Self {
        Self::new(NoteKind::PagedA4, template)
    }

    /// Rebuild a paged document from decoded pages. Page 1 is always present
    /// and the current page is clamped to `[1, last page]` and created if missing.
    pub(crate) fn from_pages(
        page_template: PageTemplate,
        size: Size,
        background_color: Rgba,
        mut pages: BTreeMap<u32, Layer>,
        current_page: u32,
    ) -> Self {
        pages.entry(1).or_default();
        let last = pages.keys().next_back().copied().unwrap_or(1);
        let current_page = current_page.clamp(1, last);
        pages.entry(current_page).or_default();
        Self {
            note_kind: NoteKind::PagedA4,
            page_template,
            width: size.width,
            height: size.height,
            background_color,
            canvas: Layer::new(),
            pages,
            current_page,
        }
    }

    pub(crate) fn from_canvas(size: Size, background_color: Rgba, canvas: Layer) -> Self {
        Self {
            width: size.width,
            height: size.height,
            background_color,
            canvas,
            ..Self::canvas()
        }
    }

    pub fn note_kind(&self) -> NoteKind {
        self.note_kind
    }

    pub fn is_paged(&self) -> bool {
        self.note_kind == NoteKind::PagedA4
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Current page number; always 1 for a canvas.
    pub fn current_page(&self) -> u32 {
        if self.is_paged() { self.current_page } else { 1 }
    }

    /// The current view: the current page, or the whole canvas.
    pub fn current(&self) -> &Layer {
        if self.is_paged() {
            self.pages.get(&self.current_page).unwrap_or(&EMPTY_LAYER)
        } else {
            &self.canvas
        }
    }

    /// Mutable current view; creates the current page if it is missing.
    pub fn current_mut(&mut self) -> &mut Layer {
        if self.is_paged() {
            self.pages.entry(self.current_page).or_default()
        } else {
            &mut self.canvas
        }
    }

    pub fn add_stroke(&mut self, stroke: Stroke) -> bool {
        self.current_mut().add_stroke(stroke)
    }

    pub fn add_shape(&mut self, shape: Shape) {
        self.current_mut().add_shape(shape);
    }

    pub fn add_text_box(&mut self, text_box: TextBox) {
        self.current_mut().add_text_box(text_box);
    }

    /// Empty the current page (paged) or the whole canvas. Other pages are untouched.
    pub fn clear(&mut self) {
        self.current_mut().clear();
    }

    /// Advance one page, creating it if needed. No-op for a canvas.
    pub fn next_page(&mut self) -> bool {
        if !self.is_paged() {
            return false;
        }
        self.current_page += 1;
        self.pages.entry(self.current_page).or_default();
        true
    }

    /// Go back one page. No-op on page 1 or for a canvas.
    pub fn prev_page(&mut self) -> bool {
        if !self.is_paged() || self.current_page <= 1 {
            return false;
        }
        self.current_page -= 1;
        true
    }

    /// Jump to page `n` (at least 1), creating every missing page up to it.
    pub fn go_to_page(&mut self, n: u32) -> bool {
        if !self.is_paged() {
            return false;
        }
        let n = n.max(1);
        for page in 1..=n {
            self.pages.entry(page).or_default();
        }
        let changed = self.current_page != n;
        self.current_page = n;
        changed
    }

    /// Set the current page, clamped to `[1, last_page]`.
    ///
    /// A target inside a gap left by a decoded file is created empty.
    pub fn set_current_page(&mut self, n: u32) -> bool {
        if !self.is_paged() {
            return false;
        }
        let n = n.clamp(1, self.last_page());
        self.pages.entry(n).or_default();
        let changed = self.current_page != n;
        self.current_page = n;
        changed
    }

    /// Highest page number present; always 1 for a canvas.
    pub fn last_page(&self) -> u32 {
        if self.is_paged() {
            self.pages.keys().next_back().copied().unwrap_or(1)
        } else {
            1
        }
    }

    /// Number of known pages; always 1 for a canvas.
    pub fn total_pages(&self) -> u32 {
        if self.is_paged() {
            u32::try_from(self.pages.len()).unwrap_or(u32::MAX)
        } else {
            1
        }
    }

    pub fn page(&self, n: u32) -> Option<&Layer> {
        if self.is_paged() {
            self.pages.get(&n)
        } else if n == 1 {
            Some(&self.canvas)
        } else {
            None
        }
    }

    /// All pages in ascending order; a canvas yields itself as page 1.
    pub fn pages(&self) -> Box<dyn Iterator<Item = (u32, &Layer)> + '_> {
        if self.is_paged() {
            Box::new(self.pages.iter().map(|(n, layer)| (*n, layer)))
        } else {
            Box::new(std::iter::once((1, &self.canvas)))
        }
    }

    /// Total entity count across all pages.
    pub fn entity_count(&self) -> usize {
        self.pages().map(|(_, layer)| layer.len()).sum()
    }
}
