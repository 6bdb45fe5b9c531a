//! Editing engine: routes pointer and keyboard input into document edits.
//!
//! One gesture is active at a time and the tool that starts it is passed in
//! explicitly as a [`ToolState`]. Every entity-adding or entity-removing
//! action records exactly one undo command per entity; continuous erasing
//! is not recorded.

use crate::camera::{self, Camera, PageLayout};
use crate::config::EditorConfig;
use crate::document::{Document, PageTemplate};
use crate::eraser::{EraserMode, erase_at};
use crate::geometry::{InkPoint, rect_from_corners, rects_overlap};
use crate::history::{Command, History};
use crate::render::{DrawSink, Overlay, draw_document};
use crate::selection::{Clipboard, Selection};
use crate::shapes::{Drawable, Entity, EntityId, Shape, Stroke, TextBox};
use crate::storage::{Storage, StorageResult};
use crate::tools::{Tool, ToolState};
use kurbo::{Affine, Point, Rect, Size, Vec2};
use std::fmt;

const DEFAULT_VIEWPORT: Size = Size::new(800.0, 600.0);

/// One pointer sample in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInput {
    pub position: Point,
    pub pressure: f64,
    pub tilt_x: f64,
    pub tilt_y: f64,
    /// Verdict of the device arbitration layer. A rejected source (a palm
    /// while the stylus is near, say) never starts a gesture.
    pub accepted: bool,
}

impl PointerInput {
    pub fn new(x: f64, y: f64) -> Self {
        Self::at(Point::new(x, y))
    }

    pub fn at(position: Point) -> Self {
        Self {
            position,
            pressure: 1.0,
            tilt_x: 0.0,
            tilt_y: 0.0,
            accepted: true,
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

    pub fn rejected(mut self) -> Self {
        self.accepted = false;
        self
    }
}

/// The gesture between a press and its release.
#[derive(Debug, Default)]
enum Gesture {
    #[default]
    Idle,
    /// Freehand ink. Erasing tracks its path in an eraser-tagged stroke.
    Drawing {
        stroke: Stroke,
        eraser: Option<(EraserMode, f64)>,
    },
    ShapeDrafting(Shape),
    Selecting {
        start: Point,
        end: Point,
    },
    DraggingSelection {
        last: Point,
    },
}

/// Editor state: the document plus everything needed to edit it.
pub struct Editor {
    document: Document,
    camera: Camera,
    layout: PageLayout,
    config: EditorConfig,
    selection: Selection,
    clipboard: Clipboard,
    history: History,
    gesture: Gesture,
    active_text: Option<TextBox>,
    page_listener: Option<Box<dyn FnMut(u32)>>,
}

impl fmt::Debug for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Editor")
            .field("document", &self.document)
            .field("camera", &self.camera)
            .field("selection", &self.selection)
            .field("gesture", &self.gesture)
            .field("active_text", &self.active_text)
            .finish_non_exhaustive()
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(Document::default())
    }
}

impl Editor {
    pub fn new(document: Document) -> Self {
        Self::with_config(document, EditorConfig::default())
    }

    pub fn with_config(document: Document, config: EditorConfig) -> Self {
        let layout = PageLayout::new(DEFAULT_VIEWPORT, document.size(), &config);
        let mut editor = Self {
            document,
            camera: Camera::new(),
            layout,
            history: History::with_limit(config.history_limit),
            config,
            selection: Selection::new(),
            clipboard: Clipboard::new(),
            gesture: Gesture::Idle,
            active_text: None,
            page_listener: None,
        };
        editor.apply_zoom_limits();
        editor.reset_view();
        editor
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// The text box receiving keystrokes, if any. It is not part of the
    /// document until committed.
    pub fn active_text(&self) -> Option<&TextBox> {
        self.active_text.as_ref()
    }

    /// Whether a press has started a gesture that has not been released yet.
    pub fn is_gesture_active(&self) -> bool {
        !matches!(self.gesture, Gesture::Idle)
    }

    /// Called with the new page number whenever the current page changes.
    pub fn set_page_listener(&mut self, listener: impl FnMut(u32) + 'static) {
        self.page_listener = Some(Box::new(listener));
    }

    // --- Coordinates ---

    /// Map a screen point into the coordinates entities are stored in:
    /// document space for a canvas, page-relative (clamped) on the current page.
    pub fn to_document(&self, screen: Point) -> Point {
        let point = self.camera.to_document(screen);
        if self.document.is_paged() {
            self.layout
                .to_page_coords(point, self.document.current_page(), self.camera.zoom)
        } else {
            point
        }
    }

    /// Document-to-screen transform the renderer should apply.
    pub fn view_transform(&self) -> Affine {
        self.camera.transform()
    }

    fn sample(input: &PointerInput, point: Point) -> InkPoint {
        InkPoint::new(point.x, point.y)
            .with_pressure(input.pressure)
            .with_tilt(input.tilt_x, input.tilt_y)
    }

    // --- Pointer gestures ---

    /// Start a gesture with the given tool. Returns `false` if the input was
    /// rejected or another gesture is still running.
    ///
    /// Any open text box loses focus and is committed first. In paged mode
    /// the page under the pointer becomes current for the whole gesture.
    pub fn pointer_down(&mut self, input: PointerInput, tools: &ToolState) -> bool {
        if !input.accepted {
            log::debug!("Ignoring press from rejected pointer source");
            return false;
        }
        if self.is_gesture_active() {
            return false;
        }

        self.commit_text();

        if self.document.is_paged() {
            let page = self.layout.resolve_page(self.camera.to_document(input.position));
            if self.document.go_to_page(page) {
                self.page_changed();
            }
        }

        let point = self.to_document(input.position);
        match tools.tool {
            Tool::Text => {
                self.active_text = Some(tools.new_text_box(point));
                log::debug!("Text box opened at ({:.1}, {:.1})", point.x, point.y);
            }
            Tool::Select => {
                if self.selection.contains_point(point) {
                    self.gesture = Gesture::DraggingSelection { last: point };
                    log::debug!("Started dragging selection from ({:.1}, {:.1})", point.x, point.y);
                } else {
                    self.gesture = Gesture::Selecting { start: point, end: point };
                    log::debug!("Started marquee at ({:.1}, {:.1})", point.x, point.y);
                }
            }
            Tool::Shape(kind) => {
                let shape = Shape::new(kind, point, point).with_style(
                    tools.color,
                    tools.pen_width,
                    tools.shape_filled,
                    tools.line_style,
                );
                self.gesture = Gesture::ShapeDrafting(shape);
                log::debug!("Started {:?} at ({:.1}, {:.1})", kind, point.x, point.y);
            }
            Tool::Draw => {
                let mut stroke = Stroke::new(tools.pen_kind, tools.color, tools.width());
                stroke.add_point(Self::sample(&input, point));
                let eraser = tools
                    .is_erasing()
                    .then(|| (tools.eraser_mode, self.config.eraser_radius(tools.width())));
                if let Some((mode, radius)) = eraser {
                    self.erase(point, radius, mode);
                }
                self.gesture = Gesture::Drawing { stroke, eraser };
                log::debug!("Started {} at ({:.1}, {:.1})", tools.pen_kind.as_str(), point.x, point.y);
            }
        }
        true
    }

    /// Continue the running gesture. Returns `true` if anything changed.
    pub fn pointer_move(&mut self, input: PointerInput) -> bool {
        let point = self.to_document(input.position);
        let threshold = self.config.sampling_threshold;
        match &mut self.gesture {
            Gesture::Idle => false,
            Gesture::Drawing { stroke, eraser } => {
                if !stroke.add_sampled(Self::sample(&input, point), threshold) {
                    return false;
                }
                if let Some((mode, radius)) = *eraser {
                    let outcome = erase_at(self.document.current_mut(), point, radius, mode);
                    if !outcome.is_empty() {
                        self.selection.refresh(self.document.current());
                    }
                }
                true
            }
            Gesture::ShapeDrafting(shape) => {
                shape.end = point;
                true
            }
            Gesture::Selecting { end, .. } => {
                *end = point;
                true
            }
            Gesture::DraggingSelection { last } => {
                let delta = point - *last;
                *last = point;
                self.selection.translate(self.document.current_mut(), delta);
                true
            }
        }
    }

    /// Finish the running gesture. Returns `true` if a gesture was running.
    pub fn pointer_up(&mut self) -> bool {
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle => false,
            Gesture::Drawing {
                stroke,
                eraser: Some(_),
            } => {
                log::info!("Erase finished after {} samples", stroke.len());
                true
            }
            Gesture::Drawing { stroke, eraser: None } => {
                if !stroke.is_empty() {
                    self.commit(Entity::Stroke(stroke));
                }
                true
            }
            Gesture::ShapeDrafting(shape) => {
                self.commit(Entity::Shape(shape));
                true
            }
            Gesture::Selecting { start, end } => {
                self.select_in_rect(rect_from_corners(start, end));
                true
            }
            Gesture::DraggingSelection { .. } => {
                log::info!("Moved {} selected entities", self.selection.len());
                true
            }
        }
    }

    fn erase(&mut self, point: Point, radius: f64, mode: EraserMode) {
        let outcome = erase_at(self.document.current_mut(), point, radius, mode);
        if !outcome.is_empty() {
            self.selection.refresh(self.document.current());
        }
    }

    /// Add an entity to the current view and record it.
    fn commit(&mut self, entity: Entity) -> bool {
        if !self.document.current_mut().add(entity.clone()) {
            return false;
        }
        match &entity {
            Entity::Stroke(s) => log::info!("Stroke committed with {} points", s.len()),
            Entity::Shape(s) => log::info!("Shape committed: {:?}", s.kind),
            Entity::TextBox(t) => log::info!("Text box committed ({} chars)", t.text.chars().count()),
        }
        self.history.push(Command::Add(entity));
        true
    }

    // --- Selection ---

    /// Replace the selection with every entity whose bounds overlap `rect`.
    ///
    /// A rectangle smaller than the minimum marquee size in both directions
    /// is ignored and leaves the selection as it was.
    pub fn select_in_rect(&mut self, rect: Rect) -> usize {
        let min = self.config.min_marquee_size;
        if rect.width() < min && rect.height() < min {
            log::debug!("Marquee too small ({:.1}x{:.1}), ignoring", rect.width(), rect.height());
            return 0;
        }
        let layer = self.document.current();
        let hits: Vec<EntityId> = layer
            .drawables()
            .filter(|d| rects_overlap(d.bounds(), rect))
            .map(|d| d.id())
            .collect();
        self.selection.set(hits, layer);
        log::info!("Selected {} entities", self.selection.len());
        self.selection.len()
    }

    pub fn select_all(&mut self) -> usize {
        let layer = self.document.current();
        self.selection.set(layer.ids(), layer);
        self.selection.len()
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Remove every selected entity, recording one delete command each.
    pub fn delete_selection(&mut self) -> bool {
        if self.selection.is_empty() {
            return false;
        }
        let layer = self.document.current_mut();
        let mut removed = 0;
        for &id in self.selection.ids() {
            if let Some((entity, index)) = layer.remove(id) {
                self.history.push(Command::Delete { entity, index });
                removed += 1;
            }
        }
        self.selection.clear();
        log::info!("Deleted {} entities", removed);
        removed > 0
    }

    // --- Clipboard ---

    pub fn copy(&mut self) -> bool {
        if self.selection.is_empty() {
            log::warn!("Nothing selected to copy");
            return false;
        }
        self.clipboard = Clipboard::from_selection(&self.selection, self.document.current());
        log::info!("Copied {} entities", self.clipboard.len());
        true
    }

    /// Add fresh, offset copies of the clipboard and select them.
    pub fn paste(&mut self) -> bool {
        if self.clipboard.is_empty() {
            log::warn!("Clipboard is empty");
            return false;
        }
        let layer = self.document.current_mut();
        let mut pasted = Vec::with_capacity(self.clipboard.len());
        for entity in self.clipboard.instantiate(self.config.paste_offset) {
            let id = entity.id();
            if layer.add(entity.clone()) {
                self.history.push(Command::Add(entity));
                pasted.push(id);
            }
        }
        self.selection.set(pasted, self.document.current());
        log::info!("Pasted {} entities", self.selection.len());
        !self.selection.is_empty()
    }

    pub fn cut(&mut self) -> bool {
        self.copy() && self.delete_selection()
    }

    pub fn duplicate(&mut self) -> bool {
        self.copy() && self.paste()
    }

    // --- History ---

    pub fn undo(&mut self) -> bool {
        let Some(kind) = self.history.undo(self.document.current_mut()) else {
            return false;
        };
        self.selection.refresh(self.document.current());
        log::info!("Undid {}", kind.as_str());
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(kind) = self.history.redo(self.document.current_mut()) else {
            return false;
        };
        self.selection.refresh(self.document.current());
        log::info!("Redid {}", kind.as_str());
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // --- Text editing ---

    pub fn insert_char(&mut self, c: char) -> bool {
        match self.active_text.as_mut() {
            Some(text_box) => {
                text_box.push_char(c);
                true
            }
            None => false,
        }
    }

    pub fn insert_text(&mut self, text: &str) -> bool {
        match self.active_text.as_mut() {
            Some(text_box) => {
                text_box.push_str(text);
                true
            }
            None => false,
        }
    }

    pub fn backspace(&mut self) -> bool {
        self.active_text.as_mut().is_some_and(TextBox::backspace)
    }

    pub fn newline(&mut self) -> bool {
        match self.active_text.as_mut() {
            Some(text_box) => {
                text_box.newline();
                true
            }
            None => false,
        }
    }

    /// Close the active text box, committing it unless it is blank.
    pub fn commit_text(&mut self) -> bool {
        let Some(text_box) = self.active_text.take() else {
            return false;
        };
        if text_box.is_blank() {
            log::debug!("Discarding blank text box");
            return false;
        }
        self.commit(Entity::TextBox(text_box))
    }

    /// Copy the text formatting of `tools` onto the active text box.
    pub fn apply_text_formatting(&mut self, tools: &ToolState) -> bool {
        let Some(text_box) = self.active_text.as_mut() else {
            return false;
        };
        text_box.font_size = tools.font_size;
        text_box.color = tools.color;
        text_box.bold = tools.bold;
        text_box.italic = tools.italic;
        text_box.underline = tools.underline;
        true
    }

    // --- Pages ---

    /// Release any gesture and commit text before the current page changes.
    fn leave_page(&mut self) {
        self.pointer_up();
        self.commit_text();
    }

    fn page_changed(&mut self) {
        let page = self.document.current_page();
        self.selection.refresh(self.document.current());
        log::info!("Current page is now {} of {}", page, self.document.total_pages());
        if let Some(listener) = self.page_listener.as_mut() {
            listener(page);
        }
    }

    pub fn next_page(&mut self) -> bool {
        if !self.document.is_paged() {
            return false;
        }
        self.leave_page();
        let changed = self.document.next_page();
        if changed {
            self.page_changed();
        }
        changed
    }

    pub fn prev_page(&mut self) -> bool {
        if !self.document.is_paged() || self.document.current_page() <= 1 {
            return false;
        }
        self.leave_page();
        let changed = self.document.prev_page();
        if changed {
            self.page_changed();
        }
        changed
    }

    /// Jump to page `n`, creating it and every page before it.
    pub fn go_to_page(&mut self, n: u32) -> bool {
        if !self.document.is_paged() {
            return false;
        }
        self.leave_page();
        let changed = self.document.go_to_page(n);
        if changed {
            self.page_changed();
        }
        changed
    }

    /// Follow the page visible at vertical scroll position `scroll_y`.
    pub fn update_page_from_scroll(&mut self, scroll_y: f64) -> bool {
        if !self.document.is_paged() {
            return false;
        }
        let page = self
            .layout
            .page_from_scroll(scroll_y, &self.camera, self.document.last_page());
        if page == self.document.current_page() {
            return false;
        }
        self.leave_page();
        let changed = self.document.set_current_page(page);
        if changed {
            self.page_changed();
        }
        changed
    }

    pub fn set_page_template(&mut self, template: PageTemplate) {
        self.document.page_template = template;
    }

    /// Empty the current view and forget the undo history.
    pub fn clear(&mut self) {
        self.gesture = Gesture::Idle;
        self.active_text = None;
        self.document.clear();
        self.selection.clear();
        self.history.clear();
        log::info!("Cleared page {}", self.document.current_page());
    }

    // --- View ---

    fn fit_zoom(&self) -> f64 {
        camera::fit_zoom(self.layout.viewport.width, self.document.width, &self.config)
    }

    fn apply_zoom_limits(&mut self) {
        let (min, max) = camera::zoom_range(self.document.note_kind(), self.fit_zoom(), &self.config);
        self.camera.set_zoom_limits(min, max);
    }

    /// Update the viewport size; paged zoom limits follow the new fit zoom.
    pub fn set_viewport(&mut self, size: Size) {
        self.layout.viewport = size;
        self.apply_zoom_limits();
    }

    /// Zoom to fit (paged) or to 100% (canvas) with no pan.
    pub fn reset_view(&mut self) {
        let zoom = if self.document.is_paged() { self.fit_zoom() } else { 1.0 };
        self.camera.reset(zoom);
    }

    pub fn zoom_by(&mut self, focal: Point, factor: f64) -> bool {
        let changed = self.camera.zoom_at(focal, factor);
        if changed {
            log::info!("Zoom: {:.0}%", self.camera.zoom * 100.0);
        }
        changed
    }

    pub fn zoom_in(&mut self, focal: Point) -> bool {
        self.zoom_by(focal, self.config.zoom_step)
    }

    pub fn zoom_out(&mut self, focal: Point) -> bool {
        self.zoom_by(focal, 1.0 / self.config.zoom_step)
    }

    pub fn pan(&mut self, delta: Vec2) {
        self.camera.pan(delta);
    }

    // --- Rendering ---

    /// Draw the document and the interaction overlay into `sink`.
    ///
    /// Coordinates are document-space; apply [`Editor::view_transform`] to
    /// reach the screen.
    pub fn render(&self, sink: &mut impl DrawSink) {
        let mut overlay = Overlay::default()
            .with_active_text(self.active_text.as_ref())
            .with_selection(self.selection.bounds().zip(self.selection.handles()));
        match &self.gesture {
            Gesture::Drawing { stroke, .. } => overlay = overlay.with_stroke(Some(stroke)),
            Gesture::ShapeDrafting(shape) => overlay = overlay.with_shape_preview(Some(shape)),
            Gesture::Selecting { start, end } => {
                overlay = overlay.with_marquee(Some(rect_from_corners(*start, *end)));
            }
            Gesture::Idle | Gesture::DraggingSelection { .. } => {}
        }
        draw_document(sink, &self.document, &self.layout, self.camera.zoom, &overlay);
    }

    // --- Persistence ---

    /// Write the document under `id`. An open text box is not included.
    pub fn save(&self, storage: &impl Storage, id: &str) -> StorageResult<()> {
        storage.save(id, &self.document)?;
        log::info!("Saved note {} ({} entities)", id, self.document.entity_count());
        Ok(())
    }

    /// Replace the document with the one stored under `id`.
    ///
    /// On failure the current document and editing state are kept.
    pub fn load(&mut self, storage: &impl Storage, id: &str) -> StorageResult<()> {
        let document = storage.load(id)?;
        log::info!("Loaded note {} ({} pages)", id, document.total_pages());
        self.replace_document(document);
        Ok(())
    }

    /// Start editing `document` from a clean slate.
    pub fn replace_document(&mut self, document: Document) {
        self.document = document;
        self.layout = PageLayout::new(self.layout.viewport, self.document.size(), &self.config);
        self.gesture = Gesture::Idle;
        self.active_text = None;
        self.selection.clear();
        self.history.clear();
        self.apply_zoom_limits();
        self.reset_view();
        self.page_changed();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::tests::RecordingSink;
    use crate::shapes::{PenKind, ShapeKind};
    use crate::storage::MemoryStorage;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn draw(editor: &mut Editor, tools: &ToolState, points: &[(f64, f64)]) {
        let (x, y) = points[0];
        assert!(editor.pointer_down(PointerInput::new(x, y), tools));
        for &(x, y) in &points[1..] {
            editor.pointer_move(PointerInput::new(x, y));
        }
        assert!(editor.pointer_up());
    }

    fn line(editor: &mut Editor, y: f64) {
        let points: Vec<(f64, f64)> = (0..10).map(|i| (i as f64 * 10.0, y)).collect();
        draw(editor, &ToolState::new(), &points);
    }

    fn select_tool() -> ToolState {
        let mut tools = ToolState::new();
        tools.tool = Tool::Select;
        tools
    }

    fn text_tool() -> ToolState {
        let mut tools = ToolState::new();
        tools.tool = Tool::Text;
        tools
    }

    #[test]
    fn test_stroke_capture_samples_and_commits() {
        let mut editor = Editor::default();
        draw(
            &mut editor,
            &ToolState::new(),
            &[(0.0, 0.0), (0.5, 0.0), (5.0, 0.0), (5.5, 0.5), (10.0, 0.0)],
        );
        let strokes = editor.document().current().strokes();
        assert_eq!(strokes.len(), 1);
        assert_eq!(strokes[0].len(), 3);
        assert!((strokes[0].width - 3.0).abs() < f64::EPSILON);
        assert_eq!(editor.history().undo_len(), 1);
    }

    #[test]
    fn test_pressure_is_recorded() {
        let mut editor = Editor::default();
        editor.pointer_down(PointerInput::new(0.0, 0.0).with_pressure(0.25).with_tilt(0.5, 0.0), &ToolState::new());
        editor.pointer_up();
        let point = editor.document().current().strokes()[0].points[0];
        assert!((point.pressure - 0.25).abs() < f64::EPSILON);
        assert!((point.tilt_x - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rejected_pointer_starts_nothing() {
        let mut editor = Editor::default();
        assert!(!editor.pointer_down(PointerInput::new(0.0, 0.0).rejected(), &ToolState::new()));
        assert!(!editor.pointer_move(PointerInput::new(20.0, 0.0)));
        assert!(!editor.pointer_up());
        assert!(editor.document().current().is_empty());
    }

    #[test]
    fn test_second_press_ignored_while_drawing() {
        let mut editor = Editor::default();
        assert!(editor.pointer_down(PointerInput::new(0.0, 0.0), &ToolState::new()));
        assert!(!editor.pointer_down(PointerInput::new(50.0, 50.0), &select_tool()));
        editor.pointer_up();
        assert_eq!(editor.document().current().strokes().len(), 1);
    }

    #[test]
    fn test_erase_gesture_is_not_recorded() {
        let mut editor = Editor::default();
        line(&mut editor, 0.0);
        assert_eq!(editor.history().undo_len(), 1);

        let mut eraser = ToolState::new();
        eraser.set_pen_kind(PenKind::Eraser);
        eraser.set_width(2.0);
        // radius 4 around x = 40 removes only sample 4
        draw(&mut editor, &eraser, &[(40.0, 0.0)]);

        let strokes = editor.document().current().strokes();
        assert_eq!(strokes.len(), 2);
        assert_eq!(strokes.iter().map(Stroke::len).sum::<usize>(), 9);
        assert_eq!(editor.history().undo_len(), 1);
    }

    #[test]
    fn test_stroke_eraser_drag() {
        let mut editor = Editor::default();
        line(&mut editor, 0.0);
        line(&mut editor, 100.0);
        let mut eraser = ToolState::new();
        eraser.set_pen_kind(PenKind::Eraser);
        eraser.eraser_mode = EraserMode::Stroke;
        eraser.set_width(1.0);
        draw(&mut editor, &eraser, &[(200.0, 100.0), (91.0, 100.0)]);
        let strokes = editor.document().current().strokes();
        assert_eq!(strokes.len(), 1);
        assert!((strokes[0].points[0].y).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shape_commit() {
        let mut editor = Editor::default();
        let mut tools = ToolState::new();
        tools.set_shape(ShapeKind::Rectangle);
        tools.shape_filled = true;
        draw(&mut editor, &tools, &[(10.0, 10.0), (40.0, 30.0), (60.0, 50.0)]);
        let shapes = editor.document().current().shapes();
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].start, Point::new(10.0, 10.0));
        assert_eq!(shapes[0].end, Point::new(60.0, 50.0));
        assert!(shapes[0].filled);
        assert_eq!(editor.history().last().unwrap().kind().as_str(), "shape");
    }

    #[test]
    fn test_marquee_threshold() {
        let mut editor = Editor::default();
        line(&mut editor, 0.0);
        draw(&mut editor, &select_tool(), &[(40.0, -1.0), (43.0, 2.0)]);
        assert!(editor.selection().is_empty());
        draw(&mut editor, &select_tool(), &[(40.0, -5.0), (50.0, 5.0)]);
        assert_eq!(editor.selection().len(), 1);
    }

    #[test]
    fn test_marquee_replaces_selection_by_overlap() {
        let mut editor = Editor::default();
        line(&mut editor, 0.0);
        line(&mut editor, 200.0);
        editor.select_all();
        assert_eq!(editor.selection().len(), 2);
        // Overlaps only the lower line's padded bounds.
        draw(&mut editor, &select_tool(), &[(-50.0, 150.0), (-1.0, 199.0)]);
        assert_eq!(editor.selection().len(), 1);
        let id = editor.selection().ids()[0];
        assert_eq!(id, editor.document().current().strokes()[1].id());
    }

    #[test]
    fn test_drag_selection_moves_entities() {
        let mut editor = Editor::default();
        line(&mut editor, 0.0);
        editor.select_all();
        draw(&mut editor, &select_tool(), &[(20.0, 0.0), (30.0, 5.0), (50.0, 10.0)]);
        let stroke = &editor.document().current().strokes()[0];
        assert_eq!(stroke.points[0].pos(), Point::new(30.0, 10.0));
        assert_eq!(editor.selection().bounds(), Some(Rect::new(27.0, 7.0, 123.0, 13.0)));
        assert_eq!(editor.history().undo_len(), 1);
    }

    #[test]
    fn test_copy_paste_selects_fresh_copies() {
        let mut editor = Editor::default();
        line(&mut editor, 0.0);
        assert!(!editor.copy());
        editor.select_all();
        let original = editor.selection().ids()[0];
        assert!(editor.copy());
        assert!(editor.paste());
        assert!(editor.paste());

        let strokes = editor.document().current().strokes();
        assert_eq!(strokes.len(), 3);
        assert_ne!(strokes[1].id(), strokes[2].id());
        assert!((strokes[1].points[0].x - 20.0).abs() < 1e-9);
        assert!(!editor.selection().contains(original));
        assert!(editor.selection().contains(strokes[2].id()));
        assert_eq!(editor.history().undo_len(), 3);
    }

    #[test]
    fn test_paste_empty_clipboard() {
        let mut editor = Editor::default();
        assert!(!editor.paste());
        assert!(!editor.duplicate());
    }

    #[test]
    fn test_cut_then_undo_restores_position() {
        let mut editor = Editor::default();
        for i in 0..3 {
            line(&mut editor, i as f64 * 100.0);
        }
        let middle = editor.document().current().strokes()[1].id();
        draw(&mut editor, &select_tool(), &[(-10.0, 90.0), (200.0, 110.0)]);
        assert_eq!(editor.selection().ids(), &[middle]);

        assert!(editor.cut());
        assert!(editor.selection().is_empty());
        assert_eq!(editor.document().current().strokes().len(), 2);
        assert_eq!(editor.clipboard().len(), 1);
        assert_eq!(editor.history().last().unwrap().kind().as_str(), "delete_stroke");

        assert!(editor.undo());
        assert_eq!(editor.document().current().strokes()[1].id(), middle);
        assert!(editor.redo());
        assert!(!editor.document().current().contains(middle));
    }

    #[test]
    fn test_duplicate() {
        let mut editor = Editor::default();
        line(&mut editor, 0.0);
        editor.select_all();
        assert!(editor.duplicate());
        assert_eq!(editor.document().current().strokes().len(), 2);
        assert_eq!(editor.selection().len(), 1);
    }

    #[test]
    fn test_undo_prunes_selection() {
        let mut editor = Editor::default();
        line(&mut editor, 0.0);
        editor.select_all();
        assert!(editor.undo());
        assert!(editor.selection().is_empty());
        assert!(editor.selection().bounds().is_none());
        assert!(!editor.undo());
        assert!(editor.can_redo());
    }

    #[test]
    fn test_new_action_clears_redo() {
        let mut editor = Editor::default();
        line(&mut editor, 0.0);
        editor.undo();
        line(&mut editor, 50.0);
        assert!(!editor.can_redo());
    }

    #[test]
    fn test_text_editing_cycle() {
        let mut editor = Editor::default();
        let tools = text_tool();
        editor.pointer_down(PointerInput::new(100.0, 100.0), &tools);
        assert!(editor.insert_text("Hello"));
        assert!(editor.newline());
        assert!(editor.insert_char('x'));
        assert!(editor.backspace());
        assert_eq!(editor.active_text().unwrap().text, "Hello\n");
        assert!(editor.document().current().text_boxes().is_empty());

        // Clicking elsewhere commits the previous box and opens a new one.
        editor.pointer_down(PointerInput::new(300.0, 300.0), &tools);
        let boxes = editor.document().current().text_boxes();
        assert_eq!(boxes.len(), 1);
        assert_eq!(boxes[0].position, Point::new(100.0, 100.0));
        assert_eq!(editor.active_text().unwrap().position, Point::new(300.0, 300.0));
        assert_eq!(editor.history().last().unwrap().kind().as_str(), "text_box");
    }

    #[test]
    fn test_blank_text_discarded() {
        let mut editor = Editor::default();
        editor.pointer_down(PointerInput::new(10.0, 10.0), &text_tool());
        editor.insert_text("  \n ");
        assert!(!editor.commit_text());
        assert!(editor.active_text().is_none());
        assert!(editor.document().current().is_empty());
        assert!(!editor.can_undo());
        assert!(!editor.insert_char('a'));
    }

    #[test]
    fn test_drawing_commits_open_text() {
        let mut editor = Editor::default();
        editor.pointer_down(PointerInput::new(10.0, 10.0), &text_tool());
        editor.insert_text("note");
        line(&mut editor, 200.0);
        assert!(editor.active_text().is_none());
        assert_eq!(editor.document().current().text_boxes().len(), 1);
        assert_eq!(editor.document().current().strokes().len(), 1);
    }

    #[test]
    fn test_formatting_applies_to_active_box() {
        let mut editor = Editor::default();
        let mut tools = text_tool();
        editor.pointer_down(PointerInput::new(0.0, 0.0), &tools);
        tools.bold = true;
        tools.font_size = 32.0;
        assert!(editor.apply_text_formatting(&tools));
        let active = editor.active_text().unwrap();
        assert!(active.bold);
        assert!((active.font_size - 32.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_paged_press_opens_page_under_pointer() {
        let mut editor = Editor::new(Document::a4(PageTemplate::Ruled));
        let pages = Rc::new(RefCell::new(Vec::new()));
        let seen = Rc::clone(&pages);
        editor.set_page_listener(move |page| seen.borrow_mut().push(page));

        let zoom = editor.camera().zoom;
        let stride = editor.layout().page_stride();
        let origin_x = editor.layout().offset_x(zoom);
        let doc_point = Point::new(origin_x + 50.0, 30.0 + stride * 2.0 + 100.0);
        let screen = editor.camera().to_screen(doc_point);

        let mut tools = ToolState::new();
        tools.set_shape(ShapeKind::Line);
        editor.pointer_down(PointerInput::at(screen), &tools);
        editor.pointer_up();

        assert_eq!(editor.document().current_page(), 3);
        assert_eq!(*pages.borrow(), vec![3]);
        let shape = &editor.document().page(3).unwrap().shapes()[0];
        assert!((shape.start.x - 50.0).abs() < 1e-6);
        assert!((shape.start.y - 100.0).abs() < 1e-6);
        assert!(editor.document().page(2).is_some());
        assert_eq!(editor.document().total_pages(), 3);
    }

    #[test]
    fn test_scroll_over_pressed_page_keeps_it() {
        let mut editor = Editor::new(Document::a4(PageTemplate::Blank));
        let pages = Rc::new(RefCell::new(Vec::new()));
        let seen = Rc::clone(&pages);
        editor.set_page_listener(move |page| seen.borrow_mut().push(page));

        let zoom = editor.camera().zoom;
        let stride = editor.layout().page_stride();
        let origin_x = editor.layout().offset_x(zoom);
        let doc_point = Point::new(origin_x + 50.0, 30.0 + stride * 3.0 + 100.0);
        let screen = editor.camera().to_screen(doc_point);
        let tools = ToolState::new();
        editor.pointer_down(PointerInput::at(screen), &tools);
        for i in 1..10 {
            editor.pointer_move(PointerInput::at(screen + Vec2::new(i as f64 * 10.0, 0.0)));
        }
        editor.pointer_up();

        assert_eq!(editor.document().current_page(), 4);
        assert_eq!(editor.document().total_pages(), 4);
        assert_eq!(editor.document().page(4).unwrap().strokes().len(), 1);

        let scroll = (30.0 + stride * 3.0 + 10.0) * zoom;
        assert!(!editor.update_page_from_scroll(scroll));
        assert_eq!(editor.document().current_page(), 4);
        assert_eq!(*pages.borrow(), vec![4]);
    }

    #[test]
    fn test_navigation_notifies_and_commits_text() {
        let mut editor = Editor::new(Document::a4(PageTemplate::Blank));
        let pages = Rc::new(RefCell::new(Vec::new()));
        let seen = Rc::clone(&pages);
        editor.set_page_listener(move |page| seen.borrow_mut().push(page));

        let screen = editor.camera().to_screen(Point::new(200.0, 200.0));
        editor.pointer_down(PointerInput::at(screen), &text_tool());
        editor.insert_text("page one");
        assert!(editor.next_page());
        assert_eq!(editor.document().page(1).unwrap().text_boxes().len(), 1);
        assert!(editor.go_to_page(5));
        assert!(editor.prev_page());
        assert!(!editor.go_to_page(4));
        assert_eq!(*pages.borrow(), vec![2, 5, 4]);
        assert_eq!(editor.document().total_pages(), 5);
    }

    #[test]
    fn test_canvas_has_no_pages() {
        let mut editor = Editor::default();
        assert!(!editor.next_page());
        assert!(!editor.prev_page());
        assert!(!editor.update_page_from_scroll(5000.0));
    }

    #[test]
    fn test_scroll_follows_pages() {
        let mut editor = Editor::new(Document::a4(PageTemplate::Blank));
        editor.go_to_page(3);
        editor.go_to_page(1);
        let zoom = editor.camera().zoom;
        let scroll = (30.0 + editor.layout().page_stride() + 10.0) * zoom;
        assert!(editor.update_page_from_scroll(scroll));
        assert_eq!(editor.document().current_page(), 2);
        assert!(!editor.update_page_from_scroll(scroll));
    }

    #[test]
    fn test_zoom_keeps_anchor() {
        let mut editor = Editor::default();
        editor.pan(Vec2::new(40.0, -25.0));
        let focal = Point::new(320.0, 200.0);
        let before = editor.to_document(focal);
        assert!(editor.zoom_in(focal));
        assert!(editor.zoom_in(focal));
        assert!(editor.zoom_out(focal));
        let after = editor.to_document(focal);
        assert!((before.x - after.x).abs() < 1e-9);
        assert!((before.y - after.y).abs() < 1e-9);
    }

    #[test]
    fn test_paged_zoom_limits_follow_fit() {
        let mut editor = Editor::new(Document::a4(PageTemplate::Blank));
        editor.set_viewport(Size::new(794.0, 1000.0));
        editor.reset_view();
        assert!((editor.camera().zoom - 0.8).abs() < 1e-9);
        assert!((editor.camera().min_zoom - 0.4).abs() < 1e-9);
        assert!((editor.camera().max_zoom - 2.4).abs() < 1e-9);
    }

    #[test]
    fn test_clear_resets_history_and_selection() {
        let mut editor = Editor::default();
        line(&mut editor, 0.0);
        editor.select_all();
        editor.clear();
        assert!(editor.document().current().is_empty());
        assert!(editor.selection().is_empty());
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_render_overlay_during_gestures() {
        let mut editor = Editor::default();
        line(&mut editor, 0.0);
        let mut tools = ToolState::new();
        tools.set_shape(ShapeKind::Circle);
        editor.pointer_down(PointerInput::new(0.0, 50.0), &tools);
        editor.pointer_move(PointerInput::new(40.0, 90.0));

        let mut sink = RecordingSink::default();
        editor.render(&mut sink);
        assert_eq!(sink.calls, vec!["stroke:pen", "preview"]);

        editor.pointer_up();
        editor.select_all();
        let mut sink = RecordingSink::default();
        editor.render(&mut sink);
        assert_eq!(sink.calls, vec!["stroke:pen", "shape", "selection"]);
    }

    #[test]
    fn test_save_and_load() {
        let storage = MemoryStorage::new();
        let mut editor = Editor::default();
        line(&mut editor, 0.0);
        editor.save(&storage, "note").unwrap();

        let mut other = Editor::new(Document::a4(PageTemplate::Grid));
        other.load(&storage, "note").unwrap();
        assert!(!other.document().is_paged());
        assert_eq!(other.document().current().strokes().len(), 1);
        assert!(!other.can_undo());
    }

    #[test]
    fn test_failed_load_keeps_document() {
        let storage = MemoryStorage::new();
        let mut editor = Editor::default();
        line(&mut editor, 0.0);
        assert!(editor.load(&storage, "missing").is_err());
        assert_eq!(editor.document().current().strokes().len(), 1);
        assert!(editor.can_undo());
    }
}
