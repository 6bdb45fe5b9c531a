//! View transform: pan/zoom and the stacked page layout.

use crate::config::EditorConfig;
use crate::document::NoteKind;
use kurbo::{Affine, Point, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Camera manages the view transform for the document.
///
/// Screen coordinates map to document coordinates as
/// `((x - offset.x) / zoom, (y - offset.y) / zoom)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Current translation offset (pan), in screen units.
    pub offset: Vec2,
    /// Current zoom level; 1.0 is one document unit per pixel.
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0,
            min_zoom: 0.1,
            max_zoom: 10.0,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Document to screen.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.zoom)
    }

    /// Screen to document.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.offset)
    }

    pub fn to_document(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    pub fn to_screen(&self, document_point: Point) -> Point {
        self.transform() * document_point
    }

    /// Pan the camera by a delta in screen coordinates.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Set new zoom limits and pull the current zoom inside them.
    pub fn set_zoom_limits(&mut self, min_zoom: f64, max_zoom: f64) {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom.max(min_zoom);
        self.zoom = self.zoom.clamp(self.min_zoom, self.max_zoom);
    }

    /// Zoom by `factor`, keeping `focal` (screen space) over the same document point.
    ///
    /// Returns `false` if the clamped zoom did not change.
    pub fn zoom_at(&mut self, focal: Point, factor: f64) -> bool {
        let new_zoom = (self.zoom * factor).clamp(self.min_zoom, self.max_zoom);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return false;
        }

        let anchor = self.to_document(focal);
        self.zoom = new_zoom;

        let moved = self.to_screen(anchor);
        self.offset += focal - moved;
        true
    }

    pub fn zoom_in(&mut self, focal: Point, step: f64) -> bool {
        self.zoom_at(focal, step)
    }

    pub fn zoom_out(&mut self, focal: Point, step: f64) -> bool {
        self.zoom_at(focal, 1.0 / step)
    }

    /// Reset pan to zero and zoom to `zoom` (clamped).
    pub fn reset(&mut self, zoom: f64) {
        self.offset = Vec2::ZERO;
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
    }
}

/// Zoom that makes a page fill `fit_ratio` of the viewport width.
pub fn fit_zoom(viewport_width: f64, page_width: f64, config: &EditorConfig) -> f64 {
    if viewport_width <= 0.0 || page_width <= 0.0 {
        return 1.0;
    }
    (viewport_width * config.fit_ratio / page_width).clamp(config.canvas_min_zoom, config.canvas_max_zoom)
}

/// Allowed zoom range for a note kind.
pub fn zoom_range(note_kind: NoteKind, fit_zoom: f64, config: &EditorConfig) -> (f64, f64) {
    match note_kind {
        NoteKind::Canvas => (config.canvas_min_zoom, config.canvas_max_zoom),
        NoteKind::PagedA4 => (
            config.paged_zoom_floor.max(fit_zoom * config.paged_min_fit_multiplier),
            fit_zoom * config.paged_max_fit_multiplier,
        ),
    }
}

/// Vertical stack of pages, centred horizontally in the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    pub viewport: Size,
    pub page_size: Size,
    pub page_gap: f64,
    pub top_padding: f64,
    pub margin_ratio: f64,
}

impl PageLayout {
    pub fn new(viewport: Size, page_size: Size, config: &EditorConfig) -> Self {
        Self {
            viewport,
            page_size,
            page_gap: config.page_gap,
            top_padding: config.page_top_padding,
            margin_ratio: config.page_margin_ratio,
        }
    }

    /// Horizontal document-space offset of every page's left edge.
    pub fn offset_x(&self, zoom: f64) -> f64 {
        self.viewport.width / zoom * self.margin_ratio
    }

    /// Distance between the tops of consecutive pages.
    pub fn page_stride(&self) -> f64 {
        self.page_size.height + self.page_gap
    }

    /// Document-space top-left corner of page `page` (1-based).
    pub fn page_origin(&self, page: u32, zoom: f64) -> Point {
        let index = f64::from(page.max(1) - 1);
        Point::new(self.offset_x(zoom), self.top_padding + index * self.page_stride())
    }

    /// Page under a document-space point; anything above the first page is page 1.
    pub fn resolve_page(&self, document_point: Point) -> u32 {
        let rel = document_point.y - self.top_padding;
        let index = (rel / self.page_stride()).floor().max(0.0);
        // Saturating float to int conversion.
        (index as u32).saturating_add(1)
    }

    /// Convert a document-space point to coordinates on `page`, clamped to the page.
    pub fn to_page_coords(&self, document_point: Point, page: u32, zoom: f64) -> Point {
        let origin = self.page_origin(page, zoom);
        let local = document_point - origin.to_vec2();
        Point::new(
            local.x.clamp(0.0, self.page_size.width),
            local.y.clamp(0.0, self.page_size.height),
        )
    }

    /// Infer the visible page from a vertical scroll position, clamped to `[1, last_page]`.
    pub fn page_from_scroll(&self, scroll_y: f64, camera: &Camera, last_page: u32) -> u32 {
        let adjusted = (scroll_y - camera.offset.y) / camera.zoom;
        let page = if adjusted < self.top_padding {
            1
        } else {
            self.resolve_page(Point::new(0.0, adjusted))
        };
        page.clamp(1, last_page.max(1))
    }
}
