//! Penpage Core Library
//!
//! Document model and editing engine for a pen-first note-taking app:
//! freehand strokes, geometric shapes and text boxes, on a single canvas
//! or on stacked A4 pages.

pub mod camera;
pub mod config;
pub mod document;
pub mod editor;
pub mod eraser;
pub mod geometry;
pub mod history;
pub mod render;
pub mod selection;
pub mod shapes;
pub mod storage;
pub mod tools;

pub use camera::{Camera, PageLayout};
pub use config::EditorConfig;
pub use document::{Document, Layer, NoteKind, PageTemplate};
pub use editor::{Editor, PointerInput};
pub use eraser::EraserMode;
pub use geometry::InkPoint;
pub use history::{Command, CommandKind, History};
pub use render::DrawSink;
pub use selection::{Clipboard, Selection};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError, StorageResult};
pub use shapes::{Drawable, Entity, EntityId, EntityKind, LineStyle, PenKind, Rgba, Shape, ShapeKind, Stroke, TextBox};
pub use tools::{Tool, ToolState};
