//! Stroke-mode and pixel-mode erasing.

use crate::document::Layer;
use crate::geometry::InkPoint;
use crate::shapes::{Drawable, Entity, EntityId, Stroke};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// How strokes react to the eraser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EraserMode {
    /// Touching any sample removes the whole stroke.
    Stroke,
    /// Only touched samples are removed; the rest is split into pieces.
    #[default]
    Pixel,
}

/// What one erase step changed.
#[derive(Debug, Default)]
pub struct EraseOutcome {
    /// Entities removed outright or replaced by pieces.
    pub removed: Vec<Entity>,
    /// Ids of the stroke pieces that replaced split strokes.
    pub added: Vec<EntityId>,
}

impl EraseOutcome {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty()
    }
}

/// Split `points` at every index in `erased` (ascending) into the maximal
/// runs of surviving points. Runs shorter than two points are dropped.
///
/// Indices past the end, repeated or out of order are skipped.
pub fn split_at_erased(points: &[InkPoint], erased: &[usize]) -> Vec<Vec<InkPoint>> {
    let mut runs = Vec::new();
    let mut start = 0;
    for &index in erased {
        if index >= points.len() || index < start {
            continue;
        }
        if index >= start + 2 {
            runs.push(points[start..index].to_vec());
        }
        start = index + 1;
    }
    if points.len() >= start + 2 {
        runs.push(points[start..].to_vec());
    }
    runs
}

/// Erase everything within `radius` of `point` in `layer`.
///
/// Shapes and text boxes go whole when the point falls inside their bounds
/// grown by `radius`.
pub fn erase_at(layer: &mut Layer, point: Point, radius: f64, mode: EraserMode) -> EraseOutcome {
    let mut outcome = EraseOutcome::default();

    let hits: Vec<(EntityId, Vec<usize>)> = layer
        .strokes()
        .iter()
        .filter_map(|s| {
            let indices = s.indices_within(point, radius);
            (!indices.is_empty()).then(|| (s.id(), indices))
        })
        .collect();

    for (id, indices) in hits {
        let pieces: Vec<Stroke> = match mode {
            EraserMode::Stroke => Vec::new(),
            EraserMode::Pixel => {
                let Some(original) = layer.stroke(id) else {
                    continue;
                };
                split_at_erased(&original.points, &indices)
                    .into_iter()
                    .map(|run| original.with_same_style(run))
                    .collect()
            }
        };
        outcome.added.extend(pieces.iter().map(|s| s.id()));
        if let Some(removed) = layer.replace_stroke(id, pieces) {
            outcome.removed.push(Entity::Stroke(removed));
        }
    }

    outcome
        .removed
        .extend(layer.take_shapes_and_text_where(|d| d.hit_test(point, radius)));

    if !outcome.is_empty() {
        log::debug!(
            "Erased {} entities at ({:.1}, {:.1}), {} pieces left",
            outcome.removed.len(),
            point.x,
            point.y,
            outcome.added.len()
        );
    }
    outcome
}
