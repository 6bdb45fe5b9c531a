//! Selection (an id set over live entities) and the clipboard.

use crate::document::Layer;
use crate::geometry::{rect_contains, union_all};
use crate::shapes::{Drawable, Entity, EntityId};
use kurbo::{Point, Rect, Vec2};
use std::collections::HashSet;

/// Entities currently selected in the current view.
///
/// Membership is by id; the cached bounds follow every change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    ids: Vec<EntityId>,
    members: HashSet<EntityId>,
    bounds: Option<Rect>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ids(&self) -> &[EntityId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.members.contains(&id)
    }

    /// Union of the members' bounds, `None` when empty.
    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    /// Add an entity of `layer`. Unknown ids and duplicates are ignored.
    pub fn add(&mut self, id: EntityId, layer: &Layer) -> bool {
        let Some(b) = layer.bounds_of(id) else {
            return false;
        };
        if !self.members.insert(id) {
            return false;
        }
        self.ids.push(id);
        self.bounds = Some(self.bounds.map_or(b, |u| u.union(b)));
        true
    }

    pub fn remove(&mut self, id: EntityId, layer: &Layer) -> bool {
        if !self.members.remove(&id) {
            return false;
        }
        self.ids.retain(|&member| member != id);
        self.refresh(layer);
        true
    }

    /// Replace the membership with `ids`, keeping only those present in `layer`.
    pub fn set(&mut self, ids: impl IntoIterator<Item = EntityId>, layer: &Layer) {
        self.ids.clear();
        self.members.clear();
        for id in ids {
            if self.members.insert(id) {
                self.ids.push(id);
            }
        }
        self.refresh(layer);
    }

    pub fn clear(&mut self) {
        self.ids.clear();
        self.members.clear();
        self.bounds = None;
    }

    /// Drop members no longer in `layer` and recompute the bounds.
    pub fn refresh(&mut self, layer: &Layer) {
        self.ids.retain(|&id| layer.contains(id));
        self.members.retain(|&id| layer.contains(id));
        self.bounds = union_all(self.ids.iter().filter_map(|&id| layer.bounds_of(id)));
    }

    /// Whether `point` lies inside the selection bounds (edges included).
    pub fn contains_point(&self, point: Point) -> bool {
        self.bounds.is_some_and(|b| rect_contains(b, point))
    }

    /// Move every member in place; the cached bounds shift with them.
    pub fn translate(&mut self, layer: &mut Layer, delta: Vec2) {
        for &id in &self.ids {
            layer.translate(id, delta);
        }
        self.bounds = self.bounds.map(|b| b + delta);
    }

    /// Corner and edge-midpoint handles, clockwise from the top-left.
    pub fn handles(&self) -> Option<[Point; 8]> {
        self.bounds.map(handle_positions)
    }
}

fn handle_positions(b: Rect) -> [Point; 8] {
    let c = b.center();
    [
        Point::new(b.x0, b.y0),
        Point::new(c.x, b.y0),
        Point::new(b.x1, b.y0),
        Point::new(b.x1, c.y),
        Point::new(b.x1, b.y1),
        Point::new(c.x, b.y1),
        Point::new(b.x0, b.y1),
        Point::new(b.x0, c.y),
    ]
}

/// Deep copy of a selection, detached from the document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Clipboard {
    entities: Vec<Entity>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the selected entities of `layer`.
    pub fn from_selection(selection: &Selection, layer: &Layer) -> Self {
        Self {
            entities: selection.ids().iter().filter_map(|&id| layer.entity(id)).collect(),
        }
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Fresh copies of the snapshot, offset by `offset`, each with a new id.
    pub fn instantiate(&self, offset: Vec2) -> Vec<Entity> {
        self.entities
            .iter()
            .cloned()
            .map(|mut e| {
                e.regenerate_id();
                e.translate(offset);
                e
            })
            .collect()
    }
}
