//! Undo/redo command stacks.

use crate::document::Layer;
use crate::shapes::{Drawable, Entity, EntityKind};

/// Tag of a recorded command, as shown to users and in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Stroke,
    Shape,
    TextBox,
    DeleteStroke,
    DeleteShape,
    DeleteTextBox,
}

impl CommandKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CommandKind::Stroke => "stroke",
            CommandKind::Shape => "shape",
            CommandKind::TextBox => "text_box",
            CommandKind::DeleteStroke => "delete_stroke",
            CommandKind::DeleteShape => "delete_shape",
            CommandKind::DeleteTextBox => "delete_text_box",
        }
    }
}

/// A reversible edit. The payload is an owned copy carrying the entity's id.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// An entity was added to the current view.
    Add(Entity),
    /// An entity was removed from position `index` of its collection.
    Delete { entity: Entity, index: usize },
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Add(e) => match e.kind() {
                EntityKind::Stroke => CommandKind::Stroke,
                EntityKind::Shape => CommandKind::Shape,
                EntityKind::TextBox => CommandKind::TextBox,
            },
            Command::Delete { entity, .. } => match entity.kind() {
                EntityKind::Stroke => CommandKind::DeleteStroke,
                EntityKind::Shape => CommandKind::DeleteShape,
                EntityKind::TextBox => CommandKind::DeleteTextBox,
            },
        }
    }

    pub fn entity(&self) -> &Entity {
        match self {
            Command::Add(e) | Command::Delete { entity: e, .. } => e,
        }
    }

    /// Reverse the command against `layer`.
    ///
    /// Undoing an add whose entity is not in `layer` does nothing.
    pub fn revert(&self, layer: &mut Layer) {
        match self {
            Command::Add(entity) => {
                layer.remove(entity.id());
            }
            Command::Delete { entity, index } => {
                if !layer.contains(entity.id()) {
                    layer.insert_at(entity.clone(), *index);
                }
            }
        }
    }

    /// Re-apply the command against `layer`.
    pub fn apply(&self, layer: &mut Layer) {
        match self {
            Command::Add(entity) => {
                if !layer.contains(entity.id()) {
                    layer.add(entity.clone());
                }
            }
            Command::Delete { entity, .. } => {
                layer.remove(entity.id());
            }
        }
    }
}

/// Undo and redo stacks.
#[derive(Debug, Clone, Default)]
pub struct History {
    undo: Vec<Command>,
    redo: Vec<Command>,
    limit: Option<usize>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// History that keeps at most `limit` undo steps; `None` is unbounded.
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    /// Record a user action. Clears the redo stack.
    pub fn push(&mut self, command: Command) {
        self.undo.push(command);
        self.redo.clear();
        if let Some(limit) = self.limit {
            let excess = self.undo.len().saturating_sub(limit);
            self.undo.drain(..excess);
        }
    }

    /// Undo the last command against `layer`. Returns its kind, or `None` if
    /// there was nothing to undo.
    pub fn undo(&mut self, layer: &mut Layer) -> Option<CommandKind> {
        let command = self.undo.pop()?;
        command.revert(layer);
        let kind = command.kind();
        self.redo.push(command);
        Some(kind)
    }

    /// Redo the last undone command against `layer`.
    pub fn redo(&mut self, layer: &mut Layer) -> Option<CommandKind> {
        let command = self.redo.pop()?;
        command.apply(layer);
        let kind = command.kind();
        self.undo.push(command);
        Some(kind)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    /// Most recent undoable command.
    pub fn last(&self) -> Option<&Command> {
        self.undo.last()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::InkPoint;
    use crate::shapes::{Shape, ShapeKind, Stroke};
    use kurbo::Point;

    fn stroke(x: f64) -> Stroke {
        Stroke::from_points(vec![InkPoint::new(x, 0.0), InkPoint::new(x + 10.0, 0.0)])
    }

    #[test]
    fn test_command_kinds() {
        let add = Command::Add(Entity::Stroke(stroke(0.0)));
        assert_eq!(add.kind().as_str(), "stroke");
        let del = Command::Delete {
            entity: Entity::Shape(Shape::new(ShapeKind::Circle, Point::ZERO, Point::new(4.0, 4.0))),
            index: 0,
        };
        assert_eq!(del.kind().as_str(), "delete_shape");
    }

    #[test]
    fn test_undo_redo_add() {
        let mut layer = Layer::new();
        let mut history = History::new();
        let s = stroke(0.0);
        layer.add_stroke(s.clone());
        history.push(Command::Add(Entity::Stroke(s)));

        assert_eq!(history.undo(&mut layer), Some(CommandKind::Stroke));
        assert!(layer.is_empty());
        assert!(history.can_redo());

        assert_eq!(history.redo(&mut layer), Some(CommandKind::Stroke));
        assert_eq!(layer.strokes().len(), 1);
        assert!(history.undo(&mut Layer::new()).is_some());
        assert!(history.undo(&mut layer).is_none());
    }

    #[test]
    fn test_undo_delete_restores_index() {
        let mut layer = Layer::new();
        let strokes: Vec<_> = (0..5).map(|i| stroke(i as f64 * 20.0)).collect();
        let target = strokes[2].id();
        for s in strokes {
            layer.add_stroke(s);
        }
        let mut history = History::new();
        let (entity, index) = layer.remove(target).unwrap();
        history.push(Command::Delete { entity, index });

        history.undo(&mut layer);
        assert_eq!(layer.strokes()[2].id(), target);
        history.redo(&mut layer);
        assert!(!layer.contains(target));
    }

    #[test]
    fn test_push_clears_redo() {
        let mut layer = Layer::new();
        let mut history = History::new();
        history.push(Command::Add(Entity::Stroke(stroke(0.0))));
        history.undo(&mut layer);
        assert!(history.can_redo());
        history.push(Command::Add(Entity::Stroke(stroke(5.0))));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut history = History::with_limit(Some(2));
        for i in 0..4 {
            history.push(Command::Add(Entity::Stroke(stroke(i as f64))));
        }
        assert_eq!(history.undo_len(), 2);
        assert_eq!(history.last().unwrap().entity(), &Entity::Stroke(stroke(3.0)));
    }

    #[test]
    fn test_undo_missing_entity_is_silent() {
        let mut layer = Layer::new();
        layer.add_stroke(stroke(50.0));
        let mut history = History::new();
        history.push(Command::Add(Entity::Stroke(stroke(0.0))));
        assert!(history.undo(&mut layer).is_some());
        assert_eq!(layer.len(), 1);
    }
}
