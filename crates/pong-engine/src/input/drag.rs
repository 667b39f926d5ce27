//! Drag gesture recognition.
//!
//! Turns raw pointer events into per-entity drag events: a press on an
//! interactive entity starts a drag, moves report the entity's would-be
//! position (pointer minus the grab offset), and the release ends it.
//! Only one entity is dragged at a time.

use glam::Vec2;
use crate::api::types::EntityId;
use crate::core::scene::Scene;
use crate::input::queue::InputEvent;

/// A drag event targeted at a single entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragEvent {
    Start { target: EntityId },
    /// `pos` is where the entity would be if it followed the pointer exactly.
    Move { target: EntityId, pos: Vec2 },
    End { target: EntityId },
}

impl DragEvent {
    pub fn target(&self) -> EntityId {
        match *self {
            DragEvent::Start { target }
            | DragEvent::Move { target, .. }
            | DragEvent::End { target } => target,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ActiveDrag {
    target: EntityId,
    grab_offset: Vec2,
}

/// Stateful pointer-to-drag translator.
#[derive(Debug, Default)]
pub struct DragGesture {
    active: Option<ActiveDrag>,
}

impl DragGesture {
    pub fn new() -> Self {
        Self { active: None }
    }

    /// The entity currently being dragged, if any.
    pub fn target(&self) -> Option<EntityId> {
        self.active.map(|d| d.target)
    }

    /// Forget the current drag without emitting an end event
    /// (the target was despawned or the level was reset).
    pub fn cancel(&mut self) {
        self.active = None;
    }

    /// Feed one pointer event. Non-pointer events are ignored.
    pub fn handle(&mut self, event: &InputEvent, scene: &Scene) -> Option<DragEvent> {
        match *event {
            InputEvent::PointerDown { x, y } => {
                if self.active.is_some() {
                    return None;
                }
                let point = Vec2::new(x, y);
                let target = scene.pick(point)?;
                let origin = scene.get(target)?.pos;
                self.active = Some(ActiveDrag {
                    target,
                    grab_offset: point - origin,
                });
                Some(DragEvent::Start { target })
            }
            InputEvent::PointerMove { x, y } => {
                let drag = self.active?;
                Some(DragEvent::Move {
                    target: drag.target,
                    pos: Vec2::new(x, y) - drag.grab_offset,
                })
            }
            InputEvent::PointerUp { .. } => {
                let drag = self.active.take()?;
                Some(DragEvent::End { target: drag.target })
            }
            InputEvent::Custom { .. } => None,
        }
    }
}
