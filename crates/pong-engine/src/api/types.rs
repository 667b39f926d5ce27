use bytemuck::{Pod, Zeroable};

/// Unique identifier for an entity in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

/// Identifier of a single collision part (one collider) of a physics body.
/// A body made of several colliders owns several parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartId(pub u32);

/// A sound cue emitted by the game logic.
/// The numeric value maps to a game-defined sound on the host side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct SoundEvent(pub u32);

/// A game event communicated from Rust to the host via SharedArrayBuffer.
/// Generic container: `kind` identifies the event, `a/b/c` carry payload.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct GameEvent {
    pub kind: f32,
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

impl GameEvent {
    pub const FLOATS: usize = 4;

    pub fn new(kind: f32, a: f32, b: f32, c: f32) -> Self {
        Self { kind, a, b, c }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_event_is_four_floats() {
        assert_eq!(std::mem::size_of::<GameEvent>(), GameEvent::FLOATS * 4);
        let event = GameEvent::new(1.0, 2.0, 3.0, 4.0);
        let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&event));
        assert_eq!(floats, &[1.0, 2.0, 3.0, 4.0]);
    }
}
