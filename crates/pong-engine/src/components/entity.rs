use glam::Vec2;
use crate::api::types::EntityId;
#[cfg(feature = "physics")]
use crate::core::physics::PhysicsBody;

/// Fat Entity: a single struct with optional components.
/// Designed for simplicity and rapid prototyping over ECS purity.
#[derive(Debug, Clone)]
pub struct Entity {
    /// Unique identifier.
    pub id: EntityId,
    /// String tag for finding entities by name.
    pub tag: String,
    /// Whether this entity is active (inactive entities are skipped).
    pub active: bool,
    /// Whether pointer input may pick and drag this entity.
    pub interactive: bool,
    /// Position in world space.
    pub pos: Vec2,
    /// Rotation in radians.
    pub rotation: f32,
    /// World-space size (diameter for round bodies). Also the pick area for input.
    pub size: Vec2,
    /// Physics body (optional, requires "physics" feature).
    #[cfg(feature = "physics")]
    pub body: Option<PhysicsBody>,
}

impl Entity {
    /// Create a new entity with the given ID at the origin.
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            tag: String::new(),
            active: true,
            interactive: false,
            pos: Vec2::ZERO,
            rotation: 0.0,
            size: Vec2::ONE,
            #[cfg(feature = "physics")]
            body: None,
        }
    }

    // -- Builder pattern --

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_pos(mut self, pos: Vec2) -> Self {
        self.pos = pos;
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_size(mut self, size: Vec2) -> Self {
        self.size = size;
        self
    }

    pub fn with_interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    #[cfg(feature = "physics")]
    pub fn with_body(mut self, body: PhysicsBody) -> Self {
        self.body = Some(body);
        self
    }

    /// Whether a world point falls inside this entity's pick ellipse.
    pub fn contains_point(&self, point: Vec2) -> bool {
        let half = self.size * 0.5;
        if half.x <= 0.0 || half.y <= 0.0 {
            return false;
        }
        let d = (point - self.pos) / half;
        d.length_squared() <= 1.0
    }
}
