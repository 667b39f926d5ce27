use glam::Vec2;
use crate::api::types::EntityId;
use crate::components::entity::Entity;

/// Simple entity storage using a flat Vec.
/// Designed for small-to-medium entity counts (hundreds, not millions).
/// Spawn order is preserved so later entities sit "on top" for picking.
pub struct Scene {
    entities: Vec<Entity>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            entities: Vec::with_capacity(64),
        }
    }

    /// Add an entity to the scene.
    pub fn spawn(&mut self, entity: Entity) {
        self.entities.push(entity);
    }

    /// Remove an entity by ID. Returns the removed entity if found.
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        let idx = self.entities.iter().position(|e| e.id == id)?;
        Some(self.entities.remove(idx))
    }

    /// Get a reference to an entity by ID.
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    /// Get a mutable reference to an entity by ID.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    /// Iterate over all entities.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    /// Iterate over all entities mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    /// Topmost active, interactive entity under `point`.
    pub fn pick(&self, point: Vec2) -> Option<EntityId> {
        self.entities
            .iter()
            .rev()
            .find(|e| e.active && e.interactive && e.contains_point(point))
            .map(|e| e.id)
    }

    /// Number of entities in the scene.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the scene is empty.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
