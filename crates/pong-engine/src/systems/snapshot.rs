use bytemuck::{Pod, Zeroable};
use crate::components::entity::Entity;

/// Per-entity transform written to SharedArrayBuffer for the host renderer.
/// Must match the host protocol: 6 floats = 24 bytes stride.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct TransformInstance {
    pub id: f32,
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    /// World-space size along X (diameter for balls).
    pub size: f32,
    /// Bit flags, see `FLAG_*`.
    pub flags: f32,
}

impl TransformInstance {
    pub const FLOATS: usize = 6;
    pub const FLAG_INTERACTIVE: u32 = 1;
}

/// Rebuild the transform snapshot from the active entities.
pub fn build_transform_buffer<'a>(
    entities: impl Iterator<Item = &'a Entity>,
    buffer: &mut Vec<TransformInstance>,
    max_instances: usize,
) {
    buffer.clear();
    for entity in entities.filter(|e| e.active).take(max_instances) {
        let mut flags = 0;
        if entity.interactive {
            flags |= TransformInstance::FLAG_INTERACTIVE;
        }
        buffer.push(TransformInstance {
            id: entity.id.0 as f32,
            x: entity.pos.x,
            y: entity.pos.y,
            rotation: entity.rotation,
            size: entity.size.x,
            flags: flags as f32,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::EntityId;
    use glam::Vec2;

    #[test]
    fn snapshot_skips_inactive_and_sets_flags() {
        let mut hidden = Entity::new(EntityId(2));
        hidden.active = false;
        let entities = vec![
            Entity::new(EntityId(1))
                .with_pos(Vec2::new(10.0, 20.0))
                .with_size(Vec2::splat(30.0))
                .with_interactive(true),
            hidden,
        ];

        let mut buffer = Vec::new();
        build_transform_buffer(entities.iter(), &mut buffer, 8);
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer[0].id, 1.0);
        assert_eq!(buffer[0].size, 30.0);
        assert_eq!(buffer[0].flags, TransformInstance::FLAG_INTERACTIVE as f32);
    }

    #[test]
    fn snapshot_respects_capacity() {
        let entities: Vec<Entity> = (0..5).map(|i| Entity::new(EntityId(i))).collect();
        let mut buffer = Vec::new();
        build_transform_buffer(entities.iter(), &mut buffer, 3);
        assert_eq!(buffer.len(), 3);
    }
}
