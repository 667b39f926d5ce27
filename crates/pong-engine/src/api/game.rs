use crate::core::scene::Scene;
use crate::api::types::{EntityId, SoundEvent, GameEvent};
use crate::input::queue::InputQueue;
use crate::systems::overlay::OverlayState;
#[cfg(feature = "physics")]
use crate::core::physics::{PhysicsWorld, BodyDesc, ColliderMaterial, CollisionPair};
#[cfg(feature = "physics")]
use crate::components::entity::Entity;
#[cfg(feature = "physics")]
use glam::Vec2;

/// Configuration for the engine, provided by the game.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Fixed timestep in seconds (default: 1/60).
    pub fixed_dt: f32,
    /// World width in game units.
    pub world_width: f32,
    /// World height in game units.
    pub world_height: f32,
    /// Maximum number of entity transforms exported per frame (default: 128).
    pub max_transforms: usize,
    /// Maximum number of overlay line segments per frame (default: 1024).
    pub max_overlay_segments: usize,
    /// Maximum number of sound events per frame (default: 32).
    pub max_sounds: usize,
    /// Maximum number of game events per frame (default: 32).
    pub max_events: usize,
    /// Gravity vector for physics simulation, in units per second squared.
    /// Y points down, so positive Y is downward gravity.
    #[cfg(feature = "physics")]
    pub gravity: glam::Vec2,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            world_width: 800.0,
            world_height: 600.0,
            max_transforms: 128,
            max_overlay_segments: 1024,
            max_sounds: 32,
            max_events: 32,
            #[cfg(feature = "physics")]
            gravity: glam::Vec2::ZERO,
        }
    }
}

/// The core contract every game must fulfill.
pub trait Game {
    /// Return engine configuration. Called once before init.
    fn config(&self) -> GameConfig {
        GameConfig::default()
    }

    /// Setup initial state, spawn entities, configure the scene.
    fn init(&mut self, ctx: &mut EngineContext);

    /// One fixed step. Physics has already been stepped for this tick, so
    /// `ctx.collisions()` holds the contacts of the step just simulated.
    fn update(&mut self, ctx: &mut EngineContext, input: &InputQueue);
}

/// Mutable access to engine state, passed to Game::init and Game::update.
pub struct EngineContext {
    pub scene: Scene,
    pub overlay: OverlayState,
    pub sounds: Vec<SoundEvent>,
    pub events: Vec<GameEvent>,
    next_id: u32,
    #[cfg(feature = "physics")]
    pub physics: PhysicsWorld,
    #[cfg(feature = "physics")]
    collision_events: Vec<CollisionPair>,
}

impl EngineContext {
    pub fn new() -> Self {
        Self::with_config(&GameConfig::default())
    }

    /// Create an EngineContext sized and tuned for `config`.
    pub fn with_config(config: &GameConfig) -> Self {
        #[cfg(feature = "physics")]
        let physics = {
            let mut world = PhysicsWorld::new(config.gravity);
            world.set_dt(config.fixed_dt);
            world
        };
        Self {
            scene: Scene::new(),
            overlay: OverlayState::new(config.max_overlay_segments),
            sounds: Vec::with_capacity(config.max_sounds),
            events: Vec::with_capacity(config.max_events),
            next_id: 1,
            #[cfg(feature = "physics")]
            physics,
            #[cfg(feature = "physics")]
            collision_events: Vec::new(),
        }
    }

    /// Generate the next unique entity ID.
    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Emit a sound cue to be forwarded to the host.
    pub fn emit_sound(&mut self, event: SoundEvent) {
        self.sounds.push(event);
    }

    /// Emit a game event to be forwarded to the host.
    pub fn emit_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Clear per-frame transient data (sounds, events, overlay, collision events).
    pub fn clear_frame_data(&mut self) {
        self.sounds.clear();
        self.events.clear();
        self.overlay.clear();
        #[cfg(feature = "physics")]
        self.collision_events.clear();
    }

    // -- Physics convenience methods --

    /// Spawn an entity with a physics body. Returns the EntityId.
    #[cfg(feature = "physics")]
    pub fn spawn_with_body(
        &mut self,
        entity: Entity,
        desc: BodyDesc,
        material: ColliderMaterial,
    ) -> EntityId {
        let id = entity.id;
        let body = self.physics.create_body(id, &desc, material);
        let entity = entity
            .with_pos(desc.position)
            .with_rotation(desc.rotation)
            .with_body(body);
        self.scene.spawn(entity);
        id
    }

    /// Despawn an entity, cleaning up its physics body if present.
    #[cfg(feature = "physics")]
    pub fn despawn(&mut self, id: EntityId) {
        if let Some(entity) = self.scene.despawn(id) {
            if let Some(body) = &entity.body {
                self.physics.remove_body(body);
            }
        }
    }

    /// Teleport an entity and its body.
    #[cfg(feature = "physics")]
    pub fn set_transform(&mut self, id: EntityId, pos: Vec2, rotation: f32) {
        if let Some(entity) = self.scene.get_mut(id) {
            entity.pos = pos;
            entity.rotation = rotation;
            if let Some(body) = entity.body {
                self.physics.set_position(&body, pos, rotation);
            }
        }
    }

    /// Collision events from the most recent physics step.
    #[cfg(feature = "physics")]
    pub fn collisions(&self) -> &[CollisionPair] {
        &self.collision_events
    }

    /// Step the physics simulation and sync positions back to entities.
    /// Called by the game runner before each `Game::update()`.
    #[cfg(feature = "physics")]
    pub fn step_physics(&mut self) {
        self.collision_events.clear();
        self.physics.step_into(&mut self.collision_events);

        for entity in self.scene.iter_mut() {
            if let Some(body) = &entity.body {
                let (pos, rot) = self.physics.body_position(body);
                entity.pos = pos;
                entity.rotation = rot;
            }
        }
    }
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[cfg(feature = "physics")]
mod physics_tests {
    use super::*;
    use crate::core::physics::{BodyDesc, ColliderDesc, ColliderMaterial};

    #[test]
    fn spawn_with_body_creates_entity_and_physics() {
        let mut ctx = EngineContext::new();
        let id = ctx.next_id();
        let desc = BodyDesc::dynamic(ColliderDesc::Ball { radius: 10.0 })
            .with_position(Vec2::new(100.0, 200.0));

        ctx.spawn_with_body(Entity::new(id), desc, ColliderMaterial::default());

        assert_eq!(ctx.scene.len(), 1);
        assert_eq!(ctx.physics.body_count(), 1);
        let entity = ctx.scene.get(id).expect("spawned");
        assert!(entity.body.is_some());
        assert_eq!(entity.pos, Vec2::new(100.0, 200.0));
    }

    #[test]
    fn despawn_cleans_up_physics() {
        let mut ctx = EngineContext::new();
        let id = ctx.next_id();
        let desc = BodyDesc::dynamic(ColliderDesc::Ball { radius: 10.0 });
        ctx.spawn_with_body(Entity::new(id), desc, ColliderMaterial::default());

        ctx.despawn(id);
        assert_eq!(ctx.scene.len(), 0);
        assert_eq!(ctx.physics.body_count(), 0);
    }

    #[test]
    fn step_physics_syncs_positions() {
        let config = GameConfig {
            gravity: Vec2::new(0.0, 100.0),
            ..GameConfig::default()
        };
        let mut ctx = EngineContext::with_config(&config);
        let id = ctx.next_id();
        let desc = BodyDesc::dynamic(ColliderDesc::Ball { radius: 5.0 })
            .with_position(Vec2::new(100.0, 0.0));
        ctx.spawn_with_body(Entity::new(id), desc, ColliderMaterial::default());

        for _ in 0..10 {
            ctx.step_physics();
        }

        let y = ctx.scene.get(id).map(|e| e.pos.y).unwrap_or_default();
        assert!(y > 0.0, "Entity should have moved down: y={}", y);
    }

    #[test]
    fn set_transform_moves_entity_and_body() {
        let mut ctx = EngineContext::new();
        let id = ctx.next_id();
        let desc = BodyDesc::fixed(ColliderDesc::Ball { radius: 5.0 });
        ctx.spawn_with_body(Entity::new(id), desc, ColliderMaterial::default());

        ctx.set_transform(id, Vec2::new(40.0, 50.0), 0.5);
        ctx.step_physics();

        let entity = ctx.scene.get(id).expect("spawned");
        assert!((entity.pos - Vec2::new(40.0, 50.0)).length() < 0.001);
        assert!((entity.rotation - 0.5).abs() < 0.001);
    }

    #[test]
    fn clear_frame_data_drops_transients() {
        let mut ctx = EngineContext::new();
        ctx.emit_sound(SoundEvent(1));
        ctx.emit_event(GameEvent::new(1.0, 0.0, 0.0, 0.0));
        ctx.overlay.add_polyline(vec![Vec2::ZERO, Vec2::ONE], 1.0, 1.0);
        ctx.clear_frame_data();
        assert!(ctx.sounds.is_empty());
        assert!(ctx.events.is_empty());
        assert!(ctx.overlay.polylines.is_empty());
    }
}
