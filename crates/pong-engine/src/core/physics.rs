use glam::Vec2;
use rapier2d::prelude::*;
use std::sync::Mutex;

use crate::api::types::{EntityId, PartId};

// ---------------------------------------------------------------------------
// Conversion helpers (private): glam <-> nalgebra
// ---------------------------------------------------------------------------

fn vec2_to_na(v: Vec2) -> nalgebra::Vector2<f32> {
    nalgebra::Vector2::new(v.x, v.y)
}

fn na_to_vec2(v: &nalgebra::Vector2<f32>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

fn na_iso_to_pos_rot(iso: &nalgebra::Isometry2<f32>) -> (Vec2, f32) {
    let pos = Vec2::new(iso.translation.x, iso.translation.y);
    let rot = iso.rotation.angle();
    (pos, rot)
}

fn collider_part(handle: ColliderHandle) -> PartId {
    PartId(handle.into_raw_parts().0)
}

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// The kind of rigid body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyType {
    Dynamic,
    Fixed,
}

impl BodyType {
    fn to_rapier(self) -> RigidBodyType {
        match self {
            BodyType::Dynamic => RigidBodyType::Dynamic,
            BodyType::Fixed => RigidBodyType::Fixed,
        }
    }
}

/// Shape description for a collider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColliderDesc {
    Ball { radius: f32 },
    Cuboid { half_width: f32, half_height: f32 },
}

impl ColliderDesc {
    fn build_collider(&self) -> ColliderBuilder {
        match *self {
            ColliderDesc::Ball { radius } => ColliderBuilder::ball(radius),
            ColliderDesc::Cuboid { half_width, half_height } => {
                ColliderBuilder::cuboid(half_width, half_height)
            }
        }
    }

    /// Half extents of the shape's axis-aligned bounds (unrotated).
    pub fn half_extents(&self) -> Vec2 {
        match *self {
            ColliderDesc::Ball { radius } => Vec2::splat(radius),
            ColliderDesc::Cuboid { half_width, half_height } => Vec2::new(half_width, half_height),
        }
    }
}

/// Physical material properties for a collider.
#[derive(Debug, Clone, Copy)]
pub struct ColliderMaterial {
    pub restitution: f32,
    pub friction: f32,
    pub density: f32,
    /// Sensor colliders report contacts but exert no forces.
    pub sensor: bool,
}

impl ColliderMaterial {
    /// Material for trigger zones: contact reporting only.
    pub fn sensor() -> Self {
        Self {
            sensor: true,
            ..Self::default()
        }
    }
}

impl Default for ColliderMaterial {
    fn default() -> Self {
        Self {
            restitution: 0.3,
            friction: 0.5,
            density: 1.0,
            sensor: false,
        }
    }
}

/// Builder for describing a rigid body before creation.
#[derive(Debug, Clone)]
pub struct BodyDesc {
    pub body_type: BodyType,
    pub position: Vec2,
    pub rotation: f32,
    pub gravity_scale: f32,
    pub ccd: bool,
    pub collider: ColliderDesc,
}

impl BodyDesc {
    /// Create a dynamic body description with the given collider shape.
    pub fn dynamic(collider: ColliderDesc) -> Self {
        Self {
            body_type: BodyType::Dynamic,
            position: Vec2::ZERO,
            rotation: 0.0,
            gravity_scale: 1.0,
            ccd: false,
            collider,
        }
    }

    /// Create a fixed (static) body description with the given collider shape.
    pub fn fixed(collider: ColliderDesc) -> Self {
        Self {
            body_type: BodyType::Fixed,
            gravity_scale: 0.0,
            ..Self::dynamic(collider)
        }
    }

    pub fn with_position(mut self, pos: Vec2) -> Self {
        self.position = pos;
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_ccd(mut self, enabled: bool) -> Self {
        self.ccd = enabled;
        self
    }
}

/// Handle pair stored on an Entity, referencing Rapier internals.
#[derive(Debug, Clone, Copy)]
pub struct PhysicsBody {
    pub body_handle: RigidBodyHandle,
    pub collider_handle: ColliderHandle,
}

impl PhysicsBody {
    /// The collision part id reported in [`CollisionPair`]s for this body's collider.
    pub fn part(&self) -> PartId {
        collider_part(self.collider_handle)
    }
}

/// Soft spring tying a body to a fixed world point.
///
/// Attached with the acceleration-based spring model: `stiffness` (1/s²) and
/// `damping` (1/s) act independently of the body's mass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringDesc {
    /// World-space anchor point.
    pub anchor: Vec2,
    pub rest_length: f32,
    pub stiffness: f32,
    pub damping: f32,
}

/// Handle to an attached spring: the joint plus the collider-less anchor body it hangs from.
#[derive(Debug, Clone, Copy)]
pub struct JointHandle {
    joint: ImpulseJointHandle,
    anchor_body: RigidBodyHandle,
}

/// A collision event between two colliders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionPair {
    pub entity_a: EntityId,
    pub entity_b: EntityId,
    pub part_a: PartId,
    pub part_b: PartId,
    /// `true` when the collision just started, `false` when it ended.
    pub started: bool,
    /// At least one of the two colliders is a sensor.
    pub sensor: bool,
}

impl CollisionPair {
    /// Whether either side of the pair is `part`.
    pub fn involves(&self, part: PartId) -> bool {
        self.part_a == part || self.part_b == part
    }

    /// The other side of the pair, if `part` is one side.
    pub fn other(&self, part: PartId) -> Option<PartId> {
        if self.part_a == part {
            Some(self.part_b)
        } else if self.part_b == part {
            Some(self.part_a)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// WASM-safe event collector (no crossbeam)
// ---------------------------------------------------------------------------

struct DirectEventCollector {
    collisions: Mutex<Vec<CollisionEvent>>,
}

impl DirectEventCollector {
    fn new() -> Self {
        Self {
            collisions: Mutex::new(Vec::new()),
        }
    }

    fn drain_collisions(&self) -> Vec<CollisionEvent> {
        let mut guard = self.collisions.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut *guard)
    }
}

impl EventHandler for DirectEventCollector {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        self.collisions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event);
    }

    fn handle_contact_force_event(
        &self,
        _dt: f32,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: f32,
    ) {
    }
}

// ---------------------------------------------------------------------------
// PhysicsWorld
// ---------------------------------------------------------------------------

/// Wraps all Rapier2D boilerplate into a single struct.
pub struct PhysicsWorld {
    gravity: nalgebra::Vector2<f32>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    event_collector: DirectEventCollector,
}

impl PhysicsWorld {
    /// Create a new physics world with the given gravity vector.
    /// Y points down, so positive Y gravity pulls bodies toward the bottom of the screen.
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity: vec2_to_na(gravity),
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            event_collector: DirectEventCollector::new(),
        }
    }

    /// Set the integration timestep.
    pub fn set_dt(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
    }

    pub fn dt(&self) -> f32 {
        self.integration_parameters.dt
    }

    pub fn gravity(&self) -> Vec2 {
        na_to_vec2(&self.gravity)
    }

    /// Create a rigid body + collider and return handles.
    /// The EntityId is stored in the body's `user_data` for collision lookups.
    pub fn create_body(
        &mut self,
        entity_id: EntityId,
        desc: &BodyDesc,
        material: ColliderMaterial,
    ) -> PhysicsBody {
        let rb = RigidBodyBuilder::new(desc.body_type.to_rapier())
            .translation(vec2_to_na(desc.position))
            .rotation(desc.rotation)
            .gravity_scale(desc.gravity_scale)
            .ccd_enabled(desc.ccd)
            .user_data(entity_id.0 as u128)
            .build();

        let body_handle = self.bodies.insert(rb);

        let collider = desc
            .collider
            .build_collider()
            .restitution(material.restitution)
            .friction(material.friction)
            .density(material.density)
            .sensor(material.sensor)
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();

        let collider_handle =
            self.colliders
                .insert_with_parent(collider, body_handle, &mut self.bodies);

        PhysicsBody {
            body_handle,
            collider_handle,
        }
    }

    /// Remove a body, its colliders and any joints attached to it.
    pub fn remove_body(&mut self, body: &PhysicsBody) {
        self.bodies.remove(
            body.body_handle,
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }

    /// Step the simulation and collect collision events into the provided Vec.
    pub fn step_into(&mut self, collision_events: &mut Vec<CollisionPair>) {
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &self.event_collector,
        );

        for event in self.event_collector.drain_collisions() {
            let (h1, h2, started) = match event {
                CollisionEvent::Started(h1, h2, _) => (h1, h2, true),
                CollisionEvent::Stopped(h1, h2, _) => (h1, h2, false),
            };

            // A Stopped event can name a collider removed during this step.
            let entity_a = self.collider_to_entity(h1);
            let entity_b = self.collider_to_entity(h2);

            if let (Some(a), Some(b)) = (entity_a, entity_b) {
                collision_events.push(CollisionPair {
                    entity_a: a,
                    entity_b: b,
                    part_a: collider_part(h1),
                    part_b: collider_part(h2),
                    started,
                    sensor: event.sensor(),
                });
            }
        }
    }

    /// Switch a body between dynamic and fixed. Fixed bodies are also stopped.
    pub fn set_body_type(&mut self, body: &PhysicsBody, body_type: BodyType) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.set_body_type(body_type.to_rapier(), true);
            if body_type == BodyType::Fixed {
                rb.set_linvel(nalgebra::Vector2::zeros(), false);
                rb.set_angvel(0.0, false);
            }
        }
    }

    pub fn body_type(&self, body: &PhysicsBody) -> Option<BodyType> {
        let rb = self.bodies.get(body.body_handle)?;
        Some(if rb.is_fixed() { BodyType::Fixed } else { BodyType::Dynamic })
    }

    /// Set the linear velocity of a body directly.
    pub fn set_velocity(&mut self, body: &PhysicsBody, vel: Vec2) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.set_linvel(vec2_to_na(vel), true);
        }
    }

    /// Get the current linear velocity of a body.
    pub fn velocity(&self, body: &PhysicsBody) -> Vec2 {
        self.bodies
            .get(body.body_handle)
            .map(|rb| na_to_vec2(rb.linvel()))
            .unwrap_or(Vec2::ZERO)
    }

    pub fn set_angular_velocity(&mut self, body: &PhysicsBody, angvel: f32) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.set_angvel(angvel, true);
        }
    }

    /// Angular velocity in radians per second.
    pub fn angular_velocity(&self, body: &PhysicsBody) -> f32 {
        self.bodies
            .get(body.body_handle)
            .map(|rb| rb.angvel())
            .unwrap_or(0.0)
    }

    /// Teleport a body. Works for fixed and dynamic bodies alike.
    pub fn set_position(&mut self, body: &PhysicsBody, pos: Vec2, rotation: f32) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.set_position(nalgebra::Isometry2::new(vec2_to_na(pos), rotation), true);
        }
    }

    /// Get the current position and rotation of a body.
    pub fn body_position(&self, body: &PhysicsBody) -> (Vec2, f32) {
        self.bodies
            .get(body.body_handle)
            .map(|rb| na_iso_to_pos_rot(rb.position()))
            .unwrap_or((Vec2::ZERO, 0.0))
    }

    /// Number of rigid bodies in the simulation, anchor bodies included.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Query the collider shape of a physics body.
    pub fn collider_shape(&self, body: &PhysicsBody) -> Option<ColliderDesc> {
        let shape = self.colliders.get(body.collider_handle)?.shape();
        if let Some(ball) = shape.as_ball() {
            Some(ColliderDesc::Ball { radius: ball.radius })
        } else {
            shape.as_cuboid().map(|cuboid| ColliderDesc::Cuboid {
                half_width: cuboid.half_extents.x,
                half_height: cuboid.half_extents.y,
            })
        }
    }

    // -- Joint methods --

    /// Hang `body` from a fixed world point with a spring.
    pub fn attach_spring(&mut self, body: &PhysicsBody, desc: &SpringDesc) -> JointHandle {
        let anchor_body = self
            .bodies
            .insert(RigidBodyBuilder::fixed().translation(vec2_to_na(desc.anchor)).build());
        let joint = SpringJointBuilder::new(desc.rest_length, desc.stiffness, desc.damping)
            .spring_model(MotorModel::AccelerationBased)
            .local_anchor1(nalgebra::Point2::origin())
            .local_anchor2(nalgebra::Point2::origin())
            .build();
        let joint = self
            .impulse_joints
            .insert(anchor_body, body.body_handle, joint, true);
        JointHandle { joint, anchor_body }
    }

    /// Remove a spring and its anchor body.
    pub fn remove_joint(&mut self, handle: JointHandle) {
        self.impulse_joints.remove(handle.joint, true);
        self.bodies.remove(
            handle.anchor_body,
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }

    /// Number of joints in the simulation.
    pub fn joint_count(&self) -> usize {
        self.impulse_joints.len()
    }

    // -- private helpers --

    fn collider_to_entity(&self, collider_handle: ColliderHandle) -> Option<EntityId> {
        let collider = self.colliders.get(collider_handle)?;
        let body_handle = collider.parent()?;
        let body = self.bodies.get(body_handle)?;
        Some(EntityId(body.user_data as u32))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn ball_at(world: &mut PhysicsWorld, id: u32, pos: Vec2) -> PhysicsBody {
        world.create_body(
            EntityId(id),
            &BodyDesc::dynamic(ColliderDesc::Ball { radius: 10.0 }).with_position(pos),
            ColliderMaterial::default(),
        )
    }

    #[test]
    fn create_and_remove_body() {
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        let body = ball_at(&mut world, 1, Vec2::ZERO);
        assert_eq!(world.body_count(), 1);
        world.remove_body(&body);
        assert_eq!(world.body_count(), 0);
    }

    #[test]
    fn gravity_pulls_dynamic_body_down() {
        let mut world = PhysicsWorld::new(Vec2::new(0.0, 100.0));
        world.set_dt(1.0 / 60.0);
        let body = ball_at(&mut world, 1, Vec2::ZERO);

        let mut events = Vec::new();
        for _ in 0..10 {
            world.step_into(&mut events);
        }
        let (pos, _) = world.body_position(&body);
        assert!(pos.y > 0.0, "Body should fall: y={}", pos.y);
    }

    #[test]
    fn fixed_body_type_freezes_body() {
        let mut world = PhysicsWorld::new(Vec2::new(0.0, 100.0));
        world.set_dt(1.0 / 60.0);
        let body = ball_at(&mut world, 1, Vec2::new(0.0, 50.0));
        world.set_velocity(&body, Vec2::new(30.0, 0.0));

        world.set_body_type(&body, BodyType::Fixed);
        assert_eq!(world.body_type(&body), Some(BodyType::Fixed));
        assert_eq!(world.velocity(&body), Vec2::ZERO);

        let mut events = Vec::new();
        for _ in 0..10 {
            world.step_into(&mut events);
        }
        let (pos, _) = world.body_position(&body);
        assert!((pos - Vec2::new(0.0, 50.0)).length() < 0.001);

        world.set_body_type(&body, BodyType::Dynamic);
        assert_eq!(world.body_type(&body), Some(BodyType::Dynamic));
    }

    #[test]
    fn set_position_teleports() {
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        let body = ball_at(&mut world, 1, Vec2::ZERO);
        world.set_position(&body, Vec2::new(100.0, 200.0), 1.5);
        let (pos, rot) = world.body_position(&body);
        assert!((pos - Vec2::new(100.0, 200.0)).length() < 0.001);
        assert!((rot - 1.5).abs() < 0.001);
    }

    #[test]
    fn collision_pairs_carry_parts() {
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        world.set_dt(1.0 / 60.0);
        let a = ball_at(&mut world, 1, Vec2::ZERO);
        let b = ball_at(&mut world, 2, Vec2::new(30.0, 0.0));
        world.set_velocity(&a, Vec2::new(200.0, 0.0));
        world.set_velocity(&b, Vec2::new(-200.0, 0.0));

        let mut events = Vec::new();
        for _ in 0..60 {
            world.step_into(&mut events);
        }

        let first = events.iter().find(|e| e.started).expect("no collision start");
        assert!(first.involves(a.part()));
        assert_eq!(first.other(a.part()), Some(b.part()));
        assert!(!first.sensor);
        let ids = [first.entity_a, first.entity_b];
        assert!(ids.contains(&EntityId(1)) && ids.contains(&EntityId(2)));
    }

    #[test]
    fn sensor_contacts_are_flagged() {
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        world.set_dt(1.0 / 60.0);
        world.create_body(
            EntityId(1),
            &BodyDesc::fixed(ColliderDesc::Cuboid { half_width: 20.0, half_height: 20.0 })
                .with_position(Vec2::new(60.0, 0.0)),
            ColliderMaterial::sensor(),
        );
        let ball = world.create_body(
            EntityId(2),
            &BodyDesc::dynamic(ColliderDesc::Ball { radius: 5.0 }),
            ColliderMaterial::default(),
        );
        world.set_velocity(&ball, Vec2::new(300.0, 0.0));

        let mut events = Vec::new();
        for _ in 0..30 {
            world.step_into(&mut events);
        }
        let hit = events
            .iter()
            .find(|e| e.started && e.involves(ball.part()))
            .expect("ball should enter the sensor");
        assert!(hit.sensor);
        // The ball passes straight through.
        let (pos, _) = world.body_position(&ball);
        assert!(pos.x > 60.0, "sensor must not block: x={}", pos.x);
    }

    #[test]
    fn spring_pulls_body_toward_anchor() {
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        world.set_dt(1.0 / 60.0);
        let body = ball_at(&mut world, 1, Vec2::new(100.0, 0.0));

        let joint = world.attach_spring(&body, &SpringDesc {
            anchor: Vec2::ZERO,
            rest_length: 0.0,
            stiffness: 500.0,
            damping: 5.0,
        });
        assert_eq!(world.joint_count(), 1);

        let mut events = Vec::new();
        for _ in 0..60 {
            world.step_into(&mut events);
        }
        let (pos, _) = world.body_position(&body);
        assert!(pos.x < 100.0, "spring should pull toward anchor: x={}", pos.x);

        world.remove_joint(joint);
        assert_eq!(world.joint_count(), 0);
        assert_eq!(world.body_count(), 1);
    }

    #[test]
    fn spring_pull_ignores_mass() {
        let settle = |density: f32| {
            let mut world = PhysicsWorld::new(Vec2::ZERO);
            world.set_dt(1.0 / 60.0);
            let body = world.create_body(
                EntityId(1),
                &BodyDesc::dynamic(ColliderDesc::Ball { radius: 16.0 }).with_position(Vec2::new(50.0, 0.0)),
                ColliderMaterial { density, ..ColliderMaterial::default() },
            );
            world.attach_spring(&body, &SpringDesc {
                anchor: Vec2::ZERO,
                rest_length: 0.0,
                stiffness: 180.0,
                damping: 13.4,
            });
            let mut events = Vec::new();
            for _ in 0..20 {
                world.step_into(&mut events);
            }
            world.body_position(&body).0
        };

        let light = settle(0.001);
        let heavy = settle(1.0);
        assert!(light.x < 50.0, "spring should pull: x={}", light.x);
        assert!((light - heavy).length() < 0.5, "light {:?} vs heavy {:?}", light, heavy);
    }

    #[test]
    fn collider_shape_and_extents() {
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        let body = ball_at(&mut world, 1, Vec2::ZERO);
        let shape = world.collider_shape(&body).expect("shape");
        assert_eq!(shape, ColliderDesc::Ball { radius: 10.0 });
        assert_eq!(shape.half_extents(), Vec2::splat(10.0));
        let cuboid = ColliderDesc::Cuboid { half_width: 4.0, half_height: 2.0 };
        assert_eq!(cuboid.half_extents(), Vec2::new(4.0, 2.0));
    }
}
