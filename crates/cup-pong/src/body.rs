use glam::Vec2;
use pong_engine::{BodyType, EngineContext, EntityId, JointHandle, PhysicsBody, SpringDesc};

/// What the ball state machine needs from the physics body it drives.
///
/// Velocities and speeds are in world units per simulation step.
pub trait BallBody {
    fn position(&self) -> Vec2;
    fn rotation(&self) -> f32;
    /// Linear speed per step.
    fn speed(&self) -> f32;
    /// Absolute angular speed in radians per step.
    fn angular_speed(&self) -> f32;
    /// Half extents of the unrotated bounding box.
    fn half_extents(&self) -> Vec2;

    fn set_position(&mut self, pos: Vec2);
    fn set_rotation(&mut self, rotation: f32);
    /// Linear velocity per step.
    fn set_velocity(&mut self, vel: Vec2);
    /// Static bodies are frozen in place and stop moving.
    fn set_static(&mut self, is_static: bool);
    /// Whether the entity accepts drag input.
    fn set_interactive(&mut self, interactive: bool);

    /// Hang the body from `anchor` with a soft spring. No-op when already attached.
    fn attach_anchor(&mut self, anchor: Vec2, stiffness: f32);
    /// No-op when nothing is attached.
    fn detach_anchor(&mut self);
    /// Remove the body from the simulation for good.
    fn destroy(&mut self);
}

/// [`BallBody`] over a rapier body owned by an [`EngineContext`].
///
/// Borrowed for the duration of one handler call. The spring handle lives
/// with the caller so it survives between calls.
pub struct WorldBody<'a> {
    ctx: &'a mut EngineContext,
    id: EntityId,
    body: PhysicsBody,
    joint: &'a mut Option<JointHandle>,
}

impl<'a> WorldBody<'a> {
    pub fn new(
        ctx: &'a mut EngineContext,
        id: EntityId,
        body: PhysicsBody,
        joint: &'a mut Option<JointHandle>,
    ) -> Self {
        Self { ctx, id, body, joint }
    }

    fn dt(&self) -> f32 {
        self.ctx.physics.dt().max(f32::EPSILON)
    }
}

impl BallBody for WorldBody<'_> {
    fn position(&self) -> Vec2 {
        self.ctx.physics.body_position(&self.body).0
    }

    fn rotation(&self) -> f32 {
        self.ctx.physics.body_position(&self.body).1
    }

    fn speed(&self) -> f32 {
        self.ctx.physics.velocity(&self.body).length() * self.dt()
    }

    fn angular_speed(&self) -> f32 {
        self.ctx.physics.angular_velocity(&self.body).abs() * self.dt()
    }

    fn half_extents(&self) -> Vec2 {
        self.ctx
            .physics
            .collider_shape(&self.body)
            .map(|shape| shape.half_extents())
            .unwrap_or(Vec2::ZERO)
    }

    fn set_position(&mut self, pos: Vec2) {
        let rotation = self.rotation();
        self.ctx.set_transform(self.id, pos, rotation);
    }

    fn set_rotation(&mut self, rotation: f32) {
        let pos = self.position();
        self.ctx.set_transform(self.id, pos, rotation);
    }

    fn set_velocity(&mut self, vel: Vec2) {
        let per_second = vel / self.dt();
        self.ctx.physics.set_velocity(&self.body, per_second);
        self.ctx.physics.set_angular_velocity(&self.body, 0.0);
    }

    fn set_static(&mut self, is_static: bool) {
        let body_type = if is_static { BodyType::Fixed } else { BodyType::Dynamic };
        self.ctx.physics.set_body_type(&self.body, body_type);
    }

    fn set_interactive(&mut self, interactive: bool) {
        if let Some(entity) = self.ctx.scene.get_mut(self.id) {
            entity.interactive = interactive;
        }
    }

    fn attach_anchor(&mut self, anchor: Vec2, stiffness: f32) {
        if self.joint.is_some() {
            return;
        }
        // A spring correcting `stiffness` of the offset per step, expressed
        // as a mass-independent acceleration, half-critically damped.
        let dt = self.dt();
        let k = stiffness / (dt * dt);
        let desc = SpringDesc {
            anchor,
            rest_length: 0.0,
            stiffness: k,
            damping: k.sqrt(),
        };
        *self.joint = Some(self.ctx.physics.attach_spring(&self.body, &desc));
    }

    fn detach_anchor(&mut self) {
        if let Some(handle) = self.joint.take() {
            self.ctx.physics.remove_joint(handle);
        }
    }

    fn destroy(&mut self) {
        self.detach_anchor();
        self.ctx.despawn(self.id);
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use pong_engine::{BodyDesc, ColliderDesc, ColliderMaterial, Entity, GameConfig};

    fn world_with_ball() -> (EngineContext, EntityId, PhysicsBody) {
        let config = GameConfig {
            gravity: Vec2::ZERO,
            ..GameConfig::default()
        };
        let mut ctx = EngineContext::with_config(&config);
        let id = ctx.next_id();
        let desc = BodyDesc::fixed(ColliderDesc::Ball { radius: 16.0 })
            .with_position(Vec2::new(100.0, 100.0));
        ctx.spawn_with_body(Entity::new(id).with_interactive(true), desc, ColliderMaterial::default());
        let body = ctx.scene.get(id).and_then(|e| e.body).unwrap();
        (ctx, id, body)
    }

    #[test]
    fn velocity_round_trips_in_per_step_units() {
        let (mut ctx, id, body) = world_with_ball();
        let mut joint = None;
        let mut ball = WorldBody::new(&mut ctx, id, body, &mut joint);
        ball.set_static(false);
        ball.set_velocity(Vec2::new(3.0, 4.0));
        assert!((ball.speed() - 5.0).abs() < 1e-3);
        // Rapier sees per-second velocity.
        let per_second = ctx.physics.velocity(&body);
        assert!((per_second.x - 3.0 * 60.0).abs() < 1e-2);
    }

    #[test]
    fn half_extents_come_from_the_collider() {
        let (mut ctx, id, body) = world_with_ball();
        let mut joint = None;
        let ball = WorldBody::new(&mut ctx, id, body, &mut joint);
        assert_eq!(ball.half_extents(), Vec2::splat(16.0));
    }

    #[test]
    fn anchor_attach_and_detach_are_idempotent() {
        let (mut ctx, id, body) = world_with_ball();
        let mut joint = None;
        {
            let mut ball = WorldBody::new(&mut ctx, id, body, &mut joint);
            ball.attach_anchor(Vec2::new(100.0, 100.0), 0.05);
            ball.attach_anchor(Vec2::new(100.0, 100.0), 0.05);
        }
        assert!(joint.is_some());
        assert_eq!(ctx.physics.joint_count(), 1);
        assert_eq!(ctx.physics.body_count(), 2);
        {
            let mut ball = WorldBody::new(&mut ctx, id, body, &mut joint);
            ball.detach_anchor();
            ball.detach_anchor();
        }
        assert!(joint.is_none());
        assert_eq!(ctx.physics.joint_count(), 0);
        assert_eq!(ctx.physics.body_count(), 1);
    }

    #[test]
    fn interactivity_is_mirrored_on_the_entity() {
        let (mut ctx, id, body) = world_with_ball();
        let mut joint = None;
        WorldBody::new(&mut ctx, id, body, &mut joint).set_interactive(false);
        assert!(!ctx.scene.get(id).unwrap().interactive);
    }

    #[test]
    fn destroy_removes_entity_body_and_spring() {
        let (mut ctx, id, body) = world_with_ball();
        let mut joint = None;
        {
            let mut ball = WorldBody::new(&mut ctx, id, body, &mut joint);
            ball.attach_anchor(Vec2::new(100.0, 100.0), 0.05);
            ball.destroy();
        }
        assert!(joint.is_none());
        assert!(ctx.scene.get(id).is_none());
        assert_eq!(ctx.physics.body_count(), 0);
        assert_eq!(ctx.physics.joint_count(), 0);
    }

    #[test]
    fn set_position_keeps_rotation() {
        let (mut ctx, id, body) = world_with_ball();
        let mut joint = None;
        let mut ball = WorldBody::new(&mut ctx, id, body, &mut joint);
        ball.set_rotation(0.25);
        ball.set_position(Vec2::new(150.0, 90.0));
        assert!((ball.position() - Vec2::new(150.0, 90.0)).length() < 1e-3);
        assert!((ball.rotation() - 0.25).abs() < 1e-3);
        assert_eq!(ctx.scene.get(id).unwrap().pos, Vec2::new(150.0, 90.0));
    }
}
