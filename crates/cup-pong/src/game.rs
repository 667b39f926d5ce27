use glam::Vec2;
use pong_engine::*;

use crate::ball::{Ball, DeathCause, Release};
use crate::body::WorldBody;
use crate::collision::TableContext;
use crate::config::TossConfig;
use crate::constants::*;
use crate::dispatch::DispatchTable;
use crate::error::LevelResult;
use crate::level::{BallDesc, LevelDesc, RectDesc};
use crate::trajectory::TrajectoryPreview;

/// One ball and everything the game keeps alongside it.
struct BallSlot {
    /// Spawn description, kept so a destroyed ball can be rebuilt on level reset.
    desc: BallDesc,
    ball: Ball,
    body: PhysicsBody,
    joint: Option<JointHandle>,
    /// Pending deferred kill, if the ball is dying.
    kill_timer: Option<TimerId>,
    preview: TrajectoryPreview,
}

impl BallSlot {
    fn split<'a>(&'a mut self, ctx: &'a mut EngineContext) -> (&'a mut Ball, WorldBody<'a>) {
        let id = self.ball.id();
        (&mut self.ball, WorldBody::new(ctx, id, self.body, &mut self.joint))
    }
}

pub struct CupPong {
    level: LevelDesc,
    table: TableContext,
    slots: Vec<BallSlot>,
    dispatch: DispatchTable,
    /// Pending kills, keyed by ball entity.
    timers: TimerQueue<EntityId>,
    drag: DragGesture,
}

impl CupPong {
    pub fn new() -> Self {
        Self::with_level(LevelDesc::builtin())
    }

    pub fn with_level(level: LevelDesc) -> Self {
        Self {
            table: TableContext::new(level.cup.into()),
            level,
            slots: Vec::new(),
            dispatch: DispatchTable::new(),
            timers: TimerQueue::new(),
            drag: DragGesture::new(),
        }
    }

    /// Build a game from level JSON.
    pub fn from_json(json: &str) -> LevelResult<Self> {
        LevelDesc::from_json(json).map(Self::with_level)
    }

    /// Like [`CupPong::from_json`], but a bad level is logged and replaced by
    /// the built-in one.
    pub fn from_json_or_builtin(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(game) => game,
            Err(err) => {
                log::error!("Rejected level: {}. Using the built-in level", err);
                Self::new()
            }
        }
    }

    pub fn level(&self) -> &LevelDesc {
        &self.level
    }

    pub fn table(&self) -> &TableContext {
        &self.table
    }

    pub fn balls(&self) -> impl Iterator<Item = &Ball> {
        self.slots.iter().map(|slot| &slot.ball)
    }

    pub fn ball(&self, index: usize) -> Option<&Ball> {
        self.slots.get(index).map(|slot| &slot.ball)
    }

    pub fn preview(&self, index: usize) -> Option<&TrajectoryPreview> {
        self.slots.get(index).map(|slot| &slot.preview)
    }

    /// Kill timers still waiting to fire.
    pub fn pending_kills(&self) -> usize {
        self.timers.pending()
    }

    // ── Level construction ───────────────────────────────────────────────────

    fn build_box(ctx: &mut EngineContext, rect: &RectDesc, tag: &str, material: ColliderMaterial) -> Option<PhysicsBody> {
        let id = ctx.next_id();
        let center = Vec2::from(rect.center);
        let entity = Entity::new(id)
            .with_tag(tag)
            .with_size(Vec2::new(rect.half_width * 2.0, rect.half_height * 2.0));
        let desc = BodyDesc::fixed(ColliderDesc::Cuboid {
            half_width: rect.half_width,
            half_height: rect.half_height,
        })
        .with_position(center)
        .with_rotation(rect.rotation);
        ctx.spawn_with_body(entity, desc, material);
        ctx.scene.get(id).and_then(|e| e.body)
    }

    fn spawn_ball(ctx: &mut EngineContext, desc: &BallDesc, config: &TossConfig) -> Option<BallSlot> {
        let id = ctx.next_id();
        let start = Vec2::from(desc.start);
        let entity = Entity::new(id)
            .with_tag(TAG_BALL)
            .with_size(Vec2::splat(config.ball_radius * 2.0))
            .with_interactive(true);
        // Spawned dynamic so gravity applies once the ball is released;
        // reset() freezes it on the rest spot right away.
        let body_desc = BodyDesc::dynamic(ColliderDesc::Ball {
            radius: config.ball_radius,
        })
        .with_position(start)
        .with_rotation(desc.angle)
        .with_ccd(true);
        let material = ColliderMaterial {
            restitution: BALL_RESTITUTION,
            friction: BALL_FRICTION,
            density: BALL_DENSITY,
            sensor: false,
        };
        ctx.spawn_with_body(entity, body_desc, material);
        let body = ctx.scene.get(id).and_then(|e| e.body)?;

        let mut slot = BallSlot {
            desc: *desc,
            ball: Ball::new(id, vec![body.part()], start, desc.angle, config.clone()),
            body,
            joint: None,
            kill_timer: None,
            preview: TrajectoryPreview::new(config.trace_length),
        };
        let (ball, mut world_body) = slot.split(ctx);
        ball.reset(&mut world_body);
        Some(slot)
    }

    /// Stop routing anything to the ball in `index`.
    fn retire(&mut self, index: usize) {
        let id = self.slots[index].ball.id();
        self.timers.cancel_owner(&id);
        self.slots[index].kill_timer = None;
        self.dispatch.deregister(id);
        if self.drag.target() == Some(id) {
            self.drag.cancel();
        }
        self.slots[index].preview.clear();
    }

    fn reset_level(&mut self, ctx: &mut EngineContext) {
        self.drag.cancel();
        for index in 0..self.slots.len() {
            if let Some(timer) = self.slots[index].kill_timer.take() {
                self.timers.cancel(timer);
            }
            if self.slots[index].ball.destroyed() {
                let desc = self.slots[index].desc;
                if let Some(slot) = Self::spawn_ball(ctx, &desc, &self.level.config) {
                    self.dispatch.register(slot.ball.id(), slot.ball.parts(), index);
                    self.slots[index] = slot;
                }
            } else {
                let slot = &mut self.slots[index];
                let (ball, mut body) = slot.split(ctx);
                ball.restore(&mut body);
                slot.preview.clear();
            }
        }
        log::info!("Level reset ({} balls)", self.slots.len());
    }

    // ── Per-step phases ──────────────────────────────────────────────────────

    fn handle_input(&mut self, ctx: &mut EngineContext, input: &InputQueue) {
        for event in input.iter() {
            if let InputEvent::Custom { kind, .. } = *event {
                match kind {
                    custom::RESET_LEVEL => self.reset_level(ctx),
                    custom::TOGGLE_SOUND => {
                        let enabled = self.table.toggle_sound();
                        ctx.emit_sound(sounds::BUTTON_CLICK);
                        log::debug!("Sound {}", if enabled { "on" } else { "off" });
                    }
                    other => log::warn!("Ignoring unknown custom event {}", other),
                }
                continue;
            }
            if let Some(drag) = self.drag.handle(event, &ctx.scene) {
                self.handle_drag(ctx, drag);
            }
        }
    }

    fn handle_drag(&mut self, ctx: &mut EngineContext, drag: DragEvent) {
        let target = drag.target();
        let Some(index) = self.dispatch.slot_for_entity(target) else {
            log::warn!("Drag on unknown entity {:?}", target);
            self.drag.cancel();
            return;
        };

        match drag {
            DragEvent::Start { .. } => {
                let (ball, mut body) = self.slots[index].split(ctx);
                if !ball.on_drag_start(&mut body) {
                    self.drag.cancel();
                }
            }
            DragEvent::Move { pos, .. } => self.slots[index].ball.on_drag(pos),
            DragEvent::End { .. } => {
                let (ball, mut body) = self.slots[index].split(ctx);
                match ball.on_drag_end(&mut body) {
                    Release::Launched(velocity) => {
                        log::info!("Ball {} launched with {:?}", target.0, velocity);
                        ctx.emit_event(GameEvent::new(events::LAUNCHED, target.0 as f32, velocity.x, velocity.y));
                    }
                    Release::Retracted => log::debug!("Ball {} retracted", target.0),
                    Release::Ignored => {}
                }
            }
        }
    }

    fn handle_collisions(&mut self, ctx: &mut EngineContext) {
        let pairs = ctx.collisions().to_vec();
        if pairs.is_empty() {
            return;
        }

        for (index, pairs) in self.dispatch.route(&pairs) {
            let slot = &mut self.slots[index];
            let id = slot.ball.id();
            let (ball, mut body) = slot.split(ctx);
            let report = ball.on_collision_start(&pairs, &self.table, &mut body);
            ball.on_collision_end(&pairs, &self.table, &body);
            let lives = ball.lives();

            if self.table.sound_enabled {
                for _ in 0..report.bounces {
                    ctx.emit_sound(sounds::TABLE_BOUNCE);
                }
            }
            if report.destroyed {
                log::info!("Ball {} destroyed by a kill zone", id.0);
                ctx.emit_event(GameEvent::new(events::DESTROYED, id.0 as f32, lives as f32, 0.0));
                self.retire(index);
            }
        }
    }

    fn fire_timers(&mut self, ctx: &mut EngineContext) {
        for id in self.timers.advance(ctx.physics.dt()) {
            let Some(index) = self.dispatch.slot_for_entity(id) else {
                continue;
            };
            self.slots[index].kill_timer = None;
            let (ball, mut body) = self.slots[index].split(ctx);
            let Some(report) = ball.kill(&mut body) else {
                continue;
            };

            ctx.emit_event(GameEvent::new(events::DEAD, id.0 as f32, report.lives as f32, 0.0));
            if report.terminal {
                log::info!("Ball {} is out of lives", id.0);
                self.retire(index);
            } else {
                log::info!("Ball {} lost a life, {} left", id.0, report.lives);
                self.slots[index].preview.clear();
            }
        }
    }

    fn run_lifecycle(&mut self, ctx: &mut EngineContext) {
        let dt = ctx.physics.dt();
        let gravity = ctx.physics.gravity() * dt * dt;

        for slot in self.slots.iter_mut() {
            if slot.ball.destroyed() {
                continue;
            }
            let id = slot.ball.id();
            let (ball, mut body) = slot.split(ctx);
            if let Some(cause) = ball.update(&self.table, &mut body) {
                let delay = ball.config().death_delay;
                slot.kill_timer = Some(self.timers.schedule(delay, id));
                if self.drag.target() == Some(id) {
                    self.drag.cancel();
                }
                match cause {
                    DeathCause::TooFar => log::debug!("Ball {} went too far, kill in {}s", id.0, delay),
                    DeathCause::Immobile => log::debug!("Ball {} came to rest, kill in {}s", id.0, delay),
                }
            }

            let (pos, _) = ctx.physics.body_position(&slot.body);
            let half_extents = ctx
                .physics
                .collider_shape(&slot.body)
                .map(|shape| shape.half_extents())
                .unwrap_or(Vec2::ZERO);
            slot.preview.observe(&slot.ball, pos, half_extents, gravity);
            ctx.overlay
                .add_polyline(slot.preview.projection().to_vec(), PROJECTION_WIDTH, PROJECTION_ALPHA);
            ctx.overlay.add_polyline(slot.preview.trace(), TRACE_WIDTH, TRACE_ALPHA);
        }
    }
}

impl Default for CupPong {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for CupPong {
    fn config(&self) -> GameConfig {
        GameConfig {
            fixed_dt: FIXED_DT,
            world_width: self.level.world_width,
            world_height: self.level.world_height,
            gravity: Vec2::new(0.0, self.level.gravity),
            ..GameConfig::default()
        }
    }

    fn init(&mut self, ctx: &mut EngineContext) {
        for rect in &self.level.tables {
            if let Some(body) = Self::build_box(ctx, rect, TAG_TABLE, ColliderMaterial::default()) {
                self.table.add_table_part(body.part());
            }
        }
        for rect in &self.level.sensors {
            Self::build_box(ctx, rect, TAG_SENSOR, ColliderMaterial::sensor());
        }
        for desc in &self.level.balls {
            if let Some(slot) = Self::spawn_ball(ctx, desc, &self.level.config) {
                self.dispatch.register(slot.ball.id(), slot.ball.parts(), self.slots.len());
                self.slots.push(slot);
            }
        }

        log::info!(
            "Level built: {} balls, {} table parts, {} kill zones",
            self.slots.len(),
            self.table.table_part_count(),
            self.level.sensors.len()
        );
    }

    fn update(&mut self, ctx: &mut EngineContext, input: &InputQueue) {
        // Runs once per fixed step; only the last step's polylines are kept.
        ctx.overlay.clear();

        self.handle_input(ctx, input);
        self.handle_collisions(ctx);
        self.fire_timers(ctx);
        self.run_lifecycle(ctx);
    }
}
