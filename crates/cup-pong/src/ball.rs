//! The per-ball drag, launch, collision and lifecycle state machine.
//!
//! A [`Ball`] holds the bookkeeping; every physical effect goes through the
//! [`BallBody`] passed to each handler. Handlers return what happened so the
//! game can emit events, sounds and timers.

use glam::Vec2;
use pong_engine::{CollisionPair, EntityId, PartId};

use crate::aim::{clamp_to_radius, is_retraction, launch_velocity};
use crate::anchor::ConstraintAnchor;
use crate::body::BallBody;
use crate::collision::{classify, Contact, TableContext};
use crate::config::TossConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BallPhase {
    /// At the rest spot, hanging from the anchor, draggable.
    Resting,
    /// Being pulled back by the player.
    Aiming,
    /// In flight, governed by the simulation.
    Launched,
    /// Declared dead, waiting for the kill timer.
    Dying,
    /// Out of lives or destroyed by a kill zone.
    Terminal,
}

/// Outcome of releasing a drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Release {
    /// The ball was not being dragged.
    Ignored,
    /// Released inside the ghost box: back on the anchor, no shot.
    Retracted,
    /// Shot with this per-step velocity.
    Launched(Vec2),
}

/// Outcome of the collision-start handler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContactReport {
    /// Table contacts that started this step.
    pub bounces: u32,
    /// A kill zone destroyed the ball.
    pub destroyed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathCause {
    TooFar,
    Immobile,
}

/// Outcome of [`Ball::kill`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KillReport {
    pub lives: u32,
    /// No lives left: the body has been removed.
    pub terminal: bool,
}

#[derive(Debug, Clone)]
pub struct Ball {
    id: EntityId,
    parts: Vec<PartId>,
    start_pos: Vec2,
    rest_rotation: f32,
    /// Last clamped pull-back point.
    drag: Vec2,
    is_pressed: bool,
    launched: bool,
    touches_table: bool,
    lives: u32,
    is_dead: bool,
    destroyed: bool,
    interactive: bool,
    anchor: ConstraintAnchor,
    config: TossConfig,
}

impl Ball {
    pub fn new(id: EntityId, parts: Vec<PartId>, start_pos: Vec2, rest_rotation: f32, config: TossConfig) -> Self {
        Self {
            id,
            parts,
            start_pos,
            rest_rotation,
            drag: start_pos,
            is_pressed: false,
            launched: false,
            touches_table: false,
            lives: config.max_lives,
            is_dead: false,
            destroyed: false,
            interactive: true,
            anchor: ConstraintAnchor::new(start_pos, config.anchor_stiffness),
            config,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn parts(&self) -> &[PartId] {
        &self.parts
    }

    pub fn start_pos(&self) -> Vec2 {
        self.start_pos
    }

    pub fn rest_rotation(&self) -> f32 {
        self.rest_rotation
    }

    pub fn drag(&self) -> Vec2 {
        self.drag
    }

    pub fn is_pressed(&self) -> bool {
        self.is_pressed
    }

    pub fn launched(&self) -> bool {
        self.launched
    }

    pub fn touches_table(&self) -> bool {
        self.touches_table
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn is_dead(&self) -> bool {
        self.is_dead
    }

    pub fn destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn interactive(&self) -> bool {
        self.interactive
    }

    pub fn has_constraint(&self) -> bool {
        self.anchor.is_attached()
    }

    pub fn config(&self) -> &TossConfig {
        &self.config
    }

    pub fn phase(&self) -> BallPhase {
        if self.destroyed || self.lives == 0 {
            BallPhase::Terminal
        } else if self.is_dead {
            BallPhase::Dying
        } else if self.is_pressed {
            BallPhase::Aiming
        } else if self.launched && !self.anchor.is_attached() {
            BallPhase::Launched
        } else {
            BallPhase::Resting
        }
    }

    fn accepts_drag(&self) -> bool {
        self.interactive && !self.is_dead && !self.destroyed && self.lives > 0
    }

    fn set_interactive(&mut self, body: &mut impl BallBody, interactive: bool) {
        self.interactive = interactive;
        body.set_interactive(interactive);
    }

    // ── Drag ─────────────────────────────────────────────────────────────────

    /// Pick the ball up: off the anchor and dynamic. Returns `false` when the
    /// ball does not take input right now.
    pub fn on_drag_start(&mut self, body: &mut impl BallBody) -> bool {
        if !self.accepts_drag() {
            return false;
        }
        self.is_pressed = true;
        self.launched = false;
        self.drag = body.position();
        self.anchor.detach(body);
        body.set_static(false);
        true
    }

    /// Track the pointer, clamped to the drag radius around the rest spot.
    pub fn on_drag(&mut self, pointer: Vec2) {
        if !self.is_pressed {
            return;
        }
        self.drag = clamp_to_radius(self.start_pos, pointer, self.config.drag_radius);
    }

    /// Let go: a short pull snaps back onto the anchor, anything longer is a shot.
    pub fn on_drag_end(&mut self, body: &mut impl BallBody) -> Release {
        if !self.is_pressed {
            return Release::Ignored;
        }
        self.is_pressed = false;
        self.launched = true;

        let pos = body.position();
        if is_retraction(self.start_pos, pos, body.half_extents(), self.config.ghost_scale) {
            // Back on the anchor; still counts as released for contacts.
            self.anchor.attach(body);
            return Release::Retracted;
        }

        let velocity = launch_velocity(self.start_pos, pos, self.config.launch_speed);
        body.set_static(false);
        body.set_velocity(velocity);
        self.set_interactive(body, false);
        Release::Launched(velocity)
    }

    // ── Collisions ───────────────────────────────────────────────────────────

    fn ignores_contacts(&self) -> bool {
        self.is_dead || self.destroyed || !self.launched
    }

    /// Handle the contacts that started this step.
    pub fn on_collision_start(
        &mut self,
        pairs: &[CollisionPair],
        table: &TableContext,
        body: &mut impl BallBody,
    ) -> ContactReport {
        let mut report = ContactReport::default();
        if self.ignores_contacts() {
            return report;
        }

        let mut sensor_hit = false;
        for pair in pairs.iter().filter(|p| p.started) {
            match classify(pair, &self.parts, table) {
                Some(Contact::Table) => {
                    self.touches_table = true;
                    report.bounces += 1;
                }
                Some(Contact::Sensor) => sensor_hit = true,
                _ => {}
            }
        }

        if sensor_hit {
            self.destroy(body);
            self.is_dead = true;
            report.destroyed = true;
        }
        report
    }

    /// Handle the contacts that ended this step. Leaving the table only counts
    /// once the ball is outside the drag radius.
    pub fn on_collision_end(&mut self, pairs: &[CollisionPair], table: &TableContext, body: &impl BallBody) {
        if self.ignores_contacts() {
            return;
        }
        let left_table = pairs
            .iter()
            .filter(|p| !p.started)
            .any(|p| classify(p, &self.parts, table) == Some(Contact::Table));
        if left_table && body.position().distance(self.start_pos) > self.config.drag_radius {
            self.touches_table = false;
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────────────

    /// Per-step check. Returns the cause when the ball has just died; the
    /// caller schedules [`Ball::kill`] after the death delay.
    pub fn update(&mut self, table: &TableContext, body: &mut impl BallBody) -> Option<DeathCause> {
        if self.lives == 0 || self.is_dead || self.destroyed {
            return None;
        }

        if self.is_pressed {
            // The simulation pushes the body around while it is held.
            body.set_position(self.drag);
            body.set_velocity(Vec2::ZERO);
        }

        let is_immobile = body.speed() < self.config.immobile_speed
            && body.angular_speed() < self.config.immobile_angular_speed
            && self.touches_table;
        let too_far = body.position().distance(table.cup) > self.config.reset_distance;

        if !(too_far || is_immobile) {
            return None;
        }
        self.is_dead = true;
        self.is_pressed = false;
        self.set_interactive(body, false);
        Some(if too_far { DeathCause::TooFar } else { DeathCause::Immobile })
    }

    /// Spend a life. Resets the ball while lives remain, removes it otherwise.
    /// `None` if the ball was already destroyed.
    pub fn kill(&mut self, body: &mut impl BallBody) -> Option<KillReport> {
        if self.destroyed {
            return None;
        }
        self.lives = self.lives.saturating_sub(1);
        if self.lives != 0 {
            self.reset(body);
        } else {
            self.set_interactive(body, false);
            self.destroy(body);
        }
        self.is_dead = false;
        Some(KillReport {
            lives: self.lives,
            terminal: self.lives == 0,
        })
    }

    /// Put the ball back on its rest spot, frozen and anchored.
    pub fn reset(&mut self, body: &mut impl BallBody) {
        if self.destroyed {
            return;
        }
        self.set_interactive(body, true);
        self.touches_table = false;
        self.launched = false;
        self.is_pressed = false;
        self.is_dead = false;
        self.drag = self.start_pos;
        body.set_velocity(Vec2::ZERO);
        body.set_static(true);
        body.set_position(self.start_pos);
        body.set_rotation(self.rest_rotation);
        self.anchor.attach(body);
    }

    /// Full lives and back to rest.
    pub fn restore(&mut self, body: &mut impl BallBody) {
        if self.destroyed {
            return;
        }
        self.lives = self.config.max_lives;
        self.reset(body);
    }

    /// Remove the body from the simulation. Returns `false` if it was already gone.
    pub fn destroy(&mut self, body: &mut impl BallBody) -> bool {
        if self.destroyed {
            return false;
        }
        self.anchor.detach(body);
        body.destroy();
        self.destroyed = true;
        self.is_pressed = false;
        self.interactive = false;
        true
    }
}
