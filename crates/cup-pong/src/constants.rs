//! Tuning constants and wire codes.
//!
//! Speeds, velocities and stiffness are expressed per simulation step, which
//! is the unit the feel of the game was tuned in. [`crate::body::WorldBody`]
//! converts them to the per-second values rapier works with.

// ── World ────────────────────────────────────────────────────────────────────

pub const WORLD_W: f32 = 1280.0;
pub const WORLD_H: f32 = 720.0;
/// Downward gravity in units per second squared.
pub const GRAVITY_Y: f32 = 1440.0;
pub const FIXED_DT: f32 = 1.0 / 60.0;

// ── Aiming ───────────────────────────────────────────────────────────────────

/// Maximum distance of the pull-back point from the rest anchor.
pub const DRAG_RADIUS: f32 = 95.0;
/// Launch velocity per unit of pull-back, per step.
pub const SPEED: f32 = 0.15;
/// Scale of the ghost box around the rest position, relative to the ball bounds.
pub const GHOST_SCALE: f32 = 1.6;
/// Anchor spring stiffness: fraction of the offset corrected per step.
pub const ANCHOR_STIFFNESS: f32 = 0.05;

// ── Lifecycle ────────────────────────────────────────────────────────────────

/// Distance from the cup past which a shot is lost.
pub const RESET_DISTANCE: f32 = 650.0;
pub const IMMOBILE_SPEED: f32 = 0.222_222_222_222_9;
pub const IMMOBILE_ANGULAR_SPEED: f32 = 0.03;
/// Seconds between a ball being declared dead and its respawn.
pub const DEATH_DELAY: f32 = 0.65;
pub const MAX_LIVES: u32 = 3;

// ── Ball ─────────────────────────────────────────────────────────────────────

pub const BALL_RADIUS: f32 = 16.0;
pub const BALL_RESTITUTION: f32 = 0.6;
pub const BALL_FRICTION: f32 = 0.1;
pub const BALL_DENSITY: f32 = 0.001;

// ── Trajectory preview ───────────────────────────────────────────────────────

pub const PROJECTION_POINTS: usize = 100;
pub const TRACE_LENGTH: usize = 24;
pub const PROJECTION_WIDTH: f32 = 2.0;
pub const PROJECTION_ALPHA: f32 = 0.5;
pub const TRACE_WIDTH: f32 = 4.0;
pub const TRACE_ALPHA: f32 = 0.8;

// ── Entity tags ──────────────────────────────────────────────────────────────

pub const TAG_BALL: &str = "ball";
pub const TAG_TABLE: &str = "table";
pub const TAG_SENSOR: &str = "sensor";

/// Sound cues sent to the host.
pub mod sounds {
    use pong_engine::SoundEvent;

    pub const TABLE_BOUNCE: SoundEvent = SoundEvent(1);
    pub const BUTTON_CLICK: SoundEvent = SoundEvent(2);
}

/// Game event kinds sent to the host.
pub mod events {
    /// `a` = entity id, `b` = lives left.
    pub const DEAD: f32 = 1.0;
    /// `a` = entity id, `b` = lives left.
    pub const DESTROYED: f32 = 2.0;
    /// `a` = entity id, `b`/`c` = launch velocity per step.
    pub const LAUNCHED: f32 = 3.0;
}

/// Custom event kinds received from the host UI.
pub mod custom {
    pub const RESET_LEVEL: u32 = 1;
    pub const TOGGLE_SOUND: u32 = 2;
}
