//! Runtime-tunable gameplay configuration.
//!
//! [`TossConfig`] mirrors the tuning constants in [`crate::constants`]. A
//! level may carry a `config` block overriding any subset of the fields;
//! missing keys fall back to the compile-time defaults.

use serde::Deserialize;

use crate::constants::*;
use crate::error::{LevelError, LevelResult};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TossConfig {
    // ── Aiming ───────────────────────────────────────────────────────────────
    pub drag_radius: f32,
    pub launch_speed: f32,
    pub ghost_scale: f32,
    pub anchor_stiffness: f32,

    // ── Lifecycle ────────────────────────────────────────────────────────────
    pub reset_distance: f32,
    pub immobile_speed: f32,
    pub immobile_angular_speed: f32,
    /// Seconds.
    pub death_delay: f32,
    pub max_lives: u32,

    // ── Ball ─────────────────────────────────────────────────────────────────
    pub ball_radius: f32,

    // ── Trajectory preview ───────────────────────────────────────────────────
    pub projection_points: usize,
    pub trace_length: usize,
}

impl Default for TossConfig {
    fn default() -> Self {
        Self {
            drag_radius: DRAG_RADIUS,
            launch_speed: SPEED,
            ghost_scale: GHOST_SCALE,
            anchor_stiffness: ANCHOR_STIFFNESS,
            reset_distance: RESET_DISTANCE,
            immobile_speed: IMMOBILE_SPEED,
            immobile_angular_speed: IMMOBILE_ANGULAR_SPEED,
            death_delay: DEATH_DELAY,
            max_lives: MAX_LIVES,
            ball_radius: BALL_RADIUS,
            projection_points: PROJECTION_POINTS,
            trace_length: TRACE_LENGTH,
        }
    }
}

fn positive(name: &'static str, value: f32) -> LevelResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(LevelError::InvalidConfig {
            name,
            value,
            expected: "finite and > 0",
        })
    }
}

fn non_negative(name: &'static str, value: f32) -> LevelResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(LevelError::InvalidConfig {
            name,
            value,
            expected: "finite and >= 0",
        })
    }
}

impl TossConfig {
    /// Reject values the state machine cannot run with.
    pub fn validate(&self) -> LevelResult<()> {
        positive("drag_radius", self.drag_radius)?;
        positive("launch_speed", self.launch_speed)?;
        positive("reset_distance", self.reset_distance)?;
        positive("ball_radius", self.ball_radius)?;
        non_negative("immobile_speed", self.immobile_speed)?;
        non_negative("immobile_angular_speed", self.immobile_angular_speed)?;
        non_negative("death_delay", self.death_delay)?;

        // The ghost box must be at least as large as the ball, or no release
        // could ever count as a retraction.
        if !(self.ghost_scale.is_finite() && self.ghost_scale >= 1.0) {
            return Err(LevelError::InvalidConfig {
                name: "ghost_scale",
                value: self.ghost_scale,
                expected: "finite and >= 1",
            });
        }
        if !(self.anchor_stiffness.is_finite() && self.anchor_stiffness > 0.0 && self.anchor_stiffness <= 1.0) {
            return Err(LevelError::InvalidConfig {
                name: "anchor_stiffness",
                value: self.anchor_stiffness,
                expected: "in (0, 1]",
            });
        }
        if self.max_lives == 0 {
            return Err(LevelError::InvalidConfig {
                name: "max_lives",
                value: 0.0,
                expected: ">= 1",
            });
        }
        Ok(())
    }
}
