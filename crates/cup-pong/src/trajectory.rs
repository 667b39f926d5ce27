//! Aim preview and motion trail.
//!
//! Pure observers: they read a ball's state once per step and produce point
//! lists for the overlay. Nothing here feeds back into the state machine.

use std::collections::VecDeque;

use glam::Vec2;

use crate::aim::{is_retraction, launch_velocity};
use crate::ball::{Ball, BallPhase};

/// Ballistic path from `pos` with per-step `velocity` under per-step `gravity`,
/// integrated the way the simulation does it: velocity first, then position.
/// The first point is `pos` itself.
pub fn project(pos: Vec2, velocity: Vec2, gravity: Vec2, points: usize) -> Vec<Vec2> {
    let mut path = Vec::with_capacity(points);
    let mut p = pos;
    let mut v = velocity;
    for _ in 0..points {
        path.push(p);
        v += gravity;
        p += v;
    }
    path
}

/// Per-ball preview state.
#[derive(Debug, Clone)]
pub struct TrajectoryPreview {
    projection: Vec<Vec2>,
    trace: VecDeque<Vec2>,
    trace_length: usize,
}

impl TrajectoryPreview {
    pub fn new(trace_length: usize) -> Self {
        Self {
            projection: Vec::new(),
            trace: VecDeque::with_capacity(trace_length),
            trace_length,
        }
    }

    /// Refresh from the ball's state. `pos` and `half_extents` are the body's,
    /// `gravity` is per step.
    pub fn observe(&mut self, ball: &Ball, pos: Vec2, half_extents: Vec2, gravity: Vec2) {
        self.projection.clear();
        match ball.phase() {
            BallPhase::Aiming => {
                self.trace.clear();
                let config = ball.config();
                let start = ball.start_pos();
                if !is_retraction(start, pos, half_extents, config.ghost_scale) {
                    let velocity = launch_velocity(start, pos, config.launch_speed);
                    self.projection = project(pos, velocity, gravity, config.projection_points);
                }
            }
            BallPhase::Launched => {
                if self.trace_length == 0 {
                    return;
                }
                if self.trace.len() == self.trace_length {
                    self.trace.pop_front();
                }
                self.trace.push_back(pos);
            }
            // The trail freezes while the kill timer runs.
            BallPhase::Dying => {}
            BallPhase::Resting | BallPhase::Terminal => self.trace.clear(),
        }
    }

    pub fn projection(&self) -> &[Vec2] {
        &self.projection
    }

    /// Recent positions, oldest first.
    pub fn trace(&self) -> Vec<Vec2> {
        self.trace.iter().copied().collect()
    }

    pub fn clear(&mut self) {
        self.projection.clear();
        self.trace.clear();
    }
}
