use glam::Vec2;
use serde::Deserialize;

use crate::config::TossConfig;
use crate::constants::*;
use crate::error::{LevelError, LevelResult};

/// A point in world coordinates, as written in level JSON (`{ "x": .., "y": .. }`).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl From<Point> for Vec2 {
    fn from(p: Point) -> Self {
        Vec2::new(p.x, p.y)
    }
}

/// A ball's rest spot.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct BallDesc {
    pub start: Point,
    /// Rest angle in radians.
    #[serde(default)]
    pub angle: f32,
}

/// An axis-aligned box, used for table surfaces and kill zones.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RectDesc {
    pub center: Point,
    pub half_width: f32,
    pub half_height: f32,
    #[serde(default)]
    pub rotation: f32,
}

/// Level layout loaded from JSON.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LevelDesc {
    #[serde(default = "default_world_width")]
    pub world_width: f32,
    #[serde(default = "default_world_height")]
    pub world_height: f32,
    /// Downward gravity in units per second squared.
    #[serde(default = "default_gravity")]
    pub gravity: f32,
    /// Target the balls are thrown at.
    pub cup: Point,
    pub balls: Vec<BallDesc>,
    #[serde(default)]
    pub tables: Vec<RectDesc>,
    #[serde(default)]
    pub sensors: Vec<RectDesc>,
    #[serde(default)]
    pub config: TossConfig,
}

fn default_world_width() -> f32 {
    WORLD_W
}

fn default_world_height() -> f32 {
    WORLD_H
}

fn default_gravity() -> f32 {
    GRAVITY_Y
}

impl LevelDesc {
    /// Parse a level from a JSON string and validate it.
    pub fn from_json(json: &str) -> LevelResult<Self> {
        let level: LevelDesc = serde_json::from_str(json)?;
        level.validate()?;
        Ok(level)
    }

    pub fn validate(&self) -> LevelResult<()> {
        self.config.validate()?;
        for (name, value) in [("world_width", self.world_width), ("world_height", self.world_height)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(LevelError::InvalidConfig {
                    name,
                    value,
                    expected: "finite and > 0",
                });
            }
        }
        if !self.gravity.is_finite() {
            return Err(LevelError::InvalidConfig {
                name: "gravity",
                value: self.gravity,
                expected: "finite",
            });
        }
        if self.balls.is_empty() {
            return Err(LevelError::NoBalls);
        }
        let cup = Vec2::from(self.cup);
        for (index, ball) in self.balls.iter().enumerate() {
            let distance = Vec2::from(ball.start).distance(cup);
            if distance > self.config.reset_distance {
                return Err(LevelError::BallOutOfReach {
                    index,
                    distance,
                    limit: self.config.reset_distance,
                });
            }
        }
        Ok(())
    }

    /// The table the game ships with: two balls on the left, the cup on the
    /// right, and a kill zone in the gap past the cup.
    pub fn builtin() -> Self {
        Self {
            world_width: WORLD_W,
            world_height: WORLD_H,
            gravity: GRAVITY_Y,
            cup: Point { x: 700.0, y: 560.0 },
            balls: vec![
                BallDesc {
                    start: Point { x: 260.0, y: 480.0 },
                    angle: 0.0,
                },
                BallDesc {
                    start: Point { x: 200.0, y: 480.0 },
                    angle: 0.0,
                },
            ],
            tables: vec![
                RectDesc {
                    center: Point { x: 480.0, y: 620.0 },
                    half_width: 360.0,
                    half_height: 20.0,
                    rotation: 0.0,
                },
                RectDesc {
                    center: Point { x: 1040.0, y: 620.0 },
                    half_width: 100.0,
                    half_height: 20.0,
                    rotation: 0.0,
                },
            ],
            sensors: vec![RectDesc {
                center: Point { x: 900.0, y: 640.0 },
                half_width: 30.0,
                half_height: 40.0,
                rotation: 0.0,
            }],
            config: TossConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_level_is_valid() {
        assert!(LevelDesc::builtin().validate().is_ok());
    }

    #[test]
    fn parse_minimal_level() {
        let json = r#"{
            "cup": { "x": 500, "y": 400 },
            "balls": [ { "start": { "x": 100, "y": 100 } } ]
        }"#;
        let level = LevelDesc::from_json(json).unwrap();
        assert_eq!(level.world_width, WORLD_W);
        assert_eq!(level.gravity, GRAVITY_Y);
        assert_eq!(level.balls[0].angle, 0.0);
        assert!(level.tables.is_empty());
        assert_eq!(level.config, TossConfig::default());
    }

    #[test]
    fn parse_level_with_config_block() {
        let json = r#"{
            "cup": { "x": 500, "y": 400 },
            "balls": [ { "start": { "x": 100, "y": 100 }, "angle": 0.5 } ],
            "tables": [ { "center": { "x": 300, "y": 500 }, "half_width": 200, "half_height": 10 } ],
            "sensors": [ { "center": { "x": 700, "y": 500 }, "half_width": 20, "half_height": 20 } ],
            "config": { "max_lives": 1 }
        }"#;
        let level = LevelDesc::from_json(json).unwrap();
        assert_eq!(level.config.max_lives, 1);
        assert_eq!(level.tables.len(), 1);
        assert_eq!(level.sensors[0].half_width, 20.0);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(LevelDesc::from_json("{"), Err(LevelError::Parse(_))));
    }

    #[test]
    fn level_without_balls_is_rejected() {
        let json = r#"{ "cup": { "x": 0, "y": 0 }, "balls": [] }"#;
        assert!(matches!(LevelDesc::from_json(json), Err(LevelError::NoBalls)));
    }

    #[test]
    fn ball_past_reset_distance_is_rejected() {
        let json = r#"{
            "cup": { "x": 0, "y": 0 },
            "balls": [ { "start": { "x": 700, "y": 0 } } ]
        }"#;
        assert!(matches!(
            LevelDesc::from_json(json),
            Err(LevelError::BallOutOfReach { index: 0, .. })
        ));
    }

    #[test]
    fn invalid_config_block_is_rejected() {
        let json = r#"{
            "cup": { "x": 0, "y": 0 },
            "balls": [ { "start": { "x": 10, "y": 0 } } ],
            "config": { "drag_radius": 0 }
        }"#;
        assert!(matches!(
            LevelDesc::from_json(json),
            Err(LevelError::InvalidConfig { name: "drag_radius", .. })
        ));
    }
}
