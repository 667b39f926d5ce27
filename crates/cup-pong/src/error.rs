//! Errors raised while loading a level.
//!
//! Gameplay handlers never fail: a missing entity or an unknown collision
//! part is skipped. Only level setup returns [`LevelError`].

use std::fmt;

/// Why a level description was rejected.
#[derive(Debug)]
pub enum LevelError {
    /// The JSON text could not be parsed into a level.
    Parse(serde_json::Error),

    /// A tuning value is outside the range the game can run with.
    InvalidConfig {
        /// Field name as it appears in the `config` block.
        name: &'static str,
        value: f32,
        /// Human-readable description of the accepted range.
        expected: &'static str,
    },

    /// The level has no ball to play with.
    NoBalls,

    /// A ball's rest position is already past the reset distance from the
    /// cup, so it would die on its first frame.
    BallOutOfReach {
        index: usize,
        distance: f32,
        limit: f32,
    },
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelError::Parse(err) => write!(f, "level JSON is malformed: {}", err),
            LevelError::InvalidConfig {
                name,
                value,
                expected,
            } => write!(f, "config '{}' = {} must be {}", name, value, expected),
            LevelError::NoBalls => write!(f, "level defines no balls"),
            LevelError::BallOutOfReach {
                index,
                distance,
                limit,
            } => write!(
                f,
                "ball {} rests {:.1} units from the cup, past the reset distance {:.1}",
                index, distance, limit
            ),
        }
    }
}

impl std::error::Error for LevelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LevelError::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for LevelError {
    fn from(err: serde_json::Error) -> Self {
        LevelError::Parse(err)
    }
}

pub type LevelResult<T> = Result<T, LevelError>;
