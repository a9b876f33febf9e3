//! Facing direction of the character.

use bevy::prelude::*;

/// Horizontal facing of the character.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Facing {
    Left = -1,
    #[default]
    None = 0,
    Right = 1,
}

impl Facing {
    /// Derive a facing from a horizontal velocity.
    ///
    /// Speeds below `idle_threshold` have no facing.
    pub fn from_velocity(vx: f32, idle_threshold: f32) -> Self {
        if vx.abs() < idle_threshold {
            Facing::None
        } else {
            Self::from_sign(vx)
        }
    }

    /// Facing from the sign of `value`. Zero maps to `None`.
    pub fn from_sign(value: f32) -> Self {
        if value > 0.0 {
            Facing::Right
        } else if value < 0.0 {
            Facing::Left
        } else {
            Facing::None
        }
    }

    /// `-1.0`, `0.0` or `1.0`.
    pub fn sign(self) -> f32 {
        self as i8 as f32
    }

    /// The opposite facing. `None` stays `None`.
    pub fn flipped(self) -> Self {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
            Facing::None => Facing::None,
        }
    }

    pub fn is_none(self) -> bool {
        self == Facing::None
    }
}
