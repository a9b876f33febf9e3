//! Configuration for the collision sensor.

use bevy::prelude::*;

/// Configuration for the collision sensor.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct SensorConfig {
    /// Maximum distance probed in each direction. Beyond it a surface
    /// reports as `f32::INFINITY`.
    pub range: f32,

    /// Distances at or below this count as touching.
    pub contact_epsilon: f32,

    /// Amount the probe box is shrunk on the axes perpendicular to the cast,
    /// so a floor does not register as a wall.
    pub skin: f32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            range: 8.0,
            contact_epsilon: 0.02,
            skin: 0.05,
        }
    }
}
