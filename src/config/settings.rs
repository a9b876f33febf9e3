//! Tunable movement values.

use bevy::prelude::*;

use crate::error::MovementError;

/// Tunable values for every movement state.
///
/// Owned by the character and read-only to states. Values are read fresh
/// every tick, so edits take effect immediately (coyote thresholds included).
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct MovementSettings {
    /// Top horizontal speed (units/second).
    pub max_speed: f32,
    /// Fraction of `max_speed` gained per second while input is held (0.0-1.0).
    pub acceleration: f32,
    /// Fraction of horizontal velocity removed per tick without input (0.0-1.0).
    pub deceleration: f32,
    /// Fraction of `max_speed` gained per second while turning around.
    pub agility: f32,
    /// Speeds below this count as standing still.
    pub idle_threshold: f32,
    /// Upward velocity of the first jump.
    pub single_jump_force: f32,
    /// Upward velocity of the air jump.
    pub double_jump_force: f32,
    /// Terminal falling speed.
    pub max_fall_speed: f32,
    /// Airborne seconds after which a moving landing becomes a roll.
    pub roll_on_land: f32,
    /// Horizontal speed while crawling.
    pub crawl_speed: f32,
    /// Velocity of the hop into a crawl (x is along facing).
    pub dive_hop: Vec2,
    /// Launch velocity of a wall jump (x points away from the wall).
    pub wall_jump: Vec2,
    /// Scale applied to horizontal input right after a wall jump.
    pub wall_jump_muting: f32,
    /// Fraction of downward speed removed per tick while wall sliding.
    pub wall_slide_deceleration: f32,
    /// Fraction of downward speed removed per tick while sliding fast.
    pub fast_wall_slide_deceleration: f32,
    /// Grace seconds to jump after walking off a ledge.
    pub coyote_time: f32,
    /// Grace seconds to wall jump after leaving a wall.
    pub wall_jump_coyote_time: f32,
    /// Standing collision box size.
    pub body_size: Vec2,
    /// Box height while crouching or crawling.
    pub crouch_height: f32,
    /// Ceiling distance under which a stopped crawl stays crawling.
    pub crawl_clearance: f32,
    /// Launch speed out of a fling flower.
    pub fling_speed: f32,
}

impl Default for MovementSettings {
    fn default() -> Self {
        Self {
            max_speed: 24.0,
            acceleration: 0.25,
            deceleration: 0.2,
            agility: 2.0,
            idle_threshold: 0.5,
            single_jump_force: 18.0,
            double_jump_force: 15.0,
            max_fall_speed: 30.0,
            roll_on_land: 0.5,
            crawl_speed: 6.0,
            dive_hop: Vec2::new(8.0, 6.0),
            wall_jump: Vec2::new(14.0, 18.0),
            wall_jump_muting: 0.1,
            wall_slide_deceleration: 0.15,
            fast_wall_slide_deceleration: 0.02,
            coyote_time: 0.1,
            wall_jump_coyote_time: 0.12,
            body_size: Vec2::new(1.0, 2.0),
            crouch_height: 1.0,
            crawl_clearance: 1.0,
            fling_speed: 28.0,
        }
    }
}

impl MovementSettings {
    pub fn with_max_speed(mut self, max_speed: f32) -> Self {
        self.max_speed = max_speed;
        self
    }

    pub fn with_acceleration(mut self, acceleration: f32) -> Self {
        self.acceleration = acceleration;
        self
    }

    pub fn with_deceleration(mut self, deceleration: f32) -> Self {
        self.deceleration = deceleration;
        self
    }

    pub fn with_jump_forces(mut self, single: f32, double: f32) -> Self {
        self.single_jump_force = single;
        self.double_jump_force = double;
        self
    }

    pub fn with_coyote_times(mut self, ground: f32, wall: f32) -> Self {
        self.coyote_time = ground;
        self.wall_jump_coyote_time = wall;
        self
    }

    pub fn with_roll_on_land(mut self, seconds: f32) -> Self {
        self.roll_on_land = seconds;
        self
    }

    pub fn with_body_size(mut self, size: Vec2, crouch_height: f32) -> Self {
        self.body_size = size;
        self.crouch_height = crouch_height;
        self
    }

    /// Per-second acceleration while input is held.
    pub fn acceleration_factor(&self) -> f32 {
        self.max_speed * self.acceleration
    }

    /// Per-second acceleration while turning around.
    pub fn turn_factor(&self) -> f32 {
        self.max_speed * self.agility
    }

    /// Size of the collision box while crouched.
    pub fn crouch_size(&self) -> Vec2 {
        Vec2::new(self.body_size.x, self.crouch_height.min(self.body_size.y))
    }

    /// Check every value against its allowed range.
    pub fn validate(&self) -> Result<(), MovementError> {
        let unit = [
            ("acceleration", self.acceleration),
            ("deceleration", self.deceleration),
            ("wall_jump_muting", self.wall_jump_muting),
            ("wall_slide_deceleration", self.wall_slide_deceleration),
            ("fast_wall_slide_deceleration", self.fast_wall_slide_deceleration),
        ];
        for (name, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(MovementError::InvalidSetting {
                    name,
                    value,
                    reason: "must be within [0, 1]",
                });
            }
        }

        let non_negative = [
            ("max_speed", self.max_speed),
            ("agility", self.agility),
            ("idle_threshold", self.idle_threshold),
            ("single_jump_force", self.single_jump_force),
            ("double_jump_force", self.double_jump_force),
            ("max_fall_speed", self.max_fall_speed),
            ("roll_on_land", self.roll_on_land),
            ("crawl_speed", self.crawl_speed),
            ("coyote_time", self.coyote_time),
            ("wall_jump_coyote_time", self.wall_jump_coyote_time),
            ("crawl_clearance", self.crawl_clearance),
            ("fling_speed", self.fling_speed),
            ("dive_hop.x", self.dive_hop.x),
            ("dive_hop.y", self.dive_hop.y),
            ("wall_jump.x", self.wall_jump.x),
            ("wall_jump.y", self.wall_jump.y),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(MovementError::InvalidSetting {
                    name,
                    value,
                    reason: "must be finite and non-negative",
                });
            }
        }

        let positive = [
            ("body_size.x", self.body_size.x),
            ("body_size.y", self.body_size.y),
            ("crouch_height", self.crouch_height),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(MovementError::InvalidSetting {
                    name,
                    value,
                    reason: "must be finite and positive",
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(MovementSettings::default().validate().is_ok());
    }

    #[test]
    fn acceleration_out_of_range_is_rejected() {
        let settings = MovementSettings::default().with_acceleration(1.5);
        match settings.validate() {
            Err(MovementError::InvalidSetting { name, .. }) => assert_eq!(name, "acceleration"),
            other => panic!("expected InvalidSetting, got {other:?}"),
        }
    }

    #[test]
    fn negative_coyote_time_is_rejected() {
        let settings = MovementSettings::default().with_coyote_times(-0.1, 0.1);
        assert!(settings.validate().is_err());
    }

    #[test]
    fn nan_speed_is_rejected() {
        let settings = MovementSettings::default().with_max_speed(f32::NAN);
        assert!(settings.validate().is_err());
    }

    #[test]
    fn acceleration_factor_is_speed_times_fraction() {
        let settings = MovementSettings::default()
            .with_max_speed(24.0)
            .with_acceleration(0.25);
        assert_eq!(settings.acceleration_factor(), 6.0);
    }

    #[test]
    fn crouch_size_never_exceeds_body() {
        let settings = MovementSettings::default().with_body_size(Vec2::new(1.0, 2.0), 3.0);
        assert_eq!(settings.crouch_size(), Vec2::new(1.0, 2.0));
    }
}
