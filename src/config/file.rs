//! Loading movement settings from TOML.
//!
//! Every key is optional; missing keys keep their [`MovementSettings`]
//! default. Vectors are written as `[x, y]` arrays.
//!
//! ```toml
//! [movement]
//! max_speed = 24.0
//! acceleration = 0.25
//! wall_jump = [14.0, 18.0]
//!
//! [sensor]
//! range = 8.0
//! ```

use bevy::prelude::*;
use serde::Deserialize;

use super::{MovementSettings, SensorConfig};
use crate::error::MovementError;

/// Top level of a settings file.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct SettingsFile {
    #[serde(default)]
    pub movement: MovementSection,
    #[serde(default)]
    pub sensor: SensorSection,
}

/// `[movement]` table.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct MovementSection {
    pub max_speed: Option<f32>,
    pub acceleration: Option<f32>,
    pub deceleration: Option<f32>,
    pub agility: Option<f32>,
    pub idle_threshold: Option<f32>,
    pub single_jump_force: Option<f32>,
    pub double_jump_force: Option<f32>,
    pub max_fall_speed: Option<f32>,
    pub roll_on_land: Option<f32>,
    pub crawl_speed: Option<f32>,
    pub dive_hop: Option<[f32; 2]>,
    pub wall_jump: Option<[f32; 2]>,
    pub wall_jump_muting: Option<f32>,
    pub wall_slide_deceleration: Option<f32>,
    pub fast_wall_slide_deceleration: Option<f32>,
    pub coyote_time: Option<f32>,
    pub wall_jump_coyote_time: Option<f32>,
    pub body_size: Option<[f32; 2]>,
    pub crouch_height: Option<f32>,
    pub crawl_clearance: Option<f32>,
    pub fling_speed: Option<f32>,
}

/// `[sensor]` table.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct SensorSection {
    pub range: Option<f32>,
    pub contact_epsilon: Option<f32>,
    pub skin: Option<f32>,
}

fn vec2(v: [f32; 2]) -> Vec2 {
    Vec2::new(v[0], v[1])
}

impl MovementSection {
    /// Overlay the present keys onto `base`.
    pub fn apply(&self, base: MovementSettings) -> MovementSettings {
        let mut s = base;
        macro_rules! merge {
            ($($field:ident),* $(,)?) => {
                $(if let Some(v) = self.$field { s.$field = v; })*
            };
        }
        merge!(
            max_speed,
            acceleration,
            deceleration,
            agility,
            idle_threshold,
            single_jump_force,
            double_jump_force,
            max_fall_speed,
            roll_on_land,
            crawl_speed,
            wall_jump_muting,
            wall_slide_deceleration,
            fast_wall_slide_deceleration,
            coyote_time,
            wall_jump_coyote_time,
            crouch_height,
            crawl_clearance,
            fling_speed,
        );
        if let Some(v) = self.dive_hop {
            s.dive_hop = vec2(v);
        }
        if let Some(v) = self.wall_jump {
            s.wall_jump = vec2(v);
        }
        if let Some(v) = self.body_size {
            s.body_size = vec2(v);
        }
        s
    }
}

impl SensorSection {
    pub fn apply(&self, base: SensorConfig) -> SensorConfig {
        SensorConfig {
            range: self.range.unwrap_or(base.range),
            contact_epsilon: self.contact_epsilon.unwrap_or(base.contact_epsilon),
            skin: self.skin.unwrap_or(base.skin),
        }
    }
}

impl SettingsFile {
    pub fn parse(source: &str) -> Result<Self, MovementError> {
        Ok(toml::from_str(source)?)
    }

    /// Merge over defaults and validate.
    pub fn resolve(&self) -> Result<(MovementSettings, SensorConfig), MovementError> {
        let movement = self.movement.apply(MovementSettings::default());
        movement.validate()?;
        let sensor = self.sensor.apply(SensorConfig::default());
        if !sensor.range.is_finite() || sensor.range <= 0.0 {
            return Err(MovementError::InvalidSetting {
                name: "sensor.range",
                value: sensor.range,
                reason: "must be finite and positive",
            });
        }
        if sensor.contact_epsilon < 0.0 || sensor.skin < 0.0 {
            return Err(MovementError::InvalidSetting {
                name: "sensor.contact_epsilon",
                value: sensor.contact_epsilon.min(sensor.skin),
                reason: "tolerances must be non-negative",
            });
        }
        Ok((movement, sensor))
    }
}

impl MovementSettings {
    /// Parse a TOML settings file and return validated settings.
    pub fn from_toml_str(source: &str) -> Result<(Self, SensorConfig), MovementError> {
        SettingsFile::parse(source)?.resolve()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let (movement, sensor) = MovementSettings::from_toml_str("").unwrap();
        assert_eq!(movement, MovementSettings::default());
        assert_eq!(sensor, SensorConfig::default());
    }

    #[test]
    fn present_keys_override_defaults() {
        let source = r#"
            [movement]
            max_speed = 30.0
            wall_jump = [10.0, 20.0]

            [sensor]
            range = 4.0
        "#;
        let (movement, sensor) = MovementSettings::from_toml_str(source).unwrap();
        assert_eq!(movement.max_speed, 30.0);
        assert_eq!(movement.wall_jump, Vec2::new(10.0, 20.0));
        assert_eq!(movement.acceleration, MovementSettings::default().acceleration);
        assert_eq!(sensor.range, 4.0);
    }

    #[test]
    fn unknown_key_is_a_parse_error() {
        let err = MovementSettings::from_toml_str("[movement]\nmax_sped = 3.0").unwrap_err();
        assert!(matches!(err, MovementError::SettingsParse(_)));
    }

    #[test]
    fn out_of_range_value_fails_validation() {
        let err = MovementSettings::from_toml_str("[movement]\ndeceleration = 2.0").unwrap_err();
        assert!(matches!(
            err,
            MovementError::InvalidSetting { name: "deceleration", .. }
        ));
    }

    #[test]
    fn zero_sensor_range_is_rejected() {
        let err = MovementSettings::from_toml_str("[sensor]\nrange = 0.0").unwrap_err();
        assert!(matches!(err, MovementError::InvalidSetting { .. }));
    }
}
