//! Movement configuration.

mod file;
mod sensors;
mod settings;

pub use file::{MovementSection, SensorSection, SettingsFile};
pub use sensors::SensorConfig;
pub use settings::MovementSettings;
