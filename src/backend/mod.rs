mod kinematic;
mod traits;

#[cfg(feature = "avian2d")]
pub mod avian;

pub use kinematic::{
    BoxQuery, KinematicBackend, KinematicBackendPlugin, KinematicBody, StaticCollider,
    StaticColliders,
};
pub use traits::MovementPhysicsBackend;

#[cfg(feature = "avian2d")]
pub use avian::Avian2dBackend;
