//! Physics backend abstraction.
//!
//! This module defines the trait that physics backends must implement
//! to drive the movement states. The states never talk to a physics engine
//! directly: the backend moves kinematic data in and out of the
//! [`Character`](crate::character::Character) and answers collision queries.

use bevy::prelude::*;

use crate::sensor::CollisionQuery;

/// Trait for physics backend implementations.
///
/// All methods are static and operate on the [`World`], so the movement
/// systems can stay exclusive and generic over the backend.
pub trait MovementPhysicsBackend: 'static + Send + Sync {
    /// Resource holding whatever the backend needs to answer collision
    /// queries.
    type Colliders: Resource;

    /// Returns the plugin that sets up this backend.
    fn plugin() -> impl Plugin;

    /// Get the current velocity of an entity.
    fn get_velocity(world: &World, entity: Entity) -> Vec2;

    /// Set the velocity of an entity.
    fn set_velocity(world: &mut World, entity: Entity, velocity: Vec2);

    /// Get the current position of an entity (center of its standing body).
    fn get_position(world: &World, entity: Entity) -> Vec2;

    /// Teleport an entity.
    fn set_position(world: &mut World, entity: Entity, position: Vec2);

    /// Get the fixed timestep delta time.
    fn get_fixed_timestep(world: &World) -> f32 {
        world
            .get_resource::<Time<Fixed>>()
            .map(|t| t.timestep().as_secs_f32())
            .filter(|&d| d > 0.0)
            .unwrap_or(1.0 / 60.0)
    }

    /// Collision queries that ignore `exclude` (the character itself).
    fn collision_query<'a>(
        colliders: &'a Self::Colliders,
        exclude: Entity,
    ) -> Box<dyn CollisionQuery + 'a>;
}
