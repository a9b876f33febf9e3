//! Avian2D physics backend implementation.
//!
//! This module provides the physics backend for Avian2D. Enable with the
//! `avian2d` feature. Avian owns integration and collision response; the
//! movement states only read and write `Position` and `LinearVelocity`, and
//! sense the level through the spatial query pipeline.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::MovementSet;
use crate::backend::MovementPhysicsBackend;
use crate::character::Character;
use crate::detection::{Aabb, ColliderId, SurfaceHit};
use crate::sensor::CollisionQuery;

/// Avian2D physics backend for the movement states.
pub struct Avian2dBackend;

impl MovementPhysicsBackend for Avian2dBackend {
    type Colliders = SpatialQueryPipeline;

    fn plugin() -> impl Plugin {
        Avian2dBackendPlugin
    }

    fn get_velocity(world: &World, entity: Entity) -> Vec2 {
        world
            .get::<LinearVelocity>(entity)
            .map(|v| v.0)
            .unwrap_or(Vec2::ZERO)
    }

    fn set_velocity(world: &mut World, entity: Entity, velocity: Vec2) {
        if let Some(mut vel) = world.get_mut::<LinearVelocity>(entity) {
            vel.0 = velocity;
        }
    }

    fn get_position(world: &World, entity: Entity) -> Vec2 {
        // Try Avian's Position component first, then fall back to Transform
        world
            .get::<Position>(entity)
            .map(|p| p.0)
            .or_else(|| world.get::<Transform>(entity).map(|t| t.translation.xy()))
            .unwrap_or(Vec2::ZERO)
    }

    fn set_position(world: &mut World, entity: Entity, position: Vec2) {
        if let Some(mut pos) = world.get_mut::<Position>(entity) {
            if pos.0 != position {
                pos.0 = position;
            }
        } else if let Some(mut transform) = world.get_mut::<Transform>(entity) {
            transform.translation.x = position.x;
            transform.translation.y = position.y;
        }
    }

    fn collision_query<'a>(
        colliders: &'a SpatialQueryPipeline,
        exclude: Entity,
    ) -> Box<dyn CollisionQuery + 'a> {
        Box::new(AvianQuery {
            pipeline: colliders,
            exclude,
        })
    }
}

/// [`CollisionQuery`] over Avian's spatial query pipeline.
pub struct AvianQuery<'a> {
    pipeline: &'a SpatialQueryPipeline,
    exclude: Entity,
}

impl AvianQuery<'_> {
    fn filter(&self) -> SpatialQueryFilter {
        SpatialQueryFilter::default().with_excluded_entities([self.exclude])
    }
}

impl CollisionQuery for AvianQuery<'_> {
    fn cast_box(&self, shape: Aabb, direction: Dir2, max_distance: f32) -> Option<SurfaceHit> {
        let size = shape.size();
        let collider = Collider::rectangle(size.x, size.y);
        let config = ShapeCastConfig::from_max_distance(max_distance);

        self.pipeline
            .cast_shape(
                &collider,
                shape.center,
                0.0,
                direction,
                &config,
                &self.filter(),
            )
            .map(|hit| {
                SurfaceHit::new(
                    hit.distance,
                    hit.normal1,
                    hit.point1,
                    ColliderId::from(hit.entity),
                )
            })
    }

    fn overlapping(&self, shape: Aabb) -> Vec<ColliderId> {
        let size = shape.size();
        let collider = Collider::rectangle(size.x, size.y);
        self.pipeline
            .shape_intersections(&collider, shape.center, 0.0, &self.filter())
            .into_iter()
            .map(ColliderId::from)
            .collect()
    }
}

/// Plugin that sets up Avian2D-specific systems for the movement states.
pub struct Avian2dBackendPlugin;

impl Plugin for Avian2dBackendPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            sync_gravity_scale.in_set(MovementSet::Integration),
        );
    }
}

/// Switch gravity off for suspended characters.
pub fn sync_gravity_scale(mut q_characters: Query<(&Character, &mut GravityScale)>) {
    for (character, mut gravity) in &mut q_characters {
        let scale = if character.player().is_suspended() {
            0.0
        } else {
            1.0
        };
        if gravity.0 != scale {
            gravity.0 = scale;
        }
    }
}
