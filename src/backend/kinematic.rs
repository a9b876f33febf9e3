//! Built-in kinematic backend.
//!
//! Characters carry a [`KinematicBody`]; level geometry is made of
//! [`StaticCollider`] boxes. Each fixed tick the collider boxes are
//! snapshotted into [`StaticColliders`], the states run against that
//! snapshot, and then bodies are integrated with gravity and moved one axis
//! at a time, stopping flush against whatever they hit.

use bevy::prelude::*;

use crate::MovementSet;
use crate::backend::MovementPhysicsBackend;
use crate::character::Character;
use crate::detection::{Aabb, ColliderId, SurfaceHit};
use crate::sensor::CollisionQuery;

/// Velocity and gravity of a kinematic character.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
#[require(Transform)]
pub struct KinematicBody {
    pub velocity: Vec2,
    pub gravity: Vec2,
}

impl Default for KinematicBody {
    fn default() -> Self {
        Self {
            velocity: Vec2::ZERO,
            gravity: Vec2::new(0.0, -60.0),
        }
    }
}

impl KinematicBody {
    pub fn with_gravity(gravity: Vec2) -> Self {
        Self {
            gravity,
            ..default()
        }
    }
}

/// Axis-aligned solid box centered on the entity's translation.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
#[require(Transform)]
pub struct StaticCollider {
    pub half_extents: Vec2,
}

impl StaticCollider {
    pub fn from_size(size: Vec2) -> Self {
        Self {
            half_extents: size.abs() * 0.5,
        }
    }
}

/// Snapshot of every [`StaticCollider`] for the current fixed tick.
#[derive(Resource, Debug, Clone, Default)]
pub struct StaticColliders {
    boxes: Vec<(ColliderId, Aabb)>,
}

impl StaticColliders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: ColliderId, aabb: Aabb) {
        self.boxes.push((id, aabb));
    }

    pub fn clear(&mut self) {
        self.boxes.clear();
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Queries against every box except `exclude`.
    pub fn query(&self, exclude: Option<ColliderId>) -> BoxQuery<'_> {
        BoxQuery {
            colliders: self,
            exclude,
        }
    }
}

/// [`CollisionQuery`] over a [`StaticColliders`] snapshot.
#[derive(Debug, Clone, Copy)]
pub struct BoxQuery<'a> {
    colliders: &'a StaticColliders,
    exclude: Option<ColliderId>,
}

impl BoxQuery<'_> {
    fn boxes(&self) -> impl Iterator<Item = &(ColliderId, Aabb)> {
        self.colliders
            .boxes
            .iter()
            .filter(move |(id, _)| Some(*id) != self.exclude)
    }
}

/// Entry distance of `shape` swept along `direction` into `target`.
///
/// Works on the Minkowski sum: a ray from the shape center against the
/// target grown by the shape's half extents. Returns the entry distance
/// (negative when already overlapping) and the hit normal.
fn sweep(shape: Aabb, direction: Vec2, target: Aabb) -> Option<(f32, Vec2)> {
    let grown = Aabb::new(target.center, target.half_extents + shape.half_extents);
    let (min, max) = (grown.min(), grown.max());
    let origin = shape.center;

    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;
    let mut normal = Vec2::ZERO;

    for axis in 0..2 {
        let o = origin[axis];
        let d = direction[axis];
        if d == 0.0 {
            // Parallel: must lie strictly inside the slab.
            if o <= min[axis] || o >= max[axis] {
                return None;
            }
            continue;
        }
        let t1 = (min[axis] - o) / d;
        let t2 = (max[axis] - o) / d;
        let (near, far) = if t1 < t2 { (t1, t2) } else { (t2, t1) };
        if near > t_enter {
            t_enter = near;
            normal = Vec2::ZERO;
            normal[axis] = -d.signum();
        }
        t_exit = t_exit.min(far);
    }

    (t_exit > t_enter.max(0.0)).then_some((t_enter, normal))
}

impl CollisionQuery for BoxQuery<'_> {
    fn cast_box(&self, shape: Aabb, direction: Dir2, max_distance: f32) -> Option<SurfaceHit> {
        let dir = direction.as_vec2();
        self.boxes()
            .filter_map(|(id, target)| {
                let (t, normal) = sweep(shape, dir, *target)?;
                (t <= max_distance).then(|| {
                    let distance = t.max(0.0);
                    let point = shape.center + dir * (distance + shape.extent_along(dir));
                    SurfaceHit::new(distance, normal, point, *id)
                })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    fn overlapping(&self, shape: Aabb) -> Vec<ColliderId> {
        self.boxes()
            .filter(|(_, target)| shape.overlaps(target))
            .map(|(id, _)| *id)
            .collect()
    }
}

/// Kinematic physics backend.
pub struct KinematicBackend;

impl MovementPhysicsBackend for KinematicBackend {
    type Colliders = StaticColliders;

    fn plugin() -> impl Plugin {
        KinematicBackendPlugin
    }

    fn get_velocity(world: &World, entity: Entity) -> Vec2 {
        world
            .get::<KinematicBody>(entity)
            .map(|b| b.velocity)
            .unwrap_or(Vec2::ZERO)
    }

    fn set_velocity(world: &mut World, entity: Entity, velocity: Vec2) {
        if let Some(mut body) = world.get_mut::<KinematicBody>(entity) {
            body.velocity = velocity;
        }
    }

    fn get_position(world: &World, entity: Entity) -> Vec2 {
        world
            .get::<Transform>(entity)
            .map(|t| t.translation.xy())
            .unwrap_or(Vec2::ZERO)
    }

    fn set_position(world: &mut World, entity: Entity, position: Vec2) {
        if let Some(mut transform) = world.get_mut::<Transform>(entity) {
            transform.translation.x = position.x;
            transform.translation.y = position.y;
        }
    }

    fn collision_query<'a>(
        colliders: &'a StaticColliders,
        exclude: Entity,
    ) -> Box<dyn CollisionQuery + 'a> {
        Box::new(colliders.query(Some(ColliderId::from(exclude))))
    }
}

/// Plugin that sets up the kinematic backend systems.
pub struct KinematicBackendPlugin;

impl Plugin for KinematicBackendPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<KinematicBody>();
        app.register_type::<StaticCollider>();
        app.init_resource::<StaticColliders>();

        app.add_systems(
            FixedUpdate,
            snapshot_static_colliders.in_set(MovementSet::Sensors),
        );
        app.add_systems(
            FixedUpdate,
            integrate_kinematic_bodies.in_set(MovementSet::Integration),
        );
    }
}

/// Rebuild the collider snapshot from the current transforms.
pub fn snapshot_static_colliders(
    mut colliders: ResMut<StaticColliders>,
    q_colliders: Query<(Entity, &StaticCollider, &Transform)>,
) {
    colliders.clear();
    for (entity, collider, transform) in &q_colliders {
        colliders.insert(
            ColliderId::from(entity),
            Aabb::new(transform.translation.xy(), collider.half_extents),
        );
    }
}

/// Move `shape` by `delta` along one axis, stopping at the first box hit.
///
/// Returns the distance actually travelled (signed) and whether it was
/// blocked.
fn move_axis(query: &BoxQuery, shape: Aabb, delta: f32, axis: Dir2) -> (f32, bool) {
    if delta == 0.0 {
        return (0.0, false);
    }
    let direction = if delta > 0.0 { axis } else { -axis };
    match query.cast_box(shape, direction, delta.abs()) {
        Some(hit) if hit.distance < delta.abs() => (hit.distance * delta.signum(), true),
        _ => (delta, false),
    }
}

/// Apply gravity and move characters, one axis at a time.
pub fn integrate_kinematic_bodies(
    time: Res<Time<Fixed>>,
    colliders: Res<StaticColliders>,
    mut q_bodies: Query<(Entity, &mut KinematicBody, &mut Transform, &Character)>,
) {
    let dt = time.timestep().as_secs_f32();

    for (entity, mut body, mut transform, character) in &mut q_bodies {
        let query = colliders.query(Some(ColliderId::from(entity)));
        let player = character.player();

        if !player.is_suspended() {
            let gravity = body.gravity;
            body.velocity += gravity * dt;
            body.velocity.y = body.velocity.y.max(-player.settings.max_fall_speed);
        }

        let mut shape = player.bounds();
        shape.center += transform.translation.xy() - player.position();

        let (dx, blocked_x) = move_axis(&query, shape, body.velocity.x * dt, Dir2::X);
        shape.center.x += dx;
        if blocked_x {
            body.velocity.x = 0.0;
        }

        let (dy, blocked_y) = move_axis(&query, shape, body.velocity.y * dt, Dir2::Y);
        if blocked_y {
            body.velocity.y = 0.0;
        }

        transform.translation.x += dx;
        transform.translation.y += dy;
    }
}
