//! Detection result structures.
//!
//! These structures hold the results of collision queries used for ground,
//! wall and ceiling sensing and for box-fit checks.

use bevy::prelude::*;

/// Opaque identifier of a collider returned by a [`CollisionQuery`].
///
/// [`CollisionQuery`]: crate::sensor::CollisionQuery
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColliderId(pub u64);

impl From<Entity> for ColliderId {
    fn from(entity: Entity) -> Self {
        Self(entity.to_bits())
    }
}

/// Axis-aligned bounding box.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub center: Vec2,
    pub half_extents: Vec2,
}

impl Aabb {
    pub fn new(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            center,
            half_extents: half_extents.abs(),
        }
    }

    pub fn from_size(center: Vec2, size: Vec2) -> Self {
        Self::new(center, size * 0.5)
    }

    /// A box of `size` whose bottom edge sits at `bottom_center`.
    pub fn from_bottom(bottom_center: Vec2, size: Vec2) -> Self {
        Self::from_size(bottom_center + Vec2::new(0.0, size.y * 0.5), size)
    }

    pub fn size(&self) -> Vec2 {
        self.half_extents * 2.0
    }

    pub fn min(&self) -> Vec2 {
        self.center - self.half_extents
    }

    pub fn max(&self) -> Vec2 {
        self.center + self.half_extents
    }

    pub fn bottom_center(&self) -> Vec2 {
        Vec2::new(self.center.x, self.min().y)
    }

    /// Strict overlap test. Boxes that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        let d = (self.center - other.center).abs();
        let r = self.half_extents + other.half_extents;
        d.x < r.x && d.y < r.y
    }

    /// Extent of the box measured along `direction` (unit vector).
    pub fn extent_along(&self, direction: Vec2) -> f32 {
        self.half_extents.x * direction.x.abs() + self.half_extents.y * direction.y.abs()
    }
}

/// The four sensed directions.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SenseDirection {
    Down,
    Left,
    Right,
    Up,
}

impl SenseDirection {
    pub const ALL: [SenseDirection; 4] = [
        SenseDirection::Down,
        SenseDirection::Left,
        SenseDirection::Right,
        SenseDirection::Up,
    ];

    pub fn dir(self) -> Dir2 {
        match self {
            SenseDirection::Down => Dir2::NEG_Y,
            SenseDirection::Left => Dir2::NEG_X,
            SenseDirection::Right => Dir2::X,
            SenseDirection::Up => Dir2::Y,
        }
    }

    /// The normal a surface in this direction faces with when hit head-on.
    pub fn expected_normal(self) -> Vec2 {
        -self.dir().as_vec2()
    }
}

/// Information about a directional query result.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    /// Distance travelled before contact.
    pub distance: f32,
    /// Normal of the surface at the hit point.
    pub normal: Vec2,
    /// World position of the hit point.
    pub point: Vec2,
    /// Collider that was hit.
    pub collider: ColliderId,
}

impl SurfaceHit {
    pub fn new(distance: f32, normal: Vec2, point: Vec2, collider: ColliderId) -> Self {
        Self {
            distance,
            normal,
            point,
            collider,
        }
    }
}

/// Distances and contacts around the character for one fixed tick.
///
/// Missing surfaces report `f32::INFINITY`. Callers must check
/// [`f32::is_finite`] before using a distance as a position correction.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct ContactReport {
    pub ground: Option<SurfaceHit>,
    pub left_wall: Option<SurfaceHit>,
    pub right_wall: Option<SurfaceHit>,
    pub ceiling: Option<SurfaceHit>,
    /// Distances at or below this count as touching.
    pub contact_epsilon: f32,
}

impl Default for ContactReport {
    fn default() -> Self {
        Self::empty(0.02)
    }
}

impl ContactReport {
    /// A report with nothing in range.
    pub fn empty(contact_epsilon: f32) -> Self {
        Self {
            ground: None,
            left_wall: None,
            right_wall: None,
            ceiling: None,
            contact_epsilon,
        }
    }

    pub fn hit(&self, direction: SenseDirection) -> Option<&SurfaceHit> {
        match direction {
            SenseDirection::Down => self.ground.as_ref(),
            SenseDirection::Left => self.left_wall.as_ref(),
            SenseDirection::Right => self.right_wall.as_ref(),
            SenseDirection::Up => self.ceiling.as_ref(),
        }
    }

    pub fn set_hit(&mut self, direction: SenseDirection, hit: Option<SurfaceHit>) {
        match direction {
            SenseDirection::Down => self.ground = hit,
            SenseDirection::Left => self.left_wall = hit,
            SenseDirection::Right => self.right_wall = hit,
            SenseDirection::Up => self.ceiling = hit,
        }
    }

    pub fn distance(&self, direction: SenseDirection) -> f32 {
        self.hit(direction).map_or(f32::INFINITY, |h| h.distance)
    }

    pub fn is_touching(&self, direction: SenseDirection) -> bool {
        self.distance(direction) <= self.contact_epsilon
    }

    pub fn distance_to_ground(&self) -> f32 {
        self.distance(SenseDirection::Down)
    }

    pub fn distance_to_left_wall(&self) -> f32 {
        self.distance(SenseDirection::Left)
    }

    pub fn distance_to_right_wall(&self) -> f32 {
        self.distance(SenseDirection::Right)
    }

    pub fn distance_to_ceiling(&self) -> f32 {
        self.distance(SenseDirection::Up)
    }

    pub fn is_touching_ground(&self) -> bool {
        self.is_touching(SenseDirection::Down)
    }

    pub fn is_touching_left_wall(&self) -> bool {
        self.is_touching(SenseDirection::Left)
    }

    pub fn is_touching_right_wall(&self) -> bool {
        self.is_touching(SenseDirection::Right)
    }

    pub fn is_touching_ceiling(&self) -> bool {
        self.is_touching(SenseDirection::Up)
    }

    /// Whether touching any wall.
    pub fn is_touching_wall(&self) -> bool {
        self.is_touching_left_wall() || self.is_touching_right_wall()
    }

    /// Sign of the touched wall: `-1.0` left, `1.0` right, `0.0` none.
    /// A left wall wins when both sides touch.
    pub fn touching_wall_side(&self) -> f32 {
        if self.is_touching_left_wall() {
            -1.0
        } else if self.is_touching_right_wall() {
            1.0
        } else {
            0.0
        }
    }

    /// Whether touching the wall on the side of `sign`.
    pub fn is_touching_wall_on(&self, sign: f32) -> bool {
        if sign < 0.0 {
            self.is_touching_left_wall()
        } else if sign > 0.0 {
            self.is_touching_right_wall()
        } else {
            false
        }
    }

    /// Distance to the wall on the side of `sign` (`f32::INFINITY` for 0).
    pub fn distance_to_wall_on(&self, sign: f32) -> f32 {
        if sign < 0.0 {
            self.distance_to_left_wall()
        } else if sign > 0.0 {
            self.distance_to_right_wall()
        } else {
            f32::INFINITY
        }
    }

    /// Find a recorded hit against `collider`.
    pub fn hit_with(&self, collider: ColliderId) -> Option<&SurfaceHit> {
        SenseDirection::ALL
            .into_iter()
            .filter_map(|d| self.hit(d))
            .find(|h| h.collider == collider)
    }
}

/// Result of a box-fit check.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FitResult {
    /// Nothing blocks the tested cell.
    pub fits: bool,
    /// Colliders overlapping the tested cell.
    pub blockers: Vec<ColliderId>,
}

impl FitResult {
    pub fn from_blockers(blockers: Vec<ColliderId>) -> Self {
        Self {
            fits: blockers.is_empty(),
            blockers,
        }
    }
}
