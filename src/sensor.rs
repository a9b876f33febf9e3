//! Collision sensing.
//!
//! The sensor answers distance, touching and fit questions about the
//! character's bounding box. It does not know how collisions are computed:
//! every question is reduced to the two primitives of [`CollisionQuery`],
//! which physics backends implement.

use bevy::prelude::*;

use crate::config::SensorConfig;
use crate::detection::{Aabb, ColliderId, ContactReport, FitResult, SenseDirection, SurfaceHit};

/// Directional query primitive supplied by the physics engine.
pub trait CollisionQuery {
    /// Sweep `shape` along `direction` for at most `max_distance` and return
    /// the nearest hit. A shape already touching a surface reports distance 0.
    fn cast_box(&self, shape: Aabb, direction: Dir2, max_distance: f32) -> Option<SurfaceHit>;

    /// Colliders whose interior overlaps `shape`.
    fn overlapping(&self, shape: Aabb) -> Vec<ColliderId>;
}

/// A world without colliders.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoColliders;

impl CollisionQuery for NoColliders {
    fn cast_box(&self, _shape: Aabb, _direction: Dir2, _max_distance: f32) -> Option<SurfaceHit> {
        None
    }

    fn overlapping(&self, _shape: Aabb) -> Vec<ColliderId> {
        Vec::new()
    }
}

/// Distance/touching/fits queries against a bounding box.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq)]
pub struct CollisionSensor {
    pub config: SensorConfig,
}

impl CollisionSensor {
    pub fn new(config: SensorConfig) -> Self {
        Self { config }
    }

    /// The box swept in `direction`: the body shrunk by `skin` across the
    /// cast so surfaces running parallel to the cast are not reported.
    pub fn probe(&self, bounds: Aabb, direction: SenseDirection) -> Aabb {
        let skin = self.config.skin;
        let mut half = bounds.half_extents;
        match direction {
            SenseDirection::Down | SenseDirection::Up => half.x = (half.x - skin).max(skin),
            SenseDirection::Left | SenseDirection::Right => half.y = (half.y - skin).max(skin),
        }
        Aabb::new(bounds.center, half)
    }

    /// Nearest qualifying surface in `direction`, if within range.
    pub fn sense_direction(
        &self,
        query: &dyn CollisionQuery,
        bounds: Aabb,
        direction: SenseDirection,
    ) -> Option<SurfaceHit> {
        let probe = self.probe(bounds, direction);
        query
            .cast_box(probe, direction.dir(), self.config.range)
            .filter(|hit| hit.distance.is_finite() && hit.distance <= self.config.range)
            .map(|mut hit| {
                hit.distance = hit.distance.max(0.0);
                hit
            })
    }

    /// Sense all four directions.
    pub fn sense(&self, query: &dyn CollisionQuery, bounds: Aabb) -> ContactReport {
        let mut report = ContactReport::empty(self.config.contact_epsilon);
        for direction in SenseDirection::ALL {
            report.set_hit(direction, self.sense_direction(query, bounds, direction));
        }
        log::trace!(
            "sensed ground={:.3} left={:.3} right={:.3} ceiling={:.3}",
            report.distance_to_ground(),
            report.distance_to_left_wall(),
            report.distance_to_right_wall(),
            report.distance_to_ceiling()
        );
        report
    }

    pub fn distance(
        &self,
        query: &dyn CollisionQuery,
        bounds: Aabb,
        direction: SenseDirection,
    ) -> f32 {
        self.sense_direction(query, bounds, direction)
            .map_or(f32::INFINITY, |h| h.distance)
    }

    pub fn distance_to_ground(&self, query: &dyn CollisionQuery, bounds: Aabb) -> f32 {
        self.distance(query, bounds, SenseDirection::Down)
    }

    pub fn distance_to_left_wall(&self, query: &dyn CollisionQuery, bounds: Aabb) -> f32 {
        self.distance(query, bounds, SenseDirection::Left)
    }

    pub fn distance_to_right_wall(&self, query: &dyn CollisionQuery, bounds: Aabb) -> f32 {
        self.distance(query, bounds, SenseDirection::Right)
    }

    pub fn distance_to_ceiling(&self, query: &dyn CollisionQuery, bounds: Aabb) -> f32 {
        self.distance(query, bounds, SenseDirection::Up)
    }

    pub fn is_touching(
        &self,
        query: &dyn CollisionQuery,
        bounds: Aabb,
        direction: SenseDirection,
    ) -> bool {
        self.distance(query, bounds, direction) <= self.config.contact_epsilon
    }

    pub fn is_touching_ground(&self, query: &dyn CollisionQuery, bounds: Aabb) -> bool {
        self.is_touching(query, bounds, SenseDirection::Down)
    }

    pub fn is_touching_left_wall(&self, query: &dyn CollisionQuery, bounds: Aabb) -> bool {
        self.is_touching(query, bounds, SenseDirection::Left)
    }

    pub fn is_touching_right_wall(&self, query: &dyn CollisionQuery, bounds: Aabb) -> bool {
        self.is_touching(query, bounds, SenseDirection::Right)
    }

    pub fn is_touching_ceiling(&self, query: &dyn CollisionQuery, bounds: Aabb) -> bool {
        self.is_touching(query, bounds, SenseDirection::Up)
    }

    /// The cell of `size` directly adjacent to `bounds` in `direction`.
    ///
    /// The cell is shrunk by `skin` on every side so surfaces merely touching
    /// its edges do not block it.
    pub fn adjacent_cell(&self, bounds: Aabb, direction: Vec2, size: Vec2) -> Aabb {
        let d = direction.normalize_or_zero();
        let half = size.abs() * 0.5;
        let cell = Aabb::new(Vec2::ZERO, half);
        let center = bounds.center + d * (bounds.extent_along(d) + cell.extent_along(d));
        let skin = Vec2::splat(self.config.skin);
        Aabb::new(center, (half - skin).max(Vec2::splat(self.config.skin * 0.5)))
    }

    /// Whether a box of `size` fits next to `bounds` in `direction`.
    pub fn fits_in_direction(
        &self,
        query: &dyn CollisionQuery,
        bounds: Aabb,
        direction: Vec2,
        size: Vec2,
    ) -> FitResult {
        let cell = self.adjacent_cell(bounds, direction, size);
        FitResult::from_blockers(query.overlapping(cell))
    }

    pub fn fits_up(&self, query: &dyn CollisionQuery, bounds: Aabb, size: Vec2) -> FitResult {
        self.fits_in_direction(query, bounds, Vec2::Y, size)
    }

    pub fn fits_down(&self, query: &dyn CollisionQuery, bounds: Aabb, size: Vec2) -> FitResult {
        self.fits_in_direction(query, bounds, Vec2::NEG_Y, size)
    }

    pub fn fits_left(&self, query: &dyn CollisionQuery, bounds: Aabb, size: Vec2) -> FitResult {
        self.fits_in_direction(query, bounds, Vec2::NEG_X, size)
    }

    pub fn fits_right(&self, query: &dyn CollisionQuery, bounds: Aabb, size: Vec2) -> FitResult {
        self.fits_in_direction(query, bounds, Vec2::X, size)
    }
}

/// Whether a contact qualifies as a hit from the expected side.
///
/// The contact normal is `hit_normal` when given, otherwise the normal recorded
/// against `collider` in `report`. It must equal `check_normal` (default: up,
/// i.e. ground-like) exactly after normalization, which rejects glancing hits.
pub fn is_hit_by(
    report: &ContactReport,
    collider: ColliderId,
    hit_normal: Option<Vec2>,
    check_normal: Option<Vec2>,
) -> bool {
    let Some(normal) = hit_normal.or_else(|| report.hit_with(collider).map(|h| h.normal)) else {
        return false;
    };
    let normal = normal.normalize_or_zero();
    let expected = check_normal.unwrap_or(Vec2::Y).normalize_or_zero();
    normal != Vec2::ZERO && normal == expected
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Single box collider for probing the sensor maths.
    struct OneBox {
        id: ColliderId,
        aabb: Aabb,
    }

    impl CollisionQuery for OneBox {
        fn cast_box(&self, shape: Aabb, direction: Dir2, max_distance: f32) -> Option<SurfaceHit> {
            // Only axis-aligned casts are used by the sensor.
            let d = direction.as_vec2();
            let gap_x = (shape.center.x - self.aabb.center.x).abs()
                - shape.half_extents.x
                - self.aabb.half_extents.x;
            let gap_y = (shape.center.y - self.aabb.center.y).abs()
                - shape.half_extents.y
                - self.aabb.half_extents.y;
            let (gap, cross_gap, toward) = if d.x != 0.0 {
                (gap_x, gap_y, (self.aabb.center.x - shape.center.x) * d.x > 0.0)
            } else {
                (gap_y, gap_x, (self.aabb.center.y - shape.center.y) * d.y > 0.0)
            };
            if !toward || cross_gap >= 0.0 || gap > max_distance {
                return None;
            }
            Some(SurfaceHit::new(gap.max(0.0), -d, shape.center + d * gap, self.id))
        }

        fn overlapping(&self, shape: Aabb) -> Vec<ColliderId> {
            if shape.overlaps(&self.aabb) {
                vec![self.id]
            } else {
                Vec::new()
            }
        }
    }

    fn floor() -> OneBox {
        // Top surface at y = 0
        OneBox {
            id: ColliderId(1),
            aabb: Aabb::new(Vec2::new(0.0, -1.0), Vec2::new(50.0, 1.0)),
        }
    }

    fn body_at(bottom_y: f32) -> Aabb {
        Aabb::from_bottom(Vec2::new(0.0, bottom_y), Vec2::new(1.0, 2.0))
    }

    #[test]
    fn ground_distance_measures_gap() {
        let sensor = CollisionSensor::default();
        let d = sensor.distance_to_ground(&floor(), body_at(0.5));
        assert!((d - 0.5).abs() < 1e-5);
    }

    #[test]
    fn nothing_in_range_is_infinite() {
        let sensor = CollisionSensor::default();
        assert_eq!(sensor.distance_to_ground(&floor(), body_at(100.0)), f32::INFINITY);
        assert_eq!(sensor.distance_to_ceiling(&NoColliders, body_at(0.0)), f32::INFINITY);
    }

    #[test]
    fn standing_on_floor_touches_ground_only() {
        let sensor = CollisionSensor::default();
        let report = sensor.sense(&floor(), body_at(0.0));
        assert!(report.is_touching_ground());
        // The skin keeps the floor out of the wall probes
        assert!(!report.is_touching_left_wall());
        assert!(!report.is_touching_right_wall());
        assert!(!report.is_touching_ceiling());
    }

    #[test]
    fn fits_up_reports_blockers() {
        let sensor = CollisionSensor::default();
        let ceiling = OneBox {
            id: ColliderId(9),
            aabb: Aabb::new(Vec2::new(0.0, 3.5), Vec2::new(5.0, 0.5)),
        };
        let crouched = Aabb::from_bottom(Vec2::ZERO, Vec2::new(1.0, 1.0));

        let result = sensor.fits_up(&ceiling, crouched, Vec2::new(1.0, 1.0));
        assert!(result.fits);

        let result = sensor.fits_up(&ceiling, crouched, Vec2::new(1.0, 2.5));
        assert!(!result.fits);
        assert_eq!(result.blockers, vec![ColliderId(9)]);
    }

    #[test]
    fn fits_down_into_floor_is_blocked() {
        let sensor = CollisionSensor::default();
        let result = sensor.fits_down(&floor(), body_at(0.0), Vec2::new(1.0, 1.0));
        assert!(!result.fits);
    }

    #[test]
    fn adjacent_cell_sits_beside_bounds() {
        let sensor = CollisionSensor::new(SensorConfig {
            skin: 0.0,
            ..default()
        });
        let bounds = Aabb::new(Vec2::ZERO, Vec2::new(0.5, 1.0));
        let cell = sensor.adjacent_cell(bounds, Vec2::X, Vec2::new(1.0, 2.0));
        assert_eq!(cell.center, Vec2::new(1.0, 0.0));
        let cell = sensor.adjacent_cell(bounds, Vec2::NEG_Y, Vec2::new(1.0, 2.0));
        assert_eq!(cell.center, Vec2::new(0.0, -2.0));
    }

    #[test]
    fn is_hit_by_compares_normals_exactly() {
        let mut report = ContactReport::empty(0.02);
        report.ground = Some(SurfaceHit::new(0.0, Vec2::new(0.0, 2.0), Vec2::ZERO, ColliderId(3)));

        // Recorded normal, default check (up)
        assert!(is_hit_by(&report, ColliderId(3), None, None));
        // Glancing hit is rejected
        assert!(!is_hit_by(&report, ColliderId(3), Some(Vec2::new(0.3, 1.0)), None));
        // Explicit check normal
        assert!(is_hit_by(&report, ColliderId(3), Some(Vec2::X), Some(Vec2::new(5.0, 0.0))));
        // Unknown collider without explicit normal
        assert!(!is_hit_by(&report, ColliderId(4), None, None));
    }
}
