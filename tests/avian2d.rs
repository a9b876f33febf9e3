//! Integration tests for the movement plugin with the Avian2D backend.
//!
//! Avian owns integration and collision response here; the states only read
//! and write `Position` and `LinearVelocity` and sense the level through the
//! spatial query pipeline.

#![cfg(feature = "avian2d")]

use std::time::Duration;

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use platformer_movement::detection::{Aabb, ColliderId};
use platformer_movement::prelude::*;
use platformer_movement::sensor::CollisionQuery;

const FIXED_UPDATE_HZ: f64 = 60.0;

/// Create a minimal test app with physics and the movement plugin.
fn create_test_app() -> App {
    let mut app = App::new();

    app.add_plugins(MinimalPlugins);
    app.add_plugins(TransformPlugin);
    // Movement runs in FixedUpdate, physics in FixedPostUpdate
    app.add_plugins(PhysicsPlugins::default());
    app.add_plugins(PlatformerMovementPlugin::<Avian2dBackend>::default());
    app.insert_resource(Time::<Fixed>::from_hz(FIXED_UPDATE_HZ));
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
        1.0 / FIXED_UPDATE_HZ,
    )));

    app.finish();
    app.cleanup();
    app
}

/// Spawn a static floor whose top face is y = 0.
fn spawn_floor(app: &mut App) -> Entity {
    app.world_mut()
        .spawn((
            Transform::from_xyz(0.0, -1.0, 0.0),
            RigidBody::Static,
            Collider::rectangle(400.0, 2.0),
        ))
        .id()
}

fn spawn_character(app: &mut App, position: Vec2) -> Entity {
    let settings = MovementSettings::default();
    app.world_mut()
        .spawn((
            Transform::from_translation(position.extend(0.0)),
            RigidBody::Dynamic,
            Collider::rectangle(settings.body_size.x, settings.body_size.y),
            LockedAxes::ROTATION_LOCKED,
            GravityScale(1.0),
            Character::new(settings, SensorConfig::default()),
            InputState::default(),
            SignalInbox::default(),
            ClipTimeline::default(),
        ))
        .id()
}

fn run_frames(app: &mut App, frames: usize) {
    for _ in 0..frames {
        app.update();
    }
}

fn character(app: &App, entity: Entity) -> &Character {
    app.world().get::<Character>(entity).unwrap()
}

fn position(app: &App, entity: Entity) -> Vec2 {
    app.world().get::<Position>(entity).unwrap().0
}

// ==================== Ground Tests ====================

#[test]
fn character_lands_on_a_static_floor() {
    let mut app = create_test_app();
    spawn_floor(&mut app);
    let entity = spawn_character(&mut app, Vec2::new(0.0, 3.0));

    run_frames(&mut app, 180);

    let character = character(&app, entity);
    assert!(character.player().contacts().is_touching_ground());
    assert_eq!(character.state(), Some(StateKind::Idle));
    assert!((position(&app, entity).y - 1.0).abs() < 0.05);
}

#[test]
fn spatial_queries_see_the_floor_but_not_the_character() {
    let mut app = create_test_app();
    let floor = spawn_floor(&mut app);
    let entity = spawn_character(&mut app, Vec2::new(0.0, 3.0));
    run_frames(&mut app, 2);

    let pipeline = app.world().resource::<SpatialQueryPipeline>();
    let query = Avian2dBackend::collision_query(pipeline, entity);
    let probe = Aabb::new(Vec2::new(0.0, 3.0), Vec2::new(0.45, 1.0));

    let hit = query.cast_box(probe, Dir2::NEG_Y, 10.0).unwrap();
    assert_eq!(hit.collider, ColliderId::from(floor));
    assert!(hit.distance > 0.0 && hit.distance < 2.5);
    assert!(query.overlapping(probe).is_empty());
}

// ==================== Jump Tests ====================

#[test]
fn jump_sets_linear_velocity() {
    let mut app = create_test_app();
    spawn_floor(&mut app);
    let entity = spawn_character(&mut app, Vec2::new(0.0, 1.5));
    run_frames(&mut app, 120);
    assert_eq!(character(&app, entity).state(), Some(StateKind::Idle));

    app.world_mut()
        .get_mut::<InputState>(entity)
        .unwrap()
        .press(Button::Jump);
    run_frames(&mut app, 1);

    assert_eq!(
        character(&app, entity).state(),
        Some(StateKind::SingleJumpStart)
    );
    let velocity = app.world().get::<LinearVelocity>(entity).unwrap();
    assert!(velocity.y > 0.0);

    run_frames(&mut app, 10);
    assert!(position(&app, entity).y > 1.5);
}

// ==================== Fling Flower Tests ====================

#[test]
fn captured_character_ignores_gravity() {
    let mut app = create_test_app();
    let entity = spawn_character(&mut app, Vec2::new(0.0, 20.0));
    run_frames(&mut app, 2);

    let anchor = Vec2::new(2.0, 30.0);
    app.world_mut()
        .get_mut::<SignalInbox>(entity)
        .unwrap()
        .send(Signal::FlingFlower(FlingFlower::aimable(5, anchor)));
    run_frames(&mut app, 30);

    assert_eq!(
        character(&app, entity).state(),
        Some(StateKind::FlingFlowerAim)
    );
    assert_eq!(app.world().get::<GravityScale>(entity).unwrap().0, 0.0);
    assert!((position(&app, entity) - anchor).length() < 1e-3);
}
