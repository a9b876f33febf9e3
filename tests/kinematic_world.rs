//! Integration tests for the movement plugin with the kinematic backend.
//!
//! These run a real Bevy app: input and signals go in through components,
//! bodies move through the backend, and state changes come out as
//! [`StateChanged`] messages.

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use platformer_movement::prelude::*;

const FIXED_UPDATE_HZ: f64 = 60.0;

#[derive(Resource, Default)]
struct SeenChanges(Vec<StateChanged>);

fn collect_changes(mut reader: MessageReader<StateChanged>, mut seen: ResMut<SeenChanges>) {
    seen.0.extend(reader.read().copied());
}

/// Create a minimal test app with the movement plugin.
fn create_test_app() -> App {
    let mut app = App::new();

    app.add_plugins(MinimalPlugins);
    app.add_plugins(TransformPlugin);
    app.add_plugins(PlatformerMovementPlugin::<KinematicBackend>::default());
    app.insert_resource(Time::<Fixed>::from_hz(FIXED_UPDATE_HZ));
    // One fixed step per update.
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
        1.0 / FIXED_UPDATE_HZ,
    )));
    app.init_resource::<SeenChanges>();
    app.add_systems(Last, collect_changes);

    app.finish();
    app.cleanup();
    app
}

/// Spawn a static box. Its top face is at `center.y + size.y / 2`.
fn spawn_box(app: &mut App, center: Vec2, size: Vec2) -> Entity {
    app.world_mut()
        .spawn((
            Transform::from_translation(center.extend(0.0)),
            StaticCollider::from_size(size),
        ))
        .id()
}

/// Spawn a floor whose top face is y = 0.
fn spawn_floor(app: &mut App) -> Entity {
    spawn_box(app, Vec2::new(0.0, -1.0), Vec2::new(400.0, 2.0))
}

fn spawn_character(app: &mut App, position: Vec2) -> Entity {
    app.world_mut()
        .spawn((
            Transform::from_translation(position.extend(0.0)),
            Character::default(),
            InputState::default(),
            SignalInbox::default(),
            ClipTimeline::default(),
            KinematicBody::default(),
        ))
        .id()
}

fn run_frames(app: &mut App, frames: usize) {
    for _ in 0..frames {
        app.update();
    }
}

fn state(app: &App, entity: Entity) -> Option<StateKind> {
    app.world().get::<Character>(entity).and_then(|c| c.state())
}

fn input(app: &mut App, entity: Entity) -> Mut<'_, InputState> {
    app.world_mut().get_mut::<InputState>(entity).unwrap()
}

fn translation(app: &App, entity: Entity) -> Vec2 {
    app.world()
        .get::<Transform>(entity)
        .unwrap()
        .translation
        .xy()
}

/// Spawn a character on the floor and let it settle into Idle.
fn settled_character(app: &mut App) -> Entity {
    spawn_floor(app);
    let character = spawn_character(app, Vec2::new(0.0, 3.0));
    run_frames(app, 60);
    assert_eq!(state(app, character), Some(StateKind::Idle));
    character
}

// ==================== Landing Tests ====================

#[test]
fn character_falls_lands_and_idles() {
    let mut app = create_test_app();
    let character = settled_character(&mut app);

    let position = translation(&app, character);
    assert!((position.y - 1.0).abs() < 1e-3, "resting at {position:?}");

    let body = app.world().get::<KinematicBody>(character).unwrap();
    assert_eq!(body.velocity.y, 0.0);
}

#[test]
fn state_changes_are_reported_in_order() {
    let mut app = create_test_app();
    let character = settled_character(&mut app);

    let targets: Vec<StateKind> = app
        .world()
        .resource::<SeenChanges>()
        .0
        .iter()
        .filter(|c| c.entity == character)
        .map(|c| c.to)
        .collect();
    assert_eq!(
        targets,
        vec![StateKind::SingleJumpFall, StateKind::Land, StateKind::Idle]
    );

    let first = app.world().resource::<SeenChanges>().0[0];
    assert_eq!(first.from, StateKind::Idle);
}

// ==================== Input Tests ====================

#[test]
fn jump_press_lifts_the_body() {
    let mut app = create_test_app();
    let character = settled_character(&mut app);

    input(&mut app, character).press(Button::Jump);
    run_frames(&mut app, 1);
    assert_eq!(state(&app, character), Some(StateKind::SingleJumpStart));
    assert!(!input(&mut app, character).pressed(Button::Jump));
    assert!(input(&mut app, character).holding(Button::Jump));

    run_frames(&mut app, 10);
    assert!(translation(&app, character).y > 2.0);
}

#[test]
fn running_moves_the_transform() {
    let mut app = create_test_app();
    let character = settled_character(&mut app);

    input(&mut app, character).set_horizontal(1.0);
    run_frames(&mut app, 60);

    assert_eq!(state(&app, character), Some(StateKind::Running));
    assert!(translation(&app, character).x > 1.0);
    let body = app.world().get::<KinematicBody>(character).unwrap();
    assert!(body.velocity.x > 5.0);
}

#[test]
fn wall_stops_a_running_character() {
    let mut app = create_test_app();
    spawn_box(&mut app, Vec2::new(4.0, 5.0), Vec2::new(2.0, 10.0));
    let character = settled_character(&mut app);

    input(&mut app, character).set_horizontal(1.0);
    run_frames(&mut app, 180);

    let position = translation(&app, character);
    assert!((position.x - 2.5).abs() < 1e-3, "stopped at {position:?}");
}

// ==================== Signal Tests ====================

#[test]
fn inbox_signals_reach_the_active_state() {
    let mut app = create_test_app();
    let character = settled_character(&mut app);

    app.world_mut()
        .get_mut::<SignalInbox>(character)
        .unwrap()
        .send(Signal::ItemAvailable(Carriable::new(9, true)));
    run_frames(&mut app, 1);

    assert_eq!(state(&app, character), Some(StateKind::CarryPickUp));
    assert!(app.world().get::<SignalInbox>(character).unwrap().is_empty());

    run_frames(&mut app, 30);
    assert_eq!(state(&app, character), Some(StateKind::CarryIdle));
}

#[test]
fn flower_suspends_gravity() {
    let mut app = create_test_app();
    let character = spawn_character(&mut app, Vec2::new(0.0, 20.0));
    run_frames(&mut app, 2);

    let anchor = Vec2::new(0.0, 25.0);
    app.world_mut()
        .get_mut::<SignalInbox>(character)
        .unwrap()
        .send(Signal::FlingFlower(FlingFlower::aimable(1, anchor)));
    run_frames(&mut app, 30);

    assert_eq!(state(&app, character), Some(StateKind::FlingFlowerAim));
    assert!((translation(&app, character) - anchor).length() < 1e-4);
}

// ==================== Animation Tests ====================

#[test]
fn clip_timeline_follows_the_character() {
    let mut app = create_test_app();
    let character = settled_character(&mut app);

    let playing = app
        .world()
        .get::<ClipTimeline>(character)
        .unwrap()
        .playing()
        .unwrap();
    assert_eq!(playing.clip, AnimationClip::Idle);
    assert_eq!(playing.state, StateKind::Idle);
}

#[test]
fn paused_character_keeps_its_state() {
    let mut app = create_test_app();
    let character = settled_character(&mut app);

    app.world_mut()
        .get_mut::<Character>(character)
        .unwrap()
        .pause();
    input(&mut app, character).press(Button::Jump);
    run_frames(&mut app, 5);

    assert_eq!(state(&app, character), Some(StateKind::Idle));
    assert!(translation(&app, character).y < 1.01);
}
