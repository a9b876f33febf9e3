//! The character as seen by its states.
//!
//! [`Player`] bundles everything a state may read or change: kinematics,
//! facing, coyote timers, capability locks, contact information and the
//! bookkeeping shared between states (air time, wall side, double jump,
//! carried item, animation cue).

use bevy::prelude::*;

use crate::animation::{AnimationClip, AnimationCue};
use crate::config::{MovementSettings, SensorConfig};
use crate::coyote::{CoyoteKind, CoyoteTimer};
use crate::detection::{Aabb, ContactReport};
use crate::facing::Facing;
use crate::locks::{Capabilities, LockReason};
use crate::sensor::CollisionSensor;
use crate::signal::{Carriable, FlingFlower};
use crate::states::StateKind;

/// Lock held on crouching while an item is carried.
pub const CARRY_LOCK: LockReason = LockReason::new("carry");

/// Mutable character data shared by all states.
#[derive(Reflect, Debug, Clone)]
pub struct Player {
    /// Tuning values. Read fresh every tick.
    pub settings: MovementSettings,
    pub sensor: CollisionSensor,
    /// Center of the standing body.
    position: Vec2,
    velocity: Vec2,
    facing: Facing,
    capabilities: Capabilities,
    ground_coyote: CoyoteTimer,
    wall_coyote: CoyoteTimer,
    contacts: ContactReport,
    crouched: bool,
    air_time: f32,
    /// Side of the last wall touched: -1 left, 1 right, 0 never.
    wall_side: f32,
    wall_jumping: bool,
    double_jump_available: bool,
    carrying: Option<Carriable>,
    thrown: Option<Carriable>,
    fling_flower: Option<FlingFlower>,
    /// Held in place; backends skip gravity.
    suspended: bool,
    animation: Option<AnimationCue>,
    cue_serial: u32,
}

impl Default for Player {
    fn default() -> Self {
        Self::new(MovementSettings::default(), SensorConfig::default())
    }
}

impl Player {
    pub fn new(settings: MovementSettings, sensor: SensorConfig) -> Self {
        Self {
            settings,
            sensor: CollisionSensor::new(sensor),
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            facing: Facing::Right,
            capabilities: Capabilities::default(),
            ground_coyote: CoyoteTimer::new(CoyoteKind::Ground),
            wall_coyote: CoyoteTimer::new(CoyoteKind::Wall),
            contacts: ContactReport::empty(sensor.contact_epsilon),
            crouched: false,
            air_time: 0.0,
            wall_side: 0.0,
            wall_jumping: false,
            double_jump_available: true,
            carrying: None,
            thrown: None,
            fling_flower: None,
            suspended: false,
            animation: None,
            cue_serial: 0,
        }
    }

    // ---------------------------------------------------------------------
    // Kinematics
    // ---------------------------------------------------------------------

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    pub fn vx(&self) -> f32 {
        self.velocity.x
    }

    pub fn vy(&self) -> f32 {
        self.velocity.y
    }

    pub fn set_vx(&mut self, vx: f32) {
        self.velocity.x = vx;
    }

    pub fn set_vy(&mut self, vy: f32) {
        self.velocity.y = vy;
    }

    /// Limit the downward speed to `max_fall_speed`.
    pub fn clamp_fall_speed(&mut self) {
        self.velocity.y = self.velocity.y.max(-self.settings.max_fall_speed);
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    /// Set the facing. `Facing::None` leaves the current facing unchanged.
    pub fn set_facing(&mut self, facing: Facing) {
        if !facing.is_none() {
            self.facing = facing;
        }
    }

    // ---------------------------------------------------------------------
    // Body shape
    // ---------------------------------------------------------------------

    pub fn is_crouched(&self) -> bool {
        self.crouched
    }

    pub(crate) fn set_crouched(&mut self, crouched: bool) {
        self.crouched = crouched;
    }

    /// The standing body box.
    pub fn standing_bounds(&self) -> Aabb {
        Aabb::from_size(self.position, self.settings.body_size)
    }

    /// The current body box. A crouched body keeps its feet in place.
    pub fn bounds(&self) -> Aabb {
        if self.crouched {
            let feet = self.standing_bounds().bottom_center();
            Aabb::from_bottom(feet, self.settings.crouch_size())
        } else {
            self.standing_bounds()
        }
    }

    /// Extra height needed to stand up from the current shape.
    pub fn stand_up_height(&self) -> f32 {
        (self.settings.body_size.y - self.bounds().size().y).max(0.0)
    }

    // ---------------------------------------------------------------------
    // Contacts
    // ---------------------------------------------------------------------

    /// Contacts sensed at the start of the current tick.
    pub fn contacts(&self) -> &ContactReport {
        &self.contacts
    }

    pub(crate) fn set_contacts(&mut self, contacts: ContactReport) {
        self.contacts = contacts;
    }

    // ---------------------------------------------------------------------
    // Capabilities
    // ---------------------------------------------------------------------

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn capabilities_mut(&mut self) -> &mut Capabilities {
        &mut self.capabilities
    }

    pub fn can_jump(&self) -> bool {
        self.capabilities.can_jump()
    }

    pub fn can_move(&self) -> bool {
        self.capabilities.can_move()
    }

    pub fn can_crouch(&self) -> bool {
        self.capabilities.can_crouch()
    }

    pub fn disable_jump(&mut self, reason: LockReason) {
        self.capabilities.disable_jump(reason);
    }

    pub fn enable_jump(&mut self, reason: LockReason) {
        self.capabilities.enable_jump(reason);
    }

    pub fn disable_move(&mut self, reason: LockReason) {
        self.capabilities.disable_move(reason);
    }

    pub fn enable_move(&mut self, reason: LockReason) {
        self.capabilities.enable_move(reason);
    }

    pub fn disable_crouch(&mut self, reason: LockReason) {
        self.capabilities.disable_crouch(reason);
    }

    pub fn enable_crouch(&mut self, reason: LockReason) {
        self.capabilities.enable_crouch(reason);
    }

    // ---------------------------------------------------------------------
    // Coyote time
    // ---------------------------------------------------------------------

    pub(crate) fn tick_timers(&mut self, dt: f32) {
        self.ground_coyote.tick(dt);
        self.wall_coyote.tick(dt);
    }

    pub fn start_ground_coyote(&mut self) {
        self.ground_coyote.start();
    }

    pub fn start_wall_coyote(&mut self) {
        self.wall_coyote.start();
    }

    pub fn in_ground_coyote_time(&self) -> bool {
        self.ground_coyote.in_coyote_time(&self.settings)
    }

    pub fn in_wall_coyote_time(&self) -> bool {
        self.wall_coyote.in_coyote_time(&self.settings)
    }

    pub fn use_ground_coyote(&mut self) {
        self.ground_coyote.consume(&self.settings);
    }

    pub fn use_wall_coyote(&mut self) {
        self.wall_coyote.consume(&self.settings);
    }

    pub fn ground_coyote(&self) -> &CoyoteTimer {
        &self.ground_coyote
    }

    pub fn wall_coyote(&self) -> &CoyoteTimer {
        &self.wall_coyote
    }

    // ---------------------------------------------------------------------
    // Shared state bookkeeping
    // ---------------------------------------------------------------------

    /// Seconds spent airborne since the last landing.
    pub fn air_time(&self) -> f32 {
        self.air_time
    }

    pub fn add_air_time(&mut self, dt: f32) {
        self.air_time += dt;
    }

    /// Reset everything a landing restores.
    pub fn touch_down(&mut self) {
        self.air_time = 0.0;
        self.double_jump_available = true;
        self.wall_jumping = false;
    }

    pub fn wall_side(&self) -> f32 {
        self.wall_side
    }

    pub fn remember_wall_side(&mut self, side: f32) {
        if side != 0.0 {
            self.wall_side = side.signum();
        }
    }

    /// Whether horizontal input is muted after a wall jump.
    pub fn is_wall_jumping(&self) -> bool {
        self.wall_jumping
    }

    pub fn start_wall_jump_muting(&mut self) {
        self.wall_jumping = true;
    }

    /// End the post-wall-jump input muting early.
    pub fn allow_wall_jump_interruption(&mut self) {
        self.wall_jumping = false;
    }

    pub fn has_double_jump(&self) -> bool {
        self.double_jump_available
    }

    pub fn spend_double_jump(&mut self) {
        self.double_jump_available = false;
    }

    pub fn refill_double_jump(&mut self) {
        self.double_jump_available = true;
    }

    // ---------------------------------------------------------------------
    // Items and flowers
    // ---------------------------------------------------------------------

    pub fn carrying(&self) -> Option<Carriable> {
        self.carrying
    }

    /// Take hold of `item`. Crouching is locked while carrying.
    pub fn pick_up(&mut self, item: Carriable) {
        self.carrying = Some(item);
        self.capabilities.disable_crouch(CARRY_LOCK);
    }

    /// Let go of the carried item and record it as thrown.
    pub fn throw_item(&mut self) -> Option<Carriable> {
        let item = self.carrying.take();
        self.thrown = item;
        self.capabilities.enable_crouch(CARRY_LOCK);
        item
    }

    /// The last thrown item, cleared on read.
    pub fn take_thrown(&mut self) -> Option<Carriable> {
        self.thrown.take()
    }

    pub fn fling_flower(&self) -> Option<FlingFlower> {
        self.fling_flower
    }

    pub fn enter_fling_flower(&mut self, flower: FlingFlower) {
        self.fling_flower = Some(flower);
    }

    pub fn leave_fling_flower(&mut self) -> Option<FlingFlower> {
        self.fling_flower.take()
    }

    /// Whether gravity is switched off for the character.
    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    pub fn set_suspended(&mut self, suspended: bool) {
        self.suspended = suspended;
    }

    // ---------------------------------------------------------------------
    // Animation
    // ---------------------------------------------------------------------

    /// Request `clip` on behalf of `state`.
    pub fn play(&mut self, state: StateKind, clip: AnimationClip) {
        self.cue_serial = self.cue_serial.wrapping_add(1);
        self.animation = Some(AnimationCue {
            state,
            clip,
            serial: self.cue_serial,
        });
    }

    /// The latest clip request.
    pub fn animation(&self) -> Option<AnimationCue> {
        self.animation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_facing_none_keeps_previous() {
        let mut player = Player::default();
        player.set_facing(Facing::Left);
        player.set_facing(Facing::None);
        assert_eq!(player.facing(), Facing::Left);
    }

    #[test]
    fn last_set_facing_wins() {
        let mut player = Player::default();
        player.set_facing(Facing::Right);
        player.set_facing(Facing::Left);
        assert_eq!(player.facing(), Facing::Left);
    }

    #[test]
    fn crouched_bounds_keep_feet() {
        let mut player = Player::default();
        player.set_position(Vec2::new(0.0, 1.0));
        let standing = player.bounds();
        player.set_crouched(true);
        let crouched = player.bounds();

        assert_eq!(standing.bottom_center(), crouched.bottom_center());
        assert_eq!(crouched.size(), player.settings.crouch_size());
        assert_eq!(player.stand_up_height(), 1.0);
    }

    #[test]
    fn touch_down_restores_air_resources() {
        let mut player = Player::default();
        player.add_air_time(0.7);
        player.spend_double_jump();
        player.start_wall_jump_muting();

        player.touch_down();
        assert_eq!(player.air_time(), 0.0);
        assert!(player.has_double_jump());
        assert!(!player.is_wall_jumping());
    }

    #[test]
    fn carry_locks_crouch_until_thrown() {
        let mut player = Player::default();
        player.pick_up(Carriable::new(4, true));
        assert!(!player.can_crouch());

        assert_eq!(player.throw_item(), Some(Carriable::new(4, true)));
        assert!(player.can_crouch());
        assert_eq!(player.take_thrown(), Some(Carriable::new(4, true)));
        assert_eq!(player.take_thrown(), None);
    }

    #[test]
    fn carry_lock_does_not_release_other_reasons() {
        let mut player = Player::default();
        player.disable_crouch(LockReason::new("ledge"));
        player.pick_up(Carriable::new(1, true));
        player.throw_item();
        assert!(!player.can_crouch());
    }

    #[test]
    fn play_bumps_serial() {
        let mut player = Player::default();
        player.play(StateKind::Land, AnimationClip::Land);
        let first = player.animation().unwrap();
        player.play(StateKind::Land, AnimationClip::Land);
        let second = player.animation().unwrap();
        assert_ne!(first.serial, second.serial);
        assert_eq!(second.state, StateKind::Land);
    }

    #[test]
    fn wall_side_ignores_zero() {
        let mut player = Player::default();
        player.remember_wall_side(1.0);
        player.remember_wall_side(0.0);
        assert_eq!(player.wall_side(), 1.0);
    }

    #[test]
    fn fall_speed_is_clamped() {
        let mut player = Player::default();
        player.set_vy(-100.0);
        player.clamp_fall_speed();
        assert_eq!(player.vy(), -player.settings.max_fall_speed);
    }
}
