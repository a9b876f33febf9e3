//! The character component.

use bevy::prelude::*;

use crate::animation::AnimationClip;
use crate::config::{MovementSettings, SensorConfig};
use crate::error::MovementError;
use crate::input::InputState;
use crate::machine::{Frame, StateMachine, Transition};
use crate::player::Player;
use crate::sensor::CollisionQuery;
use crate::signal::Signal;
use crate::states::StateKind;

/// A platformer character: the player data plus its state machine.
///
/// The machine starts in the initial state on the first pass it receives.
/// Each fixed pass advances the coyote timers, senses contacts from the
/// current body box, then runs the active state.
#[derive(Component, Debug, Clone)]
pub struct Character {
    player: Player,
    machine: StateMachine,
    initial: StateKind,
}

impl Default for Character {
    fn default() -> Self {
        Self::new(MovementSettings::default(), SensorConfig::default())
    }
}

impl Character {
    pub fn new(settings: MovementSettings, sensor: SensorConfig) -> Self {
        Self {
            player: Player::new(settings, sensor),
            machine: StateMachine::new(),
            initial: StateKind::Idle,
        }
    }

    /// Start in `initial` instead of [`StateKind::Idle`].
    pub fn with_initial_state(mut self, initial: StateKind) -> Self {
        self.initial = initial;
        self
    }

    pub fn with_position(mut self, position: Vec2) -> Self {
        self.player.set_position(position);
        self
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn machine(&self) -> &StateMachine {
        &self.machine
    }

    pub fn state(&self) -> Option<StateKind> {
        self.machine.current()
    }

    pub fn is_in_state(&self, kind: StateKind) -> bool {
        self.machine.is_in_state(kind)
    }

    pub fn pause(&mut self) {
        self.machine.pause();
    }

    pub fn resume(&mut self) {
        self.machine.resume();
    }

    pub fn is_paused(&self) -> bool {
        self.machine.is_paused()
    }

    fn sense(&mut self, query: &dyn CollisionQuery) {
        let report = self.player.sensor.sense(query, self.player.bounds());
        self.player.set_contacts(report);
    }

    /// Enter the initial state if not done yet.
    pub fn start(
        &mut self,
        input: &InputState,
        query: &dyn CollisionQuery,
    ) -> Result<(), MovementError> {
        if self.machine.is_started() {
            return Ok(());
        }
        self.sense(query);
        let frame = Frame::new(&mut self.player, input, query, 0.0);
        self.machine.start(self.initial, frame)
    }

    /// Variable-rate pass.
    pub fn update(
        &mut self,
        input: &InputState,
        query: &dyn CollisionQuery,
        dt: f32,
    ) -> Result<Option<Transition>, MovementError> {
        self.start(input, query)?;
        self.sense(query);
        self.machine
            .update(Frame::new(&mut self.player, input, query, dt))
    }

    /// Fixed-rate pass.
    pub fn fixed_update(
        &mut self,
        input: &InputState,
        query: &dyn CollisionQuery,
        dt: f32,
    ) -> Result<Option<Transition>, MovementError> {
        self.start(input, query)?;
        self.player.tick_timers(dt);
        self.sense(query);
        self.machine
            .fixed_update(Frame::new(&mut self.player, input, query, dt))
    }

    pub fn signal(
        &mut self,
        signal: &Signal,
        input: &InputState,
        query: &dyn CollisionQuery,
    ) -> Result<Option<Transition>, MovementError> {
        self.start(input, query)?;
        self.machine
            .signal(signal, Frame::new(&mut self.player, input, query, 0.0))
    }

    pub fn animation_finished(
        &mut self,
        state: StateKind,
        clip: AnimationClip,
        input: &InputState,
        query: &dyn CollisionQuery,
    ) -> Result<Option<Transition>, MovementError> {
        self.machine.animation_finished(
            state,
            clip,
            Frame::new(&mut self.player, input, query, 0.0),
        )
    }

    /// Force a state change from outside, on behalf of the active state.
    pub fn request_transition(
        &mut self,
        requester: StateKind,
        target: StateKind,
        input: &InputState,
        query: &dyn CollisionQuery,
    ) -> Result<Transition, MovementError> {
        self.machine.request_transition(
            requester,
            target,
            Frame::new(&mut self.player, input, query, 0.0),
        )
    }
}
