//! The state machine driving a character's movement states.
//!
//! States are created lazily the first time they are entered and then
//! reused. Only the active state receives update, fixed-update, signal and
//! animation deliveries. A transition runs the old state's exit hook and the
//! new state's enter hook back to back, before anything else can observe
//! the machine.

use std::collections::HashMap;

use crate::animation::AnimationClip;
use crate::error::{MovementError, protocol_violation};
use crate::input::InputState;
use crate::player::Player;
use crate::sensor::CollisionQuery;
use crate::signal::Signal;
use crate::states::{HookPhase, PlayerState, StateBehavior, StateContext, StateKind};

/// Lifecycle counters of one state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateStats {
    pub added: u32,
    pub entered: u32,
    pub exited: u32,
}

/// A completed state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: StateKind,
    pub to: StateKind,
}

#[derive(Debug, Clone)]
struct StateSlot {
    state: PlayerState,
    added: bool,
    exited: bool,
    stats: StateStats,
}

impl StateSlot {
    fn new(kind: StateKind) -> Self {
        Self {
            state: PlayerState::new(kind),
            added: false,
            exited: false,
            stats: StateStats::default(),
        }
    }
}

/// Everything a hook needs besides its own state.
pub struct Frame<'a> {
    pub player: &'a mut Player,
    pub input: &'a InputState,
    pub query: &'a dyn CollisionQuery,
    pub dt: f32,
}

impl<'a> Frame<'a> {
    pub fn new(
        player: &'a mut Player,
        input: &'a InputState,
        query: &'a dyn CollisionQuery,
        dt: f32,
    ) -> Self {
        Self {
            player,
            input,
            query,
            dt,
        }
    }
}

/// Owns the states and the active-state pointer.
#[derive(Debug, Clone, Default)]
pub struct StateMachine {
    slots: HashMap<StateKind, StateSlot>,
    current: Option<StateKind>,
    paused: bool,
    transitioning: bool,
    last_transition: Option<Transition>,
}

impl StateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The active state, once started.
    pub fn current(&self) -> Option<StateKind> {
        self.current
    }

    pub fn is_started(&self) -> bool {
        self.current.is_some()
    }

    pub fn is_in_state(&self, kind: StateKind) -> bool {
        self.current == Some(kind)
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Stop delivering update and fixed-update passes.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn last_transition(&self) -> Option<Transition> {
        self.last_transition
    }

    /// Lifecycle counters of `kind`, if it was ever created.
    pub fn stats(&self, kind: StateKind) -> Option<StateStats> {
        self.slots.get(&kind).map(|slot| slot.stats)
    }

    /// Whether `kind` has been created.
    pub fn has_state(&self, kind: StateKind) -> bool {
        self.slots.contains_key(&kind)
    }

    /// Enter `initial`. Must be called exactly once.
    pub fn start(&mut self, initial: StateKind, frame: Frame) -> Result<(), MovementError> {
        if self.current.is_some() {
            let error = MovementError::AlreadyStarted;
            protocol_violation(&error);
            return Err(error);
        }
        let Frame {
            player,
            input,
            query,
            dt,
        } = frame;

        self.ensure_added(initial, player, input, query, dt);
        self.current = Some(initial);
        player.set_crouched(initial.is_low_profile());
        self.enter(initial, player, input, query, dt);
        log::debug!("movement started in {initial:?}");
        Ok(())
    }

    /// Variable-rate pass of the active state.
    pub fn update(&mut self, frame: Frame) -> Result<Option<Transition>, MovementError> {
        if self.paused {
            return Ok(None);
        }
        self.deliver(HookPhase::Update, frame, |state, cx| state.update(cx))
    }

    /// Fixed-rate pass of the active state.
    pub fn fixed_update(&mut self, frame: Frame) -> Result<Option<Transition>, MovementError> {
        if self.paused {
            return Ok(None);
        }
        self.deliver(HookPhase::FixedUpdate, frame, |state, cx| {
            state.fixed_update(cx)
        })
    }

    /// Deliver `signal` to the active state only.
    pub fn signal(
        &mut self,
        signal: &Signal,
        frame: Frame,
    ) -> Result<Option<Transition>, MovementError> {
        self.deliver(HookPhase::Signal, frame, |state, cx| {
            state.on_signal(signal, cx)
        })
    }

    /// Report that `clip`, requested by `state`, has completed.
    ///
    /// Reports for a state that has been exited since are dropped.
    pub fn animation_finished(
        &mut self,
        state: StateKind,
        clip: AnimationClip,
        frame: Frame,
    ) -> Result<Option<Transition>, MovementError> {
        let stale = self
            .slots
            .get(&state)
            .is_none_or(|slot| slot.exited || self.current != Some(state));
        if stale {
            log::debug!("dropping {clip:?} completion for inactive {state:?}");
            return Ok(None);
        }
        self.deliver(HookPhase::AnimationFinished, frame, |s, cx| {
            s.on_animation_finished(clip, cx)
        })
    }

    /// Change state on behalf of `requester`, which must be active.
    pub fn request_transition(
        &mut self,
        requester: StateKind,
        target: StateKind,
        frame: Frame,
    ) -> Result<Transition, MovementError> {
        let active = self.current.ok_or(MovementError::NotStarted)?;
        if requester != active {
            let error = MovementError::NotActiveState { requester, active };
            protocol_violation(&error);
            return Err(error);
        }
        if self.transitioning {
            let error = MovementError::TransitionInProgress { requested: target };
            protocol_violation(&error);
            return Err(error);
        }
        let Frame {
            player,
            input,
            query,
            dt,
        } = frame;
        Ok(self.transition(active, target, player, input, query, dt))
    }

    fn deliver<F>(
        &mut self,
        phase: HookPhase,
        frame: Frame,
        hook: F,
    ) -> Result<Option<Transition>, MovementError>
    where
        F: FnOnce(&mut dyn StateBehavior, &mut StateContext),
    {
        let active = self.current.ok_or(MovementError::NotStarted)?;
        let Frame {
            player,
            input,
            query,
            dt,
        } = frame;

        let pending = self.run_hook(active, phase, player, input, query, dt, hook);
        Ok(pending.map(|target| self.transition(active, target, player, input, query, dt)))
    }

    #[allow(clippy::too_many_arguments)]
    fn run_hook<F>(
        &mut self,
        kind: StateKind,
        phase: HookPhase,
        player: &mut Player,
        input: &InputState,
        query: &dyn CollisionQuery,
        dt: f32,
        hook: F,
    ) -> Option<StateKind>
    where
        F: FnOnce(&mut dyn StateBehavior, &mut StateContext),
    {
        let slot = self
            .slots
            .entry(kind)
            .or_insert_with(|| StateSlot::new(kind));
        let mut cx = StateContext::new(player, input, query, dt, kind, phase);
        hook(slot.state.behavior(), &mut cx);
        cx.take_pending()
    }

    fn ensure_added(
        &mut self,
        kind: StateKind,
        player: &mut Player,
        input: &InputState,
        query: &dyn CollisionQuery,
        dt: f32,
    ) {
        let slot = self
            .slots
            .entry(kind)
            .or_insert_with(|| StateSlot::new(kind));
        if slot.added {
            return;
        }
        slot.added = true;
        slot.stats.added += 1;
        log::debug!("created state {kind:?}");
        self.run_hook(kind, HookPhase::Added, player, input, query, dt, |s, cx| {
            s.on_added(cx)
        });
    }

    fn enter(
        &mut self,
        kind: StateKind,
        player: &mut Player,
        input: &InputState,
        query: &dyn CollisionQuery,
        dt: f32,
    ) {
        if let Some(slot) = self.slots.get_mut(&kind) {
            slot.exited = false;
            slot.stats.entered += 1;
        }
        self.run_hook(kind, HookPhase::Enter, player, input, query, dt, |s, cx| {
            s.on_enter(cx)
        });
    }

    fn transition(
        &mut self,
        from: StateKind,
        to: StateKind,
        player: &mut Player,
        input: &InputState,
        query: &dyn CollisionQuery,
        dt: f32,
    ) -> Transition {
        self.transitioning = true;
        self.ensure_added(to, player, input, query, dt);

        self.run_hook(from, HookPhase::Exit, player, input, query, dt, |s, cx| {
            s.on_exit(cx)
        });
        if let Some(slot) = self.slots.get_mut(&from) {
            slot.exited = true;
            slot.stats.exited += 1;
        }

        self.current = Some(to);
        player.set_crouched(to.is_low_profile());
        self.enter(to, player, input, query, dt);
        self.transitioning = false;

        log::debug!("{from:?} -> {to:?}");
        let transition = Transition { from, to };
        self.last_transition = Some(transition);
        transition
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::{ColliderId, ContactReport, SurfaceHit};
    use crate::input::Button;
    use crate::sensor::NoColliders;
    use bevy::prelude::*;

    const DT: f32 = 1.0 / 60.0;

    fn grounded_player() -> Player {
        let mut player = Player::default();
        let mut report = ContactReport::empty(0.02);
        report.ground = Some(SurfaceHit::new(0.0, Vec2::Y, Vec2::ZERO, ColliderId(1)));
        player.set_contacts(report);
        player
    }

    fn started(player: &mut Player, initial: StateKind) -> StateMachine {
        let mut machine = StateMachine::new();
        let input = InputState::new();
        machine
            .start(initial, Frame::new(player, &input, &NoColliders, DT))
            .unwrap();
        machine
    }

    // ==================== Lifecycle Tests ====================

    #[test]
    fn start_adds_and_enters_initial_state() {
        let mut player = grounded_player();
        let machine = started(&mut player, StateKind::Idle);

        assert!(machine.is_in_state(StateKind::Idle));
        let stats = machine.stats(StateKind::Idle).unwrap();
        assert_eq!(stats, StateStats { added: 1, entered: 1, exited: 0 });
        assert!(!machine.has_state(StateKind::Running));
    }

    #[test]
    fn drive_before_start_is_an_error() {
        let mut machine = StateMachine::new();
        let mut player = Player::default();
        let input = InputState::new();
        let result = machine.update(Frame::new(&mut player, &input, &NoColliders, DT));
        assert!(matches!(result, Err(MovementError::NotStarted)));
    }

    #[test]
    fn states_are_created_once_and_reused() {
        let mut player = grounded_player();
        let mut machine = started(&mut player, StateKind::Idle);
        let input = InputState::new();

        for _ in 0..3 {
            machine
                .request_transition(
                    StateKind::Idle,
                    StateKind::Running,
                    Frame::new(&mut player, &input, &NoColliders, DT),
                )
                .unwrap();
            machine
                .request_transition(
                    StateKind::Running,
                    StateKind::Idle,
                    Frame::new(&mut player, &input, &NoColliders, DT),
                )
                .unwrap();
        }

        let idle = machine.stats(StateKind::Idle).unwrap();
        let running = machine.stats(StateKind::Running).unwrap();
        assert_eq!(idle, StateStats { added: 1, entered: 4, exited: 3 });
        assert_eq!(running, StateStats { added: 1, entered: 3, exited: 3 });
    }

    #[test]
    fn transition_reports_from_and_to() {
        let mut player = grounded_player();
        let mut machine = started(&mut player, StateKind::Idle);
        let mut input = InputState::new();
        input.press(Button::Jump);

        let transition = machine
            .update(Frame::new(&mut player, &input, &NoColliders, DT))
            .unwrap();
        assert_eq!(
            transition,
            Some(Transition {
                from: StateKind::Idle,
                to: StateKind::SingleJumpStart,
            })
        );
        assert_eq!(machine.last_transition(), transition);
    }

    #[test]
    fn crouching_states_shrink_the_body() {
        let mut player = grounded_player();
        let mut machine = started(&mut player, StateKind::Idle);
        let mut input = InputState::new();
        input.press(Button::Down);

        machine
            .update(Frame::new(&mut player, &input, &NoColliders, DT))
            .unwrap();
        assert!(machine.is_in_state(StateKind::CrouchStart));
        assert!(player.is_crouched());
    }

    // ==================== Protocol Tests ====================

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "protocol violation")]
    fn inactive_requester_panics_in_debug() {
        let mut player = grounded_player();
        let mut machine = started(&mut player, StateKind::Idle);
        let input = InputState::new();
        let _ = machine.request_transition(
            StateKind::Running,
            StateKind::Land,
            Frame::new(&mut player, &input, &NoColliders, DT),
        );
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "protocol violation")]
    fn second_start_panics_in_debug() {
        let mut player = grounded_player();
        let mut machine = started(&mut player, StateKind::Idle);
        let input = InputState::new();
        let _ = machine.start(
            StateKind::Idle,
            Frame::new(&mut player, &input, &NoColliders, DT),
        );
    }

    // ==================== Delivery Tests ====================

    #[test]
    fn paused_machine_skips_passes() {
        let mut player = grounded_player();
        let mut machine = started(&mut player, StateKind::Idle);
        let mut input = InputState::new();
        input.press(Button::Jump);

        machine.pause();
        let result = machine
            .update(Frame::new(&mut player, &input, &NoColliders, DT))
            .unwrap();
        assert_eq!(result, None);
        assert!(machine.is_in_state(StateKind::Idle));

        machine.resume();
        machine
            .update(Frame::new(&mut player, &input, &NoColliders, DT))
            .unwrap();
        assert!(machine.is_in_state(StateKind::SingleJumpStart));
    }

    #[test]
    fn stale_animation_completion_is_dropped() {
        let mut player = grounded_player();
        let mut machine = started(&mut player, StateKind::Land);
        let input = InputState::new();

        machine
            .request_transition(
                StateKind::Land,
                StateKind::Idle,
                Frame::new(&mut player, &input, &NoColliders, DT),
            )
            .unwrap();

        let result = machine
            .animation_finished(
                StateKind::Land,
                AnimationClip::Land,
                Frame::new(&mut player, &input, &NoColliders, DT),
            )
            .unwrap();
        assert_eq!(result, None);
        assert!(machine.is_in_state(StateKind::Idle));
    }

    #[test]
    fn animation_completion_reaches_active_state() {
        let mut player = grounded_player();
        let mut machine = started(&mut player, StateKind::Land);
        let input = InputState::new();

        machine
            .animation_finished(
                StateKind::Land,
                AnimationClip::Land,
                Frame::new(&mut player, &input, &NoColliders, DT),
            )
            .unwrap();
        assert!(machine.is_in_state(StateKind::Idle));
    }

    #[test]
    fn signal_reaches_only_active_state() {
        let mut player = grounded_player();
        let mut machine = started(&mut player, StateKind::Idle);
        let input = InputState::new();

        let transition = machine
            .signal(
                &Signal::ItemAvailable(crate::signal::Carriable::new(9, true)),
                Frame::new(&mut player, &input, &NoColliders, DT),
            )
            .unwrap();
        assert_eq!(transition.map(|t| t.to), Some(StateKind::CarryPickUp));
        assert_eq!(player.carrying().map(|c| c.id), Some(9));
    }
}
