//! Movement states.
//!
//! Every state is a small struct implementing [`StateBehavior`]. The closed
//! set of states is listed once in the `player_states!` invocation below,
//! which generates the [`StateKind`] tag enum and the [`PlayerState`] sum
//! type the machine stores.

mod air;
mod carry;
mod crawl;
mod crouch;
mod fling;
mod ground;
pub mod jump;
mod roll;
mod wall;

use bevy::prelude::*;

use crate::animation::AnimationClip;
use crate::detection::{ContactReport, FitResult};
use crate::error::{MovementError, protocol_violation};
use crate::input::{GatedInput, InputState};
use crate::player::Player;
use crate::sensor::CollisionQuery;
use crate::signal::Signal;

pub use air::{Fall, JumpStart, JumpTier, Rise};
pub use carry::{CarryAirborne, CarryIdle, CarryPickUp, CarryRunning, CarryThrow};
pub use crawl::{Crawling, CrawlingStopped, Dive};
pub use crouch::{CrouchEnd, CrouchStart, Crouching};
pub use fling::{FlingFlowerAim, FlingFlowerDirected};
pub use ground::{Idle, Land, Running};
pub use roll::{RollEnd, RollStart};
pub use wall::{WallJump, WallRun, WallSlide};

/// Lifecycle hooks of a state.
///
/// All hooks default to doing nothing. Only `update`, `fixed_update`,
/// `on_signal` and `on_animation_finished` may request a transition.
pub trait StateBehavior {
    /// First time the machine creates this state.
    fn on_added(&mut self, _cx: &mut StateContext) {}

    fn on_enter(&mut self, _cx: &mut StateContext) {}

    fn on_exit(&mut self, _cx: &mut StateContext) {}

    /// Variable-rate pass. Input edges are read here.
    fn update(&mut self, _cx: &mut StateContext) {}

    /// Fixed-rate pass. Physics and contacts are handled here.
    fn fixed_update(&mut self, _cx: &mut StateContext) {}

    fn on_signal(&mut self, _signal: &Signal, _cx: &mut StateContext) {}

    fn on_animation_finished(&mut self, _clip: AnimationClip, _cx: &mut StateContext) {}

    /// Resolve a jump press buffered by the horizontal motion. Returns
    /// `true` if the state acted on it.
    fn try_buffered_jump(&mut self, _cx: &mut StateContext) -> bool {
        false
    }
}

macro_rules! player_states {
    ($($kind:ident($ty:ty) = $init:expr),* $(,)?) => {
        /// Tag of every movement state.
        #[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum StateKind {
            $($kind),*
        }

        impl StateKind {
            pub const ALL: &'static [StateKind] = &[$(StateKind::$kind),*];
        }

        /// A movement state together with its per-state data.
        #[derive(Debug, Clone)]
        pub enum PlayerState {
            $($kind($ty)),*
        }

        impl PlayerState {
            /// A fresh instance of `kind`.
            pub fn new(kind: StateKind) -> Self {
                match kind {
                    $(StateKind::$kind => PlayerState::$kind($init)),*
                }
            }

            pub fn kind(&self) -> StateKind {
                match self {
                    $(PlayerState::$kind(_) => StateKind::$kind),*
                }
            }

            pub(crate) fn behavior(&mut self) -> &mut dyn StateBehavior {
                match self {
                    $(PlayerState::$kind(state) => state),*
                }
            }
        }
    };
}

player_states! {
    Idle(Idle) = Idle::default(),
    Running(Running) = Running::default(),
    Land(Land) = Land::default(),
    CrouchStart(CrouchStart) = CrouchStart::default(),
    Crouching(Crouching) = Crouching::default(),
    CrouchEnd(CrouchEnd) = CrouchEnd::default(),
    Crawling(Crawling) = Crawling::default(),
    CrawlingStopped(CrawlingStopped) = CrawlingStopped::default(),
    Dive(Dive) = Dive::default(),
    SingleJumpStart(JumpStart) = JumpStart::new(JumpTier::Single),
    SingleJumpRise(Rise) = Rise::new(JumpTier::Single),
    SingleJumpFall(Fall) = Fall::new(JumpTier::Single),
    DoubleJumpStart(JumpStart) = JumpStart::new(JumpTier::Double),
    DoubleJumpRise(Rise) = Rise::new(JumpTier::Double),
    DoubleJumpFall(Fall) = Fall::new(JumpTier::Double),
    WallJump(WallJump) = WallJump::default(),
    WallRun(WallRun) = WallRun::default(),
    WallSlide(WallSlide) = WallSlide::new(false),
    WallSlideFast(WallSlide) = WallSlide::new(true),
    RollStart(RollStart) = RollStart::default(),
    RollEnd(RollEnd) = RollEnd::default(),
    CarryPickUp(CarryPickUp) = CarryPickUp::default(),
    CarryIdle(CarryIdle) = CarryIdle::default(),
    CarryRunning(CarryRunning) = CarryRunning::default(),
    CarryAirborne(CarryAirborne) = CarryAirborne::default(),
    CarryThrow(CarryThrow) = CarryThrow::default(),
    FlingFlowerAim(FlingFlowerAim) = FlingFlowerAim::default(),
    FlingFlowerDirected(FlingFlowerDirected) = FlingFlowerDirected::default(),
}

impl StateKind {
    /// States that use the crouched body box.
    pub fn is_low_profile(self) -> bool {
        matches!(
            self,
            StateKind::CrouchStart
                | StateKind::Crouching
                | StateKind::Crawling
                | StateKind::CrawlingStopped
                | StateKind::Dive
        )
    }

    /// States in which the character is supported by the ground.
    pub fn is_grounded(self) -> bool {
        matches!(
            self,
            StateKind::Idle
                | StateKind::Running
                | StateKind::Land
                | StateKind::CrouchStart
                | StateKind::Crouching
                | StateKind::CrouchEnd
                | StateKind::Crawling
                | StateKind::CrawlingStopped
                | StateKind::RollStart
                | StateKind::RollEnd
                | StateKind::CarryPickUp
                | StateKind::CarryIdle
                | StateKind::CarryRunning
        )
    }

    pub fn is_carrying(self) -> bool {
        matches!(
            self,
            StateKind::CarryPickUp
                | StateKind::CarryIdle
                | StateKind::CarryRunning
                | StateKind::CarryAirborne
                | StateKind::CarryThrow
        )
    }
}

/// Which hook is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPhase {
    Added,
    Enter,
    Exit,
    Update,
    FixedUpdate,
    Signal,
    AnimationFinished,
}

impl HookPhase {
    /// Whether a hook in this phase may request a transition.
    pub fn may_transition(self) -> bool {
        !matches!(self, HookPhase::Added | HookPhase::Enter | HookPhase::Exit)
    }
}

/// What a state hook can see and touch.
pub struct StateContext<'a> {
    pub player: &'a mut Player,
    input: &'a InputState,
    query: &'a dyn CollisionQuery,
    dt: f32,
    state: StateKind,
    phase: HookPhase,
    pending: Option<StateKind>,
}

impl<'a> StateContext<'a> {
    pub(crate) fn new(
        player: &'a mut Player,
        input: &'a InputState,
        query: &'a dyn CollisionQuery,
        dt: f32,
        state: StateKind,
        phase: HookPhase,
    ) -> Self {
        Self {
            player,
            input,
            query,
            dt,
            state,
            phase,
            pending: None,
        }
    }

    /// The state whose hook is running.
    pub fn state(&self) -> StateKind {
        self.state
    }

    pub fn phase(&self) -> HookPhase {
        self.phase
    }

    /// Seconds covered by this pass.
    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Input filtered through the capability locks.
    pub fn input(&self) -> GatedInput<'_> {
        GatedInput::new(self.input, self.player.capabilities())
    }

    pub fn contacts(&self) -> &ContactReport {
        self.player.contacts()
    }

    pub fn query(&self) -> &dyn CollisionQuery {
        self.query
    }

    /// Ask the machine to move to `target` once this hook returns.
    ///
    /// Only one request per hook is allowed, and none from the
    /// added/enter/exit hooks.
    pub fn change_to(&mut self, target: StateKind) {
        if !self.phase.may_transition() || self.pending.is_some() {
            protocol_violation(&MovementError::TransitionInProgress { requested: target });
            return;
        }
        self.pending = Some(target);
    }

    pub fn pending(&self) -> Option<StateKind> {
        self.pending
    }

    pub(crate) fn take_pending(&mut self) -> Option<StateKind> {
        self.pending.take()
    }

    /// Request `clip` for the running state.
    pub fn play(&mut self, clip: AnimationClip) {
        self.player.play(self.state, clip);
    }

    /// Whether the standing body fits where the character is.
    pub fn fits_up(&self) -> FitResult {
        let height = self.player.stand_up_height();
        if height <= 0.0 {
            return FitResult::from_blockers(Vec::new());
        }
        let bounds = self.player.bounds();
        let size = Vec2::new(bounds.size().x, height);
        self.player.sensor.fits_up(self.query, bounds, size)
    }

    pub fn can_stand(&self) -> bool {
        self.fits_up().fits
    }

    /// Re-sense contacts after the state moved the body.
    pub fn resense(&mut self) {
        let report = self.player.sensor.sense(self.query, self.player.bounds());
        self.player.set_contacts(report);
    }
}
