//! # `platformer_movement`
//!
//! A state-machine movement core for a 2D platformer character, with physics
//! backend abstraction.
//!
//! This crate provides:
//! - A finite state machine with lifecycle hooks (added, enter, exit, update,
//!   fixed update, signal, animation finished) and per-state statistics
//! - A collision sensor that probes ground, ceiling and walls with box casts
//! - Ground and wall coyote timers
//! - Horizontal acceleration with turning agility and wall-jump input muting
//! - Lock-reason sets gating jump, move and crouch input
//! - Some 28 movement states: running, crouching, crawling, diving, jumping,
//!   double jumping, wall running and sliding, rolling, carrying items and
//!   riding fling flowers
//!
//! ## Architecture
//!
//! States never touch the physics engine. A [`MovementPhysicsBackend`] copies
//! position and velocity into the [`Character`] before each pass and back out
//! afterwards, and answers box-cast queries for the sensor. Two backends ship
//! with the crate: a kinematic axis-separated mover over static boxes, and
//! Avian2D behind the `avian2d` feature.
//!
//! ## System Order
//!
//! Systems run in the phases of [`MovementSet`]:
//!
//! 1. **Update** - Deliver signals and run the variable-rate hook (`PreUpdate`)
//! 2. **Sensors** - Refresh the backend's collision view (`FixedUpdate`)
//! 3. **States** - Tick timers, sense contacts, run the fixed-rate hook
//! 4. **Integration** - Apply gravity and move bodies
//! 5. **Animation** - Advance clip timelines and report finished clips (`Update`)
//!
//! ## Usage
//!
//! ```rust
//! use bevy::prelude::*;
//! use platformer_movement::prelude::*;
//!
//! let character = Character::default().with_position(Vec2::new(0.0, 2.0));
//! let input = InputState::default();
//! assert_eq!(character.state(), None);
//! # let _ = input;
//! ```

use bevy::prelude::*;

pub mod animation;
pub mod backend;
pub mod character;
pub mod config;
pub mod coyote;
pub mod detection;
pub mod error;
pub mod facing;
pub mod input;
pub mod locks;
pub mod machine;
pub mod motion;
pub mod player;
pub mod sensor;
pub mod signal;
pub mod states;

// Systems are internal - they're added automatically by the plugin
pub(crate) mod systems;

/// System sets for the movement phases.
///
/// `Update` runs in `PreUpdate`, `Animation` in `Update`, and the remaining
/// sets are chained in `FixedUpdate`.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MovementSet {
    /// Signal delivery and the variable-rate state hook.
    Update,
    /// Refresh collision data the states query.
    Sensors,
    /// Timers, contact sensing and the fixed-rate state hook.
    States,
    /// Gravity and body movement.
    Integration,
    /// Clip timelines and animation completion.
    Animation,
}

/// Written whenever a character's state machine switches state.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChanged {
    pub entity: Entity,
    pub from: states::StateKind,
    pub to: states::StateKind,
}

pub mod prelude {
    //! Convenient re-exports for common usage.
    //!
    //! ```rust,no_run
    //! use bevy::prelude::*;
    //! use platformer_movement::prelude::*;
    //!
    //! fn spawn_character(mut commands: Commands) {
    //!     commands.spawn((
    //!         Transform::from_xyz(0.0, 2.0, 0.0),
    //!         Character::default(),
    //!         InputState::default(),
    //!         SignalInbox::default(),
    //!         ClipTimeline::default(),
    //!         KinematicBody::default(),
    //!     ));
    //! }
    //! ```

    pub use crate::animation::{AnimationClip, AnimationCue, ClipTimeline};
    pub use crate::backend::{
        KinematicBackend, KinematicBody, MovementPhysicsBackend, StaticCollider,
    };
    pub use crate::character::Character;
    pub use crate::config::{MovementSettings, SensorConfig, SettingsFile};
    pub use crate::error::MovementError;
    pub use crate::facing::Facing;
    pub use crate::input::{Button, InputState};
    pub use crate::locks::{Capability, LockReason};
    pub use crate::machine::{StateMachine, Transition};
    pub use crate::signal::{Carriable, FlingFlower, Signal, SignalInbox};
    pub use crate::states::StateKind;
    pub use crate::{MovementSet, PlatformerMovementPlugin, StateChanged};

    #[cfg(feature = "avian2d")]
    pub use crate::backend::Avian2dBackend;
}

/// Main plugin for the movement core.
///
/// Generic over a physics backend `B` that moves kinematic data in and out
/// of each [`Character`](character::Character) and answers collision
/// queries.
///
/// ```rust,no_run
/// use bevy::prelude::*;
/// use platformer_movement::prelude::*;
///
/// App::new()
///     .add_plugins(MinimalPlugins)
///     .add_plugins(PlatformerMovementPlugin::<KinematicBackend>::default())
///     .run();
/// ```
pub struct PlatformerMovementPlugin<B: backend::MovementPhysicsBackend> {
    _marker: std::marker::PhantomData<B>,
}

impl<B: backend::MovementPhysicsBackend> Default for PlatformerMovementPlugin<B> {
    fn default() -> Self {
        Self {
            _marker: std::marker::PhantomData,
        }
    }
}

impl<B: backend::MovementPhysicsBackend> PlatformerMovementPlugin<B> {
    /// Create a new movement plugin.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<B: backend::MovementPhysicsBackend> Plugin for PlatformerMovementPlugin<B> {
    fn build(&self, app: &mut App) {
        // Register core types
        app.register_type::<input::InputState>();
        app.register_type::<animation::ClipTimeline>();
        app.register_type::<states::StateKind>();
        app.register_type::<config::MovementSettings>();
        app.register_type::<config::SensorConfig>();
        app.register_type::<player::Player>();

        app.add_message::<StateChanged>();

        // Add the physics backend plugin
        app.add_plugins(B::plugin());

        // Phase order: Sensors -> States -> Integration
        app.configure_sets(
            FixedUpdate,
            (
                MovementSet::Sensors,
                MovementSet::States,
                MovementSet::Integration,
            )
                .chain(),
        );

        // FixedUpdate runs before Update, so the variable-rate pass goes in
        // PreUpdate. Edges are consumed once it has seen them.
        app.add_systems(
            PreUpdate,
            (systems::update_pass::<B>, systems::consume_input_edges)
                .chain()
                .in_set(MovementSet::Update),
        );

        app.add_systems(
            FixedUpdate,
            systems::fixed_pass::<B>.in_set(MovementSet::States),
        );

        app.add_systems(
            Update,
            systems::advance_clip_timelines::<B>.in_set(MovementSet::Animation),
        );
    }
}
