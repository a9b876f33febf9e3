//! Error types for the movement core.

use thiserror::Error;

use crate::states::StateKind;

/// Errors produced by the movement core.
#[derive(Debug, Error)]
pub enum MovementError {
    /// The settings file could not be parsed.
    #[error("failed to parse movement settings: {0}")]
    SettingsParse(#[from] toml::de::Error),

    /// A setting is outside its allowed range.
    #[error("invalid setting `{name}` = {value}: {reason}")]
    InvalidSetting {
        name: &'static str,
        value: f32,
        reason: &'static str,
    },

    /// A state that is not the active one tried to change state.
    #[error("{requester:?} requested a transition while {active:?} is active")]
    NotActiveState {
        requester: StateKind,
        active: StateKind,
    },

    /// A transition was requested while another one was already in flight.
    #[error("transition to {requested:?} requested while a transition is in progress")]
    TransitionInProgress { requested: StateKind },

    /// The machine was driven before `start` was called.
    #[error("state machine has not been started")]
    NotStarted,

    /// `start` was called a second time.
    #[error("state machine was already started")]
    AlreadyStarted,
}

/// Handle a breach of the transition protocol.
///
/// Debug builds treat this as a programmer error and panic. Release builds
/// log the error and carry on with the request ignored.
pub(crate) fn protocol_violation(error: &MovementError) {
    if cfg!(debug_assertions) {
        panic!("movement protocol violation: {error}");
    } else {
        log::warn!("ignoring movement protocol violation: {error}");
    }
}
