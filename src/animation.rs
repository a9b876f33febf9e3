//! Animation cues and clip completion.
//!
//! States ask for a clip through the player facade; the request is recorded
//! as an [`AnimationCue`] tagged with the requesting state. Whatever plays
//! the clip reports completion back through
//! [`StateMachine::animation_finished`](crate::machine::StateMachine::animation_finished),
//! which drops reports for states that have already been exited.
//!
//! [`ClipTimeline`] is a stand-in animator that completes one-shot clips after
//! a fixed length. Games with a real animation player can skip it.

use bevy::prelude::*;
use std::collections::HashMap;

use crate::states::StateKind;

/// Clips the movement states can request.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationClip {
    Idle,
    Run,
    CrouchStart,
    Crouch,
    CrouchEnd,
    Crawl,
    CrawlIdle,
    Dive,
    JumpStart,
    JumpRise,
    JumpFall,
    DoubleJumpStart,
    DoubleJumpRise,
    DoubleJumpFall,
    WallJump,
    WallRun,
    WallSlide,
    WallSlideFast,
    RollStart,
    RollEnd,
    Land,
    PickUp,
    CarryIdle,
    CarryRun,
    CarryAir,
    Throw,
    FlingAim,
    FlingCapture,
}

impl AnimationClip {
    /// One-shot clips complete; looping clips never do.
    pub fn is_one_shot(self) -> bool {
        matches!(
            self,
            AnimationClip::CrouchStart
                | AnimationClip::CrouchEnd
                | AnimationClip::Dive
                | AnimationClip::JumpStart
                | AnimationClip::DoubleJumpStart
                | AnimationClip::WallJump
                | AnimationClip::RollStart
                | AnimationClip::RollEnd
                | AnimationClip::Land
                | AnimationClip::PickUp
                | AnimationClip::Throw
                | AnimationClip::FlingCapture
        )
    }

    /// Length in seconds used when no override is configured.
    pub fn default_length(self) -> f32 {
        match self {
            AnimationClip::JumpStart | AnimationClip::DoubleJumpStart => 0.05,
            AnimationClip::CrouchStart | AnimationClip::CrouchEnd => 0.1,
            AnimationClip::Land | AnimationClip::WallJump => 0.12,
            AnimationClip::RollStart | AnimationClip::RollEnd => 0.2,
            AnimationClip::Dive | AnimationClip::PickUp | AnimationClip::Throw => 0.25,
            AnimationClip::FlingCapture => 0.3,
            _ => 1.0,
        }
    }
}

/// Latest clip request of a character.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct AnimationCue {
    /// State that requested the clip.
    pub state: StateKind,
    pub clip: AnimationClip,
    /// Increments on every request, so replaying the same clip is visible.
    pub serial: u32,
}

/// Fixed-length clip player.
///
/// Follows the character's cue and reports when a one-shot clip has run for
/// its length.
#[derive(Component, Reflect, Debug, Clone, Default)]
#[reflect(Component)]
pub struct ClipTimeline {
    lengths: HashMap<AnimationClip, f32>,
    playing: Option<AnimationCue>,
    elapsed: f32,
    finished: bool,
}

impl ClipTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the length of `clip`.
    pub fn with_length(mut self, clip: AnimationClip, seconds: f32) -> Self {
        self.lengths.insert(clip, seconds.max(0.0));
        self
    }

    pub fn length(&self, clip: AnimationClip) -> f32 {
        self.lengths
            .get(&clip)
            .copied()
            .unwrap_or_else(|| clip.default_length())
    }

    pub fn playing(&self) -> Option<AnimationCue> {
        self.playing
    }

    /// Advance the playing clip, switching to `cue` first if it is new.
    ///
    /// Returns the cue once, on the tick a one-shot clip completes.
    pub fn advance(&mut self, cue: Option<AnimationCue>, dt: f32) -> Option<AnimationCue> {
        if cue.map(|c| c.serial) != self.playing.map(|c| c.serial) {
            self.playing = cue;
            self.elapsed = 0.0;
            self.finished = false;
        }

        let playing = self.playing?;
        if self.finished || !playing.clip.is_one_shot() {
            return None;
        }

        self.elapsed += dt;
        if self.elapsed >= self.length(playing.clip) {
            self.finished = true;
            return Some(playing);
        }
        None
    }
}
