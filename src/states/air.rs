//! Jump take-off, rise and fall.
//!
//! The single and double jump share their state types; [`JumpTier`] picks the
//! force, clips and follow-up states.

use super::fling::try_enter_flower;
use super::jump::{jump_from_air, try_double_jump};
use super::{StateBehavior, StateContext, StateKind};
use crate::animation::AnimationClip;
use crate::motion::HorizontalMotion;
use crate::signal::Signal;

/// Which jump a state belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpTier {
    Single,
    Double,
}

impl JumpTier {
    fn rise(self) -> StateKind {
        match self {
            JumpTier::Single => StateKind::SingleJumpRise,
            JumpTier::Double => StateKind::DoubleJumpRise,
        }
    }

    fn fall(self) -> StateKind {
        match self {
            JumpTier::Single => StateKind::SingleJumpFall,
            JumpTier::Double => StateKind::DoubleJumpFall,
        }
    }

    fn clips(self) -> [AnimationClip; 3] {
        match self {
            JumpTier::Single => [
                AnimationClip::JumpStart,
                AnimationClip::JumpRise,
                AnimationClip::JumpFall,
            ],
            JumpTier::Double => [
                AnimationClip::DoubleJumpStart,
                AnimationClip::DoubleJumpRise,
                AnimationClip::DoubleJumpFall,
            ],
        }
    }
}

/// Per-tick airborne bookkeeping: air time, steering, terminal speed and
/// wall memory for wall coyote time.
pub(super) fn air_step(motion: &HorizontalMotion, cx: &mut StateContext) {
    cx.player.add_air_time(cx.dt());
    motion.apply(cx);
    cx.player.clamp_fall_speed();

    let side = cx.contacts().touching_wall_side();
    if side != 0.0 {
        cx.player.remember_wall_side(side);
        cx.player.start_wall_coyote();
    }
}

/// Rise or fall after a launch, by the sign of the vertical velocity.
pub(super) fn after_launch(tier: JumpTier, cx: &mut StateContext) {
    if cx.player.vy() > 0.0 {
        cx.change_to(tier.rise());
    } else {
        cx.change_to(tier.fall());
    }
}

/// Touch down from a fall. A moving landing after a long fall rolls.
pub(super) fn land(cx: &mut StateContext) {
    let settings = &cx.player.settings;
    let rolling = cx.player.vx().abs() > settings.idle_threshold
        && cx.player.air_time() > settings.roll_on_land;
    log::debug!(
        "landing after {:.3}s at vx={:.3}, rolling={rolling}",
        cx.player.air_time(),
        cx.player.vx()
    );
    cx.change_to(if rolling {
        StateKind::RollStart
    } else {
        StateKind::Land
    });
}

/// Jump press while airborne: ground coyote, then wall, then buffer.
fn press_in_air(motion: &mut HorizontalMotion, cx: &mut StateContext) {
    if cx.input().pressed_jump() && !jump_from_air(cx) {
        motion.buffer_jump();
    }
}

fn buffered_air_jump(tier: JumpTier, cx: &mut StateContext) -> bool {
    match tier {
        JumpTier::Single => try_double_jump(cx),
        JumpTier::Double => false,
    }
}

/// Take-off. Leaves for the rise or fall once its clip completes.
#[derive(Debug, Clone, Copy)]
pub struct JumpStart {
    tier: JumpTier,
    motion: HorizontalMotion,
}

impl JumpStart {
    pub fn new(tier: JumpTier) -> Self {
        Self {
            tier,
            motion: HorizontalMotion::default(),
        }
    }
}

impl StateBehavior for JumpStart {
    fn on_enter(&mut self, cx: &mut StateContext) {
        let settings = cx.player.settings;
        match self.tier {
            JumpTier::Single => {
                cx.player.set_vy(settings.single_jump_force);
                cx.player.use_ground_coyote();
            }
            JumpTier::Double => {
                cx.player.set_vy(settings.double_jump_force);
                cx.player.spend_double_jump();
                cx.player.allow_wall_jump_interruption();
            }
        }
        cx.play(self.tier.clips()[0]);
    }

    fn fixed_update(&mut self, cx: &mut StateContext) {
        air_step(&self.motion, cx);
    }

    fn on_signal(&mut self, signal: &Signal, cx: &mut StateContext) {
        try_enter_flower(signal, cx);
    }

    fn on_animation_finished(&mut self, clip: AnimationClip, cx: &mut StateContext) {
        if clip == self.tier.clips()[0] {
            after_launch(self.tier, cx);
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Rise {
    tier: JumpTier,
    motion: HorizontalMotion,
}

impl Rise {
    pub fn new(tier: JumpTier) -> Self {
        Self {
            tier,
            motion: HorizontalMotion::default(),
        }
    }
}

impl StateBehavior for Rise {
    fn on_enter(&mut self, cx: &mut StateContext) {
        self.motion.clear();
        cx.play(self.tier.clips()[1]);
    }

    fn update(&mut self, cx: &mut StateContext) {
        press_in_air(&mut self.motion, cx);
    }

    fn fixed_update(&mut self, cx: &mut StateContext) {
        if self.motion.take_buffered_jump() && self.try_buffered_jump(cx) {
            return;
        }
        air_step(&self.motion, cx);

        if cx.contacts().is_touching_ceiling() && cx.player.vy() > 0.0 {
            cx.player.set_vy(0.0);
        }
        if cx.player.vy() <= 0.0 {
            cx.change_to(self.tier.fall());
        }
    }

    fn on_signal(&mut self, signal: &Signal, cx: &mut StateContext) {
        try_enter_flower(signal, cx);
    }

    fn try_buffered_jump(&mut self, cx: &mut StateContext) -> bool {
        buffered_air_jump(self.tier, cx)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Fall {
    tier: JumpTier,
    motion: HorizontalMotion,
}

impl Fall {
    pub fn new(tier: JumpTier) -> Self {
        Self {
            tier,
            motion: HorizontalMotion::default(),
        }
    }
}

impl StateBehavior for Fall {
    fn on_enter(&mut self, cx: &mut StateContext) {
        self.motion.clear();
        cx.player.allow_wall_jump_interruption();
        cx.play(self.tier.clips()[2]);
    }

    fn update(&mut self, cx: &mut StateContext) {
        press_in_air(&mut self.motion, cx);
    }

    fn fixed_update(&mut self, cx: &mut StateContext) {
        if self.motion.take_buffered_jump() && self.try_buffered_jump(cx) {
            return;
        }
        air_step(&self.motion, cx);

        if cx.contacts().is_touching_ground() && cx.player.vy() <= 0.0 {
            land(cx);
            return;
        }

        let side = cx.contacts().touching_wall_side();
        let pushing = cx.input().horizontal() * side > 0.0;
        if side != 0.0 && pushing && cx.player.vy() <= 0.0 {
            cx.change_to(StateKind::WallSlide);
        }
    }

    fn on_signal(&mut self, signal: &Signal, cx: &mut StateContext) {
        try_enter_flower(signal, cx);
    }

    fn try_buffered_jump(&mut self, cx: &mut StateContext) -> bool {
        buffered_air_jump(self.tier, cx)
    }
}
