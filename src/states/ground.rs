//! Standing, running and landing.

use super::carry::try_pick_up;
use super::fling::try_enter_flower;
use super::{StateBehavior, StateContext, StateKind};
use crate::animation::AnimationClip;
use crate::motion::HorizontalMotion;
use crate::signal::Signal;

/// Walk off a ledge: open the ground coyote window and start falling.
///
/// Returns `true` if a transition was requested.
pub(super) fn leave_ground(cx: &mut StateContext) -> bool {
    if cx.contacts().is_touching_ground() || cx.player.vy() > 0.0 {
        return false;
    }
    cx.player.start_ground_coyote();
    cx.change_to(StateKind::SingleJumpFall);
    true
}

/// Signals accepted by standing states.
pub(super) fn on_ground_signal(signal: &Signal, cx: &mut StateContext) {
    let _ = try_pick_up(signal, cx) || try_enter_flower(signal, cx);
}

/// Whether the character should be running rather than standing.
pub(super) fn wants_to_run(cx: &StateContext) -> bool {
    cx.input().has_horizontal() || cx.player.vx().abs() >= cx.player.settings.idle_threshold
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Idle {
    motion: HorizontalMotion,
}

impl StateBehavior for Idle {
    fn on_enter(&mut self, cx: &mut StateContext) {
        cx.player.touch_down();
        cx.play(AnimationClip::Idle);
    }

    fn update(&mut self, cx: &mut StateContext) {
        let input = cx.input();
        let (jump, down, moving) = (
            input.pressed_jump(),
            input.holding_down(),
            input.has_horizontal(),
        );

        if jump {
            if cx.contacts().is_touching_wall() {
                cx.change_to(StateKind::WallRun);
            } else {
                cx.change_to(StateKind::SingleJumpStart);
            }
        } else if down {
            cx.change_to(StateKind::CrouchStart);
        } else if moving {
            cx.change_to(StateKind::Running);
        }
    }

    fn fixed_update(&mut self, cx: &mut StateContext) {
        if leave_ground(cx) {
            return;
        }
        self.motion.decelerate(cx);
    }

    fn on_signal(&mut self, signal: &Signal, cx: &mut StateContext) {
        on_ground_signal(signal, cx);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Running {
    motion: HorizontalMotion,
}

impl StateBehavior for Running {
    fn on_enter(&mut self, cx: &mut StateContext) {
        cx.player.touch_down();
        cx.play(AnimationClip::Run);
    }

    fn update(&mut self, cx: &mut StateContext) {
        let input = cx.input();
        if input.pressed_jump() {
            cx.change_to(StateKind::SingleJumpStart);
        } else if input.holding_down() {
            cx.change_to(StateKind::Dive);
        }
    }

    fn fixed_update(&mut self, cx: &mut StateContext) {
        if leave_ground(cx) {
            return;
        }
        self.motion.apply(cx);
        if !wants_to_run(cx) {
            cx.change_to(StateKind::Idle);
        }
    }

    fn on_signal(&mut self, signal: &Signal, cx: &mut StateContext) {
        on_ground_signal(signal, cx);
    }
}

/// Short recovery after a fall.
#[derive(Debug, Clone, Copy, Default)]
pub struct Land {
    motion: HorizontalMotion,
}

impl StateBehavior for Land {
    fn on_enter(&mut self, cx: &mut StateContext) {
        cx.player.touch_down();
        cx.play(AnimationClip::Land);
    }

    fn update(&mut self, cx: &mut StateContext) {
        let input = cx.input();
        if input.pressed_jump() {
            cx.change_to(StateKind::SingleJumpStart);
        } else if input.holding_down() {
            cx.change_to(StateKind::CrouchStart);
        }
    }

    fn fixed_update(&mut self, cx: &mut StateContext) {
        if leave_ground(cx) {
            return;
        }
        self.motion.apply(cx);
    }

    fn on_signal(&mut self, signal: &Signal, cx: &mut StateContext) {
        on_ground_signal(signal, cx);
    }

    fn on_animation_finished(&mut self, clip: AnimationClip, cx: &mut StateContext) {
        if clip != AnimationClip::Land {
            return;
        }
        if wants_to_run(cx) {
            cx.change_to(StateKind::Running);
        } else {
            cx.change_to(StateKind::Idle);
        }
    }
}
