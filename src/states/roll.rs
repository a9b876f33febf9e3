//! Landing roll.

use super::ground::{leave_ground, on_ground_signal, wants_to_run};
use super::{StateBehavior, StateContext, StateKind};
use crate::animation::AnimationClip;
use crate::motion::HorizontalMotion;
use crate::signal::Signal;

/// Roll keeps the landing momentum until its clip completes.
#[derive(Debug, Clone, Copy, Default)]
pub struct RollStart;

impl StateBehavior for RollStart {
    fn on_enter(&mut self, cx: &mut StateContext) {
        cx.player.touch_down();
        cx.play(AnimationClip::RollStart);
    }

    fn update(&mut self, cx: &mut StateContext) {
        if cx.input().pressed_jump() {
            cx.change_to(StateKind::SingleJumpStart);
        }
    }

    fn fixed_update(&mut self, cx: &mut StateContext) {
        leave_ground(cx);
    }

    fn on_animation_finished(&mut self, clip: AnimationClip, cx: &mut StateContext) {
        if clip == AnimationClip::RollStart {
            cx.change_to(StateKind::RollEnd);
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RollEnd {
    motion: HorizontalMotion,
}

impl StateBehavior for RollEnd {
    fn on_enter(&mut self, cx: &mut StateContext) {
        cx.play(AnimationClip::RollEnd);
    }

    fn update(&mut self, cx: &mut StateContext) {
        if cx.input().pressed_jump() {
            cx.change_to(StateKind::SingleJumpStart);
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

    fn on_animation_finished(&mut self, clip: AnimationClip, cx: &mut StateContext) {
        if clip != AnimationClip::RollEnd {
            return;
        }
        if wants_to_run(cx) {
            cx.change_to(StateKind::Running);
        } else {
            cx.change_to(StateKind::Idle);
        }
    }
}
