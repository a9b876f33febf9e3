//! Crouching down and standing back up.
//!
//! Standing up is only allowed when the standing body fits under whatever
//! is above the crouched one.

use super::ground::{leave_ground, wants_to_run};
use super::{StateBehavior, StateContext, StateKind};
use crate::animation::AnimationClip;
use crate::motion::HorizontalMotion;

#[derive(Debug, Clone, Copy, Default)]
pub struct CrouchStart {
    motion: HorizontalMotion,
}

impl StateBehavior for CrouchStart {
    fn on_enter(&mut self, cx: &mut StateContext) {
        cx.player.touch_down();
        cx.play(AnimationClip::CrouchStart);
    }

    fn update(&mut self, cx: &mut StateContext) {
        let input = cx.input();
        let (jump, down) = (input.pressed_jump(), input.holding_down());
        if jump && cx.can_stand() {
            cx.change_to(StateKind::SingleJumpStart);
        } else if !down && cx.can_stand() {
            cx.change_to(StateKind::CrouchEnd);
        }
    }

    fn fixed_update(&mut self, cx: &mut StateContext) {
        if leave_ground(cx) {
            return;
        }
        self.motion.decelerate(cx);
    }

    fn on_animation_finished(&mut self, clip: AnimationClip, cx: &mut StateContext) {
        if clip == AnimationClip::CrouchStart {
            cx.change_to(StateKind::Crouching);
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Crouching {
    motion: HorizontalMotion,
}

impl StateBehavior for Crouching {
    fn on_enter(&mut self, cx: &mut StateContext) {
        cx.play(AnimationClip::Crouch);
    }

    fn update(&mut self, cx: &mut StateContext) {
        let input = cx.input();
        let (jump, down, moving) = (
            input.pressed_jump(),
            input.holding_down(),
            input.has_horizontal(),
        );
        if jump && cx.can_stand() {
            cx.change_to(StateKind::SingleJumpStart);
        } else if moving {
            cx.change_to(StateKind::Crawling);
        } else if !down && cx.can_stand() {
            cx.change_to(StateKind::CrouchEnd);
        }
    }

    fn fixed_update(&mut self, cx: &mut StateContext) {
        if leave_ground(cx) {
            return;
        }
        self.motion.decelerate(cx);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CrouchEnd {
    motion: HorizontalMotion,
}

impl StateBehavior for CrouchEnd {
    fn on_enter(&mut self, cx: &mut StateContext) {
        cx.play(AnimationClip::CrouchEnd);
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
        self.motion.decelerate(cx);
    }

    fn on_animation_finished(&mut self, clip: AnimationClip, cx: &mut StateContext) {
        if clip != AnimationClip::CrouchEnd {
            return;
        }
        if wants_to_run(cx) {
            cx.change_to(StateKind::Running);
        } else {
            cx.change_to(StateKind::Idle);
        }
    }
}
