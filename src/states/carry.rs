//! Carrying an item.
//!
//! Picking up locks crouching until the item is thrown.

use super::air::air_step;
use super::{StateBehavior, StateContext, StateKind};
use crate::animation::AnimationClip;
use crate::input::Button;
use crate::motion::HorizontalMotion;
use crate::signal::Signal;

/// Pick up an offered item if the signal allows it.
pub(super) fn try_pick_up(signal: &Signal, cx: &mut StateContext) -> bool {
    let Some(item) = signal.can_carry() else {
        return false;
    };
    if cx.player.carrying().is_some() || !cx.player.can_move() {
        return false;
    }
    log::debug!("picking up item {}", item.id);
    cx.player.pick_up(item);
    cx.change_to(StateKind::CarryPickUp);
    true
}

/// Walk off a ledge while carrying.
fn leave_ground_carrying(cx: &mut StateContext) -> bool {
    if cx.contacts().is_touching_ground() || cx.player.vy() > 0.0 {
        return false;
    }
    cx.player.start_ground_coyote();
    cx.change_to(StateKind::CarryAirborne);
    true
}

fn carry_jump(cx: &mut StateContext) {
    cx.player.use_ground_coyote();
    cx.player.set_vy(cx.player.settings.single_jump_force);
    cx.change_to(StateKind::CarryAirborne);
}

/// Shared input handling of the grounded carry states.
///
/// Returns `true` if a transition was requested.
fn carry_ground_input(cx: &mut StateContext) -> bool {
    let input = cx.input();
    let (throw, jump) = (input.pressed(Button::Action), input.pressed_jump());
    if throw {
        cx.change_to(StateKind::CarryThrow);
        true
    } else if jump {
        carry_jump(cx);
        true
    } else {
        false
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CarryPickUp {
    motion: HorizontalMotion,
}

impl StateBehavior for CarryPickUp {
    fn on_added(&mut self, _cx: &mut StateContext) {
        log::debug!("carry states created");
    }

    fn on_enter(&mut self, cx: &mut StateContext) {
        cx.play(AnimationClip::PickUp);
    }

    fn fixed_update(&mut self, cx: &mut StateContext) {
        if leave_ground_carrying(cx) {
            return;
        }
        self.motion.decelerate(cx);
    }

    fn on_animation_finished(&mut self, clip: AnimationClip, cx: &mut StateContext) {
        if clip == AnimationClip::PickUp {
            cx.change_to(StateKind::CarryIdle);
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CarryIdle {
    motion: HorizontalMotion,
}

impl StateBehavior for CarryIdle {
    fn on_enter(&mut self, cx: &mut StateContext) {
        cx.player.touch_down();
        cx.play(AnimationClip::CarryIdle);
    }

    fn update(&mut self, cx: &mut StateContext) {
        if carry_ground_input(cx) {
            return;
        }
        if cx.input().has_horizontal() {
            cx.change_to(StateKind::CarryRunning);
        }
    }

    fn fixed_update(&mut self, cx: &mut StateContext) {
        if leave_ground_carrying(cx) {
            return;
        }
        self.motion.decelerate(cx);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CarryRunning {
    motion: HorizontalMotion,
}

impl StateBehavior for CarryRunning {
    fn on_enter(&mut self, cx: &mut StateContext) {
        cx.player.touch_down();
        cx.play(AnimationClip::CarryRun);
    }

    fn update(&mut self, cx: &mut StateContext) {
        carry_ground_input(cx);
    }

    fn fixed_update(&mut self, cx: &mut StateContext) {
        if leave_ground_carrying(cx) {
            return;
        }
        self.motion.apply(cx);
        let stopped = !cx.input().has_horizontal()
            && cx.player.vx().abs() < cx.player.settings.idle_threshold;
        if stopped {
            cx.change_to(StateKind::CarryIdle);
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CarryAirborne {
    motion: HorizontalMotion,
}

impl StateBehavior for CarryAirborne {
    fn on_enter(&mut self, cx: &mut StateContext) {
        cx.play(AnimationClip::CarryAir);
    }

    fn update(&mut self, cx: &mut StateContext) {
        let input = cx.input();
        let (throw, jump) = (input.pressed(Button::Action), input.pressed_jump());
        if throw {
            cx.change_to(StateKind::CarryThrow);
        } else if jump && cx.player.in_ground_coyote_time() {
            cx.player.use_ground_coyote();
            cx.player.set_vy(cx.player.settings.single_jump_force);
        }
    }

    fn fixed_update(&mut self, cx: &mut StateContext) {
        air_step(&self.motion, cx);
        if cx.contacts().is_touching_ground() && cx.player.vy() <= 0.0 {
            if cx.input().has_horizontal() {
                cx.change_to(StateKind::CarryRunning);
            } else {
                cx.change_to(StateKind::CarryIdle);
            }
        }
    }
}

/// Release the item. The thrown item is left on the player for the item
/// system to collect.
#[derive(Debug, Clone, Copy, Default)]
pub struct CarryThrow {
    motion: HorizontalMotion,
}

impl StateBehavior for CarryThrow {
    fn on_enter(&mut self, cx: &mut StateContext) {
        if let Some(item) = cx.player.throw_item() {
            log::debug!("threw item {}", item.id);
        }
        cx.play(AnimationClip::Throw);
    }

    fn fixed_update(&mut self, cx: &mut StateContext) {
        if cx.contacts().is_touching_ground() {
            self.motion.decelerate(cx);
        } else {
            air_step(&self.motion, cx);
        }
    }

    fn on_animation_finished(&mut self, clip: AnimationClip, cx: &mut StateContext) {
        if clip != AnimationClip::Throw {
            return;
        }
        if cx.contacts().is_touching_ground() {
            cx.change_to(StateKind::Idle);
        } else {
            cx.change_to(StateKind::SingleJumpFall);
        }
    }
}
