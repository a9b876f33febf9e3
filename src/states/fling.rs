//! Fling flowers.
//!
//! A captured player is held at the flower's anchor until launched: by a
//! jump press along the aimed direction, or along the flower's own direction
//! once the capture clip completes.

use bevy::prelude::*;

use super::{StateBehavior, StateContext, StateKind};
use crate::animation::AnimationClip;
use crate::facing::Facing;
use crate::input::AXIS_DEADZONE;
use crate::signal::Signal;

/// Enter a fling flower if the signal offers one.
pub(super) fn try_enter_flower(signal: &Signal, cx: &mut StateContext) -> bool {
    if let Some(flower) = signal.is_aimable_fling_flower() {
        cx.player.enter_fling_flower(flower);
        cx.change_to(StateKind::FlingFlowerAim);
        true
    } else if let Some(flower) = signal.is_directional_fling_flower() {
        cx.player.enter_fling_flower(flower);
        cx.change_to(StateKind::FlingFlowerDirected);
        true
    } else {
        false
    }
}

fn capture(cx: &mut StateContext) {
    cx.player.touch_down();
    cx.player.set_suspended(true);
    hold(cx);
}

/// Keep the player at the anchor.
fn hold(cx: &mut StateContext) {
    cx.player.set_velocity(Vec2::ZERO);
    if let Some(flower) = cx.player.fling_flower() {
        cx.player.set_position(flower.anchor);
    }
}

fn launch(direction: Vec2, cx: &mut StateContext) {
    let direction = direction.normalize_or(Vec2::Y);
    let flower = cx.player.leave_fling_flower();
    log::debug!(
        "flung from {:?} along {direction:?}",
        flower.map(|f| f.id)
    );
    cx.player
        .set_velocity(direction * cx.player.settings.fling_speed);
    cx.player.set_facing(Facing::from_sign(direction.x));
    cx.change_to(StateKind::SingleJumpRise);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FlingFlowerAim {
    aim: Vec2,
}

impl StateBehavior for FlingFlowerAim {
    fn on_enter(&mut self, cx: &mut StateContext) {
        self.aim = Vec2::Y;
        capture(cx);
        cx.play(AnimationClip::FlingAim);
    }

    fn on_exit(&mut self, cx: &mut StateContext) {
        cx.player.set_suspended(false);
    }

    fn update(&mut self, cx: &mut StateContext) {
        let input = cx.input();
        let axes = Vec2::new(input.horizontal(), input.vertical());
        let jump = input.pressed_jump();
        if axes.length() > AXIS_DEADZONE {
            self.aim = axes;
        }
        if jump {
            launch(self.aim, cx);
        }
    }

    fn fixed_update(&mut self, cx: &mut StateContext) {
        hold(cx);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FlingFlowerDirected;

impl StateBehavior for FlingFlowerDirected {
    fn on_enter(&mut self, cx: &mut StateContext) {
        capture(cx);
        cx.play(AnimationClip::FlingCapture);
    }

    fn on_exit(&mut self, cx: &mut StateContext) {
        cx.player.set_suspended(false);
    }

    fn fixed_update(&mut self, cx: &mut StateContext) {
        hold(cx);
    }

    fn on_animation_finished(&mut self, clip: AnimationClip, cx: &mut StateContext) {
        if clip != AnimationClip::FlingCapture {
            return;
        }
        let direction = cx
            .player
            .fling_flower()
            .and_then(|f| f.direction())
            .unwrap_or(Vec2::Y);
        launch(direction, cx);
    }
}
