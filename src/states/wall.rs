//! Wall running, sliding and jumping.

use bevy::prelude::*;

use super::air::{after_launch, JumpTier};
use super::fling::try_enter_flower;
use super::{StateBehavior, StateContext, StateKind};
use crate::animation::AnimationClip;
use crate::facing::Facing;
use crate::signal::Signal;

/// Horizontal push away from a wall when letting go of it.
const WALL_RELEASE_NUDGE: f32 = 0.05;

/// The touched wall side, or the remembered one.
fn wall_side(cx: &StateContext) -> f32 {
    let touching = cx.contacts().touching_wall_side();
    if touching == 0.0 {
        cx.player.wall_side()
    } else {
        touching
    }
}

/// Let go of the wall on `side` and fall, opening wall coyote time.
fn release_wall(side: f32, cx: &mut StateContext) {
    cx.player.start_wall_coyote();
    cx.player.translate(Vec2::new(-side * WALL_RELEASE_NUDGE, 0.0));
    cx.change_to(StateKind::SingleJumpFall);
}

/// Launch away from the last wall.
#[derive(Debug, Clone, Copy, Default)]
pub struct WallJump;

impl StateBehavior for WallJump {
    fn on_enter(&mut self, cx: &mut StateContext) {
        let mut side = wall_side(cx);
        if side == 0.0 {
            side = -cx.player.facing().sign();
        }
        let away = if side == 0.0 { 1.0 } else { -side };

        let launch = cx.player.settings.wall_jump;
        cx.player.set_velocity(Vec2::new(away * launch.x, launch.y));
        cx.player.set_facing(Facing::from_sign(away));
        cx.player.use_wall_coyote();
        cx.player.refill_double_jump();
        cx.play(AnimationClip::WallJump);
    }

    fn on_exit(&mut self, cx: &mut StateContext) {
        cx.player.start_wall_jump_muting();
    }

    fn fixed_update(&mut self, cx: &mut StateContext) {
        cx.player.add_air_time(cx.dt());
        cx.player.clamp_fall_speed();
    }

    fn on_signal(&mut self, signal: &Signal, cx: &mut StateContext) {
        try_enter_flower(signal, cx);
    }

    fn on_animation_finished(&mut self, clip: AnimationClip, cx: &mut StateContext) {
        if clip == AnimationClip::WallJump {
            after_launch(JumpTier::Single, cx);
        }
    }
}

/// Run up a wall from standing.
#[derive(Debug, Clone, Copy, Default)]
pub struct WallRun {
    side: f32,
}

impl StateBehavior for WallRun {
    fn on_enter(&mut self, cx: &mut StateContext) {
        self.side = wall_side(cx);
        cx.player.remember_wall_side(self.side);
        cx.player.set_velocity(Vec2::new(0.0, cx.player.settings.single_jump_force));
        cx.player.set_facing(Facing::from_sign(self.side));
        cx.player.use_ground_coyote();
        cx.player.start_wall_coyote();
        cx.play(AnimationClip::WallRun);
    }

    fn update(&mut self, cx: &mut StateContext) {
        if cx.input().pressed_jump() {
            cx.change_to(StateKind::WallJump);
        }
    }

    fn fixed_update(&mut self, cx: &mut StateContext) {
        cx.player.clamp_fall_speed();
        if !cx.contacts().is_touching_wall_on(self.side) {
            release_wall(self.side, cx);
            return;
        }
        cx.player.start_wall_coyote();
        cx.player.set_vx(0.0);

        if cx.contacts().is_touching_ceiling() && cx.player.vy() > 0.0 {
            cx.player.set_vy(0.0);
        }
        if cx.player.vy() <= 0.0 {
            cx.change_to(StateKind::WallSlide);
        }
    }

    fn on_signal(&mut self, signal: &Signal, cx: &mut StateContext) {
        try_enter_flower(signal, cx);
    }
}

/// Slide down a wall; `fast` while holding down.
#[derive(Debug, Clone, Copy)]
pub struct WallSlide {
    fast: bool,
    side: f32,
}

impl WallSlide {
    pub fn new(fast: bool) -> Self {
        Self { fast, side: 0.0 }
    }

    fn deceleration(&self, cx: &StateContext) -> f32 {
        if self.fast {
            cx.player.settings.fast_wall_slide_deceleration
        } else {
            cx.player.settings.wall_slide_deceleration
        }
    }
}

impl StateBehavior for WallSlide {
    fn on_enter(&mut self, cx: &mut StateContext) {
        self.side = wall_side(cx);
        cx.player.remember_wall_side(self.side);
        cx.player.touch_down();
        cx.player.start_wall_coyote();
        cx.player.set_vx(0.0);
        cx.player.set_facing(Facing::from_sign(-self.side));
        cx.play(if self.fast {
            AnimationClip::WallSlideFast
        } else {
            AnimationClip::WallSlide
        });
    }

    fn update(&mut self, cx: &mut StateContext) {
        let input = cx.input();
        let (jump, down) = (input.pressed_jump(), input.holding_down());
        if jump {
            cx.change_to(StateKind::WallJump);
        } else if down && !self.fast {
            cx.change_to(StateKind::WallSlideFast);
        } else if !down && self.fast {
            cx.change_to(StateKind::WallSlide);
        }
    }

    fn fixed_update(&mut self, cx: &mut StateContext) {
        if cx.contacts().is_touching_ground() && cx.player.vy() <= 0.0 {
            cx.change_to(StateKind::Idle);
            return;
        }

        let input = cx.input();
        let away = input.has_horizontal() && input.horizontal() * self.side < 0.0;
        if away || !cx.contacts().is_touching_wall_on(self.side) {
            release_wall(self.side, cx);
            return;
        }

        cx.player.start_wall_coyote();
        cx.player.set_vx(0.0);
        let vy = cx.player.vy();
        if vy < 0.0 {
            cx.player.set_vy(vy * (1.0 - self.deceleration(cx)));
        }
        cx.player.clamp_fall_speed();
    }

    fn on_signal(&mut self, signal: &Signal, cx: &mut StateContext) {
        try_enter_flower(signal, cx);
    }
}
