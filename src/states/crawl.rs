//! Crawling and the dive into a crawl.

use bevy::prelude::*;

use super::ground::leave_ground;
use super::{StateBehavior, StateContext, StateKind};
use crate::animation::AnimationClip;
use crate::facing::Facing;
use crate::input::AXIS_DEADZONE;

#[derive(Debug, Clone, Copy, Default)]
pub struct Crawling;

impl StateBehavior for Crawling {
    fn on_enter(&mut self, cx: &mut StateContext) {
        cx.player.touch_down();
        cx.play(AnimationClip::Crawl);
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

        let x = cx.input().horizontal();
        if x.abs() <= AXIS_DEADZONE {
            cx.player.set_vx(0.0);
            if cx.contacts().distance_to_ceiling() < cx.player.settings.crawl_clearance {
                cx.change_to(StateKind::CrawlingStopped);
            } else {
                cx.change_to(StateKind::Crouching);
            }
            return;
        }

        let direction = x.signum();
        let mut vx = x * cx.player.settings.crawl_speed;
        let wall = cx.contacts().distance_to_wall_on(direction);
        if wall.is_finite() && wall <= vx.abs() * cx.dt() {
            // Align flush with the wall instead of pushing into it.
            cx.player.translate(Vec2::new(direction * wall, 0.0));
            vx = 0.0;
        }
        cx.player.set_vx(vx);
        cx.player.set_facing(Facing::from_sign(direction));
    }
}

/// Crawl posture without input under a low ceiling.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrawlingStopped;

impl StateBehavior for CrawlingStopped {
    fn on_enter(&mut self, cx: &mut StateContext) {
        cx.player.set_vx(0.0);
        cx.play(AnimationClip::CrawlIdle);
    }

    fn update(&mut self, cx: &mut StateContext) {
        let input = cx.input();
        let (jump, moving) = (input.pressed_jump(), input.has_horizontal());
        if moving {
            cx.change_to(StateKind::Crawling);
        } else if jump && cx.can_stand() {
            cx.change_to(StateKind::SingleJumpStart);
        }
    }

    fn fixed_update(&mut self, cx: &mut StateContext) {
        if leave_ground(cx) {
            return;
        }
        cx.player.set_vx(0.0);
        if cx.contacts().distance_to_ceiling() >= cx.player.settings.crawl_clearance {
            cx.change_to(StateKind::Crouching);
        }
    }
}

/// Hop from a run into a crawl.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dive {
    left_ground: bool,
}

impl StateBehavior for Dive {
    fn on_enter(&mut self, cx: &mut StateContext) {
        self.left_ground = false;
        let direction = match cx.player.facing() {
            Facing::None => Facing::from_sign(cx.player.vx()).sign(),
            facing => facing.sign(),
        };
        let hop = cx.player.settings.dive_hop;
        cx.player.set_velocity(Vec2::new(direction * hop.x, hop.y));
        cx.play(AnimationClip::Dive);
    }

    fn fixed_update(&mut self, cx: &mut StateContext) {
        let grounded = cx.contacts().is_touching_ground();
        if !grounded {
            self.left_ground = true;
            cx.player.clamp_fall_speed();
            return;
        }
        if self.left_ground && cx.player.vy() <= 0.0 {
            cx.change_to(StateKind::Crawling);
        }
    }

    fn on_animation_finished(&mut self, clip: AnimationClip, cx: &mut StateContext) {
        if clip == AnimationClip::Dive && cx.contacts().is_touching_ground() {
            cx.change_to(StateKind::Crawling);
        }
    }
}
