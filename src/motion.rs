//! Shared horizontal movement.
//!
//! Most ground and air states embed a [`HorizontalMotion`] and call it from
//! their hooks. It turns the horizontal axis into velocity, derives facing,
//! and buffers a jump press from the update pass so the owning state can
//! resolve it through `StateBehavior::try_buffered_jump` on the next fixed
//! tick.

use crate::config::MovementSettings;
use crate::facing::Facing;
use crate::input::AXIS_DEADZONE;
use crate::states::StateContext;

/// Next horizontal velocity for one fixed step.
///
/// With input held the velocity gains `max_speed * acceleration` per second
/// (`max_speed * agility` when the input opposes the motion) and is capped
/// at `max_speed`. Without input it loses `deceleration` of itself each step
/// and is never snapped to zero. `muting` scales the gained speed in both
/// cases (1.0 = none).
pub fn step_velocity(
    vx: f32,
    input: f32,
    muting: f32,
    settings: &MovementSettings,
    dt: f32,
) -> f32 {
    if (input * muting).abs() <= AXIS_DEADZONE {
        return vx * (1.0 - settings.deceleration);
    }

    let turning = vx != 0.0 && vx.signum() != input.signum();
    let delta = if turning {
        input.signum() * muting * settings.turn_factor() * dt
    } else {
        input * muting * settings.acceleration_factor() * dt
    };

    let max = settings.max_speed;
    if vx.abs() > max && !turning {
        // Keep momentum from launches but do not add to it.
        return vx;
    }
    (vx + delta).clamp(-max, max)
}

/// Horizontal movement shared by states.
#[derive(Debug, Clone, Copy, Default)]
pub struct HorizontalMotion {
    buffered_jump: bool,
}

impl HorizontalMotion {
    /// Update-pass half: remember a jump press for the next fixed tick.
    pub fn update(&mut self, cx: &mut StateContext) {
        if cx.input().pressed_jump() {
            self.buffered_jump = true;
        }
    }

    /// Accelerate toward the input or decelerate without it.
    pub fn apply(&self, cx: &mut StateContext) {
        let input = cx.input().horizontal();
        let muting = if cx.player.is_wall_jumping() {
            cx.player.settings.wall_jump_muting
        } else {
            1.0
        };
        let vx = step_velocity(
            cx.player.vx(),
            input,
            muting,
            &cx.player.settings,
            cx.dt(),
        );
        cx.player.set_vx(vx);
        self.face_motion(cx);
    }

    /// Decelerate regardless of input.
    pub fn decelerate(&self, cx: &mut StateContext) {
        let vx = step_velocity(cx.player.vx(), 0.0, 1.0, &cx.player.settings, cx.dt());
        cx.player.set_vx(vx);
    }

    /// Face the direction of travel.
    pub fn face_motion(&self, cx: &mut StateContext) {
        let facing = Facing::from_velocity(cx.player.vx(), cx.player.settings.idle_threshold);
        cx.player.set_facing(facing);
    }

    pub fn buffer_jump(&mut self) {
        self.buffered_jump = true;
    }

    pub fn has_buffered_jump(&self) -> bool {
        self.buffered_jump
    }

    pub fn take_buffered_jump(&mut self) -> bool {
        std::mem::take(&mut self.buffered_jump)
    }

    pub fn clear(&mut self) {
        self.buffered_jump = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn acceleration_from_rest_is_linear_until_capped() {
        let settings = MovementSettings::default();
        let mut vx = 0.0;
        for k in 1..=300 {
            vx = step_velocity(vx, 1.0, 1.0, &settings, DT);
            let expected = (24.0 * 0.25 * k as f32 * DT).min(24.0);
            assert!((vx - expected).abs() < 1e-2, "tick {k}: {vx} vs {expected}");
        }
        assert_eq!(vx, 24.0);
    }

    #[test]
    fn deceleration_strictly_decreases_without_snapping() {
        let settings = MovementSettings::default();
        let mut vx = 10.0;
        for _ in 0..50 {
            let next = step_velocity(vx, 0.0, 1.0, &settings, DT);
            assert!(next < vx);
            assert!(next > 0.0);
            vx = next;
        }
    }

    #[test]
    fn turning_uses_agility() {
        let settings = MovementSettings::default();
        let vx = step_velocity(10.0, -1.0, 1.0, &settings, DT);
        assert!((vx - (10.0 - 24.0 * 2.0 * DT)).abs() < 1e-4);
    }

    #[test]
    fn muting_scales_input() {
        let settings = MovementSettings::default();
        let full = step_velocity(0.0, 1.0, 1.0, &settings, DT);
        let muted = step_velocity(0.0, 1.0, 0.1, &settings, DT);
        assert!((muted - full * 0.1).abs() < 1e-6);
    }

    #[test]
    fn muting_scales_turning_back() {
        let settings = MovementSettings::default();
        let full = step_velocity(-14.0, 1.0, 1.0, &settings, DT) + 14.0;
        let muted = step_velocity(-14.0, 1.0, 0.1, &settings, DT) + 14.0;
        assert!(muted < full);
        assert!((muted - full * 0.1).abs() < 1e-4);
    }

    #[test]
    fn launch_speed_is_kept_while_holding_forward() {
        let settings = MovementSettings::default();
        assert_eq!(step_velocity(30.0, 1.0, 1.0, &settings, DT), 30.0);
    }

    #[test]
    fn buffered_jump_is_taken_once() {
        let mut motion = HorizontalMotion::default();
        motion.buffer_jump();
        assert!(motion.has_buffered_jump());
        assert!(motion.take_buffered_jump());
        assert!(!motion.take_buffered_jump());
    }
}
