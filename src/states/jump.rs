//! Jump resolution shared by the airborne states.
//!
//! A jump press while airborne is resolved in a fixed order: ground coyote
//! time first, then a wall (live contact or wall coyote time), and only then
//! the air jump through the state's buffered-jump fallback.

use super::{StateContext, StateKind};

/// Outcome of resolving a jump press.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AirJump {
    /// Ground coyote time was consumed.
    Ground,
    /// A wall jump away from the wall on `side`.
    Wall { side: f32 },
    /// Nothing to jump off; fall back to the air jump.
    Buffered,
}

impl AirJump {
    /// The state this jump enters, if any.
    pub fn target(self) -> Option<StateKind> {
        match self {
            AirJump::Ground => Some(StateKind::SingleJumpStart),
            AirJump::Wall { .. } => Some(StateKind::WallJump),
            AirJump::Buffered => None,
        }
    }
}

/// Pick the jump for the current contacts and coyote timers, consuming the
/// grace window it uses.
pub fn resolve_air_jump(cx: &mut StateContext) -> AirJump {
    let player = &mut *cx.player;
    if player.in_ground_coyote_time() {
        player.use_ground_coyote();
        return AirJump::Ground;
    }

    let touching = player.contacts().touching_wall_side();
    if touching != 0.0 {
        player.remember_wall_side(touching);
        player.use_wall_coyote();
        return AirJump::Wall { side: touching };
    }

    if player.in_wall_coyote_time() && player.wall_side() != 0.0 {
        player.use_wall_coyote();
        return AirJump::Wall {
            side: player.wall_side(),
        };
    }

    AirJump::Buffered
}

/// Resolve a jump press and request the matching transition.
///
/// Returns `true` if a transition was requested. A [`AirJump::Buffered`]
/// outcome is left to the caller.
pub fn jump_from_air(cx: &mut StateContext) -> bool {
    let jump = resolve_air_jump(cx);
    log::debug!("{:?} resolved air jump as {jump:?}", cx.state());
    match jump.target() {
        Some(target) => {
            cx.change_to(target);
            true
        }
        None => false,
    }
}

/// Air-jump fallback: spend the double jump if one is left.
pub fn try_double_jump(cx: &mut StateContext) -> bool {
    if !cx.player.has_double_jump() {
        return false;
    }
    cx.change_to(StateKind::DoubleJumpStart);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::{ColliderId, ContactReport, SurfaceHit};
    use crate::input::InputState;
    use crate::player::Player;
    use crate::sensor::NoColliders;
    use crate::states::HookPhase;
    use bevy::prelude::*;

    fn with_cx<R>(player: &mut Player, f: impl FnOnce(&mut StateContext) -> R) -> R {
        let input = InputState::new();
        let mut cx = StateContext::new(
            player,
            &input,
            &NoColliders,
            1.0 / 60.0,
            StateKind::SingleJumpFall,
            HookPhase::Update,
        );
        f(&mut cx)
    }

    fn right_wall() -> ContactReport {
        let mut report = ContactReport::empty(0.02);
        report.right_wall = Some(SurfaceHit::new(0.0, Vec2::NEG_X, Vec2::ZERO, ColliderId(1)));
        report
    }

    #[test]
    fn ground_coyote_wins_over_wall() {
        let mut player = Player::default();
        player.start_ground_coyote();
        player.start_wall_coyote();
        player.remember_wall_side(1.0);

        assert_eq!(with_cx(&mut player, resolve_air_jump), AirJump::Ground);
        assert!(!player.in_ground_coyote_time());
        assert!(player.in_wall_coyote_time());
    }

    #[test]
    fn wall_coyote_is_consumed() {
        let mut player = Player::default();
        player.remember_wall_side(-1.0);
        player.start_wall_coyote();

        assert_eq!(
            with_cx(&mut player, resolve_air_jump),
            AirJump::Wall { side: -1.0 }
        );
        assert!(!player.in_wall_coyote_time());
    }

    #[test]
    fn live_wall_contact_jumps_without_coyote() {
        let mut player = Player::default();
        player.set_contacts(right_wall());

        assert_eq!(
            with_cx(&mut player, resolve_air_jump),
            AirJump::Wall { side: 1.0 }
        );
        assert_eq!(player.wall_side(), 1.0);
    }

    #[test]
    fn nothing_available_falls_back_to_buffer() {
        let mut player = Player::default();
        assert_eq!(with_cx(&mut player, resolve_air_jump), AirJump::Buffered);
    }

    #[test]
    fn double_jump_requires_charge() {
        let mut player = Player::default();
        player.spend_double_jump();
        assert!(!with_cx(&mut player, try_double_jump));

        player.refill_double_jump();
        let pending = with_cx(&mut player, |cx| {
            try_double_jump(cx);
            cx.pending()
        });
        assert_eq!(pending, Some(StateKind::DoubleJumpStart));
    }
}
