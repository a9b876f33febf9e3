//! Coyote time.
//!
//! A grace window after leaving a ledge or a wall during which a jump still
//! counts as if the character were in contact. The threshold is read from
//! the settings on every query, so tuning changes apply immediately.

use bevy::prelude::*;

use crate::config::MovementSettings;

/// Which grace window a timer tracks.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoyoteKind {
    /// Walked off a ledge.
    Ground,
    /// Left a wall.
    Wall,
}

impl CoyoteKind {
    /// The current threshold for this kind.
    pub fn threshold(self, settings: &MovementSettings) -> f32 {
        match self {
            CoyoteKind::Ground => settings.coyote_time,
            CoyoteKind::Wall => settings.wall_jump_coyote_time,
        }
    }
}

/// Elapsed-time tracker gated by a late-bound threshold.
#[derive(Reflect, Debug, Clone, Copy)]
pub struct CoyoteTimer {
    kind: CoyoteKind,
    elapsed: f32,
}

impl CoyoteTimer {
    /// A timer that has never been started (never in coyote time).
    pub fn new(kind: CoyoteKind) -> Self {
        Self {
            kind,
            elapsed: f32::INFINITY,
        }
    }

    pub fn kind(&self) -> CoyoteKind {
        self.kind
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Advance by one fixed step.
    pub fn tick(&mut self, fixed_dt: f32) {
        self.elapsed += fixed_dt;
    }

    /// Open the grace window.
    pub fn start(&mut self) {
        self.elapsed = 0.0;
    }

    /// Exhaust the remaining grace so it cannot be consumed twice.
    pub fn consume(&mut self, settings: &MovementSettings) {
        self.elapsed = self.kind.threshold(settings);
    }

    pub fn in_coyote_time(&self, settings: &MovementSettings) -> bool {
        self.elapsed < self.kind.threshold(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> MovementSettings {
        MovementSettings::default().with_coyote_times(0.1, 0.2)
    }

    #[test]
    fn unstarted_timer_is_not_in_coyote_time() {
        let timer = CoyoteTimer::new(CoyoteKind::Ground);
        assert!(!timer.in_coyote_time(&settings()));
    }

    #[test]
    fn start_opens_window() {
        let mut timer = CoyoteTimer::new(CoyoteKind::Ground);
        timer.start();
        assert!(timer.in_coyote_time(&settings()));
    }

    #[test]
    fn window_closes_once_elapsed_reaches_threshold() {
        let s = settings();
        let mut timer = CoyoteTimer::new(CoyoteKind::Ground);
        timer.start();
        timer.tick(0.05);
        assert!(timer.in_coyote_time(&s));
        timer.tick(0.05);
        // elapsed == threshold is outside the window
        assert!(!timer.in_coyote_time(&s));
    }

    #[test]
    fn consume_exhausts_until_next_start() {
        let s = settings();
        let mut timer = CoyoteTimer::new(CoyoteKind::Wall);
        timer.start();
        timer.consume(&s);
        assert!(!timer.in_coyote_time(&s));
        timer.tick(0.0);
        assert!(!timer.in_coyote_time(&s));
        timer.start();
        assert!(timer.in_coyote_time(&s));
    }

    #[test]
    fn threshold_is_read_late() {
        let mut s = settings();
        let mut timer = CoyoteTimer::new(CoyoteKind::Wall);
        timer.start();
        timer.tick(0.15);
        assert!(timer.in_coyote_time(&s));
        s.wall_jump_coyote_time = 0.1;
        assert!(!timer.in_coyote_time(&s));
    }

    #[test]
    fn kinds_read_their_own_threshold() {
        let s = settings();
        assert_eq!(CoyoteKind::Ground.threshold(&s), 0.1);
        assert_eq!(CoyoteKind::Wall.threshold(&s), 0.2);
    }
}
