//! Capability locks.
//!
//! Any subsystem (dialog, cutscene, carry logic, ...) can switch off jumping,
//! moving or crouching by registering a [`LockReason`]. A capability is
//! available only while no reason is registered for it, so independent
//! subsystems never re-enable something another one still needs disabled.

use bevy::prelude::*;

/// Opaque token naming the subsystem that disabled a capability.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LockReason(pub &'static str);

impl LockReason {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn name(&self) -> &'static str {
        self.0
    }
}

/// Set of outstanding lock reasons for one capability.
///
/// Each reason is stored at most once. Adding a reason twice keeps a single
/// entry, so one removal releases it. Removing an absent reason does nothing.
#[derive(Reflect, Debug, Clone, Default, PartialEq, Eq)]
pub struct LockReasonSet {
    reasons: Vec<LockReason>,
}

impl LockReasonSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `reason`. Returns `false` if it was already present.
    pub fn add(&mut self, reason: LockReason) -> bool {
        if self.reasons.contains(&reason) {
            return false;
        }
        self.reasons.push(reason);
        true
    }

    /// Remove `reason`. Returns `false` if it was not present.
    pub fn remove(&mut self, reason: LockReason) -> bool {
        let before = self.reasons.len();
        self.reasons.retain(|r| *r != reason);
        self.reasons.len() != before
    }

    pub fn contains(&self, reason: LockReason) -> bool {
        self.reasons.contains(&reason)
    }

    /// The capability is free when no reason is outstanding.
    pub fn is_empty(&self) -> bool {
        self.reasons.is_empty()
    }

    pub fn len(&self) -> usize {
        self.reasons.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LockReason> {
        self.reasons.iter()
    }

    pub fn clear(&mut self) {
        self.reasons.clear();
    }
}

/// A capability that can be locked.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Jump,
    Move,
    Crouch,
}

/// Lock sets for every [`Capability`].
#[derive(Reflect, Debug, Clone, Default)]
pub struct Capabilities {
    jump: LockReasonSet,
    movement: LockReasonSet,
    crouch: LockReasonSet,
}

impl Capabilities {
    fn set(&self, capability: Capability) -> &LockReasonSet {
        match capability {
            Capability::Jump => &self.jump,
            Capability::Move => &self.movement,
            Capability::Crouch => &self.crouch,
        }
    }

    fn set_mut(&mut self, capability: Capability) -> &mut LockReasonSet {
        match capability {
            Capability::Jump => &mut self.jump,
            Capability::Move => &mut self.movement,
            Capability::Crouch => &mut self.crouch,
        }
    }

    /// Whether `capability` currently has no outstanding lock.
    pub fn allows(&self, capability: Capability) -> bool {
        self.set(capability).is_empty()
    }

    pub fn disable(&mut self, capability: Capability, reason: LockReason) {
        if self.set_mut(capability).add(reason) {
            log::debug!("{capability:?} disabled by {}", reason.name());
        }
    }

    pub fn enable(&mut self, capability: Capability, reason: LockReason) {
        if self.set_mut(capability).remove(reason) {
            log::debug!("{capability:?} lock {} released", reason.name());
        }
    }

    /// Outstanding reasons for `capability`.
    pub fn reasons(&self, capability: Capability) -> &LockReasonSet {
        self.set(capability)
    }

    pub fn can_jump(&self) -> bool {
        self.allows(Capability::Jump)
    }

    pub fn can_move(&self) -> bool {
        self.allows(Capability::Move)
    }

    pub fn can_crouch(&self) -> bool {
        self.allows(Capability::Crouch)
    }

    pub fn disable_jump(&mut self, reason: LockReason) {
        self.disable(Capability::Jump, reason);
    }

    pub fn enable_jump(&mut self, reason: LockReason) {
        self.enable(Capability::Jump, reason);
    }

    pub fn disable_move(&mut self, reason: LockReason) {
        self.disable(Capability::Move, reason);
    }

    pub fn enable_move(&mut self, reason: LockReason) {
        self.enable(Capability::Move, reason);
    }

    pub fn disable_crouch(&mut self, reason: LockReason) {
        self.disable(Capability::Crouch, reason);
    }

    pub fn enable_crouch(&mut self, reason: LockReason) {
        self.enable(Capability::Crouch, reason);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIALOG: LockReason = LockReason::new("dialog");
    const CUTSCENE: LockReason = LockReason::new("cutscene");

    #[test]
    fn empty_set_allows_capability() {
        let caps = Capabilities::default();
        assert!(caps.can_jump());
        assert!(caps.can_move());
        assert!(caps.can_crouch());
    }

    #[test]
    fn enable_after_disable_restores() {
        let mut caps = Capabilities::default();
        caps.disable_jump(DIALOG);
        assert!(!caps.can_jump());
        caps.enable_jump(DIALOG);
        assert!(caps.can_jump());
    }

    #[test]
    fn outstanding_reason_keeps_lock() {
        let mut caps = Capabilities::default();
        caps.disable_jump(DIALOG);
        caps.disable_jump(CUTSCENE);
        caps.enable_jump(DIALOG);
        assert!(!caps.can_jump());
        caps.enable_jump(CUTSCENE);
        assert!(caps.can_jump());
    }

    #[test]
    fn removing_unknown_reason_is_noop() {
        let mut set = LockReasonSet::new();
        set.add(DIALOG);
        assert!(!set.remove(CUTSCENE));
        assert_eq!(set.len(), 1);
        assert!(set.contains(DIALOG));

        let mut caps = Capabilities::default();
        caps.enable_move(CUTSCENE);
        assert!(caps.can_move());
    }

    #[test]
    fn repeated_disable_is_idempotent() {
        let mut caps = Capabilities::default();
        caps.disable_crouch(DIALOG);
        caps.disable_crouch(DIALOG);
        assert_eq!(caps.reasons(Capability::Crouch).len(), 1);
        caps.enable_crouch(DIALOG);
        assert!(caps.can_crouch());
    }

    #[test]
    fn capabilities_are_independent() {
        let mut caps = Capabilities::default();
        caps.disable_move(DIALOG);
        assert!(!caps.can_move());
        assert!(caps.can_jump());
        assert!(caps.can_crouch());
    }
}
