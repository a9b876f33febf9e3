//! Asynchronous events for the active state.
//!
//! Item pickups and fling-flower captures are detected by other systems and
//! pushed into the state machine as a [`Signal`]. Only the active state sees
//! a signal; the predicates on the payloads are computed by their owners.

use bevy::prelude::*;

/// An item offered to the player.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Carriable {
    /// Identifier chosen by the item system.
    pub id: u64,
    /// Whether the item system allows carrying it right now.
    pub can_carry: bool,
}

impl Carriable {
    pub fn new(id: u64, can_carry: bool) -> Self {
        Self { id, can_carry }
    }
}

/// How a fling flower launches the player.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub enum FlingFlowerKind {
    /// The player aims with the movement axes and launches on jump.
    Aimable,
    /// The flower launches along its own direction.
    Directional(Vec2),
}

/// A fling flower the player entered.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct FlingFlower {
    pub id: u64,
    /// Where the player is held while captured.
    pub anchor: Vec2,
    pub kind: FlingFlowerKind,
}

impl FlingFlower {
    pub fn aimable(id: u64, anchor: Vec2) -> Self {
        Self {
            id,
            anchor,
            kind: FlingFlowerKind::Aimable,
        }
    }

    pub fn directional(id: u64, anchor: Vec2, direction: Vec2) -> Self {
        Self {
            id,
            anchor,
            kind: FlingFlowerKind::Directional(direction),
        }
    }

    /// Launch direction of a directional flower.
    pub fn direction(&self) -> Option<Vec2> {
        match self.kind {
            FlingFlowerKind::Directional(d) => Some(d),
            FlingFlowerKind::Aimable => None,
        }
    }
}

/// Event delivered to the active state.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub enum Signal {
    /// An item is in reach.
    ItemAvailable(Carriable),
    /// The player entered a fling flower.
    FlingFlower(FlingFlower),
}

impl Signal {
    /// The item, if this signal offers a carriable one.
    pub fn can_carry(&self) -> Option<Carriable> {
        match self {
            Signal::ItemAvailable(item) if item.can_carry => Some(*item),
            _ => None,
        }
    }

    /// The flower, if it is an aimable fling flower.
    pub fn is_aimable_fling_flower(&self) -> Option<FlingFlower> {
        match self {
            Signal::FlingFlower(f) if f.kind == FlingFlowerKind::Aimable => Some(*f),
            _ => None,
        }
    }

    /// The flower, if it is a directional fling flower.
    pub fn is_directional_fling_flower(&self) -> Option<FlingFlower> {
        match self {
            Signal::FlingFlower(f) if f.direction().is_some() => Some(*f),
            _ => None,
        }
    }
}

/// Signals waiting for the next update pass of a character.
#[derive(Component, Debug, Clone, Default)]
pub struct SignalInbox {
    pending: Vec<Signal>,
}

impl SignalInbox {
    pub fn send(&mut self, signal: Signal) {
        self.pending.push(signal);
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Take every pending signal in arrival order.
    pub fn drain(&mut self) -> Vec<Signal> {
        std::mem::take(&mut self.pending)
    }
}
