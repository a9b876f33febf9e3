//! Player input.
//!
//! [`InputState`] is written by the game (keyboard, gamepad, AI, replay...)
//! and read by the movement states. It tracks level state per logical button
//! and latches press/release edges until the update pass consumes them, so an
//! edge is never lost between frames.
//!
//! States never read `InputState` directly: they go through [`GatedInput`],
//! which hides any button whose capability is currently locked.

use bevy::prelude::*;

use crate::locks::{Capabilities, Capability};

/// Logical buttons.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Jump,
    Up,
    Down,
    Action,
    AltAction,
}

impl Button {
    pub const ALL: [Button; 5] = [
        Button::Jump,
        Button::Up,
        Button::Down,
        Button::Action,
        Button::AltAction,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// The capability that gates this button.
    pub fn capability(self) -> Capability {
        match self {
            Button::Jump => Capability::Jump,
            Button::Down => Capability::Crouch,
            Button::Up | Button::Action | Button::AltAction => Capability::Move,
        }
    }
}

/// Level and edge state of one button.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonState {
    /// Currently held down.
    pub held: bool,
    /// Went down since the last consumed update pass.
    pub pressed: bool,
    /// Went up since the last consumed update pass.
    pub released: bool,
}

/// Raw input for one character.
///
/// # Example
///
/// ```rust
/// use platformer_movement::prelude::*;
///
/// let mut input = InputState::new();
/// input.set_button(Button::Jump, true);
/// assert!(input.pressed(Button::Jump));
/// assert!(input.holding(Button::Jump));
///
/// input.consume_edges();
/// assert!(!input.pressed(Button::Jump));
/// assert!(input.holding(Button::Jump));
/// ```
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct InputState {
    buttons: [ButtonState; 5],
    axes: Vec2,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the level state of `button`, latching an edge if it changed.
    pub fn set_button(&mut self, button: Button, held: bool) {
        let state = &mut self.buttons[button.index()];
        if held && !state.held {
            state.pressed = true;
        }
        if !held && state.held {
            state.released = true;
        }
        state.held = held;
    }

    pub fn press(&mut self, button: Button) {
        self.set_button(button, true);
    }

    pub fn release(&mut self, button: Button) {
        self.set_button(button, false);
    }

    /// Set the movement axes. Each component is clamped to [-1, 1].
    pub fn set_axes(&mut self, x: f32, y: f32) {
        self.axes = Vec2::new(x.clamp(-1.0, 1.0), y.clamp(-1.0, 1.0));
    }

    pub fn set_horizontal(&mut self, x: f32) {
        self.axes.x = x.clamp(-1.0, 1.0);
    }

    pub fn set_vertical(&mut self, y: f32) {
        self.axes.y = y.clamp(-1.0, 1.0);
    }

    /// Clear latched edges. Called after each update pass.
    pub fn consume_edges(&mut self) {
        for state in &mut self.buttons {
            state.pressed = false;
            state.released = false;
        }
    }

    /// Release everything and zero the axes.
    pub fn clear(&mut self) {
        for button in Button::ALL {
            self.release(button);
        }
        self.axes = Vec2::ZERO;
    }

    pub fn state(&self, button: Button) -> ButtonState {
        self.buttons[button.index()]
    }

    pub fn pressed(&self, button: Button) -> bool {
        self.state(button).pressed
    }

    pub fn holding(&self, button: Button) -> bool {
        self.state(button).held
    }

    pub fn released(&self, button: Button) -> bool {
        self.state(button).released
    }

    pub fn horizontal(&self) -> f32 {
        self.axes.x
    }

    pub fn vertical(&self) -> f32 {
        self.axes.y
    }

    pub fn axes(&self) -> Vec2 {
        self.axes
    }
}

/// Input as seen through the capability locks.
///
/// A locked button reads as neither pressed, held nor released, and the axes
/// read as zero while movement is locked.
#[derive(Debug, Clone, Copy)]
pub struct GatedInput<'a> {
    input: &'a InputState,
    capabilities: &'a Capabilities,
}

/// Axis values smaller than this count as no input.
pub const AXIS_DEADZONE: f32 = 0.001;

impl<'a> GatedInput<'a> {
    pub fn new(input: &'a InputState, capabilities: &'a Capabilities) -> Self {
        Self {
            input,
            capabilities,
        }
    }

    fn open(&self, button: Button) -> bool {
        self.capabilities.allows(button.capability())
    }

    pub fn pressed(&self, button: Button) -> bool {
        self.open(button) && self.input.pressed(button)
    }

    pub fn holding(&self, button: Button) -> bool {
        self.open(button) && self.input.holding(button)
    }

    pub fn released(&self, button: Button) -> bool {
        self.open(button) && self.input.released(button)
    }

    pub fn pressed_jump(&self) -> bool {
        self.pressed(Button::Jump)
    }

    pub fn holding_down(&self) -> bool {
        self.holding(Button::Down)
    }

    pub fn horizontal(&self) -> f32 {
        if self.capabilities.can_move() {
            self.input.horizontal()
        } else {
            0.0
        }
    }

    pub fn vertical(&self) -> f32 {
        if self.capabilities.can_move() {
            self.input.vertical()
        } else {
            0.0
        }
    }

    /// Whether any horizontal input is held.
    pub fn has_horizontal(&self) -> bool {
        self.horizontal().abs() > AXIS_DEADZONE
    }
}
