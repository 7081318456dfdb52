//! Control intents
//!
//! Keyboard, virtual joystick and touch fire button all collapse into one
//! device-independent `ControlIntent`. Raw device events never reach the engine.

use serde::{Deserialize, Serialize};

/// Radius of the on-screen joystick, in CSS pixels
pub const JOYSTICK_RADIUS: f32 = 42.0;

/// Normalized per-frame input
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlIntent {
    lateral: f32,
    firing: bool,
}

impl ControlIntent {
    /// Build an intent, clamping the lateral axis into [-1, 1]
    pub fn new(lateral: f32, firing: bool) -> Self {
        let lateral = if lateral.is_finite() {
            lateral.clamp(-1.0, 1.0)
        } else {
            0.0
        };
        Self { lateral, firing }
    }

    pub fn lateral(&self) -> f32 {
        self.lateral
    }

    pub fn firing(&self) -> bool {
        self.firing
    }
}

/// Commands that are not part of the per-frame intent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputCommand {
    TogglePause,
}

/// Keys the game listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Key {
    Left,
    Right,
    Fire,
    Pause,
}

impl Key {
    /// Map a `KeyboardEvent.code` value
    fn from_code(code: &str) -> Option<Self> {
        match code {
            "ArrowLeft" | "KeyA" => Some(Key::Left),
            "ArrowRight" | "KeyD" => Some(Key::Right),
            "Space" => Some(Key::Fire),
            "Escape" | "KeyP" => Some(Key::Pause),
            _ => None,
        }
    }
}

/// Merges every input source into a single intent
#[derive(Debug, Clone, Default)]
pub struct InputAggregator {
    key_left: bool,
    key_right: bool,
    key_fire: bool,
    touch_axis: f32,
    touch_fire: bool,
}

impl InputAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the key code is one the game consumes (caller may then suppress default)
    pub fn handles(code: &str) -> bool {
        Key::from_code(code).is_some()
    }

    /// Key pressed. Returns a command for pause keys (ignoring auto-repeat).
    pub fn key_down(&mut self, code: &str, repeat: bool) -> Option<InputCommand> {
        match Key::from_code(code)? {
            Key::Left => self.key_left = true,
            Key::Right => self.key_right = true,
            Key::Fire => self.key_fire = true,
            Key::Pause if !repeat => return Some(InputCommand::TogglePause),
            Key::Pause => {}
        }
        None
    }

    pub fn key_up(&mut self, code: &str) {
        match Key::from_code(code) {
            Some(Key::Left) => self.key_left = false,
            Some(Key::Right) => self.key_right = false,
            Some(Key::Fire) => self.key_fire = false,
            _ => {}
        }
    }

    /// Joystick knob offset from the pad center, in pixels
    ///
    /// Offsets beyond the stick radius are pulled back onto the rim. Returns the
    /// clamped offset for drawing the knob.
    pub fn joystick_moved(&mut self, dx: f32, dy: f32) -> (f32, f32) {
        let (dx, dy) = clamp_to_radius(dx, dy, JOYSTICK_RADIUS);
        self.touch_axis = dx / JOYSTICK_RADIUS;
        (dx, dy)
    }

    pub fn joystick_released(&mut self) {
        self.touch_axis = 0.0;
    }

    pub fn set_touch_fire(&mut self, pressed: bool) {
        self.touch_fire = pressed;
    }

    /// Drop all touch input (pause and game over)
    pub fn release_touch(&mut self) {
        self.touch_axis = 0.0;
        self.touch_fire = false;
    }

    /// Keyboard axis plus joystick axis, fire from any source
    pub fn intent(&self) -> ControlIntent {
        let keyboard_axis = match (self.key_left, self.key_right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        };
        ControlIntent::new(
            keyboard_axis + self.touch_axis,
            self.key_fire || self.touch_fire,
        )
    }
}

fn clamp_to_radius(dx: f32, dy: f32, radius: f32) -> (f32, f32) {
    if !dx.is_finite() || !dy.is_finite() {
        return (0.0, 0.0);
    }
    let distance = dx.hypot(dy);
    if distance > radius {
        let factor = radius / distance;
        (dx * factor, dy * factor)
    } else {
        (dx, dy)
    }
}
