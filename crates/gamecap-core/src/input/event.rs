use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Seconds since the Unix epoch, as used for every logged timestamp.
pub fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}

/// A single captured input event.
///
/// Keyboard keycodes are Windows virtual-key codes. Scroll amounts are
/// positive when scrolling up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    /// Relative mouse motion.
    MouseMove {
        /// Horizontal delta.
        dx: i32,
        /// Vertical delta.
        dy: i32,
    },
    /// Mouse button edge.
    MouseButton {
        /// Button index.
        id: u16,
        /// `true` on press, `false` on release.
        down: bool,
    },
    /// Mouse wheel movement.
    MouseScroll {
        /// Wheel delta.
        amount: i16,
    },
    /// Keyboard key edge.
    Keyboard {
        /// Virtual-key code.
        keycode: u16,
        /// `true` on press, `false` on release.
        down: bool,
    },
    /// Digital gamepad button edge.
    GamepadButton {
        /// Button index.
        id: u16,
        /// `true` on press, `false` on release.
        down: bool,
    },
    /// Analog gamepad button (triggers).
    GamepadButtonValue {
        /// Button index.
        id: u16,
        /// Normalized pressure.
        value: f32,
    },
    /// Gamepad stick axis.
    GamepadAxis {
        /// Axis index.
        axis: u16,
        /// Normalized position.
        value: f32,
    },
}

/// Handler routing category for an [`InputEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventCategory {
    /// [`InputEvent::MouseMove`].
    MouseMove,
    /// [`InputEvent::MouseButton`].
    MouseButton,
    /// [`InputEvent::MouseScroll`].
    MouseScroll,
    /// [`InputEvent::Keyboard`].
    Keyboard,
    /// Any of the gamepad variants.
    Gamepad,
}

impl EventCategory {
    /// Every category, in routing order.
    pub const ALL: [EventCategory; 5] = [
        EventCategory::MouseMove,
        EventCategory::MouseButton,
        EventCategory::MouseScroll,
        EventCategory::Keyboard,
        EventCategory::Gamepad,
    ];
}

impl InputEvent {
    /// The handler category this event is routed to.
    pub fn category(&self) -> EventCategory {
        match self {
            InputEvent::MouseMove { .. } => EventCategory::MouseMove,
            InputEvent::MouseButton { .. } => EventCategory::MouseButton,
            InputEvent::MouseScroll { .. } => EventCategory::MouseScroll,
            InputEvent::Keyboard { .. } => EventCategory::Keyboard,
            InputEvent::GamepadButton { .. }
            | InputEvent::GamepadButtonValue { .. }
            | InputEvent::GamepadAxis { .. } => EventCategory::Gamepad,
        }
    }

    /// Event type column value in the session log.
    pub fn log_type(&self) -> &'static str {
        match self {
            InputEvent::MouseMove { .. } => "MOUSE_MOVE",
            InputEvent::MouseButton { .. } => "MOUSE_BUTTON",
            InputEvent::MouseScroll { .. } => "SCROLL",
            InputEvent::Keyboard { .. } => "KEYBOARD",
            InputEvent::GamepadButton { .. } => "GAMEPAD_BUTTON",
            InputEvent::GamepadButtonValue { .. } => "GAMEPAD_BUTTON_VALUE",
            InputEvent::GamepadAxis { .. } => "GAMEPAD_AXIS",
        }
    }

    /// Event args column value in the session log.
    pub fn log_args(&self) -> Value {
        match *self {
            InputEvent::MouseMove { dx, dy } => json!([dx, dy]),
            InputEvent::MouseButton { id, down } => json!([id, down]),
            InputEvent::MouseScroll { amount } => json!([amount]),
            InputEvent::Keyboard { keycode, down } => json!([keycode, down]),
            InputEvent::GamepadButton { id, down } => json!([id, down]),
            InputEvent::GamepadButtonValue { id, value } => json!([id, value]),
            InputEvent::GamepadAxis { axis, value } => json!([axis, value]),
        }
    }

    /// Keycode of a keyboard press, `None` for anything else.
    pub fn key_press(&self) -> Option<u16> {
        match *self {
            InputEvent::Keyboard {
                keycode,
                down: true,
            } => Some(keycode),
            _ => None,
        }
    }
}

/// An [`InputEvent`] stamped at capture time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimedEvent {
    /// Capture time in seconds since the Unix epoch.
    pub timestamp: f64,
    /// The captured event.
    pub event: InputEvent,
}

impl TimedEvent {
    /// Stamp `event` with the current time.
    pub fn now(event: InputEvent) -> Self {
        Self {
            timestamp: unix_now(),
            event,
        }
    }
}
