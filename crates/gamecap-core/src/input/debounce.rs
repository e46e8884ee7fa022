use crate::input::InputEvent;

use std::collections::HashSet;

/// Suppresses repeated press edges for a single device category.
///
/// A key is "held" from its first forwarded press until any release.
/// There is no time-based expiry.
#[derive(Debug, Default)]
pub struct KeyDebouncer {
    held: HashSet<u16>,
}

impl KeyDebouncer {
    /// Returns `true` if the edge should be forwarded.
    pub fn apply(&mut self, key: u16, down: bool) -> bool {
        if down {
            self.held.insert(key)
        } else {
            self.held.remove(&key);
            true
        }
    }

    /// Whether `key` is currently recorded as held.
    pub fn is_held(&self, key: u16) -> bool {
        self.held.contains(&key)
    }
}

/// Per-category debouncing for every button-like [`InputEvent`].
///
/// Keyboard, mouse and gamepad buttons are tracked independently, so
/// keycode 1 and mouse button 1 never shadow each other.
#[derive(Debug, Default)]
pub struct EventDebouncer {
    keyboard: KeyDebouncer,
    mouse: KeyDebouncer,
    gamepad: KeyDebouncer,
}

impl EventDebouncer {
    /// Create a debouncer with nothing held.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the event if it should be forwarded, `None` if suppressed.
    pub fn apply(&mut self, event: InputEvent) -> Option<InputEvent> {
        let forward = match event {
            InputEvent::Keyboard { keycode, down } => self.keyboard.apply(keycode, down),
            InputEvent::MouseButton { id, down } => self.mouse.apply(id, down),
            InputEvent::GamepadButton { id, down } => self.gamepad.apply(id, down),
            InputEvent::MouseMove { .. }
            | InputEvent::MouseScroll { .. }
            | InputEvent::GamepadButtonValue { .. }
            | InputEvent::GamepadAxis { .. } => true,
        };
        forward.then_some(event)
    }
}
