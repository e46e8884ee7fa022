//! Key name <-> Windows virtual-key code table.
//!
//! The raw event source reports keyboard edges as virtual-key codes
//! (winuser.h). Names are matched case-insensitively.

/// Named keys outside the contiguous letter/digit/function ranges.
const NAMED_KEYS: &[(&str, u16)] = &[
    ("BACKSPACE", 0x08),
    ("TAB", 0x09),
    ("ENTER", 0x0D),
    ("RETURN", 0x0D),
    ("SHIFT", 0x10),
    ("CTRL", 0x11),
    ("CONTROL", 0x11),
    ("ALT", 0x12),
    ("PAUSE", 0x13),
    ("CAPSLOCK", 0x14),
    ("ESC", 0x1B),
    ("ESCAPE", 0x1B),
    ("SPACE", 0x20),
    ("PAGEUP", 0x21),
    ("PAGEDOWN", 0x22),
    ("END", 0x23),
    ("HOME", 0x24),
    ("LEFT", 0x25),
    ("UP", 0x26),
    ("RIGHT", 0x27),
    ("DOWN", 0x28),
    ("PRINTSCREEN", 0x2C),
    ("INSERT", 0x2D),
    ("DELETE", 0x2E),
    ("MULTIPLY", 0x6A),
    ("ADD", 0x6B),
    ("SUBTRACT", 0x6D),
    ("DECIMAL", 0x6E),
    ("DIVIDE", 0x6F),
    ("NUMLOCK", 0x90),
    ("SCROLLLOCK", 0x91),
    ("LSHIFT", 0xA0),
    ("RSHIFT", 0xA1),
    ("LCTRL", 0xA2),
    ("RCTRL", 0xA3),
    ("LALT", 0xA4),
    ("RALT", 0xA5),
];

const VK_0: u16 = 0x30;
const VK_A: u16 = 0x41;
const VK_NUMPAD0: u16 = 0x60;
const VK_F1: u16 = 0x70;

/// Resolve a key name (`"F4"`, `"a"`, `"Space"`, `"Numpad3"`) to its keycode.
pub fn lookup_keycode(name: &str) -> Option<u16> {
    let upper = name.trim().to_ascii_uppercase();

    if let &[c] = upper.as_bytes() {
        return match c {
            b'A'..=b'Z' => Some(VK_A + u16::from(c - b'A')),
            b'0'..=b'9' => Some(VK_0 + u16::from(c - b'0')),
            _ => None,
        };
    }

    if let Some(n) = upper.strip_prefix("NUMPAD")
        && let Ok(n @ 0..=9) = n.parse::<u16>()
    {
        return Some(VK_NUMPAD0 + n);
    }

    if let Some(n) = upper.strip_prefix('F')
        && let Ok(n @ 1..=24) = n.parse::<u16>()
    {
        return Some(VK_F1 + n - 1);
    }

    NAMED_KEYS
        .iter()
        .find(|(key, _)| *key == upper)
        .map(|&(_, code)| code)
}

/// Display name for `keycode`, used in log fields.
pub fn key_name(keycode: u16) -> Option<String> {
    match keycode {
        0x41..=0x5A => Some(char::from(b'A' + (keycode - VK_A) as u8).to_string()),
        0x30..=0x39 => Some(char::from(b'0' + (keycode - VK_0) as u8).to_string()),
        0x60..=0x69 => Some(format!("NUMPAD{}", keycode - VK_NUMPAD0)),
        0x70..=0x87 => Some(format!("F{}", keycode - VK_F1 + 1)),
        _ => NAMED_KEYS
            .iter()
            .find(|&&(_, code)| code == keycode)
            .map(|(name, _)| (*name).to_string()),
    }
}
