mod keycode;
mod manager;

pub use {
    keycode::{key_name, lookup_keycode},
    manager::{HotkeyAction, HotkeyFuture, HotkeyManager, action},
};
