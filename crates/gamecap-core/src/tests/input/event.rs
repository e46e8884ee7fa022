use crate::input::{EventCategory, InputEvent, TimedEvent};

use serde_json::json;

/// WHAT: Each event kind maps to its log type and argument array
/// WHY: The session log format is consumed downstream and must stay stable
#[test]
fn given_each_event_kind_when_formatting_for_log_then_type_and_args_match() {
    // Given: One event of every kind
    let cases = [
        (InputEvent::MouseMove { dx: 4, dy: -2 }, "MOUSE_MOVE", json!([4, -2])),
        (
            InputEvent::MouseButton { id: 1, down: true },
            "MOUSE_BUTTON",
            json!([1, true]),
        ),
        (InputEvent::MouseScroll { amount: -120 }, "SCROLL", json!([-120])),
        (
            InputEvent::Keyboard {
                keycode: 0x41,
                down: false,
            },
            "KEYBOARD",
            json!([65, false]),
        ),
        (
            InputEvent::GamepadButton { id: 2, down: true },
            "GAMEPAD_BUTTON",
            json!([2, true]),
        ),
        (
            InputEvent::GamepadButtonValue { id: 6, value: 0.5 },
            "GAMEPAD_BUTTON_VALUE",
            json!([6, 0.5]),
        ),
        (
            InputEvent::GamepadAxis {
                axis: 1,
                value: -0.25,
            },
            "GAMEPAD_AXIS",
            json!([1, -0.25]),
        ),
    ];

    for (event, log_type, args) in cases {
        // When: Formatting the event
        // Then: Type and args match the log format
        assert_eq!(event.log_type(), log_type);
        assert_eq!(event.log_args(), args);
    }
}

/// WHAT: All gamepad variants route to the gamepad category
/// WHY: Handlers subscribe per device, not per event shape
#[test]
fn given_gamepad_events_when_categorized_then_gamepad() {
    // Given: Every gamepad variant
    let events = [
        InputEvent::GamepadButton { id: 0, down: true },
        InputEvent::GamepadButtonValue { id: 0, value: 1.0 },
        InputEvent::GamepadAxis {
            axis: 0,
            value: 0.0,
        },
    ];

    // When / Then: Each one is a gamepad event
    for event in events {
        assert_eq!(event.category(), EventCategory::Gamepad);
    }
}

/// WHAT: Only keyboard presses report a key press
/// WHY: Hotkeys fire on the down edge alone
#[test]
fn given_keyboard_edges_when_checking_key_press_then_only_down_matches() {
    // Given: A press, a release and a mouse click
    let press = InputEvent::Keyboard {
        keycode: 0x74,
        down: true,
    };
    let release = InputEvent::Keyboard {
        keycode: 0x74,
        down: false,
    };
    let click = InputEvent::MouseButton { id: 0x74, down: true };

    // When / Then: Only the press yields a keycode
    assert_eq!(press.key_press(), Some(0x74));
    assert_eq!(release.key_press(), None);
    assert_eq!(click.key_press(), None);
}

/// WHAT: Timed events deserialize from tagged JSON
/// WHY: Event sources may feed JSON lines
#[test]
#[allow(clippy::unwrap_used)]
fn given_tagged_json_when_deserialized_then_timed_event_matches() {
    // Given: A JSON encoded keyboard press
    let line = r#"{"timestamp":12.5,"event":{"type":"keyboard","keycode":65,"down":true}}"#;

    // When: Deserializing
    let parsed: TimedEvent = serde_json::from_str(line).unwrap();

    // Then: Fields match
    assert_eq!(parsed.timestamp, 12.5);
    assert_eq!(
        parsed.event,
        InputEvent::Keyboard {
            keycode: 65,
            down: true
        }
    );
}
