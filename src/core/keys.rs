//! Native key code translation.
//!
//! Native codes follow the Android `KeyEvent` numbering that hosts report. Canonical codes are
//! what the interpreter key queue and the editor widget consume: printable characters are their
//! code point, control keys use ASCII, and navigation keys live in the `0xFF00` special range.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::core::event::KeyInput;

/// Host key codes.
pub mod native {
    pub const HOME: i32 = 3;
    pub const BACK: i32 = 4;
    pub const ENDCALL: i32 = 6;
    pub const DPAD_UP: i32 = 19;
    pub const DPAD_DOWN: i32 = 20;
    pub const DPAD_LEFT: i32 = 21;
    pub const DPAD_RIGHT: i32 = 22;
    pub const CLEAR: i32 = 28;
    pub const TAB: i32 = 61;
    pub const ENTER: i32 = 66;
    pub const DEL: i32 = 67;
    pub const MENU: i32 = 82;
    pub const PAGE_UP: i32 = 92;
    pub const PAGE_DOWN: i32 = 93;
    pub const ESCAPE: i32 = 111;
    pub const MOVE_HOME: i32 = 122;
    pub const MOVE_END: i32 = 123;
    pub const INSERT: i32 = 124;
    pub const NUMPAD_MULTIPLY: i32 = 155;
    pub const NUMPAD_SUBTRACT: i32 = 156;
    pub const NUMPAD_ADD: i32 = 157;
    /// Vendor keyboard "?" key that carries no Unicode mapping.
    pub const GBOARD_QUESTION: i32 = 274;

    pub const A: i32 = 29;
    pub const Z: i32 = 54;
    pub const DIGIT_0: i32 = 7;
    pub const DIGIT_9: i32 = 16;
    pub const SPACE: i32 = 62;
}

/// Canonical key codes.
pub mod canonical {
    pub const BACKSPACE: i32 = 8;
    pub const TAB: i32 = 9;
    pub const ENTER: i32 = 13;
    pub const ESCAPE: i32 = 27;
    pub const DELETE: i32 = 127;

    pub const PGUP: i32 = 0xFF01;
    pub const PGDN: i32 = 0xFF02;
    pub const UP: i32 = 0xFF03;
    pub const DN: i32 = 0xFF04;
    pub const LEFT: i32 = 0xFF05;
    pub const RIGHT: i32 = 0xFF06;
    pub const HOME: i32 = 0xFF07;
    pub const END: i32 = 0xFF08;
    pub const INSERT: i32 = 0xFF09;
    pub const MENU: i32 = 0xFF0A;
    pub const KP_HOME: i32 = 0xFF10;
    pub const KP_MUL: i32 = 0xFF11;
    pub const KP_PLUS: i32 = 0xFF12;
    pub const KP_MINUS: i32 = 0xFF13;
    pub const KP_DIV: i32 = 0xFF14;
}

/// Codes below this threshold may need a host round-trip to become a code point.
pub const PRINTABLE_THRESHOLD: i32 = 127;

/// Result of translating one key-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Canonical key to deliver to the interpreter or editor.
    Key(i32),
    /// Back/cancel with no keypad showing.
    Back,
    /// Back/cancel while the on-screen keypad is showing: hide it, nothing else.
    HideKeypad,
    /// Menu key: open the host menu and deliver the canonical menu key.
    Menu(i32),
    /// Swallowed (call-end, or a code that resolved to nothing).
    Ignore,
}

static KEY_TABLE: Lazy<HashMap<i32, i32>> = Lazy::new(|| {
    HashMap::from([
        (native::TAB, canonical::TAB),
        (native::HOME, canonical::KP_HOME),
        (native::MOVE_HOME, canonical::HOME),
        (native::MOVE_END, canonical::END),
        (native::INSERT, canonical::INSERT),
        (native::NUMPAD_MULTIPLY, canonical::KP_MUL),
        (native::NUMPAD_ADD, canonical::KP_PLUS),
        (native::NUMPAD_SUBTRACT, canonical::KP_MINUS),
        (native::PAGE_UP, canonical::PGUP),
        (native::PAGE_DOWN, canonical::PGDN),
        (native::DPAD_UP, canonical::UP),
        (native::DPAD_DOWN, canonical::DN),
        (native::DPAD_LEFT, canonical::LEFT),
        (native::DPAD_RIGHT, canonical::RIGHT),
        (native::CLEAR, canonical::DELETE),
        (native::DEL, canonical::BACKSPACE),
        (native::ENTER, canonical::ENTER),
        (native::ESCAPE, canonical::ESCAPE),
        (native::GBOARD_QUESTION, '?' as i32),
    ])
});

/// Table lookup only, without the Unicode fallback.
fn lookup(native_code: i32) -> Option<i32> {
    KEY_TABLE.get(&native_code).copied()
}

/// Translate a key-down into a [`KeyAction`].
///
/// `resolve(native, meta_state)` asks the host for the code point of a printable native key. It
/// is only invoked for codes below [`PRINTABLE_THRESHOLD`] that were not already resolved, so
/// input-method text never takes the round-trip twice. A `resolve` result of 0 means the host
/// had no character for the key.
pub fn translate(
    input: &KeyInput,
    keypad_shown: bool,
    resolve: &mut dyn FnMut(i32, i32) -> i32,
) -> KeyAction {
    let action = match (input.unicode, input.native_code) {
        (Some(0), _) => KeyAction::Ignore,
        (Some(ch), _) => KeyAction::Key(ch),
        (None, native::ENDCALL) => KeyAction::Ignore,
        (None, native::BACK) if keypad_shown => KeyAction::HideKeypad,
        (None, native::BACK) => KeyAction::Back,
        (None, native::MENU) => KeyAction::Menu(canonical::MENU),
        (None, code) => match lookup(code) {
            Some(key) => KeyAction::Key(key),
            None if code < PRINTABLE_THRESHOLD => match resolve(code, input.meta_state) {
                0 => KeyAction::Ignore,
                ch => KeyAction::Key(ch),
            },
            None => KeyAction::Key(code),
        },
    };
    tracing::debug!(native = input.native_code, ?action, "translated key");
    action
}

/// Fallback code point resolution for hosts without a keyboard map: US layout letters, digits
/// and space, honouring the shift bit of `meta_state`.
pub fn resolve_us_layout(native_code: i32, meta_state: i32) -> i32 {
    const META_SHIFT_ON: i32 = 0x1;
    let shifted = meta_state & META_SHIFT_ON != 0;
    match native_code {
        code @ native::A..=native::Z => {
            let base = if shifted { 'A' } else { 'a' } as i32;
            base + (code - native::A)
        }
        code @ native::DIGIT_0..=native::DIGIT_9 => '0' as i32 + (code - native::DIGIT_0),
        native::SPACE => ' ' as i32,
        _ => 0,
    }
}
