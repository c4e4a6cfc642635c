//! Terminal byte decoding into native host input.
//!
//! Navigation sequences become native key codes (down + up), printable text becomes
//! pre-resolved Unicode characters, and a lone ESC stands in for the back key.

use crate::core::host::{KeyState, NativeInput};
use crate::core::keys::native;

const ESC: u8 = 0x1b;
const CTRL_C: u8 = 0x03;

/// One decoded terminal occurrence.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Input(NativeInput),
    /// Ctrl-C while the terminal is raw.
    Interrupt,
}

fn key(code: i32) -> [Decoded; 2] {
    [
        Decoded::Input(NativeInput::Key {
            action: KeyState::Down,
            code,
            meta: 0,
        }),
        Decoded::Input(NativeInput::Key {
            action: KeyState::Up,
            code,
            meta: 0,
        }),
    ]
}

/// CSI final byte or `~`-terminated parameter to native key code.
fn csi_key(params: &[u8], terminator: u8) -> Option<i32> {
    match (params, terminator) {
        (b"", b'A') => Some(native::DPAD_UP),
        (b"", b'B') => Some(native::DPAD_DOWN),
        (b"", b'C') => Some(native::DPAD_RIGHT),
        (b"", b'D') => Some(native::DPAD_LEFT),
        (b"", b'H') | (b"1", b'~') | (b"7", b'~') => Some(native::MOVE_HOME),
        (b"", b'F') | (b"4", b'~') | (b"8", b'~') => Some(native::MOVE_END),
        (b"2", b'~') => Some(native::INSERT),
        (b"3", b'~') => Some(native::CLEAR),
        (b"5", b'~') => Some(native::PAGE_UP),
        (b"6", b'~') => Some(native::PAGE_DOWN),
        _ => None,
    }
}

/// Decode one chunk read from the terminal.
pub fn decode_input(bytes: &[u8]) -> Vec<Decoded> {
    let mut decoded = Vec::new();
    let mut index = 0;
    while index < bytes.len() {
        match bytes[index] {
            ESC => {
                let rest = &bytes[index + 1..];
                if let Some((consumed, code)) = decode_escape(rest) {
                    if let Some(code) = code {
                        decoded.extend(key(code));
                    }
                    index += 1 + consumed;
                } else {
                    decoded.extend(key(native::BACK));
                    index += 1;
                }
            }
            CTRL_C => {
                decoded.push(Decoded::Interrupt);
                index += 1;
            }
            b'\r' | b'\n' => {
                decoded.extend(key(native::ENTER));
                index += 1;
            }
            b'\t' => {
                decoded.extend(key(native::TAB));
                index += 1;
            }
            0x7f | 0x08 => {
                decoded.extend(key(native::DEL));
                index += 1;
            }
            byte if byte < 0x20 => index += 1,
            _ => {
                let start = index;
                while index < bytes.len() && bytes[index] >= 0x20 && bytes[index] != 0x7f {
                    index += 1;
                }
                let text = String::from_utf8_lossy(&bytes[start..index]);
                decoded.extend(
                    text.chars()
                        .map(|ch| Decoded::Input(NativeInput::UnicodeChar(ch as u32))),
                );
            }
        }
    }
    decoded
}

/// Parse the bytes after ESC. Returns bytes consumed and the key, if the sequence maps to one.
/// `None` means a lone ESC.
fn decode_escape(rest: &[u8]) -> Option<(usize, Option<i32>)> {
    let (&introducer, body) = rest.split_first()?;
    if introducer != b'[' && introducer != b'O' {
        return None;
    }
    let params_len = body
        .iter()
        .take_while(|byte| byte.is_ascii_digit() || **byte == b';')
        .count();
    let terminator = *body.get(params_len)?;
    let consumed = 1 + params_len + 1;
    Some((consumed, csi_key(&body[..params_len], terminator)))
}
