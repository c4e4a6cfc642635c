//! Canonical events handed from host producers to the interpreter thread.

use crate::core::sensor::SensorReading;

/// Screen position in surface pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A touch sample. `touch_id` 0 is the primary pointer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Touch {
    pub point: Point,
    pub touch_id: i32,
}

/// Key payload.
///
/// - `native_code` is the host key code, or the code point itself when the host already
///   resolved the character (input-method text).
/// - `unicode` is `Some` when a prior Unicode-resolution step produced the character, which
///   suppresses the secondary host lookup during translation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyInput {
    pub native_code: i32,
    pub unicode: Option<i32>,
    pub meta_state: i32,
}

impl KeyInput {
    pub const fn native(native_code: i32, meta_state: i32) -> Self {
        Self {
            native_code,
            unicode: None,
            meta_state,
        }
    }

    pub const fn unicode(code_point: i32) -> Self {
        Self {
            native_code: code_point,
            unicode: Some(code_point),
            meta_state: 0,
        }
    }
}

/// Opaque host connection handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnOp {
    Connect,
    Read,
}

/// Completion of an asynchronous connection operation.
///
/// `result` > 0 means success (bytes read for [`ConnOp::Read`]); 0 is end of stream; negative
/// values are host error codes. `data` carries the chunk for successful reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionEvent {
    pub handle: ConnHandle,
    pub op: ConnOp,
    pub result: i32,
    pub data: Vec<u8>,
}

impl ConnectionEvent {
    pub fn connected(handle: ConnHandle, ok: bool) -> Self {
        Self {
            handle,
            op: ConnOp::Connect,
            result: if ok { 1 } else { -1 },
            data: Vec::new(),
        }
    }

    pub fn chunk(handle: ConnHandle, data: Vec<u8>) -> Self {
        Self {
            handle,
            op: ConnOp::Read,
            result: i32::try_from(data.len()).unwrap_or(i32::MAX),
            data,
        }
    }

    pub fn end_of_stream(handle: ConnHandle) -> Self {
        Self {
            handle,
            op: ConnOp::Read,
            result: 0,
            data: Vec::new(),
        }
    }

    pub fn read_error(handle: ConnHandle, code: i32) -> Self {
        Self {
            handle,
            op: ConnOp::Read,
            result: code.min(-1),
            data: Vec::new(),
        }
    }
}

/// Discriminant of [`Event`], used by modal waits and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    KeyPressed,
    KeyReleased,
    PointerPressed,
    PointerDragged,
    PointerReleased,
    ScreenChanged,
    Close,
    FocusGained,
    FocusLost,
    Char,
    Connection,
    Sensor,
    OptionsBoxButtonClicked,
    TextBox,
    Bluetooth,
}

/// Canonical event. Moved into the buffer by a producer and out of it by the consumer.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    KeyPressed(KeyInput),
    KeyReleased(KeyInput),
    PointerPressed(Touch),
    PointerDragged(Touch),
    PointerReleased(Touch),
    ScreenChanged,
    Close,
    FocusGained,
    FocusLost,
    Char(u32),
    Connection(ConnectionEvent),
    Sensor(SensorReading),
    OptionsBoxButtonClicked(i32),
    TextBox { result: i32, length: i32 },
    Bluetooth { state: i32 },
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::KeyPressed(_) => EventKind::KeyPressed,
            Event::KeyReleased(_) => EventKind::KeyReleased,
            Event::PointerPressed(_) => EventKind::PointerPressed,
            Event::PointerDragged(_) => EventKind::PointerDragged,
            Event::PointerReleased(_) => EventKind::PointerReleased,
            Event::ScreenChanged => EventKind::ScreenChanged,
            Event::Close => EventKind::Close,
            Event::FocusGained => EventKind::FocusGained,
            Event::FocusLost => EventKind::FocusLost,
            Event::Char(_) => EventKind::Char,
            Event::Connection(_) => EventKind::Connection,
            Event::Sensor(_) => EventKind::Sensor,
            Event::OptionsBoxButtonClicked(_) => EventKind::OptionsBoxButtonClicked,
            Event::TextBox { .. } => EventKind::TextBox,
            Event::Bluetooth { .. } => EventKind::Bluetooth,
        }
    }

    pub fn touch(&self) -> Option<Touch> {
        match self {
            Event::PointerPressed(touch)
            | Event::PointerDragged(touch)
            | Event::PointerReleased(touch) => Some(*touch),
            _ => None,
        }
    }

    /// Connection completions for `handle`, used to restrict modal waits.
    pub fn is_connection_for(&self, handle: ConnHandle) -> bool {
        matches!(self, Event::Connection(conn) if conn.handle == handle)
    }
}
