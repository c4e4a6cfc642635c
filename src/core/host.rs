//! Host platform interface and lifecycle helpers.

use std::sync::Arc;

use crate::core::event::{ConnHandle, ConnectionEvent};
use crate::core::gateway::HostGateway;
use crate::core::sensor::{SensorKind, SensorReading};

/// Lifecycle signals. These never enter the event buffer; the listener folds them into
/// flags that the dispatcher applies on its next poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleCommand {
    WindowReady,
    GainedFocus,
    LostFocus,
    Resized { width: u32, height: u32 },
    DestroyRequested,
    /// Host asks the running program to stop and load `path` instead.
    RunPath(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionAction {
    Down,
    Move,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    Down,
    Up,
}

/// Raw input from the host, before canonicalisation.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeInput {
    Motion {
        action: MotionAction,
        x: i32,
        y: i32,
        pointer_id: i32,
    },
    Key {
        action: KeyState,
        code: i32,
        meta: i32,
    },
    /// Text committed by an input method, already a code point.
    UnicodeChar(u32),
    OptionSelected(i32),
    Sensor(SensorReading),
    Connection(ConnectionEvent),
    TextBox { result: i32, length: i32 },
    Bluetooth { state: i32 },
}

/// Callback interface registered once with the host. Called from host threads.
pub trait HostListener: Send + Sync {
    fn on_lifecycle(&self, command: LifecycleCommand);

    /// Returns `true` when the input was consumed.
    fn on_input(&self, input: NativeInput) -> bool;
}

/// Platform the bridge runs on.
pub trait Host: HostGateway {
    /// Register the listener and begin delivering callbacks.
    fn start(&mut self, listener: Arc<dyn HostListener>) -> std::io::Result<()>;

    /// Stop delivering callbacks and release platform resources.
    fn stop(&mut self) -> std::io::Result<()>;

    /// Drain native sources that must be pumped from the interpreter thread.
    fn pump_native(&mut self) {}

    /// Current surface size in pixels.
    fn surface_size(&self) -> (u32, u32);

    /// Open a connection. Completion is reported later as a `Connection` event.
    fn connect(&mut self, url: &str) -> Option<ConnHandle>;

    /// Request up to `max_len` bytes; completion arrives as a `Connection` read event.
    fn request_read(&mut self, handle: ConnHandle, max_len: usize);

    fn close_connection(&mut self, handle: ConnHandle);

    /// Start the sensor, returning its display name.
    fn enable_sensor(&mut self, kind: SensorKind) -> Option<String>;

    fn disable_sensor(&mut self);
}
