//! Producer side of the bridge: host callbacks become canonical events and lifecycle flags.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, info};

use crate::core::event::{Event, KeyInput, Point, Touch};
use crate::core::host::{HostListener, KeyState, LifecycleCommand, MotionAction, NativeInput};
use crate::core::keys::native;
use crate::core::sensor::SensorSnapshot;
use crate::runtime::buffer::EventBuffer;
use crate::runtime::state::RunStateMachine;

/// State shared between host threads and the interpreter thread.
#[derive(Default)]
pub struct BridgeShared {
    pub(crate) buffer: EventBuffer,
    pub(crate) state: RunStateMachine,
    pub(crate) sensor: SensorSnapshot,
    viewport: AtomicU64,
    has_focus: AtomicBool,
    window_ready: AtomicBool,
    destroy_requested: AtomicBool,
    redraw_requested: AtomicBool,
    break_requested: AtomicBool,
    pending_path: Mutex<Option<String>>,
}

impl BridgeShared {
    pub fn viewport(&self) -> (u32, u32) {
        let packed = self.viewport.load(Ordering::Acquire);
        ((packed >> 32) as u32, packed as u32)
    }

    /// Store a new viewport size, returning whether it differed from the previous one.
    pub(crate) fn set_viewport(&self, width: u32, height: u32) -> bool {
        let packed = (u64::from(width) << 32) | u64::from(height);
        self.viewport.swap(packed, Ordering::AcqRel) != packed
    }

    pub fn has_focus(&self) -> bool {
        self.has_focus.load(Ordering::Acquire)
    }

    pub(crate) fn take_window_ready(&self) -> bool {
        self.window_ready.swap(false, Ordering::AcqRel)
    }

    pub(crate) fn take_destroy_requested(&self) -> bool {
        self.destroy_requested.swap(false, Ordering::AcqRel)
    }

    pub(crate) fn take_redraw_requested(&self) -> bool {
        self.redraw_requested.swap(false, Ordering::AcqRel)
    }

    pub(crate) fn request_break(&self) {
        self.break_requested.store(true, Ordering::Release);
        self.buffer.wake();
    }

    pub(crate) fn is_break(&self) -> bool {
        self.break_requested.load(Ordering::Acquire)
    }

    pub(crate) fn clear_break(&self) {
        self.break_requested.store(false, Ordering::Release);
    }

    pub(crate) fn take_pending_path(&self) -> Option<String> {
        let mut pending = match self.pending_path.lock() {
            Ok(pending) => pending,
            Err(poisoned) => poisoned.into_inner(),
        };
        pending.take()
    }

    pub(crate) fn has_pending_path(&self) -> bool {
        let pending = match self.pending_path.lock() {
            Ok(pending) => pending,
            Err(poisoned) => poisoned.into_inner(),
        };
        pending.is_some()
    }

    fn set_pending_path(&self, path: String) {
        let mut pending = match self.pending_path.lock() {
            Ok(pending) => pending,
            Err(poisoned) => poisoned.into_inner(),
        };
        *pending = Some(path);
    }
}

/// [`HostListener`] registered with the host by [`crate::Bridge::start`].
#[derive(Clone)]
pub struct BridgeListener {
    shared: Arc<BridgeShared>,
}

impl BridgeListener {
    pub(crate) fn new(shared: Arc<BridgeShared>) -> Self {
        Self { shared }
    }

    fn accepts_input(&self) -> bool {
        self.shared.state.is_active()
    }

    fn on_resize(&self, width: u32, height: u32) {
        if self.shared.state.is_closing() || !self.shared.state.is_active() {
            debug!(width, height, "resize ignored outside an active bridge");
            return;
        }
        if self.shared.set_viewport(width, height) {
            debug!(width, height, "viewport resized");
            self.shared.buffer.push(Event::ScreenChanged);
        }
    }
}

impl HostListener for BridgeListener {
    fn on_lifecycle(&self, command: LifecycleCommand) {
        match command {
            LifecycleCommand::WindowReady => {
                info!("window ready");
                self.shared.window_ready.store(true, Ordering::Release);
                self.shared.buffer.wake();
            }
            LifecycleCommand::GainedFocus => {
                debug!("gained focus");
                self.shared.has_focus.store(true, Ordering::Release);
                self.shared.redraw_requested.store(true, Ordering::Release);
                self.shared.buffer.wake();
            }
            LifecycleCommand::LostFocus => {
                debug!("lost focus");
                self.shared.has_focus.store(false, Ordering::Release);
            }
            LifecycleCommand::Resized { width, height } => self.on_resize(width, height),
            LifecycleCommand::DestroyRequested => {
                info!("destroy requested");
                self.shared.destroy_requested.store(true, Ordering::Release);
                self.shared.buffer.wake();
            }
            LifecycleCommand::RunPath(path) => {
                info!(%path, "run path requested");
                self.shared.set_pending_path(path);
                self.shared.buffer.wake();
            }
        }
    }

    fn on_input(&self, input: NativeInput) -> bool {
        match input {
            NativeInput::Sensor(reading) => {
                self.shared.sensor.store(reading);
                true
            }
            NativeInput::OptionSelected(index) => {
                self.shared
                    .buffer
                    .push(Event::OptionsBoxButtonClicked(index));
                true
            }
            NativeInput::Connection(event) => {
                self.shared.buffer.push(Event::Connection(event));
                true
            }
            _ if !self.accepts_input() => false,
            NativeInput::Key {
                code: native::BACK,
                action,
                ..
            } => {
                if action == KeyState::Down {
                    self.shared
                        .buffer
                        .push(Event::KeyPressed(KeyInput::native(native::BACK, 0)));
                }
                true
            }
            NativeInput::Key { action, code, meta } => {
                let key = KeyInput::native(code, meta);
                let event = match action {
                    KeyState::Down => Event::KeyPressed(key),
                    KeyState::Up => Event::KeyReleased(key),
                };
                self.shared.buffer.push(event);
                true
            }
            NativeInput::UnicodeChar(ch) => {
                if self.shared.state.is_closing() {
                    return false;
                }
                self.shared
                    .buffer
                    .push(Event::KeyPressed(KeyInput::unicode(ch as i32)));
                true
            }
            NativeInput::Motion {
                action,
                x,
                y,
                pointer_id,
            } => {
                let touch = Touch {
                    point: Point::new(x, y),
                    touch_id: pointer_id,
                };
                let event = match action {
                    MotionAction::Down => Event::PointerPressed(touch),
                    MotionAction::Move => Event::PointerDragged(touch),
                    MotionAction::Up => Event::PointerReleased(touch),
                };
                self.shared.buffer.push(event);
                true
            }
            NativeInput::TextBox { result, length } => {
                self.shared.buffer.push(Event::TextBox { result, length });
                true
            }
            NativeInput::Bluetooth { state } => {
                self.shared.buffer.push(Event::Bluetooth { state });
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BridgeListener, BridgeShared};
    use crate::core::event::{Event, KeyInput, Point, Touch};
    use crate::core::host::{HostListener, KeyState, LifecycleCommand, MotionAction, NativeInput};
    use crate::core::keys::native;
    use std::sync::Arc;

    fn active_listener() -> (Arc<BridgeShared>, BridgeListener) {
        let shared = Arc::new(BridgeShared::default());
        shared.state.construct();
        (Arc::clone(&shared), BridgeListener::new(shared))
    }

    #[test]
    fn input_before_construction_is_dropped() {
        let shared = Arc::new(BridgeShared::default());
        let listener = BridgeListener::new(Arc::clone(&shared));
        let consumed = listener.on_input(NativeInput::Key {
            action: KeyState::Down,
            code: 45,
            meta: 0,
        });
        assert!(!consumed);
        assert!(shared.buffer.is_empty());
    }

    #[test]
    fn back_is_forwarded_on_key_down_only() {
        let (shared, listener) = active_listener();
        for action in [KeyState::Down, KeyState::Up] {
            listener.on_input(NativeInput::Key {
                action,
                code: native::BACK,
                meta: 3,
            });
        }
        assert_eq!(shared.buffer.len(), 1);
        assert_eq!(
            shared.buffer.pop(),
            Some(Event::KeyPressed(KeyInput::native(native::BACK, 0)))
        );
    }

    #[test]
    fn resize_enqueues_once_per_actual_change() {
        let (shared, listener) = active_listener();
        let resize = LifecycleCommand::Resized {
            width: 640,
            height: 480,
        };
        listener.on_lifecycle(resize.clone());
        assert_eq!(shared.viewport(), (640, 480));
        listener.on_lifecycle(resize);
        assert_eq!(shared.buffer.len(), 1);
        assert_eq!(shared.buffer.pop(), Some(Event::ScreenChanged));
    }

    #[test]
    fn motion_becomes_pointer_events() {
        let (shared, listener) = active_listener();
        listener.on_input(NativeInput::Motion {
            action: MotionAction::Move,
            x: 7,
            y: 11,
            pointer_id: 1,
        });
        assert_eq!(
            shared.buffer.pop(),
            Some(Event::PointerDragged(Touch {
                point: Point::new(7, 11),
                touch_id: 1,
            }))
        );
    }

    #[test]
    fn focus_and_destroy_set_flags() {
        let (shared, listener) = active_listener();
        assert!(!shared.has_focus());
        listener.on_lifecycle(LifecycleCommand::GainedFocus);
        assert!(shared.has_focus());
        assert!(shared.take_redraw_requested());
        listener.on_lifecycle(LifecycleCommand::LostFocus);
        assert!(!shared.has_focus());

        listener.on_lifecycle(LifecycleCommand::DestroyRequested);
        assert!(shared.take_destroy_requested());
        assert!(!shared.take_destroy_requested());
    }

    #[test]
    fn unicode_char_is_pre_resolved() {
        let (shared, listener) = active_listener();
        listener.on_input(NativeInput::UnicodeChar(0x00e9));
        assert_eq!(
            shared.buffer.pop(),
            Some(Event::KeyPressed(KeyInput::unicode(0x00e9)))
        );
    }
}
