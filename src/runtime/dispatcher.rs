//! Consumer side: poll the host, apply lifecycle flags, route canonical events.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::core::event::{Event, KeyInput};
use crate::core::gateway::HostCaller;
use crate::core::host::Host;
use crate::core::keys::{translate, KeyAction};
use crate::runtime::bridge::{Bridge, PenQuery, KEY_QUEUE_CAPACITY};
use crate::runtime::state::RunState;

/// How [`Bridge::process_events`] waits before handling an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitFlag {
    /// Never block.
    Pump,
    /// Flush the screen and block until something arrives.
    Wait,
    /// Flush pending drawing and wait at most one wait quantum.
    Pause,
}

impl<H: Host> Bridge<H> {
    /// Drain native sources and apply lifecycle signals.
    ///
    /// Parks on the event buffer when `blocking` is set or the host window is unfocused, unless
    /// an event is already pending or the bridge is closing.
    pub fn poll_events(&mut self, blocking: bool) {
        self.poll_with_limit(blocking, None);
    }

    /// Like [`Bridge::poll_events`], parking for at most `limit` when a park is needed.
    pub(crate) fn poll_with_limit(&mut self, blocking: bool, limit: Option<Duration>) {
        self.host.pump_native();
        let park = (blocking || !self.shared.has_focus())
            && !self.shared.state.is_closing()
            && !self.shared.buffer.has_pending();
        if park {
            self.shared.buffer.wait(limit);
            self.host.pump_native();
        }
        self.apply_lifecycle();
    }

    fn apply_lifecycle(&mut self) {
        if self.shared.take_window_ready() {
            let (width, height) = self.host.surface_size();
            self.shared.set_viewport(width, height);
            if self.shared.state.construct() {
                info!(width, height, "bridge constructed");
                self.screen.resize(width, height);
            }
        }
        if self.shared.take_redraw_requested() {
            self.screen.redraw();
        }
        if self.shared.take_destroy_requested() {
            self.close();
        }
        if self.shared.has_pending_path() && self.shared.state.is_running() {
            debug!("breaking program for pending run path");
            self.shared.request_break();
        }
    }

    /// Pop and handle at most one event after waiting per `flag`.
    pub fn process_events(&mut self, flag: WaitFlag) -> Option<Event> {
        match flag {
            WaitFlag::Pump => self.poll_events(false),
            WaitFlag::Wait => {
                self.screen.flush(true);
                // A stale wake can end the park with nothing pending.
                loop {
                    self.poll_events(true);
                    if self.shared.buffer.has_pending() || self.is_closing() || self.is_break() {
                        break;
                    }
                }
            }
            WaitFlag::Pause => {
                self.screen.flush(false);
                let quantum = self.config.wait_quantum;
                self.poll_with_limit(true, Some(quantum));
            }
        }
        let event = self.shared.buffer.pop()?;
        self.process_event(&event);
        Some(event)
    }

    /// Sample the pointer after a zero-timeout pump.
    pub fn pen(&mut self, query: PenQuery) -> i32 {
        self.process_events(WaitFlag::Pump);
        match query {
            PenQuery::Down => i32::from(self.pointer.down),
            PenQuery::X => self.pointer.x,
            PenQuery::Y => self.pointer.y,
        }
    }

    /// Route one canonical event.
    pub fn process_event(&mut self, event: &Event) {
        match event {
            Event::ScreenChanged => {
                let (width, height) = self.shared.viewport();
                self.screen.resize(width, height);
            }
            Event::KeyPressed(input) => self.handle_key_pressed(input),
            Event::PointerPressed(touch) => {
                self.pointer.press(*touch);
                self.screen.handle_event(event);
            }
            Event::PointerDragged(touch) => {
                self.pointer.drag(*touch);
                self.screen.handle_event(event);
            }
            Event::PointerReleased(_) => {
                self.pointer.release();
                self.screen.handle_event(event);
            }
            Event::Close => self.close(),
            _ => self.screen.handle_event(event),
        }
    }

    fn handle_key_pressed(&mut self, input: &KeyInput) {
        let keypad_shown = self.keypad_active;
        let host = &self.host;
        let mut resolve =
            |code: i32, meta: i32| HostCaller::new(host).get_unicode_char(code, meta);
        let action = translate(input, keypad_shown, &mut resolve);

        match action {
            KeyAction::Back => self.handle_back(),
            KeyAction::HideKeypad => self.show_keypad(false),
            KeyAction::Menu(key) => {
                self.screen.show_menu();
                self.deliver_key(key);
            }
            KeyAction::Key(key) => self.deliver_key(key),
            KeyAction::Ignore => {}
        }
    }

    fn handle_back(&mut self) {
        match self.shared.state.current() {
            RunState::Running => {
                debug!("back pressed; breaking program");
                self.back_pressed = true;
                self.shared.request_break();
            }
            RunState::Modal => self.modal_cancelled = true,
            RunState::Edit => {
                self.shared.state.leave_edit();
            }
            RunState::Active => self.close(),
            RunState::Initial | RunState::Closing | RunState::Done => {}
        }
    }

    fn deliver_key(&mut self, key: i32) {
        match self.shared.state.current() {
            RunState::Running if self.keys.len() >= KEY_QUEUE_CAPACITY => {
                warn!(key, "key queue full; key dropped");
            }
            RunState::Running => self.keys.push_back(key),
            RunState::Edit => self.screen.handle_key(key),
            state => debug!(key, ?state, "key dropped"),
        }
    }
}
