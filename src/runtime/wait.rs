//! Pause/wait controller and modal waits.

use std::thread;
use std::time::{Duration, Instant};

use crate::core::event::Event;
use crate::core::host::Host;
use crate::runtime::bridge::Bridge;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitMode {
    /// Block until one event arrives and process it.
    UntilEvent,
    /// Pump for the given duration. Zero is a single non-blocking pump.
    For(Duration),
    /// Pump until a break is requested or the bridge closes.
    UntilBreak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitExit {
    Event,
    Elapsed,
    Break,
    Closing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOutcome {
    /// Events processed while waiting.
    pub processed: usize,
    pub exit: WaitExit,
}

impl<H: Host> Bridge<H> {
    pub fn pause(&mut self, mode: WaitMode) -> WaitOutcome {
        match mode {
            WaitMode::UntilEvent => self.wait_for_one(),
            WaitMode::For(duration) if duration.is_zero() => self.pump_once(),
            WaitMode::For(duration) => self.pump_for(Some(duration)),
            WaitMode::UntilBreak => self.pump_for(None),
        }
    }

    fn outcome(processed: usize, exit: WaitExit) -> WaitOutcome {
        WaitOutcome { processed, exit }
    }

    fn wait_for_one(&mut self) -> WaitOutcome {
        self.screen.flush(true);
        loop {
            if self.is_closing() {
                return Self::outcome(0, WaitExit::Closing);
            }
            self.poll_events(true);
            if let Some(event) = self.shared.buffer.pop() {
                self.process_event(&event);
                return Self::outcome(1, WaitExit::Event);
            }
            if self.is_break() {
                return Self::outcome(0, WaitExit::Break);
            }
        }
    }

    fn pump_once(&mut self) -> WaitOutcome {
        self.poll_events(false);
        match self.shared.buffer.pop() {
            Some(event) => {
                self.process_event(&event);
                Self::outcome(1, WaitExit::Event)
            }
            None => Self::outcome(0, WaitExit::Elapsed),
        }
    }

    fn pump_for(&mut self, duration: Option<Duration>) -> WaitOutcome {
        let started = Instant::now();
        let mut processed = 0;
        loop {
            if self.is_closing() {
                return Self::outcome(processed, WaitExit::Closing);
            }
            let remaining = duration.map(|duration| duration.saturating_sub(started.elapsed()));
            let park_limit = Some(remaining.map_or(self.config.wait_quantum, |remaining| {
                remaining.min(self.config.wait_quantum)
            }));
            self.poll_with_limit(false, park_limit);
            if self.is_break() {
                return Self::outcome(processed, WaitExit::Break);
            }
            if let Some(event) = self.shared.buffer.pop() {
                self.process_event(&event);
                processed += 1;
            }
            let remaining = match duration {
                Some(duration) => {
                    let elapsed = started.elapsed();
                    if elapsed >= duration {
                        return Self::outcome(processed, WaitExit::Elapsed);
                    }
                    duration - elapsed
                }
                None => self.config.wait_quantum,
            };
            if !self.shared.buffer.has_pending() {
                thread::sleep(remaining.min(self.config.wait_quantum));
            }
        }
    }

    /// Modal wait: pump until an event matching `target` arrives and return it.
    ///
    /// Other events are processed normally. Returns `None` when the bridge starts closing or the
    /// wait is cancelled with back. A break request does not end a modal wait.
    pub fn wait_for(&mut self, mut target: impl FnMut(&Event) -> bool) -> Option<Event> {
        loop {
            if self.is_closing() || std::mem::take(&mut self.modal_cancelled) {
                return None;
            }
            let poll = self.config.modal_poll;
            self.poll_with_limit(false, Some(poll));
            // The poll may have applied a destroy request.
            if self.is_closing() {
                return None;
            }
            match self.shared.buffer.pop() {
                Some(event) if target(&event) => return Some(event),
                Some(event) => self.process_event(&event),
                None => {
                    self.shared.buffer.wait(Some(poll));
                }
            }
        }
    }
}
