//! Cross-thread event buffer.
//!
//! Producers push from any thread; the single consumer pops. Retrieval is last-in-first-out:
//! the most recently pushed event is handed out first.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::core::event::Event;

#[derive(Default)]
struct BufferState {
    events: Vec<Event>,
    woken: bool,
}

#[derive(Default)]
pub struct EventBuffer {
    state: Mutex<BufferState>,
    cvar: Condvar,
    pending: AtomicUsize,
}

impl EventBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BufferState> {
        match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn push(&self, event: Event) {
        let mut state = self.lock();
        state.events.push(event);
        self.pending.store(state.events.len(), Ordering::Release);
        self.cvar.notify_one();
    }

    pub fn pop(&self) -> Option<Event> {
        let mut state = self.lock();
        let event = state.events.pop();
        self.pending.store(state.events.len(), Ordering::Release);
        event
    }

    /// Lock-free check used by the poll loop.
    pub fn has_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire) > 0
    }

    pub fn len(&self) -> usize {
        self.lock().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Park until an event is pending, [`EventBuffer::wake`] is called, or `timeout` elapses.
    /// `None` waits without a deadline. Returns whether an event is pending.
    pub fn wait(&self, timeout: Option<Duration>) -> bool {
        let deadline = timeout.map(|timeout| Instant::now() + timeout);
        let mut state = self.lock();
        while state.events.is_empty() && !state.woken {
            state = match deadline {
                None => self
                    .cvar
                    .wait(state)
                    .unwrap_or_else(|poisoned| poisoned.into_inner()),
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        break;
                    }
                    match self.cvar.wait_timeout(state, deadline - now) {
                        Ok((state, _)) => state,
                        Err(poisoned) => poisoned.into_inner().0,
                    }
                }
            };
        }
        state.woken = false;
        !state.events.is_empty()
    }

    /// Unpark the consumer without delivering an event.
    pub fn wake(&self) {
        let mut state = self.lock();
        state.woken = true;
        self.cvar.notify_all();
    }

    /// Drop every pending event.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.events.clear();
        self.pending.store(0, Ordering::Release);
    }
}
