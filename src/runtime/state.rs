//! Run-state machine.
//!
//! ```text
//! Initial -> Active <-> Running
//!            Active <-> Edit
//!   Active/Running -> Modal -> (prior)
//!   any (except Done) -> Closing -> Done
//! ```
//!
//! Invalid transitions are ignored and logged at debug level.

use std::sync::atomic::{AtomicU8, Ordering};

use tracing::debug;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Initial = 0,
    Active = 1,
    Running = 2,
    Modal = 3,
    Edit = 4,
    Closing = 5,
    Done = 6,
}

impl RunState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => RunState::Initial,
            1 => RunState::Active,
            2 => RunState::Running,
            3 => RunState::Modal,
            4 => RunState::Edit,
            5 => RunState::Closing,
            _ => RunState::Done,
        }
    }
}

#[derive(Debug)]
pub struct RunStateMachine {
    state: AtomicU8,
}

impl Default for RunStateMachine {
    fn default() -> Self {
        Self {
            state: AtomicU8::new(RunState::Initial as u8),
        }
    }
}

impl RunStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> RunState {
        RunState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Apply `next` atomically, returning the prior state when the transition was taken.
    fn transition(
        &self,
        name: &str,
        next: impl Fn(RunState) -> Option<RunState>,
    ) -> Option<RunState> {
        let result = self
            .state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |raw| {
                next(RunState::from_u8(raw)).map(|state| state as u8)
            });
        match result {
            Ok(prior) => {
                let prior = RunState::from_u8(prior);
                debug!(transition = name, ?prior, "run state");
                Some(prior)
            }
            Err(raw) => {
                debug!(
                    transition = name,
                    state = ?RunState::from_u8(raw),
                    "ignored invalid run state transition"
                );
                None
            }
        }
    }

    /// First surface-ready signal. Duplicates are ignored.
    pub fn construct(&self) -> bool {
        self.transition("construct", |state| match state {
            RunState::Initial => Some(RunState::Active),
            _ => None,
        })
        .is_some()
    }

    pub fn start_program(&self) -> bool {
        self.transition("start_program", |state| match state {
            RunState::Active => Some(RunState::Running),
            _ => None,
        })
        .is_some()
    }

    pub fn halt_program(&self) -> bool {
        self.transition("halt_program", |state| match state {
            RunState::Running => Some(RunState::Active),
            _ => None,
        })
        .is_some()
    }

    /// Enter a modal wait, returning the state to restore afterwards.
    pub fn enter_modal(&self) -> Option<RunState> {
        self.transition("enter_modal", |state| match state {
            RunState::Active | RunState::Running => Some(RunState::Modal),
            _ => None,
        })
    }

    /// Leave a modal wait. Only applies while still Modal, so Closing is never overridden.
    pub fn leave_modal(&self, prior: RunState) -> bool {
        let restored = match prior {
            RunState::Active | RunState::Running => prior,
            _ => RunState::Active,
        };
        self.transition("leave_modal", |state| match state {
            RunState::Modal => Some(restored),
            _ => None,
        })
        .is_some()
    }

    pub fn enter_edit(&self) -> bool {
        self.transition("enter_edit", |state| match state {
            RunState::Active => Some(RunState::Edit),
            _ => None,
        })
        .is_some()
    }

    pub fn leave_edit(&self) -> bool {
        self.transition("leave_edit", |state| match state {
            RunState::Edit => Some(RunState::Active),
            _ => None,
        })
        .is_some()
    }

    /// Irreversible. Allowed from every state except Done.
    pub fn close(&self) -> bool {
        self.transition("close", |state| match state {
            RunState::Closing | RunState::Done => None,
            _ => Some(RunState::Closing),
        })
        .is_some()
    }

    pub fn finish(&self) -> bool {
        self.transition("finish", |state| match state {
            RunState::Closing => Some(RunState::Done),
            _ => None,
        })
        .is_some()
    }

    /// Input is accepted in these states.
    pub fn is_active(&self) -> bool {
        matches!(
            self.current(),
            RunState::Active | RunState::Running | RunState::Modal | RunState::Edit
        )
    }

    pub fn is_running(&self) -> bool {
        self.current() == RunState::Running
    }

    pub fn is_closing(&self) -> bool {
        matches!(self.current(), RunState::Closing | RunState::Done)
    }
}
