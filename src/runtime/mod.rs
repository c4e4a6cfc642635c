//! Event buffer, run-state machine, dispatcher and waits.

pub mod bridge;
pub mod buffer;
pub mod connection;
pub mod dispatcher;
pub mod listener;
pub mod state;
pub mod wait;

pub use bridge::{Bridge, BridgeHandle, PenQuery, PointerState, KEY_QUEUE_CAPACITY};
pub use buffer::EventBuffer;
pub use dispatcher::WaitFlag;
pub use listener::BridgeListener;
pub use state::{RunState, RunStateMachine};
pub use wait::{WaitExit, WaitMode, WaitOutcome};
