//! Event bridge between a callback-driven host and a cooperative BASIC interpreter loop.
//!
//! Invariant: the interpreter thread is the only consumer of the event buffer; host threads
//! only push events and set lifecycle flags through [`BridgeListener`].
//!
//! # Public API Overview
//! - Implement [`Host`] (and its [`HostGateway`]) for a platform, or use
//!   [`platform::ProcessHost`] on unix.
//! - Build a [`Bridge`] with a [`Screen`] and a [`BridgeConfig`], then [`Bridge::start`] it.
//! - Drive the interpreter with [`Bridge::process_events`], [`Bridge::pause`],
//!   [`Bridge::read_all`] and the `device` script module in [`script`].

pub mod config;
pub mod error;
pub mod logging;

pub mod core;
pub mod platform;
pub mod runtime;
pub mod script;

/// Configuration and logging setup.
pub use crate::config::{BridgeConfig, EnvConfig};
pub use crate::logging::init_logging;

/// Error types.
pub use crate::error::{ConnectionError, HostCallError, LoggingError};

/// Canonical events.
pub use crate::core::event::{
    ConnHandle, ConnOp, ConnectionEvent, Event, EventKind, KeyInput, Point, Touch,
};

/// Host platform interface.
pub use crate::core::gateway::{HostArg, HostCall, HostCaller, HostGateway, HostValue, ReturnKind};
pub use crate::core::host::{
    Host, HostListener, KeyState, LifecycleCommand, MotionAction, NativeInput,
};
pub use crate::core::screen::Screen;

/// Key translation.
pub use crate::core::keys::{translate, KeyAction};

/// Sensors.
pub use crate::core::sensor::{SensorKind, SensorReading, SensorSnapshot};

/// Runtime types.
pub use crate::runtime::{
    Bridge, BridgeHandle, BridgeListener, EventBuffer, PenQuery, PointerState, RunState,
    RunStateMachine, WaitExit, WaitFlag, WaitMode, WaitOutcome, KEY_QUEUE_CAPACITY,
};

/// Shell settings persistence.
pub use settings_store::{Settings, SettingsError, SettingsStore};
