//! Core interfaces and types.

pub mod event;
pub mod gateway;
pub mod host;
pub mod keys;
pub mod screen;
pub mod sensor;
