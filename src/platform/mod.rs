//! Platform host integrations.

pub mod connections;
pub mod input_decoder;
#[cfg(unix)]
pub mod process_host;

#[cfg(unix)]
pub use process_host::ProcessHost;
