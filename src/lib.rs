//! Client-side mirror of a robot's live NetworkTables telemetry bus.
//!
//! A [`TransportSession`] keeps a WebSocket open to the telemetry bridge and
//! feeds every frame into the [`Registry`], which owns one [`Entry`] per key
//! and a [`KeyTree`] over the `/`-delimited key space. Consumers subscribe to
//! entries, request writes back to the robot, and keep a per-key
//! [`HistoryLedger`] of what they wrote.

mod auto_config;
mod binding;
mod config;
mod entry;
mod errors;
mod history;
mod mirror;
mod notify;
mod protocol;
mod registry;
mod transport;
mod tree;
mod value;

pub mod constants;
pub mod utils;

pub use auto_config::*;
pub use binding::*;
pub use config::*;
pub use entry::*;
pub use errors::*;
pub use history::*;
pub use mirror::*;
pub use notify::*;
pub use protocol::*;
pub use registry::*;
pub use transport::*;
pub use tree::*;
pub use value::*;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub mod test_utils;
