//! WebSocket link to the telemetry bridge.
//!
//! One [`TransportSession`] owns the connection lifecycle. Entries reach the
//! socket through the shared [`Outbox`], which only holds a sender while a
//! socket is open. A closed socket arms the [`ReconnectTimer`]; at most one
//! reconnect is ever pending.

mod outbox;
mod reconnect;
mod session;
pub use outbox::*;
pub use reconnect::*;
pub use session::*;
