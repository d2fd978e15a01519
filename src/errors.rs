//! Telemetry Mirror Error Hierarchy
//!
//! Nothing on the inbound path is fatal: malformed frames are dropped and
//! socket failures end in a reconnect. The types below surface from
//! configuration loading, history persistence and the connect step, which
//! the session loop logs before retrying.

use std::path::PathBuf;

use config::ConfigError;
use tokio_tungstenite::tungstenite;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration loading and validation failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// WebSocket connection failures
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Frames that do not match the bridge wire format
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// History list persistence failures
    #[error(transparent)]
    History(#[from] HistoryError),

    /// Log or history file access failures
    #[error(transparent)]
    File(#[from] FileError),

    #[error("Failed to install signal handler: {0}")]
    SignalHandler(#[source] std::io::Error),

    #[error("Failed to send shutdown signal: {0}")]
    SignalSenderClosed(String),
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Handshake or TCP connect failure
    #[error("WebSocket connect to {url} failed: {source}")]
    Connect {
        url: String,
        #[source]
        source: Box<tungstenite::Error>,
    },

    /// Read or write failure on an open socket
    #[error(transparent)]
    Socket(#[from] Box<tungstenite::Error>),

    /// `run` was called on a session whose loop is already running
    #[error("Transport session is already running")]
    AlreadyRunning,
}

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Payload is not a JSON object
    #[error("Frame is not a JSON object: {0}")]
    Json(#[from] serde_json::Error),

    /// `networkTableUpdate` is present but does not carry key/value/valueType
    #[error("Malformed telemetry update: {0}")]
    MalformedUpdate(#[source] serde_json::Error),

    /// Auxiliary payload could not be read into its typed view
    #[error("Malformed auto configuration: {0}")]
    MalformedAutoConfig(#[source] serde_json::Error),

    /// None of the recognized envelope fields is present
    #[error("Frame does not match any known envelope")]
    UnknownEnvelope,
}

#[derive(Debug, thiserror::Error)]
pub enum FileError {
    /// I/O failure tied to a specific file or directory
    #[error("Error occurred at path: {path}")]
    PathError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error(transparent)]
    File(#[from] FileError),

    /// Stored list is not valid JSON
    #[error("History file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Serialize(#[from] serde_json::Error),
}
