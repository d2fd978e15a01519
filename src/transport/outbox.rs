use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tracing::debug;
use tracing::trace;

use crate::FrameSink;
use crate::OutboundFrame;

/// Slot for the currently open socket's outbound queue
#[derive(Debug, Default)]
pub struct Outbox {
    tx: Mutex<Option<mpsc::UnboundedSender<Message>>>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn attach(
        &self,
        tx: mpsc::UnboundedSender<Message>,
    ) {
        *self.tx.lock() = Some(tx);
    }

    pub(crate) fn detach(&self) {
        self.tx.lock().take();
    }

    pub fn is_open(&self) -> bool {
        self.tx.lock().as_ref().is_some_and(|tx| !tx.is_closed())
    }

    pub(crate) fn push(
        &self,
        message: Message,
    ) -> bool {
        match self.tx.lock().as_ref() {
            Some(tx) => tx.send(message).is_ok(),
            None => false,
        }
    }
}

impl FrameSink for Outbox {
    fn send(
        &self,
        frame: &OutboundFrame,
    ) -> bool {
        let text = match frame.to_json() {
            Ok(text) => text,
            Err(e) => {
                debug!(key = %frame.key, error = %e, "failed to encode write");
                return false;
            }
        };

        if !self.push(Message::Text(text)) {
            debug!(key = %frame.key, "no open socket, write dropped");
            return false;
        }
        trace!(key = %frame.key, "write queued");
        true
    }
}
