use parking_lot::Mutex;

use crate::FrameSink;
use crate::OutboundFrame;

/// Sink that keeps every frame it is handed
///
/// `connected` starts true; flip it to simulate a closed socket.
pub struct RecordingSink {
    pub frames: Mutex<Vec<OutboundFrame>>,
    pub connected: Mutex<bool>,
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self {
            frames: Mutex::new(Vec::new()),
            connected: Mutex::new(true),
        }
    }
}

impl RecordingSink {
    pub fn disconnect(&self) {
        *self.connected.lock() = false;
    }

    pub fn sent(&self) -> Vec<OutboundFrame> {
        self.frames.lock().clone()
    }
}

impl FrameSink for RecordingSink {
    fn send(
        &self,
        frame: &OutboundFrame,
    ) -> bool {
        if !*self.connected.lock() {
            return false;
        }
        self.frames.lock().push(frame.clone());
        true
    }
}
