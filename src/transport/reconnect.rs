use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::trace;

/// Single-shot delay before the next connect attempt.
///
/// `schedule` while a timer is already pending is a no-op, so a burst of
/// close and error events still yields one reconnect. Each expiry sends one
/// `()` on the receiver returned from [`ReconnectTimer::new`].
#[derive(Debug)]
pub struct ReconnectTimer {
    delay: Duration,
    pending: Arc<AtomicBool>,
    trigger: mpsc::UnboundedSender<()>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl ReconnectTimer {
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<()>) {
        let (trigger, rx) = mpsc::unbounded_channel();
        let timer = Self {
            delay,
            pending: Arc::new(AtomicBool::new(false)),
            trigger,
            handle: Mutex::new(None),
        };
        (timer, rx)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Arms the timer. Returns `false` if one was already pending.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule(&self) -> bool {
        if self.pending.swap(true, Ordering::AcqRel) {
            trace!("reconnect already pending");
            return false;
        }

        let pending = self.pending.clone();
        let trigger = self.trigger.clone();
        let delay = self.delay;
        let handle = tokio::spawn(async move {
            sleep(delay).await;
            pending.store(false, Ordering::Release);
            let _ = trigger.send(());
        });
        *self.handle.lock() = Some(handle);
        true
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    pub fn cancel(&self) {
        if let Some(handle) = self.handle.lock().take() {
            handle.abort();
        }
        self.pending.store(false, Ordering::Release);
    }
}

impl Drop for ReconnectTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
