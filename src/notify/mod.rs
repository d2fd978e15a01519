//! Synchronous publish/subscribe
//!
//! Backs the per-entry update stream and the registry-wide events. Delivery
//! happens on the publishing thread, in subscription order, with no
//! batching. Callbacks run outside the internal lock, so a callback may
//! subscribe or drop its own [`Subscription`] while being notified.

#[cfg(test)]
mod notify_test;

use std::fmt;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Weak;

use parking_lot::Mutex;

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync + 'static>;

struct Slot<T> {
    id: u64,
    active: Arc<AtomicBool>,
    callback: Callback<T>,
}

struct Listeners<T> {
    slots: Mutex<Vec<Slot<T>>>,
    next_id: AtomicU64,
}

impl<T> Listeners<T> {
    fn remove(
        &self,
        id: u64,
    ) {
        self.slots.lock().retain(|slot| slot.id != id);
    }
}

/// Registry of callbacks interested in values of type `T`
pub struct Subscribers<T> {
    inner: Arc<Listeners<T>>,
}

impl<T: 'static> Subscribers<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Listeners {
                slots: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Registers `callback`; it stays attached until the returned
    /// [`Subscription`] is dropped or unsubscribed.
    pub fn subscribe<F>(
        &self,
        callback: F,
    ) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let active = Arc::new(AtomicBool::new(true));
        self.inner.slots.lock().push(Slot {
            id,
            active: active.clone(),
            callback: Arc::new(callback),
        });

        let listeners: Weak<Listeners<T>> = Arc::downgrade(&self.inner);
        Subscription {
            id,
            cancel: Some(Box::new(move || {
                active.store(false, Ordering::Release);
                if let Some(listeners) = listeners.upgrade() {
                    listeners.remove(id);
                }
            })),
        }
    }

    /// Delivers `value` to every live subscriber.
    ///
    /// A callback detached by an earlier callback of the same publish is
    /// skipped.
    pub fn publish(
        &self,
        value: &T,
    ) {
        let snapshot: Vec<(Arc<AtomicBool>, Callback<T>)> = self
            .inner
            .slots
            .lock()
            .iter()
            .map(|slot| (slot.active.clone(), slot.callback.clone()))
            .collect();
        for (active, callback) in snapshot {
            if active.load(Ordering::Acquire) {
                callback(value);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.inner.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: 'static> Default for Subscribers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Subscribers<T> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Subscribers")
            .field("len", &self.inner.slots.lock().len())
            .finish()
    }
}

/// Unsubscribe token
///
/// Dropping it detaches the callback. Detaching never affects the publisher
/// or other subscribers.
#[must_use = "dropping a Subscription immediately unsubscribes it"]
pub struct Subscription {
    id: u64,
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    /// Keeps the callback attached for the lifetime of the publisher.
    pub fn detach(mut self) {
        self.cancel.take();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.cancel.is_some())
            .finish()
    }
}
