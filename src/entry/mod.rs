//! Unit of synchronized state for one fully-qualified key.

#[cfg(test)]
mod entry_test;

use std::fmt;
use std::sync::Arc;

#[cfg(test)]
use mockall::automock;
use parking_lot::RwLock;
use tracing::debug;
use tracing::trace;

use crate::constants::KEY_SEPARATOR;
use crate::constants::UNKNOWN_VALUE_TYPE;
use crate::NtValue;
use crate::OutboundFrame;
use crate::Subscribers;
use crate::Subscription;
use crate::TaggedValue;

/// Outbound path from an entry to the bridge
#[cfg_attr(test, automock)]
pub trait FrameSink: Send + Sync + 'static {
    /// Hands `frame` to the open socket. Returns `false` when it was dropped.
    fn send(
        &self,
        frame: &OutboundFrame,
    ) -> bool;
}

pub struct Entry {
    key: String,
    latest: RwLock<Option<TaggedValue>>,
    updates: Subscribers<TaggedValue>,
    sink: Arc<dyn FrameSink>,
}

impl Entry {
    pub(crate) fn new(
        key: impl Into<String>,
        sink: Arc<dyn FrameSink>,
    ) -> Self {
        Self {
            key: key.into(),
            latest: RwLock::new(None),
            updates: Subscribers::new(),
            sink,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Last key segment, e.g. `RPM` for `/Shooter/RPM`
    pub fn title(&self) -> &str {
        self.segments().next_back().unwrap_or("")
    }

    /// Second-to-last key segment, e.g. `Shooter` for `/Shooter/RPM`
    pub fn parent_title(&self) -> Option<&str> {
        self.segments().rev().nth(1)
    }

    fn segments(&self) -> impl DoubleEndedIterator<Item = &str> {
        self.key.split(KEY_SEPARATOR).filter(|s| !s.is_empty())
    }

    pub fn latest_value(&self) -> Option<TaggedValue> {
        self.latest.read().clone()
    }

    pub fn has_value(&self) -> bool {
        self.latest.read().is_some()
    }

    /// Subscribes to every value applied from now on.
    pub fn on_update<F>(
        &self,
        callback: F,
    ) -> Subscription
    where
        F: Fn(&TaggedValue) + Send + Sync + 'static,
    {
        self.updates.subscribe(callback)
    }

    pub fn subscriber_count(&self) -> usize {
        self.updates.len()
    }

    /// Replaces the latest value and notifies subscribers before returning.
    pub(crate) fn apply_inbound(
        &self,
        update: TaggedValue,
    ) {
        *self.latest.write() = Some(update.clone());
        trace!(key = %self.key, value = %update.value, "applied inbound value");
        self.updates.publish(&update);
    }

    /// Sends `value` to the bridge without touching the local value.
    ///
    /// The authoritative value only changes when the bridge echoes the write
    /// back. Returns whether the transport accepted the frame; a write while
    /// disconnected is dropped.
    pub fn request_write(
        &self,
        value: impl Into<NtValue>,
    ) -> bool {
        let value_type = self
            .latest
            .read()
            .as_ref()
            .map(|latest| latest.value_type.clone())
            .unwrap_or_else(|| UNKNOWN_VALUE_TYPE.to_string());

        let frame = OutboundFrame {
            key: self.key.clone(),
            value_type,
            value: value.into(),
        };

        let accepted = self.sink.send(&frame);
        if !accepted {
            debug!(key = %self.key, "write dropped, socket not open");
        }
        accepted
    }
}

impl fmt::Debug for Entry {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Entry")
            .field("key", &self.key)
            .field("latest", &*self.latest.read())
            .field("subscribers", &self.updates.len())
            .finish()
    }
}
