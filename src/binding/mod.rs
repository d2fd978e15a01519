//! Value holder for one consumer of an entry.
//!
//! A binding tracks the entry's current value through its own subscription
//! and pairs every write with a history record. Dropping the binding drops
//! the subscription.


use std::sync::Arc;

use parking_lot::RwLock;

use crate::Entry;
use crate::HistoryLedger;
use crate::HistoryRecord;
use crate::NtValue;
use crate::Result;
use crate::Subscription;

pub struct EntryBinding {
    entry: Option<Arc<Entry>>,
    value: Arc<RwLock<Option<NtValue>>>,
    _subscription: Option<Subscription>,
}

impl EntryBinding {
    pub fn new(entry: Option<Arc<Entry>>) -> Self {
        Self::with_callback(entry, |_| {})
    }

    /// Like [`new`](Self::new), also calling `on_change` after each update
    /// is applied to the binding.
    pub fn with_callback<F>(
        entry: Option<Arc<Entry>>,
        on_change: F,
    ) -> Self
    where
        F: Fn(&NtValue) + Send + Sync + 'static,
    {
        let initial = entry.as_ref().and_then(|e| e.latest_value()).map(|v| v.value);
        let value = Arc::new(RwLock::new(initial));

        let subscription = entry.as_ref().map(|e| {
            let value = value.clone();
            e.on_update(move |update| {
                *value.write() = Some(update.value.clone());
                on_change(&update.value);
            })
        });

        Self {
            entry,
            value,
            _subscription: subscription,
        }
    }

    /// Last value seen, `None` before the entry has one
    pub fn value(&self) -> Option<NtValue> {
        self.value.read().clone()
    }

    pub fn entry(&self) -> Option<&Arc<Entry>> {
        self.entry.as_ref()
    }

    /// Requests a write and records it in `ledger`.
    ///
    /// The record is kept whether or not the socket accepted the write.
    /// Returns whether the write was handed to an open socket.
    pub fn update(
        &self,
        value: impl Into<NtValue>,
        ledger: &HistoryLedger,
    ) -> Result<bool> {
        let Some(entry) = &self.entry else {
            return Ok(false);
        };
        let value = value.into();
        let sent = entry.request_write(value.clone());
        ledger.record(Some(entry.as_ref()), value)?;
        Ok(sent)
    }

    /// Writes a recorded value back. The revert is itself recorded.
    pub fn revert(
        &self,
        record: &HistoryRecord,
        ledger: &HistoryLedger,
    ) -> Result<bool> {
        self.update(record.value.clone(), ledger)
    }
}

impl std::fmt::Debug for EntryBinding {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("EntryBinding")
            .field("key", &self.entry.as_ref().map(|e| e.key().to_string()))
            .field("value", &*self.value.read())
            .finish()
    }
}
