//! Per-key log of values written through the mirror, newest first.
//!
//! Each record is labelled with the match it was made in, read from the
//! match-number entry at the moment of recording. Reverting is not a ledger
//! operation: the caller writes the record's value back through the entry,
//! which records it again.

mod store;
pub use store::*;


use std::sync::Arc;

use parking_lot::Mutex;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::warn;

use crate::constants::HISTORY_KEY_PREFIX;
use crate::constants::TESTING_LABEL;
use crate::utils::time::now_millis;
use crate::Entry;
use crate::HistoryConfig;
use crate::NtValue;
use crate::Registry;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub value: NtValue,
    /// Milliseconds since the Unix epoch
    pub timestamp: u64,
    pub label: String,
}

/// `"Match {n}"` for a positive whole match number, `"Testing"` otherwise.
pub fn history_label(match_number: Option<&NtValue>) -> String {
    match match_number.and_then(NtValue::as_positive_integer) {
        Some(n) => format!("Match {n}"),
        None => TESTING_LABEL.to_string(),
    }
}

pub(crate) fn storage_key(entry_key: &str) -> String {
    format!("{HISTORY_KEY_PREFIX}{entry_key}")
}

pub struct HistoryLedger {
    registry: Arc<Registry>,
    store: Arc<dyn HistoryStore>,
    match_number_key: String,
    max_records: usize,
    write_lock: Mutex<()>,
}

impl HistoryLedger {
    pub fn new(
        registry: Arc<Registry>,
        store: Arc<dyn HistoryStore>,
        config: &HistoryConfig,
    ) -> Self {
        Self {
            registry,
            store,
            match_number_key: config.match_number_key.clone(),
            max_records: config.max_records,
            write_lock: Mutex::new(()),
        }
    }

    /// Label a record made right now would get
    pub fn current_label(&self) -> String {
        let match_number = self
            .registry
            .entry(&self.match_number_key)
            .and_then(|e| e.latest_value())
            .map(|v| v.value);
        history_label(match_number.as_ref())
    }

    /// Prepends `value` to the entry's list. An absent entry is a no-op.
    pub fn record(
        &self,
        entry: Option<&Entry>,
        value: impl Into<NtValue>,
    ) -> Result<()> {
        let Some(entry) = entry else {
            return Ok(());
        };
        let record = HistoryRecord {
            value: value.into(),
            timestamp: now_millis(),
            label: self.current_label(),
        };

        let _guard = self.write_lock.lock();
        let mut records = self.load(entry.key());
        records.insert(0, record);
        if self.max_records > 0 && records.len() > self.max_records {
            records.truncate(self.max_records);
        }
        self.store.save(&storage_key(entry.key()), &records)?;
        debug!(key = entry.key(), count = records.len(), "recorded history");
        Ok(())
    }

    /// Records for the entry, newest first
    pub fn list(
        &self,
        entry: Option<&Entry>,
    ) -> Vec<HistoryRecord> {
        entry.map(|e| self.load(e.key())).unwrap_or_default()
    }

    pub fn has_history(
        &self,
        entry: Option<&Entry>,
    ) -> bool {
        !self.list(entry).is_empty()
    }

    pub fn clear(
        &self,
        entry: Option<&Entry>,
    ) -> Result<()> {
        let Some(entry) = entry else {
            return Ok(());
        };
        let _guard = self.write_lock.lock();
        self.store.remove(&storage_key(entry.key()))?;
        Ok(())
    }

    fn load(
        &self,
        entry_key: &str,
    ) -> Vec<HistoryRecord> {
        match self.store.load(&storage_key(entry_key)) {
            Ok(records) => records,
            Err(e) => {
                warn!(key = entry_key, error = %e, "unreadable history, treating as empty");
                Vec::new()
            }
        }
    }
}

impl std::fmt::Debug for HistoryLedger {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("HistoryLedger")
            .field("match_number_key", &self.match_number_key)
            .field("max_records", &self.max_records)
            .finish_non_exhaustive()
    }
}
