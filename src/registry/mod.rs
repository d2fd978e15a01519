//! Process-wide owner of entries, the key tree and the auxiliary caches.
//!
//! # Inbound dispatch
//!
//! ```text
//! TransportSession::on_message -> parse_frame -> Registry::handle_frame
//!     Telemetry:   get_or_create_entry -> first value? -> Entry::apply_inbound
//!                  -> KeyTree::insert -> (first value) new-entry event
//!     AutoConfigs: cache verbatim -> auto-config event
//! ```
//!
//! Frames are applied in arrival order with no coalescing, and every
//! subscriber callback runs before `handle_frame` returns.


use std::sync::Arc;
use std::time::Duration;
use std::time::SystemTime;

use dashmap::DashMap;
use parking_lot::Mutex;
use parking_lot::RwLock;
use serde_json::Value;
use tracing::debug;
use tracing::info;

use crate::constants::DEFAULT_STALE_AFTER_IN_MS;
use crate::AutoConfig;
use crate::Entry;
use crate::FrameSink;
use crate::InboundFrame;
use crate::KeyTree;
use crate::NtUpdate;
use crate::ProtocolError;
use crate::Subscribers;
use crate::Subscription;

/// How recently the bridge delivered a parseable frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameFreshness {
    Recent,
    Stale,
    Never,
}

pub struct Registry {
    entries: DashMap<String, Arc<Entry>>,
    tree: RwLock<KeyTree>,
    new_entries: Subscribers<Arc<Entry>>,
    auto_configs: RwLock<Option<Value>>,
    auto_config_updates: Subscribers<Value>,
    last_frame_at: Mutex<Option<SystemTime>>,
    stale_after: Duration,
    sink: Arc<dyn FrameSink>,
}

impl Registry {
    pub fn new(sink: Arc<dyn FrameSink>) -> Self {
        Self {
            entries: DashMap::new(),
            tree: RwLock::new(KeyTree::root()),
            new_entries: Subscribers::new(),
            auto_configs: RwLock::new(None),
            auto_config_updates: Subscribers::new(),
            last_frame_at: Mutex::new(None),
            stale_after: Duration::from_millis(DEFAULT_STALE_AFTER_IN_MS),
            sink,
        }
    }

    /// Overrides the threshold after which [`freshness`](Self::freshness)
    /// reports `Stale`.
    pub fn with_stale_after(
        mut self,
        stale_after: Duration,
    ) -> Self {
        self.stale_after = stale_after;
        self
    }

    /// Returns the entry for `key`, creating it on first use.
    ///
    /// The same instance is returned for the lifetime of the registry.
    pub fn get_or_create_entry(
        &self,
        key: &str,
    ) -> Arc<Entry> {
        if let Some(entry) = self.entries.get(key) {
            return entry.clone();
        }
        self.entries
            .entry(key.to_string())
            .or_insert_with(|| {
                debug!(key, "created entry");
                Arc::new(Entry::new(key, self.sink.clone()))
            })
            .clone()
    }

    /// Looks up an entry without creating it.
    pub fn entry(
        &self,
        key: &str,
    ) -> Option<Arc<Entry>> {
        self.entries.get(key).map(|e| e.clone())
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }

    /// Fires once per key, when that key receives its first value.
    pub fn on_new_entry_observed<F>(
        &self,
        callback: F,
    ) -> Subscription
    where
        F: Fn(&Arc<Entry>) + Send + Sync + 'static,
    {
        self.new_entries.subscribe(callback)
    }

    /// Dispatches one parsed frame and records its arrival time.
    pub fn handle_frame(
        &self,
        frame: InboundFrame,
    ) {
        *self.last_frame_at.lock() = Some(SystemTime::now());

        match frame {
            InboundFrame::Telemetry(update) => self.apply_update(update),
            InboundFrame::AutoConfigs(configs) => self.store_auto_configs(configs),
        }
    }

    /// Applies one telemetry update.
    pub fn apply_update(
        &self,
        update: NtUpdate,
    ) {
        let entry = self.get_or_create_entry(&update.key);
        let is_first_value = !entry.has_value();

        entry.apply_inbound(update.tagged_value());
        self.tree.write().insert(&entry, &update.key);

        if is_first_value {
            debug!(key = %update.key, value_type = %update.value_type, "new entry observed");
            self.new_entries.publish(&entry);
        }
    }

    pub fn on_auto_configs<F>(
        &self,
        callback: F,
    ) -> Subscription
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.auto_config_updates.subscribe(callback)
    }

    pub(crate) fn store_auto_configs(
        &self,
        configs: Value,
    ) {
        info!("received auto configurations");
        *self.auto_configs.write() = Some(configs.clone());
        self.auto_config_updates.publish(&configs);
    }

    /// Last auxiliary auto configuration, exactly as received
    pub fn auto_configs(&self) -> Option<Value> {
        self.auto_configs.read().clone()
    }

    /// Typed view of [`auto_configs`](Self::auto_configs)
    pub fn auto_config(&self) -> Option<Result<AutoConfig, ProtocolError>> {
        self.auto_configs.read().as_ref().map(AutoConfig::from_value)
    }

    /// Time of the last frame that parsed, whether or not it changed anything
    pub fn last_successful_frame_time(&self) -> Option<SystemTime> {
        *self.last_frame_at.lock()
    }

    pub fn freshness(&self) -> FrameFreshness {
        self.freshness_at(SystemTime::now())
    }

    pub fn freshness_at(
        &self,
        now: SystemTime,
    ) -> FrameFreshness {
        match self.last_successful_frame_time() {
            None => FrameFreshness::Never,
            Some(at) => {
                let age = now.duration_since(at).unwrap_or_default();
                if age > self.stale_after {
                    FrameFreshness::Stale
                } else {
                    FrameFreshness::Recent
                }
            }
        }
    }

    /// Runs `f` with read access to the key tree.
    pub fn with_tree<R>(
        &self,
        f: impl FnOnce(&KeyTree) -> R,
    ) -> R {
        f(&self.tree.read())
    }

    /// Key paths visible under `filter`, paired with their depth
    pub fn visible_rows(
        &self,
        filter: &str,
    ) -> Vec<(String, usize)> {
        self.with_tree(|tree| {
            tree.visible_rows(filter)
                .into_iter()
                .map(|row| (row.node.key_path().to_string(), row.depth))
                .collect()
        })
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("entries", &self.entries.len())
            .field("last_frame_at", &*self.last_frame_at.lock())
            .finish_non_exhaustive()
    }
}
