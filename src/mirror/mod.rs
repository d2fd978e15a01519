//! Assembles the mirror's components.
//!
//! [`MirrorBuilder`] wires the shared [`Outbox`] into the [`Registry`], the
//! registry into the [`TransportSession`], and both into the
//! [`HistoryLedger`].
//!
//! ## Example
//! ```ignore
//! let (shutdown_tx, shutdown_rx) = watch::channel(());
//! let mirror = MirrorBuilder::new(MirrorConfig::new()?.validate()?)
//!     .history_store(Arc::new(MemoryHistoryStore::new())) // Optional override
//!     .build();
//! let _sub = mirror.registry().on_new_entry_observed(|e| println!("{}", e.key()));
//! mirror.run(shutdown_rx).await?;
//! ```

#[cfg(test)]
mod mirror_test;

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use crate::EntryBinding;
use crate::FileHistoryStore;
use crate::HistoryLedger;
use crate::HistoryStore;
use crate::MemoryHistoryStore;
use crate::MirrorConfig;
use crate::Outbox;
use crate::Registry;
use crate::Result;
use crate::TransportSession;

pub struct MirrorBuilder {
    config: MirrorConfig,
    history_store: Option<Arc<dyn HistoryStore>>,
}

impl MirrorBuilder {
    pub fn new(config: MirrorConfig) -> Self {
        Self {
            config,
            history_store: None,
        }
    }

    /// Replaces the store picked from `history.storage_dir`.
    pub fn history_store(
        mut self,
        store: Arc<dyn HistoryStore>,
    ) -> Self {
        self.history_store = Some(store);
        self
    }

    pub fn build(self) -> Mirror {
        let outbox = Arc::new(Outbox::new());
        let registry =
            Arc::new(Registry::new(outbox.clone()).with_stale_after(self.config.health.stale_after()));
        let session = Arc::new(TransportSession::new(
            registry.clone(),
            outbox,
            self.config.transport.clone(),
        ));

        let store = self.history_store.unwrap_or_else(|| match &self.config.history.storage_dir {
            Some(dir) => {
                info!(dir = %dir.display(), "persisting history to disk");
                Arc::new(FileHistoryStore::new(dir.clone()))
            }
            None => Arc::new(MemoryHistoryStore::new()),
        });
        let ledger = Arc::new(HistoryLedger::new(registry.clone(), store, &self.config.history));

        Mirror {
            registry,
            session,
            ledger,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Mirror {
    registry: Arc<Registry>,
    session: Arc<TransportSession>,
    ledger: Arc<HistoryLedger>,
}

impl Mirror {
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn session(&self) -> &Arc<TransportSession> {
        &self.session
    }

    pub fn ledger(&self) -> &Arc<HistoryLedger> {
        &self.ledger
    }

    /// Binding to `key`, creating the entry if it has not been seen yet.
    pub fn bind(
        &self,
        key: &str,
    ) -> EntryBinding {
        EntryBinding::new(Some(self.registry.get_or_create_entry(key)))
    }

    /// Runs the transport until `shutdown` fires.
    pub async fn run(
        &self,
        shutdown: watch::Receiver<()>,
    ) -> Result<()> {
        self.session.clone().run(shutdown).await
    }
}
