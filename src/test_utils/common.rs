use std::sync::Arc;

use serde_json::Value;

use crate::Entry;
use crate::FrameSink;
use crate::NtUpdate;
use crate::Registry;

static LOGGER_INIT: once_cell::sync::Lazy<()> = once_cell::sync::Lazy::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
});

pub fn enable_logger() {
    *LOGGER_INIT;
    println!("setup logger for unit test.");
}

pub(crate) fn update(
    key: &str,
    value_type: &str,
    value: Value,
) -> NtUpdate {
    NtUpdate::new(key, value_type, value)
}

/// Registry whose writes land in the returned sink
pub(crate) fn recording_registry() -> (Arc<Registry>, Arc<super::RecordingSink>) {
    let sink = Arc::new(super::RecordingSink::default());
    let registry = Arc::new(Registry::new(sink.clone()));
    (registry, sink)
}

pub(crate) fn detached_entry(
    key: &str,
    sink: Arc<dyn FrameSink>,
) -> Arc<Entry> {
    Arc::new(Entry::new(key, sink))
}
