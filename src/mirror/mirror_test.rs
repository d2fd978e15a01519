use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tempfile::tempdir;

use super::*;
use crate::test_utils::update;
use crate::FrameFreshness;
use crate::HistoryConfig;
use crate::HealthConfig;
use crate::NtValue;

#[test]
fn build_shares_one_registry() {
    let mirror = MirrorBuilder::new(MirrorConfig::default()).build();

    assert!(Arc::ptr_eq(mirror.registry(), mirror.session().registry()));
    assert!(!mirror.session().is_open());
}

#[test]
fn stale_threshold_comes_from_config() {
    let config = MirrorConfig {
        health: HealthConfig { stale_after_in_ms: 50 },
        ..MirrorConfig::default()
    };
    let mirror = MirrorBuilder::new(config).build();
    mirror.registry().apply_update(update("/a", "int", json!(1)));
    assert_eq!(mirror.registry().freshness(), FrameFreshness::Never);

    mirror.registry().handle_frame(crate::InboundFrame::AutoConfigs(json!({})));
    let at = mirror.registry().last_successful_frame_time().unwrap();

    assert_eq!(
        mirror.registry().freshness_at(at + Duration::from_millis(51)),
        FrameFreshness::Stale
    );
}

#[test]
fn bind_follows_registry_entry() {
    let mirror = MirrorBuilder::new(MirrorConfig::default()).build();
    let binding = mirror.bind("/Shooter/RPM");

    mirror.registry().apply_update(update("/Shooter/RPM", "double", json!(4500)));

    assert_eq!(binding.value(), Some(NtValue::Double(4500.0)));
}

#[test]
fn update_while_disconnected_is_recorded_but_not_sent() {
    let mirror = MirrorBuilder::new(MirrorConfig::default()).build();
    let binding = mirror.bind("/x");

    assert!(!binding.update(3i64, mirror.ledger()).unwrap());

    assert!(mirror.ledger().has_history(binding.entry().map(|e| e.as_ref())));
}

#[test]
fn storage_dir_selects_file_store() {
    let dir = tempdir().unwrap();
    let config = MirrorConfig {
        history: HistoryConfig {
            storage_dir: Some(dir.path().to_path_buf()),
            ..HistoryConfig::default()
        },
        ..MirrorConfig::default()
    };
    let mirror = MirrorBuilder::new(config).build();
    let binding = mirror.bind("/x");

    binding.update(1i64, mirror.ledger()).unwrap();

    let file = FileHistoryStore::new(dir.path()).path_for("history//x");
    assert!(file.exists());
}

#[test]
fn explicit_store_overrides_storage_dir() {
    let dir = tempdir().unwrap();
    let config = MirrorConfig {
        history: HistoryConfig {
            storage_dir: Some(dir.path().to_path_buf()),
            ..HistoryConfig::default()
        },
        ..MirrorConfig::default()
    };
    let store = Arc::new(MemoryHistoryStore::new());
    let mirror = MirrorBuilder::new(config).history_store(store.clone()).build();

    mirror.bind("/x").update(1i64, mirror.ledger()).unwrap();

    assert_eq!(store.load("history//x").unwrap().len(), 1);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
