use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::json;

use super::*;
use crate::test_utils::detached_entry;
use crate::test_utils::RecordingSink;

#[test]
fn titles_come_from_trailing_segments() {
    let entry = detached_entry("/Shooter/PID/kP", Arc::new(RecordingSink::default()));

    assert_eq!(entry.key(), "/Shooter/PID/kP");
    assert_eq!(entry.title(), "kP");
    assert_eq!(entry.parent_title(), Some("PID"));
}

#[test]
fn top_level_key_has_no_parent_title() {
    let entry = detached_entry("/Voltage", Arc::new(RecordingSink::default()));

    assert_eq!(entry.title(), "Voltage");
    assert_eq!(entry.parent_title(), None);
}

#[test]
fn new_entry_has_no_value() {
    let entry = detached_entry("/a", Arc::new(RecordingSink::default()));

    assert!(entry.latest_value().is_none());
    assert!(!entry.has_value());
}

#[test]
fn apply_inbound_replaces_value_and_notifies() {
    let entry = detached_entry("/x", Arc::new(RecordingSink::default()));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let _sub = entry.on_update(move |v| sink.lock().push(v.value.clone()));

    for v in [1.0, 2.0, 3.0] {
        entry.apply_inbound(TaggedValue::new("double", v));
    }

    assert_eq!(
        *seen.lock(),
        vec![NtValue::Double(1.0), NtValue::Double(2.0), NtValue::Double(3.0)]
    );
    assert_eq!(entry.latest_value(), Some(TaggedValue::new("double", 3.0)));
}

#[test]
fn unsubscribing_leaves_entry_and_other_subscribers_alone() {
    let entry = detached_entry("/x", Arc::new(RecordingSink::default()));
    let seen = Arc::new(Mutex::new(0));
    let counter = seen.clone();
    let _kept = entry.on_update(move |_| *counter.lock() += 1);
    let dropped = entry.on_update(|_| {});
    assert_eq!(entry.subscriber_count(), 2);

    dropped.unsubscribe();
    entry.apply_inbound(TaggedValue::new("boolean", true));

    assert_eq!(entry.subscriber_count(), 1);
    assert_eq!(*seen.lock(), 1);
    assert!(entry.has_value());
}

#[test]
fn request_write_uses_current_value_type() {
    let sink = Arc::new(RecordingSink::default());
    let entry = detached_entry("/Shooter/RPM", sink.clone());
    entry.apply_inbound(TaggedValue::from_wire("double", json!(4500)));

    assert!(entry.request_write(5000.0));

    assert_eq!(
        sink.sent(),
        vec![OutboundFrame {
            key: "/Shooter/RPM".into(),
            value_type: "double".into(),
            value: NtValue::Double(5000.0),
        }]
    );
}

#[test]
fn request_write_does_not_change_latest_value() {
    let entry = detached_entry("/Shooter/RPM", Arc::new(RecordingSink::default()));
    entry.apply_inbound(TaggedValue::new("double", 4500.0));

    entry.request_write(5000.0);

    assert_eq!(entry.latest_value().unwrap().value, NtValue::Double(4500.0));
}

#[test]
fn write_to_never_valued_entry_is_sent_as_unknown() {
    let sink = Arc::new(RecordingSink::default());
    let entry = detached_entry("/New/Key", sink.clone());

    assert!(entry.request_write("hello"));

    let sent = sink.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].value_type, "unknown");
    assert_eq!(sent[0].value, NtValue::from("hello"));
}

#[test]
fn write_while_disconnected_is_dropped_silently() {
    let sink = Arc::new(RecordingSink::default());
    sink.disconnect();
    let entry = detached_entry("/a", sink.clone());

    assert!(!entry.request_write(true));
    assert!(sink.sent().is_empty());
}

#[test]
fn request_write_goes_through_frame_sink_once() {
    let mut sink = MockFrameSink::new();
    sink.expect_send()
        .withf(|frame| frame.key == "/Intake/Enabled" && frame.value == NtValue::Boolean(false))
        .times(1)
        .return_const(true);
    let entry = Entry::new("/Intake/Enabled", Arc::new(sink));

    assert!(entry.request_write(false));
}
