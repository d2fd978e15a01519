use std::sync::Arc;

use parking_lot::Mutex;

use super::*;

fn recorder() -> (Arc<Mutex<Vec<i32>>>, impl Fn(&i32) + Send + Sync + 'static) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    (seen, move |v: &i32| sink.lock().push(*v))
}

#[test]
fn publish_reaches_every_subscriber_in_order() {
    let subscribers = Subscribers::new();
    let (first, f1) = recorder();
    let (second, f2) = recorder();
    let _s1 = subscribers.subscribe(f1);
    let _s2 = subscribers.subscribe(f2);

    for v in [1, 2, 3] {
        subscribers.publish(&v);
    }

    assert_eq!(*first.lock(), vec![1, 2, 3]);
    assert_eq!(*second.lock(), vec![1, 2, 3]);
}

#[test]
fn dropping_subscription_detaches_only_that_callback() {
    let subscribers = Subscribers::new();
    let (kept, f1) = recorder();
    let (dropped, f2) = recorder();
    let _kept = subscribers.subscribe(f1);
    let gone = subscribers.subscribe(f2);

    subscribers.publish(&1);
    drop(gone);
    subscribers.publish(&2);

    assert_eq!(*kept.lock(), vec![1, 2]);
    assert_eq!(*dropped.lock(), vec![1]);
    assert_eq!(subscribers.len(), 1);
}

#[test]
fn unsubscribe_is_explicit_drop() {
    let subscribers = Subscribers::<i32>::new();
    let sub = subscribers.subscribe(|_| {});
    assert_eq!(subscribers.len(), 1);

    sub.unsubscribe();
    assert!(subscribers.is_empty());
}

#[test]
fn detached_subscription_keeps_receiving() {
    let subscribers = Subscribers::new();
    let (seen, f) = recorder();
    subscribers.subscribe(f).detach();

    subscribers.publish(&9);

    assert_eq!(*seen.lock(), vec![9]);
    assert_eq!(subscribers.len(), 1);
}

#[test]
fn subscription_outliving_publisher_is_harmless() {
    let subscribers = Subscribers::<i32>::new();
    let sub = subscribers.subscribe(|_| {});

    drop(subscribers);
    drop(sub);
}

#[test]
fn callback_may_subscribe_while_being_notified() {
    let subscribers = Arc::new(Subscribers::<i32>::new());
    let late = Arc::new(Mutex::new(Vec::new()));

    let handle = subscribers.clone();
    let late_sink = late.clone();
    let _outer = subscribers.subscribe(move |v| {
        if *v == 1 {
            let late_sink = late_sink.clone();
            handle.subscribe(move |v| late_sink.lock().push(*v)).detach();
        }
    });

    subscribers.publish(&1);
    subscribers.publish(&2);

    assert_eq!(*late.lock(), vec![2]);
}

#[test]
fn subscription_ids_are_unique() {
    let subscribers = Subscribers::<i32>::new();
    let a = subscribers.subscribe(|_| {});
    let b = subscribers.subscribe(|_| {});

    assert_ne!(a.id(), b.id());
}

#[test]
fn callback_unsubscribed_by_earlier_callback_is_skipped() {
    let subscribers = Subscribers::<i32>::new();
    let (seen_b, fb) = recorder();
    let b_token: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));

    let slot = b_token.clone();
    let _a = subscribers.subscribe(move |_| {
        slot.lock().take();
    });
    *b_token.lock() = Some(subscribers.subscribe(fb));

    subscribers.publish(&1);
    subscribers.publish(&2);

    assert!(seen_b.lock().is_empty());
    assert_eq!(subscribers.len(), 1);
}
