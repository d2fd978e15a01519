use std::thread::sleep;
use std::time::Duration;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use crate::utils::time::millis_since_epoch;
use crate::utils::time::now_millis;

#[test]
fn test_now_millis_moves_forward() {
    let t1 = now_millis();
    sleep(Duration::from_millis(10));
    let t2 = now_millis();

    assert!(t2 >= t1 + 10);
    // Greater than 2021-01-01
    assert!(t1 > 1_609_459_200_000);
}

#[test]
fn test_millis_since_epoch() {
    assert_eq!(millis_since_epoch(UNIX_EPOCH), 0);
    assert_eq!(millis_since_epoch(UNIX_EPOCH + Duration::from_millis(1234)), 1234);
}

#[test]
fn test_time_before_epoch_reads_as_zero() {
    let before = UNIX_EPOCH - Duration::from_secs(1);
    assert_eq!(millis_since_epoch(before), 0);
    assert!(millis_since_epoch(SystemTime::now()) > 0);
}
