use driftstore_types::NanoTime;
use pretty_assertions::assert_eq;

#[test]
fn zero_is_zero() {
    assert!(NanoTime::ZERO.is_zero());
    assert_eq!(NanoTime::ZERO.nanos(), 0);
}

#[test]
fn now_is_after_zero() {
    assert!(NanoTime::now() > NanoTime::ZERO);
}

#[test]
fn now_does_not_go_backwards() {
    let a = NanoTime::now();
    let b = NanoTime::now();
    assert!(b >= a);
}

#[test]
fn unit_constructors() {
    assert_eq!(NanoTime::from_seconds(2).nanos(), 2_000_000_000);
    assert_eq!(NanoTime::from_millis(3).nanos(), 3_000_000);
    assert_eq!(NanoTime::from_nanos(42).nanos(), 42);
}

#[test]
fn unit_accessors() {
    let t = NanoTime::from_seconds(2);
    assert_eq!(t.as_seconds(), 2.0);
    assert_eq!(t.as_millis(), 2000.0);
}

#[test]
fn arithmetic() {
    let a = NanoTime::from_nanos(100);
    let b = NanoTime::from_nanos(30);
    assert_eq!(a + b, NanoTime::from_nanos(130));
    assert_eq!(a - b, NanoTime::from_nanos(70));
}

#[test]
fn ordering() {
    assert!(NanoTime::from_nanos(1) < NanoTime::from_nanos(2));
    assert_eq!(NanoTime::from_nanos(5).max(NanoTime::from_nanos(3)).nanos(), 5);
}

#[test]
fn serde_is_transparent() {
    let t = NanoTime::from_nanos(1234567890);
    assert_eq!(serde_json::to_string(&t).unwrap(), "1234567890");
    let back: NanoTime = serde_json::from_str("1234567890").unwrap();
    assert_eq!(back, t);
}
