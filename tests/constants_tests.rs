// SPDX-License-Identifier: MPL-2.0

//! Integration tests for constants module

use flowercam::constants::CaptureInterval;

#[test]
fn test_interval_values() {
    // Test that exactly the offered intervals exist
    let seconds: Vec<u64> = CaptureInterval::ALL.iter().map(|i| i.seconds()).collect();
    assert_eq!(seconds, vec![1, 2, 5, 10]);
}

#[test]
fn test_interval_default_is_five_seconds() {
    assert_eq!(CaptureInterval::default().seconds(), 5);
}

#[test]
fn test_interval_display_names() {
    // Test that all intervals have non-empty display names
    for interval in CaptureInterval::ALL {
        assert!(!interval.display_name().is_empty());
    }
    assert_eq!(CaptureInterval::One.to_string(), "1 second");
    assert_eq!(CaptureInterval::Ten.to_string(), "10 seconds");
}

#[test]
fn test_interval_serializes_as_seconds() {
    assert_eq!(serde_json::to_string(&CaptureInterval::Two).unwrap(), "2");
    let parsed: CaptureInterval = serde_json::from_str("10").unwrap();
    assert_eq!(parsed, CaptureInterval::Ten);
    assert!(serde_json::from_str::<CaptureInterval>("4").is_err());
}
