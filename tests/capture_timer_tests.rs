// SPDX-License-Identifier: MPL-2.0

//! Integration tests for the capture timer state machine

use flowercam::CaptureInterval;
use flowercam::capture::{CaptureTimer, TickOutcome, TimerState, TimerTransition};

#[test]
fn test_five_ticks_capture_once() {
    let mut timer = CaptureTimer::new(CaptureInterval::Five);
    timer.start();

    let outcomes: Vec<TickOutcome> = (0..5).map(|_| timer.tick()).collect();
    let captures = outcomes
        .iter()
        .filter(|o| **o == TickOutcome::Capture)
        .count();

    assert_eq!(captures, 1);
    assert_eq!(outcomes[4], TickOutcome::Capture);
    assert_eq!(timer.remaining(), Some(5), "Countdown should reset to the interval");
}

#[test]
fn test_captures_never_more_often_than_interval() {
    for interval in CaptureInterval::ALL {
        let mut timer = CaptureTimer::new(interval);
        timer.start();
        let mut last_capture: Option<u64> = None;
        for second in 1..=60u64 {
            if timer.tick() == TickOutcome::Capture {
                if let Some(last) = last_capture {
                    assert_eq!(second - last, interval.seconds());
                }
                last_capture = Some(second);
            }
        }
        assert_eq!(last_capture.map(|s| s % interval.seconds()), Some(0));
    }
}

#[test]
fn test_remaining_stays_in_range_while_running() {
    let mut timer = CaptureTimer::new(CaptureInterval::Ten);
    timer.start();
    for _ in 0..35 {
        timer.tick();
        let remaining = timer.remaining().unwrap();
        assert!((1..=10).contains(&remaining));
    }
}

#[test]
fn test_toggle_sequences_alternate() {
    // A single toggle control can never start twice in a row
    let mut timer = CaptureTimer::default();
    let transitions: Vec<TimerTransition> = (0..4).map(|_| timer.toggle()).collect();
    assert_eq!(
        transitions,
        vec![
            TimerTransition::Started,
            TimerTransition::Stopped,
            TimerTransition::Started,
            TimerTransition::Stopped,
        ]
    );
    assert_eq!(timer.state(), TimerState::Idle);
}

#[test]
fn test_interval_change_while_idle_resets_countdown() {
    let mut timer = CaptureTimer::new(CaptureInterval::Five);
    timer.set_interval(CaptureInterval::Two);
    assert_eq!(timer.countdown(), 2);
    timer.start();
    assert_eq!(timer.remaining(), Some(2));
}

#[test]
fn test_interval_change_while_running_restarts_countdown() {
    let mut timer = CaptureTimer::new(CaptureInterval::Ten);
    timer.start();
    for _ in 0..7 {
        timer.tick();
    }
    assert_eq!(timer.remaining(), Some(3));

    timer.set_interval(CaptureInterval::Two);
    assert!(timer.is_running());
    assert_eq!(timer.remaining(), Some(2));
    assert_eq!(timer.tick(), TickOutcome::Counted { remaining: 1 });
    assert_eq!(timer.tick(), TickOutcome::Capture);
}

#[test]
fn test_stale_tick_after_stop_never_captures() {
    let mut timer = CaptureTimer::new(CaptureInterval::One);
    timer.start();
    timer.stop();
    assert_eq!(timer.tick(), TickOutcome::Idle);
}
