// SPDX-License-Identifier: GPL-3.0-only

//! Capture timer state machine
//!
//! ```text
//!            start
//!   ┌──────┐ ─────▶ ┌─────────────────────┐
//!   │ Idle │        │ Running { remaining }│ ──tick──▶ remaining - 1
//!   └──────┘ ◀───── └─────────────────────┘
//!            stop            │ tick at remaining == 1
//!                            ▼
//!                   capture, remaining = interval
//! ```
//!
//! The timer only decides *when* to capture. The one-second ticks come from
//! [`super::ticker::Ticker`], and the capture itself is performed by the screen.

use crate::constants::CaptureInterval;
use tracing::{debug, info};

/// Timer state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerState {
    /// Not capturing
    #[default]
    Idle,
    /// Counting down to the next capture
    Running {
        /// Seconds until the next capture, always in `1..=interval`
        remaining: u64,
    },
}

/// Result of a start/stop request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTransition {
    /// Idle → Running, the driver must begin ticking
    Started,
    /// Running → Idle, the driver must cancel ticking
    Stopped,
    /// Already in the requested state
    Ignored,
}

/// Result of one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Countdown decremented
    Counted { remaining: u64 },
    /// Countdown expired and was reset; capture a frame now
    Capture,
    /// Tick arrived while idle and was dropped
    Idle,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CaptureTimer {
    interval: CaptureInterval,
    state: TimerState,
}

impl CaptureTimer {
    pub fn new(interval: CaptureInterval) -> Self {
        Self {
            interval,
            state: TimerState::Idle,
        }
    }

    pub fn interval(&self) -> CaptureInterval {
        self.interval
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, TimerState::Running { .. })
    }

    /// Seconds until the next capture, `None` while idle
    pub fn remaining(&self) -> Option<u64> {
        match self.state {
            TimerState::Idle => None,
            TimerState::Running { remaining } => Some(remaining),
        }
    }

    /// Countdown value; the full interval while idle
    pub fn countdown(&self) -> u64 {
        self.remaining().unwrap_or_else(|| self.interval.seconds())
    }

    pub fn start(&mut self) -> TimerTransition {
        if self.is_running() {
            debug!("Capture timer already running");
            return TimerTransition::Ignored;
        }
        self.state = TimerState::Running {
            remaining: self.interval.seconds(),
        };
        info!(interval = self.interval.seconds(), "Capture timer started");
        TimerTransition::Started
    }

    pub fn stop(&mut self) -> TimerTransition {
        if !self.is_running() {
            debug!("Capture timer already idle");
            return TimerTransition::Ignored;
        }
        self.state = TimerState::Idle;
        info!("Capture timer stopped");
        TimerTransition::Stopped
    }

    /// Start when idle, stop when running
    pub fn toggle(&mut self) -> TimerTransition {
        if self.is_running() {
            self.stop()
        } else {
            self.start()
        }
    }

    /// Advance the countdown by one second
    pub fn tick(&mut self) -> TickOutcome {
        match self.state {
            TimerState::Idle => TickOutcome::Idle,
            TimerState::Running { remaining } if remaining <= 1 => {
                self.state = TimerState::Running {
                    remaining: self.interval.seconds(),
                };
                debug!("Capture countdown expired");
                TickOutcome::Capture
            }
            TimerState::Running { remaining } => {
                self.state = TimerState::Running {
                    remaining: remaining - 1,
                };
                TickOutcome::Counted {
                    remaining: remaining - 1,
                }
            }
        }
    }

    /// Change the interval
    ///
    /// A running countdown restarts at the new interval, so the next capture
    /// is one full new interval away.
    pub fn set_interval(&mut self, interval: CaptureInterval) {
        self.interval = interval;
        if self.is_running() {
            self.state = TimerState::Running {
                remaining: interval.seconds(),
            };
        }
        info!(
            interval = interval.seconds(),
            running = self.is_running(),
            "Capture interval changed"
        );
    }
}
