// SPDX-License-Identifier: MPL-2.0

//! Capture session: timer, snapshots and the screen that owns them
//!
//! ```text
//!   keys / ticks / results ──Message──▶ CaptureScreen::update
//!                                              │
//!                                           Effect
//!                                              ▼
//!                                        EffectRunner ──▶ Ticker, uploads, disk
//! ```

pub mod runner;
pub mod screen;
pub mod snapshot;
pub mod store;
pub mod ticker;
pub mod timer;

pub use runner::EffectRunner;
pub use screen::{CaptureMode, CaptureScreen, Effect, Message, StatusKind, StatusMessage};
pub use snapshot::{Snapshot, SnapshotId};
pub use store::SnapshotCollection;
pub use ticker::Ticker;
pub use timer::{CaptureTimer, TickOutcome, TimerState, TimerTransition};
