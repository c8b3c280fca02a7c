// SPDX-License-Identifier: GPL-3.0-only

//! One-second tick driver for the capture timer
//!
//! A single tokio task posts [`Message::Tick`] to the UI loop once per second
//! while active. Every tick carries the generation the ticker was started
//! with, so the screen can drop ticks an aborted task left in the channel.
//! Starting an active ticker with the same generation does nothing, so at
//! most one tick task exists per ticker.

use super::screen::Message;
use crate::constants::timing;
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::debug;

pub struct Ticker {
    runtime: Handle,
    handle: Option<JoinHandle<()>>,
    generation: u64,
}

impl Ticker {
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            handle: None,
            generation: 0,
        }
    }

    /// Begin ticking; the first tick arrives one period from now
    pub fn start(&mut self, sender: UnboundedSender<Message>, generation: u64) {
        if self.is_active() {
            if self.generation == generation {
                debug!(generation, "Ticker already active");
                return;
            }
            self.stop();
        }

        self.generation = generation;
        self.handle = Some(self.runtime.spawn(async move {
            let start = tokio::time::Instant::now() + timing::TICK_PERIOD;
            let mut interval = tokio::time::interval_at(start, timing::TICK_PERIOD);
            loop {
                interval.tick().await;
                if sender.send(Message::Tick(generation)).is_err() {
                    debug!("Tick receiver gone, ticker exiting");
                    break;
                }
            }
        }));
        debug!(generation, "Ticker started");
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!("Ticker stopped");
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::mpsc;

    #[tokio::test(start_paused = true)]
    async fn test_ticks_once_per_second() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut ticker = Ticker::new(Handle::current());
        ticker.start(tx, 1);

        tokio::time::sleep(Duration::from_millis(3500)).await;
        let mut ticks = 0;
        while let Ok(message) = rx.try_recv() {
            assert_eq!(message, Message::Tick(1));
            ticks += 1;
        }
        assert_eq!(ticks, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_start_does_not_double_ticks() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut ticker = Ticker::new(Handle::current());
        ticker.start(tx.clone(), 1);
        ticker.start(tx, 1);

        tokio::time::sleep(Duration::from_millis(2500)).await;
        let mut ticks = 0;
        while rx.try_recv().is_ok() {
            ticks += 1;
        }
        assert_eq!(ticks, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_ends_ticks() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut ticker = Ticker::new(Handle::current());
        ticker.start(tx, 1);
        tokio::time::sleep(Duration::from_millis(1500)).await;
        ticker.stop();
        assert!(!ticker.is_active());

        while rx.try_recv().is_ok() {}
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_generation_replaces_task() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut ticker = Ticker::new(Handle::current());
        ticker.start(tx.clone(), 1);
        tokio::time::sleep(Duration::from_millis(1500)).await;
        ticker.start(tx, 2);

        tokio::time::sleep(Duration::from_millis(2200)).await;
        let mut ticks = Vec::new();
        while let Ok(Message::Tick(generation)) = rx.try_recv() {
            ticks.push(generation);
        }
        assert_eq!(ticks, vec![1, 2, 2]);
    }
}
