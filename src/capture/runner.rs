// SPDX-License-Identifier: GPL-3.0-only

//! Executes screen effects on the tokio runtime
//!
//! Background work reports back to the UI loop as [`Message`]s through the
//! same channel the ticker uses. Uploads are fire-and-forget and are never
//! cancelled; the ticker is aborted when the runner is dropped.

use super::screen::{Effect, Message};
use super::snapshot::SnapshotId;
use super::ticker::Ticker;
use crate::errors::PhotoError;
use crate::pipelines::photo::EncodedImage;
use crate::storage;
use crate::upload::CountingService;
use chrono::{DateTime, Local};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

pub struct EffectRunner<S> {
    service: Arc<S>,
    runtime: Handle,
    sender: UnboundedSender<Message>,
    ticker: Ticker,
    photo_dir: PathBuf,
}

impl<S: CountingService + 'static> EffectRunner<S> {
    pub fn new(
        service: Arc<S>,
        runtime: Handle,
        sender: UnboundedSender<Message>,
        photo_dir: PathBuf,
    ) -> Self {
        Self {
            service,
            ticker: Ticker::new(runtime.clone()),
            runtime,
            sender,
            photo_dir,
        }
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.is_active()
    }

    pub fn run(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartTicker(generation) => {
                    self.ticker.start(self.sender.clone(), generation)
                }
                Effect::StopTicker => self.ticker.stop(),
                Effect::Upload { id, image } => self.upload(id, image),
                Effect::Persist {
                    id,
                    image,
                    timestamp,
                } => self.persist(id, image, timestamp),
            }
        }
    }

    fn upload(&self, id: SnapshotId, image: EncodedImage) {
        let service = Arc::clone(&self.service);
        let sender = self.sender.clone();
        self.runtime.spawn(async move {
            let result = service.count(&image).await;
            if sender.send(Message::CountFinished { id, result }).is_err() {
                debug!(snapshot = %id, "Screen closed before count finished");
            }
        });
    }

    fn persist(&self, id: SnapshotId, image: EncodedImage, timestamp: DateTime<Local>) {
        let dir = self.photo_dir.clone();
        let sender = self.sender.clone();
        self.runtime.spawn(async move {
            let result = tokio::task::spawn_blocking(move || {
                storage::persist_snapshot(&dir, &image, timestamp)
            })
            .await
            .unwrap_or_else(|e| Err(PhotoError::SaveFailed(e.to_string())));

            if sender.send(Message::Persisted { id, result }).is_err() {
                warn!(snapshot = %id, "Screen closed before photo was saved");
            }
        });
    }
}
