//! History replay engine
//!
//! A single worker task drains each partition's change ledger from its last
//! checkpoint, notifies observers, advances the checkpoint, and hands freshly
//! inserted tags to the deduplication engine. Replay and deduplication share
//! the one worker on purpose: checkpoint advancement stays totally ordered
//! and two dedup passes can never race on the same zone.

mod error;

pub use error::HistoryError;

use crate::dedup::Deduplicator;
use crate::infrastructure::events::{Event, EventBus};
use crate::ledger::{ChangeLedger, ChangeRecord, CheckpointStore};
use crate::store::{ChangeKind, EntityKind, Partition, PartitionStore};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, instrument};
use uuid::Uuid;

enum HistoryRequest {
    ProcessRemoteChange {
        partition: Partition,
        ack: Option<oneshot::Sender<Result<Vec<ChangeRecord>, HistoryError>>>,
    },
    Deduplicate {
        partition: Partition,
        candidates: Vec<Uuid>,
        ack: oneshot::Sender<Result<(), HistoryError>>,
    },
    Shutdown,
}

/// Handle to the history worker. Cheap to clone; all clones feed the same
/// serialized queue.
#[derive(Clone)]
pub struct HistoryService {
    tx: mpsc::UnboundedSender<HistoryRequest>,
}

impl HistoryService {
    /// Spawn the worker task and return a handle to it
    pub fn spawn(
        store: Arc<PartitionStore>,
        checkpoints: Arc<CheckpointStore>,
        events: Arc<EventBus>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = HistoryWorker {
            ledger: ChangeLedger::new(store.clone()),
            dedup: Deduplicator::new(store),
            checkpoints,
            events,
        };
        tokio::spawn(worker.run(rx));
        Self { tx }
    }

    /// Inbound "remote change available" signal. Fire-and-forget: failures
    /// are logged and surfaced on the event bus, and the next signal retries
    /// from the untouched checkpoint.
    pub fn notify_remote_change(&self, partition: Partition) {
        let request = HistoryRequest::ProcessRemoteChange {
            partition,
            ack: None,
        };
        if self.tx.send(request).is_err() {
            error!(%partition, "history worker is gone; dropping remote change signal");
        }
    }

    /// Process a partition's pending history and wait for the outcome
    pub async fn process_remote_change(
        &self,
        partition: Partition,
    ) -> Result<Vec<ChangeRecord>, HistoryError> {
        let (ack, response) = oneshot::channel();
        self.tx
            .send(HistoryRequest::ProcessRemoteChange {
                partition,
                ack: Some(ack),
            })
            .map_err(|_| HistoryError::WorkerStopped)?;
        response.await.map_err(|_| HistoryError::WorkerStopped)?
    }

    /// Run a deduplication pass on the worker and wait for it to finish
    pub async fn deduplicate(
        &self,
        partition: Partition,
        candidates: Vec<Uuid>,
    ) -> Result<(), HistoryError> {
        let (ack, response) = oneshot::channel();
        self.tx
            .send(HistoryRequest::Deduplicate {
                partition,
                candidates,
                ack,
            })
            .map_err(|_| HistoryError::WorkerStopped)?;
        response.await.map_err(|_| HistoryError::WorkerStopped)?
    }

    /// Ask the worker to stop after the requests already queued
    pub fn shutdown(&self) {
        let _ = self.tx.send(HistoryRequest::Shutdown);
    }
}

struct HistoryWorker {
    ledger: ChangeLedger,
    dedup: Deduplicator,
    checkpoints: Arc<CheckpointStore>,
    events: Arc<EventBus>,
}

impl HistoryWorker {
    async fn run(self, mut rx: mpsc::UnboundedReceiver<HistoryRequest>) {
        while let Some(request) = rx.recv().await {
            match request {
                HistoryRequest::ProcessRemoteChange { partition, ack } => {
                    let result = self.process(partition).await;
                    match ack {
                        Some(ack) => {
                            let _ = ack.send(result);
                        }
                        None => {
                            if let Err(err) = result {
                                error!(%partition, "failed to process the change history: {err}");
                                self.events.emit(Event::SyncActivity {
                                    partition: Some(partition),
                                    error: Some(err.to_string()),
                                });
                            }
                        }
                    }
                }
                HistoryRequest::Deduplicate {
                    partition,
                    candidates,
                    ack,
                } => {
                    let result = self
                        .dedup
                        .deduplicate(partition, &candidates)
                        .await
                        .map_err(HistoryError::from);
                    let _ = ack.send(result);
                }
                HistoryRequest::Shutdown => break,
            }
        }
        debug!("history worker stopped");
    }

    /// Replay one partition's pending history.
    ///
    /// Safe to re-run after any failure: the checkpoint only advances once
    /// the batch has been fetched and observers notified, and appliers are
    /// upsert-by-identity, so seeing the same records again cannot corrupt
    /// state.
    #[instrument(skip(self))]
    async fn process(&self, partition: Partition) -> Result<Vec<ChangeRecord>, HistoryError> {
        let since = self.checkpoints.get(partition).await;
        let records = self.ledger.fetch_since(partition, since).await?;

        // Observers hear about every pass, even an empty one: a share can
        // change the partition's structure without producing a single entity
        // mutation, and "zero records" still means "re-derive summary state".
        self.events.emit(Event::StoreChanged {
            partition,
            records: records.clone(),
        });

        let Some(last) = records.last() else {
            return Ok(records);
        };
        self.checkpoints.advance(partition, last.sequence).await?;

        // Only owners deduplicate: the owned partition is where racing tag
        // inserts from the local account's own devices land.
        if partition == Partition::Owned {
            let inserted_tags: Vec<Uuid> = records
                .iter()
                .filter(|r| r.entity_kind == EntityKind::Tag && r.change_kind == ChangeKind::Insert)
                .map(|r| r.entity_uuid)
                .collect();
            if !inserted_tags.is_empty() {
                self.dedup.deduplicate(partition, &inserted_tags).await?;
            }
        }

        Ok(records)
    }
}
