//! Durable replay checkpoints
//!
//! One cursor per partition, persisted as a small JSON file in the data
//! directory so replay resumes from the right position after a restart.

use crate::store::Partition;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::debug;

use super::LedgerError;

/// Durable map of partition to last successfully replayed sequence token
pub struct CheckpointStore {
    path: PathBuf,
    tokens: Mutex<HashMap<Partition, i64>>,
}

impl CheckpointStore {
    /// Load the checkpoint file, or start empty when none exists yet.
    /// An absent entry means "replay from the beginning".
    pub fn load_or_create(path: PathBuf) -> Result<Self, LedgerError> {
        let tokens = if path.exists() {
            let json = std::fs::read_to_string(&path)?;
            serde_json::from_str(&json)?
        } else {
            HashMap::new()
        };
        Ok(Self {
            path,
            tokens: Mutex::new(tokens),
        })
    }

    /// Last observed sequence token for a partition
    pub async fn get(&self, partition: Partition) -> Option<i64> {
        self.tokens.lock().await.get(&partition).copied()
    }

    /// Advance the checkpoint for a partition and persist it.
    ///
    /// Re-issuing the current token is a no-op, and the cursor never moves
    /// backward: a checkpoint must not point before effects that were already
    /// applied durably.
    pub async fn advance(&self, partition: Partition, token: i64) -> Result<(), LedgerError> {
        let mut tokens = self.tokens.lock().await;
        if let Some(current) = tokens.get(&partition) {
            if *current >= token {
                return Ok(());
            }
        }
        tokens.insert(partition, token);

        let json = serde_json::to_string_pretty(&*tokens)?;
        std::fs::write(&self.path, json)?;
        debug!(%partition, token, "advanced replay checkpoint");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn advancing_is_idempotent_and_never_moves_backward() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::load_or_create(dir.path().join("checkpoints.json")).unwrap();

        assert_eq!(store.get(Partition::Owned).await, None);

        store.advance(Partition::Owned, 42).await.unwrap();
        assert_eq!(store.get(Partition::Owned).await, Some(42));

        // re-issuing the same token is a no-op
        store.advance(Partition::Owned, 42).await.unwrap();
        assert_eq!(store.get(Partition::Owned).await, Some(42));

        // stale tokens never rewind the cursor
        store.advance(Partition::Owned, 7).await.unwrap();
        assert_eq!(store.get(Partition::Owned).await, Some(42));

        // the other partition's cursor is independent
        assert_eq!(store.get(Partition::Shared).await, None);
    }

    #[tokio::test]
    async fn checkpoints_are_reloaded_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkpoints.json");

        let store = CheckpointStore::load_or_create(path.clone()).unwrap();
        store.advance(Partition::Owned, 9).await.unwrap();
        store.advance(Partition::Shared, 3).await.unwrap();
        drop(store);

        let reloaded = CheckpointStore::load_or_create(path).unwrap();
        assert_eq!(reloaded.get(Partition::Owned).await, Some(9));
        assert_eq!(reloaded.get(Partition::Shared).await, Some(3));
    }
}
