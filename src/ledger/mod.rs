//! Per-partition change ledger
//!
//! Read side of the append-only `change_log` table. The write side lives in
//! the store, which appends rows inside every write transaction; this module
//! cursors over them for replay and keeps the durable checkpoints.

mod checkpoint;
mod error;

pub use checkpoint::CheckpointStore;
pub use error::LedgerError;

use crate::infrastructure::database::entities::{self, change_log};
use crate::store::{ChangeKind, EntityKind, Partition, PartitionStore};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// One committed mutation, as observed by replay and event consumers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// Monotonic per-partition sequence token
    pub sequence: i64,
    /// Tag of the writer that committed the mutation
    pub author: String,
    pub entity_kind: EntityKind,
    pub entity_uuid: Uuid,
    pub change_kind: ChangeKind,
}

impl From<change_log::Model> for ChangeRecord {
    fn from(model: change_log::Model) -> Self {
        Self {
            sequence: model.id,
            author: model.author,
            entity_kind: model.entity_kind,
            entity_uuid: model.entity_uuid,
            change_kind: model.change_kind,
        }
    }
}

/// Cursoring reader over a partition's change log
pub struct ChangeLedger {
    store: Arc<PartitionStore>,
}

impl ChangeLedger {
    pub fn new(store: Arc<PartitionStore>) -> Self {
        Self { store }
    }

    /// Fetch every change after `token` (all of history when `None`) in
    /// sequence order, excluding rows written by the local author. Replaying
    /// self-authored changes would feed the store's own mutations back into
    /// it.
    pub async fn fetch_since(
        &self,
        partition: Partition,
        token: Option<i64>,
    ) -> Result<Vec<ChangeRecord>, LedgerError> {
        let mut query = entities::ChangeLog::find()
            .filter(change_log::Column::Author.ne(self.store.author()))
            .order_by_asc(change_log::Column::Id);
        if let Some(token) = token {
            query = query.filter(change_log::Column::Id.gt(token));
        }

        let rows = query
            .all(self.store.conn(partition))
            .await
            .map_err(|source| LedgerError::Fetch { partition, source })?;

        Ok(rows.into_iter().map(ChangeRecord::from).collect())
    }
}
