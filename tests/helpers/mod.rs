//! Shared test fixtures
#![allow(dead_code)]

use async_trait::async_trait;
use snapvault_core::ledger::ChangeRecord;
use snapvault_core::remote::{RemoteError, RemoteSync, ResolvedIdentity};
use snapvault_core::store::{EntityWrite, Partition};
use snapvault_core::Core;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use uuid::Uuid;

/// Author tag used when simulating changes imported from another peer
pub const PEER_AUTHOR: &str = "peer-device";

/// Scripted remote backend: zones are handed out up to an optional limit,
/// identity lookups answer from a fixed table, and every call is recorded so
/// tests can assert on what reached the backend.
#[derive(Default)]
pub struct ScriptedRemote {
    zone_limit: Option<usize>,
    identities: HashMap<String, String>,
    pub zones: Mutex<Vec<Uuid>>,
    pub deleted_zones: Mutex<Vec<Uuid>>,
    pub pushed: Mutex<Vec<(Partition, ChangeRecord)>>,
}

impl ScriptedRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_identity(mut self, lookup_key: &str, identity: &str) -> Self {
        self.identities
            .insert(lookup_key.to_string(), identity.to_string());
        self
    }

    pub fn with_zone_limit(mut self, limit: usize) -> Self {
        self.zone_limit = Some(limit);
        self
    }
}

#[async_trait]
impl RemoteSync for ScriptedRemote {
    async fn push_change(
        &self,
        record: &ChangeRecord,
        partition: Partition,
    ) -> Result<(), RemoteError> {
        self.pushed.lock().unwrap().push((partition, record.clone()));
        Ok(())
    }

    async fn create_zone(&self, _partition: Partition) -> Result<Uuid, RemoteError> {
        let mut zones = self.zones.lock().unwrap();
        if let Some(limit) = self.zone_limit {
            if zones.len() >= limit {
                return Err(RemoteError::ZoneLimitExceeded);
            }
        }
        let zone_id = Uuid::new_v4();
        zones.push(zone_id);
        Ok(zone_id)
    }

    async fn delete_zone(&self, zone_id: Uuid) -> Result<(), RemoteError> {
        self.deleted_zones.lock().unwrap().push(zone_id);
        Ok(())
    }

    async fn resolve_identity(
        &self,
        lookup_key: &str,
    ) -> Result<Option<ResolvedIdentity>, RemoteError> {
        Ok(self.identities.get(lookup_key).map(|identity| ResolvedIdentity {
            identity: identity.clone(),
            display_name: None,
        }))
    }
}

/// A core over a fresh temp directory with a permissive scripted remote
pub async fn test_core() -> (Core, TempDir) {
    core_with_remote(Arc::new(ScriptedRemote::new())).await
}

pub async fn core_with_remote(remote: Arc<ScriptedRemote>) -> (Core, TempDir) {
    let dir = TempDir::new().unwrap();
    let core = Core::new_with_config(dir.path().to_path_buf(), remote)
        .await
        .unwrap();
    (core, dir)
}

/// Import a batch exactly the way the remote collaborator delivers a peer's
/// changes: written under the peer's author tag, ready for replay to pick up
pub async fn import_from_peer(
    core: &Core,
    partition: Partition,
    writes: Vec<EntityWrite>,
) -> Vec<ChangeRecord> {
    core.store
        .write_as(partition, PEER_AUTHOR, writes)
        .await
        .unwrap()
}
