//! Remote synchronization boundary
//!
//! The core never talks to a backend directly; everything it needs from the
//! outside world goes through this narrow trait. The transport, scheduling,
//! retry policy, and account plumbing all live on the other side of it.

use crate::ledger::ChangeRecord;
use crate::store::Partition;
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// Remote backend errors surfaced to the core
#[derive(Error, Debug)]
pub enum RemoteError {
    /// The backend caps the number of zones per account and the cap was hit.
    /// Callers should route the content into an existing share instead.
    #[error("the remote backend has no capacity for another zone")]
    ZoneLimitExceeded,

    /// Identity lookup infrastructure failed (distinct from "no match")
    #[error("identity lookup failed: {0}")]
    Lookup(String),

    /// Any other backend failure
    #[error("remote backend unavailable: {0}")]
    Unavailable(String),
}

/// An account identity resolved from an opaque lookup key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub identity: String,
    pub display_name: Option<String>,
}

/// Operations the core calls out to on the remote sync collaborator.
///
/// Delivery of inbound changes is at-least-once and flows the other way:
/// the collaborator imports remote mutations through
/// [`PartitionStore::write_as`](crate::store::PartitionStore::write_as) under
/// the originating author tag and then signals
/// [`Core::remote_change_available`](crate::Core::remote_change_available).
#[async_trait]
pub trait RemoteSync: Send + Sync {
    /// Hand a locally committed change to the backend for distribution
    async fn push_change(&self, record: &ChangeRecord, partition: Partition)
        -> Result<(), RemoteError>;

    /// Allocate a fresh zone in the given remote scope
    async fn create_zone(&self, partition: Partition) -> Result<Uuid, RemoteError>;

    /// Remove a zone and everything it contains from the backend
    async fn delete_zone(&self, zone_id: Uuid) -> Result<(), RemoteError>;

    /// Resolve a participant identity from a lookup key (an email address or
    /// similar). `Ok(None)` means the lookup worked and found nobody.
    async fn resolve_identity(&self, lookup_key: &str)
        -> Result<Option<ResolvedIdentity>, RemoteError>;
}

/// Backend used when no remote account is attached.
///
/// Zones are minted locally so sharing keeps working offline; pushes are
/// dropped and identity lookups resolve nobody.
pub struct OfflineRemote;

#[async_trait]
impl RemoteSync for OfflineRemote {
    async fn push_change(
        &self,
        _record: &ChangeRecord,
        _partition: Partition,
    ) -> Result<(), RemoteError> {
        Ok(())
    }

    async fn create_zone(&self, _partition: Partition) -> Result<Uuid, RemoteError> {
        Ok(Uuid::new_v4())
    }

    async fn delete_zone(&self, _zone_id: Uuid) -> Result<(), RemoteError> {
        Ok(())
    }

    async fn resolve_identity(
        &self,
        _lookup_key: &str,
    ) -> Result<Option<ResolvedIdentity>, RemoteError> {
        Ok(None)
    }
}
