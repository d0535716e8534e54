//! Store-level types

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub use crate::infrastructure::database::entities::change_log::{ChangeKind, EntityKind};
pub use crate::infrastructure::database::entities::participant::{
    AcceptanceStatus, ParticipantPermission, ParticipantRole,
};
pub use crate::infrastructure::database::entities::share::PublicPermission;

/// One of the two local data partitions mirroring the remote scopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Partition {
    /// Private content exclusively owned by the local account
    Owned,
    /// Every share zone visible to the local account, own shares included
    Shared,
}

impl Partition {
    pub const ALL: [Partition; 2] = [Partition::Owned, Partition::Shared];

    pub fn as_str(self) -> &'static str {
        match self {
            Partition::Owned => "owned",
            Partition::Shared => "shared",
        }
    }

    /// File name of the partition database inside the partitions directory
    pub fn file_name(self) -> &'static str {
        match self {
            Partition::Owned => "owned.sqlite",
            Partition::Shared => "shared.sqlite",
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single mutation inside a write batch.
///
/// Puts are upserts keyed by the entity's logical identity, so replaying the
/// same batch twice leaves the same state behind. Deletes of rows that are
/// already gone are benign no-ops: a peer may have removed the entity
/// concurrently, and that race is not an error.
#[derive(Debug, Clone)]
pub enum EntityWrite {
    PutPhoto {
        uuid: Uuid,
        unique_name: String,
        zone_id: Option<Uuid>,
    },
    PutThumbnail {
        uuid: Uuid,
        photo: Uuid,
        data: Vec<u8>,
    },
    PutPhotoData {
        uuid: Uuid,
        photo: Uuid,
        data: Vec<u8>,
    },
    PutTag {
        uuid: Uuid,
        name: String,
        zone_id: Option<Uuid>,
    },
    PutRating {
        uuid: Uuid,
        photo: Uuid,
        value: i16,
    },
    PutShare {
        uuid: Uuid,
        title: String,
        zone_id: Uuid,
        public_permission: PublicPermission,
    },
    PutParticipant {
        uuid: Uuid,
        share: Uuid,
        identity: String,
        role: ParticipantRole,
        permission: ParticipantPermission,
        acceptance_status: AcceptanceStatus,
    },
    /// Relate a photo to a tag; both are addressed by identity
    LinkTag { photo: Uuid, tag: Uuid },
    /// Remove the relation between a photo and a tag
    UnlinkTag { photo: Uuid, tag: Uuid },
    /// Delete an entity and, for photos and shares, their owned children
    Delete { kind: EntityKind, uuid: Uuid },
}
