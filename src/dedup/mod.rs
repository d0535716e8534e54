//! Tag deduplication
//!
//! Independent peers can race to create a tag with the same name. Every peer
//! runs the same merge locally: collect the same-name tags in the candidate's
//! partition and zone, keep the one with the lowest uuid, re-point every
//! photo link to it, and delete the rest. Because the ordering key is total
//! and identical everywhere, all peers converge on the same winner with no
//! coordination or communication.

use crate::infrastructure::database::entities::{self, photo_tag, tag};
use crate::store::{EntityKind, EntityWrite, Partition, PartitionStore, StoreResult};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, TransactionTrait};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Collapses duplicate mergeable entities into a single winner
pub struct Deduplicator {
    store: Arc<PartitionStore>,
}

impl Deduplicator {
    pub fn new(store: Arc<PartitionStore>) -> Self {
        Self { store }
    }

    /// Deduplicate the given tag candidates, one batch, one transaction.
    ///
    /// Candidates that no longer exist are skipped: the tag may have been
    /// inserted and deleted before this pass ran, which is not an error.
    #[instrument(skip(self, candidates), fields(candidates = candidates.len()))]
    pub async fn deduplicate(&self, partition: Partition, candidates: &[Uuid]) -> StoreResult<()> {
        if candidates.is_empty() {
            return Ok(());
        }

        let txn = self.store.conn(partition).begin().await?;
        let author = self.store.author().to_string();
        let mut records = Vec::new();

        for candidate in candidates {
            let writes = plan_merge(&txn, *candidate).await?;
            if !writes.is_empty() {
                records.extend(self.store.apply_writes(&txn, &author, &writes).await?);
            }
        }

        txn.commit().await?;

        // the merge is itself a set of local mutations; peers learn about it
        // through the same ledger flow as any other change
        self.store.push_records(partition, &records).await;
        Ok(())
    }
}

/// Work out the merge for one candidate against current transaction state.
/// Later candidates in the same batch see the effects of earlier merges, so a
/// group mentioned twice becomes a no-op the second time.
async fn plan_merge<C: ConnectionTrait>(txn: &C, candidate: Uuid) -> StoreResult<Vec<EntityWrite>> {
    let Some(candidate_tag) = entities::Tag::find()
        .filter(tag::Column::Uuid.eq(candidate))
        .one(txn)
        .await?
    else {
        debug!(%candidate, "ignoring a tag that was deleted before deduplication");
        return Ok(Vec::new());
    };

    // All same-name tags sorted by uuid; the sort order decides the winner.
    let mut duplicates = entities::Tag::find()
        .filter(tag::Column::Name.eq(&candidate_tag.name))
        .order_by_asc(tag::Column::Uuid)
        .all(txn)
        .await?;

    // Tags in other zones are not duplicates, even under the same name.
    // `zone_id` can be None, meaning the private default zone; the filter
    // rule holds for that case too.
    duplicates.retain(|t| t.zone_id == candidate_tag.zone_id);

    if duplicates.len() < 2 {
        return Ok(Vec::new());
    }

    info!(
        name = %candidate_tag.name,
        count = duplicates.len(),
        "deduplicating tags"
    );

    let winner = duplicates.remove(0);
    let mut writes = Vec::new();

    for loser in duplicates {
        let links = entities::PhotoTag::find()
            .filter(photo_tag::Column::TagId.eq(loser.id))
            .all(txn)
            .await?;
        for link in links {
            if let Some(linked_photo) = entities::Photo::find_by_id(link.photo_id).one(txn).await? {
                writes.push(EntityWrite::UnlinkTag {
                    photo: linked_photo.uuid,
                    tag: loser.uuid,
                });
                writes.push(EntityWrite::LinkTag {
                    photo: linked_photo.uuid,
                    tag: winner.uuid,
                });
            }
        }
        writes.push(EntityWrite::Delete {
            kind: EntityKind::Tag,
            uuid: loser.uuid,
        });
    }

    Ok(writes)
}
