//! Share lifecycle manager

use crate::history::HistoryService;
use crate::infrastructure::database::entities::{participant, photo, photo_data, rating, share, tag, thumbnail};
use crate::infrastructure::events::{Event, EventBus};
use crate::remote::{RemoteError, RemoteSync};
use crate::store::{
	AcceptanceStatus, EntityKind, EntityWrite, ParticipantPermission, ParticipantRole, Partition,
	PartitionStore, PublicPermission,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::ShareError;

/// Manages the Private -> Shared -> Purged lifecycle of entity subgraphs
pub struct ShareManager {
	store: Arc<PartitionStore>,
	remote: Arc<dyn RemoteSync>,
	history: HistoryService,
	events: Arc<EventBus>,
	/// Account identity of the local user; the owner row of every share this
	/// user creates carries it
	identity: String,
}

impl ShareManager {
	pub fn new(
		store: Arc<PartitionStore>,
		remote: Arc<dyn RemoteSync>,
		history: HistoryService,
		events: Arc<EventBus>,
		identity: String,
	) -> Self {
		Self {
			store,
			remote,
			history,
			events,
			identity,
		}
	}

	/// The share whose zone contains the photo, if the photo is shared at all
	pub async fn existing_share(&self, photo_identity: Uuid) -> Result<Option<share::Model>, ShareError> {
		let Some(photo) = self.store.find_photo(Partition::Shared, photo_identity).await? else {
			return Ok(None);
		};
		let Some(zone_id) = photo.zone_id else {
			return Ok(None);
		};
		Ok(self.store.find_share_by_zone(Partition::Shared, zone_id).await?)
	}

	/// Find a share by its display title
	pub async fn share_with_title(&self, title: &str) -> Result<Option<share::Model>, ShareError> {
		Ok(self
			.store
			.shares(Partition::Shared)
			.await?
			.into_iter()
			.find(|s| s.title == title))
	}

	/// Titles of every share the local account can see
	pub async fn share_titles(&self) -> Result<Vec<String>, ShareError> {
		Ok(self
			.store
			.shares(Partition::Shared)
			.await?
			.into_iter()
			.map(|s| s.title)
			.collect())
	}

	/// Create a new share around a photo's subgraph.
	///
	/// Always allocates a fresh zone; calling this twice for the same photo
	/// creates two zones, and backends cap zones per account. Callers should
	/// check [`existing_share`](Self::existing_share) first and fall back to
	/// [`add_to_existing_share`](Self::add_to_existing_share) when the cap is
	/// hit.
	#[instrument(skip(self))]
	pub async fn create_share(&self, photo_identity: Uuid) -> Result<share::Model, ShareError> {
		let graph = self.collect_subgraph(photo_identity).await?;

		let zone_id = match self.remote.create_zone(Partition::Shared).await {
			Ok(zone_id) => zone_id,
			Err(RemoteError::ZoneLimitExceeded) => return Err(ShareError::ZoneLimitExceeded),
			Err(err) => return Err(ShareError::Remote(err)),
		};

		let share_uuid = Uuid::new_v4();
		let created_at = Utc::now();

		// The descriptor, its owner row, and the subgraph land in the shared
		// partition first; only then are the source copies tombstoned.
		let mut writes = vec![
			EntityWrite::PutShare {
				uuid: share_uuid,
				title: share_title(created_at),
				zone_id,
				public_permission: PublicPermission::None,
			},
			EntityWrite::PutParticipant {
				uuid: Uuid::new_v4(),
				share: share_uuid,
				identity: self.identity.clone(),
				role: ParticipantRole::Owner,
				permission: ParticipantPermission::ReadWrite,
				acceptance_status: AcceptanceStatus::Accepted,
			},
		];
		self.plan_move_into_zone(&graph, zone_id, &mut writes);
		self.store.write(Partition::Shared, writes).await?;
		self.tombstone_source(&graph).await?;

		let share = self
			.store
			.find_share(Partition::Shared, share_uuid)
			.await?
			.ok_or(ShareError::ShareNotFound(share_uuid))?;

		info!(share = %share_uuid, zone = %zone_id, "created share");
		self.events.emit(Event::ShareCreated {
			share_id: share_uuid,
			zone_id,
		});
		Ok(share)
	}

	/// Move a photo's subgraph into an existing share's zone.
	///
	/// Merging two object graphs into one zone is exactly how duplicate tags
	/// come to exist, so the carried tags run through deduplication before
	/// this returns.
	#[instrument(skip(self))]
	pub async fn add_to_existing_share(
		&self,
		photo_identity: Uuid,
		share_identity: Uuid,
	) -> Result<share::Model, ShareError> {
		let share = self
			.store
			.find_share(Partition::Shared, share_identity)
			.await?
			.ok_or(ShareError::ShareNotFound(share_identity))?;

		let graph = self.collect_subgraph(photo_identity).await?;

		let mut writes = Vec::new();
		let carried_tags = self.plan_move_into_zone(&graph, share.zone_id, &mut writes);
		self.store.write(Partition::Shared, writes).await?;
		self.tombstone_source(&graph).await?;

		if !carried_tags.is_empty() {
			self.history
				.deduplicate(Partition::Shared, carried_tags)
				.await?;
		}

		Ok(share)
	}

	/// Add a participant to a share the local account owns.
	///
	/// Fails with [`ShareError::ParticipantNotFound`] when identity lookup
	/// yields no match; nothing is mutated in that case.
	pub async fn add_participant(
		&self,
		lookup_key: &str,
		permission: ParticipantPermission,
		share_identity: Uuid,
	) -> Result<participant::Model, ShareError> {
		let share = self
			.store
			.find_share(Partition::Shared, share_identity)
			.await?
			.ok_or(ShareError::ShareNotFound(share_identity))?;
		self.ensure_owner(&share).await?;

		let Some(resolved) = self.remote.resolve_identity(lookup_key).await? else {
			return Err(ShareError::ParticipantNotFound(lookup_key.to_string()));
		};

		let participant_uuid = Uuid::new_v4();
		self.store
			.write(
				Partition::Shared,
				vec![EntityWrite::PutParticipant {
					uuid: participant_uuid,
					share: share.uuid,
					identity: resolved.identity,
					role: ParticipantRole::PrivateUser,
					permission,
					acceptance_status: AcceptanceStatus::Pending,
				}],
			)
			.await?;

		self.store
			.find_participant(Partition::Shared, participant_uuid)
			.await?
			.ok_or(ShareError::ShareNotFound(share_identity))
	}

	/// Remove participants from a share the local account owns
	pub async fn remove_participants(
		&self,
		participant_identities: &[Uuid],
		share_identity: Uuid,
	) -> Result<(), ShareError> {
		let share = self
			.store
			.find_share(Partition::Shared, share_identity)
			.await?
			.ok_or(ShareError::ShareNotFound(share_identity))?;
		self.ensure_owner(&share).await?;

		let members = self.store.participants(Partition::Shared, share.uuid).await?;
		let mut writes = Vec::new();
		for identity in participant_identities {
			match members.iter().find(|p| p.uuid == *identity) {
				Some(member) if member.role == ParticipantRole::Owner => {
					debug!(participant = %identity, "the owner row cannot be removed from its share");
				}
				Some(member) => writes.push(EntityWrite::Delete {
					kind: EntityKind::Participant,
					uuid: member.uuid,
				}),
				None => debug!(participant = %identity, "participant is not on this share"),
			}
		}
		if !writes.is_empty() {
			self.store.write(Partition::Shared, writes).await?;
		}
		Ok(())
	}

	/// Change how far the share is open beyond its invited participants
	pub async fn set_public_permission(
		&self,
		share_identity: Uuid,
		permission: PublicPermission,
	) -> Result<(), ShareError> {
		let share = self
			.store
			.find_share(Partition::Shared, share_identity)
			.await?
			.ok_or(ShareError::ShareNotFound(share_identity))?;
		self.ensure_owner(&share).await?;

		self.store
			.write(
				Partition::Shared,
				vec![EntityWrite::PutShare {
					uuid: share.uuid,
					title: share.title,
					zone_id: share.zone_id,
					public_permission: permission,
				}],
			)
			.await?;
		Ok(())
	}

	/// Tear a share down.
	///
	/// The owner deletes the remote zone and every local entity in it. A
	/// participant only removes themselves and their local copy; the zone
	/// stays intact for everyone else.
	#[instrument(skip(self))]
	pub async fn purge(&self, share_identity: Uuid) -> Result<(), ShareError> {
		let share = self
			.store
			.find_share(Partition::Shared, share_identity)
			.await?
			.ok_or(ShareError::ShareNotFound(share_identity))?;
		let members = self.store.participants(Partition::Shared, share.uuid).await?;
		let is_owner = members
			.iter()
			.any(|p| p.role == ParticipantRole::Owner && p.identity == self.identity);

		if is_owner {
			if let Err(err) = self.remote.delete_zone(share.zone_id).await {
				// the zone may already be gone on the backend; the local copy
				// must not outlive the share either way
				warn!(zone = %share.zone_id, "failed to delete the remote zone: {err}");
			}
		} else if let Some(me) = members.iter().find(|p| p.identity == self.identity) {
			self.store
				.write(
					Partition::Shared,
					vec![EntityWrite::Delete {
						kind: EntityKind::Participant,
						uuid: me.uuid,
					}],
				)
				.await?;
		}

		let mut writes = Vec::new();
		for photo in self.store.photos_in_zone(Partition::Shared, share.zone_id).await? {
			writes.push(EntityWrite::Delete {
				kind: EntityKind::Photo,
				uuid: photo.uuid,
			});
		}
		for tag in self.store.tags_in_zone(Partition::Shared, share.zone_id).await? {
			writes.push(EntityWrite::Delete {
				kind: EntityKind::Tag,
				uuid: tag.uuid,
			});
		}
		writes.push(EntityWrite::Delete {
			kind: EntityKind::Share,
			uuid: share.uuid,
		});
		self.store.write(Partition::Shared, writes).await?;

		info!(zone = %share.zone_id, "purged share");
		self.events.emit(Event::SharePurged {
			zone_id: share.zone_id,
		});

		// Observers learn about the teardown through a structural change
		// signal; the purge writes are self-authored, so the replay that
		// follows carries zero records.
		self.history.notify_remote_change(Partition::Shared);
		Ok(())
	}

	async fn ensure_owner(&self, share: &share::Model) -> Result<(), ShareError> {
		let members = self.store.participants(Partition::Shared, share.uuid).await?;
		let owns = members
			.iter()
			.any(|p| p.role == ParticipantRole::Owner && p.identity == self.identity);
		if owns {
			Ok(())
		} else {
			Err(ShareError::NotShareOwner(share.uuid))
		}
	}

	/// Everything that travels with a photo when it changes zones
	async fn collect_subgraph(&self, photo_identity: Uuid) -> Result<Subgraph, ShareError> {
		let (source, photo) = match self.store.find_photo(Partition::Owned, photo_identity).await? {
			Some(photo) => (Partition::Owned, photo),
			None => match self.store.find_photo(Partition::Shared, photo_identity).await? {
				Some(photo) => (Partition::Shared, photo),
				None => return Err(ShareError::PhotoNotFound(photo_identity)),
			},
		};

		let thumbnail = self.store.thumbnail_of(source, photo_identity).await?;
		let photo_data = self.store.photo_data_of(source, photo_identity).await?;
		let ratings = self.store.ratings_of(source, photo_identity).await?;

		let mut tags = Vec::new();
		for tag in self.store.tags_of_photo(source, photo_identity).await? {
			let other_links = self
				.store
				.tag_link_count_excluding(source, tag.uuid, photo_identity)
				.await?;
			tags.push(CarriedTag {
				tag,
				exclusive: other_links == 0,
			});
		}

		Ok(Subgraph {
			source,
			photo,
			thumbnail,
			photo_data,
			ratings,
			tags,
		})
	}

	/// Plan the writes that re-home the subgraph into `zone_id` inside the
	/// shared partition. Returns the identities of the tags that end up in
	/// the zone, which are the deduplication candidates for an existing zone.
	fn plan_move_into_zone(
		&self,
		graph: &Subgraph,
		zone_id: Uuid,
		writes: &mut Vec<EntityWrite>,
	) -> Vec<Uuid> {
		writes.push(EntityWrite::PutPhoto {
			uuid: graph.photo.uuid,
			unique_name: graph.photo.unique_name.clone(),
			zone_id: Some(zone_id),
		});
		if let Some(thumbnail) = &graph.thumbnail {
			writes.push(EntityWrite::PutThumbnail {
				uuid: thumbnail.uuid,
				photo: graph.photo.uuid,
				data: thumbnail.data.clone(),
			});
		}
		if let Some(photo_data) = &graph.photo_data {
			writes.push(EntityWrite::PutPhotoData {
				uuid: photo_data.uuid,
				photo: graph.photo.uuid,
				data: photo_data.data.clone(),
			});
		}
		for rating in &graph.ratings {
			writes.push(EntityWrite::PutRating {
				uuid: rating.uuid,
				photo: graph.photo.uuid,
				value: rating.value,
			});
		}

		let mut carried = Vec::new();
		for carried_tag in &graph.tags {
			// A tag still referenced by other photos in the source keeps
			// serving them there; the zone gets a copy under a fresh
			// identity. An exclusively-held tag moves with its identity.
			let target_uuid = if carried_tag.exclusive {
				carried_tag.tag.uuid
			} else {
				Uuid::new_v4()
			};
			writes.push(EntityWrite::PutTag {
				uuid: target_uuid,
				name: carried_tag.tag.name.clone(),
				zone_id: Some(zone_id),
			});
			writes.push(EntityWrite::LinkTag {
				photo: graph.photo.uuid,
				tag: target_uuid,
			});
			carried.push(target_uuid);
		}
		carried
	}

	/// Remove the source copies after the subgraph landed in its zone
	async fn tombstone_source(&self, graph: &Subgraph) -> Result<(), ShareError> {
		if graph.source == Partition::Shared {
			// zone-to-zone move inside the shared partition: the puts above
			// re-homed the rows; only stale links to tags that stayed behind
			// need dropping
			let mut writes = Vec::new();
			for carried_tag in &graph.tags {
				if !carried_tag.exclusive {
					writes.push(EntityWrite::UnlinkTag {
						photo: graph.photo.uuid,
						tag: carried_tag.tag.uuid,
					});
				}
			}
			if !writes.is_empty() {
				self.store.write(Partition::Shared, writes).await?;
			}
			return Ok(());
		}

		let mut writes = vec![EntityWrite::Delete {
			kind: EntityKind::Photo,
			uuid: graph.photo.uuid,
		}];
		for carried_tag in &graph.tags {
			if carried_tag.exclusive {
				writes.push(EntityWrite::Delete {
					kind: EntityKind::Tag,
					uuid: carried_tag.tag.uuid,
				});
			}
		}
		self.store.write(Partition::Owned, writes).await?;
		Ok(())
	}
}

struct Subgraph {
	source: Partition,
	photo: photo::Model,
	thumbnail: Option<thumbnail::Model>,
	photo_data: Option<photo_data::Model>,
	ratings: Vec<rating::Model>,
	tags: Vec<CarriedTag>,
}

struct CarriedTag {
	tag: tag::Model,
	exclusive: bool,
}

/// Display title derived from the creation timestamp, the same way every
/// other device derives it
fn share_title(created_at: DateTime<Utc>) -> String {
	format!("Share-{}", created_at.format("%-m/%-d/%y, %H:%M"))
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;

	#[test]
	fn share_titles_derive_from_the_creation_timestamp() {
		let created_at = Utc.with_ymd_and_hms(2025, 3, 7, 14, 5, 0).unwrap();
		assert_eq!(share_title(created_at), "Share-3/7/25, 14:05");
	}
}
