//! Tag entity
//!
//! Tags are the mergeable kind: independent peers can race to create a tag
//! with the same name, and deduplication later collapses the copies within a
//! partition and zone. The `uuid` doubles as the creation-order tiebreaker
//! that makes the merge winner deterministic on every peer.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tags")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub uuid: Uuid,

    #[sea_orm(indexed)]
    pub name: String,

    #[sea_orm(indexed, nullable)]
    pub zone_id: Option<Uuid>,

    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl Related<super::photo::Entity> for Entity {
    fn to() -> RelationDef {
        super::photo_tag::Relation::Photo.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::photo_tag::Relation::Tag.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
