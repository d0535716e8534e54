//! Append-only change log
//!
//! Every committed mutation in a partition appends one row here inside the
//! same transaction, so the log is a complete, totally ordered history of
//! that partition. The auto-increment `id` is the sequence token replay
//! checkpoints point at; rows are never updated or reused.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "change_log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Tag of the writer that committed the mutation. Replay filters rows
    /// authored by the local writer to avoid feedback loops.
    #[sea_orm(indexed)]
    pub author: String,

    pub entity_kind: EntityKind,

    pub entity_uuid: Uuid,

    pub change_kind: ChangeKind,

    pub created_at: DateTimeUtc,
}

/// Entity kinds addressable through the change log and the typed write API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum EntityKind {
    #[sea_orm(string_value = "photo")]
    Photo,
    #[sea_orm(string_value = "thumbnail")]
    Thumbnail,
    #[sea_orm(string_value = "photo_data")]
    PhotoData,
    #[sea_orm(string_value = "tag")]
    Tag,
    #[sea_orm(string_value = "rating")]
    Rating,
    #[sea_orm(string_value = "share")]
    Share,
    #[sea_orm(string_value = "participant")]
    Participant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum ChangeKind {
    #[sea_orm(string_value = "insert")]
    Insert,
    #[sea_orm(string_value = "update")]
    Update,
    #[sea_orm(string_value = "delete")]
    Delete,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
