//! Share descriptor entity
//!
//! One row per remote zone the local account can see. A descriptor whose
//! owner participant matches the local account identity represents a share
//! the local user created; any other descriptor arrived through an accepted
//! invitation.

use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "shares")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub uuid: Uuid,

    /// Display title derived from the creation timestamp. Display-unique by
    /// convention, not enforced.
    pub title: String,

    #[sea_orm(unique)]
    pub zone_id: Uuid,

    pub public_permission: PublicPermission,

    pub created_at: DateTimeUtc,
}

/// How far a share is open beyond its invited participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum PublicPermission {
    #[sea_orm(string_value = "none")]
    None,
    #[sea_orm(string_value = "read_only")]
    ReadOnly,
    #[sea_orm(string_value = "read_write")]
    ReadWrite,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::participant::Entity")]
    Participants,
}

impl Related<super::participant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Participants.def()
    }
}

impl ActiveModelBehavior for ActiveModel {
    fn new() -> Self {
        Self {
            uuid: Set(Uuid::new_v4()),
            created_at: Set(chrono::Utc::now()),
            ..ActiveModelTrait::default()
        }
    }
}
