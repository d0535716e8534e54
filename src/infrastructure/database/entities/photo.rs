//! Photo entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "photos")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub uuid: Uuid,

    pub unique_name: String,

    /// Zone the photo belongs to; `None` means the private default zone.
    #[sea_orm(indexed, nullable)]
    pub zone_id: Option<Uuid>,

    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::thumbnail::Entity")]
    Thumbnail,
    #[sea_orm(has_one = "super::photo_data::Entity")]
    PhotoData,
    #[sea_orm(has_many = "super::rating::Entity")]
    Ratings,
}

impl Related<super::thumbnail::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Thumbnail.def()
    }
}

impl Related<super::photo_data::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PhotoData.def()
    }
}

impl Related<super::rating::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ratings.def()
    }
}

impl Related<super::tag::Entity> for Entity {
    fn to() -> RelationDef {
        super::photo_tag::Relation::Tag.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::photo_tag::Relation::Photo.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
