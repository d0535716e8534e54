//! Initial migration to create all tables
//!
//! Runs against both partition databases so they carry the same schema.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create photos table with hybrid ID system
        manager
            .create_table(
                Table::create()
                    .table(Photos::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Photos::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Photos::Uuid).uuid().not_null().unique_key())
                    .col(ColumnDef::new(Photos::UniqueName).string().not_null())
                    .col(ColumnDef::new(Photos::ZoneId).uuid())
                    .col(ColumnDef::new(Photos::CreatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Thumbnails::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Thumbnails::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Thumbnails::Uuid).uuid().not_null().unique_key())
                    .col(ColumnDef::new(Thumbnails::PhotoId).integer().not_null())
                    .col(ColumnDef::new(Thumbnails::Data).blob().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Thumbnails::Table, Thumbnails::PhotoId)
                            .to(Photos::Table, Photos::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PhotoData::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PhotoData::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(PhotoData::Uuid).uuid().not_null().unique_key())
                    .col(ColumnDef::new(PhotoData::PhotoId).integer().not_null())
                    .col(ColumnDef::new(PhotoData::Data).blob().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(PhotoData::Table, PhotoData::PhotoId)
                            .to(Photos::Table, Photos::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Tags::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Tags::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Tags::Uuid).uuid().not_null().unique_key())
                    .col(ColumnDef::new(Tags::Name).string().not_null())
                    .col(ColumnDef::new(Tags::ZoneId).uuid())
                    .col(ColumnDef::new(Tags::CreatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PhotoTags::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PhotoTags::PhotoId).integer().not_null())
                    .col(ColumnDef::new(PhotoTags::TagId).integer().not_null())
                    .primary_key(Index::create().col(PhotoTags::PhotoId).col(PhotoTags::TagId))
                    .foreign_key(
                        ForeignKey::create()
                            .from(PhotoTags::Table, PhotoTags::PhotoId)
                            .to(Photos::Table, Photos::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(PhotoTags::Table, PhotoTags::TagId)
                            .to(Tags::Table, Tags::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Ratings::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Ratings::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Ratings::Uuid).uuid().not_null().unique_key())
                    .col(ColumnDef::new(Ratings::Value).small_integer().not_null())
                    .col(ColumnDef::new(Ratings::PhotoId).integer().not_null())
                    .col(ColumnDef::new(Ratings::CreatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Ratings::Table, Ratings::PhotoId)
                            .to(Photos::Table, Photos::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Shares::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Shares::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Shares::Uuid).uuid().not_null().unique_key())
                    .col(ColumnDef::new(Shares::Title).string().not_null())
                    .col(ColumnDef::new(Shares::ZoneId).uuid().not_null().unique_key())
                    .col(ColumnDef::new(Shares::PublicPermission).string().not_null())
                    .col(ColumnDef::new(Shares::CreatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Participants::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Participants::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Participants::Uuid).uuid().not_null().unique_key())
                    .col(ColumnDef::new(Participants::ShareId).integer().not_null())
                    .col(ColumnDef::new(Participants::Identity).string().not_null())
                    .col(ColumnDef::new(Participants::Role).string().not_null())
                    .col(ColumnDef::new(Participants::Permission).string().not_null())
                    .col(ColumnDef::new(Participants::AcceptanceStatus).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Participants::Table, Participants::ShareId)
                            .to(Shares::Table, Shares::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ChangeLog::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ChangeLog::Id).big_integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(ChangeLog::Author).string().not_null())
                    .col(ColumnDef::new(ChangeLog::EntityKind).string().not_null())
                    .col(ColumnDef::new(ChangeLog::EntityUuid).uuid().not_null())
                    .col(ColumnDef::new(ChangeLog::ChangeKind).string().not_null())
                    .col(ColumnDef::new(ChangeLog::CreatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        // Create indexes separately
        manager
            .create_index(
                Index::create()
                    .name("idx_photos_zone_id")
                    .table(Photos::Table)
                    .col(Photos::ZoneId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tags_name")
                    .table(Tags::Table)
                    .col(Tags::Name)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tags_zone_id")
                    .table(Tags::Table)
                    .col(Tags::ZoneId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_change_log_author")
                    .table(ChangeLog::Table)
                    .col(ChangeLog::Author)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ChangeLog::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Participants::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Shares::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Ratings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PhotoTags::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tags::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PhotoData::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Thumbnails::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Photos::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Photos {
    Table,
    Id,
    Uuid,
    UniqueName,
    ZoneId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Thumbnails {
    Table,
    Id,
    Uuid,
    PhotoId,
    Data,
}

#[derive(DeriveIden)]
enum PhotoData {
    Table,
    Id,
    Uuid,
    PhotoId,
    Data,
}

#[derive(DeriveIden)]
enum Tags {
    Table,
    Id,
    Uuid,
    Name,
    ZoneId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum PhotoTags {
    Table,
    PhotoId,
    TagId,
}

#[derive(DeriveIden)]
enum Ratings {
    Table,
    Id,
    Uuid,
    Value,
    PhotoId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Shares {
    Table,
    Id,
    Uuid,
    Title,
    ZoneId,
    PublicPermission,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Participants {
    Table,
    Id,
    Uuid,
    ShareId,
    Identity,
    Role,
    Permission,
    AcceptanceStatus,
}

#[derive(DeriveIden)]
enum ChangeLog {
    Table,
    Id,
    Author,
    EntityKind,
    EntityUuid,
    ChangeKind,
    CreatedAt,
}
