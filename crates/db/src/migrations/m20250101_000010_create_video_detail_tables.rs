//! Create video localization, channel detail and thumbnail detail tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(VideoLocalization::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VideoLocalization::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(VideoLocalization::VideoId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VideoLocalization::Language)
                            .string_len(10)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VideoLocalization::Title)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(VideoLocalization::Description).text())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_video_localization_video")
                            .from(VideoLocalization::Table, VideoLocalization::VideoId)
                            .to(Video::Table, Video::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ChannelDetail::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ChannelDetail::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ChannelDetail::VideoId)
                            .string_len(32)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(ChannelDetail::ChannelTitle)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ChannelDetail::ChannelId)
                            .string_len(128)
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_channel_detail_video")
                            .from(ChannelDetail::Table, ChannelDetail::VideoId)
                            .to(Video::Table, Video::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ThumbnailDetail::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ThumbnailDetail::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ThumbnailDetail::VideoId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ThumbnailDetail::Url)
                            .string_len(1024)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ThumbnailDetail::Width).integer().not_null())
                    .col(ColumnDef::new(ThumbnailDetail::Height).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_thumbnail_detail_video")
                            .from(ThumbnailDetail::Table, ThumbnailDetail::VideoId)
                            .to(Video::Table, Video::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (video_id, language) - one localization per language
        manager
            .create_index(
                Index::create()
                    .name("idx_video_localization_video_language")
                    .table(VideoLocalization::Table)
                    .col(VideoLocalization::VideoId)
                    .col(VideoLocalization::Language)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_thumbnail_detail_video")
                    .table(ThumbnailDetail::Table)
                    .col(ThumbnailDetail::VideoId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ThumbnailDetail::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ChannelDetail::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(VideoLocalization::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum VideoLocalization {
    Table,
    Id,
    VideoId,
    Language,
    Title,
    Description,
}

#[derive(Iden)]
enum ChannelDetail {
    Table,
    Id,
    VideoId,
    ChannelTitle,
    ChannelId,
}

#[derive(Iden)]
enum ThumbnailDetail {
    Table,
    Id,
    VideoId,
    Url,
    Width,
    Height,
}

#[derive(Iden)]
enum Video {
    Table,
    Id,
}
