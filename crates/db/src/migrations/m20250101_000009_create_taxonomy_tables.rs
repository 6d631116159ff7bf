//! Create category, hashtag and tag tables and their link tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

fn name_table<T: Iden + 'static>(table: T, id: T, name: T) -> TableCreateStatement {
    Table::create()
        .table(table)
        .if_not_exists()
        .col(ColumnDef::new(id).string_len(32).not_null().primary_key())
        .col(ColumnDef::new(name).string_len(128).not_null().unique_key())
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(name_table(Category::Table, Category::Id, Category::Name))
            .await?;
        manager
            .create_table(name_table(Hashtag::Table, Hashtag::Id, Hashtag::Name))
            .await?;
        manager
            .create_table(name_table(Tag::Table, Tag::Id, Tag::Name))
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ContentCategory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ContentCategory::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ContentCategory::CategoryId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ContentCategory::ContentType)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ContentCategory::ContentId)
                            .string_len(32)
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_content_category_category")
                            .from(ContentCategory::Table, ContentCategory::CategoryId)
                            .to(Category::Table, Category::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ContentHashtag::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ContentHashtag::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ContentHashtag::HashtagId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ContentHashtag::ContentType)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ContentHashtag::ContentId)
                            .string_len(32)
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_content_hashtag_hashtag")
                            .from(ContentHashtag::Table, ContentHashtag::HashtagId)
                            .to(Hashtag::Table, Hashtag::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(VideoTag::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VideoTag::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(VideoTag::VideoId).string_len(32).not_null())
                    .col(ColumnDef::new(VideoTag::TagId).string_len(32).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_video_tag_video")
                            .from(VideoTag::Table, VideoTag::VideoId)
                            .to(Video::Table, Video::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_video_tag_tag")
                            .from(VideoTag::Table, VideoTag::TagId)
                            .to(Tag::Table, Tag::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One link per (label, content) pair
        manager
            .create_index(
                Index::create()
                    .name("idx_content_category_unique")
                    .table(ContentCategory::Table)
                    .col(ContentCategory::CategoryId)
                    .col(ContentCategory::ContentType)
                    .col(ContentCategory::ContentId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_content_category_content")
                    .table(ContentCategory::Table)
                    .col(ContentCategory::ContentType)
                    .col(ContentCategory::ContentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_content_hashtag_unique")
                    .table(ContentHashtag::Table)
                    .col(ContentHashtag::HashtagId)
                    .col(ContentHashtag::ContentType)
                    .col(ContentHashtag::ContentId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_content_hashtag_content")
                    .table(ContentHashtag::Table)
                    .col(ContentHashtag::ContentType)
                    .col(ContentHashtag::ContentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_video_tag_unique")
                    .table(VideoTag::Table)
                    .col(VideoTag::VideoId)
                    .col(VideoTag::TagId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VideoTag::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ContentHashtag::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ContentCategory::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tag::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Hashtag::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Category::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Category {
    Table,
    Id,
    Name,
}

#[derive(Iden)]
enum Hashtag {
    Table,
    Id,
    Name,
}

#[derive(Iden)]
enum Tag {
    Table,
    Id,
    Name,
}

#[derive(Iden)]
enum ContentCategory {
    Table,
    Id,
    CategoryId,
    ContentType,
    ContentId,
}

#[derive(Iden)]
enum ContentHashtag {
    Table,
    Id,
    HashtagId,
    ContentType,
    ContentId,
}

#[derive(Iden)]
enum VideoTag {
    Table,
    Id,
    VideoId,
    TagId,
}

#[derive(Iden)]
enum Video {
    Table,
    Id,
}
