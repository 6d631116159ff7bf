//! Create video and podcast tables migration.
//!
//! Both tables share the base content columns (uploader, metadata links and
//! the denormalized like/dislike/comment/view counters).

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Columns every content table carries, in table order.
fn base_columns<T: Iden + Copy + 'static>(
    table: T,
    cols: &BaseCols<T>,
) -> TableCreateStatement {
    Table::create()
        .table(table)
        .if_not_exists()
        .col(ColumnDef::new(cols.id).string_len(32).not_null().primary_key())
        .col(ColumnDef::new(cols.uploaded_by).string_len(32))
        .col(ColumnDef::new(cols.description).text())
        .col(ColumnDef::new(cols.duration_secs).big_integer())
        .col(ColumnDef::new(cols.released_date).date())
        .col(ColumnDef::new(cols.original_language_id).string_len(32))
        .col(ColumnDef::new(cols.upload_region_id).string_len(32))
        .col(ColumnDef::new(cols.score_imdb).double())
        .col(ColumnDef::new(cols.file_url).string_len(1024).not_null())
        .col(ColumnDef::new(cols.format).integer().not_null().default(0))
        .col(ColumnDef::new(cols.like_count).integer().not_null().default(0))
        .col(ColumnDef::new(cols.dislike_count).integer().not_null().default(0))
        .col(ColumnDef::new(cols.comment_count).integer().not_null().default(0))
        .col(ColumnDef::new(cols.view_count).big_integer().not_null().default(0))
        .col(
            ColumnDef::new(cols.created_at)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .col(ColumnDef::new(cols.updated_at).timestamp_with_time_zone())
        .foreign_key(
            ForeignKey::create()
                .from(table, cols.uploaded_by)
                .to(User::Table, User::Id)
                .on_delete(ForeignKeyAction::SetNull),
        )
        .foreign_key(
            ForeignKey::create()
                .from(table, cols.original_language_id)
                .to(Language::Table, Language::Id)
                .on_delete(ForeignKeyAction::SetNull),
        )
        .foreign_key(
            ForeignKey::create()
                .from(table, cols.upload_region_id)
                .to(Region::Table, Region::Id)
                .on_delete(ForeignKeyAction::SetNull),
        )
        .to_owned()
}

struct BaseCols<T> {
    id: T,
    uploaded_by: T,
    description: T,
    duration_secs: T,
    released_date: T,
    original_language_id: T,
    upload_region_id: T,
    score_imdb: T,
    file_url: T,
    format: T,
    like_count: T,
    dislike_count: T,
    comment_count: T,
    view_count: T,
    created_at: T,
    updated_at: T,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let video_cols = BaseCols {
            id: Video::Id,
            uploaded_by: Video::UploadedBy,
            description: Video::Description,
            duration_secs: Video::DurationSecs,
            released_date: Video::ReleasedDate,
            original_language_id: Video::OriginalLanguageId,
            upload_region_id: Video::UploadRegionId,
            score_imdb: Video::ScoreImdb,
            file_url: Video::FileUrl,
            format: Video::Format,
            like_count: Video::LikeCount,
            dislike_count: Video::DislikeCount,
            comment_count: Video::CommentCount,
            view_count: Video::ViewCount,
            created_at: Video::CreatedAt,
            updated_at: Video::UpdatedAt,
        };

        let mut video = base_columns(Video::Table, &video_cols);
        video
            .col(ColumnDef::new(Video::YoutubeVideoId).string_len(255).unique_key())
            .col(ColumnDef::new(Video::Dimension).string_len(10))
            .col(ColumnDef::new(Video::Definition).string_len(10))
            .col(ColumnDef::new(Video::Caption).boolean().not_null().default(false))
            .col(
                ColumnDef::new(Video::LicensedContent)
                    .boolean()
                    .not_null()
                    .default(false),
            )
            .col(ColumnDef::new(Video::PrivacyStatus).string_len(255))
            .col(ColumnDef::new(Video::Embeddable).boolean().not_null().default(false))
            .col(ColumnDef::new(Video::MadeForKids).boolean().not_null().default(false));
        manager.create_table(video).await?;

        let podcast_cols = BaseCols {
            id: Podcast::Id,
            uploaded_by: Podcast::UploadedBy,
            description: Podcast::Description,
            duration_secs: Podcast::DurationSecs,
            released_date: Podcast::ReleasedDate,
            original_language_id: Podcast::OriginalLanguageId,
            upload_region_id: Podcast::UploadRegionId,
            score_imdb: Podcast::ScoreImdb,
            file_url: Podcast::FileUrl,
            format: Podcast::Format,
            like_count: Podcast::LikeCount,
            dislike_count: Podcast::DislikeCount,
            comment_count: Podcast::CommentCount,
            view_count: Podcast::ViewCount,
            created_at: Podcast::CreatedAt,
            updated_at: Podcast::UpdatedAt,
        };
        manager
            .create_table(base_columns(Podcast::Table, &podcast_cols))
            .await?;

        // Index: uploaded_by (for listing a user's uploads)
        manager
            .create_index(
                Index::create()
                    .name("idx_video_uploaded_by")
                    .table(Video::Table)
                    .col(Video::UploadedBy)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_podcast_uploaded_by")
                    .table(Podcast::Table)
                    .col(Podcast::UploadedBy)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Podcast::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Video::Table).to_owned())
            .await
    }
}

#[derive(Iden, Clone, Copy)]
enum Video {
    Table,
    Id,
    UploadedBy,
    Description,
    DurationSecs,
    ReleasedDate,
    OriginalLanguageId,
    UploadRegionId,
    ScoreImdb,
    FileUrl,
    Format,
    YoutubeVideoId,
    Dimension,
    Definition,
    Caption,
    LicensedContent,
    PrivacyStatus,
    Embeddable,
    MadeForKids,
    LikeCount,
    DislikeCount,
    CommentCount,
    ViewCount,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden, Clone, Copy)]
enum Podcast {
    Table,
    Id,
    UploadedBy,
    Description,
    DurationSecs,
    ReleasedDate,
    OriginalLanguageId,
    UploadRegionId,
    ScoreImdb,
    FileUrl,
    Format,
    LikeCount,
    DislikeCount,
    CommentCount,
    ViewCount,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

#[derive(Iden)]
enum Language {
    Table,
    Id,
}

#[derive(Iden)]
enum Region {
    Table,
    Id,
}
