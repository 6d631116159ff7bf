//! Create playlist and playlist entry tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Playlist::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Playlist::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Playlist::CreatedBy).string_len(32).not_null())
                    .col(ColumnDef::new(Playlist::Name).string_len(128).not_null())
                    .col(ColumnDef::new(Playlist::Description).text())
                    .col(ColumnDef::new(Playlist::IsPublic).boolean().not_null().default(false))
                    .col(
                        ColumnDef::new(Playlist::EntriesCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Playlist::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Playlist::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_playlist_user")
                            .from(Playlist::Table, Playlist::CreatedBy)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PlaylistEntry::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PlaylistEntry::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PlaylistEntry::PlaylistId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PlaylistEntry::ContentType)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PlaylistEntry::ContentId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PlaylistEntry::Position)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(PlaylistEntry::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_playlist_entry_playlist")
                            .from(PlaylistEntry::Table, PlaylistEntry::PlaylistId)
                            .to(Playlist::Table, Playlist::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: created_by (for listing a user's playlists)
        manager
            .create_index(
                Index::create()
                    .name("idx_playlist_created_by")
                    .table(Playlist::Table)
                    .col(Playlist::CreatedBy)
                    .to_owned(),
            )
            .await?;

        // Index: (playlist_id, position) - ordered listing
        manager
            .create_index(
                Index::create()
                    .name("idx_playlist_entry_playlist_position")
                    .table(PlaylistEntry::Table)
                    .col(PlaylistEntry::PlaylistId)
                    .col(PlaylistEntry::Position)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_playlist_entry_content")
                    .table(PlaylistEntry::Table)
                    .col(PlaylistEntry::ContentType)
                    .col(PlaylistEntry::ContentId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PlaylistEntry::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Playlist::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Playlist {
    Table,
    Id,
    CreatedBy,
    Name,
    Description,
    IsPublic,
    EntriesCount,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum PlaylistEntry {
    Table,
    Id,
    PlaylistId,
    ContentType,
    ContentId,
    Position,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
