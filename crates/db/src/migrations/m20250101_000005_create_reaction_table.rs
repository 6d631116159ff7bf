//! Create reaction table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Reaction::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Reaction::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Reaction::IsLike).boolean().not_null())
                    .col(ColumnDef::new(Reaction::PostedBy).string_len(32))
                    .col(ColumnDef::new(Reaction::ContentType).string_len(32).not_null())
                    .col(ColumnDef::new(Reaction::ContentId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Reaction::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Reaction::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reaction_user")
                            .from(Reaction::Table, Reaction::PostedBy)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Not unique: one-reaction-per-user is enforced by the service and can
        // be switched off, and orphaned reactions (posted_by NULL) must coexist.
        manager
            .create_index(
                Index::create()
                    .name("idx_reaction_content")
                    .table(Reaction::Table)
                    .col(Reaction::ContentType)
                    .col(Reaction::ContentId)
                    .col(Reaction::PostedBy)
                    .to_owned(),
            )
            .await?;

        // Index: posted_by (for listing user's reactions)
        manager
            .create_index(
                Index::create()
                    .name("idx_reaction_posted_by")
                    .table(Reaction::Table)
                    .col(Reaction::PostedBy)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Reaction::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Reaction {
    Table,
    Id,
    IsLike,
    PostedBy,
    ContentType,
    ContentId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
