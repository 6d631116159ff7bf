//! Create content title table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ContentTitle::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ContentTitle::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ContentTitle::TitleText).string_len(512).not_null())
                    .col(ColumnDef::new(ContentTitle::LanguageId).string_len(32))
                    .col(ColumnDef::new(ContentTitle::IsNative).boolean())
                    .col(ColumnDef::new(ContentTitle::ContentType).string_len(32).not_null())
                    .col(ColumnDef::new(ContentTitle::ContentId).string_len(32).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_content_title_language")
                            .from(ContentTitle::Table, ContentTitle::LanguageId)
                            .to(Language::Table, Language::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_content_title_content")
                    .table(ContentTitle::Table)
                    .col(ContentTitle::ContentType)
                    .col(ContentTitle::ContentId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ContentTitle::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ContentTitle {
    Table,
    Id,
    TitleText,
    LanguageId,
    IsNative,
    ContentType,
    ContentId,
}

#[derive(Iden)]
enum Language {
    Table,
    Id,
}
