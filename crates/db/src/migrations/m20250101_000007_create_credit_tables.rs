//! Create personnel, cast credit and produce credit tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Personnel::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Personnel::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Personnel::FirstName).string_len(128).not_null())
                    .col(ColumnDef::new(Personnel::MiddleName).string_len(128))
                    .col(ColumnDef::new(Personnel::LastName).string_len(128).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CastCredit::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CastCredit::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CastCredit::PersonnelId).string_len(32).not_null())
                    .col(ColumnDef::new(CastCredit::ContentType).string_len(32).not_null())
                    .col(ColumnDef::new(CastCredit::ContentId).string_len(32).not_null())
                    .col(ColumnDef::new(CastCredit::CastType).integer().not_null().default(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cast_credit_personnel")
                            .from(CastCredit::Table, CastCredit::PersonnelId)
                            .to(Personnel::Table, Personnel::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProduceCredit::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProduceCredit::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ProduceCredit::PersonnelId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProduceCredit::ContentType)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ProduceCredit::ContentId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(ProduceCredit::ProduceType)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_produce_credit_personnel")
                            .from(ProduceCredit::Table, ProduceCredit::PersonnelId)
                            .to(Personnel::Table, Personnel::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_cast_credit_content")
                    .table(CastCredit::Table)
                    .col(CastCredit::ContentType)
                    .col(CastCredit::ContentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_produce_credit_content")
                    .table(ProduceCredit::Table)
                    .col(ProduceCredit::ContentType)
                    .col(ProduceCredit::ContentId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProduceCredit::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CastCredit::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Personnel::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Personnel {
    Table,
    Id,
    FirstName,
    MiddleName,
    LastName,
}

#[derive(Iden)]
enum CastCredit {
    Table,
    Id,
    PersonnelId,
    ContentType,
    ContentId,
    CastType,
}

#[derive(Iden)]
enum ProduceCredit {
    Table,
    Id,
    PersonnelId,
    ContentType,
    ContentId,
    ProduceType,
}
