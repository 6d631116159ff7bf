//! Add profile columns to the user table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(User::Table)
                    .add_column(ColumnDef::new(User::FirstName).string_len(150))
                    .add_column(ColumnDef::new(User::LastName).string_len(150))
                    .add_column(ColumnDef::new(User::Gender).string_len(1))
                    .add_column(ColumnDef::new(User::Dob).date())
                    .add_column(ColumnDef::new(User::City).string_len(128))
                    .add_column(ColumnDef::new(User::State).string_len(128))
                    .add_column(ColumnDef::new(User::Country).string_len(2))
                    .add_column(ColumnDef::new(User::Bio).text())
                    .add_column(
                        ColumnDef::new(User::PreferredLanguage)
                            .string_len(10)
                            .not_null()
                            .default("en"),
                    )
                    .add_column(
                        ColumnDef::new(User::HasAgreedToTerms)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .add_column(
                        ColumnDef::new(User::HasAgreedToPrivacyPolicy)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .add_column(
                        ColumnDef::new(User::HasFinishedOnboarding)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(User::Table)
                    .drop_column(User::FirstName)
                    .drop_column(User::LastName)
                    .drop_column(User::Gender)
                    .drop_column(User::Dob)
                    .drop_column(User::City)
                    .drop_column(User::State)
                    .drop_column(User::Country)
                    .drop_column(User::Bio)
                    .drop_column(User::PreferredLanguage)
                    .drop_column(User::HasAgreedToTerms)
                    .drop_column(User::HasAgreedToPrivacyPolicy)
                    .drop_column(User::HasFinishedOnboarding)
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
enum User {
    Table,
    FirstName,
    LastName,
    Gender,
    Dob,
    City,
    State,
    Country,
    Bio,
    PreferredLanguage,
    HasAgreedToTerms,
    HasAgreedToPrivacyPolicy,
    HasFinishedOnboarding,
}
