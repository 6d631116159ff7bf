//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250101_000001_create_user_table;
mod m20250101_000002_create_metadata_tables;
mod m20250101_000003_create_content_tables;
mod m20250101_000004_create_comment_table;
mod m20250101_000005_create_reaction_table;
mod m20250101_000006_create_playlist_tables;
mod m20250101_000007_create_credit_tables;
mod m20250101_000008_create_content_title_table;
mod m20250101_000009_create_taxonomy_tables;
mod m20250101_000010_create_video_detail_tables;
mod m20250101_000011_add_user_profile_columns;
mod m20250101_000012_create_friendship_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_user_table::Migration),
            Box::new(m20250101_000002_create_metadata_tables::Migration),
            Box::new(m20250101_000003_create_content_tables::Migration),
            Box::new(m20250101_000004_create_comment_table::Migration),
            Box::new(m20250101_000005_create_reaction_table::Migration),
            Box::new(m20250101_000006_create_playlist_tables::Migration),
            Box::new(m20250101_000007_create_credit_tables::Migration),
            Box::new(m20250101_000008_create_content_title_table::Migration),
            Box::new(m20250101_000009_create_taxonomy_tables::Migration),
            Box::new(m20250101_000010_create_video_detail_tables::Migration),
            Box::new(m20250101_000011_add_user_profile_columns::Migration),
            Box::new(m20250101_000012_create_friendship_table::Migration),
        ]
    }
}
