//! Podcast entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Encoding of the uploaded audio file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    #[sea_orm(num_value = 0)]
    Unspecified,
    #[sea_orm(num_value = 1)]
    Mp3,
    #[sea_orm(num_value = 2)]
    Wav,
    #[sea_orm(num_value = 3)]
    Aac,
    #[sea_orm(num_value = 4)]
    Flac,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "podcast")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(nullable, indexed)]
    pub uploaded_by: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    #[sea_orm(nullable)]
    pub duration_secs: Option<i64>,

    #[sea_orm(nullable)]
    pub released_date: Option<Date>,

    #[sea_orm(nullable)]
    pub original_language_id: Option<String>,

    #[sea_orm(nullable)]
    pub upload_region_id: Option<String>,

    #[sea_orm(nullable)]
    pub score_imdb: Option<f64>,

    pub file_url: String,

    pub format: AudioFormat,

    #[sea_orm(default_value = 0)]
    pub like_count: i32,

    #[sea_orm(default_value = 0)]
    pub dislike_count: i32,

    #[sea_orm(default_value = 0)]
    pub comment_count: i32,

    #[sea_orm(default_value = 0)]
    pub view_count: i64,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UploadedBy",
        to = "super::user::Column::Id",
        on_delete = "SetNull"
    )]
    User,

    #[sea_orm(
        belongs_to = "super::language::Entity",
        from = "Column::OriginalLanguageId",
        to = "super::language::Column::Id",
        on_delete = "SetNull"
    )]
    Language,

    #[sea_orm(
        belongs_to = "super::region::Entity",
        from = "Column::UploadRegionId",
        to = "super::region::Column::Id",
        on_delete = "SetNull"
    )]
    Region,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
