//! Video entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Container format of the uploaded video file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
#[serde(rename_all = "lowercase")]
pub enum VideoFormat {
    #[sea_orm(num_value = 0)]
    Unspecified,
    #[sea_orm(num_value = 1)]
    Mp4,
    #[sea_orm(num_value = 2)]
    Avi,
    #[sea_orm(num_value = 3)]
    Mov,
    #[sea_orm(num_value = 4)]
    Mkv,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "video")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Uploader (NULL once the account is deleted)
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

    /// 0.0 - 10.0
    #[sea_orm(nullable)]
    pub score_imdb: Option<f64>,

    /// Where the media file is served from
    pub file_url: String,

    pub format: VideoFormat,

    #[sea_orm(unique, nullable)]
    pub youtube_video_id: Option<String>,

    /// "2d" or "3d"
    #[sea_orm(nullable)]
    pub dimension: Option<String>,

    /// "hd" or "sd"
    #[sea_orm(nullable)]
    pub definition: Option<String>,

    #[sea_orm(default_value = false)]
    pub caption: bool,

    #[sea_orm(default_value = false)]
    pub licensed_content: bool,

    #[sea_orm(nullable)]
    pub privacy_status: Option<String>,

    #[sea_orm(default_value = false)]
    pub embeddable: bool,

    #[sea_orm(default_value = false)]
    pub made_for_kids: bool,

    /// Like count (denormalized)
    #[sea_orm(default_value = 0)]
    pub like_count: i32,

    /// Dislike count (denormalized)
    #[sea_orm(default_value = 0)]
    pub dislike_count: i32,

    /// Comment count (denormalized)
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
