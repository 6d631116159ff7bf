//! Comment entity (comments on any content).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::content::{ContentRef, HasContentRef};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "comment")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(column_type = "Text")]
    pub text: String,

    /// Author. Comments are deleted together with their author.
    #[sea_orm(indexed)]
    pub posted_by: String,

    /// Content type tag ("video", "podcast")
    pub content_type: String,

    pub content_id: String,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::PostedBy",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl HasContentRef for Model {
    fn content_ref(&self) -> Option<ContentRef> {
        ContentRef::from_columns(&self.content_type, &self.content_id)
    }
}
