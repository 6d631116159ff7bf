//! Content title entity (localized or alternate titles of any content).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::content::{ContentRef, HasContentRef};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "content_title")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub title_text: String,

    /// NULL once the language row is deleted
    #[sea_orm(nullable)]
    pub language_id: Option<String>,

    /// Whether this is the title in the content's original language
    #[sea_orm(nullable)]
    pub is_native: Option<bool>,

    pub content_type: String,

    pub content_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::language::Entity",
        from = "Column::LanguageId",
        to = "super::language::Column::Id",
        on_delete = "SetNull"
    )]
    Language,
}

impl Related<super::language::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Language.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl HasContentRef for Model {
    fn content_ref(&self) -> Option<ContentRef> {
        ContentRef::from_columns(&self.content_type, &self.content_id)
    }
}
