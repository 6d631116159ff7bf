//! Content category link (any content kind to a category).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::content::{ContentRef, HasContentRef};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "content_category")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub category_id: String,

    pub content_type: String,

    pub content_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id",
        on_delete = "Cascade"
    )]
    Category,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl HasContentRef for Model {
    fn content_ref(&self) -> Option<ContentRef> {
        ContentRef::from_columns(&self.content_type, &self.content_id)
    }
}
