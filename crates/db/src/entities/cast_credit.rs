//! Cast credit entity (a person appearing in some content).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::content::{ContentRef, HasContentRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
#[serde(rename_all = "camelCase")]
pub enum CastType {
    #[sea_orm(num_value = 0)]
    Unspecified,
    #[sea_orm(num_value = 1)]
    MainActor,
    #[sea_orm(num_value = 2)]
    SupportActor,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "cast_credit")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub personnel_id: String,

    pub content_type: String,

    pub content_id: String,

    pub cast_type: CastType,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::personnel::Entity",
        from = "Column::PersonnelId",
        to = "super::personnel::Column::Id",
        on_delete = "Cascade"
    )]
    Personnel,
}

impl Related<super::personnel::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Personnel.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl HasContentRef for Model {
    fn content_ref(&self) -> Option<ContentRef> {
        ContentRef::from_columns(&self.content_type, &self.content_id)
    }
}
