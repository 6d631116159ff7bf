//! Industry personnel entity (actors, directors, hosts, staff).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "personnel")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub first_name: String,

    #[sea_orm(nullable)]
    pub middle_name: Option<String>,

    pub last_name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::cast_credit::Entity")]
    CastCredit,

    #[sea_orm(has_many = "super::produce_credit::Entity")]
    ProduceCredit,
}

impl Related<super::cast_credit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CastCredit.def()
    }
}

impl Related<super::produce_credit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProduceCredit.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
