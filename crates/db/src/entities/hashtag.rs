//! Hashtag entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "hashtag")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Stored without the leading `#`, lowercased
    #[sea_orm(unique)]
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::content_hashtag::Entity")]
    ContentHashtag,
}

impl Related<super::content_hashtag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ContentHashtag.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
