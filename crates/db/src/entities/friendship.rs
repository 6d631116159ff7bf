//! Friendship entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// State of a friend request.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
#[serde(rename_all = "lowercase")]
pub enum FriendshipStatus {
    #[sea_orm(num_value = 0)]
    #[default]
    Pending,
    #[sea_orm(num_value = 1)]
    Accepted,
    #[sea_orm(num_value = 2)]
    Rejected,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "friendship")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// User who sent the request
    #[sea_orm(indexed)]
    pub requested_by: String,

    /// User the request was sent to
    #[sea_orm(indexed)]
    pub sent_to: String,

    pub status: FriendshipStatus,

    #[sea_orm(column_type = "Text", nullable)]
    pub message: Option<String>,

    pub created_at: DateTimeWithTimeZone,

    /// Set when the request is accepted
    #[sea_orm(nullable)]
    pub friend_since: Option<DateTimeWithTimeZone>,
}

impl Model {
    /// The other side of the friendship, seen from `user_id`.
    #[must_use]
    pub fn other_party(&self, user_id: &str) -> &str {
        if self.requested_by == user_id {
            &self.sent_to
        } else {
            &self.requested_by
        }
    }

    /// Whether `user_id` is one of the two parties.
    #[must_use]
    pub fn involves(&self, user_id: &str) -> bool {
        self.requested_by == user_id || self.sent_to == user_id
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::RequestedBy",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Requester,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::SentTo",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Recipient,
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_other_party_from_either_side() {
        let friendship = Model {
            id: "f1".to_string(),
            requested_by: "alice".to_string(),
            sent_to: "bob".to_string(),
            status: FriendshipStatus::Accepted,
            message: None,
            created_at: Utc::now().into(),
            friend_since: Some(Utc::now().into()),
        };

        assert_eq!(friendship.other_party("alice"), "bob");
        assert_eq!(friendship.other_party("bob"), "alice");
        assert!(friendship.involves("bob"));
        assert!(!friendship.involves("carol"));
    }
}
