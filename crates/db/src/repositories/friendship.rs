//! Friendship repository.

use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use vv_common::{AppError, AppResult};

use crate::entities::{Friendship, friendship, friendship::FriendshipStatus};

/// Repository for friend requests and friendships.
#[derive(Clone)]
pub struct FriendshipRepository {
    db: Arc<DatabaseConnection>,
}

/// `(a -> b) OR (b -> a)`.
fn pair_condition(a: &str, b: &str) -> Condition {
    Condition::any()
        .add(
            Condition::all()
                .add(friendship::Column::RequestedBy.eq(a))
                .add(friendship::Column::SentTo.eq(b)),
        )
        .add(
            Condition::all()
                .add(friendship::Column::RequestedBy.eq(b))
                .add(friendship::Column::SentTo.eq(a)),
        )
}

impl FriendshipRepository {
    /// Create a new friendship repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a friendship by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<friendship::Model>> {
        Friendship::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a friendship by ID and lock the row until the transaction ends.
    pub async fn find_for_update(
        &self,
        txn: &DatabaseTransaction,
        id: &str,
    ) -> AppResult<Option<friendship::Model>> {
        Friendship::find_by_id(id)
            .lock_exclusive()
            .one(txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Rows between two users in either direction, locked.
    pub async fn find_between_for_update(
        &self,
        txn: &DatabaseTransaction,
        a: &str,
        b: &str,
    ) -> AppResult<Vec<friendship::Model>> {
        Friendship::find()
            .filter(pair_condition(a, b))
            .lock_exclusive()
            .all(txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Friendships of `user_id` in `status`, newest first.
    ///
    /// `incoming` selects where the user is the recipient, `outgoing` where
    /// the user sent the request; both together list every row involving them.
    pub async fn list_for_user(
        &self,
        user_id: &str,
        status: FriendshipStatus,
        incoming: bool,
        outgoing: bool,
        limit: u64,
    ) -> AppResult<Vec<friendship::Model>> {
        let mut side = Condition::any();
        if incoming {
            side = side.add(friendship::Column::SentTo.eq(user_id));
        }
        if outgoing {
            side = side.add(friendship::Column::RequestedBy.eq(user_id));
        }

        Friendship::find()
            .filter(side)
            .filter(friendship::Column::Status.eq(status))
            .order_by_desc(friendship::Column::Id)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn create_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: friendship::ActiveModel,
    ) -> AppResult<friendship::Model> {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn update_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: friendship::ActiveModel,
    ) -> AppResult<friendship::Model> {
        model
            .update(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn delete_in<C: ConnectionTrait>(&self, conn: &C, id: &str) -> AppResult<bool> {
        let result = Friendship::delete_by_id(id)
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_list_incoming_filters_by_recipient() {
        let pending = friendship::Model {
            id: "f1".to_string(),
            requested_by: "alice".to_string(),
            sent_to: "bob".to_string(),
            status: FriendshipStatus::Pending,
            message: Some("hi".to_string()),
            created_at: Utc::now().into(),
            friend_since: None,
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[pending.clone()]])
            .into_connection();
        let db = Arc::new(db);

        let repo = FriendshipRepository::new(db.clone());
        let found = repo
            .list_for_user("bob", FriendshipStatus::Pending, true, false, 10)
            .await
            .unwrap();
        assert_eq!(found, vec![pending]);

        drop(repo);
        let log = format!(
            "{:?}",
            Arc::try_unwrap(db).unwrap().into_transaction_log()
        );
        assert!(log.contains(r#"\"sent_to\" = $1"#));
        assert!(!log.contains(r#"\"requested_by\" = "#));
    }
}
