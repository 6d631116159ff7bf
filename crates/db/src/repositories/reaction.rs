//! Reaction repository.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use vv_common::{AppError, AppResult};

use crate::content::{ContentRef, DependentRef, DependentStore, target_condition};
use crate::entities::{Reaction, reaction};

/// Reaction repository for database operations.
#[derive(Clone)]
pub struct ReactionRepository {
    db: Arc<DatabaseConnection>,
}

impl ReactionRepository {
    /// Create a new reaction repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a reaction by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<reaction::Model>> {
        Reaction::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a reaction by ID and lock the row until the transaction ends.
    pub async fn find_for_update(
        &self,
        txn: &DatabaseTransaction,
        id: &str,
    ) -> AppResult<Option<reaction::Model>> {
        Reaction::find_by_id(id)
            .lock_exclusive()
            .one(txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the reaction an actor left on a content item.
    pub async fn find_by_actor_and_target_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        actor_id: &str,
        target: &ContentRef,
    ) -> AppResult<Option<reaction::Model>> {
        Reaction::find()
            .filter(reaction::Column::PostedBy.eq(actor_id))
            .filter(target_condition(
                reaction::Column::ContentType,
                reaction::Column::ContentId,
                target,
            ))
            .order_by_asc(reaction::Column::Id)
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a reaction on the given connection.
    pub async fn create_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: reaction::ActiveModel,
    ) -> AppResult<reaction::Model> {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a reaction on the given connection.
    pub async fn update_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: reaction::ActiveModel,
    ) -> AppResult<reaction::Model> {
        model
            .update(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a reaction on the given connection.
    pub async fn delete_in<C: ConnectionTrait>(&self, conn: &C, id: &str) -> AppResult<bool> {
        let result = Reaction::delete_by_id(id)
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }

    /// Reactions on a content item, newest first (paginated).
    pub async fn list_for_target(
        &self,
        target: &ContentRef,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<reaction::Model>> {
        let mut query = Reaction::find()
            .filter(target_condition(
                reaction::Column::ContentType,
                reaction::Column::ContentId,
                target,
            ))
            .order_by_desc(reaction::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(reaction::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Reactions left by a user, newest first (paginated).
    pub async fn list_by_actor(
        &self,
        actor_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<reaction::Model>> {
        let mut query = Reaction::find()
            .filter(reaction::Column::PostedBy.eq(actor_id))
            .order_by_desc(reaction::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(reaction::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count likes (`is_like = true`) or dislikes on a content item.
    pub async fn count_for_target_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        target: &ContentRef,
        is_like: bool,
    ) -> AppResult<u64> {
        Reaction::find()
            .filter(target_condition(
                reaction::Column::ContentType,
                reaction::Column::ContentId,
                target,
            ))
            .filter(reaction::Column::IsLike.eq(is_like))
            .count(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[async_trait]
impl DependentStore for ReactionRepository {
    fn kind(&self) -> &'static str {
        "reaction"
    }

    async fn find_by_target(&self, target: &ContentRef) -> AppResult<Vec<DependentRef>> {
        let reactions = Reaction::find()
            .filter(target_condition(
                reaction::Column::ContentType,
                reaction::Column::ContentId,
                target,
            ))
            .order_by_asc(reaction::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(reactions
            .into_iter()
            .map(|r| DependentRef {
                kind: "reaction",
                id: r.id,
            })
            .collect())
    }

    async fn delete_by_target(
        &self,
        txn: &DatabaseTransaction,
        target: &ContentRef,
    ) -> AppResult<u64> {
        let result = Reaction::delete_many()
            .filter(target_condition(
                reaction::Column::ContentType,
                reaction::Column::ContentId,
                target,
            ))
            .exec(txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }
}
