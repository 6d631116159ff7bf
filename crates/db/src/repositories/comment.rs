//! Comment repository.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use vv_common::{AppError, AppResult};

use crate::content::{ContentRef, DependentRef, DependentStore, target_condition};
use crate::entities::{Comment, comment};

/// Comment repository for database operations.
#[derive(Clone)]
pub struct CommentRepository {
    db: Arc<DatabaseConnection>,
}

impl CommentRepository {
    /// Create a new comment repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a comment by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<comment::Model>> {
        Comment::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a comment by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<comment::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Comment {id}")))
    }

    /// Insert a comment on the given connection.
    pub async fn create_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: comment::ActiveModel,
    ) -> AppResult<comment::Model> {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a comment.
    pub async fn update(&self, model: comment::ActiveModel) -> AppResult<comment::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a comment on the given connection.
    pub async fn delete_in<C: ConnectionTrait>(&self, conn: &C, id: &str) -> AppResult<bool> {
        let result = Comment::delete_by_id(id)
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }

    /// Comments on a content item, newest first (paginated).
    pub async fn list_for_target(
        &self,
        target: &ContentRef,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<comment::Model>> {
        let mut query = Comment::find()
            .filter(target_condition(
                comment::Column::ContentType,
                comment::Column::ContentId,
                target,
            ))
            .order_by_desc(comment::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(comment::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Every comment written by a user.
    pub async fn find_all_by_user_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: &str,
    ) -> AppResult<Vec<comment::Model>> {
        Comment::find()
            .filter(comment::Column::PostedBy.eq(user_id))
            .all(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count comments on a content item.
    pub async fn count_for_target(&self, target: &ContentRef) -> AppResult<u64> {
        Comment::find()
            .filter(target_condition(
                comment::Column::ContentType,
                comment::Column::ContentId,
                target,
            ))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[async_trait]
impl DependentStore for CommentRepository {
    fn kind(&self) -> &'static str {
        "comment"
    }

    async fn find_by_target(&self, target: &ContentRef) -> AppResult<Vec<DependentRef>> {
        let comments = Comment::find()
            .filter(target_condition(
                comment::Column::ContentType,
                comment::Column::ContentId,
                target,
            ))
            .order_by_asc(comment::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(comments
            .into_iter()
            .map(|c| DependentRef {
                kind: "comment",
                id: c.id,
            })
            .collect())
    }

    async fn delete_by_target(
        &self,
        txn: &DatabaseTransaction,
        target: &ContentRef,
    ) -> AppResult<u64> {
        let result = Comment::delete_many()
            .filter(target_condition(
                comment::Column::ContentType,
                comment::Column::ContentId,
                target,
            ))
            .exec(txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::content::ContentKind;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, TransactionTrait};

    fn create_test_comment(id: &str, user_id: &str, content_id: &str) -> comment::Model {
        comment::Model {
            id: id.to_string(),
            text: "Nice one".to_string(),
            posted_by: user_id.to_string(),
            content_type: "video".to_string(),
            content_id: content_id.to_string(),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_list_for_target() {
        let c1 = create_test_comment("c2", "user1", "v1");
        let c2 = create_test_comment("c1", "user2", "v1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[c1, c2]])
                .into_connection(),
        );

        let repo = CommentRepository::new(db);
        let target = ContentRef::new(ContentKind::Video, "v1");
        let result = repo.list_for_target(&target, 10, None).await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].id, "c2");
    }

    #[tokio::test]
    async fn test_find_by_target_returns_dependent_refs() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_comment("c1", "user1", "v1")]])
                .into_connection(),
        );

        let repo = CommentRepository::new(db);
        let target = ContentRef::new(ContentKind::Video, "v1");
        let refs = repo.find_by_target(&target).await.unwrap();

        assert_eq!(
            refs,
            vec![DependentRef {
                kind: "comment",
                id: "c1".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_delete_by_target_returns_row_count() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 4,
                }])
                .into_connection(),
        );

        let repo = CommentRepository::new(db.clone());
        let target = ContentRef::new(ContentKind::Video, "v1");
        let txn = db.begin().await.unwrap();
        let removed = repo.delete_by_target(&txn, &target).await.unwrap();
        txn.commit().await.unwrap();

        assert_eq!(removed, 4);
    }
}
