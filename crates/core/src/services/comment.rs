//! Comment service.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{DatabaseConnection, Set, TransactionTrait};
use serde::Deserialize;
use validator::Validate;
use vv_common::{AppError, AppResult, IdGenerator};
use vv_db::{
    content::{ContentKind, ContentRef, CounterDelta, HasContentRef},
    entities::comment,
    repositories::{CommentRepository, UserRepository},
};

use super::content_registry::ContentRegistry;

/// Input for creating a comment.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentInput {
    pub content_type: ContentKind,
    #[validate(length(min = 1, max = 32))]
    pub content_id: String,
    #[validate(length(min = 1, max = 3000))]
    pub text: String,
}

impl CreateCommentInput {
    #[must_use]
    pub fn target(&self) -> ContentRef {
        ContentRef::new(self.content_type, self.content_id.clone())
    }
}

/// Input for editing a comment.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCommentInput {
    #[validate(length(min = 1, max = 3000))]
    pub text: String,
}

/// Comment service for business logic.
#[derive(Clone)]
pub struct CommentService {
    db: Arc<DatabaseConnection>,
    comment_repo: CommentRepository,
    user_repo: UserRepository,
    registry: Arc<ContentRegistry>,
    id_gen: IdGenerator,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub fn new(
        db: Arc<DatabaseConnection>,
        comment_repo: CommentRepository,
        registry: Arc<ContentRegistry>,
    ) -> Self {
        Self {
            user_repo: UserRepository::new(db.clone()),
            db,
            comment_repo,
            registry,
            id_gen: IdGenerator::new(),
        }
    }

    /// Post a comment. The target must exist; its `comment_count` is bumped
    /// in the same transaction.
    ///
    /// The author row is share-locked first, so an account deletion running
    /// at the same time either counts this comment or runs after it.
    pub async fn create(
        &self,
        user_id: &str,
        input: CreateCommentInput,
    ) -> AppResult<comment::Model> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let target = input.target();
        let store = self.registry.store_for(&target)?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if !self.user_repo.lock_shared_in(&txn, user_id).await? {
            return Err(AppError::UserNotFound(user_id.to_string()));
        }

        if !store
            .apply_counters(&txn, &target.id, CounterDelta::comments(1))
            .await?
        {
            return Err(AppError::ContentNotFound(target.to_string()));
        }

        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            text: Set(input.text),
            posted_by: Set(user_id.to_string()),
            content_type: Set(target.kind.as_str().to_string()),
            content_id: Set(target.id.clone()),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let created = self.comment_repo.create_in(&txn, model).await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::debug!(comment_id = %created.id, content = %target, "Comment created");

        Ok(created)
    }

    /// Get a comment by ID.
    pub async fn get(&self, comment_id: &str) -> AppResult<comment::Model> {
        self.comment_repo.get_by_id(comment_id).await
    }

    /// Edit the text of one's own comment.
    pub async fn update(
        &self,
        user_id: &str,
        comment_id: &str,
        input: UpdateCommentInput,
    ) -> AppResult<comment::Model> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let existing = self.comment_repo.get_by_id(comment_id).await?;
        if existing.posted_by != user_id {
            return Err(AppError::Forbidden(
                "Cannot edit another user's comment".to_string(),
            ));
        }

        let mut active: comment::ActiveModel = existing.into();
        active.text = Set(input.text);
        active.updated_at = Set(Some(Utc::now().into()));

        self.comment_repo.update(active).await
    }

    /// Delete one's own comment and decrement the target's `comment_count`.
    ///
    /// The target row is locked before the comment row, the same order the
    /// content cascade uses.
    pub async fn delete(&self, user_id: &str, comment_id: &str) -> AppResult<()> {
        let existing = self.comment_repo.get_by_id(comment_id).await?;
        if existing.posted_by != user_id {
            return Err(AppError::Forbidden(
                "Cannot delete another user's comment".to_string(),
            ));
        }

        let target = existing
            .content_ref()
            .and_then(|target| Some((self.registry.store(target.kind)?.clone(), target)));

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let live_target = match &target {
            Some((store, target)) => store.lock_in(&txn, &target.id).await?,
            None => false,
        };

        // A concurrent delete already decremented the counter.
        if !self.comment_repo.delete_in(&txn, &existing.id).await? {
            return Err(AppError::NotFound(format!("Comment {comment_id}")));
        }

        match &target {
            Some((store, target)) if live_target => {
                store
                    .apply_counters(&txn, &target.id, CounterDelta::comments(-1))
                    .await?;
            }
            _ => tracing::debug!(comment_id = %existing.id, "Comment target is gone"),
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    /// Comments on a content item, newest first.
    pub async fn list_for_target(
        &self,
        target: &ContentRef,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<comment::Model>> {
        self.comment_repo
            .list_for_target(target, limit, until_id)
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
    use std::collections::BTreeMap;
    use vv_db::repositories::PodcastRepository;

    fn exec(rows: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected: rows,
        }
    }

    fn locked(id: &str) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([("id", Value::from(id))])
    }

    fn test_comment(id: &str, user_id: &str) -> comment::Model {
        comment::Model {
            id: id.to_string(),
            text: "Great episode".to_string(),
            posted_by: user_id.to_string(),
            content_type: "podcast".to_string(),
            content_id: "p1".to_string(),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service(db: MockDatabase) -> CommentService {
        let db = Arc::new(db.into_connection());
        let registry = ContentRegistry::new()
            .with_store(Arc::new(PodcastRepository::new(db.clone())))
            .unwrap();

        CommentService::new(db.clone(), CommentRepository::new(db), Arc::new(registry))
    }

    fn input(text: &str) -> CreateCommentInput {
        CreateCommentInput {
            content_type: ContentKind::Podcast,
            content_id: "p1".to_string(),
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_comment() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[locked("user1")]])
            .append_exec_results([exec(1)])
            .append_query_results([[test_comment("c1", "user1")]]);

        let created = service(db).create("user1", input("Great episode")).await.unwrap();

        assert_eq!(created.id, "c1");
        assert_eq!(created.content_type, "podcast");
    }

    #[tokio::test]
    async fn test_create_empty_text_fails_validation() {
        let db = MockDatabase::new(DatabaseBackend::Postgres);

        let result = service(db).create("user1", input("")).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_on_missing_target() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[locked("user1")]])
            .append_exec_results([exec(0)]);

        let result = service(db).create("user1", input("hello")).await;

        assert!(matches!(result, Err(AppError::ContentNotFound(_))));
    }

    #[tokio::test]
    async fn test_create_on_unregistered_kind() {
        let db = MockDatabase::new(DatabaseBackend::Postgres);
        let video_input = CreateCommentInput {
            content_type: ContentKind::Video,
            ..input("hello")
        };

        let result = service(db).create("user1", video_input).await;

        assert!(matches!(result, Err(AppError::ContentNotFound(_))));
    }

    #[tokio::test]
    async fn test_update_other_users_comment_is_forbidden() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_comment("c1", "user1")]]);

        let result = service(db)
            .update(
                "user2",
                "c1",
                UpdateCommentInput {
                    text: "edited".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_create_by_deleted_author_fails() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<BTreeMap<&str, Value>>::new()]);

        let result = service(db).create("ghost", input("hello")).await;

        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_own_comment() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_comment("c1", "user1")]])
            .append_query_results([[locked("p1")]])
            .append_exec_results([exec(1), exec(1)]);

        let result = service(db).delete("user1", "c1").await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_delete_already_deleted_comment() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_comment("c1", "user1")]])
            .append_query_results([[locked("p1")]])
            .append_exec_results([exec(0)]);

        let result = service(db).delete("user1", "c1").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_comment_on_deleted_content_skips_counter() {
        // Only the comment delete is queued; a counter write would fail.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_comment("c1", "user1")]])
            .append_query_results([Vec::<BTreeMap<&str, Value>>::new()])
            .append_exec_results([exec(1)]);

        let result = service(db).delete("user1", "c1").await;

        assert!(result.is_ok());
    }
}
