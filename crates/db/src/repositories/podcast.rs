//! Podcast repository.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, sea_query::Expr,
};
use vv_common::{AppError, AppResult};

use crate::content::{
    ContentItem, ContentKind, ContentStore, CounterDelta, apply_counter_delta, lock_content_row,
};
use crate::entities::{Podcast, podcast};

/// Podcast repository for database operations.
#[derive(Clone)]
pub struct PodcastRepository {
    db: Arc<DatabaseConnection>,
}

impl PodcastRepository {
    /// Create a new podcast repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a podcast by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<podcast::Model>> {
        Podcast::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a podcast by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<podcast::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ContentNotFound(format!("podcast:{id}")))
    }

    /// Create a new podcast.
    pub async fn create(&self, model: podcast::ActiveModel) -> AppResult<podcast::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a podcast.
    pub async fn update(&self, model: podcast::ActiveModel) -> AppResult<podcast::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get podcasts, newest first (paginated).
    pub async fn find_recent(
        &self,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<podcast::Model>> {
        let mut query = Podcast::find().order_by_desc(podcast::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(podcast::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get podcasts uploaded by a user (paginated).
    pub async fn find_by_uploader(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<podcast::Model>> {
        let mut query = Podcast::find()
            .filter(podcast::Column::UploadedBy.eq(user_id))
            .order_by_desc(podcast::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(podcast::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Detach every podcast from a deleted uploader.
    pub async fn clear_uploader<C: ConnectionTrait>(&self, conn: &C, user_id: &str) -> AppResult<u64> {
        let result = Podcast::update_many()
            .col_expr(podcast::Column::UploadedBy, Expr::value(Option::<String>::None))
            .filter(podcast::Column::UploadedBy.eq(user_id))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }
}

impl From<podcast::Model> for ContentItem {
    fn from(model: podcast::Model) -> Self {
        Self {
            kind: ContentKind::Podcast,
            id: model.id,
            uploaded_by: model.uploaded_by,
            description: model.description,
            like_count: model.like_count,
            dislike_count: model.dislike_count,
            comment_count: model.comment_count,
            view_count: model.view_count,
            created_at: model.created_at,
        }
    }
}

#[async_trait]
impl ContentStore for PodcastRepository {
    fn kind(&self) -> ContentKind {
        ContentKind::Podcast
    }

    async fn find_item(&self, id: &str) -> AppResult<Option<ContentItem>> {
        Ok(self.find_by_id(id).await?.map(ContentItem::from))
    }

    async fn lock_in(&self, txn: &DatabaseTransaction, id: &str) -> AppResult<bool> {
        lock_content_row::<Podcast>(txn, podcast::Column::Id, id).await
    }

    async fn apply_counters(
        &self,
        txn: &DatabaseTransaction,
        id: &str,
        delta: CounterDelta,
    ) -> AppResult<bool> {
        apply_counter_delta::<Podcast, _>(
            txn,
            podcast::Column::Id,
            id,
            [
                (podcast::Column::LikeCount, delta.likes),
                (podcast::Column::DislikeCount, delta.dislikes),
                (podcast::Column::CommentCount, delta.comments),
                (podcast::Column::ViewCount, delta.views),
            ],
        )
        .await
    }

    async fn set_reaction_counts(
        &self,
        txn: &DatabaseTransaction,
        id: &str,
        likes: i32,
        dislikes: i32,
    ) -> AppResult<bool> {
        let result = Podcast::update_many()
            .col_expr(podcast::Column::LikeCount, Expr::value(likes))
            .col_expr(podcast::Column::DislikeCount, Expr::value(dislikes))
            .filter(podcast::Column::Id.eq(id))
            .exec(txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }

    async fn delete_in(&self, txn: &DatabaseTransaction, id: &str) -> AppResult<bool> {
        let result = Podcast::delete_by_id(id)
            .exec(txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::podcast::AudioFormat;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, TransactionTrait};

    fn create_test_podcast(id: &str) -> podcast::Model {
        podcast::Model {
            id: id.to_string(),
            uploaded_by: None,
            description: None,
            duration_secs: Some(3600),
            released_date: None,
            original_language_id: None,
            upload_region_id: None,
            score_imdb: None,
            file_url: format!("https://cdn.example.com/{id}.mp3"),
            format: AudioFormat::Mp3,
            like_count: 0,
            dislike_count: 2,
            comment_count: 1,
            view_count: 10,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_item_is_tagged_podcast() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_podcast("p1")]])
                .into_connection(),
        );

        let repo = PodcastRepository::new(db);
        let item = repo.find_item("p1").await.unwrap().unwrap();

        assert_eq!(item.content_ref().to_string(), "podcast:p1");
        assert_eq!(item.dislike_count, 2);
        assert_eq!(item.view_count, 10);
    }

    #[tokio::test]
    async fn test_delete_in() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = PodcastRepository::new(db.clone());
        let txn = db.begin().await.unwrap();
        let deleted = repo.delete_in(&txn, "p1").await.unwrap();
        txn.commit().await.unwrap();

        assert!(deleted);
    }
}
