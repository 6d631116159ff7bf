//! Video repository.

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
use crate::entities::{Video, video};

/// Video repository for database operations.
#[derive(Clone)]
pub struct VideoRepository {
    db: Arc<DatabaseConnection>,
}

impl VideoRepository {
    /// Create a new video repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a video by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<video::Model>> {
        Video::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a video by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<video::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ContentNotFound(format!("video:{id}")))
    }

    /// Find a video by its `YouTube` video ID.
    pub async fn find_by_youtube_id(&self, youtube_id: &str) -> AppResult<Option<video::Model>> {
        Video::find()
            .filter(video::Column::YoutubeVideoId.eq(youtube_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new video.
    pub async fn create(&self, model: video::ActiveModel) -> AppResult<video::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a video.
    pub async fn update(&self, model: video::ActiveModel) -> AppResult<video::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get videos, newest first (paginated).
    pub async fn find_recent(
        &self,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<video::Model>> {
        let mut query = Video::find().order_by_desc(video::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(video::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get videos uploaded by a user (paginated).
    pub async fn find_by_uploader(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<video::Model>> {
        let mut query = Video::find()
            .filter(video::Column::UploadedBy.eq(user_id))
            .order_by_desc(video::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(video::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Detach every video from a deleted uploader.
    pub async fn clear_uploader<C: ConnectionTrait>(&self, conn: &C, user_id: &str) -> AppResult<u64> {
        let result = Video::update_many()
            .col_expr(video::Column::UploadedBy, Expr::value(Option::<String>::None))
            .filter(video::Column::UploadedBy.eq(user_id))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }
}

impl From<video::Model> for ContentItem {
    fn from(model: video::Model) -> Self {
        Self {
            kind: ContentKind::Video,
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
impl ContentStore for VideoRepository {
    fn kind(&self) -> ContentKind {
        ContentKind::Video
    }

    async fn find_item(&self, id: &str) -> AppResult<Option<ContentItem>> {
        Ok(self.find_by_id(id).await?.map(ContentItem::from))
    }

    async fn lock_in(&self, txn: &DatabaseTransaction, id: &str) -> AppResult<bool> {
        lock_content_row::<Video>(txn, video::Column::Id, id).await
    }

    async fn apply_counters(
        &self,
        txn: &DatabaseTransaction,
        id: &str,
        delta: CounterDelta,
    ) -> AppResult<bool> {
        apply_counter_delta::<Video, _>(
            txn,
            video::Column::Id,
            id,
            [
                (video::Column::LikeCount, delta.likes),
                (video::Column::DislikeCount, delta.dislikes),
                (video::Column::CommentCount, delta.comments),
                (video::Column::ViewCount, delta.views),
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
        let result = Video::update_many()
            .col_expr(video::Column::LikeCount, Expr::value(likes))
            .col_expr(video::Column::DislikeCount, Expr::value(dislikes))
            .filter(video::Column::Id.eq(id))
            .exec(txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }

    async fn delete_in(&self, txn: &DatabaseTransaction, id: &str) -> AppResult<bool> {
        let result = Video::delete_by_id(id)
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
    use crate::entities::video::VideoFormat;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, TransactionTrait, Value};
    use std::collections::BTreeMap;

    fn create_test_video(id: &str, likes: i32) -> video::Model {
        video::Model {
            id: id.to_string(),
            uploaded_by: Some("user1".to_string()),
            description: Some("A test video".to_string()),
            duration_secs: Some(120),
            released_date: None,
            original_language_id: None,
            upload_region_id: None,
            score_imdb: None,
            file_url: format!("https://cdn.example.com/{id}.mp4"),
            format: VideoFormat::Mp4,
            youtube_video_id: None,
            dimension: None,
            definition: None,
            caption: false,
            licensed_content: false,
            privacy_status: None,
            embeddable: true,
            made_for_kids: false,
            like_count: likes,
            dislike_count: 0,
            comment_count: 0,
            view_count: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_item_maps_counters() {
        let video = create_test_video("v1", 3);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[video]])
                .into_connection(),
        );

        let repo = VideoRepository::new(db);
        let item = repo.find_item("v1").await.unwrap().unwrap();

        assert_eq!(item.kind, ContentKind::Video);
        assert_eq!(item.like_count, 3);
        assert_eq!(item.uploaded_by.as_deref(), Some("user1"));
    }

    #[tokio::test]
    async fn test_get_by_id_not_found_returns_content_error() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<video::Model>::new()])
                .into_connection(),
        );

        let repo = VideoRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::ContentNotFound(_))));
    }

    #[tokio::test]
    async fn test_apply_counters_reports_missing_row() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = VideoRepository::new(db.clone());
        let txn = db.begin().await.unwrap();
        let applied = repo
            .apply_counters(&txn, "missing", CounterDelta::likes(1))
            .await
            .unwrap();
        txn.commit().await.unwrap();

        assert!(!applied);
    }

    #[tokio::test]
    async fn test_lock_in_selects_for_update() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[BTreeMap::from([("id", Value::from("v1"))])]])
                .append_query_results([Vec::<BTreeMap<&str, Value>>::new()])
                .into_connection(),
        );

        let repo = VideoRepository::new(db.clone());
        let txn = db.begin().await.unwrap();
        let present = repo.lock_in(&txn, "v1").await.unwrap();
        let missing = repo.lock_in(&txn, "gone").await.unwrap();
        txn.commit().await.unwrap();

        assert!(present);
        assert!(!missing);

        drop(repo);
        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        assert!(log.iter().any(|t| format!("{t:?}").contains("FOR UPDATE")));
    }

    #[tokio::test]
    async fn test_apply_counters_zero_delta_skips_update() {
        // No exec result queued: any statement would fail.
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = VideoRepository::new(db.clone());
        let txn = db.begin().await.unwrap();
        let applied = repo
            .apply_counters(&txn, "v1", CounterDelta::ZERO)
            .await
            .unwrap();
        txn.commit().await.unwrap();

        assert!(!applied);
    }
}
