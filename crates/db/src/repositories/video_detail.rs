//! Video localization, channel and thumbnail repositories.

use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};
use vv_common::{AppError, AppResult};

use crate::entities::{
    ChannelDetail, ThumbnailDetail, VideoLocalization, channel_detail, thumbnail_detail,
    video_localization,
};

/// Repository for per-language video titles and descriptions.
#[derive(Clone)]
pub struct VideoLocalizationRepository {
    db: Arc<DatabaseConnection>,
}

impl VideoLocalizationRepository {
    /// Create a new video localization repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// The localization of `video_id` for `language`, if any.
    pub async fn find_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        video_id: &str,
        language: &str,
    ) -> AppResult<Option<video_localization::Model>> {
        VideoLocalization::find()
            .filter(video_localization::Column::VideoId.eq(video_id))
            .filter(video_localization::Column::Language.eq(language))
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Every localization of a video, ordered by language.
    pub async fn list_for_video(
        &self,
        video_id: &str,
    ) -> AppResult<Vec<video_localization::Model>> {
        VideoLocalization::find()
            .filter(video_localization::Column::VideoId.eq(video_id))
            .order_by_asc(video_localization::Column::Language)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn create_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: video_localization::ActiveModel,
    ) -> AppResult<video_localization::Model> {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn update_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: video_localization::ActiveModel,
    ) -> AppResult<video_localization::Model> {
        model
            .update(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete one localization. Returns `false` when none matched.
    pub async fn delete(&self, video_id: &str, language: &str) -> AppResult<bool> {
        let result = VideoLocalization::delete_many()
            .filter(video_localization::Column::VideoId.eq(video_id))
            .filter(video_localization::Column::Language.eq(language))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }
}

/// Repository for the channel a video belongs to.
#[derive(Clone)]
pub struct ChannelDetailRepository {
    db: Arc<DatabaseConnection>,
}

impl ChannelDetailRepository {
    /// Create a new channel detail repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn find_for_video(&self, video_id: &str) -> AppResult<Option<channel_detail::Model>> {
        self.find_for_video_in(self.db.as_ref(), video_id).await
    }

    pub async fn find_for_video_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        video_id: &str,
    ) -> AppResult<Option<channel_detail::Model>> {
        ChannelDetail::find()
            .filter(channel_detail::Column::VideoId.eq(video_id))
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn create_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: channel_detail::ActiveModel,
    ) -> AppResult<channel_detail::Model> {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn update_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: channel_detail::ActiveModel,
    ) -> AppResult<channel_detail::Model> {
        model
            .update(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

/// Repository for video thumbnails.
#[derive(Clone)]
pub struct ThumbnailDetailRepository {
    db: Arc<DatabaseConnection>,
}

impl ThumbnailDetailRepository {
    /// Create a new thumbnail detail repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Thumbnails of a video, largest first.
    pub async fn list_for_video(
        &self,
        video_id: &str,
    ) -> AppResult<Vec<thumbnail_detail::Model>> {
        ThumbnailDetail::find()
            .filter(thumbnail_detail::Column::VideoId.eq(video_id))
            .order_by_desc(thumbnail_detail::Column::Width)
            .order_by_asc(thumbnail_detail::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<thumbnail_detail::Model>> {
        ThumbnailDetail::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn create_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: thumbnail_detail::ActiveModel,
    ) -> AppResult<thumbnail_detail::Model> {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn delete(&self, id: &str) -> AppResult<bool> {
        let result = ThumbnailDetail::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }
}
