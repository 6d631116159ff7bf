//! Content registry: type tag to content store dispatch.

use std::collections::HashMap;
use std::sync::Arc;

use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use vv_common::{AppError, AppResult};
use vv_db::content::{ContentItem, ContentKind, ContentRef, ContentStore};

/// Maps each [`ContentKind`] to the store serving its table.
///
/// Built once at startup; every variant registers its store explicitly.
#[derive(Clone, Default)]
pub struct ContentRegistry {
    stores: HashMap<ContentKind, Arc<dyn ContentStore>>,
}

impl ContentRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the store for its kind. A kind can only be registered once.
    pub fn register(&mut self, store: Arc<dyn ContentStore>) -> AppResult<()> {
        let kind = store.kind();
        if self.stores.contains_key(&kind) {
            return Err(AppError::Internal(format!(
                "content type already registered: {kind}"
            )));
        }

        tracing::debug!(content_type = %kind, "Registered content store");
        self.stores.insert(kind, store);
        Ok(())
    }

    /// Builder form of [`Self::register`].
    pub fn with_store(mut self, store: Arc<dyn ContentStore>) -> AppResult<Self> {
        self.register(store)?;
        Ok(self)
    }

    /// Store for a kind, if one is registered.
    #[must_use]
    pub fn store(&self, kind: ContentKind) -> Option<&Arc<dyn ContentStore>> {
        self.stores.get(&kind)
    }

    /// Store for a kind, or `ContentNotFound` for the given target.
    pub fn store_for(&self, target: &ContentRef) -> AppResult<&Arc<dyn ContentStore>> {
        self.store(target.kind)
            .ok_or_else(|| AppError::ContentNotFound(target.to_string()))
    }

    /// Registered kinds in declaration order.
    #[must_use]
    pub fn kinds(&self) -> Vec<ContentKind> {
        ContentKind::ALL
            .into_iter()
            .filter(|kind| self.stores.contains_key(kind))
            .collect()
    }

    /// Resolve a stored `(tag, id)` pair.
    ///
    /// Unknown tags, unregistered kinds and missing rows all resolve to `None`.
    pub async fn resolve(&self, tag: &str, id: &str) -> AppResult<Option<ContentItem>> {
        match ContentRef::from_columns(tag, id) {
            Some(target) => self.resolve_ref(&target).await,
            None => {
                tracing::debug!(content_type = %tag, content_id = %id, "Unknown content type");
                Ok(None)
            }
        }
    }

    /// Resolve a typed reference. Missing rows resolve to `None`.
    pub async fn resolve_ref(&self, target: &ContentRef) -> AppResult<Option<ContentItem>> {
        match self.store(target.kind) {
            Some(store) => store.find_item(&target.id).await,
            None => Ok(None),
        }
    }

    /// Resolve a reference that must exist.
    pub async fn require(&self, target: &ContentRef) -> AppResult<ContentItem> {
        self.resolve_ref(target)
            .await?
            .ok_or_else(|| AppError::ContentNotFound(target.to_string()))
    }

    /// Resolve a reference that must exist and belong to `user_id`.
    ///
    /// Orphaned uploads (author deleted) belong to nobody.
    pub async fn require_uploaded_by(
        &self,
        user_id: &str,
        target: &ContentRef,
    ) -> AppResult<ContentItem> {
        let item = self.require(target).await?;
        if item.uploaded_by.as_deref() != Some(user_id) {
            return Err(AppError::Forbidden("Not the uploader".to_string()));
        }
        Ok(item)
    }

    /// Open a transaction holding the row lock on `target`.
    ///
    /// Rows referencing the content are inserted under this lock, so a
    /// concurrent cascade either removes them or never sees the content.
    pub async fn begin_locked(
        &self,
        db: &DatabaseConnection,
        target: &ContentRef,
    ) -> AppResult<DatabaseTransaction> {
        let store = self.store_for(target)?;
        let txn = db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if !store.lock_in(&txn, &target.id).await? {
            return Err(AppError::ContentNotFound(target.to_string()));
        }
        Ok(txn)
    }

    /// Persisted tag of an item.
    #[must_use]
    pub const fn tag_for(item: &ContentItem) -> &'static str {
        item.kind.as_str()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use vv_db::entities::video;
    use vv_db::repositories::{PodcastRepository, VideoRepository};

    fn test_video(id: &str) -> video::Model {
        video::Model {
            id: id.to_string(),
            uploaded_by: None,
            description: None,
            duration_secs: None,
            released_date: None,
            original_language_id: None,
            upload_region_id: None,
            score_imdb: None,
            file_url: "https://cdn.example.com/v.mp4".to_string(),
            format: video::VideoFormat::Mp4,
            youtube_video_id: None,
            dimension: None,
            definition: None,
            caption: false,
            licensed_content: false,
            privacy_status: None,
            embeddable: false,
            made_for_kids: false,
            like_count: 1,
            dislike_count: 0,
            comment_count: 0,
            view_count: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn registry(db: MockDatabase) -> ContentRegistry {
        let db = Arc::new(db.into_connection());
        ContentRegistry::new()
            .with_store(Arc::new(VideoRepository::new(db.clone())))
            .unwrap()
            .with_store(Arc::new(PodcastRepository::new(db)))
            .unwrap()
    }

    #[test]
    fn test_register_rejects_duplicate_kind() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let mut registry = ContentRegistry::new();

        registry
            .register(Arc::new(VideoRepository::new(db.clone())))
            .unwrap();
        let result = registry.register(Arc::new(VideoRepository::new(db)));

        assert!(matches!(result, Err(AppError::Internal(_))));
        assert_eq!(registry.kinds(), vec![ContentKind::Video]);
    }

    #[tokio::test]
    async fn test_resolve_known_tag() {
        let registry = registry(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[test_video("v1")]]),
        );

        let item = registry.resolve("video", "v1").await.unwrap().unwrap();

        assert_eq!(item.id, "v1");
        assert_eq!(ContentRegistry::tag_for(&item), "video");
    }

    #[tokio::test]
    async fn test_resolve_unknown_tag_is_absent() {
        // No query results queued: an unknown tag must not reach the database.
        let registry = registry(MockDatabase::new(DatabaseBackend::Postgres));

        let item = registry.resolve("article", "a1").await.unwrap();

        assert!(item.is_none());
    }

    #[tokio::test]
    async fn test_resolve_missing_row_is_absent() {
        let registry = registry(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<video::Model>::new()]),
        );

        let item = registry
            .resolve_ref(&ContentRef::new(ContentKind::Video, "gone"))
            .await
            .unwrap();

        assert!(item.is_none());
    }

    #[tokio::test]
    async fn test_require_missing_row_is_content_not_found() {
        let registry = registry(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<video::Model>::new()]),
        );

        let result = registry
            .require(&ContentRef::new(ContentKind::Video, "gone"))
            .await;

        match result {
            Err(AppError::ContentNotFound(target)) => assert_eq!(target, "video:gone"),
            other => panic!("expected ContentNotFound, got {other:?}"),
        }
    }
}
