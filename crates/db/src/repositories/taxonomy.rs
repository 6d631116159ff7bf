//! Category, hashtag and tag repositories, and the links attaching them to content.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, sea_query::OnConflict,
};
use vv_common::{AppError, AppResult};

use crate::content::{ContentRef, DependentRef, DependentStore, target_condition};
use crate::entities::{
    Category, ContentCategory, ContentHashtag, Hashtag, Tag, VideoTag, category,
    content_category, content_hashtag, hashtag, tag, video_tag,
};

/// Repository for categories.
#[derive(Clone)]
pub struct CategoryRepository {
    db: Arc<DatabaseConnection>,
}

impl CategoryRepository {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a category by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<category::Model>> {
        Category::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<category::Model>> {
        Category::find()
            .filter(category::Column::Name.eq(name))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Every category, ordered by name.
    pub async fn find_all(&self) -> AppResult<Vec<category::Model>> {
        Category::find()
            .order_by_asc(category::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn create(&self, model: category::ActiveModel) -> AppResult<category::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a category; its content links cascade.
    pub async fn delete(&self, id: &str) -> AppResult<bool> {
        let result = Category::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }
}

/// Repository for hashtags.
#[derive(Clone)]
pub struct HashtagRepository {
    db: Arc<DatabaseConnection>,
}

impl HashtagRepository {
    /// Create a new hashtag repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a hashtag by its normalized name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<hashtag::Model>> {
        Hashtag::find()
            .filter(hashtag::Column::Name.eq(name))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Hashtags whose name starts with `prefix`, ordered by name.
    pub async fn search(&self, prefix: &str, limit: u64) -> AppResult<Vec<hashtag::Model>> {
        Hashtag::find()
            .filter(hashtag::Column::Name.starts_with(prefix))
            .order_by_asc(hashtag::Column::Name)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// The hashtag named `name`, inserting it with `id` when missing.
    ///
    /// Concurrent callers racing on the same name all get the one stored row.
    pub async fn find_or_create_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
        name: &str,
    ) -> AppResult<hashtag::Model> {
        Hashtag::insert(hashtag::ActiveModel {
            id: Set(id.to_string()),
            name: Set(name.to_string()),
        })
        .on_conflict(
            OnConflict::column(hashtag::Column::Name)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Hashtag::find()
            .filter(hashtag::Column::Name.eq(name))
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::Internal(format!("Hashtag {name} vanished after insert")))
    }
}

/// Repository for video tags.
#[derive(Clone)]
pub struct TagRepository {
    db: Arc<DatabaseConnection>,
}

impl TagRepository {
    /// Create a new tag repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// The tag named `name`, inserting it with `id` when missing.
    pub async fn find_or_create_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
        name: &str,
    ) -> AppResult<tag::Model> {
        Tag::insert(tag::ActiveModel {
            id: Set(id.to_string()),
            name: Set(name.to_string()),
        })
        .on_conflict(OnConflict::column(tag::Column::Name).do_nothing().to_owned())
        .exec_without_returning(conn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Tag::find()
            .filter(tag::Column::Name.eq(name))
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::Internal(format!("Tag {name} vanished after insert")))
    }

    /// Find a tag by name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<tag::Model>> {
        Tag::find()
            .filter(tag::Column::Name.eq(name))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Tags attached to a video, ordered by name.
    pub async fn list_for_video(&self, video_id: &str) -> AppResult<Vec<tag::Model>> {
        Tag::find()
            .inner_join(VideoTag)
            .filter(video_tag::Column::VideoId.eq(video_id))
            .order_by_asc(tag::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

/// Repository for category links.
#[derive(Clone)]
pub struct ContentCategoryRepository {
    db: Arc<DatabaseConnection>,
}

impl ContentCategoryRepository {
    /// Create a new content category repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// The link between `category_id` and `target`, if any.
    pub async fn find_link_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        category_id: &str,
        target: &ContentRef,
    ) -> AppResult<Option<content_category::Model>> {
        ContentCategory::find()
            .filter(content_category::Column::CategoryId.eq(category_id))
            .filter(target_condition(
                content_category::Column::ContentType,
                content_category::Column::ContentId,
                target,
            ))
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn create_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: content_category::ActiveModel,
    ) -> AppResult<content_category::Model> {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Remove one link. Returns `false` when it did not exist.
    pub async fn delete_link(&self, category_id: &str, target: &ContentRef) -> AppResult<bool> {
        let result = ContentCategory::delete_many()
            .filter(content_category::Column::CategoryId.eq(category_id))
            .filter(target_condition(
                content_category::Column::ContentType,
                content_category::Column::ContentId,
                target,
            ))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }

    /// Categories of a content item, ordered by name.
    pub async fn categories_of(&self, target: &ContentRef) -> AppResult<Vec<category::Model>> {
        Category::find()
            .inner_join(ContentCategory)
            .filter(target_condition(
                content_category::Column::ContentType,
                content_category::Column::ContentId,
                target,
            ))
            .order_by_asc(category::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Links under a category, newest first.
    pub async fn list_by_category(
        &self,
        category_id: &str,
        limit: u64,
    ) -> AppResult<Vec<content_category::Model>> {
        ContentCategory::find()
            .filter(content_category::Column::CategoryId.eq(category_id))
            .order_by_desc(content_category::Column::Id)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[async_trait]
impl DependentStore for ContentCategoryRepository {
    fn kind(&self) -> &'static str {
        "content_category"
    }

    async fn find_by_target(&self, target: &ContentRef) -> AppResult<Vec<DependentRef>> {
        let ids: Vec<String> = ContentCategory::find()
            .select_only()
            .column(content_category::Column::Id)
            .filter(target_condition(
                content_category::Column::ContentType,
                content_category::Column::ContentId,
                target,
            ))
            .into_tuple()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(ids
            .into_iter()
            .map(|id| DependentRef {
                kind: "content_category",
                id,
            })
            .collect())
    }

    async fn delete_by_target(
        &self,
        txn: &DatabaseTransaction,
        target: &ContentRef,
    ) -> AppResult<u64> {
        let result = ContentCategory::delete_many()
            .filter(target_condition(
                content_category::Column::ContentType,
                content_category::Column::ContentId,
                target,
            ))
            .exec(txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }
}

/// Repository for hashtag links.
#[derive(Clone)]
pub struct ContentHashtagRepository {
    db: Arc<DatabaseConnection>,
}

impl ContentHashtagRepository {
    /// Create a new content hashtag repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn find_link_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        hashtag_id: &str,
        target: &ContentRef,
    ) -> AppResult<Option<content_hashtag::Model>> {
        ContentHashtag::find()
            .filter(content_hashtag::Column::HashtagId.eq(hashtag_id))
            .filter(target_condition(
                content_hashtag::Column::ContentType,
                content_hashtag::Column::ContentId,
                target,
            ))
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn create_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: content_hashtag::ActiveModel,
    ) -> AppResult<content_hashtag::Model> {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Remove one link. Returns `false` when it did not exist.
    pub async fn delete_link(&self, hashtag_id: &str, target: &ContentRef) -> AppResult<bool> {
        let result = ContentHashtag::delete_many()
            .filter(content_hashtag::Column::HashtagId.eq(hashtag_id))
            .filter(target_condition(
                content_hashtag::Column::ContentType,
                content_hashtag::Column::ContentId,
                target,
            ))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }

    /// Hashtags of a content item, ordered by name.
    pub async fn hashtags_of(&self, target: &ContentRef) -> AppResult<Vec<hashtag::Model>> {
        Hashtag::find()
            .inner_join(ContentHashtag)
            .filter(target_condition(
                content_hashtag::Column::ContentType,
                content_hashtag::Column::ContentId,
                target,
            ))
            .order_by_asc(hashtag::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Links under a hashtag, newest first.
    pub async fn list_by_hashtag(
        &self,
        hashtag_id: &str,
        limit: u64,
    ) -> AppResult<Vec<content_hashtag::Model>> {
        ContentHashtag::find()
            .filter(content_hashtag::Column::HashtagId.eq(hashtag_id))
            .order_by_desc(content_hashtag::Column::Id)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[async_trait]
impl DependentStore for ContentHashtagRepository {
    fn kind(&self) -> &'static str {
        "content_hashtag"
    }

    async fn find_by_target(&self, target: &ContentRef) -> AppResult<Vec<DependentRef>> {
        let ids: Vec<String> = ContentHashtag::find()
            .select_only()
            .column(content_hashtag::Column::Id)
            .filter(target_condition(
                content_hashtag::Column::ContentType,
                content_hashtag::Column::ContentId,
                target,
            ))
            .into_tuple()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(ids
            .into_iter()
            .map(|id| DependentRef {
                kind: "content_hashtag",
                id,
            })
            .collect())
    }

    async fn delete_by_target(
        &self,
        txn: &DatabaseTransaction,
        target: &ContentRef,
    ) -> AppResult<u64> {
        let result = ContentHashtag::delete_many()
            .filter(target_condition(
                content_hashtag::Column::ContentType,
                content_hashtag::Column::ContentId,
                target,
            ))
            .exec(txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }
}

/// Repository for video tag links. Rows go with the video through the
/// foreign key, so this is not a [`DependentStore`].
#[derive(Clone)]
pub struct VideoTagRepository {
    db: Arc<DatabaseConnection>,
}

impl VideoTagRepository {
    /// Create a new video tag repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn find_link_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        video_id: &str,
        tag_id: &str,
    ) -> AppResult<Option<video_tag::Model>> {
        VideoTag::find()
            .filter(video_tag::Column::VideoId.eq(video_id))
            .filter(video_tag::Column::TagId.eq(tag_id))
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn create_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: video_tag::ActiveModel,
    ) -> AppResult<video_tag::Model> {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Detach a tag from a video. Returns `false` when it was not attached.
    pub async fn delete_link(&self, video_id: &str, tag_id: &str) -> AppResult<bool> {
        let result = VideoTag::delete_many()
            .filter(video_tag::Column::VideoId.eq(video_id))
            .filter(video_tag::Column::TagId.eq(tag_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::content::ContentKind;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, TransactionTrait, Value};
    use std::collections::BTreeMap;

    #[tokio::test]
    async fn test_category_links_are_dependents() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![
                    BTreeMap::from([("id", Value::from("cc1"))]),
                    BTreeMap::from([("id", Value::from("cc2"))]),
                ]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 2,
                }])
                .into_connection(),
        );

        let repo = ContentCategoryRepository::new(db.clone());
        let target = ContentRef::new(ContentKind::Podcast, "p1");

        let refs = repo.find_by_target(&target).await.unwrap();
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].kind, "content_category");

        let txn = db.begin().await.unwrap();
        assert_eq!(repo.delete_by_target(&txn, &target).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_hashtags_of_content() {
        let rust = hashtag::Model {
            id: "h1".to_string(),
            name: "rust".to_string(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[rust.clone()]])
                .into_connection(),
        );

        let repo = ContentHashtagRepository::new(db);
        let tags = repo
            .hashtags_of(&ContentRef::new(ContentKind::Video, "v1"))
            .await
            .unwrap();

        assert_eq!(tags, vec![rust]);
    }

    #[tokio::test]
    async fn test_delete_missing_video_tag_link() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = VideoTagRepository::new(db);

        assert!(!repo.delete_link("v1", "t1").await.unwrap());
    }
}
